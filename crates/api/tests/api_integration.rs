//! API integration tests.
//!
//! Requests go through the full router and auth middleware against an
//! in-memory `SQLite` schema and the in-process counter store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    middleware,
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set};
use serde_json::{Value, json};
use tower::ServiceExt;
use vitrine_api::{AppState, middleware::auth_middleware, router as api_router};
use vitrine_common::config::{CounterConfig, FeedConfig, ViewConfig};
use vitrine_core::MemoryCounterStore;
use vitrine_db::{
    entities::{brand, user},
    repositories::{BrandRepository, UserRepository},
    test_utils::memory_database,
};

struct TestApp {
    db: Arc<DatabaseConnection>,
    store: Arc<MemoryCounterStore>,
    app: Router,
}

impl TestApp {
    async fn new() -> Self {
        let db = Arc::new(memory_database().await.expect("in-memory database"));
        let store = Arc::new(MemoryCounterStore::new());
        let state = AppState::new(
            db.clone(),
            store.clone(),
            &CounterConfig::default(),
            &ViewConfig::default(),
            &FeedConfig::default(),
        );

        let app = Router::new()
            .nest("/api", api_router())
            .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state);

        Self { db, store, app }
    }

    async fn user(&self, id: &str, is_private: bool, is_staff: bool) {
        UserRepository::new(self.db.clone())
            .create(user::ActiveModel {
                id: Set(id.to_string()),
                username: Set(format!("user_{id}")),
                name: Set(None),
                is_private: Set(is_private),
                is_active: Set(true),
                is_staff: Set(is_staff),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap();
    }

    async fn brand(&self, id: &str, owner_id: &str) {
        BrandRepository::new(self.db.clone())
            .create(brand::ActiveModel {
                id: Set(id.to_string()),
                owner_id: Set(Some(owner_id.to_string())),
                name: Set(format!("Brand {id}")),
                slug: Set(format!("brand-{id}")),
                is_active: Set(true),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap();
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(
        &self,
        uri: &str,
        user_id: Option<&str>,
        forwarded_for: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(id) = user_id {
            builder = builder.header("X-User-Id", id);
        }
        if let Some(xff) = forwarded_for {
            builder = builder.header("X-Forwarded-For", xff);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post(&self, uri: &str, user_id: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(id) = user_id {
            builder = builder.header("X-User-Id", id);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }
}

#[tokio::test]
async fn test_profile_counts_unique_visitors() {
    let app = TestApp::new().await;
    app.user("u1", false, false).await;

    let (status, _) = app.get("/api/users/u1", None, Some("203.0.113.1")).await;
    assert_eq!(status, StatusCode::OK);
    app.get("/api/users/u1", None, Some("203.0.113.1")).await;
    let (status, body) = app
        .get("/api/users/u1", None, Some("198.51.100.7, 203.0.113.2"))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "user_u1");
    assert_eq!(body["data"]["account_views"], 2);
    assert_eq!(body["data"]["followers_count"], 0);
    assert!(body["data"].get("is_active").is_none());
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/users/ghost", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn test_follow_updates_profile_counters() {
    let app = TestApp::new().await;
    app.user("a", false, false).await;
    app.user("b", false, false).await;

    let (status, body) = app
        .post("/api/following/create", Some("a"), json!({ "user_id": "b" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "following");

    let (_, body) = app.get("/api/users/b", None, None).await;
    assert_eq!(body["data"]["followers_count"], 1);
    let (_, body) = app.get("/api/users/a", None, None).await;
    assert_eq!(body["data"]["followings_count_user"], 1);

    let (status, body) = app.get("/api/users/b/followers", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["username"], "user_a");
    assert_eq!(body["data"][0]["followers_count"], 0);

    let (status, _) = app
        .post("/api/following/delete", Some("a"), json!({ "user_id": "b" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.peek("user:b:followers_count").await, Some(0));
}

#[tokio::test]
async fn test_private_follow_request_flow() {
    let app = TestApp::new().await;
    app.user("a", false, false).await;
    app.user("b", true, false).await;

    let (_, body) = app
        .post("/api/following/create", Some("a"), json!({ "user_id": "b" }))
        .await;
    assert_eq!(body["data"]["status"], "pending");

    let (status, body) = app.get("/api/following/requests", Some("b"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["from_user_id"], "a");

    let (status, _) = app
        .post("/api/following/requests/accept", Some("b"), json!({ "user_id": "a" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/users/b", None, None).await;
    assert_eq!(body["data"]["followers_count"], 1);
}

#[tokio::test]
async fn test_mutations_require_user() {
    let app = TestApp::new().await;
    app.user("b", false, false).await;

    let (status, body) = app
        .post("/api/following/create", None, json!({ "user_id": "b" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = app
        .post("/api/following/create", Some("ghost"), json!({ "user_id": "b" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_product_lifecycle_reaches_follower_feed() {
    let app = TestApp::new().await;
    app.user("owner", false, false).await;
    app.user("fan", false, false).await;
    app.brand("b1", "owner").await;

    let (status, _) = app.post("/api/brands/b1/follow", Some("fan"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/api/brands/b1", None, None).await;
    assert_eq!(body["data"]["followers_count"], 1);

    let (status, body) = app
        .post(
            "/api/products",
            Some("owner"),
            json!({ "brand_id": "b1", "name": "Wool coat", "slug": "wool-coat", "price": 12000 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let product_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["like_count"], 0);

    let (status, _) = app
        .post(&format!("/api/products/{product_id}/sale"), Some("fan"), json!({ "is_sale": true }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/api/i/feed", Some("fan"), None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["verb"], "PRODUCT");
    assert_eq!(items[0]["seen"], false);
    assert_eq!(items[0]["target"]["type"], "product");
    assert_eq!(items[0]["target"]["name"], "Wool coat");

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/products/{product_id}"))
        .header("X-User-Id", "owner")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.get("/api/i/feed", Some("fan"), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_like_and_rating_endpoints() {
    let app = TestApp::new().await;
    app.user("owner", false, false).await;
    app.user("fan", false, false).await;
    app.brand("b1", "owner").await;

    let (_, body) = app
        .post(
            "/api/products",
            Some("owner"),
            json!({ "brand_id": "b1", "name": "Silk scarf", "slug": "silk-scarf", "price": 3000 }),
        )
        .await;
    let product_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = app
        .post(&format!("/api/products/{product_id}/like"), Some("fan"), json!({}))
        .await;
    assert_eq!(body["data"]["liked"], true);

    let (_, body) = app
        .post(&format!("/api/products/{product_id}/rating"), Some("fan"), json!({ "value": 4 }))
        .await;
    assert_eq!(body["data"]["status"], "created");

    let (status, body) = app
        .post(&format!("/api/products/{product_id}/rating"), Some("fan"), json!({ "value": 6 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, body) = app
        .get(&format!("/api/products/{product_id}"), None, Some("203.0.113.5"))
        .await;
    assert_eq!(body["data"]["like_count"], 1);
    assert_eq!(body["data"]["rating_count"], 1);
    assert_eq!(body["data"]["product_views"], 1);
}

#[tokio::test]
async fn test_rebuild_is_staff_only() {
    let app = TestApp::new().await;
    app.user("plain", false, false).await;
    app.user("admin", false, true).await;

    let (status, _) = app
        .post("/api/admin/counters/rebuild", Some("plain"), json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post("/api/admin/counters/rebuild", Some("admin"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["users"], 2);
    assert_eq!(body["data"]["failures"], 0);
    assert_eq!(app.store.peek("user:plain:followers_count").await, Some(0));
}
