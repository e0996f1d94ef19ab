//! Activity feed endpoint.

use std::collections::HashMap;

use axum::{Router, extract::State, routing::get};
use serde::Serialize;
use serde_json::{Value, json};
use vitrine_common::AppResult;
use vitrine_core::{ActionTarget, FeedEntry};
use vitrine_db::entities::{action::Verb, brand, product};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Feed item with its target rendered.
#[derive(Serialize)]
pub struct FeedItemResponse {
    pub id: String,
    pub brand_id: String,
    pub verb: Verb,
    pub seen: bool,
    pub created_at: String,
    /// `null` when the action has no target or the target is gone.
    pub target: Option<Value>,
}

fn render_product(p: &product::Model) -> Value {
    json!({
        "type": "product",
        "id": p.id,
        "name": p.name,
        "slug": p.slug,
        "price": p.price,
        "is_sale": p.is_sale,
    })
}

fn render_brand(b: &brand::Model) -> Value {
    json!({
        "type": "brand",
        "id": b.id,
        "name": b.name,
        "slug": b.slug,
    })
}

/// Feed of the caller's followed brands.
async fn feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FeedItemResponse>>> {
    let brand_ids = state.brand_follow_service.followed_brand_ids(&user.id).await?;
    let entries = state.feed_service.get_feed(&user.id, &brand_ids).await?;

    let mut product_ids = Vec::new();
    let mut target_brand_ids = Vec::new();
    for entry in &entries {
        match &entry.target {
            Some(ActionTarget::Product(id)) => product_ids.push(id.clone()),
            Some(ActionTarget::Brand(id)) => target_brand_ids.push(id.clone()),
            None => {}
        }
    }

    let products: HashMap<String, product::Model> = state
        .product_service
        .get_many(&product_ids)
        .await?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();
    let brands: HashMap<String, brand::Model> = state
        .brand_service
        .get_many(&target_brand_ids)
        .await?
        .into_iter()
        .map(|b| (b.id.clone(), b))
        .collect();

    let items = entries
        .into_iter()
        .map(|entry: FeedEntry| {
            let target = match &entry.target {
                Some(ActionTarget::Product(id)) => products.get(id).map(render_product),
                Some(ActionTarget::Brand(id)) => brands.get(id).map(render_brand),
                None => None,
            };
            FeedItemResponse {
                id: entry.id,
                brand_id: entry.brand_id,
                verb: entry.verb,
                seen: entry.seen,
                created_at: entry.created_at.to_rfc3339(),
                target,
            }
        })
        .collect();

    Ok(ApiResponse::ok(items))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/feed", get(feed))
}
