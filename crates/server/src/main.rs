//! vitrine server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use fred::interfaces::ClientLike;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_api::{AppState, middleware::auth_middleware, router as api_router};
use vitrine_common::Config;
use vitrine_core::{CounterService, RedisCounterStore};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Rebuild every counter without delaying startup.
fn spawn_rebuild(counters: CounterService) {
    tokio::spawn(async move {
        match counters.rebuild_all().await {
            Ok(report) if report.failures > 0 => {
                warn!(failures = report.failures, "Startup counter rebuild finished with failures");
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "Startup counter rebuild failed"),
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting vitrine server...");

    let config = Config::load()?;

    let db = Arc::new(vitrine_db::init(&config).await?);
    info!("Connected to database");

    info!("Connecting to Redis...");
    let redis_config = fred::types::config::Config::from_url(&config.redis.url)?;
    let redis = fred::clients::Client::new(redis_config, None, None, None);
    redis.connect();
    redis.wait_for_connect().await?;
    let redis = Arc::new(redis);
    info!(prefix = %config.redis.prefix, "Connected to Redis counter store");

    let store = Arc::new(RedisCounterStore::from_config(redis.clone(), &config.redis));
    let state = AppState::new(
        db,
        store,
        &config.counters,
        &config.views,
        &config.feed,
    );

    if config.counters.rebuild_on_startup {
        info!("Scheduling counter rebuild");
        spawn_rebuild(state.counter_service.clone());
    }

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    redis.quit().await?;
    info!("Server shutdown complete");
    Ok(())
}
