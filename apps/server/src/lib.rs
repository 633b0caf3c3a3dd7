//! # Stockroom Server
//!
//! HTTP API for the shop's inventory and point-of-sale data.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Request Pipeline                                 │
//! │                                                                         │
//! │  Browser ──► TraceLayer ──► CORS ──► gzip ──► no-cache headers          │
//! │                                                  │                      │
//! │                                                  ▼                      │
//! │                                   body limit ──► routes::*              │
//! │                                                  │                      │
//! │              ┌───────────────────────────────────┼──────────────┐       │
//! │              ▼                                   ▼              ▼       │
//! │        stockroom-core                      stockroom-db      ApiError   │
//! │   (normalize, predicates,               (SqlitePool, WAL)   (404/400/   │
//! │    allow-listed updates)                                    503/500)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. `init_tracing()` - structured logging, `RUST_LOG` aware
//! 2. `ServerConfig::load()` - defaults → TOML → environment
//! 3. `Database::new()` - open pool, run migrations
//! 4. `serve()` - bind, route, shut down on Ctrl+C / SIGTERM

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use stockroom_db::Database;

pub use config::{ServerConfig, ServerSettings};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// Builds the application router with all middleware attached.
pub fn build_router(state: AppState, settings: &ServerSettings) -> Router {
    routes::routes()
        .layer(DefaultBodyLimit::max(settings.body_limit_bytes))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .layer(CompressionLayer::new())
        .layer(cors_layer(settings.cors_origin.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// One allowed origin when configured, any origin otherwise.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Some(Err(e)) => {
            warn!(error = %e, "Unusable CORS origin, allowing any origin");
            CorsLayer::permissive()
        }
        None => CorsLayer::permissive(),
    }
}

/// Opens the database and serves HTTP until a shutdown signal arrives.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let db = Database::new(config.db_config()).await?;
    let app = build_router(AppState::new(db.clone()), &config.server);

    let bind_addr = config.server.bind_address();
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Stockroom server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockroom=trace` - Show trace for stockroom crates only
/// - Default: `info,stockroom=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockroom=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
