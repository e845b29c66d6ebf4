use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod error;
mod integrations;
mod models;
mod network;
mod services;
mod utils;

use config::Config;
use constants::{API_VERSION, UPSTREAM_CONNECT_TIMEOUT_SECS};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lightning_proxy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting Lightning wallet proxy");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);

    // One HTTP connection pool for all upstream calls; credentials are
    // attached per request, never stored here.
    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(UPSTREAM_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(config.upstream_timeout_secs))
        .build()?;

    let app_state = api::AppState {
        config: config.clone(),
        http,
    };

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {e}"))?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    // CORS configuration
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Wallet
        .route("/api/v1/wallet/generate", post(api::wallet::generate_wallet))
        .route("/api/v1/wallet/{wallet_id}", get(api::wallet::get_wallet))
        // Invoices
        .route(
            "/api/v1/wallet/{wallet_id}/invoice",
            post(api::invoice::create_invoice).get(api::invoice::list_invoices),
        )
        .route(
            "/api/v1/wallet/{wallet_id}/invoice/{payment_hash}",
            get(api::invoice::get_invoice),
        )
        // Payments
        .route(
            "/api/v1/wallet/{wallet_id}/payment",
            post(api::payment::pay_invoice).get(api::payment::list_payments),
        )
        .route(
            "/api/v1/wallet/{wallet_id}/payment/{payment_hash}",
            get(api::payment::get_payment),
        )
        // Transactions (raw relay)
        .route(
            "/api/v1/wallet/{wallet_id}/transaction",
            get(api::transaction::list_transactions),
        )
        .route(
            "/api/v1/wallet/{wallet_id}/transaction/{tx_id}",
            get(api::transaction::get_transaction),
        )
        // Token verification
        .route("/api/v1/user/me", get(api::user::get_me))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
