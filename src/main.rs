// src/main.rs

use axum::Router;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wallet_market_server::{api::api_router, config::Config, AppState};

// --- HTTP Server Logic ---
async fn run_http_server(state: AppState) {
    // Create the main app with the API router under /api
    let app = Router::new()
        .nest("/api", api_router())
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    info!("🚀 HTTP Server listening on {}", addr);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("❌ Failed to bind {}: {}", addr, e);
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!("❌ Server error: {}", e);
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallet_market_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            return;
        }
    };

    // Create app state and warm the rate cache
    let app_state = AppState::new(config);
    app_state.rates.start().await;
    if let Err(e) = app_state.rates.update_exchange_rate().await {
        // Not fatal; polling retries on the next tick
        error!("Initial exchange rate update failed: {}", e);
    }

    run_http_server(app_state).await;
}
