//! # API Module
//!
//! HTTP handlers exposing the cached market data to the wallet UI.
//!
//! ## Available Endpoints
//!
//! ### Currency Rates
//! - `GET /rates` - Current conversion-rate state
//! - `POST /rates/currency` - Switch the active fiat currency
//! - `POST /rates/native` - Switch the native currency
//! - `POST /rates/refresh` - Force an immediate rate update
//!
//! ### Swap Quotes
//! - `GET /swaps/quotes` - Current quotes state
//! - `GET /swaps/best` - The selected best quote
//! - `POST /swaps/quotes` - Fetch quotes and begin polling
//! - `DELETE /swaps/quotes` - Stop polling and reset quote state

pub mod health;
pub mod rates;
pub mod swaps;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

/// Build the API router. Shared by `main` and the integration tests.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health_handler))
        // Currency rates
        .route("/rates", get(rates::get_rates_handler))
        .route("/rates/currency", post(rates::set_currency_handler))
        .route("/rates/native", post(rates::set_native_handler))
        .route("/rates/refresh", post(rates::refresh_handler))
        // Swap quotes
        .route(
            "/swaps/quotes",
            get(swaps::get_quotes_handler)
                .post(swaps::start_quotes_handler)
                .delete(swaps::reset_quotes_handler),
        )
        .route("/swaps/best", get(swaps::get_best_quote_handler))
}
