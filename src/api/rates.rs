use crate::market::models::RateError;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::error;

// Body for the currency-change endpoints.
#[derive(Debug, Deserialize)]
pub struct SetCurrencyRequest {
    pub currency: String,
}

// The handler function for the GET /rates endpoint.
pub async fn get_rates_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.rates.state().await)
}

// The handler function for the POST /rates/currency endpoint.
pub async fn set_currency_handler(
    State(state): State<AppState>,
    Json(body): Json<SetCurrencyRequest>,
) -> impl IntoResponse {
    match state.rates.set_current_currency(&body.currency).await {
        Ok(rate_state) => (StatusCode::OK, Json(rate_state)).into_response(),
        Err(e) => rate_error_response(e, &body.currency),
    }
}

// The handler function for the POST /rates/native endpoint.
pub async fn set_native_handler(
    State(state): State<AppState>,
    Json(body): Json<SetCurrencyRequest>,
) -> impl IntoResponse {
    match state.rates.set_native_currency(&body.currency).await {
        Ok(rate_state) => (StatusCode::OK, Json(rate_state)).into_response(),
        Err(e) => rate_error_response(e, &body.currency),
    }
}

// The handler function for the POST /rates/refresh endpoint.
pub async fn refresh_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.rates.update_exchange_rate().await {
        Ok(rate_state) => (StatusCode::OK, Json(rate_state)).into_response(),
        Err(e) => rate_error_response(e, "refresh"),
    }
}

fn rate_error_response(e: RateError, context: &str) -> axum::response::Response {
    match e {
        RateError::UnsupportedCurrency(_) | RateError::InvalidNativeCurrency(_) => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        RateError::FetchFailed(_) => {
            error!("Rate update failed for '{}': {}", context, e);
            (
                StatusCode::BAD_GATEWAY,
                format!("Failed to fetch exchange rate: {}", e),
            )
                .into_response()
        }
    }
}
