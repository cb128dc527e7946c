use crate::market::models::{QuoteRequest, QuotesError};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::error;

// The handler function for the GET /swaps/quotes endpoint.
pub async fn get_quotes_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.swaps.state().await)
}

// The handler function for the GET /swaps/best endpoint.
pub async fn get_best_quote_handler(State(state): State<AppState>) -> impl IntoResponse {
    let quotes_state = state.swaps.state().await;
    let best = quotes_state
        .best_quote_id
        .as_ref()
        .and_then(|id| quotes_state.quotes.get(id));
    match best {
        Some(quote) => (StatusCode::OK, Json(quote.clone())).into_response(),
        None => (StatusCode::NOT_FOUND, "No quotes available").into_response(),
    }
}

// The handler function for the POST /swaps/quotes endpoint. Fetches quotes
// for the request and starts polling.
pub async fn start_quotes_handler(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> impl IntoResponse {
    match state.swaps.fetch_and_set_quotes(request).await {
        Ok(quotes_state) => (StatusCode::OK, Json(quotes_state)).into_response(),
        Err(e @ QuotesError::InvalidRequest(_)) => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => {
            error!("Quote fetch failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                format!("Failed to fetch quotes: {}", e),
            )
                .into_response()
        }
    }
}

// The handler function for the DELETE /swaps/quotes endpoint.
pub async fn reset_quotes_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.swaps.stop_polling_and_reset().await;
    Json(state.swaps.state().await)
}
