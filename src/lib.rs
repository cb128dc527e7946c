// src/lib.rs

// Re-export modules
pub mod api;
pub mod config;
pub mod market;

use market::{RateController, SwapsController};

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Currency conversion-rate controller
    pub rates: RateController,
    /// Swap-quote controller
    pub swaps: SwapsController,
}

impl AppState {
    /// Build the application state from configuration, wiring both
    /// controllers to a shared HTTP client.
    pub fn new(config: config::Config) -> Self {
        let client = reqwest::Client::new();
        let rates = RateController::new(
            client.clone(),
            config.rate_api_url.clone(),
            config.rate_poll_interval,
            &config.current_currency,
            &config.native_currency,
        );
        let swaps = SwapsController::new(
            client,
            config.swaps_api_url.clone(),
            config.swaps_poll_interval,
            config.gas_price_wei,
            config.approval_gas,
        );
        AppState {
            config,
            rates,
            swaps,
        }
    }
}
