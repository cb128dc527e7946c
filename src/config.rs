// src/config.rs

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,

    /// Base URL of the currency exchange-rate API.
    /// The endpoint shape follows CryptoCompare's `/data/price` contract:
    /// `GET {base}/data/price?fsym=ETH&tsyms=USD,EUR`.
    pub rate_api_url: String,
    /// Base URL of the swap aggregation API. `GET {base}/quotes` returns a
    /// map of aggregator id to quote.
    pub swaps_api_url: String,

    // Currency settings
    pub current_currency: String,
    pub native_currency: String,

    // Polling settings
    pub rate_poll_interval: Duration,
    pub swaps_poll_interval: Duration,

    // Quote valuation settings
    pub gas_price_wei: u128,
    pub approval_gas: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        let rate_api_url = env::var("RATE_API_URL")
            .unwrap_or_else(|_| "https://min-api.cryptocompare.com".to_string());
        Url::parse(&rate_api_url).context("RATE_API_URL must be a valid URL")?;

        let swaps_api_url = env::var("SWAPS_API_URL")
            .context("SWAPS_API_URL must be set to the swap aggregation API base URL")?;
        Url::parse(&swaps_api_url).context("Invalid SWAPS_API_URL")?;

        Ok(Config {
            // Server settings
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,

            // External APIs
            rate_api_url,
            swaps_api_url,

            // Currency settings
            current_currency: env::var("CURRENT_CURRENCY")
                .unwrap_or_else(|_| "usd".to_string())
                .to_lowercase(),
            native_currency: env::var("NATIVE_CURRENCY")
                .unwrap_or_else(|_| "ETH".to_string())
                .to_uppercase(),

            // Polling settings
            rate_poll_interval: Duration::from_secs(
                env::var("RATE_POLL_INTERVAL_SECS")
                    .unwrap_or_else(|_| "180".to_string())
                    .parse()
                    .context("RATE_POLL_INTERVAL_SECS must be a valid number")?,
            ),
            swaps_poll_interval: Duration::from_secs(
                env::var("SWAPS_POLL_INTERVAL_SECS")
                    .unwrap_or_else(|_| "50".to_string())
                    .parse()
                    .context("SWAPS_POLL_INTERVAL_SECS must be a valid number")?,
            ),

            // Quote valuation settings
            gas_price_wei: env::var("GAS_PRICE_WEI")
                .unwrap_or_else(|_| "20000000000".to_string())
                .parse()
                .context("GAS_PRICE_WEI must be a valid number")?,
            approval_gas: env::var("APPROVAL_GAS")
                .unwrap_or_else(|_| "120000".to_string())
                .parse()
                .context("APPROVAL_GAS must be a valid number")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rate_api_url: "https://min-api.cryptocompare.com".to_string(),
            swaps_api_url: "http://localhost:9090".to_string(),
            current_currency: "usd".to_string(),
            native_currency: "ETH".to_string(),
            rate_poll_interval: Duration::from_secs(180),
            swaps_poll_interval: Duration::from_secs(50),
            gas_price_wei: 20_000_000_000,
            approval_gas: 120_000,
        }
    }
}
