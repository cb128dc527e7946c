// src/market/models.rs
use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thiserror::Error;

lazy_static! {
    /// Fiat currency codes the rate API is known to quote. Native tickers
    /// (ETH, BNB, ...) are not restricted to this set.
    static ref KNOWN_FIAT: HashSet<&'static str> = [
        "usd", "eur", "gbp", "jpy", "cny", "krw", "inr", "rub", "brl", "cad",
        "aud", "chf", "sek", "nok", "dkk", "pln", "czk", "try", "mxn", "zar",
        "sgd", "hkd", "nzd", "thb", "php", "idr", "myr", "vnd", "uah", "ils",
    ]
    .iter()
    .copied()
    .collect();
}

// --- Error types for market-data operations ---

#[derive(Error, Debug)]
pub enum RateError {
    #[error("unsupported currency code: {0}")]
    UnsupportedCurrency(String),
    #[error("invalid native currency ticker: {0}")]
    InvalidNativeCurrency(String),
    #[error("exchange rate fetch failed: {0}")]
    FetchFailed(String),
}

#[derive(Error, Debug)]
pub enum QuotesError {
    #[error("invalid quote request: {0}")]
    InvalidRequest(String),
    #[error("aggregator fetch failed: {0}")]
    FetchFailed(String),
}

// --- Currency rate models ---

/// Cached conversion-rate state for the wallet's native currency.
///
/// `pending_currency` / `pending_native_currency` are set while a currency
/// change is in flight and cleared on both the success and failure paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateState {
    /// Active fiat currency code (lowercase, e.g. "usd")
    pub current_currency: String,
    /// Ticker the rate is quoted for (uppercase, e.g. "ETH")
    pub native_currency: String,
    /// Last fetched rate, native -> fiat
    pub conversion_rate: Option<f64>,
    /// Unix seconds at which the last successful fetch started
    pub conversion_date: Option<i64>,
    /// USD rate fetched alongside when the active fiat is not USD
    pub usd_conversion_rate: Option<f64>,
    pub pending_currency: Option<String>,
    pub pending_native_currency: Option<String>,
}

impl RateState {
    pub fn new(current_currency: &str, native_currency: &str) -> Self {
        RateState {
            current_currency: current_currency.to_lowercase(),
            native_currency: native_currency.to_uppercase(),
            conversion_rate: None,
            conversion_date: None,
            usd_conversion_rate: None,
            pending_currency: None,
            pending_native_currency: None,
        }
    }
}

/// Rates returned by a single exchange-rate fetch.
#[derive(Debug, Clone)]
pub struct ExchangeRates {
    pub conversion_rate: f64,
    pub usd_conversion_rate: Option<f64>,
}

/// Validate and normalize a fiat currency code.
pub fn normalize_fiat(code: &str) -> Result<String, RateError> {
    let code = code.trim().to_lowercase();
    if !KNOWN_FIAT.contains(code.as_str()) {
        return Err(RateError::UnsupportedCurrency(code));
    }
    Ok(code)
}

/// Validate and normalize a native currency ticker.
pub fn normalize_native(code: &str) -> Result<String, RateError> {
    let code = code.trim().to_uppercase();
    if code.is_empty() || code.len() > 8 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(RateError::InvalidNativeCurrency(code));
    }
    Ok(code)
}

// --- Swap quote models ---

/// Token the swap pays out in, as described by the aggregation API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
    /// Price of one whole token in the chain's native currency. Absent for
    /// the native token itself (treated as 1.0).
    #[serde(default)]
    pub price_in_native: Option<f64>,
}

/// A single aggregator's quote for a trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub aggregator_id: String,
    /// Trade value in destination-token base units
    pub destination_amount: u128,
    pub destination_token: TokenInfo,
    /// Simulated gas for the trade; absent when simulation failed upstream
    #[serde(default)]
    pub gas_estimate: Option<u64>,
    #[serde(default)]
    pub gas_estimate_with_refund: Option<u64>,
    #[serde(default)]
    pub average_gas: Option<u64>,
    /// Upper bound used when no estimate is available
    pub max_gas: u64,
    /// Whether an ERC-20 approval transaction must precede the trade
    #[serde(default)]
    pub approval_needed: bool,
    #[serde(default)]
    pub fee_in_basis_points: u32,
}

/// Parameters for a quote fetch, repeated verbatim on every poll tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub source_token: String,
    pub destination_token: String,
    /// Amount to trade, in source-token base units
    pub source_amount: u128,
    /// Max acceptable slippage in percent
    pub slippage: f64,
}

impl QuoteRequest {
    pub fn validate(&self) -> Result<(), QuotesError> {
        if self.source_token.trim().is_empty() || self.destination_token.trim().is_empty() {
            return Err(QuotesError::InvalidRequest(
                "source and destination tokens are required".to_string(),
            ));
        }
        if self.source_amount == 0 {
            return Err(QuotesError::InvalidRequest(
                "source amount must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.slippage) {
            return Err(QuotesError::InvalidRequest(format!(
                "slippage must be between 0 and 100, got {}",
                self.slippage
            )));
        }
        Ok(())
    }
}

/// Cached quote state, keyed by aggregator id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotesState {
    pub quotes: HashMap<String, Quote>,
    /// Aggregator id of the quote with the maximum computed overall value
    pub best_quote_id: Option<String>,
    /// Unix seconds at which the last successful fetch started
    pub quotes_last_fetched: Option<i64>,
    /// Request the poll timer repeats; `None` when polling is stopped
    pub active_request: Option<QuoteRequest>,
    /// Message from the most recent failed fetch, if any
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fiat_codes_normalize_and_validate() {
        assert_eq!(normalize_fiat(" EUR ").unwrap(), "eur");
        assert_eq!(normalize_fiat("usd").unwrap(), "usd");
        assert!(matches!(
            normalize_fiat("doubloons"),
            Err(RateError::UnsupportedCurrency(_))
        ));
    }

    #[test]
    fn native_tickers_normalize_and_validate() {
        assert_eq!(normalize_native("eth").unwrap(), "ETH");
        assert!(normalize_native("").is_err());
        assert!(normalize_native("NOT A TICKER").is_err());
    }

    #[test]
    fn quote_request_validation() {
        let req = QuoteRequest {
            source_token: "0xsrc".to_string(),
            destination_token: "0xdst".to_string(),
            source_amount: 1_000,
            slippage: 2.0,
        };
        assert!(req.validate().is_ok());

        let mut zero = req.clone();
        zero.source_amount = 0;
        assert!(zero.validate().is_err());

        let mut slip = req;
        slip.slippage = 101.0;
        assert!(slip.validate().is_err());
    }
}
