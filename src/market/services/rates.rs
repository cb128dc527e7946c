// src/market/services/rates.rs

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::info;

use crate::market::models::ExchangeRates;

/// Fetch the conversion rate for `native -> fiat` from the exchange-rate API.
///
/// When `fiat` is not USD the USD rate is requested in the same call, so the
/// wallet can show a secondary USD value without a second round trip.
pub async fn fetch_exchange_rate(
    client: &Client,
    base_url: &str,
    native: &str,
    fiat: &str,
) -> Result<ExchangeRates> {
    let fiat_symbol = fiat.to_uppercase();
    let include_usd = fiat_symbol != "USD";
    let tsyms = if include_usd {
        format!("{},USD", fiat_symbol)
    } else {
        fiat_symbol.clone()
    };

    let url = format!("{}/data/price", base_url.trim_end_matches('/'));
    info!("Fetching {}/{} conversion rate", native, fiat_symbol);

    let res: Value = client
        .get(&url)
        .query(&[("fsym", &native.to_uppercase()), ("tsyms", &tsyms)])
        .send()
        .await?
        .json()
        .await?;

    // The API reports failures in-band with a 200 status
    if res["Response"] == "Error" {
        let message = res["Message"].as_str().unwrap_or("unknown error");
        return Err(anyhow!("rate API error: {}", message));
    }

    let conversion_rate = res[&fiat_symbol].as_f64().ok_or_else(|| {
        anyhow!(
            "rate API response missing '{}' field: {:?}",
            fiat_symbol,
            res
        )
    })?;

    let usd_conversion_rate = if include_usd {
        Some(
            res["USD"]
                .as_f64()
                .ok_or_else(|| anyhow!("rate API response missing 'USD' field: {:?}", res))?,
        )
    } else {
        Some(conversion_rate)
    };

    Ok(ExchangeRates {
        conversion_rate,
        usd_conversion_rate,
    })
}
