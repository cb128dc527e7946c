// src/market/services/quotes.rs

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use reqwest::Client;
use tracing::info;

use crate::market::models::{Quote, QuoteRequest};

/// Fetch quotes from the swap aggregation API.
///
/// The API returns a JSON object keyed by aggregator id. Quotes whose key
/// disagrees with their embedded `aggregator_id` are normalized to the key.
pub async fn fetch_quotes(
    client: &Client,
    base_url: &str,
    request: &QuoteRequest,
) -> Result<HashMap<String, Quote>> {
    let url = format!("{}/quotes", base_url.trim_end_matches('/'));
    info!(
        "Fetching swap quotes: {} -> {} (amount {})",
        request.source_token, request.destination_token, request.source_amount
    );

    let res = client
        .get(&url)
        .query(&[
            ("sourceToken", request.source_token.as_str()),
            ("destinationToken", request.destination_token.as_str()),
        ])
        .query(&[("sourceAmount", request.source_amount.to_string())])
        .query(&[("slippage", request.slippage)])
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(anyhow!("aggregator API returned {}: {}", status, body));
    }

    let mut quotes: HashMap<String, Quote> = res.json().await?;
    for (id, quote) in quotes.iter_mut() {
        if quote.aggregator_id != *id {
            quote.aggregator_id = id.clone();
        }
    }

    Ok(quotes)
}
