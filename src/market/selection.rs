// src/market/selection.rs

use std::collections::HashMap;

use crate::market::models::Quote;

const WEI_PER_NATIVE: f64 = 1e18;

/// Computed overall value of a quote, in whole native-currency units.
///
/// Destination amount is converted through the token's decimals and its
/// native-currency price, then the estimated gas cost of executing the trade
/// (plus an approval allowance when one is required) is subtracted. Quotes
/// without a gas estimate fall back to their `max_gas` upper bound, which
/// penalizes them relative to simulated quotes.
pub fn overall_value(quote: &Quote, gas_price_wei: u128, approval_gas: u64) -> f64 {
    let token_price = quote.destination_token.price_in_native.unwrap_or(1.0);
    let destination_value = quote.destination_amount as f64
        / 10f64.powi(quote.destination_token.decimals as i32)
        * token_price;

    let mut gas = quote.gas_estimate.unwrap_or(quote.max_gas);
    if quote.approval_needed {
        gas = gas.saturating_add(approval_gas);
    }
    let gas_cost = (gas as u128).saturating_mul(gas_price_wei) as f64 / WEI_PER_NATIVE;

    destination_value - gas_cost
}

/// Pick the aggregator id with the maximum computed overall value.
///
/// Ties break on the lexicographically smallest id so the choice is stable
/// across polls. Returns `None` for an empty map.
pub fn pick_best(
    quotes: &HashMap<String, Quote>,
    gas_price_wei: u128,
    approval_gas: u64,
) -> Option<String> {
    quotes
        .iter()
        .map(|(id, quote)| (id, overall_value(quote, gas_price_wei, approval_gas)))
        .max_by(|(a_id, a_val), (b_id, b_val)| {
            a_val
                .total_cmp(b_val)
                .then_with(|| b_id.as_str().cmp(a_id.as_str()))
        })
        .map(|(id, _)| id.clone())
}
