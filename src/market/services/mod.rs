// src/market/services/mod.rs

pub mod quotes;
pub mod rates;
