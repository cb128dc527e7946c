// src/market/swaps_controller.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::market::models::{QuoteRequest, QuotesError, QuotesState};
use crate::market::selection;
use crate::market::services;

/// Polls the swap aggregation API for quotes and tracks the best one.
#[derive(Clone)]
pub struct SwapsController {
    state: Arc<RwLock<QuotesState>>,
    /// Sequence number of the most recently started fetch. Bumped by every
    /// fetch and by reset, so superseded results are discarded on commit.
    fetch_seq: Arc<AtomicU64>,
    poll: Arc<Mutex<Option<CancellationToken>>>,
    client: Client,
    api_base: String,
    interval: Duration,
    gas_price_wei: u128,
    approval_gas: u64,
}

impl SwapsController {
    pub fn new(
        client: Client,
        api_base: String,
        interval: Duration,
        gas_price_wei: u128,
        approval_gas: u64,
    ) -> Self {
        SwapsController {
            state: Arc::new(RwLock::new(QuotesState::default())),
            fetch_seq: Arc::new(AtomicU64::new(0)),
            poll: Arc::new(Mutex::new(None)),
            client,
            api_base,
            interval,
            gas_price_wei,
            approval_gas,
        }
    }

    /// Snapshot of the current quotes state.
    pub async fn state(&self) -> QuotesState {
        self.state.read().await.clone()
    }

    /// Fetch quotes for `request`, select the best one, and (re)start the
    /// poll timer repeating the same request.
    pub async fn fetch_and_set_quotes(
        &self,
        request: QuoteRequest,
    ) -> Result<QuotesState, QuotesError> {
        request.validate()?;
        {
            let mut st = self.state.write().await;
            st.active_request = Some(request.clone());
        }
        self.start_polling(request.clone()).await;

        let seq = self.begin_fetch();
        self.run_fetch(seq, &request).await
    }

    /// Cancel the poll timer and clear all quote state. In-flight fetches
    /// are superseded and their results discarded.
    pub async fn stop_polling_and_reset(&self) {
        self.begin_fetch();
        {
            let mut slot = self.poll.lock().await;
            if let Some(token) = slot.take() {
                token.cancel();
            }
        }
        let mut st = self.state.write().await;
        *st = QuotesState::default();
        info!("Quote polling stopped, state reset");
    }

    fn begin_fetch(&self) -> u64 {
        self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_superseded(&self, seq: u64) -> bool {
        self.fetch_seq.load(Ordering::SeqCst) != seq
    }

    async fn run_fetch(&self, seq: u64, request: &QuoteRequest) -> Result<QuotesState, QuotesError> {
        let started = Utc::now().timestamp();
        match services::quotes::fetch_quotes(&self.client, &self.api_base, request).await {
            Ok(quotes) => {
                let best = selection::pick_best(&quotes, self.gas_price_wei, self.approval_gas);
                let mut st = self.state.write().await;
                if self.is_superseded(seq) {
                    debug!("Discarding stale quote result ({} quotes)", quotes.len());
                    return Ok(st.clone());
                }
                st.quotes = quotes;
                st.best_quote_id = best;
                st.quotes_last_fetched = Some(started);
                st.error = None;
                Ok(st.clone())
            }
            Err(e) => {
                {
                    let mut st = self.state.write().await;
                    if self.is_superseded(seq) {
                        debug!("Discarding stale quote failure");
                        return Err(QuotesError::FetchFailed(e.to_string()));
                    }
                    // Keep the previous quotes; the next tick may succeed.
                    st.error = Some(e.to_string());
                }
                error!("Failed to fetch swap quotes: {:#}", e);
                Err(QuotesError::FetchFailed(e.to_string()))
            }
        }
    }

    async fn start_polling(&self, request: QuoteRequest) {
        let token = CancellationToken::new();
        {
            let mut slot = self.poll.lock().await;
            if let Some(old) = slot.take() {
                old.cancel();
            }
            *slot = Some(token.clone());
        }

        let ctl = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(ctl.interval);
            // fetch_and_set_quotes already did the eager fetch
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let seq = ctl.begin_fetch();
                        // Errors are recorded in state and logged; polling
                        // continues regardless.
                        let _ = ctl.run_fetch(seq, &request).await;
                    }
                }
            }
            debug!("Quote poll timer exited");
        });
        info!("Quote polling started (every {:?})", self.interval);
    }
}
