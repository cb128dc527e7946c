// src/market/rate_controller.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::market::models::{normalize_fiat, normalize_native, RateError, RateState};
use crate::market::services;

/// Keeps the native-currency conversion rate fresh via interval polling.
///
/// Cloning is cheap and clones share state, so request handlers and the poll
/// task all observe the same cache.
#[derive(Clone)]
pub struct RateController {
    state: Arc<RwLock<RateState>>,
    /// Sequence number of the most recently started update. A fetch result
    /// commits only if no newer update started while it was in flight.
    update_seq: Arc<AtomicU64>,
    poll: Arc<Mutex<Option<CancellationToken>>>,
    client: Client,
    api_base: String,
    interval: Duration,
}

impl RateController {
    pub fn new(
        client: Client,
        api_base: String,
        interval: Duration,
        current_currency: &str,
        native_currency: &str,
    ) -> Self {
        RateController {
            state: Arc::new(RwLock::new(RateState::new(current_currency, native_currency))),
            update_seq: Arc::new(AtomicU64::new(0)),
            poll: Arc::new(Mutex::new(None)),
            client,
            api_base,
            interval,
        }
    }

    /// Snapshot of the current rate state.
    pub async fn state(&self) -> RateState {
        self.state.read().await.clone()
    }

    /// Switch the active fiat currency. The new code is held in
    /// `pending_currency` until the rate fetch settles.
    pub async fn set_current_currency(&self, code: &str) -> Result<RateState, RateError> {
        let code = normalize_fiat(code)?;
        {
            let mut st = self.state.write().await;
            st.pending_currency = Some(code);
        }
        self.update_exchange_rate().await
    }

    /// Switch the native currency the rate is quoted for.
    pub async fn set_native_currency(&self, code: &str) -> Result<RateState, RateError> {
        let code = normalize_native(code)?;
        {
            let mut st = self.state.write().await;
            st.pending_native_currency = Some(code);
        }
        self.update_exchange_rate().await
    }

    /// Fetch the current conversion rate and commit it unless a newer update
    /// started in the meantime.
    pub async fn update_exchange_rate(&self) -> Result<RateState, RateError> {
        let seq = self.begin_update();
        self.run_update(seq).await
    }

    /// Mark a new update as started and return its sequence number.
    fn begin_update(&self) -> u64 {
        self.update_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_superseded(&self, seq: u64) -> bool {
        self.update_seq.load(Ordering::SeqCst) != seq
    }

    // Boxed because the error path awaits `start`, whose poll task calls
    // back into `update_exchange_rate`; the indirection breaks the
    // otherwise-cyclic `Send` check on the recursive futures.
    fn run_update(
        &self,
        seq: u64,
    ) -> Pin<Box<dyn Future<Output = Result<RateState, RateError>> + Send + '_>> {
        Box::pin(async move {
        let started = Utc::now().timestamp();
        let (native, fiat) = {
            let st = self.state.read().await;
            (
                st.pending_native_currency
                    .clone()
                    .unwrap_or_else(|| st.native_currency.clone()),
                st.pending_currency
                    .clone()
                    .unwrap_or_else(|| st.current_currency.clone()),
            )
        };

        match services::rates::fetch_exchange_rate(&self.client, &self.api_base, &native, &fiat)
            .await
        {
            Ok(rates) => {
                let mut st = self.state.write().await;
                if self.is_superseded(seq) {
                    debug!("Discarding stale {}/{} rate result", native, fiat);
                    return Ok(st.clone());
                }
                st.current_currency = fiat;
                st.native_currency = native;
                st.conversion_rate = Some(rates.conversion_rate);
                st.conversion_date = Some(started);
                st.usd_conversion_rate = rates.usd_conversion_rate;
                st.pending_currency = None;
                st.pending_native_currency = None;
                Ok(st.clone())
            }
            Err(e) => {
                {
                    let mut st = self.state.write().await;
                    if self.is_superseded(seq) {
                        debug!("Discarding stale {}/{} rate failure", native, fiat);
                        return Err(RateError::FetchFailed(e.to_string()));
                    }
                    // Failure clears both the in-flight change and the cached
                    // rate; a wrong-currency rate must not survive the switch.
                    st.pending_currency = None;
                    st.pending_native_currency = None;
                    st.conversion_rate = None;
                    st.conversion_date = None;
                    st.usd_conversion_rate = None;
                }
                error!("Failed to update exchange rate for {}/{}: {:#}", native, fiat, e);
                // Re-arm the timer so the cache recovers without user action
                self.start().await;
                Err(RateError::FetchFailed(e.to_string()))
            }
        }
        })
    }

    /// Start (or restart) the repeating poll timer.
    pub async fn start(&self) {
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
            // The first tick fires immediately; the caller decides whether to
            // update eagerly, so the timer waits a full interval.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        // The error path re-arms polling with a fresh token,
                        // which cancels this task.
                        let _ = ctl.update_exchange_rate().await;
                    }
                }
            }
            debug!("Rate poll timer exited");
        });
        info!("Currency rate polling started (every {:?})", self.interval);
    }

    /// Cancel the poll timer if one is running.
    pub async fn stop(&self) {
        let mut slot = self.poll.lock().await;
        if let Some(token) = slot.take() {
            token.cancel();
            info!("Currency rate polling stopped");
        }
    }
}
