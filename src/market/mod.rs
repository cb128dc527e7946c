//! Market-data controllers for the wallet: a currency conversion-rate
//! poller and a swap-quote poller.
//!
//! Both controllers follow the same pattern: fetch external JSON, cache it
//! in a shared state object, and discard any result that was superseded by
//! a newer fetch or a reset before it landed.

pub mod models;
pub mod rate_controller;
pub mod selection;
pub mod services;
pub mod swaps_controller;

pub use rate_controller::RateController;
pub use swaps_controller::SwapsController;
