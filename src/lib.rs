//! # wallet
//!
//! An in-memory ledger of accounts, payments and favorites whose aggregate
//! queries (payment totals, filtered payment lists, progress reports) run on
//! a parallel partition engine.
//!
//! - [`parallel`]: partitioner, bounded worker pool, reduce/filter, fan-in
//!   streaming and cooperative cancellation.
//! - [`domain`]: value objects, records and storage ports.
//! - [`application`]: the [`WalletService`](application::service::WalletService).
//! - [`infrastructure`]: in-memory storage adapters.
//! - [`interfaces`]: semicolon-delimited dumps.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod parallel;
pub mod telemetry;
