//! Shared identifiers, configuration, and tracing bootstrap for Ledgerpost.
//!
//! This crate provides common pieces used by the posting engine and the
//! thin callers built around it:
//! - Typed IDs for ledger and party-ledger entries
//! - Posting tolerance and logging configuration
//! - Tracing subscriber setup

pub mod config;
pub mod telemetry;
pub mod types;

pub use config::{AppConfig, LoggingConfig, PostingConfig};
