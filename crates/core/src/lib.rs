//! Core posting logic for Ledgerpost.
//!
//! This crate turns a batch of proposed ledger entries for one source
//! document into validated, balanced, persisted general ledger entries.
//! It has ZERO web or database dependencies; storage and master data are
//! reached through the contracts in [`ports`].
//!
//! # Modules
//!
//! - `ledger` - Entries, the posting pipeline and the posting engine
//! - `ports` - Collaborator contracts and in-memory implementations
//! - `fiscal` - Fiscal years and accounting-period closing
//! - `budget` - Spending limits checked before posting
//! - `dimension` - Balance-neutral offsetting for accounting dimensions

pub mod budget;
pub mod dimension;
pub mod fiscal;
pub mod ledger;
pub mod ports;
