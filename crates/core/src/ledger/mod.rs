//! General ledger posting.
//!
//! This module implements the posting pipeline:
//! - Ledger entries and batches
//! - Merging of similar entries and negative-amount normalization
//! - Debit/credit reconciliation with round-off
//! - Business rule validation
//! - Party-ledger projection
//! - Reversal on cancellation
//! - The posting engine tying it together

pub mod batch;
pub mod entry;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod party;
pub mod reconcile;
pub mod reversal;
pub mod service;
pub mod validation;

#[cfg(test)]
mod pipeline_props;
#[cfg(test)]
mod service_props;

pub use batch::LedgerBatch;
pub use entry::{DebitCredit, GlEntry, PartyRef, VoucherRef, VoucherType, round};
pub use error::PostingError;
pub use merge::{MergeKey, merge_similar_entries};
pub use normalize::toggle_negative_amounts;
pub use party::{PartyLedgerEntry, derive_party_ledger};
pub use reconcile::{Reconciliation, RoundOffTarget, reconcile};
pub use reversal::reverse_entries;
pub use service::{PostingEngine, PostingOptions, PostingOutcome};
