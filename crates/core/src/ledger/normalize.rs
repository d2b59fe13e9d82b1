//! Negative-amount normalization.

use super::batch::LedgerBatch;
use super::entry::DebitCredit;

/// Moves negative debits and credits to the opposite side in every currency view.
#[must_use]
pub fn toggle_negative_amounts(batch: &LedgerBatch) -> LedgerBatch {
    batch
        .entries()
        .iter()
        .cloned()
        .map(|mut entry| {
            entry.map_amounts(DebitCredit::normalized);
            entry
        })
        .collect::<Vec<_>>()
        .into()
}
