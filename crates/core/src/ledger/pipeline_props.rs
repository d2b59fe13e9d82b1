//! Property-based tests for the batch transformation pipeline.
//!
//! - Property 1: Merged keys are unique and totals are preserved
//! - Property 2: Merging is idempotent
//! - Property 3: Normalized amounts are never negative
//! - Property 4: Reconciliation balances iff the difference is within allowance
//! - Property 5: Reversal is the inverse of the original
//! - Property 6: A batch balances iff its totals agree at two decimals

use std::collections::HashSet;

use chrono::NaiveDate;
use ledgerpost_shared::PostingConfig;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::batch::LedgerBatch;
use super::entry::{DebitCredit, GlEntry, VoucherRef, VoucherType, round};
use super::error::PostingError;
use super::merge::{MergeKey, merge_similar_entries};
use super::normalize::toggle_negative_amounts;
use super::reconcile::{RoundOffTarget, reconcile};
use super::reversal::reverse_entries;

const ACCOUNTS: [&str; 3] = ["Bank", "Rent", "Sales"];
const COST_CENTERS: [&str; 2] = ["Main", "Branch"];

/// Strategy to generate signed amounts (-1,000.00 to 1,000.00).
fn signed_amount() -> impl Strategy<Value = Decimal> {
    (-100_000i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate entries over a small key space so merges happen.
fn entries() -> impl Strategy<Value = Vec<GlEntry>> {
    prop::collection::vec(
        (0..ACCOUNTS.len(), 0..COST_CENTERS.len(), signed_amount(), signed_amount()),
        1..12,
    )
    .prop_map(|rows| {
        let voucher = VoucherRef::new(VoucherType::JournalEntry, "JV-PROP");
        let date = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        rows.into_iter()
            .map(|(account, cost_center, debit, credit)| {
                GlEntry::new(voucher.clone(), "Acme", date, ACCOUNTS[account])
                    .with_cost_center(COST_CENTERS[cost_center])
                    .with_amounts(DebitCredit::new(debit, credit))
            })
            .collect()
    })
}

fn net(batch: &LedgerBatch) -> Decimal {
    batch.entries().iter().map(|e| e.company_amount.net()).sum()
}

fn target() -> RoundOffTarget {
    RoundOffTarget {
        account: "Round Off".to_string(),
        cost_center: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 1: No two merged entries share a key, and the net is unchanged.
    #[test]
    fn prop_merge_keys_unique(entries in entries()) {
        let batch = LedgerBatch::new(entries);
        let merged = merge_similar_entries(&batch, 2, |_| false);

        let keys: HashSet<MergeKey> = merged.entries().iter().map(MergeKey::of).collect();
        prop_assert_eq!(keys.len(), merged.len());
        prop_assert!(merged.len() <= ACCOUNTS.len() * COST_CENTERS.len());
        prop_assert_eq!(net(&merged), net(&batch));
    }

    /// Property 2: Merging an already merged batch changes nothing.
    #[test]
    fn prop_merge_idempotent(entries in entries()) {
        let once = merge_similar_entries(&LedgerBatch::new(entries), 2, |_| false);
        let twice = merge_similar_entries(&once, 2, |_| false);

        prop_assert_eq!(once, twice);
    }

    /// Property 3: Normalization leaves no negative side and keeps each net.
    #[test]
    fn prop_normalized_non_negative(entries in entries()) {
        let batch = LedgerBatch::new(entries);
        let normalized = toggle_negative_amounts(&batch);

        for (before, after) in batch.entries().iter().zip(normalized.entries()) {
            for view in [after.company_amount, after.account_amount, after.transaction_amount] {
                prop_assert!(view.debit >= Decimal::ZERO);
                prop_assert!(view.credit >= Decimal::ZERO);
            }
            prop_assert_eq!(before.company_amount.net(), after.company_amount.net());
        }
    }

    /// Property 4: Reconciliation succeeds exactly when the difference is
    /// within the allowance, and then leaves nothing to round off.
    #[test]
    fn prop_reconcile_balances_iff_within_allowance(entries in entries()) {
        let config = PostingConfig::default();
        let batch = toggle_negative_amounts(&LedgerBatch::new(entries));
        let difference = batch.difference(config.precision);

        match reconcile(&batch, &config, Some(&target())) {
            Ok(result) => {
                prop_assert!(difference.abs() <= config.allowance_for("Journal Entry"));
                prop_assert_eq!(result.residual, Decimal::ZERO);
                prop_assert_eq!(result.round_off.is_some(), !difference.is_zero());
            }
            Err(PostingError::DebitCreditMismatch { difference: reported, .. }) => {
                prop_assert!(difference.abs() > config.allowance_for("Journal Entry"));
                prop_assert_eq!(reported, difference);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    /// Property 5: Original plus reversal nets to zero in every view, and
    /// reversing twice restores the amounts.
    #[test]
    fn prop_reversal_inverse(entries in entries()) {
        let reversed = reverse_entries(&entries, "On cancellation of");
        let restored = reverse_entries(&reversed, "On cancellation of");

        prop_assert_eq!(reversed.len(), entries.len());
        for ((original, reversal), again) in entries.iter().zip(&reversed).zip(&restored) {
            let pairs = [
                (original.company_amount, reversal.company_amount),
                (original.account_amount, reversal.account_amount),
                (original.transaction_amount, reversal.transaction_amount),
            ];
            for (before, after) in pairs {
                prop_assert_eq!(before.net() + after.net(), Decimal::ZERO);
            }
            prop_assert_eq!(original.company_amount, again.company_amount);
            prop_assert!(reversal.is_cancelled);
        }
    }

    /// Property 6: `is_balanced` agrees with the totals at two decimals.
    #[test]
    fn prop_balanced_iff_totals_agree(entries in entries(), closing in any::<bool>()) {
        let mut batch = LedgerBatch::new(entries);
        if closing {
            let residual = net(&batch);
            let first = batch.entries()[0].clone();
            batch = batch.appended([first.with_amounts(DebitCredit::debit(-residual))]);
        }

        let totals = round(batch.total_debit() - batch.total_credit(), 2);
        prop_assert_eq!(batch.is_balanced(), totals.is_zero());
        if closing {
            prop_assert!(batch.is_balanced());
        }
    }
}
