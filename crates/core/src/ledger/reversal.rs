//! Reversing entries for cancelled vouchers.
//!
//! Posted history is never edited; a cancellation books the mirror image of
//! the original entries.

use ledgerpost_shared::types::GlEntryId;

use super::entry::{DebitCredit, GlEntry};

/// Create reversing entries by swapping debits and credits.
///
/// For each original entry:
/// - Debits become credits in every currency view
/// - Credits become debits
/// - The entry gets a fresh id and is flagged cancelled
/// - Remarks are replaced with "`{prefix} {voucher_no}`", keeping the original text after a colon
#[must_use]
pub fn reverse_entries(originals: &[GlEntry], remark_prefix: &str) -> Vec<GlEntry> {
    originals
        .iter()
        .map(|original| {
            let mut reversed = original.clone();
            reversed.id = GlEntryId::new();
            reversed.map_amounts(DebitCredit::swapped);
            reversed.is_cancelled = true;

            let heading = format!("{remark_prefix} {}", original.voucher.voucher_no);
            reversed.remarks = Some(match original.remarks.as_deref() {
                Some(text) if !text.is_empty() => format!("{heading}: {text}"),
                _ => heading,
            });
            reversed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::entry::{VoucherRef, VoucherType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn create_balanced_entries() -> Vec<GlEntry> {
        let voucher = VoucherRef::new(VoucherType::PaymentEntry, "PAY-0010");
        let date = NaiveDate::from_ymd_opt(2026, 4, 5).unwrap();
        vec![
            GlEntry::new(voucher.clone(), "Acme", date, "Office Supplies")
                .with_debit(dec!(100.00))
                .with_remarks("Office supplies"),
            GlEntry::new(voucher, "Acme", date, "Cash").with_credit(dec!(100.00)),
        ]
    }

    #[test]
    fn test_create_reversing_entries() {
        let originals = create_balanced_entries();
        let reversed = reverse_entries(&originals, "On cancellation of");

        assert_eq!(reversed.len(), 2);
        assert_eq!(reversed[0].company_amount, DebitCredit::credit(dec!(100.00)));
        assert_eq!(reversed[1].company_amount, DebitCredit::debit(dec!(100.00)));
        assert_eq!(
            reversed[0].remarks.as_deref(),
            Some("On cancellation of PAY-0010: Office supplies")
        );
        assert_eq!(reversed[1].remarks.as_deref(), Some("On cancellation of PAY-0010"));
        assert!(reversed.iter().all(|e| e.is_cancelled));
    }

    #[test]
    fn test_create_reversing_entries_preserves_everything_else() {
        let originals = create_balanced_entries();
        let reversed = reverse_entries(&originals, "On cancellation of");

        for (original, reversal) in originals.iter().zip(&reversed) {
            assert_ne!(original.id, reversal.id);
            assert_eq!(original.account, reversal.account);
            assert_eq!(original.voucher, reversal.voucher);
            assert_eq!(original.posting_date, reversal.posting_date);
            assert_eq!(original.account_amount.swapped(), reversal.account_amount);
            assert_eq!(original.transaction_amount.swapped(), reversal.transaction_amount);
        }
    }
}
