//! Ledger batch aggregate.
//!
//! A batch is every entry of one source document. Transforms take a batch
//! by reference and return a new one so a caller's entries are never
//! aliased by the engine.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{GlEntry, VoucherRef, round};

/// Default precision used by [`LedgerBatch::is_balanced`].
const DEFAULT_PRECISION: u32 = 2;

/// Ordered collection of entries belonging to one transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerBatch {
    entries: Vec<GlEntry>,
}

impl LedgerBatch {
    /// Creates a batch from entries.
    #[must_use]
    pub fn new(entries: Vec<GlEntry>) -> Self {
        Self { entries }
    }

    /// Returns the entries.
    #[must_use]
    pub fn entries(&self) -> &[GlEntry] {
        &self.entries
    }

    /// Consumes the batch, returning its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<GlEntry> {
        self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the batch has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a new batch with `extra` appended.
    #[must_use]
    pub fn appended(&self, extra: impl IntoIterator<Item = GlEntry>) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(extra);
        Self { entries }
    }

    /// Voucher of the first entry.
    #[must_use]
    pub fn voucher(&self) -> Option<&VoucherRef> {
        self.entries.first().map(|e| &e.voucher)
    }

    /// Company of the first entry.
    #[must_use]
    pub fn company(&self) -> Option<&str> {
        self.entries.first().map(|e| e.company.as_str())
    }

    /// Posting date of the first entry.
    #[must_use]
    pub fn posting_date(&self) -> Option<NaiveDate> {
        self.entries.first().map(|e| e.posting_date)
    }

    /// Returns true if any entry is an opening entry.
    #[must_use]
    pub fn is_opening(&self) -> bool {
        self.entries.iter().any(|e| e.is_opening)
    }

    /// Sum of company-currency debits.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.entries.iter().map(GlEntry::debit).sum()
    }

    /// Sum of company-currency credits.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.entries.iter().map(GlEntry::credit).sum()
    }

    /// Total debit minus total credit, each entry rounded to `precision` first.
    #[must_use]
    pub fn difference(&self, precision: u32) -> Decimal {
        let diff: Decimal = self
            .entries
            .iter()
            .map(|e| round(e.debit(), precision) - round(e.credit(), precision))
            .sum();
        round(diff, precision)
    }

    /// Returns true if the difference at `precision` is below `tolerance`.
    #[must_use]
    pub fn is_balanced_within(&self, tolerance: Decimal, precision: u32) -> bool {
        self.difference(precision).abs() < tolerance
    }

    /// Returns true if debits equal credits at two decimal places.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.is_balanced_within(Decimal::new(1, DEFAULT_PRECISION), DEFAULT_PRECISION)
    }
}

impl From<Vec<GlEntry>> for LedgerBatch {
    fn from(entries: Vec<GlEntry>) -> Self {
        Self::new(entries)
    }
}

impl IntoIterator for LedgerBatch {
    type Item = GlEntry;
    type IntoIter = std::vec::IntoIter<GlEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::entry::VoucherType;
    use rust_decimal_macros::dec;

    fn entry(account: &str) -> GlEntry {
        GlEntry::new(
            VoucherRef::new(VoucherType::SalesInvoice, "SINV-0001"),
            "Acme",
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            account,
        )
    }

    #[test]
    fn test_invoice_with_taxes_is_balanced() {
        let batch = LedgerBatch::new(vec![
            entry("Debtors").with_debit(dec!(11800.00)),
            entry("Sales").with_credit(dec!(10000.00)),
            entry("Output Tax CGST").with_credit(dec!(900.00)),
            entry("Output Tax SGST").with_credit(dec!(900.00)),
        ]);

        assert_eq!(batch.total_debit(), dec!(11800.00));
        assert_eq!(batch.total_credit(), dec!(11800.00));
        assert!(batch.is_balanced());
        assert_eq!(batch.difference(2), Decimal::ZERO);
    }

    #[test]
    fn test_unbalanced_difference() {
        let batch = LedgerBatch::new(vec![
            entry("Debtors").with_debit(dec!(100.00)),
            entry("Sales").with_credit(dec!(99.97)),
        ]);

        assert_eq!(batch.difference(2), dec!(0.03));
        assert!(!batch.is_balanced());
        assert!(batch.is_balanced_within(dec!(0.05), 2));
    }

    #[test]
    fn test_difference_rounds_each_entry() {
        let batch = LedgerBatch::new(vec![
            entry("Debtors").with_debit(dec!(10.004)),
            entry("Sales").with_credit(dec!(10.001)),
        ]);

        assert_eq!(batch.difference(2), Decimal::ZERO);
        assert!(batch.is_balanced());
    }

    #[test]
    fn test_appended_leaves_original_untouched() {
        let batch = LedgerBatch::new(vec![entry("Debtors").with_debit(dec!(5))]);
        let bigger = batch.appended([entry("Sales").with_credit(dec!(5))]);

        assert_eq!(batch.len(), 1);
        assert_eq!(bigger.len(), 2);
        assert_eq!(bigger.voucher().unwrap().voucher_no, "SINV-0001");
    }
}
