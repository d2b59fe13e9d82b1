//! Configured offsetting dimensions per company.

use std::collections::HashSet;

use super::offsetting::{OffsettingDimension, dimension_value};
use crate::ledger::LedgerBatch;
use crate::ports::{CollaboratorError, DimensionProvider};

/// Dimension provider over a static configuration.
///
/// A dimension is offset only when the batch carries more than one distinct
/// value for it; a single-valued batch is already balanced per value.
#[derive(Debug, Clone, Default)]
pub struct DimensionRegistry {
    dimensions: Vec<(String, OffsettingDimension)>,
}

impl DimensionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables automatic offsetting of `dimension` for `company`.
    #[must_use]
    pub fn with_dimension(
        mut self,
        company: impl Into<String>,
        dimension: OffsettingDimension,
    ) -> Self {
        self.dimensions.push((company.into(), dimension));
        self
    }
}

impl DimensionProvider for DimensionRegistry {
    fn offsetting_dimensions(
        &self,
        batch: &LedgerBatch,
        company: &str,
    ) -> Result<Vec<OffsettingDimension>, CollaboratorError> {
        Ok(self
            .dimensions
            .iter()
            .filter(|(owner, _)| owner == company)
            .filter(|(_, dimension)| {
                let values: HashSet<Option<&str>> = batch
                    .entries()
                    .iter()
                    .map(|e| dimension_value(e, &dimension.fieldname))
                    .collect();
                values.len() > 1
            })
            .map(|(_, dimension)| dimension.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{GlEntry, VoucherRef, VoucherType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn batch(branches: [&str; 2]) -> LedgerBatch {
        let voucher = VoucherRef::new(VoucherType::JournalEntry, "JV-0050");
        let date = NaiveDate::from_ymd_opt(2026, 6, 2).unwrap();
        LedgerBatch::new(vec![
            GlEntry::new(voucher.clone(), "Acme", date, "Cash")
                .with_debit(dec!(10))
                .with_dimension("branch", branches[0]),
            GlEntry::new(voucher, "Acme", date, "Sales")
                .with_credit(dec!(10))
                .with_dimension("branch", branches[1]),
        ])
    }

    fn registry() -> DimensionRegistry {
        DimensionRegistry::new()
            .with_dimension("Acme", OffsettingDimension::new("Branch", "branch", "Inter-Branch"))
            .with_dimension("Globex", OffsettingDimension::new("Region", "branch", "Inter-Region"))
    }

    #[test]
    fn test_multi_valued_dimension_is_offset() {
        let dims = registry().offsetting_dimensions(&batch(["North", "South"]), "Acme").unwrap();
        assert_eq!(dims.len(), 1);
        assert_eq!(dims[0].offsetting_account, "Inter-Branch");
    }

    #[test]
    fn test_single_valued_dimension_is_skipped() {
        let dims = registry().offsetting_dimensions(&batch(["North", "North"]), "Acme").unwrap();
        assert!(dims.is_empty());
    }

    #[test]
    fn test_other_company_is_skipped() {
        let dims = registry().offsetting_dimensions(&batch(["North", "South"]), "Initech").unwrap();
        assert!(dims.is_empty());
    }
}
