//! Balance-neutral offsetting entries for accounting dimensions.

use ledgerpost_shared::types::GlEntryId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{DebitCredit, GlEntry, LedgerBatch};

/// A dimension whose values must balance independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsettingDimension {
    /// Dimension name (e.g., "Branch").
    pub name: String,
    /// Entry field holding the dimension value.
    pub fieldname: String,
    /// Account receiving the offsetting entries.
    pub offsetting_account: String,
    /// Currency of the offsetting account.
    pub currency: Option<String>,
}

impl OffsettingDimension {
    /// Creates a dimension definition.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        fieldname: impl Into<String>,
        offsetting_account: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            fieldname: fieldname.into(),
            offsetting_account: offsetting_account.into(),
            currency: None,
        }
    }
}

/// Reads a dimension value from an entry; blank values read as absent.
///
/// `cost_center`, `project` and `finance_book` map to the entry's own tags,
/// anything else to its extra dimensions.
#[must_use]
pub fn dimension_value<'e>(entry: &'e GlEntry, fieldname: &str) -> Option<&'e str> {
    let value = match fieldname {
        "cost_center" => entry.cost_center.as_deref(),
        "project" => entry.project.as_deref(),
        "finance_book" => entry.finance_book.as_deref(),
        other => entry.dimensions.get(other).map(String::as_str),
    };
    value.filter(|v| !v.is_empty())
}

/// Builds one offsetting entry per dimension and original entry.
///
/// Each offset swaps the original's sides and splits the amounts evenly across
/// the dimensions. It is booked in the offsetting account's currency, so its
/// account-currency amounts equal its company amounts. Offsets never carry a
/// party or against-voucher.
#[must_use]
pub fn make_offsetting_entries(
    batch: &LedgerBatch,
    dimensions: &[OffsettingDimension],
) -> Vec<GlEntry> {
    if dimensions.is_empty() {
        return Vec::new();
    }

    let share = Decimal::from(dimensions.len());

    dimensions
        .iter()
        .flat_map(|dimension| {
            batch.entries().iter().map(move |entry| {
                let mut offset = entry.clone();
                offset.id = GlEntryId::new();
                offset.account.clone_from(&dimension.offsetting_account);
                offset.account_currency.clone_from(&dimension.currency);
                offset.map_amounts(|view| {
                    DebitCredit::new(view.credit / share, view.debit / share)
                });
                offset.account_amount = offset.company_amount;
                offset.party = None;
                offset.against_voucher = None;
                offset.remarks = Some(format!(
                    "Offsetting for Accounting Dimension - {}",
                    dimension.name
                ));
                offset
            })
        })
        .collect()
}
