//! Merging of entries that hit the same ledger position.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::batch::LedgerBatch;
use super::entry::GlEntry;

/// Composite identity of a ledger position.
///
/// Absent and empty values compare equal; the voucher type is not part of the
/// key because a batch never mixes vouchers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeKey {
    account: String,
    cost_center: String,
    party_type: String,
    party: String,
    voucher_detail_no: String,
    against_voucher_type: String,
    against_voucher: String,
    project: String,
    finance_book: String,
    voucher_no: String,
    dimensions: Vec<(String, String)>,
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

impl MergeKey {
    /// Builds the key of an entry.
    #[must_use]
    pub fn of(entry: &GlEntry) -> Self {
        let party = entry.party.as_ref();
        let against = entry.against_voucher.as_ref();

        Self {
            account: entry.account.clone(),
            cost_center: text(entry.cost_center.as_deref()),
            party_type: text(party.map(|p| p.party_type.as_str())),
            party: text(party.map(|p| p.party.as_str())),
            voucher_detail_no: text(entry.voucher_detail_no.as_deref()),
            against_voucher_type: text(against.map(|a| a.voucher_type.as_str())),
            against_voucher: text(against.map(|a| a.voucher_no.as_str())),
            project: text(entry.project.as_deref()),
            finance_book: text(entry.finance_book.as_deref()),
            voucher_no: entry.voucher.voucher_no.clone(),
            dimensions: entry
                .dimensions
                .iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect(),
        }
    }
}

/// Collapses entries sharing a [`MergeKey`] into the first one seen.
///
/// All three currency views are summed. Merged entries that round to zero at
/// `precision` are dropped unless `keep_zero` says otherwise. Output order is
/// the order in which each key first appeared.
#[must_use]
pub fn merge_similar_entries(
    batch: &LedgerBatch,
    precision: u32,
    keep_zero: impl Fn(&GlEntry) -> bool,
) -> LedgerBatch {
    let mut merged: Vec<GlEntry> = Vec::with_capacity(batch.len());
    let mut positions: HashMap<MergeKey, usize> = HashMap::with_capacity(batch.len());

    for entry in batch.entries() {
        match positions.entry(MergeKey::of(entry)) {
            Entry::Occupied(slot) => {
                let head = &mut merged[*slot.get()];
                head.company_amount += entry.company_amount;
                head.account_amount += entry.account_amount;
                head.transaction_amount += entry.transaction_amount;
            }
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(entry.clone());
            }
        }
    }

    merged.retain(|e| !e.company_amount.is_zero_at(precision) || keep_zero(e));
    LedgerBatch::new(merged)
}
