//! Receivable/payable projection of party-bearing entries.

use std::collections::HashMap;

use chrono::NaiveDate;
use ledgerpost_shared::types::PartyLedgerEntryId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::batch::LedgerBatch;
use super::entry::{PartyRef, VoucherRef};
use crate::ports::{AccountDetails, AccountType};

/// One receivable or payable movement for a party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyLedgerEntry {
    /// Identifier.
    pub id: PartyLedgerEntryId,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Company.
    pub company: String,
    /// Receivable or payable account.
    pub account: String,
    /// Classification of the account; `None` for other party accounts.
    pub account_type: Option<AccountType>,
    /// Counterparty.
    pub party: PartyRef,
    /// Source document.
    pub voucher: VoucherRef,
    /// Line of the source document.
    pub voucher_detail_no: Option<String>,
    /// Document being settled; the entry's own voucher when none is given.
    pub against_voucher: VoucherRef,
    /// Account currency.
    pub account_currency: Option<String>,
    /// Signed amount in company currency.
    pub amount: Decimal,
    /// Signed amount in account currency.
    pub amount_in_account_currency: Decimal,
    /// Superseded by a cancellation.
    pub delinked: bool,
    /// Remarks copied from the ledger entry.
    pub remarks: Option<String>,
    /// Cost center.
    pub cost_center: Option<String>,
    /// Finance book.
    pub finance_book: Option<String>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
}

/// Derives party-ledger entries for every entry carrying a party.
///
/// Amounts are debit - credit for receivable (and unclassified) accounts and
/// credit - debit for payable accounts. With `cancel`, amounts are negated
/// and the rows are marked delinked.
#[must_use]
pub fn derive_party_ledger(
    batch: &LedgerBatch,
    accounts: &HashMap<String, AccountDetails>,
    cancel: bool,
) -> Vec<PartyLedgerEntry> {
    batch
        .entries()
        .iter()
        .filter(|e| e.has_party())
        .filter_map(|entry| {
            let party = entry.party.clone()?;
            let details = accounts.get(&entry.account);
            let account_type = details.and_then(|d| d.account_type);

            let signed = |net: Decimal| {
                let amount = if account_type == Some(AccountType::Payable) { -net } else { net };
                if cancel { -amount } else { amount }
            };

            Some(PartyLedgerEntry {
                id: PartyLedgerEntryId::new(),
                posting_date: entry.posting_date,
                company: entry.company.clone(),
                account: entry.account.clone(),
                account_type,
                party,
                voucher: entry.voucher.clone(),
                voucher_detail_no: entry.voucher_detail_no.clone(),
                against_voucher: entry
                    .against_voucher
                    .clone()
                    .unwrap_or_else(|| entry.voucher.clone()),
                account_currency: entry
                    .account_currency
                    .clone()
                    .or_else(|| details.and_then(|d| d.currency.clone())),
                amount: signed(entry.company_amount.net()),
                amount_in_account_currency: signed(entry.account_amount.net()),
                delinked: cancel,
                remarks: entry.remarks.clone(),
                cost_center: entry.cost_center.clone(),
                finance_book: entry.finance_book.clone(),
                due_date: entry.due_date,
            })
        })
        .collect()
}
