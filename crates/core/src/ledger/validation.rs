//! Business rule validation for posting.
//!
//! Every check here works on data already fetched by the engine; balance
//! lookups are passed in as closures.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::batch::LedgerBatch;
use super::entry::{GlEntry, round};
use super::error::PostingError;
use crate::ports::{AccountDetails, BalanceSide, CompanySettings};

/// Period name reported when books-closed blocks a posting.
pub const BOOKS_CLOSED_PERIOD: &str = "books closed";

fn describe(entry: &GlEntry) -> String {
    format!("{} ({})", entry.voucher, entry.company)
}

/// Ensures the batch is non-empty and every entry shares one voucher and company.
///
/// Returns the first entry, which carries the batch's voucher, company and
/// posting date.
///
/// # Errors
///
/// Returns `EmptyBatch` or `MixedVouchers`.
pub fn validate_single_voucher(batch: &LedgerBatch) -> Result<&GlEntry, PostingError> {
    let first = batch.entries().first().ok_or(PostingError::EmptyBatch)?;

    if let Some(other) = batch
        .entries()
        .iter()
        .find(|e| e.voucher != first.voucher || e.company != first.company)
    {
        return Err(PostingError::MixedVouchers {
            expected: describe(first),
            found: describe(other),
        });
    }
    Ok(first)
}

/// Rejects the batch if any referenced account is disabled.
///
/// Every disabled account is reported once, in order of first appearance.
pub fn validate_disabled_accounts(
    batch: &LedgerBatch,
    accounts: &HashMap<String, AccountDetails>,
) -> Result<(), PostingError> {
    let mut seen = HashSet::new();
    let disabled: Vec<String> = batch
        .entries()
        .iter()
        .map(|e| e.account.as_str())
        .filter(|name| accounts.get(*name).is_some_and(|a| a.is_disabled))
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect();

    if disabled.is_empty() {
        Ok(())
    } else {
        Err(PostingError::AccountDisabled { accounts: disabled })
    }
}

/// Checks an entry against its account master and fills in its currency.
///
/// Frozen accounts pass only with `adv_adj`. A missing account currency is
/// taken from the account, or the company currency when the account has none.
pub fn validate_account_details(
    entry: &mut GlEntry,
    account: &AccountDetails,
    company_currency: &str,
    adv_adj: bool,
    precision: u32,
) -> Result<(), PostingError> {
    if account.is_group {
        return Err(PostingError::GroupAccount {
            account: entry.account.clone(),
        });
    }
    if account.is_frozen && !adv_adj {
        return Err(PostingError::AccountFrozen {
            account: entry.account.clone(),
        });
    }

    let expected = account.currency.as_deref().unwrap_or(company_currency);
    match entry.account_currency.as_deref() {
        Some(found) if found != expected => {
            return Err(PostingError::InvalidAccountCurrency {
                account: entry.account.clone(),
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Some(_) => {}
        None => entry.account_currency = Some(expected.to_string()),
    }

    if expected == company_currency
        && entry.account_amount.rounded(precision) != entry.company_amount.rounded(precision)
    {
        return Err(PostingError::CurrencyMismatch {
            account: entry.account.clone(),
            currency: company_currency.to_string(),
        });
    }
    Ok(())
}

/// Checks accounts with a required balance side against their projected balance.
///
/// `current_balance` returns the stored debit - credit balance of an account.
pub fn validate_balance_sign<F>(
    batch: &LedgerBatch,
    accounts: &HashMap<String, AccountDetails>,
    precision: u32,
    current_balance: F,
) -> Result<(), PostingError>
where
    F: Fn(&str) -> Result<Decimal, PostingError>,
{
    let mut movement: Vec<(&str, BalanceSide, Decimal)> = Vec::new();
    for entry in batch.entries() {
        let Some(required) = accounts.get(&entry.account).and_then(|a| a.balance_must_be) else {
            continue;
        };
        match movement.iter_mut().find(|(name, _, _)| *name == entry.account) {
            Some((_, _, net)) => *net += entry.company_amount.net(),
            None => movement.push((entry.account.as_str(), required, entry.company_amount.net())),
        }
    }

    for (account, required, net) in movement {
        let balance = round(current_balance(account)? + net, precision);
        let violated = match required {
            BalanceSide::Debit => balance < Decimal::ZERO,
            BalanceSide::Credit => balance > Decimal::ZERO,
        };
        if violated {
            return Err(PostingError::BalanceSignViolation {
                account: account.to_string(),
                required,
                balance,
            });
        }
    }
    Ok(())
}

/// Rejects postings dated on or before the company freezing date unless `adv_adj`.
pub fn validate_freezing_date(
    posting_date: NaiveDate,
    settings: &CompanySettings,
    adv_adj: bool,
) -> Result<(), PostingError> {
    match settings.accounts_frozen_till {
        Some(frozen_till) if !adv_adj && posting_date <= frozen_till => {
            Err(PostingError::AccountsFrozenTillDate {
                date: posting_date,
                frozen_till,
            })
        }
        _ => Ok(()),
    }
}

/// Rejects postings inside closed books.
///
/// Opening batches and period closing vouchers are exempt.
pub fn validate_books_closed(
    batch: &LedgerBatch,
    settings: &CompanySettings,
) -> Result<(), PostingError> {
    let (Some(voucher), Some(date)) = (batch.voucher(), batch.posting_date()) else {
        return Ok(());
    };
    if batch.is_opening() || voucher.voucher_type.is_period_closing() {
        return Ok(());
    }

    match settings.books_closed_till {
        Some(closed_till) if date <= closed_till => Err(PostingError::PeriodClosed {
            company: settings.name.clone(),
            document_type: voucher.voucher_type.to_string(),
            date,
            period: BOOKS_CLOSED_PERIOD.to_string(),
        }),
        _ => Ok(()),
    }
}
