//! Collaborator contracts required by the posting engine.
//!
//! Each contract is a narrow capability so a deployment can omit the ones
//! it does not need (no budget enforcement, no party ledger, ...). All calls
//! are synchronous and fail with [`CollaboratorError`]; the engine never
//! retries them.

pub mod memory;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::budget::BudgetViolation;
use crate::dimension::OffsettingDimension;
use crate::fiscal::FiscalYear;
use crate::ledger::{GlEntry, LedgerBatch, PartyLedgerEntry, VoucherRef};

pub use memory::{ChartOfAccounts, InMemoryLedgerStore};

/// Failure reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The backing system could not be reached.
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// The call did not complete in time.
    #[error("timed out: {0}")]
    Timeout(String),
    /// The write conflicts with existing data.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The storage layer failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Receivable/payable classification of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Amounts owed to the company.
    Receivable,
    /// Amounts the company owes.
    Payable,
}

/// Side an account balance is required to stay on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalanceSide {
    /// Balance must never go below zero (debit - credit >= 0).
    Debit,
    /// Balance must never go above zero (debit - credit <= 0).
    Credit,
}

impl std::fmt::Display for BalanceSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debit => f.write_str("Debit"),
            Self::Credit => f.write_str("Credit"),
        }
    }
}

/// Account master data needed for posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDetails {
    /// Account name.
    pub name: String,
    /// Owning company.
    pub company: String,
    /// Account currency; `None` means the company currency.
    pub currency: Option<String>,
    /// Receivable/payable classification.
    pub account_type: Option<AccountType>,
    /// Group (non-leaf) account.
    pub is_group: bool,
    /// Frozen for regular posting.
    pub is_frozen: bool,
    /// Disabled.
    pub is_disabled: bool,
    /// Required balance side.
    pub balance_must_be: Option<BalanceSide>,
    /// Account used to recognise exchange gain or loss.
    pub is_exchange_gain_loss: bool,
}

impl AccountDetails {
    /// Creates an enabled leaf account with no constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            currency: None,
            account_type: None,
            is_group: false,
            is_frozen: false,
            is_disabled: false,
            balance_must_be: None,
            is_exchange_gain_loss: false,
        }
    }
}

/// Company-level posting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySettings {
    /// Company name.
    pub name: String,
    /// Reporting currency.
    pub default_currency: String,
    /// Account receiving round-off differences.
    pub round_off_account: Option<String>,
    /// Cost center for round-off entries.
    pub round_off_cost_center: Option<String>,
    /// Entries dated on or before this date are frozen.
    pub accounts_frozen_till: Option<NaiveDate>,
    /// Books are closed on or before this date (last period closing).
    pub books_closed_till: Option<NaiveDate>,
}

impl CompanySettings {
    /// Creates settings with only a currency configured.
    #[must_use]
    pub fn new(name: impl Into<String>, default_currency: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_currency: default_currency.into(),
            round_off_account: None,
            round_off_cost_center: None,
            accounts_frozen_till: None,
            books_closed_till: None,
        }
    }
}

/// A closed accounting period that blocks a document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedPeriod {
    /// Period name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

/// Resolves account master data.
#[cfg_attr(test, mockall::automock)]
pub trait AccountLookup {
    /// Returns the account by name.
    fn account(&self, name: &str) -> Result<AccountDetails, CollaboratorError>;
}

/// Resolves company settings.
#[cfg_attr(test, mockall::automock)]
pub trait CompanySettingsLookup {
    /// Returns the settings of `company`.
    fn company_settings(&self, company: &str) -> Result<CompanySettings, CollaboratorError>;
}

/// Reports accounting periods closed for a document type.
#[cfg_attr(test, mockall::automock)]
pub trait AccountingPeriodChecker {
    /// Returns the closed period covering `date`, if `document_type` is closed in it.
    fn closed_period(
        &self,
        company: &str,
        document_type: &str,
        date: NaiveDate,
    ) -> Result<Option<ClosedPeriod>, CollaboratorError>;
}

/// Resolves fiscal years.
#[cfg_attr(test, mockall::automock)]
pub trait FiscalYearLookup {
    /// Returns the fiscal year containing `date` for `company`.
    fn fiscal_year(
        &self,
        date: NaiveDate,
        company: &str,
    ) -> Result<Option<FiscalYear>, CollaboratorError>;
}

/// Append-only storage for general ledger entries.
///
/// `save_batch` and `cancel_and_save` must each commit all-or-nothing.
#[cfg_attr(test, mockall::automock)]
pub trait EntryStore {
    /// Persists every entry of one batch atomically.
    fn save_batch(&self, entries: &[GlEntry]) -> Result<(), CollaboratorError>;

    /// Returns all stored entries for a voucher, cancelled ones included.
    fn entries_for_voucher(&self, voucher: &VoucherRef) -> Result<Vec<GlEntry>, CollaboratorError>;

    /// Flags every stored entry of a voucher as cancelled.
    fn mark_cancelled(&self, voucher: &VoucherRef) -> Result<(), CollaboratorError>;

    /// Marks a voucher cancelled and persists `entries` as one unit.
    fn cancel_and_save(
        &self,
        voucher: &VoucherRef,
        entries: &[GlEntry],
    ) -> Result<(), CollaboratorError>;

    /// Current company-currency balance (debit - credit) of an account.
    fn account_balance(&self, account: &str, company: &str) -> Result<Decimal, CollaboratorError>;
}

/// Storage for the receivable/payable projection.
#[cfg_attr(test, mockall::automock)]
pub trait PartyLedgerStore {
    /// Persists party-ledger entries.
    fn save_party_entries(&self, entries: &[PartyLedgerEntry]) -> Result<(), CollaboratorError>;

    /// Returns all party-ledger entries recorded for a voucher.
    fn party_entries_for_voucher(
        &self,
        voucher: &VoucherRef,
    ) -> Result<Vec<PartyLedgerEntry>, CollaboratorError>;

    /// Delinks every party-ledger entry of a voucher.
    fn mark_delinked(&self, voucher: &VoucherRef) -> Result<(), CollaboratorError>;
}

/// Checks a batch against spending limits.
#[cfg_attr(test, mockall::automock)]
pub trait BudgetValidator {
    /// Returns the first violated limit, if any.
    fn check_budget(
        &self,
        batch: &LedgerBatch,
    ) -> Result<Option<BudgetViolation>, CollaboratorError>;
}

/// Supplies dimensions that must balance independently.
#[cfg_attr(test, mockall::automock)]
pub trait DimensionProvider {
    /// Returns the dimensions needing offsetting entries for this batch.
    fn offsetting_dimensions(
        &self,
        batch: &LedgerBatch,
        company: &str,
    ) -> Result<Vec<OffsettingDimension>, CollaboratorError>;
}
