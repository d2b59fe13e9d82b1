//! Posting error types.
//!
//! Every rejection the engine can produce is a variant here; collaborator
//! failures are wrapped with the operation that was being attempted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use super::entry::{VoucherRef, VoucherType};
use crate::budget::BudgetViolation;
use crate::ports::{BalanceSide, CollaboratorError};

/// Errors that can occur while posting or cancelling a batch.
#[derive(Debug, Error)]
pub enum PostingError {
    // ========== Batch Shape Errors ==========
    /// Nothing to post.
    #[error("Cannot post an empty batch")]
    EmptyBatch,

    /// Entries in one batch belong to different vouchers or companies.
    #[error("All entries of a batch must share one voucher and company: expected {expected}, found {found}")]
    MixedVouchers {
        /// Voucher and company of the first entry.
        expected: String,
        /// The first deviating voucher and company.
        found: String,
    },

    /// Fewer than two entries survived merging.
    #[error(
        "Incorrect number of General Ledger Entries found ({count}). You might have selected a wrong Account in the transaction."
    )]
    InsufficientEntries {
        /// Entries remaining after merging.
        count: usize,
    },

    /// Debits and credits differ by more than the allowance.
    #[error("Debit and Credit not equal for {voucher_type} #{voucher_no}. Difference is {difference}.")]
    DebitCreditMismatch {
        /// Voucher type.
        voucher_type: VoucherType,
        /// Voucher number.
        voucher_no: String,
        /// Debit minus credit at posting precision.
        difference: Decimal,
    },

    // ========== Account Errors ==========
    /// One or more accounts are disabled.
    #[error("Cannot create accounting entries against disabled accounts: {}", .accounts.join(", "))]
    AccountDisabled {
        /// Every disabled account referenced by the batch.
        accounts: Vec<String>,
    },

    /// Account is frozen and the posting is not an authorized adjustment.
    #[error("Account {account} is frozen")]
    AccountFrozen {
        /// The frozen account.
        account: String,
    },

    /// Entries may only be booked to leaf accounts.
    #[error("Account {account} is a group account and cannot be used in transactions")]
    GroupAccount {
        /// The group account.
        account: String,
    },

    /// Entry currency disagrees with the account currency.
    #[error("Accounting entry for {account} can only be made in currency {expected}, not {found}")]
    InvalidAccountCurrency {
        /// The account.
        account: String,
        /// Currency of the account.
        expected: String,
        /// Currency on the entry.
        found: String,
    },

    /// Company-currency account has differing account and company amounts.
    #[error("Account {account} is in company currency {currency}; account and company amounts must match")]
    CurrencyMismatch {
        /// The account.
        account: String,
        /// The company currency.
        currency: String,
    },

    /// Posting would leave an account on the wrong side.
    #[error("Balance for account {account} must always be {required}, posting would make it {balance}")]
    BalanceSignViolation {
        /// The account.
        account: String,
        /// Required balance side.
        required: BalanceSide,
        /// Projected balance (debit - credit).
        balance: Decimal,
    },

    // ========== Period Errors ==========
    /// Accounting period is closed for the document type.
    #[error(
        "You cannot create or cancel any accounting entries for {document_type} in company {company} on {date}: accounting period {period} is closed"
    )]
    PeriodClosed {
        /// Company.
        company: String,
        /// Document type being posted.
        document_type: String,
        /// Posting date.
        date: NaiveDate,
        /// Name of the closed period.
        period: String,
    },

    /// No fiscal year covers the posting date.
    #[error("No fiscal year found for {date} in company {company}")]
    FiscalYearNotFound {
        /// Posting date.
        date: NaiveDate,
        /// Company.
        company: String,
    },

    /// Posting date is on or before the company freezing date.
    #[error("You are not authorized to add or update entries on or before {frozen_till} (posting date {date})")]
    AccountsFrozenTillDate {
        /// Posting date.
        date: NaiveDate,
        /// Freezing date.
        frozen_till: NaiveDate,
    },

    // ========== Budget Errors ==========
    /// A spending limit would be exceeded.
    #[error("Budget exceeded: {0}")]
    BudgetExceeded(BudgetViolation),

    // ========== Voucher State Errors ==========
    /// Nothing stored to cancel.
    #[error("No active ledger entries found for {0}")]
    VoucherNotFound(VoucherRef),

    /// The voucher already has active entries.
    #[error("{0} has already been posted")]
    VoucherAlreadyPosted(VoucherRef),

    // ========== Collaborator Errors ==========
    /// A collaborator call failed.
    #[error("{operation} failed: {source}")]
    Collaborator {
        /// What the engine was doing.
        operation: &'static str,
        /// The underlying failure.
        #[source]
        source: CollaboratorError,
    },
}

impl PostingError {
    /// Wraps a collaborator failure; use with `map_err`.
    pub fn collaborator(operation: &'static str) -> impl FnOnce(CollaboratorError) -> Self {
        move |source| Self::Collaborator { operation, source }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyBatch => "EMPTY_BATCH",
            Self::MixedVouchers { .. } => "MIXED_VOUCHERS",
            Self::InsufficientEntries { .. } => "INSUFFICIENT_ENTRIES",
            Self::DebitCreditMismatch { .. } => "DEBIT_CREDIT_MISMATCH",
            Self::AccountDisabled { .. } => "ACCOUNT_DISABLED",
            Self::AccountFrozen { .. } => "ACCOUNT_FROZEN",
            Self::GroupAccount { .. } => "GROUP_ACCOUNT",
            Self::InvalidAccountCurrency { .. } => "INVALID_ACCOUNT_CURRENCY",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::BalanceSignViolation { .. } => "BALANCE_SIGN_VIOLATION",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::FiscalYearNotFound { .. } => "FISCAL_YEAR_NOT_FOUND",
            Self::AccountsFrozenTillDate { .. } => "ACCOUNTS_FROZEN_TILL_DATE",
            Self::BudgetExceeded(_) => "BUDGET_EXCEEDED",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::VoucherAlreadyPosted(_) => "VOUCHER_ALREADY_POSTED",
            Self::Collaborator { .. } => "COLLABORATOR_FAILURE",
        }
    }

    /// Returns true if the error came from a collaborator rather than a rule.
    #[must_use]
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(self, Self::Collaborator { .. })
    }

    /// Returns true if retrying the same call could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Collaborator {
                source: CollaboratorError::Unavailable(_)
                    | CollaboratorError::Timeout(_)
                    | CollaboratorError::Conflict(_),
                ..
            }
        )
    }
}
