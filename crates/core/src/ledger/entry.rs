//! General ledger entry domain types.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;

use chrono::NaiveDate;
use ledgerpost_shared::types::GlEntryId;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Kind of source document a batch is posted for.
///
/// Serialized as its display name ("Sales Invoice"), which is also the
/// document type handed to the accounting-period checker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VoucherType {
    /// Manual journal adjustment.
    JournalEntry,
    /// Incoming or outgoing payment.
    PaymentEntry,
    /// Customer invoice.
    SalesInvoice,
    /// Supplier invoice.
    PurchaseInvoice,
    /// End-of-period closing voucher that moves P&L balances to equity.
    PeriodClosingVoucher,
    /// Revaluation of foreign-currency balances; its imbalance is the gain or loss.
    ExchangeRateRevaluation,
    /// Any other document type, by name.
    Other(String),
}

impl VoucherType {
    /// Returns the document type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::JournalEntry => "Journal Entry",
            Self::PaymentEntry => "Payment Entry",
            Self::SalesInvoice => "Sales Invoice",
            Self::PurchaseInvoice => "Purchase Invoice",
            Self::PeriodClosingVoucher => "Period Closing Voucher",
            Self::ExchangeRateRevaluation => "Exchange Rate Revaluation",
            Self::Other(name) => name,
        }
    }

    /// Returns true for end-of-period closing vouchers.
    ///
    /// Closing vouchers skip budget checks, dimension offsetting, merging
    /// and the party ledger.
    #[must_use]
    pub fn is_period_closing(&self) -> bool {
        matches!(self, Self::PeriodClosingVoucher)
    }

    /// Returns true when the voucher books exchange gain or loss.
    #[must_use]
    pub fn books_exchange_gain_loss(&self) -> bool {
        matches!(self, Self::ExchangeRateRevaluation)
    }
}

impl fmt::Display for VoucherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for VoucherType {
    fn from(name: &str) -> Self {
        match name {
            "Journal Entry" => Self::JournalEntry,
            "Payment Entry" => Self::PaymentEntry,
            "Sales Invoice" => Self::SalesInvoice,
            "Purchase Invoice" => Self::PurchaseInvoice,
            "Period Closing Voucher" => Self::PeriodClosingVoucher,
            "Exchange Rate Revaluation" => Self::ExchangeRateRevaluation,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for VoucherType {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<VoucherType> for String {
    fn from(voucher_type: VoucherType) -> Self {
        voucher_type.as_str().to_string()
    }
}

/// Reference to a source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoucherRef {
    /// Document type.
    pub voucher_type: VoucherType,
    /// Document number.
    pub voucher_no: String,
}

impl VoucherRef {
    /// Creates a voucher reference.
    #[must_use]
    pub fn new(voucher_type: impl Into<VoucherType>, voucher_no: impl Into<String>) -> Self {
        Self {
            voucher_type: voucher_type.into(),
            voucher_no: voucher_no.into(),
        }
    }
}

impl fmt::Display for VoucherRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.voucher_type, self.voucher_no)
    }
}

/// Receivable/payable counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyRef {
    /// Party type, e.g. "Customer" or "Supplier".
    pub party_type: String,
    /// Party identifier.
    pub party: String,
}

impl PartyRef {
    /// Creates a party reference.
    #[must_use]
    pub fn new(party_type: impl Into<String>, party: impl Into<String>) -> Self {
        Self {
            party_type: party_type.into(),
            party: party.into(),
        }
    }
}

/// Debit and credit amounts in one currency view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebitCredit {
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

impl DebitCredit {
    /// Creates a view from explicit debit and credit amounts.
    #[must_use]
    pub const fn new(debit: Decimal, credit: Decimal) -> Self {
        Self { debit, credit }
    }

    /// A debit-only view.
    #[must_use]
    pub const fn debit(amount: Decimal) -> Self {
        Self::new(amount, Decimal::ZERO)
    }

    /// A credit-only view.
    #[must_use]
    pub const fn credit(amount: Decimal) -> Self {
        Self::new(Decimal::ZERO, amount)
    }

    /// Debit minus credit.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.debit - self.credit
    }

    /// The same amounts on the opposite sides.
    #[must_use]
    pub const fn swapped(self) -> Self {
        Self::new(self.credit, self.debit)
    }

    /// Rounds both sides with banker's rounding.
    #[must_use]
    pub fn rounded(self, precision: u32) -> Self {
        Self::new(round(self.debit, precision), round(self.credit, precision))
    }

    /// Returns true if both sides round to zero.
    #[must_use]
    pub fn is_zero_at(&self, precision: u32) -> bool {
        let rounded = self.rounded(precision);
        rounded.debit.is_zero() && rounded.credit.is_zero()
    }

    /// Moves negative amounts to the opposite side.
    ///
    /// Equal negative amounts on both sides flip sign in place.
    #[must_use]
    pub fn normalized(self) -> Self {
        let Self { mut debit, mut credit } = self;

        if debit.is_sign_negative() && credit.is_sign_negative() && debit == credit {
            debit = -debit;
            credit = -credit;
        }
        if debit < Decimal::ZERO {
            credit -= debit;
            debit = Decimal::ZERO;
        }
        if credit < Decimal::ZERO {
            debit -= credit;
            credit = Decimal::ZERO;
        }

        Self::new(debit, credit)
    }
}

impl AddAssign for DebitCredit {
    fn add_assign(&mut self, other: Self) {
        self.debit += other.debit;
        self.credit += other.credit;
    }
}

/// Rounds with banker's rounding (MidpointNearestEven).
#[must_use]
pub fn round(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::MidpointNearestEven)
}

/// A single line of a ledger transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlEntry {
    /// Batch-unique identifier.
    pub id: GlEntryId,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Company the entry is booked in.
    pub company: String,
    /// Source document.
    pub voucher: VoucherRef,
    /// Line of the source document this entry came from.
    pub voucher_detail_no: Option<String>,
    /// Account posted to.
    pub account: String,
    /// Currency of the account; filled from the account master when absent.
    pub account_currency: Option<String>,
    /// Currency of the source document.
    pub transaction_currency: Option<String>,
    /// Amounts in company (reporting) currency.
    pub company_amount: DebitCredit,
    /// Amounts in account currency.
    pub account_amount: DebitCredit,
    /// Amounts in transaction currency.
    pub transaction_amount: DebitCredit,
    /// Rate used to convert transaction currency into company currency.
    pub transaction_exchange_rate: Decimal,
    /// Receivable/payable counterparty.
    pub party: Option<PartyRef>,
    /// Document this entry settles (AR/AP matching).
    pub against_voucher: Option<VoucherRef>,
    /// Cost center tag.
    pub cost_center: Option<String>,
    /// Project tag.
    pub project: Option<String>,
    /// Finance book tag.
    pub finance_book: Option<String>,
    /// Extra accounting dimensions, keyed by dimension field name.
    #[serde(default)]
    pub dimensions: BTreeMap<String, String>,
    /// Opening balance entry.
    pub is_opening: bool,
    /// Advance payment entry.
    pub is_advance: bool,
    /// Cancelled (or a reversal of a cancelled entry).
    pub is_cancelled: bool,
    /// Due date for receivable/payable lines.
    pub due_date: Option<NaiveDate>,
    /// Fiscal year name, stamped when the batch is saved.
    pub fiscal_year: Option<String>,
    /// Free-text remarks.
    pub remarks: Option<String>,
}

impl GlEntry {
    /// Creates an entry with zero amounts.
    #[must_use]
    pub fn new(
        voucher: VoucherRef,
        company: impl Into<String>,
        posting_date: NaiveDate,
        account: impl Into<String>,
    ) -> Self {
        Self {
            id: GlEntryId::new(),
            posting_date,
            company: company.into(),
            voucher,
            voucher_detail_no: None,
            account: account.into(),
            account_currency: None,
            transaction_currency: None,
            company_amount: DebitCredit::default(),
            account_amount: DebitCredit::default(),
            transaction_amount: DebitCredit::default(),
            transaction_exchange_rate: Decimal::ONE,
            party: None,
            against_voucher: None,
            cost_center: None,
            project: None,
            finance_book: None,
            dimensions: BTreeMap::new(),
            is_opening: false,
            is_advance: false,
            is_cancelled: false,
            due_date: None,
            fiscal_year: None,
            remarks: None,
        }
    }

    /// Sets the same amounts on all three currency views.
    #[must_use]
    pub fn with_amounts(mut self, amounts: DebitCredit) -> Self {
        self.company_amount = amounts;
        self.account_amount = amounts;
        self.transaction_amount = amounts;
        self
    }

    /// Debits `amount` in every currency view.
    #[must_use]
    pub fn with_debit(self, amount: Decimal) -> Self {
        self.with_amounts(DebitCredit::debit(amount))
    }

    /// Credits `amount` in every currency view.
    #[must_use]
    pub fn with_credit(self, amount: Decimal) -> Self {
        self.with_amounts(DebitCredit::credit(amount))
    }

    /// Sets the counterparty.
    #[must_use]
    pub fn with_party(mut self, party_type: impl Into<String>, party: impl Into<String>) -> Self {
        self.party = Some(PartyRef::new(party_type, party));
        self
    }

    /// Sets the document this entry settles.
    #[must_use]
    pub fn with_against_voucher(mut self, against: VoucherRef) -> Self {
        self.against_voucher = Some(against);
        self
    }

    /// Sets the cost center.
    #[must_use]
    pub fn with_cost_center(mut self, cost_center: impl Into<String>) -> Self {
        self.cost_center = Some(cost_center.into());
        self
    }

    /// Sets the account currency.
    #[must_use]
    pub fn with_account_currency(mut self, currency: impl Into<String>) -> Self {
        self.account_currency = Some(currency.into());
        self
    }

    /// Tags the entry with an extra accounting dimension.
    #[must_use]
    pub fn with_dimension(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(field.into(), value.into());
        self
    }

    /// Sets the remarks.
    #[must_use]
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    /// Debit in company currency.
    #[must_use]
    pub fn debit(&self) -> Decimal {
        self.company_amount.debit
    }

    /// Credit in company currency.
    #[must_use]
    pub fn credit(&self) -> Decimal {
        self.company_amount.credit
    }

    /// Returns true if the entry carries a non-empty party.
    #[must_use]
    pub fn has_party(&self) -> bool {
        self.party
            .as_ref()
            .is_some_and(|p| !p.party_type.is_empty() && !p.party.is_empty())
    }

    /// Applies `f` to all three currency views.
    pub(crate) fn map_amounts(&mut self, f: impl Fn(DebitCredit) -> DebitCredit) {
        self.company_amount = f(self.company_amount);
        self.account_amount = f(self.account_amount);
        self.transaction_amount = f(self.transaction_amount);
    }
}
