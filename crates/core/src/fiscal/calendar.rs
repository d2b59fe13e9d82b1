//! In-memory fiscal calendar and accounting-period checker.

use chrono::NaiveDate;

use super::period::{AccountingPeriod, FiscalYear};
use crate::ports::{AccountingPeriodChecker, ClosedPeriod, CollaboratorError, FiscalYearLookup};

/// Fiscal years known to the engine.
#[derive(Debug, Clone, Default)]
pub struct FiscalCalendar {
    years: Vec<FiscalYear>,
}

impl FiscalCalendar {
    /// Creates a calendar from fiscal years.
    #[must_use]
    pub fn new(years: Vec<FiscalYear>) -> Self {
        Self { years }
    }
}

impl FiscalYearLookup for FiscalCalendar {
    fn fiscal_year(
        &self,
        date: NaiveDate,
        company: &str,
    ) -> Result<Option<FiscalYear>, CollaboratorError> {
        Ok(self
            .years
            .iter()
            .find(|y| y.applies_to(company) && y.contains_date(date))
            .cloned())
    }
}

/// Accounting periods with per-document-type closing.
#[derive(Debug, Clone, Default)]
pub struct AccountingPeriods {
    periods: Vec<AccountingPeriod>,
}

impl AccountingPeriods {
    /// Creates a checker from periods.
    #[must_use]
    pub fn new(periods: Vec<AccountingPeriod>) -> Self {
        Self { periods }
    }
}

impl AccountingPeriodChecker for AccountingPeriods {
    fn closed_period(
        &self,
        company: &str,
        document_type: &str,
        date: NaiveDate,
    ) -> Result<Option<ClosedPeriod>, CollaboratorError> {
        Ok(self
            .periods
            .iter()
            .find(|p| p.company == company && p.contains_date(date) && p.closes(document_type))
            .map(|p| ClosedPeriod {
                name: p.name.clone(),
                description: format!("{} ({} to {})", p.name, p.start_date, p.end_date),
            }))
    }
}
