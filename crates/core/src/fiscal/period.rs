//! Fiscal year and accounting period types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fiscal year definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYear {
    /// Year name (e.g., "FY2026").
    pub name: String,
    /// Start date of the fiscal year.
    pub start_date: NaiveDate,
    /// End date of the fiscal year.
    pub end_date: NaiveDate,
    /// Companies using this year; empty means every company.
    #[serde(default)]
    pub companies: Vec<String>,
}

impl FiscalYear {
    /// Creates a fiscal year shared by all companies.
    #[must_use]
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start_date,
            end_date,
            companies: Vec::new(),
        }
    }

    /// Restricts the year to one more company.
    #[must_use]
    pub fn for_company(mut self, company: impl Into<String>) -> Self {
        self.companies.push(company.into());
        self
    }

    /// Returns true if the given date falls within this year.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if `company` uses this year.
    #[must_use]
    pub fn applies_to(&self, company: &str) -> bool {
        self.companies.is_empty() || self.companies.iter().any(|c| c == company)
    }
}

/// A period in which selected document types are closed for posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingPeriod {
    /// Period name (e.g., "April 2026").
    pub name: String,
    /// Company the period belongs to.
    pub company: String,
    /// Start date of the period.
    pub start_date: NaiveDate,
    /// End date of the period.
    pub end_date: NaiveDate,
    /// Document type names closed in this period.
    pub closed_documents: Vec<String>,
}

impl AccountingPeriod {
    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if `document_type` may not be posted in this period.
    #[must_use]
    pub fn closes(&self, document_type: &str) -> bool {
        self.closed_documents.iter().any(|d| d == document_type)
    }
}
