//! Budget data types.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What to do when a limit is exceeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetAction {
    /// Reject the posting.
    #[default]
    Stop,
    /// Log a warning and let the posting through.
    Warn,
}

/// A spending limit on an account, optionally narrowed to a cost center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLimit {
    /// Budget name.
    pub name: String,
    /// Company the budget belongs to.
    pub company: String,
    /// Expense account under control.
    pub account: String,
    /// Cost center the limit applies to; `None` covers every cost center.
    pub cost_center: Option<String>,
    /// Budgeted amount in company currency.
    pub amount: Decimal,
    /// Action when the limit is exceeded.
    #[serde(default)]
    pub action: BudgetAction,
}

impl BudgetLimit {
    /// Creates a stopping limit.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        company: impl Into<String>,
        account: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            account: account.into(),
            cost_center: None,
            amount,
            action: BudgetAction::Stop,
        }
    }

    /// Narrows the limit to one cost center.
    #[must_use]
    pub fn for_cost_center(mut self, cost_center: impl Into<String>) -> Self {
        self.cost_center = Some(cost_center.into());
        self
    }

    /// Sets the action taken on overrun.
    #[must_use]
    pub const fn with_action(mut self, action: BudgetAction) -> Self {
        self.action = action;
        self
    }
}

/// Variance calculation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceResult {
    /// Budgeted amount.
    pub budgeted: Decimal,
    /// Actual amount.
    pub actual: Decimal,
    /// Variance amount (budgeted - actual).
    pub variance: Decimal,
    /// Variance percentage.
    pub variance_percent: Decimal,
    /// Utilization percentage.
    pub utilization_percent: Decimal,
    /// Variance status.
    pub status: VarianceStatus,
}

/// Variance status classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceStatus {
    /// Under budget.
    Favorable,
    /// Over budget.
    Unfavorable,
    /// Exactly on budget.
    OnBudget,
}

/// A limit that a batch would push over budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetViolation {
    /// Budget name.
    pub budget_name: String,
    /// Offending account.
    pub account: String,
    /// Offending cost center.
    pub cost_center: Option<String>,
    /// Budgeted amount.
    pub budget: Decimal,
    /// Actual spend including the batch.
    pub actual: Decimal,
    /// Budget minus actual; negative when exceeded.
    pub variance: Decimal,
}

impl fmt::Display for BudgetViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for account {}", self.budget_name, self.account)?;
        if let Some(cost_center) = &self.cost_center {
            write!(f, " and cost center {cost_center}")?;
        }
        write!(
            f,
            " is {}, actual would be {} (exceeded by {})",
            self.budget,
            self.actual,
            -self.variance
        )
    }
}
