//! Budget limits and variance calculation.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::warn;

use super::types::{
    BudgetAction, BudgetLimit, BudgetViolation, VarianceResult, VarianceStatus,
};
use crate::ledger::LedgerBatch;
use crate::ports::{BudgetValidator, CollaboratorError};

/// Calculate variance between budgeted and actual spend.
///
/// variance = budgeted - actual
///   - Positive variance (under budget) is favorable
///   - Negative variance (over budget) is unfavorable
#[must_use]
pub fn calculate_variance(budgeted: Decimal, actual: Decimal) -> VarianceResult {
    let variance = budgeted - actual;

    let status = match variance.cmp(&Decimal::ZERO) {
        std::cmp::Ordering::Greater => VarianceStatus::Favorable,
        std::cmp::Ordering::Less => VarianceStatus::Unfavorable,
        std::cmp::Ordering::Equal => VarianceStatus::OnBudget,
    };

    let variance_percent = if budgeted.is_zero() {
        Decimal::ZERO
    } else {
        (variance / budgeted * Decimal::ONE_HUNDRED).round_dp(2)
    };

    let utilization_percent = if budgeted.is_zero() {
        Decimal::ZERO
    } else {
        (actual / budgeted * Decimal::ONE_HUNDRED).round_dp(2)
    };

    VarianceResult {
        budgeted,
        actual,
        variance,
        variance_percent,
        utilization_percent,
        status,
    }
}

type SpendKey = (String, String, Option<String>);

/// Budget validator over a fixed set of limits and spend-to-date figures.
///
/// Only the debit side of a batch consumes budget; credits to a controlled
/// account are ignored.
#[derive(Debug, Clone, Default)]
pub struct BudgetLimits {
    limits: Vec<BudgetLimit>,
    spent: HashMap<SpendKey, Decimal>,
}

impl BudgetLimits {
    /// Creates an empty validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a limit. Limits are checked in insertion order.
    #[must_use]
    pub fn with_limit(mut self, limit: BudgetLimit) -> Self {
        self.limits.push(limit);
        self
    }

    /// Records spend already booked against an account (and cost center).
    #[must_use]
    pub fn with_spent(
        mut self,
        company: impl Into<String>,
        account: impl Into<String>,
        cost_center: Option<&str>,
        amount: Decimal,
    ) -> Self {
        let key = (company.into(), account.into(), cost_center.map(str::to_string));
        *self.spent.entry(key).or_default() += amount;
        self
    }

    fn spent_for(&self, limit: &BudgetLimit) -> Decimal {
        self.spent
            .iter()
            .filter(|((company, account, cost_center), _)| {
                *company == limit.company
                    && *account == limit.account
                    && (limit.cost_center.is_none() || *cost_center == limit.cost_center)
            })
            .map(|(_, amount)| *amount)
            .sum()
    }

    fn batch_spend(batch: &LedgerBatch, limit: &BudgetLimit) -> Decimal {
        batch
            .entries()
            .iter()
            .filter(|e| e.company == limit.company && e.account == limit.account)
            .filter(|e| limit.cost_center.is_none() || e.cost_center == limit.cost_center)
            .map(|e| e.company_amount.net())
            .sum()
    }
}

impl BudgetValidator for BudgetLimits {
    fn check_budget(
        &self,
        batch: &LedgerBatch,
    ) -> Result<Option<BudgetViolation>, CollaboratorError> {
        for limit in &self.limits {
            let spend = Self::batch_spend(batch, limit);
            if spend <= Decimal::ZERO {
                continue;
            }

            let result = calculate_variance(limit.amount, self.spent_for(limit) + spend);
            if result.status != VarianceStatus::Unfavorable {
                continue;
            }

            let violation = BudgetViolation {
                budget_name: limit.name.clone(),
                account: limit.account.clone(),
                cost_center: limit.cost_center.clone(),
                budget: result.budgeted,
                actual: result.actual,
                variance: result.variance,
            };

            match limit.action {
                BudgetAction::Stop => return Ok(Some(violation)),
                BudgetAction::Warn => warn!(%violation, "budget exceeded"),
            }
        }
        Ok(None)
    }
}
