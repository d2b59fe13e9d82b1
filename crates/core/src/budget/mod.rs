//! Budget limits checked before a batch is posted.

pub mod service;
pub mod types;


pub use service::{BudgetLimits, calculate_variance};
pub use types::{BudgetAction, BudgetLimit, BudgetViolation, VarianceResult, VarianceStatus};
