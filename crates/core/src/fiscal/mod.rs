//! Fiscal year and accounting period management.

pub mod calendar;
pub mod period;

pub use calendar::{AccountingPeriods, FiscalCalendar};
pub use period::{AccountingPeriod, FiscalYear};
