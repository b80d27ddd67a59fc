//! Income and expense totals grouped by month or by category.

mod core;
mod endpoints;

pub use core::{CategoryTotal, MonthlyTotals, get_category_totals, get_monthly_history};
pub use endpoints::{category_history_endpoint, monthly_history_endpoint};
