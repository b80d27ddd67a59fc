//! The monthly overview of income, expenses, invoices and reminders.

mod core;
mod endpoint;

pub use core::{DashboardSummary, get_dashboard_summary};
pub use endpoint::dashboard_endpoint;
