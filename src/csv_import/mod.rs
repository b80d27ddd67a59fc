//! Bulk creation of expenses and income from uploaded CSV files.

mod endpoints;
mod parse;

pub use endpoints::{import_expenses_endpoint, import_incomes_endpoint};
