mod core;
mod endpoints;
mod status;

pub use core::{Budget, create_budget_table};
pub use endpoints::{
    create_budget_endpoint, delete_budget_endpoint, edit_budget_endpoint, get_budget_endpoint,
    list_budgets_endpoint,
};
pub use status::{BudgetStatus, budget_status_endpoint, get_budget_statuses};
