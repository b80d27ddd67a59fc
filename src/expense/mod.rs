mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod installments;
mod list_endpoint;

pub use core::{
    EXPENSE_COLUMNS, Expense, ExpenseId, ExpenseState, ExpenseStatus, NewExpense, PaymentMethod,
    create_expense, create_expense_table, map_row_to_expense,
};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use edit_endpoint::edit_expense_endpoint;
pub use installments::{CardPurchase, post_card_purchase};
pub use list_endpoint::{get_expense_endpoint, list_expenses_endpoint};
