//! The REST API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/cartoes/{card_id}', use [format_endpoint].

/// The route to list and create cards.
pub const CARDS: &str = "/api/cartoes";
/// The route to get, update or delete a single card.
pub const CARD: &str = "/api/cartoes/{card_id}";

/// The route to list and create expenses.
pub const EXPENSES: &str = "/api/despesas";
/// The route to get, update or delete a single expense.
pub const EXPENSE: &str = "/api/despesas/{expense_id}";
/// The route to upload CSV files of expenses.
pub const IMPORT_EXPENSES: &str = "/api/despesas/importar";

/// The route to list and create income.
pub const INCOMES: &str = "/api/receitas";
/// The route to get, update or delete a single income.
pub const INCOME: &str = "/api/receitas/{income_id}";
/// The route to upload CSV files of income.
pub const IMPORT_INCOMES: &str = "/api/receitas/importar";

/// The route to list invoices.
pub const INVOICES: &str = "/api/faturas";
/// The route to get a single invoice with its expenses.
pub const INVOICE: &str = "/api/faturas/{invoice_id}";
/// The route to register a payment against an invoice.
pub const INVOICE_PAYMENT: &str = "/api/faturas/{invoice_id}/pagamento";

/// The route for the monthly summary.
pub const DASHBOARD: &str = "/api/dashboard";
/// The route for income and expense totals per month.
pub const MONTHLY_HISTORY: &str = "/api/historico/mensal";
/// The route for expense totals per category.
pub const CATEGORY_HISTORY: &str = "/api/historico/categorias";

/// The route to list and create goals.
pub const GOALS: &str = "/api/metas";
/// The route to get, update or delete a single goal.
pub const GOAL: &str = "/api/metas/{goal_id}";
/// The route to add money to a goal.
pub const GOAL_CONTRIBUTIONS: &str = "/api/metas/{goal_id}/contribuicoes";

/// The route to list and create budgets.
pub const BUDGETS: &str = "/api/orcamento";
/// The route to get, update or delete a single budget.
pub const BUDGET: &str = "/api/orcamento/{budget_id}";
/// The route for the spending against each budget in a month.
pub const BUDGET_STATUS: &str = "/api/orcamento/status";

/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categorias";
/// The route to get, update or delete a single category.
pub const CATEGORY: &str = "/api/categorias/{category_id}";

/// The route to list and create reminders.
pub const REMINDERS: &str = "/api/lembretes";
/// The route to get, update or delete a single reminder.
pub const REMINDER: &str = "/api/lembretes/{reminder_id}";
/// The route to list reminders that are not done yet.
pub const PENDING_REMINDERS: &str = "/api/lembretes/pendentes";

/// The route to read the application settings.
pub const SETTINGS: &str = "/api/configuracoes";

/// The route to list and register users.
pub const USERS: &str = "/api/usuarios";
/// The route to get, update or delete a single user.
pub const USER: &str = "/api/usuarios/{user_id}";
/// The route to change a user's password.
pub const USER_PASSWORD: &str = "/api/usuarios/{user_id}/senha";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter starts with a left brace and ends with the next right brace,
/// e.g. '{card_id}' in '/api/cartoes/{card_id}'. Only the first parameter is
/// replaced.
///
/// If no parameter is found in `endpoint_path`, the original path is returned.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let end = endpoint_path[start..]
        .find('}')
        .map(|offset| start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!("{}{id}{}", &endpoint_path[..start], &endpoint_path[end..])
}

#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    #[test]
    fn endpoints_are_valid_uris() {
        let all = [
            endpoints::CARDS,
            endpoints::CARD,
            endpoints::EXPENSES,
            endpoints::EXPENSE,
            endpoints::IMPORT_EXPENSES,
            endpoints::INCOMES,
            endpoints::INCOME,
            endpoints::IMPORT_INCOMES,
            endpoints::INVOICES,
            endpoints::INVOICE,
            endpoints::INVOICE_PAYMENT,
            endpoints::DASHBOARD,
            endpoints::MONTHLY_HISTORY,
            endpoints::CATEGORY_HISTORY,
            endpoints::GOALS,
            endpoints::GOAL,
            endpoints::GOAL_CONTRIBUTIONS,
            endpoints::BUDGETS,
            endpoints::BUDGET,
            endpoints::BUDGET_STATUS,
            endpoints::CATEGORIES,
            endpoints::CATEGORY,
            endpoints::REMINDERS,
            endpoints::REMINDER,
            endpoints::PENDING_REMINDERS,
            endpoints::SETTINGS,
            endpoints::USERS,
            endpoints::USER,
            endpoints::USER_PASSWORD,
        ];

        for endpoint in all {
            let formatted = format_endpoint(endpoint, 1);
            assert!(formatted.parse::<Uri>().is_ok(), "{formatted} is not a valid URI");
        }
    }

    #[test]
    fn replaces_parameter() {
        assert_eq!(format_endpoint("/api/cartoes/{card_id}", 12), "/api/cartoes/12");
        assert_eq!(
            format_endpoint("/api/faturas/{invoice_id}/pagamento", 3),
            "/api/faturas/3/pagamento"
        );
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        assert_eq!(format_endpoint("/api/metas", 1), "/api/metas");
    }
}
