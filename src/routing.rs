//! Application router configuration.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{
    AppState,
    budget::{
        budget_status_endpoint, create_budget_endpoint, delete_budget_endpoint,
        edit_budget_endpoint, get_budget_endpoint, list_budgets_endpoint,
    },
    card::{
        create_card_endpoint, delete_card_endpoint, edit_card_endpoint, get_card_endpoint,
        list_cards_endpoint,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, edit_category_endpoint,
        get_category_endpoint, list_categories_endpoint,
    },
    config::get_settings_endpoint,
    csv_import::{import_expenses_endpoint, import_incomes_endpoint},
    dashboard::dashboard_endpoint,
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, edit_expense_endpoint,
        get_expense_endpoint, list_expenses_endpoint,
    },
    goal::{
        contribute_to_goal_endpoint, create_goal_endpoint, delete_goal_endpoint,
        edit_goal_endpoint, get_goal_endpoint, list_goals_endpoint,
    },
    history::{category_history_endpoint, monthly_history_endpoint},
    income::{
        create_income_endpoint, delete_income_endpoint, edit_income_endpoint,
        get_income_endpoint, list_incomes_endpoint,
    },
    invoice::{get_invoice_endpoint, list_invoices_endpoint, pay_invoice_endpoint},
    reminder::{
        create_reminder_endpoint, delete_reminder_endpoint, edit_reminder_endpoint,
        get_reminder_endpoint, list_pending_reminders_endpoint, list_reminders_endpoint,
    },
    user::{
        change_password_endpoint, create_user_endpoint, delete_user_endpoint, edit_user_endpoint,
        get_user_endpoint, list_users_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::CARDS,
            get(list_cards_endpoint).post(create_card_endpoint),
        )
        .route(
            endpoints::CARD,
            get(get_card_endpoint)
                .put(edit_card_endpoint)
                .delete(delete_card_endpoint),
        )
        .route(
            endpoints::EXPENSES,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(endpoints::IMPORT_EXPENSES, post(import_expenses_endpoint))
        .route(
            endpoints::EXPENSE,
            get(get_expense_endpoint)
                .put(edit_expense_endpoint)
                .delete(delete_expense_endpoint),
        )
        .route(
            endpoints::INCOMES,
            get(list_incomes_endpoint).post(create_income_endpoint),
        )
        .route(endpoints::IMPORT_INCOMES, post(import_incomes_endpoint))
        .route(
            endpoints::INCOME,
            get(get_income_endpoint)
                .put(edit_income_endpoint)
                .delete(delete_income_endpoint),
        )
        .route(endpoints::INVOICES, get(list_invoices_endpoint))
        .route(endpoints::INVOICE, get(get_invoice_endpoint))
        .route(endpoints::INVOICE_PAYMENT, post(pay_invoice_endpoint))
        .route(endpoints::DASHBOARD, get(dashboard_endpoint))
        .route(endpoints::MONTHLY_HISTORY, get(monthly_history_endpoint))
        .route(endpoints::CATEGORY_HISTORY, get(category_history_endpoint))
        .route(
            endpoints::GOALS,
            get(list_goals_endpoint).post(create_goal_endpoint),
        )
        .route(
            endpoints::GOAL,
            get(get_goal_endpoint)
                .put(edit_goal_endpoint)
                .delete(delete_goal_endpoint),
        )
        .route(
            endpoints::GOAL_CONTRIBUTIONS,
            post(contribute_to_goal_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(list_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(endpoints::BUDGET_STATUS, get(budget_status_endpoint))
        .route(
            endpoints::BUDGET,
            get(get_budget_endpoint)
                .put(edit_budget_endpoint)
                .delete(delete_budget_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            get(get_category_endpoint)
                .put(edit_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .route(
            endpoints::REMINDERS,
            get(list_reminders_endpoint).post(create_reminder_endpoint),
        )
        .route(
            endpoints::PENDING_REMINDERS,
            get(list_pending_reminders_endpoint),
        )
        .route(
            endpoints::REMINDER,
            get(get_reminder_endpoint)
                .put(edit_reminder_endpoint)
                .delete(delete_reminder_endpoint),
        )
        .route(endpoints::SETTINGS, get(get_settings_endpoint))
        .route(
            endpoints::USERS,
            get(list_users_endpoint).post(create_user_endpoint),
        )
        .route(
            endpoints::USER,
            get(get_user_endpoint)
                .put(edit_user_endpoint)
                .delete(delete_user_endpoint),
        )
        .route(endpoints::USER_PASSWORD, put(change_password_endpoint))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use crate::{Settings, endpoints, test_utils::must_create_test_server};

    #[tokio::test]
    async fn settings_are_served() {
        let server = must_create_test_server();

        let settings = server.get(endpoints::SETTINGS).await.json::<Settings>();

        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = must_create_test_server();

        server.get("/api/desconhecido").await.assert_status_not_found();
    }
}
