//! Compares each budget's limit with the amount spent in its category.

use axum::{Json, extract::State};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    budget::core::{Budget, BudgetState, get_budgets},
    db::lock_connection,
    extract::ApiQuery,
    month::ReferenceMonth,
    timezone::local_today,
};

/// How much of a budget has been used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    #[serde(flatten)]
    pub budget: Budget,
    /// The sum of the month's expenses in the budget's category.
    #[serde(rename = "gasto")]
    pub spent: f64,
    /// The limit minus the amount spent, negative once the budget is exceeded.
    #[serde(rename = "restante")]
    pub remaining: f64,
    /// The amount spent as a percentage of the limit.
    #[serde(rename = "percentual")]
    pub percent_used: f64,
    #[serde(rename = "excedido")]
    pub exceeded: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetStatusQuery {
    /// Defaults to the current month.
    #[serde(rename = "mes")]
    pub month: Option<ReferenceMonth>,
}

/// A route handler for the status of every budget in a month.
pub async fn budget_status_endpoint(
    State(state): State<BudgetState>,
    ApiQuery(query): ApiQuery<BudgetStatusQuery>,
) -> Result<Json<Vec<BudgetStatus>>, Error> {
    let month = match query.month {
        Some(month) => month,
        None => ReferenceMonth::of(local_today(&state.local_timezone)?),
    };

    let connection = lock_connection(&state.db_connection)?;

    get_budget_statuses(month, &connection).map(Json)
}

/// Get the status of the budgets for `month`, ordered by category.
pub fn get_budget_statuses(
    month: ReferenceMonth,
    connection: &Connection,
) -> Result<Vec<BudgetStatus>, Error> {
    let start = month.first_day()?;
    let end = month.last_day()?;
    let mut spent_statement = connection.prepare(
        "SELECT COALESCE(SUM(amount), 0) FROM expense \
        WHERE category = ?1 AND date BETWEEN ?2 AND ?3",
    )?;

    get_budgets(Some(month), connection)?
        .into_iter()
        .map(|budget| -> Result<BudgetStatus, Error> {
            let spent: f64 =
                spent_statement.query_row(params![budget.category, start, end], |row| row.get(0))?;

            Ok(budget_status(budget, spent))
        })
        .collect()
}

fn budget_status(budget: Budget, spent: f64) -> BudgetStatus {
    let percent_used = if budget.limit > 0.0 {
        spent / budget.limit * 100.0
    } else if spent > 0.0 {
        100.0
    } else {
        0.0
    };

    BudgetStatus {
        remaining: budget.limit - spent,
        exceeded: spent > budget.limit,
        percent_used,
        spent,
        budget,
    }
}
