//! Builds the monthly dashboard summary from incomes, expenses, invoices and
//! reminders.

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    date_range::DateRange,
    history::{CategoryTotal, get_category_totals},
    invoice::InvoiceStatus,
    month::ReferenceMonth,
    reminder::count_pending_reminders,
};

/// The figures shown on the dashboard for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(rename = "mes")]
    pub month: ReferenceMonth,
    #[serde(rename = "receitas")]
    pub income: f64,
    #[serde(rename = "despesas")]
    pub expenses: f64,
    /// Income minus expenses.
    #[serde(rename = "saldo")]
    pub balance: f64,
    #[serde(rename = "despesas_por_categoria")]
    pub expenses_by_category: Vec<CategoryTotal>,
    /// The outstanding total of every invoice that has not been paid, across all months.
    #[serde(rename = "faturas_abertas")]
    pub open_invoices: f64,
    #[serde(rename = "lembretes_pendentes")]
    pub pending_reminders: u32,
    #[serde(rename = "limite_gastos")]
    pub spending_limit: Option<f64>,
    /// Whether the month's expenses are over the spending limit.
    #[serde(rename = "limite_excedido")]
    pub limit_exceeded: bool,
}

fn sum_amounts(table: &str, range: DateRange, connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            &format!(
                "SELECT COALESCE(SUM(amount), 0.0) FROM {table} WHERE {}",
                DateRange::sql_condition("date", 1)
            ),
            params![range.start, range.end],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

fn open_invoice_total(connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(total), 0.0) FROM invoice WHERE status != ?1",
            params![InvoiceStatus::Paga],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Compute the dashboard figures for `month`.
///
/// The month's expenses are compared against `spending_limit` when one is set.
pub fn get_dashboard_summary(
    month: ReferenceMonth,
    spending_limit: Option<f64>,
    connection: &Connection,
) -> Result<DashboardSummary, Error> {
    let range = DateRange::new(Some(month.first_day()?), Some(month.last_day()?))?;

    let income = sum_amounts("income", range, connection)?;
    let expenses = sum_amounts("expense", range, connection)?;

    Ok(DashboardSummary {
        month,
        income,
        expenses,
        balance: income - expenses,
        expenses_by_category: get_category_totals(range, connection)?,
        open_invoices: open_invoice_total(connection)?,
        pending_reminders: count_pending_reminders(connection)?,
        spending_limit,
        limit_exceeded: spending_limit.is_some_and(|limit| expenses > limit),
    })
}
