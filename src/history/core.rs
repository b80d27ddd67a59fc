//! Aggregates incomes and expenses into per-month and per-category totals.

use std::collections::BTreeMap;

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::{Error, date_range::DateRange, month::ReferenceMonth};

/// The income and expenses of one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    #[serde(rename = "mes")]
    pub month: ReferenceMonth,
    #[serde(rename = "receitas")]
    pub income: f64,
    #[serde(rename = "despesas")]
    pub expenses: f64,
    /// Income minus expenses.
    #[serde(rename = "saldo")]
    pub balance: f64,
}

/// The sum of the expenses in a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    #[serde(rename = "categoria")]
    pub category: String,
    pub total: f64,
}

fn sum_by_month(
    table: &str,
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<(ReferenceMonth, f64)>, Error> {
    connection
        .prepare(&format!(
            "SELECT strftime('%Y-%m', date) AS month, SUM(amount) FROM {table} \
            WHERE {} \
            GROUP BY month",
            DateRange::sql_condition("date", 1)
        ))?
        .query_map(params![range.start, range.end], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .map(|total| total.map_err(Error::from))
        .collect()
}

/// Get the income, expense and balance totals for each month in `range`
/// that has any income or expenses, oldest first.
pub fn get_monthly_history(
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<MonthlyTotals>, Error> {
    let mut months: BTreeMap<ReferenceMonth, (f64, f64)> = BTreeMap::new();

    for (month, total) in sum_by_month("income", range, connection)? {
        months.entry(month).or_default().0 += total;
    }

    for (month, total) in sum_by_month("expense", range, connection)? {
        months.entry(month).or_default().1 += total;
    }

    Ok(months
        .into_iter()
        .map(|(month, (income, expenses))| MonthlyTotals {
            month,
            income,
            expenses,
            balance: income - expenses,
        })
        .collect())
}

/// Get the expense totals per category in `range`, largest first.
pub fn get_category_totals(
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    connection
        .prepare(&format!(
            "SELECT category, SUM(amount) AS total FROM expense \
            WHERE {} \
            GROUP BY category \
            ORDER BY total DESC, category",
            DateRange::sql_condition("date", 1)
        ))?
        .query_map(params![range.start, range.end], |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?
        .map(|total| total.map_err(Error::from))
        .collect()
}
