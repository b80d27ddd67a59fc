//! Defines the route handler for the dashboard.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    dashboard::core::{DashboardSummary, get_dashboard_summary},
    db::lock_connection,
    extract::ApiQuery,
    month::ReferenceMonth,
    timezone::local_today,
};

/// State needed for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    pub spending_limit: Option<f64>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.settings.timezone.clone(),
            spending_limit: state.settings.spending_limit,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    /// Defaults to the current month in the local timezone.
    #[serde(rename = "mes")]
    pub month: Option<ReferenceMonth>,
}

/// A route handler for the dashboard figures of a month.
pub async fn dashboard_endpoint(
    State(state): State<DashboardState>,
    ApiQuery(query): ApiQuery<DashboardQuery>,
) -> Result<Json<DashboardSummary>, Error> {
    let month = match query.month {
        Some(month) => month,
        None => ReferenceMonth::of(local_today(&state.local_timezone)?),
    };
    let connection = lock_connection(&state.db_connection)?;

    get_dashboard_summary(month, state.spending_limit, &connection).map(Json)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{dashboard::DashboardSummary, endpoints, test_utils::must_create_test_server};

    #[tokio::test]
    async fn reports_requested_month() {
        let server = must_create_test_server();
        server
            .post(endpoints::INCOMES)
            .json(&json!({
                "descricao": "Freela",
                "data": "2025-06-12",
                "valor": 800.0,
                "categoria": "Trabalho",
            }))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post(endpoints::REMINDERS)
            .json(&json!({ "titulo": "Pagar IPTU", "data": "2025-06-20" }))
            .await
            .assert_status(StatusCode::CREATED);

        let summary = server
            .get(endpoints::DASHBOARD)
            .add_query_param("mes", "2025-06")
            .await
            .json::<DashboardSummary>();

        assert_eq!(summary.month.to_string(), "2025-06");
        assert_eq!(summary.income, 800.0);
        assert_eq!(summary.balance, 800.0);
        assert_eq!(summary.pending_reminders, 1);
    }

    #[tokio::test]
    async fn defaults_to_current_month() {
        let server = must_create_test_server();

        server.get(endpoints::DASHBOARD).await.assert_status_ok();
    }

    #[tokio::test]
    async fn malformed_month_is_bad_request() {
        let server = must_create_test_server();

        server
            .get(endpoints::DASHBOARD)
            .add_query_param("mes", "2025-13")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
