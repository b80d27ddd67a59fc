//! Request extractors that reject malformed input with [Error] so that clients
//! always receive the JSON error body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::Error;

/// Like [axum::Json], but rejects with [Error::InvalidRequestBody] (400 Bad Request).
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// Like [axum::extract::Query], but rejects with [Error::InvalidQuery] (400 Bad Request).
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::json;

    use super::ApiJson;

    #[derive(Debug, Deserialize)]
    struct Body {
        valor: f64,
    }

    async fn echo(ApiJson(body): ApiJson<Body>) -> Json<f64> {
        Json(body.valor)
    }

    #[tokio::test]
    async fn missing_field_is_bad_request() {
        let server = TestServer::try_new(Router::new().route("/", post(echo)))
            .expect("Could not create test server.");

        let response = server.post("/").json(&json!({ "descricao": "x" })).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<serde_json::Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn valid_body_is_extracted() {
        let server = TestServer::try_new(Router::new().route("/", post(echo)))
            .expect("Could not create test server.");

        let response = server.post("/").json(&json!({ "valor": 1.5 })).await;

        response.assert_status_ok();
        assert_eq!(response.json::<f64>(), 1.5);
    }
}
