//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::Request,
    http::{StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// The JSON fields whose values are never written to the logs.
const REDACTED_FIELDS: [&str; 3] = ["senha", "senha_atual", "nova_senha"];

/// The number of characters of a body logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Password fields in JSON request bodies are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let is_json = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    let body_text = if is_json {
        redact_passwords(&body_bytes)
    } else {
        String::from_utf8_lossy(&body_bytes).into_owned()
    };
    log_body(&format!("Received request: {parts:#?}"), &body_text);

    let response = next.run(Request::from_parts(parts, Body::from(body_bytes))).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            Bytes::new()
        }
    };
    log_body(
        &format!("Sending response: {parts:#?}"),
        &String::from_utf8_lossy(&body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

/// Replace the values of password fields in a JSON object with asterisks.
///
/// Bodies that are not valid JSON are returned as is.
fn redact_passwords(body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(mut object)) => {
            for field in REDACTED_FIELDS {
                if let Some(value) = object.get_mut(field) {
                    *value = Value::from("********");
                }
            }

            Value::Object(object).to_string()
        }
        _ => String::from_utf8_lossy(body).into_owned(),
    }
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if it is short enough.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_body(message: &str, body: &str) {
    match truncate(body) {
        Some(start) => {
            tracing::info!("{message}\nbody: {start}...");
            tracing::debug!("Full body: {body:?}");
        }
        None => tracing::info!("{message}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{LOG_BODY_LENGTH_LIMIT, redact_passwords, truncate};

    #[test]
    fn redacts_password_fields() {
        let body = json!({
            "nome": "Ana",
            "senha": "segredo",
            "senha_atual": "antigo",
            "nova_senha": "novo",
        })
        .to_string();

        let redacted: Value = serde_json::from_str(&redact_passwords(body.as_bytes())).unwrap();

        assert_eq!(redacted["nome"], "Ana");
        assert_eq!(redacted["senha"], "********");
        assert_eq!(redacted["senha_atual"], "********");
        assert_eq!(redacted["nova_senha"], "********");
    }

    #[test]
    fn leaves_other_bodies_alone() {
        assert_eq!(redact_passwords(b"senha=abc"), "senha=abc");
        assert_eq!(redact_passwords(b"[1, 2]"), "[1, 2]");
    }

    #[test]
    fn truncates_on_character_boundaries() {
        let body = "ç".repeat(LOG_BODY_LENGTH_LIMIT + 1);

        let start = truncate(&body).unwrap();

        assert_eq!(start.chars().count(), LOG_BODY_LENGTH_LIMIT);
        assert_eq!(truncate("curto"), None);
    }
}
