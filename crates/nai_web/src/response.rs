use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nai_core::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

pub fn status_for(error: &Error) -> StatusCode {
    if error.is_validation() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn body(field: &str, value: Value, error: Option<String>) -> Json<Value> {
    let mut map = Map::new();
    map.insert(field.to_string(), value);
    map.insert(
        "error".to_string(),
        error.map(Value::String).unwrap_or(Value::Null),
    );
    Json(Value::Object(map))
}

/// Failure envelope: `{ <field>: null, error: <message> }`.
pub fn failure(field: &str, error: Error) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!("❌ {} failed: {}", field, error);
    } else {
        tracing::warn!("⚠️ Rejected {} request: {}", field, error);
    }
    (status, body(field, Value::Null, Some(error.to_string()))).into_response()
}

/// Every endpoint answers with `{ <field>: <value>, error: null }` on
/// success and the failure envelope otherwise.
pub fn envelope<T: Serialize>(field: &str, result: Result<T>) -> Response {
    match result.and_then(|value| serde_json::to_value(value).map_err(Error::from)) {
        Ok(value) => (StatusCode::OK, body(field, value, None)).into_response(),
        Err(e) => failure(field, e),
    }
}

/// Unwraps a JSON body, turning malformed payloads into a 400 envelope.
pub fn json_body<T>(field: &str, payload: std::result::Result<Json<T>, JsonRejection>) -> std::result::Result<T, Response> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(failure(
            field,
            Error::InvalidInput(format!("Invalid request body: {}", rejection.body_text())),
        )),
    }
}
