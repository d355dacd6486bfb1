use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::constants::{JSON_CONTENT_TYPE, SERVER_HEADER};

/// JSON body with the headers the metadata service sends
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => json_bytes(status, bytes),
        Err(e) => render_failure(&e),
    }
}

/// Same as [`json_response`], indented with two spaces
pub fn pretty_json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec_pretty(body) {
        Ok(bytes) => json_bytes(status, bytes),
        Err(e) => render_failure(&e),
    }
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let message: String = message.into();
    json_response(status, &json!({ "error": message }))
}

fn json_bytes(status: StatusCode, bytes: Vec<u8>) -> Response {
    let mut response = (status, bytes).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_CONTENT_TYPE),
    );
    headers.insert(header::SERVER, HeaderValue::from_static(SERVER_HEADER));
    response
}

fn render_failure(e: &serde_json::Error) -> Response {
    error!("Failed to render response: {}", e);
    let body = json!({ "error": format!("failed to render: {e}") }).to_string();
    json_bytes(StatusCode::INTERNAL_SERVER_ERROR, body.into_bytes())
}
