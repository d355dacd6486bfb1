//! Operator endpoints: list roles, show one, switch the active role.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State, rejection::PathRejection},
    http::StatusCode,
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{
    MetadataServer, alias_or_not_found,
    response::{error_response, json_response},
};
use crate::error::Error;

#[derive(Debug, Serialize)]
struct RolesList {
    roles: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RoleDetail<'a> {
    arn: &'a str,
    session_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ActivateRequest {
    alias: String,
}

#[derive(Debug, Serialize)]
struct ActivateResponse {
    active_role: String,
}

/// `GET /roles`, or only the active one with `?status=active`
pub async fn list_roles(
    State(server): State<Arc<MetadataServer>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    // The first `status` wins when the flag is repeated
    let status = params
        .iter()
        .find(|(key, _)| key == "status")
        .map(|(_, value)| value.as_str());

    let roles = match status {
        Some("active") => vec![server.active().get()],
        _ => server.roles().roles().to_vec(),
    };

    json_response(StatusCode::OK, &RolesList { roles })
}

/// `GET /roles/{alias}`
pub async fn show_role(
    State(server): State<Arc<MetadataServer>>,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let alias = match alias_or_not_found(path) {
        Ok(alias) => alias,
        Err(response) => return response,
    };

    match server.roles().role(&alias) {
        Ok(role) => json_response(
            StatusCode::OK,
            &RoleDetail {
                arn: role.arn(),
                session_name: role.session_name(),
            },
        ),
        Err(e) => {
            warn!("Show role failed: {}", e);
            error_response(StatusCode::NOT_FOUND, e.to_string())
        }
    }
}

/// `POST /roles` with `{"alias": "..."}`
pub async fn set_active_role(State(server): State<Arc<MetadataServer>>, body: Bytes) -> Response {
    // Unknown aliases are a bad request here, unlike the read endpoints
    match activate(&server, &body) {
        Ok(alias) => {
            info!("Active role set to {}", alias);
            json_response(StatusCode::OK, &ActivateResponse { active_role: alias })
        }
        Err(e) => {
            warn!("Role switch rejected: {}", e);
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

fn activate(server: &MetadataServer, body: &[u8]) -> Result<String, Error> {
    // Only the first JSON value counts, anything after it is ignored
    let request = serde_json::Deserializer::from_slice(body)
        .into_iter::<ActivateRequest>()
        .next()
        .ok_or_else(|| Error::MalformedRequest("EOF".to_string()))?
        .map_err(|e| Error::MalformedRequest(e.to_string()))?;
    server.active().set(&request.alias)?;
    Ok(request.alias)
}
