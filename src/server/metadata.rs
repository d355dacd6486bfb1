//! The two instance metadata paths SDK credential providers poll.

use std::sync::Arc;

use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error, warn};

use super::{
    MetadataServer, alias_or_not_found,
    response::{error_response, pretty_json_response},
};
use crate::aws::Credentials;
use crate::constants::{LAST_UPDATED, SERVER_HEADER};

/// Credentials document as served by the EC2 metadata service
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CredentialsDocument<'a> {
    code: &'static str,
    last_updated: &'static str,
    #[serde(rename = "Type")]
    kind: &'static str,
    access_key_id: &'a str,
    secret_access_key: &'a str,
    token: &'a str,
    expiration: String,
}

impl<'a> From<&'a Credentials> for CredentialsDocument<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            code: "Success",
            last_updated: LAST_UPDATED,
            kind: "AWS-HMAC",
            access_key_id: &credentials.access_key_id,
            secret_access_key: &credentials.secret_access_key,
            token: &credentials.session_token,
            expiration: credentials.expiration_string(),
        }
    }
}

/// `GET .../security-credentials/`: the bare active alias
pub async fn active_role_name(State(server): State<Arc<MetadataServer>>) -> Response {
    let alias = server.active().get();
    debug!("Reporting instance role {}", alias);

    ([(header::SERVER, SERVER_HEADER)], alias).into_response()
}

/// `GET .../security-credentials/{alias}`
pub async fn role_credentials(
    State(server): State<Arc<MetadataServer>>,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let alias = match alias_or_not_found(path) {
        Ok(alias) => alias,
        Err(response) => return response,
    };

    let role = match server.roles().role(&alias) {
        Ok(role) => role,
        Err(e) => {
            warn!("Credentials requested for {}: {}", alias, e);
            return error_response(StatusCode::NOT_FOUND, e.to_string());
        }
    };

    match role.credentials().await {
        Ok(credentials) => {
            pretty_json_response(StatusCode::OK, &CredentialsDocument::from(&credentials))
        }
        Err(e) => {
            error!("Credentials for {} unavailable: {}", alias, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
