use std::{future::Future, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Path, rejection::PathRejection},
    http::StatusCode,
    response::Response,
    routing::get,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::aws::RoleSet;
use crate::constants::SECURITY_CREDENTIALS_PATH;
use crate::error::Error;
use crate::state::ActiveRole;

pub mod control;
pub mod metadata;
pub mod response;

/// Serves the control API and the mocked instance metadata endpoints.
#[derive(Debug)]
pub struct MetadataServer {
    active: ActiveRole,
}

impl MetadataServer {
    /// Fails if `default_role` is not part of `roles`
    pub fn new(roles: Arc<RoleSet>, default_role: &str) -> Result<Self, Error> {
        Ok(Self {
            active: ActiveRole::new(roles, default_role)?,
        })
    }

    pub fn active(&self) -> &ActiveRole {
        &self.active
    }

    pub fn roles(&self) -> &RoleSet {
        self.active.roles()
    }

    pub async fn serve<F>(self: Arc<Self>, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        info!("Serving instance metadata on http://{}", addr);
        info!("Active role: {}", self.active.get());

        let app = self.create_router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Metadata server failed")?;

        info!("Metadata server stopped");
        Ok(())
    }

    pub fn create_router(self: Arc<Self>) -> Router {
        Router::new()
            // Control API
            .route(
                "/roles",
                get(control::list_roles).post(control::set_active_role),
            )
            .route("/roles/:alias", get(control::show_role))
            // Instance metadata
            .route(SECURITY_CREDENTIALS_PATH, get(metadata::active_role_name))
            .route(
                &format!("{SECURITY_CREDENTIALS_PATH}/"),
                get(metadata::active_role_name),
            )
            .route(
                &format!("{SECURITY_CREDENTIALS_PATH}/:alias"),
                get(metadata::role_credentials),
            )
            .fallback(not_found)
            .with_state(self)
    }
}

async fn not_found() -> Response {
    response::error_response(StatusCode::NOT_FOUND, "not found")
}

/// A path alias that can't be decoded names no role, so it is a 404 like any unknown alias
fn alias_or_not_found(path: Result<Path<String>, PathRejection>) -> Result<String, Response> {
    match path {
        Ok(Path(alias)) => Ok(alias),
        Err(rejection) => {
            warn!("Rejected role alias: {}", rejection.body_text());
            Err(response::error_response(
                StatusCode::NOT_FOUND,
                format!("unknown role: {}", rejection.body_text()),
            ))
        }
    }
}
