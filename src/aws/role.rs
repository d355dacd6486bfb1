use std::{fmt, sync::Arc, time::Duration};

use tokio::time;
use tracing::info;

use super::{AssumeRole, Credentials, cache::CredentialCache};
use crate::constants::{DEFAULT_ASSUME_TIMEOUT, DEFAULT_REFRESH_MARGIN};
use crate::error::{Error, Result};

/// Tuning shared by every role of a set
#[derive(Debug, Clone, Copy)]
pub struct RoleOptions {
    pub assume_timeout: Duration,
    pub refresh_margin: Duration,
}

impl Default for RoleOptions {
    fn default() -> Self {
        Self {
            assume_timeout: DEFAULT_ASSUME_TIMEOUT,
            refresh_margin: DEFAULT_REFRESH_MARGIN,
        }
    }
}

/// An assumable IAM role and its cached credentials.
pub struct Role {
    arn: String,
    session_name: String,
    assume_timeout: Duration,
    provider: Arc<dyn AssumeRole>,
    cache: CredentialCache,
}

impl Role {
    pub fn new(
        arn: impl Into<String>,
        session_name: impl Into<String>,
        provider: Arc<dyn AssumeRole>,
        options: RoleOptions,
    ) -> Self {
        Self {
            arn: arn.into(),
            session_name: session_name.into(),
            assume_timeout: options.assume_timeout,
            provider,
            cache: CredentialCache::new(options.refresh_margin),
        }
    }

    pub fn arn(&self) -> &str {
        &self.arn
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    /// Currently valid credentials, assuming the role again once the cached ones expire.
    pub async fn credentials(&self) -> Result<Credentials> {
        self.cache.get_or_refresh(|| self.assume()).await
    }

    async fn assume(&self) -> Result<Credentials> {
        info!("Assuming role {} as {}", self.arn, self.session_name);

        let assumed = time::timeout(
            self.assume_timeout,
            self.provider.assume_role(&self.arn, &self.session_name),
        )
        .await
        .map_err(|_| {
            Error::AssumeRole(format!(
                "timed out after {}s",
                self.assume_timeout.as_secs_f64()
            ))
        })?;

        let credentials = assumed.map_err(|e| Error::AssumeRole(format!("{e:#}")))?;
        info!(
            "Obtained credentials for {} valid until {}",
            self.arn,
            credentials.expiration_string()
        );
        Ok(credentials)
    }
}

impl fmt::Debug for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Role")
            .field("arn", &self.arn)
            .field("session_name", &self.session_name)
            .finish_non_exhaustive()
    }
}
