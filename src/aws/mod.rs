use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};

pub mod cache;
pub mod role;
pub mod roles;
pub mod sts;

/// AWS temporary credentials structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

impl Credentials {
    /// Whether these credentials are still usable at `now`, keeping `margin` in reserve.
    pub fn is_fresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        TimeDelta::from_std(margin)
            .ok()
            .and_then(|margin| now.checked_add_signed(margin))
            .is_some_and(|threshold| threshold < self.expiration)
    }

    /// Expiration in the `YYYY-MM-DDTHH:MM:SSZ` form the metadata service uses
    pub fn expiration_string(&self) -> String {
        self.expiration.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

/// Exchanges a role identity for short-lived credentials.
#[async_trait]
pub trait AssumeRole: Send + Sync {
    async fn assume_role(&self, arn: &str, session_name: &str) -> Result<Credentials>;
}

// Re-export commonly used types
pub use role::{Role, RoleOptions};
pub use roles::RoleSet;
pub use sts::StsAssumeRole;
