use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, ConfigLoader, Region};
use aws_sdk_sts::Client as StsClient;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{AssumeRole, Credentials};
use crate::constants::DEFAULT_AWS_REGION;

/// Assumes roles through AWS STS using the credentials of a local profile.
#[derive(Debug, Clone)]
pub struct StsAssumeRole {
    client: StsClient,
}

impl StsAssumeRole {
    pub async fn new(profile: Option<&str>, region: Option<&str>) -> Self {
        // Priority: configured region -> ENV vars / config file / EC2 metadata -> DEFAULT_AWS_REGION
        let config = {
            let loaded = loader(profile, region).load().await;

            match loaded.region() {
                Some(region) => {
                    info!("Using region: {}", region);
                    loaded
                }
                None => {
                    info!(
                        "No region configured, using default {} for STS",
                        DEFAULT_AWS_REGION
                    );
                    loader(profile, Some(DEFAULT_AWS_REGION)).load().await
                }
            }
        };

        Self {
            client: StsClient::new(&config),
        }
    }
}

fn loader(profile: Option<&str>, region: Option<&str>) -> ConfigLoader {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile) = profile {
        loader = loader.profile_name(profile);
    }
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    loader
}

#[async_trait]
impl AssumeRole for StsAssumeRole {
    async fn assume_role(&self, arn: &str, session_name: &str) -> Result<Credentials> {
        info!("Calling AWS STS AssumeRole");
        debug!("Role ARN: {}", arn);
        debug!("Session name: {}", session_name);

        let response = self
            .client
            .assume_role()
            .role_arn(arn)
            .role_session_name(session_name)
            .send()
            .await
            .context("AWS STS AssumeRole request failed")?;

        let sts_creds = response
            .credentials()
            .context("AWS STS returned no credentials")?;

        let credentials = Credentials {
            access_key_id: sts_creds.access_key_id().to_string(),
            secret_access_key: sts_creds.secret_access_key().to_string(),
            session_token: sts_creds.session_token().to_string(),
            expiration: to_utc(sts_creds.expiration())?,
        };

        info!("Successfully obtained AWS credentials for {}", arn);
        Ok(credentials)
    }
}

fn to_utc(expiration: &aws_smithy_types::DateTime) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(expiration.secs(), expiration.subsec_nanos())
        .context("AWS STS returned an out-of-range expiration")
}
