use std::{env, path::PathBuf, time::Duration};

/// Default configuration directory name under user's config directory
pub const CONFIG_DIR_NAME: &str = "imds-switch";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config";

/// Environment variable overriding the configuration file location
pub const CONFIG_PATH_ENV: &str = "IMDS_SWITCH_CONFIG";

/// Link-local address SDKs poll for instance metadata
pub const DEFAULT_LISTEN_ADDR: &str = "169.254.169.254:80";

/// Default AWS region for STS operations when no region is configured
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Prefix of the generated session name when a role doesn't set one
pub const DEFAULT_SESSION_NAME_PREFIX: &str = "imds-switch";

/// Upper bound on a single assume-role call
pub const DEFAULT_ASSUME_TIMEOUT: Duration = Duration::from_secs(10);

/// Credentials are refreshed this long before they expire
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::ZERO;

/// `Server` header sent by the real metadata service
pub const SERVER_HEADER: &str = "EC2ws";

/// Content type of every JSON response
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Static `LastUpdated` value of the credentials document
pub const LAST_UPDATED: &str = "2015-07-07T23:06:33Z";

/// Metadata path listing the instance profile role
pub const SECURITY_CREDENTIALS_PATH: &str = "/latest/meta-data/iam/security-credentials";

/// Get the configuration file path
/// Respects IMDS_SWITCH_CONFIG environment variable if set
pub fn get_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| {
        home.join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    })
}
