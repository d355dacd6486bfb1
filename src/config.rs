use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use ini::{Ini, Properties};

use crate::aws::RoleOptions;
use crate::constants::{
    self, DEFAULT_ASSUME_TIMEOUT, DEFAULT_LISTEN_ADDR, DEFAULT_REFRESH_MARGIN,
    DEFAULT_SESSION_NAME_PREFIX,
};

const SETTINGS_SECTION: &str = "settings";
const ROLE_SECTION_PREFIX: &str = "role ";

/// One `[role <alias>]` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleConfig {
    pub alias: String,
    pub arn: String,
    pub session_name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub default_role: String,
    pub listen: String,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub assume_timeout: Duration,
    pub refresh_margin: Duration,
    pub roles: Vec<RoleConfig>,
}

impl Config {
    fn from_ini(ini: &Ini) -> Result<Self> {
        let settings = ini
            .section(Some(SETTINGS_SECTION))
            .with_context(|| format!("[{SETTINGS_SECTION}] section not found in config"))?;

        let default_role = settings
            .get("default_role")
            .filter(|alias| !alias.is_empty())
            .context("default_role not set in config")?
            .to_string();

        let roles = ini
            .iter()
            .filter_map(|(name, props)| {
                name.and_then(|name| name.strip_prefix(ROLE_SECTION_PREFIX))
                    .map(|alias| RoleConfig::from_ini_section(alias.trim(), props))
            })
            .collect::<Result<Vec<_>>>()?;

        if roles.is_empty() {
            bail!("No [role <alias>] sections found in config");
        }

        Ok(Self {
            default_role,
            listen: settings
                .get("listen")
                .unwrap_or(DEFAULT_LISTEN_ADDR)
                .to_string(),
            profile: settings.get("profile").map(String::from),
            region: settings.get("region").map(String::from),
            assume_timeout: parse_timeout(settings)?,
            refresh_margin: parse_secs(settings, "refresh_margin_secs")?
                .unwrap_or(DEFAULT_REFRESH_MARGIN),
            roles,
        })
    }

    pub fn role_options(&self) -> RoleOptions {
        RoleOptions {
            assume_timeout: self.assume_timeout,
            refresh_margin: self.refresh_margin,
        }
    }
}

impl RoleConfig {
    fn from_ini_section(alias: &str, section: &Properties) -> Result<Self> {
        if alias.is_empty() {
            bail!("Role section is missing an alias");
        }

        let arn = section
            .get("arn")
            .filter(|arn| !arn.is_empty())
            .with_context(|| format!("arn not set for role '{alias}'"))?
            .to_string();

        Ok(Self {
            alias: alias.to_string(),
            arn,
            session_name: section
                .get("session_name")
                .map_or_else(|| default_session_name(alias), String::from),
        })
    }
}

/// A zero timeout would fail every assume-role call
fn parse_timeout(settings: &Properties) -> Result<Duration> {
    match parse_secs(settings, "assume_timeout_secs")? {
        Some(timeout) if timeout.is_zero() => bail!("assume_timeout_secs must be greater than 0"),
        Some(timeout) => Ok(timeout),
        None => Ok(DEFAULT_ASSUME_TIMEOUT),
    }
}

fn default_session_name(alias: &str) -> String {
    format!("{DEFAULT_SESSION_NAME_PREFIX}-{alias}")
}

fn parse_secs(section: &Properties, key: &str) -> Result<Option<Duration>> {
    section
        .get(key)
        .map(|value| {
            value
                .parse()
                .map(Duration::from_secs)
                .with_context(|| format!("{key} must be a whole number of seconds, got '{value}'"))
        })
        .transpose()
}

pub async fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => get_config_path()?,
    };

    let contents = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse(&contents).with_context(|| format!("Invalid config file: {}", path.display()))
}

pub fn parse(contents: &str) -> Result<Config> {
    let ini = Ini::load_from_str(contents).context("Failed to parse config")?;
    Config::from_ini(&ini)
}

fn get_config_path() -> Result<PathBuf> {
    constants::get_config_path().context("Failed to determine config path")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::{env, io::Write};

    const SAMPLE: &str = r#"
[settings]
default_role = dev
listen = 127.0.0.1:8169
profile = sandbox
region = eu-west-1
assume_timeout_secs = 5
refresh_margin_secs = 60

[role dev]
arn = arn:aws:iam::111:role/dev
session_name = dev-session

[role prod]
arn = arn:aws:iam::222:role/prod
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse(SAMPLE).unwrap();

        assert_eq!(config.default_role, "dev");
        assert_eq!(config.listen, "127.0.0.1:8169");
        assert_eq!(config.profile.as_deref(), Some("sandbox"));
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.assume_timeout, Duration::from_secs(5));
        assert_eq!(config.refresh_margin, Duration::from_secs(60));
        assert_eq!(
            config.roles,
            vec![
                RoleConfig {
                    alias: "dev".to_string(),
                    arn: "arn:aws:iam::111:role/dev".to_string(),
                    session_name: "dev-session".to_string(),
                },
                RoleConfig {
                    alias: "prod".to_string(),
                    arn: "arn:aws:iam::222:role/prod".to_string(),
                    session_name: "imds-switch-prod".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_defaults() {
        let config = parse(
            "[settings]\ndefault_role = dev\n[role dev]\narn = arn:aws:iam::111:role/dev\n",
        )
        .unwrap();

        assert_eq!(config.listen, DEFAULT_LISTEN_ADDR);
        assert_eq!(config.profile, None);
        assert_eq!(config.region, None);
        assert_eq!(config.assume_timeout, DEFAULT_ASSUME_TIMEOUT);
        assert_eq!(config.refresh_margin, DEFAULT_REFRESH_MARGIN);

        let options = config.role_options();
        assert_eq!(options.assume_timeout, DEFAULT_ASSUME_TIMEOUT);
    }

    #[test]
    fn test_roles_keep_file_order() {
        let config = parse(
            "[settings]\ndefault_role = b\n\
             [role c]\narn = arn:c\n[role a]\narn = arn:a\n[role b]\narn = arn:b\n",
        )
        .unwrap();

        let aliases: Vec<&str> = config.roles.iter().map(|r| r.alias.as_str()).collect();
        assert_eq!(aliases, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_missing_settings_section() {
        let err = parse("[role dev]\narn = arn:aws:iam::111:role/dev\n").unwrap_err();
        assert!(err.to_string().contains("[settings]"));
    }

    #[test]
    fn test_missing_default_role() {
        let err = parse("[settings]\n[role dev]\narn = arn:dev\n").unwrap_err();
        assert!(err.to_string().contains("default_role"));
    }

    #[test]
    fn test_role_without_arn() {
        let err = parse("[settings]\ndefault_role = dev\n[role dev]\n").unwrap_err();
        assert!(err.to_string().contains("arn not set for role 'dev'"));
    }

    #[test]
    fn test_no_roles() {
        let err = parse("[settings]\ndefault_role = dev\n").unwrap_err();
        assert!(err.to_string().contains("No [role <alias>] sections"));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = parse(
            "[settings]\ndefault_role = dev\nassume_timeout_secs = soon\n\
             [role dev]\narn = arn:dev\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("assume_timeout_secs"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = parse(
            "[settings]\ndefault_role = dev\nassume_timeout_secs = 0\n\
             [role dev]\narn = arn:dev\n",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "assume_timeout_secs must be greater than 0");

        // A zero margin is the default and stays valid
        let config = parse(
            "[settings]\ndefault_role = dev\nrefresh_margin_secs = 0\n\
             [role dev]\narn = arn:dev\n",
        )
        .unwrap();
        assert_eq!(config.refresh_margin, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = load(Some(file.path())).await.unwrap();
        assert_eq!(config.roles.len(), 2);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load(Some(Path::new("/nonexistent/imds-switch/config")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[tokio::test]
    #[serial]
    async fn test_load_from_env_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let original = env::var(constants::CONFIG_PATH_ENV).ok();
        unsafe {
            env::set_var(constants::CONFIG_PATH_ENV, file.path());
        }

        let config = load(None).await;

        unsafe {
            match original {
                Some(val) => env::set_var(constants::CONFIG_PATH_ENV, val),
                None => env::remove_var(constants::CONFIG_PATH_ENV),
            }
        }

        assert_eq!(config.unwrap().default_role, "dev");
    }
}
