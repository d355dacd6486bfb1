use std::path::Path;

use anyhow::{Result, bail};
use clap::Args;

use crate::config::{self, Config};

#[derive(Debug, Clone, Args)]
pub struct RolesCommand {}

impl RolesCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = config::load(config_path).await?;
        print!("{}", render(&config)?);
        Ok(())
    }
}

/// One line per role in configuration order, the default marked with `*`
fn render(config: &Config) -> Result<String> {
    if !config
        .roles
        .iter()
        .any(|role| role.alias == config.default_role)
    {
        bail!(
            "Default role '{}' is not configured",
            config.default_role
        );
    }

    let width = config
        .roles
        .iter()
        .map(|role| role.alias.len())
        .max()
        .unwrap_or_default();

    let lines = config
        .roles
        .iter()
        .map(|role| {
            let marker = if role.alias == config.default_role {
                '*'
            } else {
                ' '
            };
            format!(
                "{marker} {:<width$}  {}  ({})\n",
                role.alias, role.arn, role.session_name
            )
        })
        .collect();

    Ok(lines)
}
