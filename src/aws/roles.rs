use std::{collections::HashMap, sync::Arc};

use super::{AssumeRole, Role, RoleOptions};
use crate::config::RoleConfig;
use crate::error::{Error, Result};

/// The configured roles, keyed by alias. Read-only once built.
#[derive(Debug)]
pub struct RoleSet {
    aliases: Vec<String>,
    roles: HashMap<String, Role>,
}

impl RoleSet {
    /// Build a set from `(alias, role)` pairs, keeping their order
    pub fn new(roles: impl IntoIterator<Item = (String, Role)>) -> Result<Self> {
        let mut set = Self {
            aliases: Vec::new(),
            roles: HashMap::new(),
        };

        for (alias, role) in roles {
            if set.roles.contains_key(&alias) {
                return Err(Error::DuplicateRole(alias));
            }
            set.aliases.push(alias.clone());
            set.roles.insert(alias, role);
        }

        Ok(set)
    }

    /// Build the configured roles, all assumed through `provider`
    pub fn from_config(
        configs: &[RoleConfig],
        provider: Arc<dyn AssumeRole>,
        options: RoleOptions,
    ) -> Result<Self> {
        Self::new(configs.iter().map(|config| {
            let role = Role::new(
                config.arn.as_str(),
                config.session_name.as_str(),
                Arc::clone(&provider),
                options,
            );
            (config.alias.clone(), role)
        }))
    }

    pub fn role(&self, alias: &str) -> Result<&Role> {
        self.roles
            .get(alias)
            .ok_or_else(|| Error::UnknownRole(alias.to_string()))
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.roles.contains_key(alias)
    }

    /// All aliases in configuration order
    pub fn roles(&self) -> &[String] {
        &self.aliases
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::testing::StubAssumeRole;

    fn role_config(alias: &str, arn: &str) -> RoleConfig {
        RoleConfig {
            alias: alias.to_string(),
            arn: arn.to_string(),
            session_name: format!("{alias}-session"),
        }
    }

    fn sample_set() -> RoleSet {
        RoleSet::from_config(
            &[
                role_config("dev", "arn:aws:iam::111:role/dev"),
                role_config("prod", "arn:aws:iam::222:role/prod"),
            ],
            StubAssumeRole::new(),
            RoleOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_by_alias() {
        let set = sample_set();

        let dev = set.role("dev").unwrap();
        assert_eq!(dev.arn(), "arn:aws:iam::111:role/dev");
        assert_eq!(dev.session_name(), "dev-session");

        let prod = set.role("prod").unwrap();
        assert_eq!(prod.arn(), "arn:aws:iam::222:role/prod");
        assert!(set.contains("prod"));
    }

    #[test]
    fn test_unknown_alias() {
        let set = sample_set();

        let err = set.role("missing").unwrap_err();
        assert!(matches!(err, Error::UnknownRole(ref alias) if alias == "missing"));
        assert!(!set.contains("missing"));
    }

    #[test]
    fn test_roles_in_configuration_order() {
        let set = RoleSet::from_config(
            &[
                role_config("zeta", "arn:z"),
                role_config("alpha", "arn:a"),
                role_config("mid", "arn:m"),
            ],
            StubAssumeRole::new(),
            RoleOptions::default(),
        )
        .unwrap();

        assert_eq!(set.roles(), ["zeta", "alpha", "mid"]);
        assert_eq!(set.len(), 3);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let err = RoleSet::from_config(
            &[
                role_config("dev", "arn:aws:iam::111:role/dev"),
                role_config("dev", "arn:aws:iam::333:role/other"),
            ],
            StubAssumeRole::new(),
            RoleOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::DuplicateRole(ref alias) if alias == "dev"));
    }

    #[tokio::test]
    async fn test_roles_share_provider_but_not_cache() {
        let stub = StubAssumeRole::new();
        let set = RoleSet::from_config(
            &[
                role_config("dev", "arn:aws:iam::111:role/dev"),
                role_config("prod", "arn:aws:iam::222:role/prod"),
            ],
            stub.clone(),
            RoleOptions::default(),
        )
        .unwrap();

        let dev = set.role("dev").unwrap().credentials().await.unwrap();
        let prod = set.role("prod").unwrap().credentials().await.unwrap();
        set.role("dev").unwrap().credentials().await.unwrap();

        assert_eq!(stub.calls(), 2);
        assert!(dev.session_token.contains("111"));
        assert!(prod.session_token.contains("222"));
    }
}
