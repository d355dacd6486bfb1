use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::aws::RoleSet;
use crate::error::{Error, Result};

/// The alias currently presented to metadata clients as the instance role.
///
/// Always names a role of the set: a switch to an unknown alias fails
/// before anything is written.
#[derive(Debug)]
pub struct ActiveRole {
    roles: Arc<RoleSet>,
    current: RwLock<String>,
}

impl ActiveRole {
    pub fn new(roles: Arc<RoleSet>, default_alias: &str) -> Result<Self> {
        roles.role(default_alias)?;

        Ok(Self {
            roles,
            current: RwLock::new(default_alias.to_string()),
        })
    }

    pub fn get(&self) -> String {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, alias: &str) -> Result<()> {
        if !self.roles.contains(alias) {
            return Err(Error::UnknownRole(alias.to_string()));
        }

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if *current != alias {
            info!("Switching active role from {} to {}", current, alias);
            *current = alias.to_string();
        }

        Ok(())
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }
}
