use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::models::is_anyone;

/// Group administration settings applied at startup.
///
/// The default organization and default group are created if they do not
/// exist. When `admin_group` is set, that group is created in the default
/// organization and granted the global `admin` permission. When
/// `bootstrap_admin` is also set, a user with that login is created and made
/// a member of the admin group, so a fresh database has someone able to call
/// the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupsConfig {
    /// Key of the organization used when a request names no organization.
    #[serde(default = "default_organization_key")]
    pub default_organization_key: String,

    /// Display name given to the default organization when it is created.
    #[serde(default = "default_organization_name")]
    pub default_organization_name: String,

    /// Name of the default group. Seeds the `sonar.defaultGroup` setting
    /// when it has no value yet.
    #[serde(default = "default_group")]
    pub default_group: String,

    /// Group holding the global `admin` permission.
    #[serde(default)]
    pub admin_group: Option<String>,

    /// Login of a user added to `admin_group` on startup.
    #[serde(default)]
    pub bootstrap_admin: Option<String>,
}

impl Default for GroupsConfig {
    fn default() -> Self {
        Self {
            default_organization_key: default_organization_key(),
            default_organization_name: default_organization_name(),
            default_group: default_group(),
            admin_group: None,
            bootstrap_admin: None,
        }
    }
}

impl GroupsConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.default_organization_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "groups.default_organization_key cannot be empty".into(),
            ));
        }

        let names = std::iter::once(("default_group", self.default_group.as_str()))
            .chain(self.admin_group.as_deref().map(|n| ("admin_group", n)));
        for (field, name) in names {
            if name.is_empty() || name.chars().count() > 255 {
                return Err(ConfigError::Validation(format!(
                    "groups.{field} must be between 1 and 255 characters"
                )));
            }
            if is_anyone(name) {
                return Err(ConfigError::Validation(format!(
                    "groups.{field} cannot use the reserved name '{name}'"
                )));
            }
        }

        if let Some(login) = &self.bootstrap_admin
            && login.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "groups.bootstrap_admin cannot be empty".into(),
            ));
        }

        Ok(())
    }
}

fn default_organization_key() -> String {
    "default-organization".to_string()
}

fn default_organization_name() -> String {
    "Default Organization".to_string()
}

fn default_group() -> String {
    "sonar-users".to_string()
}
