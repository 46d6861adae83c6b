use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Caller identification for the admin API.
///
/// The service sits behind a reverse proxy that authenticates the caller
/// and forwards their login in a header (oauth2-proxy, Authelia, Tailscale
/// and similar). The login is matched against `users.login`.
///
/// **Security:** only expose the service through the proxy. Anyone who can
/// reach it directly can spoof the identity header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Header containing the authenticated user's login.
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            identity_header: default_identity_header(),
        }
    }
}

impl AuthConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.identity_header.trim().is_empty() {
            return Err(ConfigError::Validation(
                "auth.identity_header cannot be empty".into(),
            ));
        }
        if http::HeaderName::from_bytes(self.identity_header.as_bytes()).is_err() {
            return Err(ConfigError::Validation(format!(
                "auth.identity_header '{}' is not a valid header name",
                self.identity_header
            )));
        }
        Ok(())
    }
}

fn default_identity_header() -> String {
    "X-Forwarded-User".to_string()
}
