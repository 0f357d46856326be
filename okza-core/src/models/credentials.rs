//! Provider credentials.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::CoreError;

/// Environment variable holding the provider username.
pub const USERNAME_VAR: &str = "PROVIDER_USERNAME";
/// Environment variable holding the provider password.
pub const PASSWORD_VAR: &str = "PROVIDER_PASSWORD";

/// Older variable names still accepted as fallbacks.
const LEGACY_USERNAME_VAR: &str = "DATAFORSEO_USERNAME";
const LEGACY_PASSWORD_VAR: &str = "DATAFORSEO_PASSWORD";

/// Username/password pair for the remote provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials from explicit values.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reads credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CredentialMissing`] when either value is unset
    /// or empty.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads credentials through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CredentialMissing`] naming the first missing
    /// variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |primary: &str, legacy: &str| {
            [primary, legacy]
                .into_iter()
                .filter_map(&lookup)
                .find(|v| !v.is_empty())
                .ok_or_else(|| CoreError::CredentialMissing(primary.to_string()))
        };

        Ok(Self {
            username: read(USERNAME_VAR, LEGACY_USERNAME_VAR)?,
            password: read(PASSWORD_VAR, LEGACY_PASSWORD_VAR)?,
        })
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Builds the `Authorization` header value (`Basic base64(user:pass)`).
    pub fn basic_auth_header(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {encoded}")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
