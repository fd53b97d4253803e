//! Authentication for Nexus-hosted Docker registries.
//!
//! Nexus Repository Manager authenticates Docker API calls with HTTP Basic
//! credentials (a Nexus user, or a user token pair). Anonymous access works
//! for read-only repositories but deletes always require a user with the
//! `nx-repository-view-docker-*-delete` privilege.

use crate::error::{NexusError, Result};

pub mod store;

pub use store::{CredentialStore, FileCredentialStore, RegistryKey};

#[cfg(test)]
mod tests;


/// Credentials for registry authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// No authentication (anonymous access)
    Anonymous,

    /// HTTP Basic authentication with username and password
    Basic {
        /// Username for authentication
        username: String,
        /// Password for authentication
        password: String,
    },
}

impl Credentials {
    /// Creates anonymous credentials.
    pub fn anonymous() -> Self {
        Self::Anonymous
    }

    /// Creates Basic authentication credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::auth::Credentials;
    ///
    /// let creds = Credentials::basic("admin", "admin123");
    /// assert!(!creds.is_anonymous());
    /// ```
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Builds Basic credentials after checking that neither field is blank.
    pub fn try_basic(username: &str, password: &str) -> Result<Self> {
        if username.trim().is_empty() {
            return Err(NexusError::validation("Username cannot be empty"));
        }
        if password.is_empty() {
            return Err(NexusError::validation("Password cannot be empty"));
        }
        Ok(Self::basic(username.trim(), password))
    }

    /// Returns true for anonymous credentials.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Returns the username, if any.
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Basic { username, .. } => Some(username),
        }
    }

    /// Returns the Authorization header value for these credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::auth::Credentials;
    ///
    /// let header = Credentials::basic("user", "pass").to_header_value();
    /// assert_eq!(header.as_deref(), Some("Basic dXNlcjpwYXNz"));
    /// ```
    pub fn to_header_value(&self) -> Option<String> {
        match self {
            Self::Anonymous => None,
            Self::Basic { username, password } => {
                use base64::{Engine as _, engine::general_purpose};
                let credentials = format!("{}:{}", username, password);
                let encoded = general_purpose::STANDARD.encode(credentials);
                Some(format!("Basic {}", encoded))
            }
        }
    }
}
