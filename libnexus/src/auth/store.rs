//! Stored registry logins.
//!
//! `nexus configure` writes one login per registry location, a Nexus host
//! plus an optional Docker repository on it, to a TOML file readable by its
//! owner only. The file lives apart from the main config so the config can
//! be shared without leaking passwords.
//!
//! ```toml
//! [[registry]]
//! host = "nexus.example.com:8081"
//! repository = "docker-hosted"
//! username = "ci"
//! password = "c2VjcmV0"
//! ```

use crate::auth::Credentials;
use crate::error::{NexusError, Result};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Where a login applies: a host, optionally narrowed to one repository.
///
/// Hosts are compared without scheme, trailing slash or case, so
/// `http://Nexus:8081/` and `nexus:8081` name the same registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryKey {
    host: String,
    repository: Option<String>,
}

impl RegistryKey {
    /// Normalizes `host` and `repository`. A blank repository means none.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::auth::RegistryKey;
    ///
    /// let key = RegistryKey::new("https://Nexus.local:8081/", Some(" docker "));
    /// assert_eq!(key.host(), "nexus.local:8081");
    /// assert_eq!(key.to_string(), "nexus.local:8081/repository/docker");
    /// ```
    pub fn new(host: &str, repository: Option<&str>) -> Self {
        let host = host.trim().trim_end_matches('/');
        let host = host
            .split_once("://")
            .map_or(host, |(_, rest)| rest)
            .to_ascii_lowercase();

        let repository = repository
            .map(|r| r.trim().trim_matches('/'))
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        Self { host, repository }
    }

    /// Host, without scheme.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Repository name, if the key is narrowed to one.
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    fn host_wide(&self) -> Self {
        Self {
            host: self.host.clone(),
            repository: None,
        }
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repository {
            Some(repository) => write!(f, "{}/repository/{}", self.host, repository),
            None => write!(f, "{}", self.host),
        }
    }
}

/// Storage backend for registry logins.
pub trait CredentialStore {
    /// Saves `credentials` for `key`, replacing an earlier login.
    ///
    /// # Errors
    ///
    /// Returns an error for anonymous credentials or if the store cannot be
    /// written.
    fn store(&mut self, key: &RegistryKey, credentials: &Credentials) -> Result<()>;

    /// Login for `key`.
    ///
    /// A login saved for the repository wins; otherwise a login saved for the
    /// whole host applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored password cannot be decoded.
    fn get(&self, key: &RegistryKey) -> Result<Option<Credentials>>;

    /// Drops the login saved for exactly `key`. Returns whether there was one.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn remove(&mut self, key: &RegistryKey) -> Result<bool>;
}

/// One `[[registry]]` entry of the credentials file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct StoredLogin {
    host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repository: Option<String>,
    username: String,
    /// Base64 of the password; not encryption
    password: String,
}

impl StoredLogin {
    fn key(&self) -> RegistryKey {
        RegistryKey::new(&self.host, self.repository.as_deref())
    }

    fn encode(key: &RegistryKey, credentials: &Credentials) -> Result<Self> {
        match credentials {
            Credentials::Basic { username, password } => Ok(Self {
                host: key.host.clone(),
                repository: key.repository.clone(),
                username: username.clone(),
                password: general_purpose::STANDARD.encode(password),
            }),
            Credentials::Anonymous => {
                Err(NexusError::validation("Cannot store anonymous credentials"))
            }
        }
    }

    fn decode(&self) -> Result<Credentials> {
        let bytes = general_purpose::STANDARD
            .decode(&self.password)
            .map_err(|e| {
                NexusError::validation_with_source(
                    format!("Failed to decode stored password for {}", self.key()),
                    e,
                )
            })?;

        let password = String::from_utf8(bytes)
            .map_err(|e| NexusError::validation_with_source("Invalid password encoding", e))?;

        Ok(Credentials::basic(self.username.as_str(), password))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialsFile {
    #[serde(default, rename = "registry")]
    logins: Vec<StoredLogin>,
}

/// Credentials file on disk, written with 0600 permissions.
///
/// # Examples
///
/// ```no_run
/// use libnexus::auth::{CredentialStore, Credentials, FileCredentialStore, RegistryKey};
/// use std::path::Path;
///
/// # fn example() -> libnexus::error::Result<()> {
/// let mut store = FileCredentialStore::open(Path::new("/home/user/.config/nexus/credentials.toml"))?;
/// let key = RegistryKey::new("nexus.example.com:8081", Some("docker-hosted"));
///
/// store.store(&key, &Credentials::basic("ci", "secret"))?;
/// assert!(store.get(&key)?.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    logins: Vec<StoredLogin>,
}

impl FileCredentialStore {
    /// Reads the file at `path`. A missing file is an empty store; nothing is
    /// created until the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: &Path) -> Result<Self> {
        let logins = if path.exists() {
            let contents = fs::read_to_string(path).map_err(|e| {
                NexusError::config_with_source("Failed to read credentials file", path.to_str(), e)
            })?;
            let file: CredentialsFile = toml::from_str(&contents).map_err(|e| {
                NexusError::config_with_source("Failed to parse credentials file", path.to_str(), e)
            })?;
            file.logins
        } else {
            Vec::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            logins,
        })
    }

    fn find(&self, key: &RegistryKey) -> Option<&StoredLogin> {
        self.logins.iter().find(|login| &login.key() == key)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                NexusError::config_with_source(
                    "Failed to create credentials directory",
                    parent.to_str(),
                    e,
                )
            })?;
        }

        let file = CredentialsFile {
            logins: self.logins.clone(),
        };
        let contents = toml::to_string_pretty(&file).map_err(|e| {
            NexusError::config_with_source("Failed to serialize credentials", self.path.to_str(), e)
        })?;

        fs::write(&self.path, contents).map_err(|e| {
            NexusError::config_with_source("Failed to write credentials file", self.path.to_str(), e)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                NexusError::config_with_source(
                    "Failed to set credentials file permissions",
                    self.path.to_str(),
                    e,
                )
            })?;
        }

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn store(&mut self, key: &RegistryKey, credentials: &Credentials) -> Result<()> {
        if key.host.is_empty() {
            return Err(NexusError::validation("Registry host must not be empty"));
        }

        let login = StoredLogin::encode(key, credentials)?;
        match self.logins.iter_mut().find(|existing| &existing.key() == key) {
            Some(existing) => *existing = login,
            None => self.logins.push(login),
        }

        tracing::debug!(registry = %key, path = %self.path.display(), "saving credentials");
        self.save()
    }

    fn get(&self, key: &RegistryKey) -> Result<Option<Credentials>> {
        let login = match self.find(key) {
            Some(login) => Some(login),
            None if key.repository.is_some() => self.find(&key.host_wide()),
            None => None,
        };

        login.map(StoredLogin::decode).transpose()
    }

    fn remove(&mut self, key: &RegistryKey) -> Result<bool> {
        let before = self.logins.len();
        self.logins.retain(|login| &login.key() != key);

        if self.logins.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }
}
