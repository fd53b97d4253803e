//! Application configuration.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `NEXUS_*` environment variables (`NEXUS_REGISTRY__HOST`,
//! `NEXUS_RETENTION__EXCLUDE=stable,lts`, ...). Command line flags are applied
//! on top by the CLI.

use crate::error::{NexusError, Result};
use crate::retention::{
    DEFAULT_KEEP_ALL_GROUP, DEFAULT_OTHERS_GROUP, KeepSpec, RetentionPolicy, SortStrategy,
};
use config::{Config as ConfigRs, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;


/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "NEXUS";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistrySettings,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub retention: Retention,
    #[serde(default)]
    pub output: Output,
}

impl Config {
    /// Parses a `Config` from a TOML string on top of the defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let builder = Self::defaults()?.add_source(File::from_str(s, FileFormat::Toml));
        Self::from_builder(builder)
    }

    /// Loads defaults, the file at `path` if it exists, and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`Config::load`], reading variables from `env` instead of the
    /// process environment when given.
    pub fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = Self::defaults()?;

        if let Some(p) = path.filter(|p| p.exists()) {
            builder = builder.add_source(File::from(p).format(FileFormat::Toml).required(true));
        }

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("retention.exclude")
            .source(env);

        Self::from_builder(builder.add_source(environment))
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            NexusError::config_with_source("Failed to serialize configuration", None::<String>, e)
        })
    }

    /// Registry base URL: the host, followed by `/repository/<name>` when a
    /// Nexus repository is configured.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no host is set.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::Config;
    ///
    /// let mut config = Config::default();
    /// config.registry.host = "https://nexus.example.com".to_string();
    /// config.registry.repository = Some("docker-hosted".to_string());
    /// assert_eq!(
    ///     config.base_url().unwrap(),
    ///     "https://nexus.example.com/repository/docker-hosted"
    /// );
    /// ```
    pub fn base_url(&self) -> Result<String> {
        let host = self.registry.host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(NexusError::config(
                "No registry host configured (run `nexus configure` or set NEXUS_REGISTRY__HOST)",
                None::<String>,
            ));
        }

        match self
            .registry
            .repository
            .as_deref()
            .map(|r| r.trim().trim_matches('/'))
            .filter(|r| !r.is_empty())
        {
            Some(repository) => Ok(format!("{}/repository/{}", host, repository)),
            None => Ok(host.to_string()),
        }
    }

    /// Retention policy with the configured group names and `specs`.
    pub fn retention_policy(&self, specs: Vec<KeepSpec>) -> RetentionPolicy {
        RetentionPolicy::new(specs)
            .with_keep_all_group(self.retention.keep_all_group.as_str())
            .with_others_group(self.retention.others_group.as_str())
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = ConfigRs::try_from(&Config::default()).map_err(|e| {
            NexusError::config_with_source("Failed to build default configuration", None::<String>, e)
        })?;
        Ok(ConfigRs::builder().add_source(defaults))
    }

    fn from_builder(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                NexusError::config_with_source(
                    "Failed to deserialize configuration",
                    None::<String>,
                    e,
                )
            })
    }
}

/// Where the registry lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RegistrySettings {
    /// Host with optional scheme and port, e.g. `https://nexus.example.com:8443`
    #[serde(default)]
    pub host: String,

    /// Nexus Docker repository name; unset for a plain v2 registry
    #[serde(default)]
    pub repository: Option<String>,

    /// Accept invalid TLS certificates
    #[serde(default)]
    pub insecure: bool,
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    /// Request timeout in seconds
    #[serde(default = "default_network_timeout")]
    pub timeout: u64,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: default_network_timeout(),
        }
    }
}

fn default_network_timeout() -> u64 {
    30
}

/// Retention defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Retention {
    /// Sort strategy when `--sort` is not given
    #[serde(default)]
    pub sort: SortStrategy,

    /// Group that keeps all its tags unless a keep spec overrides it
    #[serde(default = "default_keep_all_group")]
    pub keep_all_group: String,

    /// Catch-all group name
    #[serde(default = "default_others_group")]
    pub others_group: String,

    /// Tags excluded in addition to `--exclude` and `latest`
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for Retention {
    fn default() -> Self {
        Self {
            sort: SortStrategy::default(),
            keep_all_group: default_keep_all_group(),
            others_group: default_others_group(),
            exclude: Vec::new(),
        }
    }
}

fn default_keep_all_group() -> String {
    DEFAULT_KEEP_ALL_GROUP.to_string()
}

fn default_others_group() -> String {
    DEFAULT_OTHERS_GROUP.to_string()
}

/// Output formatting settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Output {
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub color: ColorChoice,
}

/// Enum for output formats.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,

    Json,

    Yaml,
}

/// Enum for color output choices.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,

    Always,

    Never,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "yaml" | "yml" => OutputFormat::Yaml,
            _ => OutputFormat::Pretty,
        }
    }
}

impl From<&str> for ColorChoice {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            _ => ColorChoice::Auto,
        }
    }
}
