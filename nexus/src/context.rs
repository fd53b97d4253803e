//! Application context that holds resolved configuration
//!
//! The context is built following the precedence order:
//! 1. Default values
//! 2. Config file values
//! 3. Environment variables (`NEXUS_*`)
//! 4. CLI flags
//!
//! Once built, the context is passed as read-only throughout the application.

use crate::config;
use libnexus::Config;
use libnexus::auth::{Credentials, RegistryKey};
use libnexus::config::ColorChoice;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter derived from `-v`.
pub const LOG_ENV: &str = "NEXUS_LOG";

/// How much the CLI reports about what it is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    /// Results and warnings only
    #[default]
    Normal,
    /// `-v`: progress messages
    Verbose,
    /// `-vv`: connection details
    VeryVerbose,
    /// `-vvv`: everything, including library tracing at trace level
    Trace,
}

impl VerbosityLevel {
    /// Maps the number of `-v` flags to a level.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Normal,
            1 => VerbosityLevel::Verbose,
            2 => VerbosityLevel::VeryVerbose,
            _ => VerbosityLevel::Trace,
        }
    }

    /// Default `tracing` filter directive for this level.
    pub fn filter_directive(self) -> &'static str {
        match self {
            VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "info",
            VerbosityLevel::VeryVerbose => "debug",
            VerbosityLevel::Trace => "trace",
        }
    }
}

/// Installs the global `tracing` subscriber.
///
/// Diagnostics go to stderr so they never mix with JSON or YAML output.
/// `NEXUS_LOG` takes any `EnvFilter` directive and wins over `-v`.
pub fn init_tracing(verbosity: VerbosityLevel) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity >= VerbosityLevel::VeryVerbose)
        .try_init();
}

/// Application context with resolved configuration and runtime state
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Resolved configuration
    pub config: Config,
    /// Verbosity from `-v` flags
    pub verbosity: VerbosityLevel,
    /// Where the configuration file lives
    pub config_path: PathBuf,
    /// Where the credential store lives
    pub credentials_path: PathBuf,
}

impl AppContext {
    /// Build context with precedence: defaults > config file > env vars > CLI flags
    pub fn build(cli_color: Option<ColorChoice>, verbosity: VerbosityLevel) -> Self {
        let config_path = config::get_config_path();
        let credentials_path = config::get_credentials_path();

        // Defaults, file and environment are layered by the library loader
        let mut config = match config::load_config(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %config_path.display(), error = %e, "using default configuration");
                Config::default()
            }
        };

        if let Some(color) = cli_color {
            config.output.color = color;
        }

        Self {
            config,
            verbosity,
            config_path,
            credentials_path,
        }
    }

    /// Context over explicit paths, without reading the environment.
    #[cfg(test)]
    pub fn with_paths(config: Config, config_path: PathBuf, credentials_path: PathBuf) -> Self {
        Self {
            config,
            verbosity: VerbosityLevel::Normal,
            config_path,
            credentials_path,
        }
    }

    /// Registry location credentials are stored under.
    pub fn registry_key(&self) -> RegistryKey {
        RegistryKey::new(
            &self.config.registry.host,
            self.config.registry.repository.as_deref(),
        )
    }

    /// Stored credentials for the configured registry, if any.
    pub fn credentials(&self) -> Option<Credentials> {
        config::load_credentials(&self.credentials_path, &self.registry_key())
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
