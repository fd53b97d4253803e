//! libnexus - tag housekeeping for Nexus Docker repositories
//!
//! libnexus lists images and tags of a private registry (Sonatype Nexus or any
//! registry speaking the Docker Registry HTTP API v2) and deletes old tags
//! under a retention policy.
//!
//! # Quick Start
//!
//! ```no_run
//! use libnexus::retention::{apply_retention, parse_keep_specs, RetentionRequest};
//! use libnexus::{Config, Credentials, RegistryBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.registry.host = "http://localhost:8081".to_string();
//!     config.registry.repository = Some("docker-hosted".to_string());
//!
//!     let registry = RegistryBuilder::new()
//!         .with_config(config.clone())
//!         .with_credentials(Credentials::basic("admin", "admin123"))
//!         .build()?;
//!
//!     // Keep every prod-* tag, the 3 newest stage-* tags, nothing else.
//!     let (specs, _) = parse_keep_specs("prod,stage:3");
//!     let request = RetentionRequest {
//!         policy: config.retention_policy(specs),
//!         dry_run: true,
//!         ..Default::default()
//!     };
//!
//!     let report = apply_retention(&registry, "my-app", &request).await?;
//!     for entry in report.planned().entries() {
//!         println!("would delete {}", entry.tag);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`retention`] - grouping, ordering, planning and deleting tags
//! - [`registry`] - the HTTP-backed implementation of [`retention::RegistryApi`]
//! - [`config`] - layered configuration (defaults, TOML file, environment)
//! - [`auth`] - credentials and the credential store

#![warn(clippy::all)]

/// Returns the libnexus crate version.
///
/// # Examples
///
/// ```
/// let version = libnexus::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub use auth::Credentials;
pub use client::Client;
pub use config::Config;
pub use digest::Digest;
pub use error::{NexusError, Result};
pub use oci::{LayerSummary, ManifestSummary};
pub use registry::{Registry, RegistryBuilder};
pub use retention::{DigestResolver, RegistryApi};

pub mod auth;
pub mod config;
pub mod retention;
pub mod registry;

#[doc(hidden)]
pub mod client;
#[doc(hidden)]
pub mod digest;
#[doc(hidden)]
pub mod error;
#[doc(hidden)]
pub mod format;
#[doc(hidden)]
pub mod oci;
