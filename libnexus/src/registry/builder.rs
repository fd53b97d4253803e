use super::Registry;
use crate::auth::Credentials;
use crate::client::{Client, ClientConfig};
use crate::config::Config;
use crate::error::Result;

/// Builder for a [`Registry`] from configuration.
///
/// The URL comes from [`Config::base_url`] unless set explicitly; timeout and
/// TLS settings come from the config's `network` and `registry` sections.
///
/// # Examples
///
/// ```
/// use libnexus::{Config, Credentials, RegistryBuilder};
///
/// let mut config = Config::default();
/// config.registry.host = "http://localhost:8081".to_string();
/// config.registry.repository = Some("docker-hosted".to_string());
///
/// let registry = RegistryBuilder::new()
///     .with_config(config)
///     .with_credentials(Credentials::basic("admin", "admin123"))
///     .build()
///     .unwrap();
/// assert_eq!(registry.url(), "http://localhost:8081/repository/docker-hosted");
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry_url: Option<String>,
    config: Option<Config>,
    credentials: Option<Credentials>,
}

impl RegistryBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the registry URL, overriding the configured host.
    pub fn registry_url(mut self, url: &str) -> Self {
        self.registry_url = Some(url.to_string());
        self
    }

    /// Sets configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets credentials for every request. Anonymous credentials are dropped.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = (!credentials.is_anonymous()).then_some(credentials);
        self
    }

    /// Builds the registry. No request is sent.
    pub fn build(self) -> Result<Registry> {
        let config = self.config.unwrap_or_default();

        let registry_url = match self.registry_url {
            Some(url) => url,
            None => config.base_url()?,
        };

        let client_config = ClientConfig::new()
            .with_timeout(config.network.timeout)
            .with_insecure(config.registry.insecure);

        let client = Client::with_config(&registry_url, self.credentials, client_config)?;
        Ok(Registry::new(client))
    }
}
