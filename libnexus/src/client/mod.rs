//! HTTP client for the Docker Registry HTTP API v2.
//!
//! This module provides a thin client built on reqwest. Nexus Repository
//! Manager exposes every hosted Docker repository under
//! `<host>/repository/<name>/v2/`, while standalone registries serve `/v2/` at
//! the root; callers pass whichever base URL applies and the client appends
//! the API paths.

use crate::auth::Credentials;
use crate::digest::Digest;
use crate::error::{NexusError, Result};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;


/// Media types accepted when fetching manifests.
///
/// Docker v2 schema 2 is listed first: Nexus computes `Docker-Content-Digest`
/// for the representation it returns, and deletes must use that digest.
const MANIFEST_ACCEPT: &str = "application/vnd.docker.distribution.manifest.v2+json, \
     application/vnd.docker.distribution.manifest.list.v2+json, \
     application/vnd.oci.image.manifest.v1+json, \
     application/vnd.oci.image.index.v1+json";

/// Response from the catalog API endpoint.
#[derive(Debug, Deserialize)]
struct CatalogResponse {
    /// List of repository names
    #[serde(default)]
    repositories: Vec<String>,
}

/// Response from the tags list API endpoint.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    /// Repository name
    name: String,
    /// List of tag names (registries send `null` for an image without tags)
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Configuration for the HTTP client.
///
/// # Examples
///
/// ```
/// use libnexus::client::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_timeout(60)
///     .with_insecure(true);
/// assert_eq!(config.timeout_seconds, 60);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Maximum idle connections per host (default: 10)
    pub max_idle_per_host: usize,
    /// Accept self-signed or otherwise invalid TLS certificates (default: false)
    pub insecure: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_idle_per_host: 10,
            insecure: false,
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the maximum idle connections per host.
    pub fn with_max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }

    /// Allows invalid TLS certificates.
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }
}

/// HTTP client for registry operations.
#[derive(Debug, Clone)]
pub struct Client {
    /// The underlying HTTP client
    http_client: ReqwestClient,
    /// Base registry URL, without the `/v2` suffix
    registry_url: String,
    /// Credentials attached to every request
    credentials: Option<Credentials>,
    /// Request timeout, kept for error messages
    timeout_seconds: u64,
}

impl Client {
    /// Creates a new client with default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::client::Client;
    ///
    /// let client = Client::new("nexus.example.com:8081/repository/docker-hosted", None).unwrap();
    /// assert_eq!(
    ///     client.registry_url(),
    ///     "http://nexus.example.com:8081/repository/docker-hosted"
    /// );
    /// ```
    pub fn new(registry_url: &str, credentials: Option<Credentials>) -> Result<Self> {
        Self::with_config(registry_url, credentials, ClientConfig::default())
    }

    /// Creates a new client with custom configuration.
    pub fn with_config(
        registry_url: &str,
        credentials: Option<Credentials>,
        config: ClientConfig,
    ) -> Result<Self> {
        let normalized_url = Self::normalize_url(registry_url)?;

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| NexusError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            registry_url: normalized_url,
            credentials,
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// Normalizes a registry URL by ensuring it has a scheme and removing trailing slashes.
    fn normalize_url(url: &str) -> Result<String> {
        let url = url.trim();

        if url.is_empty() {
            return Err(NexusError::validation("Registry URL cannot be empty"));
        }

        let url = if !url.starts_with("http://") && !url.starts_with("https://") {
            format!("http://{}", url)
        } else {
            url.to_string()
        };

        Ok(url.trim_end_matches('/').to_string())
    }

    /// Returns the base registry URL.
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    /// Returns the credentials attached to requests, if any.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Attaches the Authorization header when credentials are configured.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self
            .credentials
            .as_ref()
            .and_then(|creds| creds.to_header_value())
        {
            Some(header) => request.header(reqwest::header::AUTHORIZATION, header),
            None => request,
        }
    }

    /// Fetches the catalog of repositories (images), following pagination.
    pub async fn fetch_catalog(&self) -> Result<Vec<String>> {
        let mut all_repositories = Vec::new();
        let mut url = format!("{}/v2/_catalog", self.registry_url);

        loop {
            let response = self
                .authorize(self.http_client.get(&url))
                .send()
                .await
                .map_err(|e| self.translate_reqwest_error(e))?;

            // Read the Link header before the body consumes the response
            let next_path = Self::extract_next_link(response.headers());

            let response = Self::check_response_status(response).await?;

            let catalog: CatalogResponse = response.json().await.map_err(|e| {
                NexusError::validation_with_source("Failed to parse catalog response", e)
            })?;

            all_repositories.extend(catalog.repositories);

            match next_path {
                Some(path) => url = self.resolve_link(&path),
                None => break,
            }
        }

        Ok(all_repositories)
    }

    /// Fetches every tag of an image, following pagination.
    ///
    /// # Errors
    ///
    /// Returns [`NexusError::NotFound`] if the image does not exist.
    pub async fn fetch_tags(&self, repository: &str) -> Result<Vec<String>> {
        let mut all_tags = Vec::new();
        let mut url = format!("{}/v2/{}/tags/list", self.registry_url, repository);

        loop {
            let response = self
                .authorize(self.http_client.get(&url))
                .send()
                .await
                .map_err(|e| self.translate_reqwest_error(e))?;

            let next_path = Self::extract_next_link(response.headers());

            let response = Self::check_response_status(response)
                .await
                .map_err(|e| match e {
                    NexusError::NotFound { .. } => NexusError::not_found("image", repository),
                    other => other,
                })?;

            let tags_response: TagsResponse = response.json().await.map_err(|e| {
                NexusError::validation_with_source("Failed to parse tags response", e)
            })?;

            if tags_response.name != repository {
                return Err(NexusError::validation(format!(
                    "Registry returned tags for '{}' but expected '{}'",
                    tags_response.name, repository
                )));
            }

            all_tags.extend(tags_response.tags.unwrap_or_default());

            match next_path {
                Some(path) => url = self.resolve_link(&path),
                None => break,
            }
        }

        Ok(all_tags)
    }

    /// Fetches a manifest by tag or digest.
    ///
    /// Returns the raw manifest bytes and the `Docker-Content-Digest` header.
    pub async fn fetch_manifest(
        &self,
        repository: &str,
        reference: &str,
    ) -> Result<(Vec<u8>, Digest)> {
        let url = format!(
            "{}/v2/{}/manifests/{}",
            self.registry_url, repository, reference
        );

        let response = self
            .authorize(self.http_client.get(&url))
            .header(reqwest::header::ACCEPT, MANIFEST_ACCEPT)
            .send()
            .await
            .map_err(|e| self.translate_reqwest_error(e))?;

        let response = Self::check_response_status(response)
            .await
            .map_err(|e| Self::manifest_not_found(e, repository, reference))?;

        let digest = Self::content_digest(&response)?;

        let manifest_bytes = response
            .bytes()
            .await
            .map_err(|e| NexusError::network_with_source("Failed to read manifest response", e))?;

        Ok((manifest_bytes.to_vec(), digest))
    }

    /// Resolves a tag to its manifest digest with a `HEAD` request.
    ///
    /// # Errors
    ///
    /// Returns [`NexusError::NotFound`] if the tag does not exist, or a
    /// validation error if the registry omits `Docker-Content-Digest`.
    pub async fn fetch_digest(&self, repository: &str, reference: &str) -> Result<Digest> {
        let url = format!(
            "{}/v2/{}/manifests/{}",
            self.registry_url, repository, reference
        );

        let response = self
            .authorize(self.http_client.head(&url))
            .header(reqwest::header::ACCEPT, MANIFEST_ACCEPT)
            .send()
            .await
            .map_err(|e| self.translate_reqwest_error(e))?;

        let response = Self::check_response_status(response)
            .await
            .map_err(|e| Self::manifest_not_found(e, repository, reference))?;

        Self::content_digest(&response)
    }

    /// Deletes a manifest by digest.
    ///
    /// The registry removes every tag pointing at the manifest. Nexus answers
    /// `202 Accepted`; the blobs are reclaimed later by its cleanup task.
    pub async fn delete_manifest(&self, repository: &str, digest: &Digest) -> Result<()> {
        let url = format!(
            "{}/v2/{}/manifests/{}",
            self.registry_url, repository, digest
        );

        let response = self
            .authorize(self.http_client.delete(&url))
            .send()
            .await
            .map_err(|e| self.translate_reqwest_error(e))?;

        Self::check_response_status(response)
            .await
            .map_err(|e| Self::manifest_not_found(e, repository, &digest.to_string()))?;

        Ok(())
    }

    /// Reads and validates the `Docker-Content-Digest` header.
    fn content_digest(response: &Response) -> Result<Digest> {
        let header = response
            .headers()
            .get("Docker-Content-Digest")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| NexusError::validation("Response missing Docker-Content-Digest header"))?;

        Digest::from_str(header)
    }

    /// Narrows a generic 404 into "manifest not found" for `repository:reference`.
    fn manifest_not_found(error: NexusError, repository: &str, reference: &str) -> NexusError {
        match error {
            NexusError::NotFound { .. } => {
                NexusError::not_found("manifest", format!("{}:{}", repository, reference))
            }
            other => other,
        }
    }

    /// Turns a Link header target into an absolute URL.
    ///
    /// Registries send paths relative to the host (`/v2/...`); behind Nexus the
    /// path already carries the `/repository/<name>` prefix, so only the origin
    /// of the base URL is reused.
    fn resolve_link(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let origin_end = self
            .registry_url
            .find("://")
            .map(|scheme_end| {
                self.registry_url[scheme_end + 3..]
                    .find('/')
                    .map(|i| scheme_end + 3 + i)
                    .unwrap_or(self.registry_url.len())
            })
            .unwrap_or(self.registry_url.len());

        let base = if path.starts_with(&self.registry_url[origin_end..]) {
            &self.registry_url[..origin_end]
        } else {
            self.registry_url.as_str()
        };

        format!("{}{}", base, path)
    }

    /// Extracts the next page path from the Link header.
    ///
    /// Format: `</v2/_catalog?n=100&last=repo99>; rel="next"`
    fn extract_next_link(headers: &reqwest::header::HeaderMap) -> Option<String> {
        let link_header = headers.get(reqwest::header::LINK)?;
        let link_str = link_header.to_str().ok()?;

        for link_part in link_str.split(',') {
            let link_part = link_part.trim();

            if link_part.contains("rel=\"next\"") || link_part.contains("rel='next'") {
                if let Some(start) = link_part.find('<')
                    && let Some(end) = link_part.find('>')
                {
                    return Some(link_part[start + 1..end].to_string());
                }
            }
        }

        None
    }

    /// Translates a reqwest error into a NexusError.
    fn translate_reqwest_error(&self, error: reqwest::Error) -> NexusError {
        if error.is_timeout() {
            NexusError::network(format!(
                "Request to {} timed out after {} seconds",
                self.registry_url, self.timeout_seconds
            ))
        } else if error.is_connect() {
            NexusError::network_with_source(
                format!("Failed to connect to registry at {}", self.registry_url),
                error,
            )
        } else {
            NexusError::network_with_source(
                format!("Network error communicating with {}", self.registry_url),
                error,
            )
        }
    }

    /// Checks the HTTP response status and translates errors to NexusError.
    async fn check_response_status(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("(unable to read response body)"));

        match status {
            StatusCode::UNAUTHORIZED => Err(NexusError::authentication(
                format!("Authentication required for {}: {}", url, error_body),
                Some(401),
            )),
            StatusCode::FORBIDDEN => Err(NexusError::authentication(
                format!("Access forbidden for {}: {}", url, error_body),
                Some(403),
            )),
            StatusCode::NOT_FOUND => Err(NexusError::not_found("endpoint", &url)),
            StatusCode::METHOD_NOT_ALLOWED => Err(NexusError::validation(format!(
                "Registry at {} does not allow this operation (is deletion enabled?)",
                url
            ))),
            StatusCode::TOO_MANY_REQUESTS => Err(NexusError::rate_limit(
                format!("Rate limit exceeded for {}", url),
                None,
            )),
            StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => Err(NexusError::server(
                format!("Server error from {}: {}", url, error_body),
                status.as_u16(),
            )),
            _ => Err(NexusError::network(format!(
                "HTTP {} from {}: {}",
                status.as_u16(),
                url,
                error_body
            ))),
        }
    }
}
