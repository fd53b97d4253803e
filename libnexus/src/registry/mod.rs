//! Registry operations.
//!
//! [`Registry`] puts the retention collaborator traits on top of the HTTP
//! [`Client`]. It answers image and tag listings, resolves tags to digests,
//! summarizes manifests, and deletes tags by deleting the manifest they point
//! at.

use crate::client::Client;
use crate::digest::Digest;
use crate::error::Result;
use crate::oci::{ManifestOrIndex, ManifestSummary};
use crate::retention::{DigestResolver, RegistryApi};

mod builder;
pub use builder::RegistryBuilder;


/// Nexus (or any v2 registry) as seen by the retention engine.
#[derive(Debug, Clone)]
pub struct Registry {
    /// HTTP client for registry communication.
    client: Client,
}

impl Registry {
    /// Creates a new `Registry` over `client`.
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::client::Client;
    /// use libnexus::registry::Registry;
    ///
    /// let client = Client::new("http://localhost:8081/repository/docker", None).unwrap();
    /// let registry = Registry::new(client);
    /// assert_eq!(registry.url(), "http://localhost:8081/repository/docker");
    /// ```
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Base URL requests go to.
    pub fn url(&self) -> &str {
        self.client.registry_url()
    }

    /// Fetches and parses the manifest of `image:tag`.
    pub async fn fetch_manifest(&self, image: &str, tag: &str) -> Result<(ManifestOrIndex, Digest)> {
        let (bytes, digest) = self.client.fetch_manifest(image, tag).await?;
        Ok((ManifestOrIndex::from_bytes(&bytes)?, digest))
    }
}

impl DigestResolver for Registry {
    async fn get_image_digest(&self, image: &str, tag: &str) -> Result<Digest> {
        self.client.fetch_digest(image, tag).await
    }
}

impl RegistryApi for Registry {
    async fn list_images(&self) -> Result<Vec<String>> {
        self.client.fetch_catalog().await
    }

    async fn list_tags_by_image(&self, image: &str) -> Result<Vec<String>> {
        self.client.fetch_tags(image).await
    }

    async fn get_manifest(&self, image: &str, tag: &str) -> Result<ManifestSummary> {
        let (manifest, _) = self.fetch_manifest(image, tag).await?;
        Ok(ManifestSummary::from(&manifest))
    }

    /// Resolves the tag with `HEAD` and deletes the manifest by digest; the
    /// v2 API cannot delete by tag.
    async fn delete_image_by_tag(&self, image: &str, tag: &str) -> Result<()> {
        let digest = self.get_image_digest(image, tag).await?;
        tracing::debug!(image, tag, digest = %digest, "deleting manifest");
        self.client.delete_manifest(image, &digest).await
    }
}
