//! In-memory registry for retention tests.

use super::{DigestResolver, RegistryApi};
use crate::digest::Digest;
use crate::error::{NexusError, Result};
use crate::oci::ManifestSummary;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

/// Builds a valid sha256 digest from a small number.
pub fn digest(n: u64) -> Digest {
    format!("sha256:{:064x}", n).parse().unwrap()
}

/// Converts string literals to owned tags.
pub fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Registry double. Deleting a tag removes every tag with the same digest,
/// like a real registry deleting a manifest.
#[derive(Default)]
pub struct FakeRegistry {
    images: Mutex<BTreeMap<String, Vec<(String, Digest)>>>,
    delete_calls: Mutex<Vec<String>>,
    resolve_calls: Mutex<Vec<String>>,
    failing_resolves: HashSet<String>,
    failing_deletes: HashSet<String>,
    failing_listing: bool,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an image whose tags point at `digest(n)`.
    pub fn with_image(self, image: &str, entries: &[(&str, u64)]) -> Self {
        let entries = entries
            .iter()
            .map(|(tag, n)| (tag.to_string(), digest(*n)))
            .collect();
        self.images.lock().unwrap().insert(image.to_string(), entries);
        self
    }

    pub fn failing_resolve(mut self, tag: &str) -> Self {
        self.failing_resolves.insert(tag.to_string());
        self
    }

    pub fn failing_delete(mut self, tag: &str) -> Self {
        self.failing_deletes.insert(tag.to_string());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.failing_listing = true;
        self
    }

    /// Tags passed to `delete_image_by_tag`, in call order.
    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }

    /// Tags passed to `get_image_digest`, in call order.
    pub fn resolve_calls(&self) -> Vec<String> {
        self.resolve_calls.lock().unwrap().clone()
    }

    /// Tags currently present on `image`.
    pub fn remaining(&self, image: &str) -> Vec<String> {
        self.images
            .lock()
            .unwrap()
            .get(image)
            .map(|entries| entries.iter().map(|(tag, _)| tag.clone()).collect())
            .unwrap_or_default()
    }

    /// Points an existing tag at another digest.
    pub fn retag(&self, image: &str, tag: &str, n: u64) {
        let mut images = self.images.lock().unwrap();
        if let Some(entry) = images
            .get_mut(image)
            .and_then(|entries| entries.iter_mut().find(|(t, _)| t == tag))
        {
            entry.1 = digest(n);
        }
    }
}

impl DigestResolver for FakeRegistry {
    async fn get_image_digest(&self, image: &str, tag: &str) -> Result<Digest> {
        self.resolve_calls.lock().unwrap().push(tag.to_string());

        if self.failing_resolves.contains(tag) {
            return Err(NexusError::server("resolve failed", 500));
        }

        self.images
            .lock()
            .unwrap()
            .get(image)
            .and_then(|entries| entries.iter().find(|(t, _)| t == tag))
            .map(|(_, d)| d.clone())
            .ok_or_else(|| NexusError::not_found("manifest", format!("{}:{}", image, tag)))
    }
}

impl RegistryApi for FakeRegistry {
    async fn list_images(&self) -> Result<Vec<String>> {
        Ok(self.images.lock().unwrap().keys().cloned().collect())
    }

    async fn list_tags_by_image(&self, image: &str) -> Result<Vec<String>> {
        if self.failing_listing {
            return Err(NexusError::network("connection refused"));
        }

        self.images
            .lock()
            .unwrap()
            .get(image)
            .map(|entries| entries.iter().map(|(tag, _)| tag.clone()).collect())
            .ok_or_else(|| NexusError::not_found("image", image))
    }

    async fn get_manifest(&self, image: &str, tag: &str) -> Result<ManifestSummary> {
        self.get_image_digest(image, tag).await?;
        Ok(ManifestSummary {
            config_size: 0,
            layers: Vec::new(),
            is_index: false,
        })
    }

    async fn delete_image_by_tag(&self, image: &str, tag: &str) -> Result<()> {
        self.delete_calls.lock().unwrap().push(tag.to_string());

        if self.failing_deletes.contains(tag) {
            return Err(NexusError::server("delete failed", 500));
        }

        let mut images = self.images.lock().unwrap();
        let entries = images
            .get_mut(image)
            .ok_or_else(|| NexusError::not_found("image", image))?;
        let target = entries
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, d)| d.clone())
            .ok_or_else(|| NexusError::not_found("manifest", format!("{}:{}", image, tag)))?;

        entries.retain(|(_, d)| d != &target);
        Ok(())
    }
}
