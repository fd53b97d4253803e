//! OCI manifest types.
//!
//! Registry manifests are parsed with the `oci-spec` crate. Nexus serves both
//! Docker schema 2 and OCI documents; the two share a JSON layout, so a single
//! parser covers both. [`ManifestSummary`] is the reduced view used by
//! `image info`: the config blob size and the layer list.

pub use oci_spec::image::{Descriptor, ImageIndex, ImageManifest};

use crate::error::{NexusError, Result};
use serde::Serialize;


/// Either a single-platform image manifest or a multi-platform image index.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum ManifestOrIndex {
    /// A single-platform image manifest
    Manifest(ImageManifest),
    /// A multi-platform image index (Docker manifest list)
    Index(ImageIndex),
}

impl ManifestOrIndex {
    /// Parses manifest bytes, detecting whether they hold a manifest or an index.
    ///
    /// The `mediaType` field decides when present; otherwise the document shape
    /// (`manifests` versus `layers`/`config`) is used.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| NexusError::validation_with_source("Failed to parse manifest JSON", e))?;

        let media_type = value
            .get("mediaType")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let is_index = if media_type.contains("index") || media_type.contains("list") {
            true
        } else if media_type.contains("manifest") {
            false
        } else if value.get("manifests").is_some() {
            true
        } else if value.get("layers").is_some() || value.get("config").is_some() {
            false
        } else {
            return Err(NexusError::validation(
                "Unable to determine if content is a manifest or index",
            ));
        };

        if is_index {
            let index: ImageIndex = serde_json::from_value(value)
                .map_err(|e| NexusError::validation_with_source("Failed to parse image index", e))?;
            Ok(ManifestOrIndex::Index(index))
        } else {
            let manifest: ImageManifest = serde_json::from_value(value).map_err(|e| {
                NexusError::validation_with_source("Failed to parse image manifest", e)
            })?;
            Ok(ManifestOrIndex::Manifest(manifest))
        }
    }

    /// Returns true if this is a multi-platform index.
    pub fn is_index(&self) -> bool {
        matches!(self, ManifestOrIndex::Index(_))
    }
}

/// One blob referenced by a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerSummary {
    /// Content digest of the blob
    pub digest: String,
    /// Size in bytes
    pub size: u64,
}

/// Size information of an image manifest.
///
/// For an index, `config_size` is zero and `layers` lists the referenced
/// per-platform manifests instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestSummary {
    /// Size of the image config blob in bytes
    pub config_size: u64,
    /// Layers in manifest order
    pub layers: Vec<LayerSummary>,
    /// Whether the summary was taken from an index
    pub is_index: bool,
}

impl ManifestSummary {
    /// Sum of the config size and every layer size.
    pub fn total_size(&self) -> u64 {
        self.config_size + self.layers.iter().map(|l| l.size).sum::<u64>()
    }
}

impl From<&ManifestOrIndex> for ManifestSummary {
    fn from(value: &ManifestOrIndex) -> Self {
        match value {
            ManifestOrIndex::Manifest(manifest) => ManifestSummary {
                config_size: manifest.config().size(),
                layers: manifest.layers().iter().map(layer_summary).collect(),
                is_index: false,
            },
            ManifestOrIndex::Index(index) => ManifestSummary {
                config_size: 0,
                layers: index.manifests().iter().map(layer_summary).collect(),
                is_index: true,
            },
        }
    }
}

fn layer_summary(descriptor: &Descriptor) -> LayerSummary {
    LayerSummary {
        digest: descriptor.digest().to_string(),
        size: descriptor.size(),
    }
}
