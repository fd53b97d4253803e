//! OCI content digests.
//!
//! A digest is the unit of "sameness" in a registry: two tags resolving to the
//! same digest point at the same manifest, and deleting one deletes both.
//! This module wraps `oci_spec::image::Digest` so digests are validated once at
//! the registry boundary and can be stored in hash sets afterwards.

use crate::error::{NexusError, Result};
use oci_spec::image::Digest as OciDigest;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;


/// Represents a content digest, wrapping the `oci_spec::image::Digest` type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(OciDigest);

impl Digest {
    /// Returns the algorithm part of the digest (e.g. `sha256`).
    ///
    /// # Examples
    ///
    /// ```
    /// use libnexus::Digest;
    ///
    /// let digest: Digest = "sha256:7173b809ca12ec5dee4506cd86be934c4596dd234ee82c0662eac04a8c2c71dc"
    ///     .parse()
    ///     .unwrap();
    /// assert_eq!(digest.algorithm(), "sha256");
    /// ```
    pub fn algorithm(&self) -> String {
        self.0.algorithm().to_string()
    }

    /// Returns the encoded (hex) part of the digest.
    pub fn hex(&self) -> &str {
        self.0.digest()
    }

    /// Returns the first 12 hex characters, as shown by `docker images`.
    pub fn short(&self) -> &str {
        let hex = self.hex();
        &hex[..hex.len().min(12)]
    }
}

impl FromStr for Digest {
    type Err = NexusError;

    fn from_str(s: &str) -> Result<Self> {
        let oci_digest = OciDigest::from_str(s.trim()).map_err(|e| NexusError::Validation {
            message: format!("Invalid digest format: {}", e),
            source: Some(Box::new(e)),
        })?;
        Ok(Digest(oci_digest))
    }
}

impl Hash for Digest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_string().hash(state);
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
