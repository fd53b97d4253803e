//! Digests that must never be deleted.
//!
//! Protection is by content digest, not by name: deleting a manifest removes
//! every tag pointing at it, so a tag that merely aliases an excluded tag must
//! survive as well.

use super::DigestResolver;
use crate::digest::Digest;
use crate::error::NexusError;
use std::collections::HashSet;

/// Tag name that is always excluded from deletion.
pub const IMPLICIT_EXCLUDE: &str = "latest";

/// Immutable set of protected digests, built once per invocation.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    names: Vec<String>,
    digests: HashSet<Digest>,
}

impl ExclusionSet {
    /// Resolves every excluded tag name (plus `latest`) to its digest.
    ///
    /// Names are trimmed and deduplicated. A name that fails to resolve is
    /// reported in the returned error list and does not stop the others; a
    /// missing `latest` is the common case and ends up there too.
    pub async fn build<R: DigestResolver>(
        resolver: &R,
        image: &str,
        exclude_names: &[String],
    ) -> (Self, Vec<NexusError>) {
        let names = normalize_names(exclude_names);
        let mut digests = HashSet::new();
        let mut errors = Vec::new();

        for name in &names {
            match resolver.get_image_digest(image, name).await {
                Ok(digest) => {
                    tracing::debug!(tag = %name, digest = %digest, "excluded from deletion");
                    digests.insert(digest);
                }
                Err(e) => errors.push(NexusError::resolution(name.as_str(), e)),
            }
        }

        (Self { names, digests }, errors)
    }

    /// Builds a set from already-known names and digests.
    pub fn from_parts<I>(exclude_names: &[String], digests: I) -> Self
    where
        I: IntoIterator<Item = Digest>,
    {
        Self {
            names: normalize_names(exclude_names),
            digests: digests.into_iter().collect(),
        }
    }

    /// Returns whether deleting `digest` is forbidden.
    pub fn is_protected(&self, digest: &Digest) -> bool {
        self.digests.contains(digest)
    }

    /// Excluded tag names, `latest` included.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of protected digests.
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// Returns true if no digest is protected.
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// View protecting only the excluded digests.
    pub fn protected(&self) -> ProtectedDigests<'_> {
        ProtectedDigests {
            base: self,
            retained: None,
        }
    }

    /// Overlays retained digests on this set without mutating it.
    pub fn with_retained<'a>(&'a self, retained: &'a HashSet<Digest>) -> ProtectedDigests<'a> {
        ProtectedDigests {
            base: self,
            retained: Some(retained),
        }
    }
}

/// Union of the base exclusion set and the digests retained by the planners.
#[derive(Debug, Clone, Copy)]
pub struct ProtectedDigests<'a> {
    base: &'a ExclusionSet,
    retained: Option<&'a HashSet<Digest>>,
}

impl ProtectedDigests<'_> {
    /// Returns whether `digest` is excluded or retained.
    pub fn is_protected(&self, digest: &Digest) -> bool {
        self.base.is_protected(digest)
            || self.retained.is_some_and(|retained| retained.contains(digest))
    }
}

fn normalize_names(exclude_names: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(exclude_names.len() + 1);

    let candidates = exclude_names
        .iter()
        .map(|name| name.trim())
        .chain(std::iter::once(IMPLICIT_EXCLUDE));

    for name in candidates {
        if !name.is_empty() && !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }

    names
}
