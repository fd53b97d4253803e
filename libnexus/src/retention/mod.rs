//! Tag retention.
//!
//! Given an image's tags, a keep policy and a list of excluded tags, this
//! module decides which tags to delete and deletes them:
//!
//! 1. [`ExclusionSet::build`] resolves the excluded names (plus `latest`) to
//!    digests.
//! 2. [`RetentionGrouper`] splits the remaining tags into groups by prefix.
//! 3. [`RetentionPlanner`] resolves and sorts each group. The digests every
//!    group retains are merged, then each group picks the tags below its keep
//!    count, never touching a digest that is excluded or retained by any
//!    group.
//! 4. [`DeletionExecutor`] deletes the merged plan, re-checking protection
//!    before every request.
//!
//! The registry is only reached through [`RegistryApi`], so everything here
//! works against an in-memory double as well as against Nexus. Requests are
//! awaited one after another.

#![allow(async_fn_in_trait)]

pub mod comparator;
pub mod exclusion;
pub mod executor;
pub mod planner;
pub mod policy;
pub mod single;

#[cfg(test)]
mod comparator_tests;
#[cfg(test)]
mod planner_tests;
#[cfg(test)]
mod testing;

pub use comparator::{SortStrategy, VersionComparator, sort_tags};
pub use exclusion::{ExclusionSet, IMPLICIT_EXCLUDE, ProtectedDigests};
pub use executor::{DeleteReport, DeletionExecutor};
pub use planner::{DeletePlan, GroupPlan, PlannedDeletion, PreparedGroup, RetentionPlanner};
pub use policy::{
    DEFAULT_KEEP_ALL_GROUP, DEFAULT_OTHERS_GROUP, KeepCount, KeepSpec, RetentionGroup,
    RetentionGrouper, RetentionPolicy, parse_keep_specs,
};
pub use single::{DeletionState, SingleTagDeletion};

use crate::digest::Digest;
use crate::error::{NexusError, Result};
use crate::oci::ManifestSummary;
use std::collections::HashSet;

/// Resolves a tag to the digest of the manifest it points at.
pub trait DigestResolver {
    /// Returns the digest of `image:tag`.
    ///
    /// # Errors
    ///
    /// Returns [`NexusError::NotFound`] if the tag does not exist.
    async fn get_image_digest(&self, image: &str, tag: &str) -> Result<Digest>;
}

/// Registry operations used by the retention engine and the CLI.
pub trait RegistryApi: DigestResolver {
    /// Lists every image in the repository.
    async fn list_images(&self) -> Result<Vec<String>>;

    /// Lists every tag of `image`.
    async fn list_tags_by_image(&self, image: &str) -> Result<Vec<String>>;

    /// Returns the config size and layers of `image:tag`.
    async fn get_manifest(&self, image: &str, tag: &str) -> Result<ManifestSummary>;

    /// Deletes the manifest `image:tag` points at, and with it every alias.
    async fn delete_image_by_tag(&self, image: &str, tag: &str) -> Result<()>;
}

/// Input of [`apply_retention`].
#[derive(Debug, Clone, Default)]
pub struct RetentionRequest {
    /// Groups and keep counts
    pub policy: RetentionPolicy,
    /// Tag ordering
    pub strategy: SortStrategy,
    /// Tag names never to delete; `latest` is added automatically
    pub exclude: Vec<String>,
    /// Plan only
    pub dry_run: bool,
}

/// Everything [`apply_retention`] found and did.
#[derive(Debug, Default)]
pub struct RetentionReport {
    /// Explicitly excluded names that could not be resolved
    pub exclusion_failures: Vec<NexusError>,
    /// The implicit `latest` exclusion could not be resolved
    pub exclusion_warnings: Vec<NexusError>,
    /// Groups that could not be planned, by name
    pub group_failures: Vec<(String, NexusError)>,
    /// Plans of the groups that could be planned, in group-name order
    pub plans: Vec<GroupPlan>,
    /// Execution result, `None` on a dry run
    pub deletions: Option<DeleteReport>,
}

impl RetentionReport {
    /// Tags planned for deletion across all groups.
    pub fn planned(&self) -> DeletePlan {
        DeletePlan::merge(&self.plans)
    }

    /// Returns true if an excluded name could not be resolved, a group could
    /// not be planned or a delete failed.
    ///
    /// A missing implicit `latest` is only a warning: an image without a
    /// `latest` tag is normal.
    pub fn has_failures(&self) -> bool {
        !self.exclusion_failures.is_empty()
            || !self.group_failures.is_empty()
            || self
                .deletions
                .as_ref()
                .is_some_and(DeleteReport::has_failures)
    }
}

/// Applies a retention policy to one image.
///
/// Only a failure to list the image's tags aborts the run; exclusion, group
/// and per-tag errors are collected in the report. A digest retained by any
/// group is protected in every other group and again right before each
/// delete.
///
/// # Examples
///
/// ```no_run
/// # use libnexus::{Client, Registry};
/// # use libnexus::retention::{apply_retention, parse_keep_specs, RetentionPolicy, RetentionRequest};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = Registry::new(Client::new("localhost:8081/repository/docker", None)?);
/// let (specs, _errors) = parse_keep_specs("prod,stage:3,others:5");
/// let request = RetentionRequest {
///     policy: RetentionPolicy::new(specs),
///     dry_run: true,
///     ..Default::default()
/// };
///
/// let report = apply_retention(&registry, "app", &request).await?;
/// for entry in report.planned().entries() {
///     println!("would delete {}", entry.tag);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn apply_retention<R: RegistryApi>(
    registry: &R,
    image: &str,
    request: &RetentionRequest,
) -> Result<RetentionReport> {
    let tags = registry.list_tags_by_image(image).await?;
    tracing::debug!(image, count = tags.len(), "listed tags");

    let (exclusion, exclusion_errors) =
        ExclusionSet::build(registry, image, &request.exclude).await;
    let (exclusion_warnings, exclusion_failures): (Vec<_>, Vec<_>) = exclusion_errors
        .into_iter()
        .partition(|e| e.tag() == Some(IMPLICIT_EXCLUDE));
    for warning in &exclusion_warnings {
        tracing::debug!(image, error = %warning, "implicit exclusion not resolved");
    }
    for failure in &exclusion_failures {
        tracing::warn!(image, error = %failure, "excluded tag not resolved");
    }

    let groups = RetentionGrouper::new(&request.policy).group(&tags, exclusion.names());

    let mut report = RetentionReport {
        exclusion_failures,
        exclusion_warnings,
        ..Default::default()
    };

    let mut prepared = Vec::with_capacity(groups.len());
    for (name, group) in &groups {
        match RetentionPlanner::prepare(registry, image, group, request.strategy, &exclusion).await {
            Ok(ready) => prepared.push(ready),
            Err(e) => {
                tracing::warn!(image, group = %name, error = %e, "group skipped");
                report.group_failures.push((name.clone(), e));
            }
        }
    }

    // Tags of different groups can share a manifest
    let retained: HashSet<Digest> = prepared
        .iter()
        .flat_map(|group| group.retained().iter().cloned())
        .collect();
    let protected = exclusion.with_retained(&retained);

    report.plans = prepared
        .into_iter()
        .map(|group| group.finish(protected))
        .collect();

    if !request.dry_run {
        let plan = report.planned();
        report.deletions = Some(DeletionExecutor::execute(registry, image, &plan, protected).await);
    }

    Ok(report)
}
