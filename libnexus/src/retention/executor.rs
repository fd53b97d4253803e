//! Applying delete plans.

use super::exclusion::ProtectedDigests;
use super::planner::DeletePlan;
use super::RegistryApi;
use crate::digest::Digest;
use crate::error::NexusError;
use std::collections::HashSet;

/// What happened to each planned tag.
#[derive(Debug, Default)]
pub struct DeleteReport {
    /// Tags that are gone, including aliases removed with an earlier delete
    pub deleted: Vec<String>,
    /// Tags left alone because their digest turned out to be protected
    pub skipped: Vec<String>,
    /// Tags that could not be resolved or deleted
    pub failed: Vec<NexusError>,
}

impl DeleteReport {
    /// Returns true if any tag failed.
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Deletes planned tags one at a time.
pub struct DeletionExecutor;

impl DeletionExecutor {
    /// Executes `plan` against the registry.
    ///
    /// Each tag is re-resolved right before deletion so a tag moved onto an
    /// excluded or retained digest since planning is skipped. Tags sharing a
    /// digest with one already deleted in this batch are gone with it and
    /// count as deleted without another request. Failures are collected and
    /// the batch carries on.
    pub async fn execute<R: RegistryApi>(
        registry: &R,
        image: &str,
        plan: &DeletePlan,
        protected: ProtectedDigests<'_>,
    ) -> DeleteReport {
        let mut report = DeleteReport::default();
        let mut removed: HashSet<Digest> = HashSet::new();

        for entry in plan.entries() {
            let tag = entry.tag.as_str();

            let digest = match registry.get_image_digest(image, tag).await {
                Ok(digest) => digest,
                Err(e) if e.is_not_found() && removed.contains(&entry.digest) => {
                    tracing::info!(image, tag, "removed together with an aliased tag");
                    report.deleted.push(entry.tag.clone());
                    continue;
                }
                Err(e) => {
                    tracing::warn!(image, tag, error = %e, "could not resolve tag before deleting");
                    report.failed.push(NexusError::resolution(tag, e));
                    continue;
                }
            };

            if protected.is_protected(&digest) {
                tracing::info!(image, tag, digest = %digest, "digest is protected, skipping");
                report.skipped.push(entry.tag.clone());
                continue;
            }

            if removed.contains(&digest) {
                tracing::info!(image, tag, "removed together with an aliased tag");
                report.deleted.push(entry.tag.clone());
                continue;
            }

            match registry.delete_image_by_tag(image, tag).await {
                Ok(()) => {
                    tracing::info!(image, tag, digest = %digest, "deleted");
                    removed.insert(digest);
                    report.deleted.push(entry.tag.clone());
                }
                Err(e) => {
                    tracing::warn!(image, tag, error = %e, "delete failed");
                    report.failed.push(NexusError::delete(tag, e));
                }
            }
        }

        report
    }
}
