//! Per-group delete planning.

use super::comparator::{SortStrategy, VersionComparator};
use super::exclusion::{ExclusionSet, ProtectedDigests};
use super::policy::{KeepCount, RetentionGroup};
use super::DigestResolver;
use crate::digest::Digest;
use crate::error::{NexusError, Result};
use std::collections::{HashMap, HashSet};

/// A tag selected for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDeletion {
    /// Tag name
    pub tag: String,
    /// Digest the tag resolved to while planning
    pub digest: Digest,
    /// Group the tag belongs to
    pub group: String,
}

/// Outcome of planning one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPlan {
    /// Group name
    pub group: String,
    /// Keep count the plan was computed with
    pub keep: KeepCount,
    /// Tags to delete, oldest first
    pub delete: Vec<PlannedDeletion>,
    /// Tags that stay, in sorted order
    pub retain: Vec<String>,
}

/// Deletions of every group, in group-name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletePlan {
    entries: Vec<PlannedDeletion>,
}

impl DeletePlan {
    /// Unions group plans. Callers pass them in group-name order.
    pub fn merge<'a, I>(plans: I) -> Self
    where
        I: IntoIterator<Item = &'a GroupPlan>,
    {
        Self {
            entries: plans
                .into_iter()
                .flat_map(|plan| plan.delete.iter().cloned())
                .collect(),
        }
    }

    /// Planned deletions.
    pub fn entries(&self) -> &[PlannedDeletion] {
        &self.entries
    }

    /// Number of planned deletions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is to be deleted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A group whose members are resolved and sorted, ready to be planned.
///
/// Splitting planning in two lets the caller collect the retained digests of
/// every group before any group decides what to delete: tags of different
/// groups may alias the same manifest.
#[derive(Debug, Clone)]
pub struct PreparedGroup {
    group: String,
    keep: KeepCount,
    sorted: Vec<String>,
    digests: HashMap<String, Digest>,
    boundary: usize,
    retained: HashSet<Digest>,
}

impl PreparedGroup {
    /// Group name.
    pub fn name(&self) -> &str {
        &self.group
    }

    /// Digests this group keeps. For a keep-all group that is every member.
    pub fn retained(&self) -> &HashSet<Digest> {
        &self.retained
    }

    /// Picks the deletions.
    ///
    /// A tag below the keep boundary is deleted unless its digest is
    /// protected by `protected` or retained by this group.
    pub fn finish(self, protected: ProtectedDigests<'_>) -> GroupPlan {
        let mut delete = Vec::new();
        let mut retain = Vec::new();

        for (index, tag) in self.sorted.into_iter().enumerate() {
            let candidate = match self.digests.get(&tag) {
                Some(digest)
                    if index < self.boundary
                        && !self.retained.contains(digest)
                        && !protected.is_protected(digest) =>
                {
                    Some(digest)
                }
                _ => None,
            };

            match candidate {
                Some(digest) => {
                    tracing::debug!(tag = %tag, group = %self.group, "planned for deletion");
                    delete.push(PlannedDeletion {
                        digest: digest.clone(),
                        group: self.group.clone(),
                        tag,
                    });
                }
                None => retain.push(tag),
            }
        }

        GroupPlan {
            group: self.group,
            keep: self.keep,
            delete,
            retain,
        }
    }
}

/// Computes which tags of a group to delete.
pub struct RetentionPlanner;

impl RetentionPlanner {
    /// Resolves and sorts one group.
    ///
    /// Every member is resolved to its digest first; one failure aborts the
    /// whole group. Keep-all groups are resolved too, so that their digests
    /// can be protected in the other groups. The group is then sorted oldest
    /// first, protecting tags whose digest is excluded. The digests of the
    /// newest tags form the group's working retained set.
    pub async fn prepare<R: DigestResolver>(
        resolver: &R,
        image: &str,
        group: &RetentionGroup,
        strategy: SortStrategy,
        exclusion: &ExclusionSet,
    ) -> Result<PreparedGroup> {
        let mut digests: HashMap<String, Digest> = HashMap::with_capacity(group.tags.len());
        for tag in &group.tags {
            let digest = resolver
                .get_image_digest(image, tag)
                .await
                .map_err(|e| NexusError::resolution(tag.as_str(), e))?;
            digests.insert(tag.clone(), digest);
        }

        let comparator = VersionComparator::new(strategy, |tag: &str| {
            digests
                .get(tag)
                .is_some_and(|digest| exclusion.is_protected(digest))
        });
        let mut sorted = group.tags.clone();
        comparator.sort(&mut sorted);

        let len = sorted.len();
        let (boundary, start) = match group.keep {
            KeepCount::All => (0, 0),
            KeepCount::Newest(n) => {
                let keep = n.min(len);
                let boundary = len - keep;
                (boundary, (boundary + 1).min(len))
            }
        };

        let retained = sorted[start..]
            .iter()
            .filter_map(|tag| digests.get(tag).cloned())
            .collect();

        Ok(PreparedGroup {
            group: group.name.clone(),
            keep: group.keep,
            sorted,
            digests,
            boundary,
            retained,
        })
    }

    /// Plans one group on its own.
    ///
    /// Only the base exclusion set and the group's own retained digests are
    /// protected. [`apply_retention`](super::apply_retention) plans through
    /// [`prepare`](Self::prepare) instead, to protect what other groups keep.
    pub async fn plan<R: DigestResolver>(
        resolver: &R,
        image: &str,
        group: &RetentionGroup,
        strategy: SortStrategy,
        exclusion: &ExclusionSet,
    ) -> Result<GroupPlan> {
        let prepared = Self::prepare(resolver, image, group, strategy, exclusion).await?;
        Ok(prepared.finish(exclusion.protected()))
    }
}
