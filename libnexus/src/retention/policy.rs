//! Keep specifications and tag grouping.
//!
//! A tag belongs to the group named by its prefix (the text before the first
//! `-`). Each group keeps its newest N tags, or all of them. Tags whose prefix
//! names no group fall into the catch-all group.

use crate::error::NexusError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Group that keeps every tag unless a keep spec says otherwise.
pub const DEFAULT_KEEP_ALL_GROUP: &str = "prod";

/// Catch-all group for tags whose prefix matches no other group.
pub const DEFAULT_OTHERS_GROUP: &str = "others";

/// How many tags of a group survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepCount {
    /// Never delete anything from the group.
    All,
    /// Keep the newest `n` tags.
    Newest(usize),
}

impl fmt::Display for KeepCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeepCount::All => write!(f, "all"),
            KeepCount::Newest(n) => write!(f, "{}", n),
        }
    }
}

/// One `group` or `group:N` entry of a `--keep` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepSpec {
    /// Group name (tag prefix)
    pub group: String,
    /// Keep count for the group
    pub keep: KeepCount,
}

impl KeepSpec {
    /// Creates a spec.
    pub fn new(group: impl Into<String>, keep: KeepCount) -> Self {
        Self {
            group: group.into(),
            keep,
        }
    }
}

impl FromStr for KeepSpec {
    type Err = NexusError;

    /// Parses `group` (keep all) or `group:N`.
    ///
    /// A count that is not a number keeps everything; only an empty group
    /// name is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (group, count) = match s.split_once(':') {
            Some((group, count)) => (group.trim(), Some(count.trim())),
            None => (s, None),
        };

        if group.is_empty() {
            return Err(NexusError::invalid_spec(s, "group name is empty"));
        }

        let keep = match count {
            None => KeepCount::All,
            Some(count) => match count.parse::<usize>() {
                Ok(n) => KeepCount::Newest(n),
                Err(_) => {
                    tracing::warn!(
                        spec = s,
                        "keep count is not a number, keeping every tag of the group"
                    );
                    KeepCount::All
                }
            },
        };

        Ok(KeepSpec::new(group, keep))
    }
}

/// Parses a comma separated keep list such as `"prod,stage:3,others:5"`.
///
/// Invalid entries are returned as errors and dropped; the rest still apply.
pub fn parse_keep_specs(input: &str) -> (Vec<KeepSpec>, Vec<NexusError>) {
    let mut specs = Vec::new();
    let mut errors = Vec::new();

    for entry in input.split(',').filter(|e| !e.trim().is_empty()) {
        match entry.parse::<KeepSpec>() {
            Ok(spec) => specs.push(spec),
            Err(e) => errors.push(e),
        }
    }

    (specs, errors)
}

/// Keep specs plus the names of the two synthesized groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    specs: Vec<KeepSpec>,
    keep_all_group: String,
    others_group: String,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl RetentionPolicy {
    /// Creates a policy with the default `prod` and `others` groups.
    pub fn new(specs: Vec<KeepSpec>) -> Self {
        Self {
            specs,
            keep_all_group: DEFAULT_KEEP_ALL_GROUP.to_string(),
            others_group: DEFAULT_OTHERS_GROUP.to_string(),
        }
    }

    /// Renames the group that keeps all tags by default.
    pub fn with_keep_all_group(mut self, name: impl Into<String>) -> Self {
        self.keep_all_group = name.into();
        self
    }

    /// Renames the catch-all group.
    pub fn with_others_group(mut self, name: impl Into<String>) -> Self {
        self.others_group = name.into();
        self
    }

    /// Keep specs in the order given.
    pub fn specs(&self) -> &[KeepSpec] {
        &self.specs
    }

    /// Name of the keep-all default group.
    pub fn keep_all_group(&self) -> &str {
        &self.keep_all_group
    }

    /// Name of the catch-all group.
    pub fn others_group(&self) -> &str {
        &self.others_group
    }
}

/// Tags of one group and how many of them to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionGroup {
    /// Group name
    pub name: String,
    /// Keep count
    pub keep: KeepCount,
    /// Member tags in listing order
    pub tags: Vec<String>,
}

impl RetentionGroup {
    /// Creates an empty group.
    pub fn new(name: impl Into<String>, keep: KeepCount) -> Self {
        Self {
            name: name.into(),
            keep,
            tags: Vec::new(),
        }
    }
}

/// Splits an image's tags into retention groups.
pub struct RetentionGrouper<'a> {
    policy: &'a RetentionPolicy,
}

impl<'a> RetentionGrouper<'a> {
    /// Creates a grouper for `policy`.
    pub fn new(policy: &'a RetentionPolicy) -> Self {
        Self { policy }
    }

    /// Assigns every tag not in `excluded_names` to exactly one group.
    ///
    /// The keep-all group (`KeepCount::All`) and the catch-all group
    /// (`Newest(0)`) always exist; keep specs override them or add new
    /// groups, the last spec for a name winning.
    pub fn group(
        &self,
        all_tags: &[String],
        excluded_names: &[String],
    ) -> BTreeMap<String, RetentionGroup> {
        let mut groups = BTreeMap::new();

        groups.insert(
            self.policy.keep_all_group.clone(),
            RetentionGroup::new(self.policy.keep_all_group.as_str(), KeepCount::All),
        );
        groups.insert(
            self.policy.others_group.clone(),
            RetentionGroup::new(self.policy.others_group.as_str(), KeepCount::Newest(0)),
        );

        for spec in &self.policy.specs {
            groups.insert(
                spec.group.clone(),
                RetentionGroup::new(spec.group.as_str(), spec.keep),
            );
        }

        for tag in all_tags {
            if excluded_names.iter().any(|name| name == tag) {
                continue;
            }

            let prefix = tag.split_once('-').map_or(tag.as_str(), |(p, _)| p);
            let key = if groups.contains_key(prefix) {
                prefix
            } else {
                self.policy.others_group.as_str()
            };

            if let Some(group) = groups.get_mut(key) {
                group.tags.push(tag.clone());
            }
        }

        groups
    }
}
