//! Tag ordering strategies.
//!
//! Tags are ordered oldest first. The comparator is deliberately forgiving:
//! a tag that does not parse compares equal to everything, so it is not a
//! total order and [`VersionComparator::sort`] uses a stable insertion sort
//! instead of `slice::sort_by`.

use crate::error::NexusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How tags are compared when sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortStrategy {
    /// Semantic versioning of the part after the group prefix.
    #[default]
    Semver,
    /// Digits of the tag read as one unsigned integer.
    #[serde(alias = "nosemver")]
    Numeric,
}

impl From<&str> for SortStrategy {
    /// Maps `nosemver`/`numeric` to [`SortStrategy::Numeric`]; anything else is semver.
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "nosemver" | "numeric" => SortStrategy::Numeric,
            _ => SortStrategy::Semver,
        }
    }
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortStrategy::Semver => write!(f, "semver"),
            SortStrategy::Numeric => write!(f, "numeric"),
        }
    }
}

/// Orders tag names according to a [`SortStrategy`].
///
/// `is_protected` decides which tags always sort last under semver ordering.
/// The planner protects by digest, the tag listing by name; the comparator
/// only sees the predicate.
///
/// # Examples
///
/// ```
/// use libnexus::retention::{SortStrategy, VersionComparator};
///
/// let comparator = VersionComparator::new(SortStrategy::Semver, |tag: &str| tag == "latest");
/// let mut tags = vec!["latest".to_string(), "1.10.0".to_string(), "1.2.0".to_string()];
/// comparator.sort(&mut tags);
/// assert_eq!(tags, ["1.2.0", "1.10.0", "latest"]);
/// ```
pub struct VersionComparator<P> {
    strategy: SortStrategy,
    is_protected: P,
}

impl<P> VersionComparator<P>
where
    P: Fn(&str) -> bool,
{
    /// Creates a comparator with the given strategy and protection predicate.
    pub fn new(strategy: SortStrategy, is_protected: P) -> Self {
        Self {
            strategy,
            is_protected,
        }
    }

    /// Returns whether `a` orders strictly before `b`.
    pub fn less(&self, a: &str, b: &str) -> bool {
        self.key(a).less(&self.key(b))
    }

    /// Sorts items ascending by their tag name. Stable.
    ///
    /// Each tag is checked for protection and parsed once, so an unparsable
    /// tag is logged once per sort.
    pub fn sort<T: AsRef<str>>(&self, items: &mut [T]) {
        let mut keys: Vec<SortKey> = items.iter().map(|item| self.key(item.as_ref())).collect();

        for i in 1..items.len() {
            let mut j = i;
            while j > 0 && keys[j].less(&keys[j - 1]) {
                items.swap(j, j - 1);
                keys.swap(j, j - 1);
                j -= 1;
            }
        }
    }

    fn key(&self, tag: &str) -> SortKey {
        match self.strategy {
            SortStrategy::Numeric => SortKey::Number(extract_number(tag)),
            SortStrategy::Semver if (self.is_protected)(tag) => SortKey::Protected,
            SortStrategy::Semver => SortKey::Version(parse_version(tag)),
        }
    }
}

/// What a tag is compared by.
#[derive(Debug)]
enum SortKey {
    /// Sorts after everything else
    Protected,
    /// `None` compares equal to every other tag
    Version(Option<semver::Version>),
    /// `None` orders below every number
    Number(Option<u64>),
}

impl SortKey {
    fn less(&self, other: &SortKey) -> bool {
        match (self, other) {
            (SortKey::Protected, _) => false,
            (_, SortKey::Protected) => true,
            (SortKey::Version(Some(left)), SortKey::Version(Some(right))) => left < right,
            (SortKey::Number(left), SortKey::Number(right)) => left < right,
            _ => false,
        }
    }
}

/// Sorts a tag listing, treating the given names as protected.
///
/// Used where no digests are at hand (printing tags). `latest` is not added
/// here; callers pass the final exclude list.
pub fn sort_tags(tags: &mut [String], strategy: SortStrategy, protected_names: &[String]) {
    let comparator = VersionComparator::new(strategy, |tag: &str| {
        protected_names.iter().any(|name| name == tag)
    });
    comparator.sort(tags);
}

/// Returns the version part of a tag: everything after the first `-`, or the
/// whole tag when it has no prefix.
pub fn version_part(tag: &str) -> &str {
    match tag.split_once('-') {
        Some((_, version)) => version,
        None => tag,
    }
}

/// Parses the version part of a tag.
///
/// A leading `v` is dropped and missing minor/patch components are filled
/// with zero, so `v1` and `2.1` sort with `1.0.0` style tags. Failures are
/// logged and yield `None`.
fn parse_version(tag: &str) -> Option<semver::Version> {
    let raw = version_part(tag);
    let trimmed = raw.strip_prefix(['v', 'V']).unwrap_or(raw);

    match semver::Version::parse(&pad_version(trimmed)) {
        Ok(version) => Some(version),
        Err(e) => {
            let error = NexusError::version_parse(tag, e.to_string());
            tracing::warn!(%error, "tag compares equal to every other tag");
            None
        }
    }
}

/// Pads `1` and `1.2` (optionally followed by `-pre` or `+build`) to three
/// components.
fn pad_version(version: &str) -> String {
    let core_end = version.find(['-', '+']).unwrap_or(version.len());
    let (core, rest) = version.split_at(core_end);

    let components = core.split('.').count();
    let core_is_numeric = core
        .split('.')
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));

    if !core_is_numeric || components >= 3 {
        return version.to_string();
    }

    let padding = ".0".repeat(3 - components);
    format!("{}{}{}", core, padding, rest)
}

/// Strips every non-digit character and parses the rest.
///
/// Tags without digits (or with more digits than fit in a `u64`) yield
/// `None`, which orders below every number.
pub fn extract_number(tag: &str) -> Option<u64> {
    let digits: String = tag.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
