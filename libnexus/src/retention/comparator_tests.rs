use super::comparator::*;

fn unprotected(_: &str) -> bool {
    false
}

fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_sort_strategy_from_str() {
    assert_eq!(SortStrategy::from("nosemver"), SortStrategy::Numeric);
    assert_eq!(SortStrategy::from("numeric"), SortStrategy::Numeric);
    assert_eq!(SortStrategy::from("NoSemver"), SortStrategy::Numeric);
    assert_eq!(SortStrategy::from("semver"), SortStrategy::Semver);
    assert_eq!(SortStrategy::from(""), SortStrategy::Semver);
    assert_eq!(SortStrategy::from("anything"), SortStrategy::Semver);
}

#[test]
fn test_sort_strategy_default_is_semver() {
    assert_eq!(SortStrategy::default(), SortStrategy::Semver);
}

#[test]
fn test_semver_orders_numerically_not_lexically() {
    let comparator = VersionComparator::new(SortStrategy::Semver, unprotected);

    assert!(comparator.less("1.2.0", "1.10.0"));
    assert!(!comparator.less("1.10.0", "1.2.0"));
}

#[test]
fn test_semver_ignores_group_prefix() {
    let comparator = VersionComparator::new(SortStrategy::Semver, unprotected);

    assert!(comparator.less("app-1.2.0", "app-1.3.0"));
    assert!(comparator.less("stage-1.9.9", "prod-2.0.0"));
}

#[test]
fn test_semver_prerelease_after_prefix() {
    let comparator = VersionComparator::new(SortStrategy::Semver, unprotected);

    // Only the first '-' separates the prefix.
    assert!(comparator.less("app-1.0.0-rc.1", "app-1.0.0"));
}

#[test]
fn test_semver_accepts_short_and_v_prefixed_versions() {
    let comparator = VersionComparator::new(SortStrategy::Semver, unprotected);

    assert!(comparator.less("v1", "v2"));
    assert!(comparator.less("1.9", "1.10"));
    assert!(comparator.less("v1.0.0", "1.0.1"));
}

#[test]
fn test_semver_unparseable_compares_equal() {
    let comparator = VersionComparator::new(SortStrategy::Semver, unprotected);

    assert!(!comparator.less("nightly", "1.0.0"));
    assert!(!comparator.less("1.0.0", "nightly"));
    assert!(!comparator.less("nightly", "snapshot"));
}

#[test]
fn test_semver_protected_tags_sort_last() {
    let comparator = VersionComparator::new(SortStrategy::Semver, |tag: &str| tag == "latest");

    assert!(!comparator.less("latest", "1.0.0"));
    assert!(comparator.less("1.0.0", "latest"));
    assert!(!comparator.less("latest", "latest"));
}

#[test]
fn test_numeric_compares_digits() {
    let comparator = VersionComparator::new(SortStrategy::Numeric, unprotected);

    assert!(comparator.less("build-9", "build-10"));
    assert!(!comparator.less("build-10", "build-9"));
}

#[test]
fn test_numeric_missing_digits_are_lowest() {
    let comparator = VersionComparator::new(SortStrategy::Numeric, unprotected);

    assert!(comparator.less("latest", "build-0"));
    assert!(!comparator.less("build-0", "latest"));
    assert!(!comparator.less("latest", "edge"));
}

#[test]
fn test_extract_number() {
    assert_eq!(extract_number("build-42"), Some(42));
    assert_eq!(extract_number("1.2.3"), Some(123));
    assert_eq!(extract_number("latest"), None);
    assert_eq!(extract_number("99999999999999999999999"), None);
}

#[test]
fn test_version_part() {
    assert_eq!(version_part("prod-1.2.3"), "1.2.3");
    assert_eq!(version_part("1.2.3"), "1.2.3");
    assert_eq!(version_part("app-1.0.0-rc.1"), "1.0.0-rc.1");
}

#[test]
fn test_sort_is_ascending() {
    let comparator = VersionComparator::new(SortStrategy::Semver, unprotected);
    let mut list = tags(&["1.10.0", "1.2.0", "0.9.1", "1.3.0"]);

    comparator.sort(&mut list);

    assert_eq!(list, tags(&["0.9.1", "1.2.0", "1.3.0", "1.10.0"]));
}

#[test]
fn test_sort_is_stable_for_unparseable_tags() {
    let comparator = VersionComparator::new(SortStrategy::Semver, unprotected);
    let mut list = tags(&["zeta", "alpha", "beta"]);

    comparator.sort(&mut list);

    assert_eq!(list, tags(&["zeta", "alpha", "beta"]));
}

#[test]
fn test_sort_tags_moves_protected_names_to_end() {
    let mut list = tags(&["latest", "2.0.0", "stable", "1.0.0"]);

    sort_tags(
        &mut list,
        SortStrategy::Semver,
        &tags(&["latest", "stable"]),
    );

    assert_eq!(&list[..2], &tags(&["1.0.0", "2.0.0"])[..]);
    assert!(list[2..].contains(&"latest".to_string()));
    assert!(list[2..].contains(&"stable".to_string()));
}

#[test]
fn test_sort_numeric_strategy() {
    let mut list = tags(&["build-10", "build-9", "build-100"]);

    sort_tags(&mut list, SortStrategy::Numeric, &[]);

    assert_eq!(list, tags(&["build-9", "build-10", "build-100"]));
}

#[test]
fn test_sort_inspects_each_tag_once() {
    let inspected = std::cell::RefCell::new(Vec::new());
    let comparator = VersionComparator::new(SortStrategy::Semver, |tag: &str| {
        inspected.borrow_mut().push(tag.to_string());
        tag == "latest"
    });
    let mut list = tags(&["nightly", "1.10.0", "latest", "edge", "1.2.0", "0.1.0"]);

    comparator.sort(&mut list);

    let mut seen = inspected.into_inner();
    seen.sort();
    assert_eq!(
        seen,
        tags(&["0.1.0", "1.10.0", "1.2.0", "edge", "latest", "nightly"])
    );
    assert_eq!(list[list.len() - 1], "latest");
}
