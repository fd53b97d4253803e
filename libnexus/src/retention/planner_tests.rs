use super::comparator::SortStrategy;
use super::exclusion::ExclusionSet;
use super::planner::*;
use super::policy::{KeepCount, RetentionGroup};
use super::testing::{FakeRegistry, digest, tags};
use std::collections::HashSet;

fn group(name: &str, keep: KeepCount, members: &[&str]) -> RetentionGroup {
    RetentionGroup {
        name: name.to_string(),
        keep,
        tags: tags(members),
    }
}

fn deleted_tags(plan: &GroupPlan) -> Vec<String> {
    plan.delete.iter().map(|d| d.tag.clone()).collect()
}

#[tokio::test]
async fn test_keep_all_group_deletes_nothing() {
    let registry = FakeRegistry::new().with_image("app", &[("prod-1.0.0", 1)]);
    let g = group("prod", KeepCount::All, &["prod-1.0.0"]);

    let plan = RetentionPlanner::plan(&registry, "app", &g, SortStrategy::Semver, &ExclusionSet::default())
        .await
        .unwrap();

    assert!(plan.delete.is_empty());
    assert_eq!(plan.retain, tags(&["prod-1.0.0"]));
}

#[tokio::test]
async fn test_keep_all_group_retains_every_digest() {
    let registry =
        FakeRegistry::new().with_image("app", &[("prod-1.0.0", 1), ("prod-1.1.0", 2)]);
    let g = group("prod", KeepCount::All, &["prod-1.1.0", "prod-1.0.0"]);

    let prepared =
        RetentionPlanner::prepare(&registry, "app", &g, SortStrategy::Semver, &ExclusionSet::default())
            .await
            .unwrap();

    assert_eq!(prepared.name(), "prod");
    let expected: HashSet<_> = [digest(1), digest(2)].into_iter().collect();
    assert_eq!(prepared.retained(), &expected);
    assert_eq!(registry.resolve_calls(), tags(&["prod-1.1.0", "prod-1.0.0"]));
}

#[tokio::test]
async fn test_digest_retained_elsewhere_is_not_deleted() {
    let registry = FakeRegistry::new().with_image("app", &[("stage-1.0.0", 1), ("stage-1.1.0", 2)]);
    let exclusion = ExclusionSet::default();
    let g = group("stage", KeepCount::Newest(0), &["stage-1.0.0", "stage-1.1.0"]);
    let kept_by_other_group: HashSet<_> = [digest(1)].into_iter().collect();

    let prepared = RetentionPlanner::prepare(&registry, "app", &g, SortStrategy::Semver, &exclusion)
        .await
        .unwrap();
    let plan = prepared.finish(exclusion.with_retained(&kept_by_other_group));

    assert_eq!(deleted_tags(&plan), tags(&["stage-1.1.0"]));
    assert_eq!(plan.retain, tags(&["stage-1.0.0"]));
}

#[tokio::test]
async fn test_empty_group_is_noop() {
    let registry = FakeRegistry::new();
    let g = group("others", KeepCount::Newest(0), &[]);

    let plan = RetentionPlanner::plan(&registry, "app", &g, SortStrategy::Semver, &ExclusionSet::default())
        .await
        .unwrap();

    assert!(plan.delete.is_empty());
    assert!(plan.retain.is_empty());
}

#[tokio::test]
async fn test_deletes_oldest_beyond_keep_count() {
    let registry = FakeRegistry::new().with_image(
        "app",
        &[("v3", 3), ("v1", 1), ("v4", 4), ("v2", 2)],
    );
    let g = group("others", KeepCount::Newest(2), &["v3", "v1", "v4", "v2"]);

    let plan = RetentionPlanner::plan(&registry, "app", &g, SortStrategy::Semver, &ExclusionSet::default())
        .await
        .unwrap();

    assert_eq!(deleted_tags(&plan), tags(&["v1", "v2"]));
    assert_eq!(plan.retain, tags(&["v3", "v4"]));
    assert_eq!(plan.delete[0].digest, digest(1));
    assert_eq!(plan.delete[0].group, "others");
}

#[tokio::test]
async fn test_keep_at_least_group_size_deletes_nothing() {
    let registry = FakeRegistry::new().with_image("app", &[("1.0.0", 1), ("1.1.0", 2)]);
    let g = group("others", KeepCount::Newest(5), &["1.0.0", "1.1.0"]);

    let plan = RetentionPlanner::plan(&registry, "app", &g, SortStrategy::Semver, &ExclusionSet::default())
        .await
        .unwrap();

    assert!(plan.delete.is_empty());
    assert_eq!(plan.retain.len(), 2);
}

#[tokio::test]
async fn test_keep_zero_deletes_everything_unprotected() {
    let registry = FakeRegistry::new().with_image("app", &[("stage-1.0.0", 1), ("stage-1.1.0", 2)]);
    let g = group("stage", KeepCount::Newest(0), &["stage-1.1.0", "stage-1.0.0"]);

    let plan = RetentionPlanner::plan(&registry, "app", &g, SortStrategy::Semver, &ExclusionSet::default())
        .await
        .unwrap();

    assert_eq!(deleted_tags(&plan), tags(&["stage-1.0.0", "stage-1.1.0"]));
    assert!(plan.retain.is_empty());
}

#[tokio::test]
async fn test_excluded_digest_is_never_deleted() {
    let registry = FakeRegistry::new().with_image("app", &[("a", 9), ("b", 9), ("c", 3)]);
    let exclusion = ExclusionSet::from_parts(&tags(&["b"]), [digest(9)]);
    let g = group("others", KeepCount::Newest(0), &["a", "c"]);

    let plan = RetentionPlanner::plan(&registry, "app", &g, SortStrategy::Semver, &exclusion)
        .await
        .unwrap();

    assert_eq!(deleted_tags(&plan), tags(&["c"]));
    assert!(plan.retain.contains(&"a".to_string()));
}

#[tokio::test]
async fn test_alias_of_newest_retained_tag_is_kept() {
    // 1.0.0 aliases the newest tag; deleting it would delete 1.2.0 too.
    let registry = FakeRegistry::new().with_image(
        "app",
        &[("1.0.0", 5), ("1.1.0", 2), ("1.1.5", 3), ("1.2.0", 5)],
    );
    let g = group("others", KeepCount::Newest(2), &["1.0.0", "1.1.0", "1.1.5", "1.2.0"]);

    let plan = RetentionPlanner::plan(&registry, "app", &g, SortStrategy::Semver, &ExclusionSet::default())
        .await
        .unwrap();

    assert_eq!(deleted_tags(&plan), tags(&["1.1.0"]));
    assert_eq!(plan.retain, tags(&["1.0.0", "1.1.5", "1.2.0"]));
}

#[tokio::test]
async fn test_deleted_and_retained_partition_the_group() {
    let registry = FakeRegistry::new().with_image(
        "app",
        &[("1.0.0", 1), ("1.1.0", 2), ("1.2.0", 2), ("2.0.0", 4), ("2.1.0", 5)],
    );
    let members = ["2.1.0", "1.0.0", "2.0.0", "1.2.0", "1.1.0"];
    let g = group("others", KeepCount::Newest(1), &members);

    let plan = RetentionPlanner::plan(&registry, "app", &g, SortStrategy::Semver, &ExclusionSet::default())
        .await
        .unwrap();

    let deleted = deleted_tags(&plan);
    assert!(deleted.iter().all(|t| !plan.retain.contains(t)));
    let mut all: Vec<String> = deleted.iter().chain(plan.retain.iter()).cloned().collect();
    all.sort();
    let mut expected = tags(&members);
    expected.sort();
    assert_eq!(all, expected);
}

#[tokio::test]
async fn test_numeric_strategy_orders_build_numbers() {
    let registry = FakeRegistry::new().with_image(
        "app",
        &[("build-10", 10), ("build-9", 9), ("build-11", 11)],
    );
    let g = group("build", KeepCount::Newest(1), &["build-10", "build-9", "build-11"]);

    let plan = RetentionPlanner::plan(&registry, "app", &g, SortStrategy::Numeric, &ExclusionSet::default())
        .await
        .unwrap();

    assert_eq!(deleted_tags(&plan), tags(&["build-9", "build-10"]));
    assert_eq!(plan.retain, tags(&["build-11"]));
}

#[tokio::test]
async fn test_resolution_failure_aborts_group() {
    let registry = FakeRegistry::new()
        .with_image("app", &[("1.0.0", 1), ("1.1.0", 2)])
        .failing_resolve("1.1.0");
    let g = group("others", KeepCount::Newest(0), &["1.0.0", "1.1.0"]);

    let err = RetentionPlanner::plan(&registry, "app", &g, SortStrategy::Semver, &ExclusionSet::default())
        .await
        .unwrap_err();

    assert_eq!(err.tag(), Some("1.1.0"));
}

#[test]
fn test_delete_plan_merge_keeps_group_order() {
    let first = GroupPlan {
        group: "a".to_string(),
        keep: KeepCount::Newest(0),
        delete: vec![PlannedDeletion {
            tag: "a-1".to_string(),
            digest: digest(1),
            group: "a".to_string(),
        }],
        retain: vec![],
    };
    let second = GroupPlan {
        group: "b".to_string(),
        keep: KeepCount::Newest(0),
        delete: vec![PlannedDeletion {
            tag: "b-1".to_string(),
            digest: digest(2),
            group: "b".to_string(),
        }],
        retain: vec![],
    };

    let merged = DeletePlan::merge([&first, &second]);

    assert_eq!(merged.len(), 2);
    assert_eq!(merged.entries()[0].tag, "a-1");
    assert_eq!(merged.entries()[1].tag, "b-1");
    assert!(DeletePlan::default().is_empty());
}
