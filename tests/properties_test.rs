//! Property-based tests for the diff engine
//!
//! These tests verify invariants that should hold for all inputs:
//! - Diffing a snapshot against itself reports nothing
//! - Detection is deterministic, with or without parallelism
//! - The body mapper accounts for every statement exactly once

use proptest::prelude::*;
use refdetect::mapper::{Budget, StatementTree};
use refdetect::model::StatementKind;
use refdetect::{
    diff_models, BodyMapper, ClassEntity, FieldEntity, OperationEntity, RefdetectConfig, Side,
    SnapshotModel, StatementNode,
};
use std::collections::BTreeSet;
use std::time::Duration;

const LEAVES: &[&str] = &[
    "count++;",
    "total += value;",
    "log.info(\"step\");",
    "process(item);",
    "int size = items.size();",
    "helper();",
    "render(canvas, 42);",
    "cache.put(key, value);",
    "value = compute(total, 2);",
];

const CONDITIONS: &[&str] = &["if (count > 0)", "if (items.isEmpty())", "if (value == null)"];

const LOOPS: &[&str] = &["for (Item item : items)", "for (int i = 0; i < size; i++)"];

const OPERATION_NAMES: &[&str] = &["load", "save", "helper", "render", "process"];

fn statement() -> impl Strategy<Value = StatementNode> {
    let leaf = prop_oneof![
        4 => prop::sample::select(LEAVES).prop_map(StatementNode::expr),
        1 => Just(StatementNode::ret("return total;")),
    ];
    leaf.prop_recursive(2, 24, 3, |inner| {
        prop_oneof![
            (prop::sample::select(CONDITIONS), prop::collection::vec(inner.clone(), 1..3))
                .prop_map(|(condition, then)| StatementNode::if_else(condition, then, None)),
            (prop::sample::select(LOOPS), prop::collection::vec(inner, 1..3)).prop_map(|(header, body)| {
                let kind = if header.contains(':') {
                    StatementKind::EnhancedFor
                } else {
                    StatementKind::For
                };
                StatementNode::looping(kind, header, body)
            }),
        ]
    })
}

fn method_body() -> impl Strategy<Value = StatementNode> {
    prop::collection::vec(statement(), 0..6).prop_map(StatementNode::block)
}

/// One class with distinctly named operations and a couple of fields
fn class() -> impl Strategy<Value = ClassEntity> {
    (
        prop::sample::subsequence(OPERATION_NAMES.to_vec(), 1..=OPERATION_NAMES.len()),
        prop::collection::vec(method_body(), OPERATION_NAMES.len()),
        any::<bool>(),
    )
        .prop_map(|(names, bodies, with_fields)| {
            let class = names
                .into_iter()
                .zip(bodies)
                .fold(ClassEntity::new("app.Generated"), |class, (name, body)| {
                    class.with_operation(OperationEntity::new(name).with_body(body))
                });
            if with_fields {
                class
                    .with_field(FieldEntity::new("count", "int"))
                    .with_field(FieldEntity::new("items", "List<Item>"))
            } else {
                class
            }
        })
}

fn snapshot(side: Side, class: ClassEntity) -> SnapshotModel {
    SnapshotModel::new(side, vec![class], Vec::new()).unwrap()
}

fn sequential() -> RefdetectConfig {
    let mut config = RefdetectConfig::default();
    config.parallel.enabled = false;
    config
}

/// Ids of one side: mapped ones first, then unmapped ones
fn accounted(mapped: impl Iterator<Item = usize>, unmapped: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut ids: Vec<usize> = mapped.chain(unmapped).collect();
    ids.sort_unstable();
    ids
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: a snapshot compared with itself yields no refactorings
    #[test]
    fn prop_self_diff_is_empty(class in class()) {
        let before = snapshot(Side::Before, class.clone());
        let after = snapshot(Side::After, class);
        let records = diff_models(&before, &after, &RefdetectConfig::default());
        prop_assert!(records.is_empty(), "unexpected records: {:?}", records);
    }

    /// Property: repeated runs agree, and parallel runs agree with sequential ones
    #[test]
    fn prop_detection_is_deterministic(before in class(), after in class()) {
        let before = snapshot(Side::Before, before);
        let after = snapshot(Side::After, after);
        let describe = |config: &RefdetectConfig| -> Vec<String> {
            diff_models(&before, &after, config)
                .into_iter()
                .map(|r| format!("{:?} {}", r.kind, r.description))
                .collect()
        };

        let first = describe(&RefdetectConfig::default());
        prop_assert_eq!(&first, &describe(&RefdetectConfig::default()));
        prop_assert_eq!(&first, &describe(&sequential()));
    }

    /// Property: every statement is either mapped once or left unmapped
    #[test]
    fn prop_mapper_accounts_for_every_statement(before in method_body(), after in method_body()) {
        let before = StatementTree::from_body(Some(&before));
        let after = StatementTree::from_body(Some(&after));
        let config = RefdetectConfig::default();
        let budget = Budget::new(Duration::from_secs(60), usize::MAX);
        let mapping = BodyMapper::new(&config.mapper).map(&before, &after, budget).unwrap();

        let before_ids = accounted(
            mapping.mappings.iter().map(|m| m.before.id),
            mapping.unmapped_before.iter().map(|s| s.id),
        );
        let after_ids = accounted(
            mapping.mappings.iter().map(|m| m.after.id),
            mapping.unmapped_after.iter().map(|s| s.id),
        );
        prop_assert_eq!(before_ids, (0..before.len()).collect::<Vec<_>>());
        prop_assert_eq!(after_ids, (0..after.len()).collect::<Vec<_>>());

        let mapped_pairs: BTreeSet<(usize, usize)> =
            mapping.mappings.iter().map(|m| (m.before.id, m.after.id)).collect();
        prop_assert_eq!(mapped_pairs.len(), mapping.mappings.len());
        prop_assert!(mapping.coverage() <= 1.0);
    }
}
