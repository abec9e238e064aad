//! Extract Method, Inline Method and their cross-class variants.
//!
//! Both directions start from an operation matched by a class pair. An added
//! operation is extracted from the pair when the after body starts calling it
//! and the statements the pair mapping left behind on the before side cover
//! its body; inlining is the mirror image on removed operations.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::{Consumed, Detection};
use crate::diff::{ClassPair, ModelDiff, OperationMatch, OperationRef};
use crate::mapper::{BodyMapping, StatementTree};
use crate::model::StatementKind;
use crate::refactoring::{describe, CodeElement, Refactoring, RefactoringDetail, RefactoringKind};

pub fn detect(diff: &ModelDiff<'_>, consumed: &Consumed) -> Detection {
    let mut detection = Detection::default();
    let added: Vec<OperationRef<'_>> = diff
        .added_operations()
        .into_iter()
        .filter(|op| !consumed.operation(op) && op.op().body.is_some())
        .collect();
    let removed: Vec<OperationRef<'_>> = diff
        .removed_operations()
        .into_iter()
        .filter(|op| !consumed.operation(op) && op.op().body.is_some())
        .collect();

    for pair in &diff.pairs {
        for matched in &pair.diff.operations {
            let Some(mapping) = pair_mapping(diff, matched) else {
                continue;
            };
            for extracted in &added {
                if let Some(record) = extraction(diff, pair, matched, &mapping, extracted) {
                    detection.push(record);
                    detection.consume_operation(extracted);
                }
            }
            for inlined in &removed {
                if let Some(record) = inlining(diff, pair, matched, &mapping, inlined) {
                    detection.push(record);
                    detection.consume_operation(inlined);
                }
            }
        }
    }
    detection
}

fn pair_mapping(diff: &ModelDiff<'_>, matched: &OperationMatch<'_>) -> Option<Arc<BodyMapping>> {
    match &matched.mapping {
        Some(mapping) => Some(Arc::clone(mapping)),
        None => diff.ctx.try_map(&matched.before, &matched.after).map(Arc::new),
    }
}

/// Statements of `tree` that call `op` with its arity
fn call_sites(tree: &StatementTree, op: &OperationRef<'_>) -> BTreeSet<usize> {
    let (name, arity) = (&op.op().name, op.op().parameters.len());
    tree.method_calls()
        .into_iter()
        .filter(|call| &call.name == name && call.arguments == arity)
        .map(|call| call.statement)
        .collect()
}

fn extraction(
    diff: &ModelDiff<'_>,
    pair: &ClassPair<'_>,
    matched: &OperationMatch<'_>,
    mapping: &BodyMapping,
    extracted: &OperationRef<'_>,
) -> Option<Refactoring> {
    let (source_before, source_after) = (&matched.before, &matched.after);
    if extracted == source_after {
        return None;
    }
    let calls = call_sites(&diff.ctx.tree(source_after), extracted);
    if calls.is_empty() || !call_sites(&diff.ctx.tree(source_before), extracted).is_empty() {
        return None;
    }

    // statements left behind, plus those now rewritten around the call
    let mut scope = mapping.unmapped_before_ids();
    scope.extend(
        mapping
            .mappings
            .iter()
            .filter(|m| calls.contains(&m.after.id))
            .map(|m| m.before.id),
    );
    let body = diff.ctx.map_scoped(source_before, Some(&scope), extracted, None).ok()?;
    let threshold = diff.ctx.config.matching.extract_coverage;
    if body.mapped_count() == 0 || body.after_coverage() < threshold {
        return None;
    }

    let new_statements = mapping
        .unmapped_after
        .iter()
        .filter(|s| s.kind != StatementKind::Block && !calls.contains(&s.id))
        .count();
    let local = extracted.class.name == pair.after().name;
    let (kind, description) = if local {
        (
            RefactoringKind::ExtractMethod,
            describe::extract_method(extracted.op(), source_before.op(), &pair.after().name),
        )
    } else {
        (
            RefactoringKind::ExtractAndMoveMethod,
            describe::extract_and_move(
                extracted.op(),
                &extracted.class.name,
                source_before.op(),
                &pair.after().name,
            ),
        )
    };
    Some(
        Refactoring::new(
            kind,
            description,
            vec![CodeElement::operation(pair.before(), source_before.op())],
            vec![
                CodeElement::operation(extracted.class, extracted.op()),
                CodeElement::operation(pair.after(), source_after.op()),
            ],
        )
        .with_detail(RefactoringDetail::Extraction {
            source_before: source_before.key(),
            source_after: source_after.key(),
            extracted: extracted.key(),
            new_statements,
        })
        .with_mapping(Some(Arc::new(body))),
    )
}

fn inlining(
    diff: &ModelDiff<'_>,
    pair: &ClassPair<'_>,
    matched: &OperationMatch<'_>,
    mapping: &BodyMapping,
    inlined: &OperationRef<'_>,
) -> Option<Refactoring> {
    let (target_before, target_after) = (&matched.before, &matched.after);
    if inlined == target_before {
        return None;
    }
    let calls = call_sites(&diff.ctx.tree(target_before), inlined);
    if calls.is_empty() || !call_sites(&diff.ctx.tree(target_after), inlined).is_empty() {
        return None;
    }

    let mut scope = mapping.unmapped_after_ids();
    scope.extend(
        mapping
            .mappings
            .iter()
            .filter(|m| calls.contains(&m.before.id))
            .map(|m| m.after.id),
    );
    let body = diff.ctx.map_scoped(inlined, None, target_after, Some(&scope)).ok()?;
    let threshold = diff.ctx.config.matching.extract_coverage;
    if body.mapped_count() == 0 || body.before_coverage() < threshold {
        return None;
    }

    let local = diff.after_name(&inlined.class.name) == Some(pair.after().name.as_str());
    let (kind, description) = if local {
        (
            RefactoringKind::InlineMethod,
            describe::inline_method(inlined.op(), target_after.op(), &pair.after().name),
        )
    } else {
        (
            RefactoringKind::MoveAndInlineMethod,
            describe::move_and_inline(
                inlined.op(),
                &inlined.class.name,
                target_after.op(),
                &pair.after().name,
            ),
        )
    };
    Some(
        Refactoring::new(
            kind,
            description,
            vec![
                CodeElement::operation(inlined.class, inlined.op()),
                CodeElement::operation(pair.before(), target_before.op()),
            ],
            vec![CodeElement::operation(pair.after(), target_after.op())],
        )
        .with_detail(RefactoringDetail::Extraction {
            source_before: target_before.key(),
            source_after: target_after.key(),
            extracted: inlined.key(),
            new_statements: 0,
        })
        .with_mapping(Some(Arc::new(body))),
    )
}
