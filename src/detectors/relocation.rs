//! Move Method, Move And Rename Method and Move Attribute.
//!
//! These run last and only see members that no earlier detector claimed.

use std::sync::Arc;

use super::{Consumed, Detection};
use crate::diff::{FieldRef, ModelDiff, OperationRef};
use crate::mapper::BodyMapping;
use crate::model::signature::{field_key, signature_key};
use crate::refactoring::{describe, CodeElement, Refactoring, RefactoringDetail, RefactoringKind};

struct Candidate<'m> {
    removed: OperationRef<'m>,
    added: OperationRef<'m>,
    same_name: bool,
    coverage: f64,
    mapping: Option<BodyMapping>,
}

pub fn detect_operations(diff: &ModelDiff<'_>, consumed: &Consumed) -> Detection {
    let removed: Vec<OperationRef<'_>> = diff
        .removed_operations()
        .into_iter()
        .filter(|op| !consumed.operation(op) && !op.op().constructor)
        .collect();
    let added: Vec<OperationRef<'_>> = diff
        .added_operations()
        .into_iter()
        .filter(|op| !consumed.operation(op) && !op.op().constructor)
        .collect();

    let pairs: Vec<(OperationRef<'_>, OperationRef<'_>)> = removed
        .iter()
        .flat_map(|r| added.iter().map(move |a| (*r, *a)))
        .filter(|(r, a)| moved_across_classes(diff, r, a))
        .filter(|(r, a)| r.op().name != a.op().name || signature_key(r.op()) == signature_key(a.op()))
        .collect();
    let mappings = diff.ctx.map_all(&pairs);

    let operation_coverage = diff.ctx.config.matching.operation_coverage;
    let mut candidates: Vec<Candidate<'_>> = pairs
        .into_iter()
        .zip(mappings)
        .filter_map(|((r, a), mapping)| {
            let same_name = r.op().name == a.op().name;
            let bodiless = r.op().body.is_none() && a.op().body.is_none();
            let mapping = mapping.ok();
            let coverage = mapping.as_ref().map_or(0.0, BodyMapping::coverage);
            let exact = mapping.as_ref().map_or(0, BodyMapping::exact_count);
            let accepted = if same_name {
                bodiless || coverage >= operation_coverage
            } else {
                coverage >= operation_coverage && exact > 0
            };
            accepted.then_some(Candidate {
                removed: r,
                added: a,
                same_name,
                coverage,
                mapping,
            })
        })
        .collect();
    candidates.sort_by(|x, y| {
        y.same_name
            .cmp(&x.same_name)
            .then_with(|| y.coverage.total_cmp(&x.coverage))
            .then_with(|| x.removed.class.name.cmp(&y.removed.class.name))
            .then_with(|| x.removed.op().name.cmp(&y.removed.op().name))
            .then_with(|| x.added.class.name.cmp(&y.added.class.name))
            .then_with(|| x.added.op().name.cmp(&y.added.op().name))
    });

    let mut detection = Detection::default();
    for candidate in candidates {
        let (r, a) = (candidate.removed, candidate.added);
        if detection.consumed.operation(&r) || detection.consumed.operation(&a) {
            continue;
        }
        let kind = if candidate.same_name {
            RefactoringKind::MoveMethod
        } else {
            RefactoringKind::MoveAndRenameMethod
        };
        detection.push(
            Refactoring::new(
                kind,
                describe::relocated_operation(kind, r.op(), &r.class.name, a.op(), &a.class.name),
                vec![CodeElement::operation(r.class, r.op())],
                vec![CodeElement::operation(a.class, a.op())],
            )
            .with_detail(RefactoringDetail::Relocation {
                before: r.key(),
                after: a.key(),
            })
            .with_mapping(candidate.mapping.map(Arc::new)),
        );
        detection.consume_operation(&r);
        detection.consume_operation(&a);
    }
    detection
}

/// The added operation lives in a class other than the removed one's counterpart
fn moved_across_classes(diff: &ModelDiff<'_>, removed: &OperationRef<'_>, added: &OperationRef<'_>) -> bool {
    diff.after_name(&removed.class.name) != Some(added.class.name.as_str())
}

/// Removed fields paired with an identical field added to another class
///
/// Several removed fields may settle in the same added field, which is how
/// duplicated constants collapse into one shared declaration.
pub fn detect_attributes(diff: &ModelDiff<'_>, consumed: &Consumed) -> Detection {
    let added: Vec<FieldRef<'_>> = diff
        .added_fields()
        .into_iter()
        .filter(|f| !consumed.field(f))
        .collect();
    let mut detection = Detection::default();
    for r in diff.removed_fields().into_iter().filter(|f| !consumed.field(f)) {
        let key = field_key(r.field());
        let target = added
            .iter()
            .filter(|a| field_key(a.field()) == key)
            .filter(|a| diff.after_name(&r.class.name) != Some(a.class.name.as_str()))
            .min_by(|x, y| x.class.name.cmp(&y.class.name));
        let Some(a) = target else {
            continue;
        };
        detection.push(Refactoring::new(
            RefactoringKind::MoveAttribute,
            describe::relocated_attribute(
                RefactoringKind::MoveAttribute,
                r.field(),
                &r.class.name,
                a.field(),
                &a.class.name,
            ),
            vec![CodeElement::attribute(r.class, r.field())],
            vec![CodeElement::attribute(a.class, a.field())],
        ));
        detection.consume_field(&r);
        detection.consume_field(a);
    }
    detection
}
