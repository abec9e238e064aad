//! Extract Superclass/Interface and Pull Up / Push Down of members.
//!
//! Relationships are read from the after snapshot's inheritance forest, with
//! removed members located through the after name of their class.

use std::collections::BTreeMap;

use super::{Consumed, Detection};
use crate::diff::{FieldRef, ModelDiff, OperationRef};
use crate::model::signature::{field_key, signature_key};
use crate::model::ClassEntity;
use crate::refactoring::{describe, CodeElement, Refactoring, RefactoringKind};

pub fn detect_extracted_supertypes(diff: &ModelDiff<'_>, consumed: &Consumed) -> Detection {
    let mut detection = Detection::default();
    for &supertype in &diff.added_classes {
        if consumed.class(&supertype.name) || supertype.member_count() == 0 {
            continue;
        }
        let subclasses: Vec<&ClassEntity> = diff
            .after_hierarchy
            .subtypes(&supertype.name)
            .iter()
            .filter_map(|name| diff.pair_by_after(name))
            .map(|pair| pair.before())
            .collect();
        if subclasses.is_empty() || !members_come_from(supertype, &subclasses) {
            continue;
        }
        let kind = if supertype.is_interface() {
            RefactoringKind::ExtractInterface
        } else {
            RefactoringKind::ExtractSuperclass
        };
        let mut names: Vec<String> = subclasses.iter().map(|c| c.name.clone()).collect();
        names.sort();
        detection.push(Refactoring::new(
            kind,
            describe::extract_supertype(kind, supertype, &names),
            subclasses.iter().map(|c| CodeElement::class(c)).collect(),
            vec![CodeElement::class(supertype)],
        ));
        detection.consume_class(&supertype.name);
    }
    detection
}

/// Every member of `supertype` was declared by at least one subclass before
fn members_come_from(supertype: &ClassEntity, subclasses: &[&ClassEntity]) -> bool {
    let operations = supertype.operations.iter().all(|op| {
        let key = signature_key(op);
        subclasses
            .iter()
            .any(|c| c.operations.iter().any(|o| signature_key(o) == key))
    });
    let fields = supertype.fields.iter().all(|field| {
        let key = field_key(field);
        subclasses
            .iter()
            .any(|c| c.fields.iter().any(|f| field_key(f) == key))
    });
    operations && fields
}

pub fn detect_member_moves(diff: &ModelDiff<'_>, consumed: &Consumed) -> Detection {
    let mut detection = Detection::default();
    let removed_ops: Vec<OperationRef<'_>> = diff
        .removed_operations()
        .into_iter()
        .filter(|op| !consumed.operation(op))
        .collect();
    let added_ops: Vec<OperationRef<'_>> = diff
        .added_operations()
        .into_iter()
        .filter(|op| !consumed.operation(op))
        .collect();
    let removed_fields: Vec<FieldRef<'_>> = diff
        .removed_fields()
        .into_iter()
        .filter(|f| !consumed.field(f))
        .collect();
    let added_fields: Vec<FieldRef<'_>> = diff
        .added_fields()
        .into_iter()
        .filter(|f| !consumed.field(f))
        .collect();

    let op_equivalent = |r: &OperationRef<'_>, a: &OperationRef<'_>| {
        signature_key(r.op()) == signature_key(a.op())
            && (r.op().body.is_none()
                || a.op().body.is_none()
                || diff
                    .ctx
                    .try_map(r, a)
                    .is_some_and(|m| m.coverage() >= diff.ctx.config.matching.operation_coverage))
    };
    let field_equivalent = |r: &FieldRef<'_>, a: &FieldRef<'_>| field_key(r.field()) == field_key(a.field());

    // pull up
    let pulled_ops = pull_up(diff, &removed_ops, &added_ops, |r| signature_key(r.op()), |r| r.class, |a| a.class, &op_equivalent);
    for (r, a) in &pulled_ops {
        detection.push(relocated_operation_record(RefactoringKind::PullUpMethod, r, a));
        detection.consume_operation(r);
        detection.consume_operation(a);
    }
    let pulled_fields = pull_up(diff, &removed_fields, &added_fields, |r| field_key(r.field()), |r| r.class, |a| a.class, &field_equivalent);
    for (r, a) in &pulled_fields {
        detection.push(relocated_field_record(RefactoringKind::PullUpAttribute, r, a));
        detection.consume_field(r);
        detection.consume_field(a);
    }

    // push down
    for r in removed_ops.iter().filter(|r| !pulled_ops.iter().any(|(p, _)| p == *r)) {
        let Some(source) = diff.after_name(&r.class.name) else {
            continue;
        };
        for a in added_ops.iter().filter(|a| !pulled_ops.iter().any(|(_, p)| p == *a)) {
            let below = diff.after_hierarchy.descendant_distance(source, &a.class.name).is_some();
            if below && op_equivalent(r, a) {
                detection.push(relocated_operation_record(RefactoringKind::PushDownMethod, r, a));
                detection.consume_operation(r);
                detection.consume_operation(a);
            }
        }
    }
    for r in removed_fields.iter().filter(|r| !pulled_fields.iter().any(|(p, _)| p.key() == r.key())) {
        let Some(source) = diff.after_name(&r.class.name) else {
            continue;
        };
        for a in added_fields.iter().filter(|a| !pulled_fields.iter().any(|(_, p)| p.key() == a.key())) {
            let below = diff.after_hierarchy.descendant_distance(source, &a.class.name).is_some();
            if below && field_equivalent(r, a) {
                detection.push(relocated_field_record(RefactoringKind::PushDownAttribute, r, a));
                detection.consume_field(r);
                detection.consume_field(a);
            }
        }
    }
    detection
}

/// Pair removed members with an equivalent member added to an ancestor
///
/// Removed members sharing a key are treated as one group; the group moves to
/// the nearest ancestor common to all of its classes, falling back to the
/// nearest ancestor of each member.
fn pull_up<'m, M: Copy>(
    diff: &ModelDiff<'m>,
    removed: &[M],
    added: &[M],
    key: impl Fn(&M) -> String,
    class_of: impl Fn(&M) -> &'m ClassEntity,
    added_class_of: impl Fn(&M) -> &'m ClassEntity,
    equivalent: impl Fn(&M, &M) -> bool,
) -> Vec<(M, M)> {
    let mut groups: BTreeMap<String, Vec<(M, String)>> = BTreeMap::new();
    for r in removed {
        if let Some(after_name) = diff.after_name(&class_of(r).name) {
            groups.entry(key(r)).or_default().push((*r, after_name.to_string()));
        }
    }

    let mut pulled = Vec::new();
    for members in groups.values() {
        let candidates: Vec<(M, &str)> = members
            .iter()
            .flat_map(|(r, source)| {
                added
                    .iter()
                    .filter(|a| diff.after_hierarchy.ancestor_distance(source, &added_class_of(a).name).is_some())
                    .filter(|a| equivalent(r, a))
                    .map(|a| (*a, added_class_of(a).name.as_str()))
                    .collect::<Vec<_>>()
            })
            .collect();
        if candidates.is_empty() {
            continue;
        }
        let mut targets: Vec<&str> = candidates.iter().map(|(_, class)| *class).collect();
        targets.sort();
        targets.dedup();
        let sources: Vec<&str> = members.iter().map(|(_, source)| source.as_str()).collect();

        match diff.after_hierarchy.nearest_common_ancestor(&sources, &targets) {
            Some(common) => {
                for (r, source) in members {
                    let target = candidates
                        .iter()
                        .find(|(a, class)| *class == common && equivalent(r, a))
                        .or_else(|| nearest_candidate(diff, source, r, &candidates, &equivalent));
                    if let Some((a, _)) = target {
                        pulled.push((*r, *a));
                    }
                }
            }
            None => {
                for (r, source) in members {
                    if let Some((a, _)) = nearest_candidate(diff, source, r, &candidates, &equivalent) {
                        pulled.push((*r, *a));
                    }
                }
            }
        }
    }
    pulled
}

fn nearest_candidate<'c, 's, M>(
    diff: &ModelDiff<'_>,
    source: &str,
    removed: &M,
    candidates: &'c [(M, &'s str)],
    equivalent: &impl Fn(&M, &M) -> bool,
) -> Option<&'c (M, &'s str)> {
    candidates
        .iter()
        .filter(|(a, _)| equivalent(removed, a))
        .filter_map(|candidate| {
            diff.after_hierarchy
                .ancestor_distance(source, candidate.1)
                .map(|distance| (distance, candidate.1, candidate))
        })
        .min_by(|x, y| x.0.cmp(&y.0).then_with(|| x.1.cmp(y.1)))
        .map(|(_, _, candidate)| candidate)
}

fn relocated_operation_record(kind: RefactoringKind, r: &OperationRef<'_>, a: &OperationRef<'_>) -> Refactoring {
    Refactoring::new(
        kind,
        describe::relocated_operation(kind, r.op(), &r.class.name, a.op(), &a.class.name),
        vec![CodeElement::operation(r.class, r.op())],
        vec![CodeElement::operation(a.class, a.op())],
    )
}

fn relocated_field_record(kind: RefactoringKind, r: &FieldRef<'_>, a: &FieldRef<'_>) -> Refactoring {
    Refactoring::new(
        kind,
        describe::relocated_attribute(kind, r.field(), &r.class.name, a.field(), &a.class.name),
        vec![CodeElement::attribute(r.class, r.field())],
        vec![CodeElement::attribute(a.class, a.field())],
    )
}
