//! Top-level comparison of two snapshots.
//!
//! Classes are paired by qualified name first. Leftover removed and added
//! classes are then paired as moves (same simple name, different package),
//! and finally as renames when their members are similar enough. Every pair
//! gets a [`ClassDiff`]; the detectors consume the pairs together with the
//! pools of members that no pair could account for.

use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, info_span};

use super::class_diff::ClassDiff;
use super::context::{DiffContext, FieldRef, OperationRef};
use super::hierarchy::Hierarchy;
use crate::config::RefdetectConfig;
use crate::detectors;
use crate::model::{ClassEntity, Side, SnapshotModel};
use crate::motivation;
use crate::refactoring::Refactoring;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassPairKind {
    Same,
    Moved,
    Renamed,
    MovedAndRenamed,
}

#[derive(Debug, Clone)]
pub struct ClassPair<'m> {
    pub kind: ClassPairKind,
    pub diff: ClassDiff<'m>,
}

impl<'m> ClassPair<'m> {
    pub fn before(&self) -> &'m ClassEntity {
        self.diff.before
    }

    pub fn after(&self) -> &'m ClassEntity {
        self.diff.after
    }
}

pub struct ModelDiff<'m> {
    pub ctx: DiffContext<'m>,
    /// Matched classes, ordered by before name
    pub pairs: Vec<ClassPair<'m>>,
    pub removed_classes: Vec<&'m ClassEntity>,
    pub added_classes: Vec<&'m ClassEntity>,
    pub before_hierarchy: Hierarchy,
    pub after_hierarchy: Hierarchy,
    renamed: BTreeMap<String, String>,
}

/// Detect every refactoring between two snapshots
pub fn diff_models(before: &SnapshotModel, after: &SnapshotModel, config: &RefdetectConfig) -> Vec<Refactoring> {
    ModelDiff::build(DiffContext::new(before, after, config)).refactorings()
}

impl<'m> ModelDiff<'m> {
    pub fn build(ctx: DiffContext<'m>) -> Self {
        let span = info_span!("model_diff", before = ctx.before.len(), after = ctx.after.len());
        let _guard = span.enter();

        let (before, after) = (ctx.before, ctx.after);
        let common: Vec<(&'m ClassEntity, &'m ClassEntity)> = before
            .classes()
            .filter_map(|b| after.class(&b.name).map(|a| (b, a)))
            .collect();
        let mut removed: Vec<&'m ClassEntity> = before.classes().filter(|c| !after.contains_class(&c.name)).collect();
        let mut added: Vec<&'m ClassEntity> = after.classes().filter(|c| !before.contains_class(&c.name)).collect();

        let mut pairs: Vec<ClassPair<'m>> = compute_diffs(&ctx, &common)
            .into_iter()
            .map(|diff| ClassPair {
                kind: ClassPairKind::Same,
                diff,
            })
            .collect();

        let threshold = ctx.config.matching.class_similarity;
        let moves: Vec<ClassPair<'m>> = match_renamed_classes(
            &ctx,
            &removed,
            &added,
            |r, a| (r.simple_name() == a.simple_name()).then_some(ClassPairKind::Moved),
            |diff| {
                diff.similarity() >= threshold
                    || (diff.before.member_count() == 0 && diff.after.member_count() == 0)
            },
        )
        .into_iter()
        .map(|(kind, diff)| ClassPair { kind, diff })
        .collect();
        claim_pairs(&moves, &mut removed, &mut added);
        pairs.extend(moves);

        let renames: Vec<ClassPair<'m>> = match_renamed_classes(
            &ctx,
            &removed,
            &added,
            |r, a| {
                if r.simple_name() == a.simple_name() {
                    None
                } else if r.container() == a.container() {
                    Some(ClassPairKind::Renamed)
                } else {
                    Some(ClassPairKind::MovedAndRenamed)
                }
            },
            |diff| diff.similarity() >= threshold,
        )
        .into_iter()
        .map(|(kind, diff)| ClassPair { kind, diff })
        .collect();
        claim_pairs(&renames, &mut removed, &mut added);
        pairs.extend(renames);

        pairs.sort_by(|x, y| x.before().name.cmp(&y.before().name));
        let renamed = pairs
            .iter()
            .map(|p| (p.before().name.clone(), p.after().name.clone()))
            .collect();

        info!(
            pairs = pairs.len(),
            removed = removed.len(),
            added = added.len(),
            "classes matched"
        );

        Self {
            before_hierarchy: Hierarchy::new(before),
            after_hierarchy: Hierarchy::new(after),
            ctx,
            pairs,
            removed_classes: removed,
            added_classes: added,
            renamed,
        }
    }

    /// Run every detector and the motivation classifier
    pub fn refactorings(&self) -> Vec<Refactoring> {
        let mut records = detectors::detect_all(self);
        motivation::classify(self, &mut records);
        records.sort();
        records.dedup();
        debug!(count = records.len(), "refactorings detected");
        records
    }

    /// After-side name of a before class that has a counterpart
    pub fn after_name(&self, before_name: &str) -> Option<&str> {
        self.renamed.get(before_name).map(String::as_str)
    }

    pub fn pair_by_after(&self, after_name: &str) -> Option<&ClassPair<'m>> {
        self.pairs.iter().find(|p| p.after().name == after_name)
    }

    /// Operations removed from matched classes, then those of removed classes
    pub fn removed_operations(&self) -> Vec<OperationRef<'m>> {
        self.pairs
            .iter()
            .flat_map(|p| p.diff.removed_operations.iter().copied())
            .chain(
                self.removed_classes
                    .iter()
                    .flat_map(|&c| OperationRef::all_of(Side::Before, c)),
            )
            .collect()
    }

    pub fn added_operations(&self) -> Vec<OperationRef<'m>> {
        self.pairs
            .iter()
            .flat_map(|p| p.diff.added_operations.iter().copied())
            .chain(
                self.added_classes
                    .iter()
                    .flat_map(|&c| OperationRef::all_of(Side::After, c)),
            )
            .collect()
    }

    pub fn removed_fields(&self) -> Vec<FieldRef<'m>> {
        self.pairs
            .iter()
            .flat_map(|p| p.diff.removed_fields.iter().copied())
            .chain(self.removed_classes.iter().flat_map(|&c| FieldRef::all_of(Side::Before, c)))
            .collect()
    }

    pub fn added_fields(&self) -> Vec<FieldRef<'m>> {
        self.pairs
            .iter()
            .flat_map(|p| p.diff.added_fields.iter().copied())
            .chain(self.added_classes.iter().flat_map(|&c| FieldRef::all_of(Side::After, c)))
            .collect()
    }
}

fn compute_diffs<'m>(ctx: &DiffContext<'m>, pairs: &[(&'m ClassEntity, &'m ClassEntity)]) -> Vec<ClassDiff<'m>> {
    if ctx.parallel() {
        pairs.par_iter().map(|&(b, a)| ClassDiff::compute(ctx, b, a)).collect()
    } else {
        pairs.iter().map(|&(b, a)| ClassDiff::compute(ctx, b, a)).collect()
    }
}

/// Greedily pair removed and added classes accepted by `kind_of`
///
/// Candidates failing `accept` are dropped before pairing. The rest are
/// ranked by member similarity, then alphabetically by the before and after
/// names.
fn match_renamed_classes<'m>(
    ctx: &DiffContext<'m>,
    removed: &[&'m ClassEntity],
    added: &[&'m ClassEntity],
    kind_of: impl Fn(&ClassEntity, &ClassEntity) -> Option<ClassPairKind>,
    accept: impl Fn(&ClassDiff<'m>) -> bool,
) -> Vec<(ClassPairKind, ClassDiff<'m>)> {
    let mut candidates: Vec<(ClassPairKind, (&'m ClassEntity, &'m ClassEntity))> = Vec::new();
    for r in removed.iter() {
        for a in added.iter() {
            if let Some(kind) = kind_of(r, a) {
                candidates.push((kind, (*r, *a)));
            }
        }
    }
    let class_pairs: Vec<_> = candidates.iter().map(|(_, pair)| *pair).collect();
    let diffs = compute_diffs(ctx, &class_pairs);
    let mut scored: Vec<(ClassPairKind, ClassDiff<'m>)> = candidates
        .into_iter()
        .map(|(kind, _)| kind)
        .zip(diffs)
        .filter(|(_, diff)| accept(diff))
        .collect();
    scored.sort_by(|(_, x), (_, y)| {
        y.similarity()
            .total_cmp(&x.similarity())
            .then_with(|| x.before.name.cmp(&y.before.name))
            .then_with(|| x.after.name.cmp(&y.after.name))
    });

    let mut taken_before: Vec<&str> = Vec::new();
    let mut taken_after: Vec<&str> = Vec::new();
    let mut accepted = Vec::new();
    for (kind, diff) in scored {
        let (b, a) = (diff.before, diff.after);
        if taken_before.contains(&b.name.as_str()) || taken_after.contains(&a.name.as_str()) {
            continue;
        }
        taken_before.push(b.name.as_str());
        taken_after.push(a.name.as_str());
        accepted.push((kind, diff));
    }
    accepted
}

fn claim_pairs(pairs: &[ClassPair<'_>], removed: &mut Vec<&ClassEntity>, added: &mut Vec<&ClassEntity>) {
    removed.retain(|c| !pairs.iter().any(|p| p.before().name == c.name));
    added.retain(|c| !pairs.iter().any(|p| p.after().name == c.name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldEntity, OperationEntity, StatementNode};
    use crate::refactoring::RefactoringKind;

    fn snapshots(before: Vec<ClassEntity>, after: Vec<ClassEntity>) -> (SnapshotModel, SnapshotModel) {
        (
            SnapshotModel::new(Side::Before, before, Vec::new()).unwrap(),
            SnapshotModel::new(Side::After, after, Vec::new()).unwrap(),
        )
    }

    #[test]
    fn empty_class_moves_past_a_rejected_candidate() {
        let (before, after) = snapshots(
            vec![ClassEntity::new("p1.Util")],
            vec![
                ClassEntity::new("p2.Util").with_field(FieldEntity::new("cache", "Map")),
                ClassEntity::new("p3.Util"),
            ],
        );
        let config = RefdetectConfig::default();
        let diff = ModelDiff::build(DiffContext::new(&before, &after, &config));

        let moved: Vec<(&str, &str)> = diff
            .pairs
            .iter()
            .filter(|p| p.kind == ClassPairKind::Moved)
            .map(|p| (p.before().name.as_str(), p.after().name.as_str()))
            .collect();
        assert_eq!(moved, vec![("p1.Util", "p3.Util")]);
        let added: Vec<&str> = diff.added_classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(added, vec!["p2.Util"]);
    }

    #[test]
    fn mapper_abort_only_skips_its_method_pair() {
        let class = |method: &str, ty: &str| {
            ClassEntity::new("app.C")
                .with_field(FieldEntity::new("n", ty))
                .with_operation(OperationEntity::new(method).with_body(StatementNode::block(vec![
                    StatementNode::expr("open();"),
                    StatementNode::expr("n++;"),
                    StatementNode::expr("close();"),
                ])))
        };
        let (before, after) = snapshots(vec![class("run", "int")], vec![class("execute", "long")]);
        let mut config = RefdetectConfig::default();
        config.mapper.max_statements = 3;

        let diff = ModelDiff::build(DiffContext::new(&before, &after, &config));
        assert_eq!(diff.pairs.len(), 1);
        assert!(diff.pairs[0].diff.aborted > 0);

        let records = diff.refactorings();
        assert!(records.iter().all(|r| r.kind != RefactoringKind::RenameMethod));
        let descriptions: Vec<&str> = records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec!["Change Attribute Type private n : int to private n : long in class app.C"]
        );
    }
}
