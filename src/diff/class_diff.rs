//! Member-level comparison of two corresponding classes.
//!
//! Operations are paired in three rounds: exact signature, test
//! parameterization, then body similarity through the Body Mapper. Fields are
//! paired by name and type, by name alone (type change) and finally by rename
//! evidence found in the mapped bodies.

use std::sync::Arc;
use tracing::{debug, debug_span};

use super::context::{DiffContext, FieldRef, OperationRef};
use super::signature_diff::{diff_annotations, SignatureDiff};
use crate::config::TestFrameworkConfig;
use crate::mapper::{BodyMapping, ReplacementKind};
use crate::model::signature::{erase_type, field_key, signature_key};
use crate::model::{Annotation, ClassEntity, OperationEntity, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Same name, erased parameter types and return type
    Signature,
    /// Paired through body coverage
    Body,
}

#[derive(Debug, Clone)]
pub struct OperationMatch<'m> {
    pub before: OperationRef<'m>,
    pub after: OperationRef<'m>,
    pub kind: MatchKind,
    /// Absent when the mapper aborted on this pair
    pub mapping: Option<Arc<BodyMapping>>,
    pub signature: SignatureDiff,
}

impl OperationMatch<'_> {
    pub fn is_renamed(&self) -> bool {
        self.before.op().name != self.after.op().name
    }
}

/// Several test methods folded into one parameterized test
#[derive(Debug, Clone)]
pub struct ParameterizedTest<'m> {
    pub after: OperationRef<'m>,
    pub sources: Vec<(OperationRef<'m>, Arc<BodyMapping>)>,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldMatch<'m> {
    pub before: FieldRef<'m>,
    pub after: FieldRef<'m>,
}

#[derive(Debug, Clone)]
pub struct ClassDiff<'m> {
    pub before: &'m ClassEntity,
    pub after: &'m ClassEntity,
    pub operations: Vec<OperationMatch<'m>>,
    pub parameterized: Vec<ParameterizedTest<'m>>,
    pub removed_operations: Vec<OperationRef<'m>>,
    pub added_operations: Vec<OperationRef<'m>>,
    pub fields: Vec<FieldMatch<'m>>,
    pub retyped_fields: Vec<FieldMatch<'m>>,
    pub renamed_fields: Vec<FieldMatch<'m>>,
    pub removed_fields: Vec<FieldRef<'m>>,
    pub added_fields: Vec<FieldRef<'m>>,
    pub added_annotations: Vec<Annotation>,
    pub removed_annotations: Vec<Annotation>,
    pub modified_annotations: Vec<(Annotation, Annotation)>,
    /// Method pairs the mapper gave up on
    pub aborted: usize,
}

impl<'m> ClassDiff<'m> {
    pub fn compute(ctx: &DiffContext<'m>, before: &'m ClassEntity, after: &'m ClassEntity) -> Self {
        let _span = debug_span!("class_diff", before = %before.name, after = %after.name).entered();

        let mut diff = Self {
            before,
            after,
            operations: Vec::new(),
            parameterized: Vec::new(),
            removed_operations: Vec::new(),
            added_operations: Vec::new(),
            fields: Vec::new(),
            retyped_fields: Vec::new(),
            renamed_fields: Vec::new(),
            removed_fields: Vec::new(),
            added_fields: Vec::new(),
            added_annotations: Vec::new(),
            removed_annotations: Vec::new(),
            modified_annotations: Vec::new(),
            aborted: 0,
        };

        let mut pool = OperationPool::new(before, after);
        diff.match_signatures(ctx, &mut pool);
        diff.match_parameterized_tests(ctx, &mut pool);
        diff.match_bodies(ctx, &mut pool);
        diff.removed_operations = pool.remaining_before();
        diff.added_operations = pool.remaining_after();

        diff.match_fields();
        let (added, removed, modified) = diff_annotations(&before.annotations, &after.annotations);
        diff.added_annotations = added;
        diff.removed_annotations = removed;
        diff.modified_annotations = modified;

        debug!(
            matched = diff.operations.len(),
            removed = diff.removed_operations.len(),
            added = diff.added_operations.len(),
            aborted = diff.aborted,
            "class pair compared"
        );
        diff
    }

    fn match_signatures(&mut self, ctx: &DiffContext<'m>, pool: &mut OperationPool<'m>) {
        let mut pairs = Vec::new();
        let befores: Vec<OperationRef<'m>> = pool.free_before().collect();
        for b in befores {
            let key = signature_key(b.op());
            let found = pool.free_after().find(|a| signature_key(a.op()) == key);
            if let Some(a) = found {
                pool.claim(&b, &a);
                pairs.push((b, a));
            }
        }
        let mappings = ctx.map_all(&pairs);
        for ((b, a), mapping) in pairs.into_iter().zip(mappings) {
            self.aborted += usize::from(mapping.is_err());
            self.operations.push(OperationMatch {
                signature: SignatureDiff::between(b.op(), a.op()),
                before: b,
                after: a,
                kind: MatchKind::Signature,
                mapping: mapping.ok().map(Arc::new),
            });
        }
    }

    fn match_parameterized_tests(&mut self, ctx: &DiffContext<'m>, pool: &mut OperationPool<'m>) {
        let tests = &ctx.config.tests;
        let parameterized: Vec<OperationRef<'m>> = pool
            .free_after()
            .filter(|a| is_parameterized_test(a.op(), tests))
            .collect();
        for target in parameterized {
            let sources: Vec<OperationRef<'m>> = pool
                .free_before()
                .filter(|b| b.op().annotations.iter().any(|an| tests.is_test(an.simple_name())))
                .collect();
            let pairs: Vec<_> = sources.iter().map(|b| (*b, target)).collect();
            let mappings = ctx.map_all(&pairs);
            let mut folded = Vec::new();
            for ((source, _), mapping) in pairs.into_iter().zip(mappings) {
                let Ok(mapping) = mapping else {
                    self.aborted += 1;
                    continue;
                };
                if parameterizes(&mapping, target.op(), tests, ctx.config.matching.operation_coverage) {
                    folded.push((source, Arc::new(mapping)));
                }
            }
            if folded.is_empty() {
                continue;
            }
            for (source, _) in &folded {
                pool.claim(source, &target);
            }
            self.parameterized.push(ParameterizedTest {
                after: target,
                sources: folded,
            });
        }
    }

    fn match_bodies(&mut self, ctx: &DiffContext<'m>, pool: &mut OperationPool<'m>) {
        let threshold = ctx.config.matching.operation_coverage;
        let pairs: Vec<(OperationRef<'m>, OperationRef<'m>)> = pool
            .free_before()
            .flat_map(|b| pool.free_after().map(move |a| (b, a)))
            .collect();
        let mappings = ctx.map_all(&pairs);

        let mut candidates: Vec<(Score, OperationRef<'m>, OperationRef<'m>, Option<BodyMapping>)> = Vec::new();
        for ((b, a), mapping) in pairs.into_iter().zip(mappings) {
            let same_name = b.op().name == a.op().name;
            if b.op().body.is_none() && a.op().body.is_none() {
                if same_name {
                    candidates.push((Score::new(true, 1.0, 0, b.index, a.index), b, a, None));
                }
                continue;
            }
            let Ok(mapping) = mapping else {
                self.aborted += 1;
                continue;
            };
            let coverage = mapping.coverage();
            let exact = mapping.exact_count();
            if coverage >= threshold {
                candidates.push((Score::new(same_name, coverage, exact, b.index, a.index), b, a, Some(mapping)));
            }
        }
        candidates.sort_by(|x, y| x.0.order(&y.0));

        for (_, b, a, mapping) in candidates {
            if !pool.is_free(&b) || !pool.is_free(&a) {
                continue;
            }
            pool.claim(&b, &a);
            self.operations.push(OperationMatch {
                signature: SignatureDiff::between(b.op(), a.op()),
                before: b,
                after: a,
                kind: MatchKind::Body,
                mapping: mapping.map(Arc::new),
            });
        }
        self.operations.sort_by_key(|m| (m.before.index, m.after.index));
    }

    fn match_fields(&mut self) {
        let mut before_free: Vec<FieldRef<'m>> = FieldRef::all_of(Side::Before, self.before).collect();
        let mut after_free: Vec<FieldRef<'m>> = FieldRef::all_of(Side::After, self.after).collect();

        self.fields = take_field_matches(&mut before_free, &mut after_free, |b, a| {
            field_key(b.field()) == field_key(a.field())
        });
        self.retyped_fields = take_field_matches(&mut before_free, &mut after_free, |b, a| {
            b.field().name == a.field().name
        });
        let operations = &self.operations;
        self.renamed_fields = take_field_matches(&mut before_free, &mut after_free, |b, a| {
            erase_type(&b.field().ty) == erase_type(&a.field().ty)
                && operations.iter().filter_map(|m| m.mapping.as_deref()).any(|mapping| {
                    mapping.has_replacement(ReplacementKind::VariableRenamed, &b.field().name, &a.field().name)
                })
        });
        self.removed_fields = before_free;
        self.added_fields = after_free;
    }

    /// Share of members matched, relative to the larger class
    pub fn similarity(&self) -> f64 {
        let matched = self.operations.len()
            + self.parameterized.len()
            + self.fields.len()
            + self.retyped_fields.len()
            + self.renamed_fields.len();
        let size = self.before.member_count().max(self.after.member_count());
        if size == 0 {
            0.0
        } else {
            matched as f64 / size as f64
        }
    }

    /// Nothing but identical members and annotations
    pub fn is_unchanged(&self) -> bool {
        self.removed_operations.is_empty()
            && self.added_operations.is_empty()
            && self.parameterized.is_empty()
            && self.operations.iter().all(|m| m.kind == MatchKind::Signature && m.signature.is_empty())
            && self.retyped_fields.is_empty()
            && self.renamed_fields.is_empty()
            && self.removed_fields.is_empty()
            && self.added_fields.is_empty()
            && self.added_annotations.is_empty()
            && self.removed_annotations.is_empty()
            && self.modified_annotations.is_empty()
    }
}

/// Sort key of a body-similarity candidate
#[derive(Debug, Clone, Copy)]
struct Score {
    different_name: bool,
    coverage: f64,
    exact: usize,
    before: usize,
    after: usize,
}

impl Score {
    fn new(same_name: bool, coverage: f64, exact: usize, before: usize, after: usize) -> Self {
        Self {
            different_name: !same_name,
            coverage,
            exact,
            before,
            after,
        }
    }

    /// Same name first, then higher coverage, more exact statements, declaration order
    fn order(&self, other: &Self) -> std::cmp::Ordering {
        self.different_name
            .cmp(&other.different_name)
            .then_with(|| other.coverage.total_cmp(&self.coverage))
            .then_with(|| other.exact.cmp(&self.exact))
            .then_with(|| self.before.cmp(&other.before))
            .then_with(|| self.after.cmp(&other.after))
    }
}

/// Unclaimed operations of one class pair
struct OperationPool<'m> {
    before: &'m ClassEntity,
    after: &'m ClassEntity,
    before_free: Vec<bool>,
    after_free: Vec<bool>,
}

impl<'m> OperationPool<'m> {
    fn new(before: &'m ClassEntity, after: &'m ClassEntity) -> Self {
        Self {
            before,
            after,
            before_free: vec![true; before.operations.len()],
            after_free: vec![true; after.operations.len()],
        }
    }

    fn free_before(&self) -> impl Iterator<Item = OperationRef<'m>> + '_ {
        OperationRef::all_of(Side::Before, self.before).filter(|op| self.before_free[op.index])
    }

    fn free_after(&self) -> impl Iterator<Item = OperationRef<'m>> + '_ {
        OperationRef::all_of(Side::After, self.after).filter(|op| self.after_free[op.index])
    }

    fn is_free(&self, op: &OperationRef<'_>) -> bool {
        match op.side {
            Side::Before => self.before_free[op.index],
            Side::After => self.after_free[op.index],
        }
    }

    fn claim(&mut self, before: &OperationRef<'_>, after: &OperationRef<'_>) {
        self.before_free[before.index] = false;
        self.after_free[after.index] = false;
    }

    fn remaining_before(&self) -> Vec<OperationRef<'m>> {
        self.free_before().collect()
    }

    fn remaining_after(&self) -> Vec<OperationRef<'m>> {
        self.free_after().collect()
    }
}

/// Move every pair accepted by `pred` out of the free lists, first match wins
fn take_field_matches<'m>(
    before_free: &mut Vec<FieldRef<'m>>,
    after_free: &mut Vec<FieldRef<'m>>,
    pred: impl Fn(&FieldRef<'m>, &FieldRef<'m>) -> bool,
) -> Vec<FieldMatch<'m>> {
    let mut matches = Vec::new();
    let mut bi = 0;
    while bi < before_free.len() {
        let b = before_free[bi];
        match after_free.iter().position(|a| pred(&b, a)) {
            Some(ai) => {
                let a = after_free.remove(ai);
                before_free.remove(bi);
                matches.push(FieldMatch { before: b, after: a });
            }
            None => bi += 1,
        }
    }
    matches
}

fn is_parameterized_test(op: &OperationEntity, tests: &TestFrameworkConfig) -> bool {
    let names = || op.annotations.iter().map(Annotation::simple_name);
    names().any(|n| tests.is_parameterized(n)) && names().any(|n| tests.is_source(n))
}

/// Annotations whose text lists the literal values of a parameterized test
const INLINE_SOURCES: [&str; 2] = ["ValueSource", "CsvSource"];

/// Whether `mapping` shows a test body turned into `target` by replacing
/// literals with its parameters
fn parameterizes(
    mapping: &BodyMapping,
    target: &OperationEntity,
    tests: &TestFrameworkConfig,
    threshold: f64,
) -> bool {
    if mapping.coverage() < threshold {
        return false;
    }
    let is_parameter = |name: &str| target.parameters.iter().any(|p| p.name == name);
    let all_to_parameters = mapping.replacements().all(|r| is_parameter(&r.after));
    let literals: Vec<&str> = mapping
        .replacements()
        .filter(|r| r.kind == ReplacementKind::LiteralReplacedWithVariable)
        .map(|r| r.before.as_str())
        .collect();
    if !all_to_parameters || literals.is_empty() {
        return false;
    }

    let inline_sources: Vec<&Annotation> = target
        .annotations
        .iter()
        .filter(|a| tests.is_source(a.simple_name()) && INLINE_SOURCES.contains(&a.simple_name()))
        .collect();
    inline_sources.is_empty()
        || literals
            .iter()
            .all(|literal| inline_sources.iter().any(|source| source.mentions_literal(literal)))
}
