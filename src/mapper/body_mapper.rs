//! Statement alignment between two method bodies.
//!
//! Matching walks both trees level by level. Within one enclosing block:
//!
//! 1. composite statements are paired by shape (same kind and branch count)
//!    and their branches are mapped recursively;
//! 2. composites with an identical header but a different branch count are
//!    paired next;
//! 3. leaves with identical normalized text (cost 0) are paired;
//! 4. remaining leaves are paired by replacement cost.
//!
//! Every before-statement takes the cheapest unclaimed candidate within the
//! search window. Ties prefer exact text, then the nearest sibling position,
//! then the leftmost candidate. A final pass pairs cost-0 statements that
//! moved across nesting levels.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::budget::{Budget, MapperAbort};
use super::replacement::{classify, Replacement, ReplacementKind};
use super::tree::{FlatStatement, StatementTree};
use crate::config::MapperConfig;
use crate::model::{SourceRange, StatementKind};

/// Identity and text of one statement in a mapping result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRef {
    pub id: usize,
    pub kind: StatementKind,
    pub text: String,
    pub depth: usize,
    pub range: SourceRange,
}

impl StatementRef {
    fn of(node: &FlatStatement) -> Self {
        Self {
            id: node.id,
            kind: node.kind,
            text: node.text.clone(),
            depth: node.depth,
            range: node.range.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementMapping {
    pub before: StatementRef,
    pub after: StatementRef,
    pub replacements: Vec<Replacement>,
    /// Normalized texts are identical
    pub exact: bool,
}

/// Result of mapping two bodies
///
/// Every statement in scope appears exactly once, either in `mappings` or in
/// one of the unmapped lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyMapping {
    pub mappings: Vec<StatementMapping>,
    pub unmapped_before: Vec<StatementRef>,
    pub unmapped_after: Vec<StatementRef>,
    countable_before: usize,
    countable_after: usize,
}

impl BodyMapping {
    /// Mapped statements, not counting blocks
    pub fn mapped_count(&self) -> usize {
        self.mappings
            .iter()
            .filter(|m| m.before.kind != StatementKind::Block)
            .count()
    }

    pub fn exact_count(&self) -> usize {
        self.mappings
            .iter()
            .filter(|m| m.exact && m.before.kind != StatementKind::Block)
            .count()
    }

    /// Mapped statements divided by the statement count of the larger side
    pub fn coverage(&self) -> f64 {
        ratio(self.mapped_count(), self.countable_before.max(self.countable_after))
    }

    pub fn before_coverage(&self) -> f64 {
        ratio(self.mapped_count(), self.countable_before)
    }

    pub fn after_coverage(&self) -> f64 {
        ratio(self.mapped_count(), self.countable_after)
    }

    pub fn countable_before(&self) -> usize {
        self.countable_before
    }

    pub fn countable_after(&self) -> usize {
        self.countable_after
    }

    pub fn replacements(&self) -> impl Iterator<Item = &Replacement> {
        self.mappings.iter().flat_map(|m| m.replacements.iter())
    }

    pub fn has_replacement(&self, kind: ReplacementKind, before: &str, after: &str) -> bool {
        self.replacements()
            .any(|r| r.kind == kind && r.before == before && r.after == after)
    }

    pub fn unmapped_before_ids(&self) -> BTreeSet<usize> {
        self.unmapped_before.iter().map(|s| s.id).collect()
    }

    pub fn unmapped_after_ids(&self) -> BTreeSet<usize> {
        self.unmapped_after.iter().map(|s| s.id).collect()
    }

    /// Unmapped statements that are not just block delimiters
    pub fn unmapped_countable_after(&self) -> usize {
        self.unmapped_after
            .iter()
            .filter(|s| s.kind != StatementKind::Block)
            .count()
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Aligns statements of two bodies under a [`MapperConfig`]
#[derive(Debug, Clone, Copy)]
pub struct BodyMapper<'c> {
    config: &'c MapperConfig,
}

impl<'c> BodyMapper<'c> {
    pub fn new(config: &'c MapperConfig) -> Self {
        Self { config }
    }

    pub fn map(
        &self,
        before: &StatementTree,
        after: &StatementTree,
        budget: Budget,
    ) -> Result<BodyMapping, MapperAbort> {
        self.map_scoped(before, None, after, None, budget)
    }

    /// Map only the statements inside the given scopes (`None` = whole tree)
    pub fn map_scoped(
        &self,
        before: &StatementTree,
        before_scope: Option<&BTreeSet<usize>>,
        after: &StatementTree,
        after_scope: Option<&BTreeSet<usize>>,
        budget: Budget,
    ) -> Result<BodyMapping, MapperAbort> {
        let mut state = MappingState {
            before: Side::new(before, before_scope),
            after: Side::new(after, after_scope),
            config: self.config,
            budget,
            cache: HashMap::new(),
            pairs: Vec::new(),
        };
        budget.check_size(state.before.in_scope_count() + state.after.in_scope_count())?;

        let before_roots = state.before.scoped_roots();
        let after_roots = state.after.scoped_roots();
        state.map_block(&before_roots, &after_roots)?;
        state.map_across_levels()?;
        Ok(state.finish())
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    cost: usize,
    exact: bool,
    replacements: Vec<Replacement>,
}

struct Side<'t> {
    tree: &'t StatementTree,
    scope: Option<&'t BTreeSet<usize>>,
    claimed: Vec<bool>,
}

impl<'t> Side<'t> {
    fn new(tree: &'t StatementTree, scope: Option<&'t BTreeSet<usize>>) -> Self {
        Self {
            tree,
            scope,
            claimed: vec![false; tree.len()],
        }
    }

    fn in_scope(&self, id: usize) -> bool {
        self.scope.is_none_or(|s| s.contains(&id))
    }

    fn in_scope_count(&self) -> usize {
        (0..self.tree.len()).filter(|&id| self.in_scope(id)).count()
    }

    fn node(&self, id: usize) -> &'t FlatStatement {
        self.tree.node(id)
    }

    fn is_free(&self, id: usize) -> bool {
        self.in_scope(id) && !self.claimed[id]
    }

    /// In-scope statements whose parent is out of scope or absent
    fn scoped_roots(&self) -> Vec<usize> {
        match self.scope {
            None => self.tree.roots().to_vec(),
            Some(scope) => scope
                .iter()
                .copied()
                .filter(|&id| id < self.tree.len())
                .filter(|&id| self.node(id).parent.is_none_or(|p| !scope.contains(&p)))
                .collect(),
        }
    }

    fn children(&self, id: usize) -> Vec<usize> {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(|&c| self.in_scope(c))
            .collect()
    }
}

struct MappingState<'t, 'c> {
    before: Side<'t>,
    after: Side<'t>,
    config: &'c MapperConfig,
    budget: Budget,
    cache: HashMap<(usize, usize), Option<Candidate>>,
    pairs: Vec<(usize, usize, Candidate)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Shape,
    RelaxedShape,
    ExactLeaves,
    Leaves,
}

impl MappingState<'_, '_> {
    fn map_block(&mut self, before: &[usize], after: &[usize]) -> Result<(), MapperAbort> {
        for pass in [Pass::Shape, Pass::RelaxedShape, Pass::ExactLeaves, Pass::Leaves] {
            for (bi, &b) in before.iter().enumerate() {
                if !self.before.is_free(b) || !self.eligible_before(pass, b) {
                    continue;
                }
                if let Some((a, candidate)) = self.best_candidate(pass, bi, b, after)? {
                    self.claim(b, a, candidate);
                    if !self.before.node(b).is_leaf() {
                        self.map_branches(b, a)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn eligible_before(&self, pass: Pass, b: usize) -> bool {
        let composite = !self.before.node(b).is_leaf();
        match pass {
            Pass::Shape | Pass::RelaxedShape => composite,
            Pass::ExactLeaves | Pass::Leaves => !composite,
        }
    }

    fn accepts(&self, pass: Pass, b: usize, a: usize) -> bool {
        let (bn, an) = (self.before.node(b), self.after.node(a));
        match pass {
            Pass::Shape => {
                an.kind == bn.kind
                    && (bn.kind.is_block_like() || bn.children.len() == an.children.len())
            }
            Pass::RelaxedShape => an.kind == bn.kind && an.normalized == bn.normalized,
            Pass::ExactLeaves | Pass::Leaves => an.is_leaf() && bn.kind.is_compatible_leaf(an.kind),
        }
    }

    fn best_candidate(
        &mut self,
        pass: Pass,
        bi: usize,
        b: usize,
        after: &[usize],
    ) -> Result<Option<(usize, Candidate)>, MapperAbort> {
        let window = self.config.search_window;
        let mut best: Option<((usize, bool, usize, usize), usize, Candidate)> = None;
        for (aj, &a) in after.iter().enumerate() {
            if bi.abs_diff(aj) > window || !self.after.is_free(a) || !self.accepts(pass, b, a) {
                continue;
            }
            let Some(candidate) = self.compare(b, a)? else {
                continue;
            };
            if pass == Pass::ExactLeaves && candidate.cost > 0 {
                continue;
            }
            let key = (candidate.cost, !candidate.exact, bi.abs_diff(aj), aj);
            if best.as_ref().is_none_or(|(best_key, _, _)| key < *best_key) {
                best = Some((key, a, candidate));
            }
        }
        Ok(best.map(|(_, a, candidate)| (a, candidate)))
    }

    /// Map the branches of two paired composites
    fn map_branches(&mut self, b: usize, a: usize) -> Result<(), MapperAbort> {
        let before_children = self.before.children(b);
        let after_children = self.after.children(a);
        if self.before.node(b).kind.is_block_like() {
            return self.map_block(&before_children, &after_children);
        }
        for (&cb, &ca) in before_children.iter().zip(after_children.iter()) {
            let both_blocks = self.before.node(cb).kind == StatementKind::Block
                && self.after.node(ca).kind == StatementKind::Block;
            if both_blocks && self.before.is_free(cb) && self.after.is_free(ca) {
                self.claim(
                    cb,
                    ca,
                    Candidate {
                        cost: 0,
                        exact: true,
                        replacements: Vec::new(),
                    },
                );
                let (gb, ga) = (self.before.children(cb), self.after.children(ca));
                self.map_block(&gb, &ga)?;
            } else {
                self.map_block(&[cb], &[ca])?;
            }
        }
        Ok(())
    }

    /// Pair cost-0 statements that changed nesting level or enclosing block
    fn map_across_levels(&mut self) -> Result<(), MapperAbort> {
        for b in 0..self.before.tree.len() {
            let bn = self.before.node(b);
            if !self.before.is_free(b) || bn.kind == StatementKind::Block {
                continue;
            }
            let mut best: Option<((bool, usize, usize, usize), usize, Candidate)> = None;
            for a in 0..self.after.tree.len() {
                let an = self.after.node(a);
                if !self.after.is_free(a) || an.kind == StatementKind::Block {
                    continue;
                }
                let compatible = if bn.is_leaf() {
                    an.is_leaf() && bn.kind.is_compatible_leaf(an.kind)
                } else {
                    an.kind == bn.kind
                };
                if !compatible {
                    continue;
                }
                let Some(candidate) = self.compare(b, a)? else {
                    continue;
                };
                if candidate.cost > 0 {
                    continue;
                }
                let key = (!candidate.exact, bn.depth.abs_diff(an.depth), b.abs_diff(a), a);
                if best.as_ref().is_none_or(|(best_key, _, _)| key < *best_key) {
                    best = Some((key, a, candidate));
                }
            }
            if let Some((_, a, candidate)) = best {
                self.claim(b, a, candidate);
                if !bn.is_leaf() {
                    self.map_branches(b, a)?;
                }
            }
        }
        Ok(())
    }

    fn compare(&mut self, b: usize, a: usize) -> Result<Option<Candidate>, MapperAbort> {
        if let Some(cached) = self.cache.get(&(b, a)) {
            return Ok(cached.clone());
        }
        self.budget.check_time()?;

        let (bn, an) = (self.before.node(b), self.after.node(a));
        let candidate = if bn.normalized == an.normalized {
            Some(Candidate {
                cost: 0,
                exact: true,
                replacements: Vec::new(),
            })
        } else {
            classify(&bn.tokens, &an.tokens, self.config.max_change_ratio).map(|replacements| {
                let locals_renamed_only = replacements.iter().all(|r| {
                    r.kind == ReplacementKind::VariableRenamed
                        && self.before.tree.is_local(&r.before)
                        && self.after.tree.is_local(&r.after)
                });
                Candidate {
                    cost: if locals_renamed_only { 0 } else { replacements.len() },
                    exact: false,
                    replacements,
                }
            })
        };
        self.cache.insert((b, a), candidate.clone());
        Ok(candidate)
    }

    fn claim(&mut self, b: usize, a: usize, candidate: Candidate) {
        self.before.claimed[b] = true;
        self.after.claimed[a] = true;
        self.pairs.push((b, a, candidate));
    }

    fn finish(mut self) -> BodyMapping {
        self.pairs.sort_by_key(|(b, _, _)| *b);
        let mappings = self
            .pairs
            .into_iter()
            .map(|(b, a, candidate)| StatementMapping {
                before: StatementRef::of(self.before.node(b)),
                after: StatementRef::of(self.after.node(a)),
                replacements: candidate.replacements,
                exact: candidate.exact,
            })
            .collect();
        let unmapped = |side: &Side<'_>| -> Vec<StatementRef> {
            (0..side.tree.len())
                .filter(|&id| side.is_free(id))
                .map(|id| StatementRef::of(side.node(id)))
                .collect()
        };
        BodyMapping {
            mappings,
            unmapped_before: unmapped(&self.before),
            unmapped_after: unmapped(&self.after),
            countable_before: self.before.tree.countable(self.before.scope),
            countable_after: self.after.tree.countable(self.after.scope),
        }
    }
}
