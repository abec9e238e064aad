use rayon::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use crate::config::RefdetectConfig;
use crate::mapper::{BodyMapper, BodyMapping, Budget, MapperAbort, OperationKey, StatementTree, TreeCache};
use crate::model::{ClassEntity, FieldEntity, OperationEntity, Side, SnapshotModel};

/// An operation together with the class and side it belongs to
#[derive(Debug, Clone, Copy)]
pub struct OperationRef<'m> {
    pub side: Side,
    pub class: &'m ClassEntity,
    pub index: usize,
}

impl<'m> OperationRef<'m> {
    pub fn new(side: Side, class: &'m ClassEntity, index: usize) -> Self {
        Self { side, class, index }
    }

    pub fn op(&self) -> &'m OperationEntity {
        &self.class.operations[self.index]
    }

    pub fn key(&self) -> OperationKey {
        OperationKey::new(self.side, self.class.name.clone(), self.index)
    }

    /// Every operation of a class, in declaration order
    pub fn all_of(side: Side, class: &'m ClassEntity) -> impl Iterator<Item = OperationRef<'m>> {
        (0..class.operations.len()).map(move |index| OperationRef::new(side, class, index))
    }
}

impl PartialEq for OperationRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.side == other.side && self.class.name == other.class.name && self.index == other.index
    }
}

impl Eq for OperationRef<'_> {}

#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'m> {
    pub side: Side,
    pub class: &'m ClassEntity,
    pub index: usize,
}

impl<'m> FieldRef<'m> {
    pub fn new(side: Side, class: &'m ClassEntity, index: usize) -> Self {
        Self { side, class, index }
    }

    pub fn field(&self) -> &'m FieldEntity {
        &self.class.fields[self.index]
    }

    pub fn key(&self) -> MemberKey {
        MemberKey::new(self.side, &self.class.name, self.index)
    }

    pub fn all_of(side: Side, class: &'m ClassEntity) -> impl Iterator<Item = FieldRef<'m>> {
        (0..class.fields.len()).map(move |index| FieldRef::new(side, class, index))
    }
}

/// Ordered identity of a class member, used for consumption bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey {
    pub side: Side,
    pub class_name: String,
    pub index: usize,
}

impl MemberKey {
    pub fn new(side: Side, class_name: &str, index: usize) -> Self {
        Self {
            side,
            class_name: class_name.to_string(),
            index,
        }
    }
}

impl From<&OperationRef<'_>> for MemberKey {
    fn from(op: &OperationRef<'_>) -> Self {
        MemberKey::new(op.side, &op.class.name, op.index)
    }
}

/// Inputs shared by every class pair of one model diff
pub struct DiffContext<'m> {
    pub before: &'m SnapshotModel,
    pub after: &'m SnapshotModel,
    pub config: &'m RefdetectConfig,
    trees: TreeCache,
}

impl<'m> DiffContext<'m> {
    pub fn new(before: &'m SnapshotModel, after: &'m SnapshotModel, config: &'m RefdetectConfig) -> Self {
        Self {
            before,
            after,
            config,
            trees: TreeCache::new(),
        }
    }

    pub fn model(&self, side: Side) -> &'m SnapshotModel {
        match side {
            Side::Before => self.before,
            Side::After => self.after,
        }
    }

    pub fn tree(&self, op: &OperationRef<'_>) -> Arc<StatementTree> {
        self.trees.get_or_build(&op.key(), op.op())
    }

    pub fn parallel(&self) -> bool {
        self.config.parallel.enabled
    }

    /// Map two whole bodies; aborts are logged and returned
    pub fn map(&self, before: &OperationRef<'_>, after: &OperationRef<'_>) -> Result<BodyMapping, MapperAbort> {
        self.map_scoped(before, None, after, None)
    }

    pub fn map_scoped(
        &self,
        before: &OperationRef<'_>,
        before_scope: Option<&BTreeSet<usize>>,
        after: &OperationRef<'_>,
        after_scope: Option<&BTreeSet<usize>>,
    ) -> Result<BodyMapping, MapperAbort> {
        let (before_tree, after_tree) = (self.tree(before), self.tree(after));
        let mapper = BodyMapper::new(&self.config.mapper);
        mapper
            .map_scoped(
                &before_tree,
                before_scope,
                &after_tree,
                after_scope,
                Budget::from_config(&self.config.mapper),
            )
            .inspect_err(|abort| {
                debug!(
                    before = %format!("{}#{}", before.class.name, before.op().name),
                    after = %format!("{}#{}", after.class.name, after.op().name),
                    "body mapping skipped: {abort}"
                );
            })
    }

    /// Map two bodies, treating an abort as "no evidence"
    pub fn try_map(&self, before: &OperationRef<'_>, after: &OperationRef<'_>) -> Option<BodyMapping> {
        self.map(before, after).ok()
    }

    /// Map independent pairs, in parallel when enabled; results keep input order
    pub fn map_all(
        &self,
        pairs: &[(OperationRef<'m>, OperationRef<'m>)],
    ) -> Vec<Result<BodyMapping, MapperAbort>> {
        if self.parallel() {
            pairs.par_iter().map(|(b, a)| self.map(b, a)).collect()
        } else {
            pairs.iter().map(|(b, a)| self.map(b, a)).collect()
        }
    }
}
