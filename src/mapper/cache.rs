//! Shared cache of flattened statement trees.
//!
//! The same operation is mapped against many candidates during one model
//! diff, and flattening re-tokenizes every statement. Trees are built once per
//! operation and shared across rayon workers through a `DashMap`.

use dashmap::DashMap;
use std::sync::Arc;

use super::tree::StatementTree;
use crate::model::{OperationEntity, Side};

/// Identifies an operation within one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationKey {
    pub side: Side,
    pub class_name: String,
    /// Position in the class's operation list
    pub index: usize,
}

impl OperationKey {
    pub fn new(side: Side, class_name: impl Into<String>, index: usize) -> Self {
        Self {
            side,
            class_name: class_name.into(),
            index,
        }
    }
}

#[derive(Debug, Default)]
pub struct TreeCache {
    trees: DashMap<OperationKey, Arc<StatementTree>>,
}

impl TreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&self, key: &OperationKey, operation: &OperationEntity) -> Arc<StatementTree> {
        if let Some(cached) = self.trees.get(key) {
            return Arc::clone(&cached);
        }
        let tree = Arc::new(StatementTree::from_operation(operation));
        self.trees
            .entry(key.clone())
            .or_insert_with(|| Arc::clone(&tree))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
