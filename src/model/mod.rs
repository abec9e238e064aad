//! Structural snapshot model consumed by the diff engine.
//!
//! A [`SnapshotModel`] is built once per side of a comparison by the parsing
//! front end and never mutated afterwards, so it can be shared by reference
//! across concurrent comparisons.

pub mod entities;
pub mod signature;
pub mod snapshot;
pub mod statement;
pub mod tokenizer;

use serde::{Deserialize, Serialize};

pub use entities::{
    Annotation, ClassEntity, ClassKind, FieldEntity, Modifiers, OperationEntity, Parameter,
    SourceRange, Visibility,
};
pub use snapshot::{RawSnapshot, SnapshotModel};
pub use statement::{StatementKind, StatementNode, Token, TokenKind};

/// Which side of a comparison an entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Before,
    After,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Before => Side::After,
            Side::After => Side::Before,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Before => write!(f, "before"),
            Side::After => write!(f, "after"),
        }
    }
}
