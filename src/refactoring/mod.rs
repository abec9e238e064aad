//! Refactoring records produced by the detectors.

pub mod describe;
pub mod kind;
pub mod record;

pub use kind::{Aggregation, RefactoringFamily, RefactoringKind};
pub use record::{CodeElement, ElementKind, Refactoring, RefactoringDetail};
