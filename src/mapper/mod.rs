//! Statement-level alignment of method bodies.

pub mod body_mapper;
pub mod budget;
pub mod cache;
pub mod replacement;
pub mod tree;

pub use body_mapper::{BodyMapper, BodyMapping, StatementMapping, StatementRef};
pub use budget::{Budget, MapperAbort};
pub use cache::{OperationKey, TreeCache};
pub use replacement::{classify, Replacement, ReplacementKind};
pub use tree::{MethodInvocation, StatementTree};
