//! Class and model level comparison.

pub mod class_diff;
pub mod context;
pub mod hierarchy;
pub mod model_diff;
pub mod package;
pub mod signature_diff;

pub use class_diff::{ClassDiff, FieldMatch, MatchKind, OperationMatch, ParameterizedTest};
pub use context::{DiffContext, FieldRef, MemberKey, OperationRef};
pub use hierarchy::Hierarchy;
pub use model_diff::{diff_models, ClassPair, ClassPairKind, ModelDiff};
pub use package::PackageState;
pub use signature_diff::SignatureDiff;
