// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod detectors;
pub mod diff;
pub mod history;
pub mod io;
pub mod mapper;
pub mod model;
pub mod motivation;
pub mod refactoring;

// Re-export commonly used types
pub use crate::core::{Error, Result};

pub use crate::config::RefdetectConfig;

pub use crate::model::{ClassEntity, FieldEntity, OperationEntity, Side, SnapshotModel, StatementNode};

pub use crate::mapper::{BodyMapper, BodyMapping, MapperAbort, Replacement, ReplacementKind};

pub use crate::diff::{diff_models, ModelDiff};

pub use crate::refactoring::{Refactoring, RefactoringKind};

pub use crate::motivation::Motivation;

pub use crate::history::{analyze_commits, load_commit_dir, BatchSummary, CommitOutcome, CommitSnapshots};

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter, Report};
