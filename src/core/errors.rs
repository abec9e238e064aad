//! Shared error types for the application

use std::path::PathBuf;
use thiserror::Error;

use crate::model::Side;

/// Main error type for refdetect operations
#[derive(Debug, Error)]
pub enum Error {
    /// Two class entities share a fully-qualified name within one snapshot
    #[error("Duplicate entity in {side} snapshot: {name}")]
    DuplicateEntity { side: Side, name: String },

    /// Snapshot input could not be read as a structural model
    #[error("Parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A commit could not be analyzed
    #[error("Commit {commit} failed: {message}")]
    Commit { commit: String, message: String },

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// Wrapped external errors
    #[error(transparent)]
    External(#[from] anyhow::Error),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a duplicate entity error
    pub fn duplicate_entity(side: Side, name: impl Into<String>) -> Self {
        Self::DuplicateEntity {
            side,
            name: name.into(),
        }
    }

    /// Create a parse error for an input file
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wrap an error as the failure cause of one commit
    pub fn commit(commit: impl Into<String>, cause: &Error) -> Self {
        Self::Commit {
            commit: commit.into(),
            message: cause.to_string(),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_entity_message_names_side_and_class() {
        let err = Error::duplicate_entity(Side::Before, "p.A");
        assert_eq!(err.to_string(), "Duplicate entity in before snapshot: p.A");
    }

    #[test]
    fn context_wraps_message() {
        let result: Result<()> = Err(Error::Configuration("bad ratio".into()));
        let err = result.context("loading .refdetect.toml").unwrap_err();
        assert_eq!(
            err.to_string(),
            "loading .refdetect.toml: Configuration error: bad ratio"
        );
    }
}
