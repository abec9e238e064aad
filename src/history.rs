//! Batch comparison over many commits.
//!
//! Every commit is compared independently. A commit whose snapshots cannot be
//! read or compared is reported as failed and the batch carries on; the
//! per-commit outcomes are folded into a [`BatchSummary`] at the end.

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};
use walkdir::WalkDir;

use crate::config::RefdetectConfig;
use crate::core::{Error, Result};
use crate::diff::diff_models;
use crate::model::{Side, SnapshotModel};
use crate::refactoring::{Refactoring, RefactoringKind};

pub const BEFORE_FILE: &str = "before.json";
pub const AFTER_FILE: &str = "after.json";

/// The two snapshots of one commit
#[derive(Debug, Clone)]
pub struct CommitSnapshots {
    pub commit: String,
    pub before: SnapshotModel,
    pub after: SnapshotModel,
}

/// A commit as handed to the batch driver
#[derive(Debug)]
pub enum CommitInput {
    Ready(CommitSnapshots),
    /// Snapshots that could not be loaded
    Unreadable { commit: String, error: Error },
}

impl CommitInput {
    pub fn commit(&self) -> &str {
        match self {
            CommitInput::Ready(snapshots) => &snapshots.commit,
            CommitInput::Unreadable { commit, .. } => commit,
        }
    }
}

impl From<CommitSnapshots> for CommitInput {
    fn from(snapshots: CommitSnapshots) -> Self {
        CommitInput::Ready(snapshots)
    }
}

#[derive(Debug)]
pub enum CommitOutcome {
    Analyzed {
        commit: String,
        refactorings: Vec<Refactoring>,
    },
    Failed {
        commit: String,
        error: Error,
    },
}

impl CommitOutcome {
    pub fn commit(&self) -> &str {
        match self {
            CommitOutcome::Analyzed { commit, .. } | CommitOutcome::Failed { commit, .. } => commit,
        }
    }

    pub fn refactorings(&self) -> &[Refactoring] {
        match self {
            CommitOutcome::Analyzed { refactorings, .. } => refactorings,
            CommitOutcome::Failed { .. } => &[],
        }
    }
}

/// Totals over a batch, built by folding commit outcomes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub analyzed: usize,
    pub failed: usize,
    pub by_kind: BTreeMap<RefactoringKind, usize>,
}

impl BatchSummary {
    pub fn record(self, outcome: &CommitOutcome) -> Self {
        match outcome {
            CommitOutcome::Analyzed { refactorings, .. } => {
                let by_kind = refactorings.iter().fold(self.by_kind, |mut counts, r| {
                    *counts.entry(r.kind).or_default() += 1;
                    counts
                });
                Self {
                    analyzed: self.analyzed + 1,
                    by_kind,
                    ..self
                }
            }
            CommitOutcome::Failed { .. } => Self {
                failed: self.failed + 1,
                ..self
            },
        }
    }

    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a CommitOutcome>) -> Self {
        outcomes.into_iter().fold(Self::default(), Self::record)
    }

    pub fn total_refactorings(&self) -> usize {
        self.by_kind.values().sum()
    }
}

#[derive(Debug)]
pub struct BatchResult {
    /// Outcomes in input order
    pub outcomes: Vec<CommitOutcome>,
    pub summary: BatchSummary,
}

/// Compare every commit, reporting each outcome to `on_commit` as it completes
///
/// With parallelism enabled the callback runs on worker threads, so outcomes
/// may be reported out of order; the returned outcomes keep input order.
pub fn analyze_commits<F>(commits: Vec<CommitInput>, config: &RefdetectConfig, on_commit: F) -> BatchResult
where
    F: Fn(&CommitOutcome) + Sync,
{
    let analyze = |input: CommitInput| {
        let outcome = analyze_commit(input, config);
        on_commit(&outcome);
        outcome
    };
    let outcomes: Vec<CommitOutcome> = if config.parallel.enabled {
        commits.into_par_iter().map(analyze).collect()
    } else {
        commits.into_iter().map(analyze).collect()
    };
    let summary = BatchSummary::from_outcomes(&outcomes);
    info!(
        analyzed = summary.analyzed,
        failed = summary.failed,
        refactorings = summary.total_refactorings(),
        "batch finished"
    );
    BatchResult { outcomes, summary }
}

fn analyze_commit(input: CommitInput, config: &RefdetectConfig) -> CommitOutcome {
    let span = info_span!("commit", commit = %input.commit());
    let _guard = span.enter();
    match input {
        CommitInput::Ready(snapshots) => {
            let refactorings = diff_models(&snapshots.before, &snapshots.after, config);
            CommitOutcome::Analyzed {
                commit: snapshots.commit,
                refactorings,
            }
        }
        CommitInput::Unreadable { commit, error } => {
            warn!("skipping commit {commit}: {error}");
            let error = Error::commit(commit.as_str(), &error);
            CommitOutcome::Failed { commit, error }
        }
    }
}

/// Read `<dir>/<commit>/before.json` and `after.json` for every commit directory
///
/// Commits are ordered by directory name. A commit whose files are missing or
/// malformed is returned as [`CommitInput::Unreadable`].
pub fn load_commit_dir(dir: &Path) -> Result<Vec<CommitInput>> {
    if !dir.is_dir() {
        return Err(Error::parse(dir, "not a directory"));
    }
    let mut commits = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("skipping directory entry: {err}");
                None
            }
        })
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        let commit = entry.file_name().to_string_lossy().into_owned();
        commits.push(load_commit(commit, entry.path()));
    }
    Ok(commits)
}

fn load_commit(commit: String, dir: &Path) -> CommitInput {
    let paths: (PathBuf, PathBuf) = (dir.join(BEFORE_FILE), dir.join(AFTER_FILE));
    let loaded = SnapshotModel::load(Side::Before, &paths.0)
        .and_then(|before| SnapshotModel::load(Side::After, &paths.1).map(|after| (before, after)));
    match loaded {
        Ok((before, after)) => CommitInput::Ready(CommitSnapshots { commit, before, after }),
        Err(error) => CommitInput::Unreadable { commit, error },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassEntity;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn snapshots(commit: &str, before: Vec<ClassEntity>, after: Vec<ClassEntity>) -> CommitInput {
        CommitInput::Ready(CommitSnapshots {
            commit: commit.to_string(),
            before: SnapshotModel::new(Side::Before, before, Vec::new()).unwrap(),
            after: SnapshotModel::new(Side::After, after, Vec::new()).unwrap(),
        })
    }

    #[test]
    fn failures_do_not_stop_the_batch() {
        let commits = vec![
            snapshots(
                "a1",
                vec![ClassEntity::new("p1.Widget")],
                vec![ClassEntity::new("p2.Widget")],
            ),
            CommitInput::Unreadable {
                commit: "b2".into(),
                error: Error::parse("b2/before.json", "expected value"),
            },
            snapshots("c3", vec![ClassEntity::new("p.A")], vec![ClassEntity::new("p.A")]),
        ];
        let seen = Mutex::new(Vec::new());
        let result = analyze_commits(commits, &RefdetectConfig::default(), |outcome| {
            seen.lock().unwrap().push(outcome.commit().to_string());
        });

        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        assert_eq!(seen, vec!["a1", "b2", "c3"]);
        let order: Vec<&str> = result.outcomes.iter().map(CommitOutcome::commit).collect();
        assert_eq!(order, vec!["a1", "b2", "c3"]);
        assert_eq!(result.summary.analyzed, 2);
        assert_eq!(result.summary.failed, 1);
        assert_eq!(result.summary.by_kind.get(&RefactoringKind::MoveClass), Some(&1));
        assert!(matches!(
            &result.outcomes[1],
            CommitOutcome::Failed { error: Error::Commit { commit, .. }, .. } if commit == "b2"
        ));
    }

    #[test]
    fn summary_fold_is_order_independent() {
        let outcomes = vec![
            CommitOutcome::Failed {
                commit: "x".into(),
                error: Error::Configuration("bad".into()),
            },
            CommitOutcome::Analyzed {
                commit: "y".into(),
                refactorings: vec![Refactoring::new(RefactoringKind::RenameClass, "r", vec![], vec![])],
            },
        ];
        let forward = BatchSummary::from_outcomes(&outcomes);
        let backward = BatchSummary::from_outcomes(outcomes.iter().rev());
        assert_eq!(forward, backward);
        assert_eq!(forward.total_refactorings(), 1);
    }

    #[test]
    fn commit_dir_reports_malformed_snapshots_per_commit() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("0001");
        fs::create_dir(&good).unwrap();
        fs::write(good.join(BEFORE_FILE), r#"{"classes": []}"#).unwrap();
        fs::write(good.join(AFTER_FILE), r#"{"classes": []}"#).unwrap();
        let bad = temp.path().join("0002");
        fs::create_dir(&bad).unwrap();
        fs::write(bad.join(BEFORE_FILE), "{ not json").unwrap();
        fs::write(bad.join(AFTER_FILE), r#"{"classes": []}"#).unwrap();
        fs::write(temp.path().join("README"), "ignored").unwrap();

        let commits = load_commit_dir(temp.path()).unwrap();
        assert_eq!(commits.len(), 2);
        assert!(matches!(&commits[0], CommitInput::Ready(s) if s.commit == "0001"));
        assert!(matches!(
            &commits[1],
            CommitInput::Unreadable { commit, error: Error::Parse { .. } } if commit == "0002"
        ));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(load_commit_dir(&temp.path().join("absent")).is_err());
    }
}
