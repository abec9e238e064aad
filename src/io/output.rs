use colored::*;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::history::{BatchSummary, CommitOutcome};
use crate::refactoring::{
    Aggregation, CodeElement, ElementKind, Refactoring, RefactoringFamily, RefactoringKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Terminal,
}

/// Serialized result of one run, one entry per analyzed commit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub commits: Vec<CommitReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitReport {
    pub sha1: String,
    pub refactorings: Vec<RefactoringReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactoringReport {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub left_side_locations: Vec<Location>,
    pub right_side_locations: Vec<Location>,
    pub motivations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub start_column: usize,
    pub end_column: usize,
    pub code_element_type: String,
    pub description: String,
    pub code_element: String,
}

impl Location {
    fn new(element: &CodeElement, side: &str) -> Self {
        let element_type = match element.kind {
            ElementKind::Package => "PACKAGE_DECLARATION",
            ElementKind::Class => "TYPE_DECLARATION",
            ElementKind::Operation => "METHOD_DECLARATION",
            ElementKind::Attribute => "FIELD_DECLARATION",
        };
        Self {
            file_path: element.range.file.clone(),
            start_line: element.range.start_line,
            end_line: element.range.end_line,
            start_column: element.range.start_column,
            end_column: element.range.end_column,
            code_element_type: element_type.to_string(),
            description: format!("{side} {}", element_type.to_lowercase().replace('_', " ")),
            code_element: element.signature.clone(),
        }
    }
}

impl From<&Refactoring> for RefactoringReport {
    fn from(refactoring: &Refactoring) -> Self {
        Self {
            kind: refactoring.kind.display_name().to_string(),
            description: refactoring.description.clone(),
            left_side_locations: refactoring
                .before
                .iter()
                .map(|e| Location::new(e, "original"))
                .collect(),
            right_side_locations: refactoring
                .after
                .iter()
                .map(|e| Location::new(e, "refactored"))
                .collect(),
            motivations: refactoring.motivations.iter().map(|m| m.display_name().to_string()).collect(),
        }
    }
}

impl CommitReport {
    pub fn new(sha1: impl Into<String>, refactorings: &[Refactoring]) -> Self {
        Self {
            sha1: sha1.into(),
            refactorings: refactorings.iter().map(RefactoringReport::from).collect(),
        }
    }
}

impl Report {
    pub fn single(sha1: impl Into<String>, refactorings: &[Refactoring]) -> Self {
        Self {
            commits: vec![CommitReport::new(sha1, refactorings)],
        }
    }

    /// Analyzed commits only; failures are reported through the summary
    pub fn from_outcomes(outcomes: &[CommitOutcome]) -> Self {
        let commits = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                CommitOutcome::Analyzed { commit, refactorings } => Some(CommitReport::new(commit.as_str(), refactorings)),
                CommitOutcome::Failed { .. } => None,
            })
            .collect();
        Self { commits }
    }
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &Report) -> anyhow::Result<()>;

    fn write_summary(&mut self, _summary: &BatchSummary) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &Report) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_commit(&mut self, commit: &CommitReport) -> anyhow::Result<()> {
        writeln!(
            self.writer,
            "{} {} ({} refactorings)",
            "commit".bold(),
            commit.sha1.yellow(),
            commit.refactorings.len()
        )?;
        if commit.refactorings.is_empty() {
            writeln!(self.writer, "  {}", "no refactorings detected".dimmed())?;
        }
        for group in group_by_target(&commit.refactorings) {
            match group {
                [single] => self.write_refactoring(single, "  ")?,
                [first, ..] => {
                    let target = first
                        .right_side_locations
                        .first()
                        .map(|l| l.code_element.as_str())
                        .unwrap_or_default();
                    writeln!(
                        self.writer,
                        "  {} {} ({} sources)",
                        colorize(&first.kind),
                        target.bold(),
                        group.len()
                    )?;
                    for refactoring in group {
                        self.write_refactoring(refactoring, "    ")?;
                    }
                }
                [] => {}
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_refactoring(&mut self, refactoring: &RefactoringReport, indent: &str) -> anyhow::Result<()> {
        writeln!(self.writer, "{indent}{}", refactoring.description)?;
        if !refactoring.motivations.is_empty() {
            writeln!(
                self.writer,
                "{indent}  {} {}",
                "motivations:".dimmed(),
                refactoring.motivations.join(", ")
            )?;
        }
        Ok(())
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &Report) -> anyhow::Result<()> {
        for commit in &report.commits {
            self.write_commit(commit)?;
        }
        Ok(())
    }

    fn write_summary(&mut self, summary: &BatchSummary) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", "Summary".bold().blue())?;
        writeln!(self.writer, "  commits analyzed: {}", summary.analyzed)?;
        if summary.failed > 0 {
            writeln!(self.writer, "  commits failed:   {}", summary.failed.to_string().red())?;
        }
        for (kind, count) in &summary.by_kind {
            writeln!(self.writer, "  {:<32} {}", kind.display_name(), count)?;
        }
        Ok(())
    }
}

/// Consecutive records of a per-source kind that share their after element
fn group_by_target(refactorings: &[RefactoringReport]) -> Vec<&[RefactoringReport]> {
    let groupable = |r: &RefactoringReport| {
        RefactoringKind::from_display_name(&r.kind)
            .is_some_and(|kind| kind.aggregation() == Aggregation::PerSourceElement)
    };
    let mut groups = Vec::new();
    let mut start = 0;
    for end in 1..=refactorings.len() {
        let split = end == refactorings.len() || {
            let (previous, current) = (&refactorings[end - 1], &refactorings[end]);
            !(groupable(current)
                && current.kind == previous.kind
                && current.right_side_locations.first() == previous.right_side_locations.first())
        };
        if split {
            groups.push(&refactorings[start..end]);
            start = end;
        }
    }
    groups
}

fn colorize(kind: &str) -> ColoredString {
    let family = RefactoringKind::from_display_name(kind).map(|k| k.family());
    match family {
        Some(RefactoringFamily::Class) => kind.blue().bold(),
        Some(RefactoringFamily::Hierarchy) => kind.magenta().bold(),
        Some(RefactoringFamily::Method) => kind.green().bold(),
        Some(RefactoringFamily::Attribute) => kind.cyan().bold(),
        Some(RefactoringFamily::Test) => kind.yellow().bold(),
        Some(RefactoringFamily::Signature) | Some(RefactoringFamily::Annotation) | None => kind.bold(),
    }
}

pub fn create_writer<'w>(format: OutputFormat, writer: Box<dyn Write + 'w>) -> Box<dyn OutputWriter + 'w> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(writer)),
    }
}
