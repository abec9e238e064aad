//! Replacement classifier.
//!
//! Two comparable statements are aligned token by token with a longest
//! common subsequence. Every run of differing tokens between two aligned
//! anchors is a hunk, and each hunk is classified into one
//! [`ReplacementKind`]. When several kinds apply to the same hunk the one
//! with the highest priority wins, so structural replacements always take
//! precedence over literal ones.

use serde::{Deserialize, Serialize};

use super::tree::render_tokens;
use crate::model::{Token, TokenKind};

/// Kind of sub-expression difference, in priority order (highest first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplacementKind {
    MethodCallTargetChanged,
    MethodNameChanged,
    TypeChanged,
    OperatorChanged,
    ArgumentAdded,
    ArgumentRemoved,
    VariableRenamed,
    VariableReplacedWithLiteral,
    LiteralReplacedWithVariable,
    LiteralChanged,
    ExpressionAdded,
    ExpressionRemoved,
    ExpressionReplaced,
}

impl ReplacementKind {
    /// Lower value wins when several kinds describe the same hunk
    pub fn priority(&self) -> u8 {
        *self as u8
    }

    /// The same replacement seen from the opposite direction
    pub fn inverse(&self) -> Self {
        match self {
            Self::ArgumentAdded => Self::ArgumentRemoved,
            Self::ArgumentRemoved => Self::ArgumentAdded,
            Self::VariableReplacedWithLiteral => Self::LiteralReplacedWithVariable,
            Self::LiteralReplacedWithVariable => Self::VariableReplacedWithLiteral,
            Self::ExpressionAdded => Self::ExpressionRemoved,
            Self::ExpressionRemoved => Self::ExpressionAdded,
            other => *other,
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::MethodCallTargetChanged
                | Self::MethodNameChanged
                | Self::TypeChanged
                | Self::OperatorChanged
                | Self::ArgumentAdded
                | Self::ArgumentRemoved
        )
    }

    pub fn is_literal_swap(&self) -> bool {
        matches!(
            self,
            Self::VariableReplacedWithLiteral | Self::LiteralReplacedWithVariable
        )
    }
}

/// One minimal substitution reconciling two statements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Replacement {
    pub kind: ReplacementKind,
    pub before: String,
    pub after: String,
}

impl Replacement {
    pub fn new(kind: ReplacementKind, before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            kind,
            before: before.into(),
            after: after.into(),
        }
    }

    pub fn inverse(&self) -> Self {
        Self::new(self.kind.inverse(), self.after.clone(), self.before.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Keep,
    Delete,
    Insert,
}

/// A maximal run of non-aligned tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hunk {
    before: (usize, usize),
    after: (usize, usize),
}

/// Derive the ordered replacements turning `before` into `after`
///
/// Returns `None` when the share of differing non-punctuation tokens
/// exceeds `max_change_ratio`; such statements are not comparable.
pub fn classify(before: &[Token], after: &[Token], max_change_ratio: f64) -> Option<Vec<Replacement>> {
    if before.is_empty() && after.is_empty() {
        return Some(Vec::new());
    }

    let hunks = hunks(&align(before, after));
    let total = weight(before) + weight(after);
    let changed: usize = hunks
        .iter()
        .map(|h| weight(&before[h.before.0..h.before.1]) + weight(&after[h.after.0..h.after.1]))
        .sum();
    if total > 0 && changed as f64 / total as f64 > max_change_ratio {
        return None;
    }

    let mut replacements: Vec<Replacement> = Vec::with_capacity(hunks.len());
    for hunk in hunks {
        let replacement = classify_hunk(before, after, hunk);
        if !replacements.contains(&replacement) {
            replacements.push(replacement);
        }
    }
    Some(replacements)
}

/// Punctuation does not count towards the change ratio
fn weight(tokens: &[Token]) -> usize {
    tokens.iter().filter(|t| t.kind != TokenKind::Punct).count()
}

/// Token-level edit script from a suffix LCS table; deletions win ties
fn align(before: &[Token], after: &[Token]) -> Vec<Edit> {
    let (n, m) = (before.len(), after.len());
    let mut lcs = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if before[i].text == after[j].text {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut edits = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if before[i].text == after[j].text && lcs[i][j] == lcs[i + 1][j + 1] + 1 {
            edits.push(Edit::Keep);
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            edits.push(Edit::Delete);
            i += 1;
        } else {
            edits.push(Edit::Insert);
            j += 1;
        }
    }
    edits.extend(std::iter::repeat_n(Edit::Delete, n - i));
    edits.extend(std::iter::repeat_n(Edit::Insert, m - j));
    edits
}

fn hunks(edits: &[Edit]) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let (mut i, mut j) = (0, 0);
    let mut open: Option<Hunk> = None;
    for edit in edits {
        match edit {
            Edit::Keep => {
                if let Some(hunk) = open.take() {
                    hunks.push(hunk);
                }
                i += 1;
                j += 1;
            }
            Edit::Delete => {
                let hunk = open.get_or_insert(Hunk {
                    before: (i, i),
                    after: (j, j),
                });
                hunk.before.1 = i + 1;
                i += 1;
            }
            Edit::Insert => {
                let hunk = open.get_or_insert(Hunk {
                    before: (i, i),
                    after: (j, j),
                });
                hunk.after.1 = j + 1;
                j += 1;
            }
        }
    }
    hunks.extend(open);
    hunks
}

fn classify_hunk(before: &[Token], after: &[Token], hunk: Hunk) -> Replacement {
    let removed = &before[hunk.before.0..hunk.before.1];
    let added = &after[hunk.after.0..hunk.after.1];

    match (removed.is_empty(), added.is_empty()) {
        (false, true) => {
            let kind = if is_argument(before, hunk.before) {
                ReplacementKind::ArgumentRemoved
            } else {
                ReplacementKind::ExpressionRemoved
            };
            Replacement::new(kind, argument_text(removed), "")
        }
        (true, false) => {
            let kind = if is_argument(after, hunk.after) {
                ReplacementKind::ArgumentAdded
            } else {
                ReplacementKind::ExpressionAdded
            };
            Replacement::new(kind, "", argument_text(added))
        }
        _ => {
            let kind = match (removed, added) {
                ([old], [new]) => single_token_kind(before, hunk.before.1, old, new),
                _ => ReplacementKind::ExpressionReplaced,
            };
            Replacement::new(kind, render_tokens(removed), render_tokens(added))
        }
    }
}

fn single_token_kind(before: &[Token], next: usize, old: &Token, new: &Token) -> ReplacementKind {
    use TokenKind::*;

    let is_call_target = before.get(next).is_some_and(|t| t.is("."))
        && before.get(next + 1).is_some_and(|t| t.kind == MethodCall)
        && old.is_word()
        && new.is_word();

    let mut candidates = vec![ReplacementKind::ExpressionReplaced];
    if is_call_target {
        candidates.push(ReplacementKind::MethodCallTargetChanged);
    }
    match (old.kind, new.kind) {
        (MethodCall, MethodCall) => candidates.push(ReplacementKind::MethodNameChanged),
        (Type, Type) => candidates.push(ReplacementKind::TypeChanged),
        (Operator, Operator) => candidates.push(ReplacementKind::OperatorChanged),
        (Variable, Variable) => candidates.push(ReplacementKind::VariableRenamed),
        (Variable, Literal) => candidates.push(ReplacementKind::VariableReplacedWithLiteral),
        (Literal, Variable) => candidates.push(ReplacementKind::LiteralReplacedWithVariable),
        (Literal, Literal) => candidates.push(ReplacementKind::LiteralChanged),
        _ => {}
    }
    candidates
        .into_iter()
        .min_by_key(ReplacementKind::priority)
        .unwrap_or(ReplacementKind::ExpressionReplaced)
}

/// A one-sided hunk is an argument when it sits inside a call's parentheses
/// and is delimited by commas or fills the whole argument list.
fn is_argument(tokens: &[Token], (start, end): (usize, usize)) -> bool {
    let Some(open) = enclosing_paren(tokens, start) else {
        return false;
    };
    let is_call = open > 0
        && matches!(
            tokens[open - 1].kind,
            TokenKind::MethodCall | TokenKind::Type
        );
    if !is_call {
        return false;
    }
    let span = &tokens[start..end];
    let comma_delimited = span.first().is_some_and(|t| t.is(","))
        || span.last().is_some_and(|t| t.is(","));
    let fills_list = tokens[start - 1].is("(") && tokens.get(end).is_some_and(|t| t.is(")"));
    comma_delimited || fills_list
}

fn enclosing_paren(tokens: &[Token], position: usize) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..position).rev() {
        match tokens[i].text.as_str() {
            ")" => depth += 1,
            "(" if depth == 0 => return Some(i),
            "(" => depth -= 1,
            _ => {}
        }
    }
    None
}

fn argument_text(tokens: &[Token]) -> String {
    let start = usize::from(tokens.first().is_some_and(|t| t.is(",")));
    let end = tokens.len() - usize::from(tokens.len() > start && tokens.last().is_some_and(|t| t.is(",")));
    render_tokens(&tokens[start..end])
}
