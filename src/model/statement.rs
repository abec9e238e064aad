//! Statement trees for method bodies.

use serde::{Deserialize, Serialize};

use super::entities::SourceRange;
use super::tokenizer;

/// Statement kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Expression,
    VariableDeclaration,
    Return,
    Throw,
    Break,
    Continue,
    Case,
    If,
    For,
    EnhancedFor,
    While,
    Do,
    Switch,
    Try,
    Catch,
    Finally,
    Synchronized,
    Labeled,
    Block,
    Other,
}

impl StatementKind {
    /// Compound statements own child statements
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            StatementKind::If
                | StatementKind::For
                | StatementKind::EnhancedFor
                | StatementKind::While
                | StatementKind::Do
                | StatementKind::Switch
                | StatementKind::Try
                | StatementKind::Catch
                | StatementKind::Finally
                | StatementKind::Synchronized
                | StatementKind::Labeled
                | StatementKind::Block
        )
    }

    /// Composite whose children form one statement list rather than branches
    pub fn is_block_like(&self) -> bool {
        matches!(self, StatementKind::Block | StatementKind::Switch)
    }

    /// Leaf kinds that may be matched against each other
    pub fn is_compatible_leaf(&self, other: StatementKind) -> bool {
        *self == other
            || matches!(
                (self, other),
                (StatementKind::Expression, StatementKind::VariableDeclaration)
                    | (StatementKind::VariableDeclaration, StatementKind::Expression)
            )
    }
}

/// Lexical category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Variable,
    Type,
    MethodCall,
    Literal,
    Operator,
    Keyword,
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    /// Identifiers, literals and keywords need a space between them when rendered
    pub fn is_word(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Variable
                | TokenKind::Type
                | TokenKind::MethodCall
                | TokenKind::Literal
                | TokenKind::Keyword
        )
    }
}

/// One node of a method body
///
/// Composite statements keep only their header in `text` (e.g. `if (x > 0)`);
/// their nested statements live in `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementNode {
    pub kind: StatementKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<StatementNode>,
    /// Sub-expression tokens supplied by the front end; lexed from `text` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<Token>>,
    #[serde(default)]
    pub range: SourceRange,
}

impl StatementNode {
    pub fn leaf(kind: StatementKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            children: Vec::new(),
            tokens: None,
            range: SourceRange::default(),
        }
    }

    pub fn expr(text: impl Into<String>) -> Self {
        Self::leaf(StatementKind::Expression, text)
    }

    pub fn decl(text: impl Into<String>) -> Self {
        Self::leaf(StatementKind::VariableDeclaration, text)
    }

    pub fn ret(text: impl Into<String>) -> Self {
        Self::leaf(StatementKind::Return, text)
    }

    pub fn composite(
        kind: StatementKind,
        header: impl Into<String>,
        children: Vec<StatementNode>,
    ) -> Self {
        Self {
            kind,
            text: header.into(),
            children,
            tokens: None,
            range: SourceRange::default(),
        }
    }

    pub fn block(children: Vec<StatementNode>) -> Self {
        Self::composite(StatementKind::Block, "{", children)
    }

    /// `if (cond) { then }` with an optional else branch
    pub fn if_else(
        condition: impl Into<String>,
        then: Vec<StatementNode>,
        otherwise: Option<Vec<StatementNode>>,
    ) -> Self {
        let mut branches = vec![Self::block(then)];
        if let Some(otherwise) = otherwise {
            branches.push(Self::block(otherwise));
        }
        Self::composite(StatementKind::If, condition, branches)
    }

    /// A loop or other single-branch compound statement
    pub fn looping(
        kind: StatementKind,
        header: impl Into<String>,
        body: Vec<StatementNode>,
    ) -> Self {
        Self::composite(kind, header, vec![Self::block(body)])
    }

    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.range = range;
        self
    }

    /// Tokens of the statement, lexing the text when the front end supplied none
    pub fn tokens(&self) -> Vec<Token> {
        match &self.tokens {
            Some(tokens) => tokens.clone(),
            None => tokenizer::tokenize(&self.text),
        }
    }

    /// Number of nodes in this subtree, including this one
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(StatementNode::size).sum::<usize>()
    }
}
