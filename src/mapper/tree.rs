//! Flattened, pre-order view of a statement tree.
//!
//! The body mapper works on statement ids rather than on the nested
//! [`StatementNode`] structure. Flattening happens once per operation and
//! also precomputes the normalized text and diff tokens of every statement.

use std::collections::BTreeSet;

use crate::model::{OperationEntity, SourceRange, StatementKind, StatementNode, Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub struct FlatStatement {
    pub id: usize,
    pub parent: Option<usize>,
    pub depth: usize,
    /// Position among its siblings
    pub index: usize,
    pub kind: StatementKind,
    pub text: String,
    /// Tokens used for comparison: trailing `;` and `this.` qualifiers removed
    pub tokens: Vec<Token>,
    pub normalized: String,
    pub children: Vec<usize>,
    pub range: SourceRange,
}

impl FlatStatement {
    pub fn is_leaf(&self) -> bool {
        !self.kind.is_composite()
    }

    /// Blocks only group statements and never count towards coverage
    pub fn is_countable(&self) -> bool {
        self.kind != StatementKind::Block
    }
}

/// A call site found in a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInvocation {
    pub name: String,
    pub receiver: Option<String>,
    pub arguments: usize,
    pub statement: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementTree {
    nodes: Vec<FlatStatement>,
    roots: Vec<usize>,
    locals: BTreeSet<String>,
}

impl StatementTree {
    pub fn from_operation(op: &OperationEntity) -> Self {
        Self::from_body(op.body.as_ref())
    }

    /// Flatten a method body; the body block itself is not a statement
    pub fn from_body(body: Option<&StatementNode>) -> Self {
        let mut tree = Self::default();
        let Some(body) = body else {
            return tree;
        };
        let top: Vec<&StatementNode> = if body.kind == StatementKind::Block {
            body.children.iter().collect()
        } else {
            vec![body]
        };
        for (index, node) in top.into_iter().enumerate() {
            let id = tree.push(node, None, 0, index);
            tree.roots.push(id);
        }
        tree.locals = tree
            .nodes
            .iter()
            .filter_map(declared_variable)
            .collect();
        tree
    }

    fn push(&mut self, node: &StatementNode, parent: Option<usize>, depth: usize, index: usize) -> usize {
        let id = self.nodes.len();
        let tokens = comparison_tokens(node.tokens());
        let normalized = render_tokens(&tokens);
        self.nodes.push(FlatStatement {
            id,
            parent,
            depth,
            index,
            kind: node.kind,
            text: node.text.clone(),
            tokens,
            normalized,
            children: Vec::new(),
            range: node.range.clone(),
        });
        let children: Vec<usize> = node
            .children
            .iter()
            .enumerate()
            .map(|(child_index, child)| self.push(child, Some(id), depth + 1, child_index))
            .collect();
        self.nodes[id].children = children;
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: usize) -> &FlatStatement {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[FlatStatement] {
        &self.nodes
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn locals(&self) -> &BTreeSet<String> {
        &self.locals
    }

    pub fn is_local(&self, name: &str) -> bool {
        self.locals.contains(name)
    }

    /// Statements that count towards coverage, optionally limited to a scope
    pub fn countable(&self, scope: Option<&BTreeSet<usize>>) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.is_countable())
            .filter(|n| scope.is_none_or(|s| s.contains(&n.id)))
            .count()
    }

    pub fn method_calls(&self) -> Vec<MethodInvocation> {
        self.nodes
            .iter()
            .flat_map(|node| invocations(&node.tokens, node.id))
            .collect()
    }

    pub fn calls(&self, name: &str, arguments: usize) -> bool {
        self.method_calls()
            .iter()
            .any(|call| call.name == name && call.arguments == arguments)
    }
}

/// Drop the statement terminator and `this.` qualifiers
fn comparison_tokens(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let is_this_qualifier = tokens[i].is("this")
            && tokens.get(i + 1).is_some_and(|t| t.is("."))
            && tokens.get(i + 2).is_some_and(Token::is_word);
        if is_this_qualifier {
            i += 2;
            continue;
        }
        out.push(tokens[i].clone());
        i += 1;
    }
    while out.last().is_some_and(|t| t.is(";")) {
        out.pop();
    }
    out
}

/// Render tokens compactly; words are separated by a single space
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut text = String::new();
    let mut previous_word = false;
    for token in tokens {
        let word = token.is_word();
        if word && previous_word {
            text.push(' ');
        }
        text.push_str(&token.text);
        previous_word = word;
    }
    text
}

fn declared_variable(node: &FlatStatement) -> Option<String> {
    let tokens = &node.tokens;
    let last_variable_before = |end: usize| {
        tokens[..end]
            .iter()
            .rev()
            .find(|t| t.kind == TokenKind::Variable)
            .map(|t| t.text.clone())
    };
    match node.kind {
        StatementKind::VariableDeclaration => {
            let end = tokens.iter().position(|t| t.is("=")).unwrap_or(tokens.len());
            last_variable_before(end)
        }
        StatementKind::For => {
            let end = tokens.iter().position(|t| t.is("=") || t.is(";"))?;
            last_variable_before(end)
        }
        StatementKind::EnhancedFor => {
            let end = tokens.iter().position(|t| t.is(":"))?;
            last_variable_before(end)
        }
        StatementKind::Catch => last_variable_before(tokens.len()),
        _ => None,
    }
}

fn invocations(tokens: &[Token], statement: usize) -> Vec<MethodInvocation> {
    tokens
        .iter()
        .enumerate()
        .filter(|(i, t)| t.kind == TokenKind::MethodCall && tokens.get(i + 1).is_some_and(|n| n.is("(")))
        .map(|(i, t)| {
            let receiver = (i >= 2 && tokens[i - 1].is(".") && tokens[i - 2].is_word())
                .then(|| tokens[i - 2].text.clone());
            MethodInvocation {
                name: t.text.clone(),
                receiver,
                arguments: count_arguments(tokens, i + 1),
                statement,
            }
        })
        .collect()
}

/// Count top-level arguments of the parenthesized list opening at `open`
fn count_arguments(tokens: &[Token], open: usize) -> usize {
    if tokens.get(open + 1).is_some_and(|t| t.is(")")) {
        return 0;
    }
    let mut depth = 0usize;
    let mut commas = 0usize;
    for token in &tokens[open..] {
        match token.text.as_str() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            }
            "," if depth == 1 => commas += 1,
            _ => {}
        }
    }
    commas + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body() -> StatementNode {
        StatementNode::block(vec![
            StatementNode::decl("int total = 0;"),
            StatementNode::looping(
                StatementKind::EnhancedFor,
                "for (int value : this.values)",
                vec![StatementNode::expr("total += scale(value, this.factor);")],
            ),
            StatementNode::ret("return total;"),
        ])
    }

    #[test]
    fn flattens_in_pre_order_without_root() {
        let tree = StatementTree::from_body(Some(&sample_body()));
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.roots(), &[0, 1, 4]);
        assert_eq!(tree.node(2).kind, StatementKind::Block);
        assert_eq!(tree.node(3).depth, 2);
        assert_eq!(tree.node(3).parent, Some(2));
        assert_eq!(tree.countable(None), 4);
    }

    #[test]
    fn normalization_drops_terminator_and_this() {
        let tree = StatementTree::from_body(Some(&sample_body()));
        assert_eq!(tree.node(3).normalized, "total+=scale(value,factor)");
        assert_eq!(tree.node(1).normalized, "for(int value:values)");
    }

    #[test]
    fn collects_declared_locals() {
        let tree = StatementTree::from_body(Some(&sample_body()));
        let locals: Vec<&str> = tree.locals().iter().map(String::as_str).collect();
        assert_eq!(locals, vec!["total", "value"]);
    }

    #[test]
    fn finds_calls_with_argument_counts() {
        let tree = StatementTree::from_body(Some(&StatementNode::block(vec![
            StatementNode::expr("helper.run(a, f(b, c), new int[] {1, 2});"),
            StatementNode::expr("reset();"),
        ])));
        let calls = tree.method_calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].name, "run");
        assert_eq!(calls[0].receiver.as_deref(), Some("helper"));
        assert_eq!(calls[0].arguments, 3);
        assert_eq!(calls[1].name, "f");
        assert_eq!(calls[1].arguments, 2);
        assert!(tree.calls("reset", 0));
    }

    #[test]
    fn absent_body_is_empty() {
        let tree = StatementTree::from_body(None);
        assert!(tree.is_empty());
        assert_eq!(tree.countable(None), 0);
    }
}
