//! Lexer for statement text.
//!
//! Front ends may hand over statements without token metadata. This lexer
//! splits C-family statement text into tokens and classifies identifiers as
//! variables, types or method calls using lexical context only.

use super::statement::{Token, TokenKind};

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "break", "case", "catch", "class", "continue", "default", "do", "else",
    "enum", "extends", "final", "finally", "for", "if", "implements", "import", "instanceof",
    "interface", "native", "new", "package", "return", "static", "super", "switch",
    "synchronized", "this", "throw", "throws", "transient", "try", "var", "volatile", "while",
    "yield",
];

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "double", "float", "int", "long", "short", "void",
];

const WORD_LITERALS: &[&str] = &["true", "false", "null"];

// Longest first so greedy matching picks `>>>=` before `>>`.
const OPERATORS: &[&str] = &[
    ">>>=", "<<=", ">>=", ">>>", "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=",
    "*=", "/=", "%=", "&=", "|=", "^=", "->", "::", "<<", ">>", "+", "-", "*", "/", "%", "=",
    "<", ">", "!", "~", "?", ":", "&", "|", "^",
];

const PUNCTUATION: &[char] = &['(', ')', '[', ']', '{', '}', ',', '.', ';', '@'];

/// Split statement text into classified tokens
pub fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut raw = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == '"' || c == '\'' {
            let end = scan_quoted(&chars, i, c);
            raw.push(Token::new(collect(&chars, i, end), TokenKind::Literal));
            i = end;
        } else if c.is_ascii_digit() {
            let end = scan_while(&chars, i, |ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.');
            raw.push(Token::new(collect(&chars, i, end), TokenKind::Literal));
            i = end;
        } else if is_identifier_start(c) {
            let end = scan_while(&chars, i, is_identifier_part);
            raw.push(classify_word(&collect(&chars, i, end)));
            i = end;
        } else if let Some(op) = match_operator(&chars, i) {
            i += op.chars().count();
            raw.push(Token::new(op, TokenKind::Operator));
        } else {
            let kind = if PUNCTUATION.contains(&c) {
                TokenKind::Punct
            } else {
                TokenKind::Operator
            };
            raw.push(Token::new(c.to_string(), kind));
            i += 1;
        }
    }

    refine_identifiers(raw)
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn scan_while(chars: &[char], start: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut end = start;
    while end < chars.len() && pred(chars[end]) {
        end += 1;
    }
    end
}

fn scan_quoted(chars: &[char], start: usize, quote: char) -> usize {
    let mut end = start + 1;
    while end < chars.len() {
        match chars[end] {
            '\\' => end += 2,
            c if c == quote => return end + 1,
            _ => end += 1,
        }
    }
    chars.len()
}

fn collect(chars: &[char], start: usize, end: usize) -> String {
    chars[start..end.min(chars.len())].iter().collect()
}

fn match_operator(chars: &[char], at: usize) -> Option<&'static str> {
    OPERATORS.iter().copied().find(|op| {
        op.chars()
            .enumerate()
            .all(|(offset, ch)| chars.get(at + offset) == Some(&ch))
    })
}

fn classify_word(word: &str) -> Token {
    let kind = if WORD_LITERALS.contains(&word) {
        TokenKind::Literal
    } else if PRIMITIVES.contains(&word) {
        TokenKind::Type
    } else if KEYWORDS.contains(&word) {
        TokenKind::Keyword
    } else {
        TokenKind::Variable
    };
    Token::new(word, kind)
}

/// Upper camel case reads as a type name; ALL_CAPS reads as a constant
fn looks_like_type_name(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase) && word.chars().any(char::is_lowercase)
}

fn refine_identifiers(mut tokens: Vec<Token>) -> Vec<Token> {
    for i in 0..tokens.len() {
        if tokens[i].kind != TokenKind::Variable {
            continue;
        }
        let after_new = i > 0 && tokens[i - 1].is("new");
        let before_paren = tokens.get(i + 1).is_some_and(|t| t.is("("));
        tokens[i].kind = if after_new {
            TokenKind::Type
        } else if before_paren {
            TokenKind::MethodCall
        } else if looks_like_type_name(&tokens[i].text) {
            TokenKind::Type
        } else {
            TokenKind::Variable
        };
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(String, TokenKind)> {
        tokenize(text)
            .into_iter()
            .map(|t| (t.text, t.kind))
            .collect()
    }

    #[test]
    fn classifies_method_call_and_arguments() {
        let tokens = kinds("assertEquals(4, calc.square(2));");
        assert_eq!(tokens[0], ("assertEquals".into(), TokenKind::MethodCall));
        assert_eq!(tokens[2], ("4".into(), TokenKind::Literal));
        assert_eq!(tokens[4], ("calc".into(), TokenKind::Variable));
        assert_eq!(tokens[6], ("square".into(), TokenKind::MethodCall));
        assert_eq!(tokens.last().map(|t| t.0.as_str()), Some(";"));
    }

    #[test]
    fn constructor_call_is_a_type() {
        let tokens = kinds("List<String> names = new ArrayList<>();");
        assert_eq!(tokens[0].1, TokenKind::Type);
        assert_eq!(tokens[1], ("<".into(), TokenKind::Operator));
        assert_eq!(tokens[2].1, TokenKind::Type);
        assert_eq!(tokens[4], ("names".into(), TokenKind::Variable));
        assert_eq!(tokens[7], ("ArrayList".into(), TokenKind::Type));
    }

    #[test]
    fn constants_are_variables() {
        let tokens = kinds("byte[] raw = text.getBytes(UTF_8);");
        let constant = tokens.iter().find(|t| t.0 == "UTF_8").map(|t| t.1);
        assert_eq!(constant, Some(TokenKind::Variable));
        assert_eq!(tokens[0], ("byte".into(), TokenKind::Type));
    }

    #[test]
    fn string_literals_keep_escapes() {
        let tokens = kinds(r#"log("say \"hi\"", x >>= 2);"#);
        assert_eq!(tokens[2], (r#""say \"hi\"""#.into(), TokenKind::Literal));
        assert!(tokens.iter().any(|t| t.0 == ">>=" && t.1 == TokenKind::Operator));
    }

    #[test]
    fn word_literals_and_keywords() {
        let tokens = kinds("return flag == null ? true : this.value;");
        assert_eq!(tokens[0].1, TokenKind::Keyword);
        assert_eq!(tokens[3], ("null".into(), TokenKind::Literal));
        assert_eq!(tokens[5], ("true".into(), TokenKind::Literal));
        assert_eq!(tokens[7], ("this".into(), TokenKind::Keyword));
    }
}
