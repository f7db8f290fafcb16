#![allow(dead_code)]

use alloy_token_filter::{Span, Token, TokenKind, filter_str, filter_tokens};

/// Kinds of the filtered stream for `input`.
pub fn filtered_kinds(input: &str) -> Vec<TokenKind> {
    filter_str(input)
        .expect("filter failed")
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

/// A one-character token at column `col` of line 1.
pub fn tok(kind: TokenKind, col: usize) -> Token {
    Token::new(kind, Span::point(1, col))
}

pub fn id(label: &str, col: usize) -> Token {
    Token::ident(label, Span::point(1, col))
}

pub fn num(value: i64, col: usize) -> Token {
    Token::number(value, Span::point(1, col))
}

/// Give each token its own column, 1-based, in order.
pub fn positioned(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .enumerate()
        .map(|(i, mut t)| {
            t.span = Span::point(1, i + 1);
            t
        })
        .collect()
}

/// Filter `tokens` and assert every input column is covered by exactly one
/// output token.
pub fn assert_conserved(tokens: Vec<Token>) -> Vec<Token> {
    let count = tokens.len();
    let out = filter_tokens(tokens).expect("filter failed");
    let mut covered = vec![0usize; count];
    for token in &out {
        assert_eq!(token.span.line, 1);
        for col in token.span.column..=token.span.end_column {
            covered[col - 1] += 1;
        }
    }
    assert!(
        covered.iter().all(|&n| n == 1),
        "input columns not covered exactly once: {covered:?}\n--- output ---\n{out:#?}"
    );
    out
}
