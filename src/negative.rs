use tracing::trace;

use crate::Error;
use crate::source::TokenSource;
use crate::token::{Token, TokenKind, Value};

/// Folds `- 3` into the literal `-3` when the minus cannot be binary.
///
/// Only the kind of the last emitted token is consulted: after a literal,
/// an identifier or a closing bracket the minus is subtraction and is left
/// alone. Must be the outermost layer so it sees the merged operators.
#[derive(Debug)]
pub struct NegativeLiterals<S> {
    source: S,
    pending: Option<Token>,
    last: Option<TokenKind>,
}

impl<S: TokenSource> NegativeLiterals<S> {
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            pending: None,
            last: None,
        }
    }

    fn read(&mut self) -> Result<Token, Error> {
        match self.pending.take() {
            Some(token) => Ok(token),
            None => self.source.next_token(),
        }
    }

    fn emit(&mut self, token: Token) -> Token {
        self.last = Some(token.kind);
        token
    }
}

impl<S: TokenSource> TokenSource for NegativeLiterals<S> {
    fn next_token(&mut self) -> Result<Token, Error> {
        let token = self.read()?;

        if token.kind != TokenKind::Minus || self.last.is_some_and(TokenKind::is_literal_or_closing) {
            return Ok(self.emit(token));
        }

        let mut number = self.read()?;
        if let (TokenKind::Number, &Value::Number(value)) = (number.kind, &number.value) {
            number.span = token.span.merge(&number.span);
            number.value = Value::Number(value.wrapping_neg());
            trace!(span = %number.span, "negative literal");
            return Ok(self.emit(number));
        }

        self.pending = Some(number);
        Ok(self.emit(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{TokenStream, collect_tokens};
    use crate::token::Span;

    fn tok(kind: TokenKind, col: usize) -> Token {
        Token::new(kind, Span::point(1, col))
    }

    fn run(tokens: Vec<Token>) -> Vec<Token> {
        collect_tokens(NegativeLiterals::new(TokenStream::new(tokens))).expect("no source errors")
    }

    #[test]
    fn minus_after_closing_paren_is_binary() {
        let input = vec![
            tok(TokenKind::RParen, 1),
            tok(TokenKind::Minus, 2),
            Token::number(3, Span::point(1, 3)),
        ];
        assert_eq!(run(input.clone()), input);
    }

    #[test]
    fn minus_after_comma_is_a_sign() {
        let out = run(vec![
            tok(TokenKind::Comma, 1),
            tok(TokenKind::Minus, 2),
            Token::number(3, Span::point(1, 3)),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].kind, TokenKind::Number);
        assert_eq!(out[1].value, Value::Number(-3));
        assert_eq!(out[1].span, Span::new(1, 2, 1, 3));
    }

    #[test]
    fn leading_minus_is_a_sign() {
        let out = run(vec![tok(TokenKind::Minus, 1), Token::number(7, Span::point(1, 2))]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, Value::Number(-7));
    }

    #[test]
    fn minus_before_identifier_is_kept() {
        let input = vec![
            tok(TokenKind::Equals, 1),
            tok(TokenKind::Minus, 2),
            Token::ident("x", Span::point(1, 3)),
        ];
        assert_eq!(run(input.clone()), input);
    }

    #[test]
    fn after_binary_minus_next_minus_is_sign() {
        // x - -1
        let out = run(vec![
            Token::ident("x", Span::point(1, 1)),
            tok(TokenKind::Minus, 3),
            tok(TokenKind::Minus, 5),
            Token::number(1, Span::point(1, 6)),
        ]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].kind, TokenKind::Minus);
        assert_eq!(out[2].value, Value::Number(-1));
    }
}
