use std::vec;

use crate::Error;
use crate::token::{Span, Token};

/// Anything the grammar (or a filter layer) can pull tokens from.
///
/// Once a source has produced an `Eof` token it keeps producing `Eof`.
pub trait TokenSource {
    /// Read the next token.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying scanner or reader fails; the
    /// stream is unusable afterwards.
    fn next_token(&mut self) -> Result<Token, Error>;
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
    fn next_token(&mut self) -> Result<Token, Error> {
        (**self).next_token()
    }
}

impl<S: TokenSource + ?Sized> TokenSource for Box<S> {
    fn next_token(&mut self) -> Result<Token, Error> {
        (**self).next_token()
    }
}

/// Unrecoverable failure of the primitive token source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("fatal error: {message}")]
pub struct FatalError {
    pub message: String,
    pub span: Option<Span>,
}

impl FatalError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    /// Wrap a failure reported by the source below the filter.
    #[must_use]
    pub fn from_source(err: &Error) -> Self {
        let span = match err {
            Error::Lex(lex) => Some(lex.span.clone()),
            Error::Fatal(fatal) => fatal.span.clone(),
            Error::Syntax(syntax) => syntax.span.clone(),
        };
        Self {
            message: format!("IO error: {err}"),
            span,
        }
    }
}

/// A token source backed by an already scanned token vector.
///
/// Yields the tokens in order, then `Eof` forever. An `Eof` already present
/// in the vector ends the stream early.
#[derive(Debug)]
pub struct TokenStream {
    tokens: vec::IntoIter<Token>,
    eof: Span,
    done: bool,
}

impl TokenStream {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof = tokens.last().map_or_else(
            || Span::point(1, 1),
            |last| {
                let end = Span::point(last.span.end_line, last.span.end_column + 1);
                match &last.span.file {
                    Some(file) => end.with_file(file.clone()),
                    None => end,
                }
            },
        );
        Self {
            tokens: tokens.into_iter(),
            eof,
            done: false,
        }
    }
}

impl TokenSource for TokenStream {
    fn next_token(&mut self) -> Result<Token, Error> {
        if !self.done {
            if let Some(token) = self.tokens.next() {
                if token.is_eof() {
                    self.done = true;
                    self.eof = token.span.clone();
                }
                return Ok(token);
            }
            self.done = true;
        }
        Ok(Token::eof(self.eof.clone()))
    }
}

/// Pull tokens from `source` until `Eof`, which is not included.
///
/// # Errors
///
/// Propagates the first error reported by `source`.
pub fn collect_tokens<S: TokenSource>(mut source: S) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    loop {
        let token = source.next_token()?;
        if token.is_eof() {
            return Ok(tokens);
        }
        tokens.push(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn stream_repeats_eof() {
        let mut stream = TokenStream::new(vec![Token::ident("a", Span::new(1, 1, 1, 1))]);
        assert_eq!(stream.next_token().unwrap().kind, TokenKind::Id);
        let eof = stream.next_token().unwrap();
        assert!(eof.is_eof());
        assert_eq!(eof.span, Span::point(1, 2));
        assert!(stream.next_token().unwrap().is_eof());
    }

    #[test]
    fn stream_stops_at_embedded_eof() {
        let mut stream = TokenStream::new(vec![
            Token::eof(Span::point(1, 1)),
            Token::ident("unreachable", Span::point(1, 2)),
        ]);
        assert!(stream.next_token().unwrap().is_eof());
        assert!(stream.next_token().unwrap().is_eof());
    }

    #[test]
    fn collect_excludes_eof() {
        let tokens = collect_tokens(TokenStream::new(vec![
            Token::number(1, Span::point(1, 1)),
            Token::number(2, Span::point(1, 3)),
        ]))
        .unwrap();
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn fatal_from_lex_error_keeps_span() {
        let err = Error::Fatal(FatalError::new("disk gone"));
        let wrapped = FatalError::from_source(&err);
        assert!(wrapped.message.starts_with("IO error: "));
        assert!(wrapped.message.contains("disk gone"));
        assert_eq!(wrapped.span, None);
    }
}
