//! Quantifier/declaration classification.
//!
//! `all`, `no`, `sum`, `one`, `lone` and `some` are either ordinary
//! quantifiers (`some r`) or introduce a declaration (`some x: A | ...`).
//! The two are indistinguishable until the colon after an arbitrarily long
//! `x, y, z` name list, so this layer looks ahead over the whole list and
//! replays what it read.

use std::collections::VecDeque;

use tracing::trace;

use crate::Error;
use crate::source::{FatalError, TokenSource};
use crate::token::{Token, TokenKind};

/// Rewrites quantifier keywords that introduce a declaration into their
/// declaration variant (`All` to `AllDecl`, ...).
///
/// Sits directly on the primitive source; every failure of that source is
/// reported as [`Error::Fatal`].
#[derive(Debug)]
pub struct Classifier<S> {
    source: S,
    pending: VecDeque<Token>,
    last: Option<TokenKind>,
}

impl<S: TokenSource> Classifier<S> {
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            pending: VecDeque::new(),
            last: None,
        }
    }

    fn read(&mut self) -> Result<Token, Error> {
        if let Some(token) = self.pending.pop_front() {
            return Ok(token);
        }
        self.source.next_token().map_err(|err| match err {
            Error::Fatal(fatal) => Error::Fatal(fatal),
            other => Error::Fatal(FatalError::from_source(&other)),
        })
    }

    /// Read one token into `seen` and return its kind.
    fn look(&mut self, seen: &mut Vec<Token>) -> Result<TokenKind, Error> {
        let token = self.read()?;
        let kind = token.kind;
        seen.push(token);
        Ok(kind)
    }

    /// Match `private? (disj|part|exh)? ID (, ID)* :` against the upcoming
    /// tokens. Everything read is put back regardless of the outcome.
    fn starts_declaration(&mut self) -> Result<bool, Error> {
        let mut seen = Vec::new();
        let mut kind = self.look(&mut seen)?;
        if kind == TokenKind::Private {
            kind = self.look(&mut seen)?;
        }
        if matches!(kind, TokenKind::Disj | TokenKind::Part | TokenKind::Exh) {
            kind = self.look(&mut seen)?;
        }

        let mut found = false;
        if kind == TokenKind::Id {
            loop {
                match self.look(&mut seen)? {
                    TokenKind::Colon => {
                        found = true;
                        break;
                    }
                    TokenKind::Comma => {}
                    _ => break,
                }
                if self.look(&mut seen)? != TokenKind::Id {
                    break;
                }
            }
        }

        for token in seen.into_iter().rev() {
            self.pending.push_front(token);
        }
        Ok(found)
    }
}

impl<S: TokenSource> TokenSource for Classifier<S> {
    fn next_token(&mut self) -> Result<Token, Error> {
        let mut token = self.read()?;

        // A quantifier right after a colon belongs to the type of an
        // enclosing declaration and never starts one itself.
        if self.last != Some(TokenKind::Colon) {
            if let Some(variant) = token.kind.declaration_variant() {
                if self.starts_declaration()? {
                    trace!(from = %token.kind, span = %token.span, "quantifier introduces declaration");
                    token.kind = variant;
                }
            }
        }

        self.last = Some(token.kind);
        Ok(token)
    }
}
