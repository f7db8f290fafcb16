use std::collections::VecDeque;

use tracing::trace;

use crate::Error;
use crate::source::TokenSource;
use crate::token::{Token, TokenKind};

const WINDOW: usize = 3;

/// Rewrites `name : run` into `run . name` (likewise for `check`).
///
/// Keeps a three token window. Once `Eof` enters the window every later
/// slot is filled with that `Eof` and the underlying source is not read
/// again.
#[derive(Debug)]
pub struct NamedCommands<S> {
    source: S,
    window: VecDeque<Token>,
}

impl<S: TokenSource> NamedCommands<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            window: VecDeque::with_capacity(WINDOW),
        }
    }

    fn fill(&mut self) -> Result<(), Error> {
        while self.window.len() < WINDOW {
            let token = match self.window.back() {
                Some(last) if last.is_eof() => last.clone(),
                _ => self.source.next_token()?,
            };
            self.window.push_back(token);
        }
        Ok(())
    }

    fn is_named_command(&self) -> bool {
        matches!(
            (
                self.window.front().map(|t| t.kind),
                self.window.get(1).map(|t| t.kind),
                self.window.get(2).map(|t| t.kind),
            ),
            (
                Some(TokenKind::Id),
                Some(TokenKind::Colon),
                Some(TokenKind::Run | TokenKind::Check)
            )
        )
    }
}

impl<S: TokenSource> TokenSource for NamedCommands<S> {
    fn next_token(&mut self) -> Result<Token, Error> {
        self.fill()?;

        if self.is_named_command() {
            if let (Some(name), Some(mut colon), Some(mut command)) = (
                self.window.pop_front(),
                self.window.pop_front(),
                self.window.pop_front(),
            ) {
                trace!(command = %command.kind, span = %name.span, "named command reordered");
                command.value = name.value.clone();
                colon.kind = TokenKind::Dot;
                self.window.push_back(colon);
                self.window.push_back(name);
                return Ok(command);
            }
        }

        match self.window.pop_front() {
            Some(token) => Ok(token),
            None => self.source.next_token(),
        }
    }
}
