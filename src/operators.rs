use std::collections::VecDeque;

use tracing::trace;

use crate::Error;
use crate::source::TokenSource;
use crate::token::{Token, TokenKind, Value};

/// Compound kind for a multiplicity arrow.
///
/// `left`/`right` are the multiplicity keywords around the arrow, `None`
/// when absent. `set` is unconstrained and behaves like an absent keyword,
/// so `set -> set` is a plain `Arrow`.
#[must_use]
pub const fn multiplicity_arrow(left: Option<TokenKind>, right: Option<TokenKind>) -> TokenKind {
    use TokenKind::{
        AnyArrowLone, AnyArrowOne, AnyArrowSome, Arrow, Lone, LoneArrowAny, LoneArrowLone,
        LoneArrowOne, LoneArrowSome, One, OneArrowAny, OneArrowLone, OneArrowOne, OneArrowSome,
        Some as SomeKw, SomeArrowAny, SomeArrowLone, SomeArrowOne, SomeArrowSome,
    };

    match (left, right) {
        (Some(One), Some(One)) => OneArrowOne,
        (Some(One), Some(Lone)) => OneArrowLone,
        (Some(One), Some(SomeKw)) => OneArrowSome,
        (Some(One), _) => OneArrowAny,
        (Some(Lone), Some(One)) => LoneArrowOne,
        (Some(Lone), Some(Lone)) => LoneArrowLone,
        (Some(Lone), Some(SomeKw)) => LoneArrowSome,
        (Some(Lone), _) => LoneArrowAny,
        (Some(SomeKw), Some(One)) => SomeArrowOne,
        (Some(SomeKw), Some(Lone)) => SomeArrowLone,
        (Some(SomeKw), Some(SomeKw)) => SomeArrowSome,
        (Some(SomeKw), _) => SomeArrowAny,
        (_, Some(One)) => AnyArrowOne,
        (_, Some(Lone)) => AnyArrowLone,
        (_, Some(SomeKw)) => AnyArrowSome,
        _ => Arrow,
    }
}

/// Built-in integer function named by `fun/<label>`.
fn int_builtin(label: &str) -> Option<TokenKind> {
    let kind = match label {
        "add" => TokenKind::IntAdd,
        "sub" => TokenKind::IntSub,
        "mul" => TokenKind::IntMul,
        "div" => TokenKind::IntDiv,
        "rem" => TokenKind::IntRem,
        "min" => TokenKind::IntMin,
        "max" => TokenKind::IntMax,
        "next" => TokenKind::IntNext,
        _ => return None,
    };
    Some(kind)
}

/// Fold `last` into `first`: `first` takes `kind` and the covering span.
fn merge(mut first: Token, last: &Token, kind: TokenKind) -> Token {
    first.span = first.span.merge(&last.span);
    first.kind = kind;
    trace!(%kind, span = %first.span, "merged operator");
    first
}

/// Merges operators the scanner emits as several primitive tokens:
///
/// - `! in`, `! =`, `! <`, `! =<`, `! >`, `! >=` into `NotIn` .. `NotGte`
/// - `pred / totalOrder` into `TotalOrder`
/// - `fun / add` (and `sub mul div rem min max next`) into `IntAdd` ..
/// - `fun / String` into the identifier `fun/String`
/// - `m1 -> m2` into one of the multiplicity arrows
///
/// The longest merge is always tried first; tokens read but not merged are
/// replayed in their original order.
#[derive(Debug)]
pub struct OperatorMerge<S> {
    source: S,
    pending: VecDeque<Token>,
}

impl<S: TokenSource> OperatorMerge<S> {
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            pending: VecDeque::new(),
        }
    }

    fn read(&mut self) -> Result<Token, Error> {
        match self.pending.pop_front() {
            Some(token) => Ok(token),
            None => self.source.next_token(),
        }
    }

    /// Put back the most recently read token.
    fn unread(&mut self, token: Token) {
        self.pending.push_front(token);
    }

    fn negation(&mut self, not: Token) -> Result<Token, Error> {
        let next = self.read()?;
        if let Some(kind) = next.kind.negated() {
            return Ok(merge(not, &next, kind));
        }
        self.unread(next);
        Ok(not)
    }

    /// `pred/name` and `fun/name`.
    fn qualified(&mut self, keyword: Token) -> Result<Token, Error> {
        let slash = self.read()?;
        if slash.kind != TokenKind::Slash {
            self.unread(slash);
            return Ok(keyword);
        }

        let mut name = self.read()?;
        if keyword.kind == TokenKind::Fun && name.is_ident("String") {
            name.span = keyword.span.merge(&name.span);
            name.value = Value::Ident("fun/String".to_string());
            trace!(span = %name.span, "qualified String identifier");
            return Ok(name);
        }

        let builtin = match (keyword.kind, name.kind, name.label()) {
            (TokenKind::Pred, TokenKind::Id, Some("totalOrder")) => Some(TokenKind::TotalOrder),
            (TokenKind::Fun, TokenKind::Id, Some(label)) => int_builtin(label),
            _ => None,
        };
        if let Some(kind) = builtin {
            return Ok(merge(keyword, &name, kind));
        }

        self.unread(name);
        self.unread(slash);
        Ok(keyword)
    }

    /// `one`, `lone`, `some` or `set`, possibly followed by an arrow.
    fn left_multiplicity(&mut self, left: Token) -> Result<Token, Error> {
        let arrow = self.read()?;
        if arrow.kind != TokenKind::Arrow {
            self.unread(arrow);
            return Ok(left);
        }

        let right = self.read()?;
        if right.kind.is_multiplicity() {
            let kind = multiplicity_arrow(Some(left.kind), Some(right.kind));
            return Ok(merge(left, &right, kind));
        }

        self.unread(right);
        let kind = multiplicity_arrow(Some(left.kind), None);
        Ok(merge(left, &arrow, kind))
    }

    /// An arrow with no multiplicity on its left.
    fn bare_arrow(&mut self, arrow: Token) -> Result<Token, Error> {
        let right = self.read()?;
        if right.kind.is_multiplicity() {
            let kind = multiplicity_arrow(None, Some(right.kind));
            return Ok(merge(arrow, &right, kind));
        }
        self.unread(right);
        Ok(arrow)
    }
}

impl<S: TokenSource> TokenSource for OperatorMerge<S> {
    fn next_token(&mut self) -> Result<Token, Error> {
        let token = self.read()?;
        match token.kind {
            TokenKind::Not => self.negation(token),
            TokenKind::Pred | TokenKind::Fun => self.qualified(token),
            TokenKind::One | TokenKind::Lone | TokenKind::Some | TokenKind::Set => {
                self.left_multiplicity(token)
            }
            TokenKind::Arrow => self.bare_arrow(token),
            _ => Ok(token),
        }
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

    fn id(label: &str, col: usize) -> Token {
        Token::ident(label, Span::point(1, col))
    }

    fn run(tokens: Vec<Token>) -> Vec<Token> {
        collect_tokens(OperatorMerge::new(TokenStream::new(tokens))).expect("no source errors")
    }

    fn kinds(tokens: Vec<Token>) -> Vec<TokenKind> {
        run(tokens).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn negated_relations() {
        for (rel, expected) in [
            (TokenKind::In, TokenKind::NotIn),
            (TokenKind::Equals, TokenKind::NotEquals),
            (TokenKind::Lt, TokenKind::NotLt),
            (TokenKind::Lte, TokenKind::NotLte),
            (TokenKind::Gt, TokenKind::NotGt),
            (TokenKind::Gte, TokenKind::NotGte),
        ] {
            let out = run(vec![tok(TokenKind::Not, 1), tok(rel, 2)]);
            assert_eq!(out.len(), 1);
            assert_eq!(out[0].kind, expected);
            assert_eq!(out[0].span, Span::new(1, 1, 1, 2));
        }
    }

    #[test]
    fn lone_not_is_kept() {
        assert_eq!(
            kinds(vec![tok(TokenKind::Not, 1), tok(TokenKind::Not, 2), tok(TokenKind::In, 3)]),
            vec![TokenKind::Not, TokenKind::NotIn]
        );
    }

    #[test]
    fn total_order() {
        let out = run(vec![
            tok(TokenKind::Pred, 1),
            tok(TokenKind::Slash, 5),
            id("totalOrder", 6),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, TokenKind::TotalOrder);
        assert_eq!(out[0].span, Span::new(1, 1, 1, 6));
    }

    #[test]
    fn integer_builtins() {
        for (label, expected) in [
            ("add", TokenKind::IntAdd),
            ("sub", TokenKind::IntSub),
            ("mul", TokenKind::IntMul),
            ("div", TokenKind::IntDiv),
            ("rem", TokenKind::IntRem),
            ("min", TokenKind::IntMin),
            ("max", TokenKind::IntMax),
            ("next", TokenKind::IntNext),
        ] {
            assert_eq!(
                kinds(vec![tok(TokenKind::Fun, 1), tok(TokenKind::Slash, 4), id(label, 5)]),
                vec![expected]
            );
        }
    }

    #[test]
    fn fun_string_becomes_identifier() {
        let out = run(vec![
            tok(TokenKind::Fun, 1),
            tok(TokenKind::Slash, 4),
            id("String", 5),
        ]);
        assert_eq!(out.len(), 1);
        assert!(out[0].is_ident("fun/String"));
        assert_eq!(out[0].span, Span::new(1, 1, 1, 5));
    }

    #[test]
    fn unknown_qualified_name_is_replayed() {
        let input = vec![tok(TokenKind::Pred, 1), tok(TokenKind::Slash, 5), id("add", 6)];
        assert_eq!(run(input.clone()), input);

        let input = vec![tok(TokenKind::Fun, 1), tok(TokenKind::Slash, 4), id("foo", 5)];
        assert_eq!(run(input.clone()), input);
    }

    #[test]
    fn fun_without_slash() {
        let input = vec![tok(TokenKind::Fun, 1), id("f", 5), tok(TokenKind::LBracket, 6)];
        assert_eq!(run(input.clone()), input);
    }

    #[test]
    fn full_multiplicity_arrow() {
        let out = run(vec![
            tok(TokenKind::Lone, 1),
            tok(TokenKind::Arrow, 6),
            tok(TokenKind::Some, 9),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, TokenKind::LoneArrowSome);
        assert_eq!(out[0].span, Span::new(1, 1, 1, 9));
    }

    #[test]
    fn left_multiplicity_only() {
        let out = run(vec![
            tok(TokenKind::One, 1),
            tok(TokenKind::Arrow, 5),
            id("B", 8),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind, TokenKind::OneArrowAny);
        assert_eq!(out[0].span, Span::new(1, 1, 1, 5));
        assert!(out[1].is_ident("B"));
    }

    #[test]
    fn set_arrow_set_is_plain_arrow() {
        assert_eq!(
            kinds(vec![
                tok(TokenKind::Set, 1),
                tok(TokenKind::Arrow, 2),
                tok(TokenKind::Set, 3)
            ]),
            vec![TokenKind::Arrow]
        );
        assert_eq!(
            kinds(vec![tok(TokenKind::Set, 1), tok(TokenKind::Arrow, 2), id("B", 3)]),
            vec![TokenKind::Arrow, TokenKind::Id]
        );
    }

    #[test]
    fn bare_arrow() {
        assert_eq!(
            kinds(vec![id("A", 1), tok(TokenKind::Arrow, 2), tok(TokenKind::One, 3)]),
            vec![TokenKind::Id, TokenKind::AnyArrowOne]
        );
        assert_eq!(
            kinds(vec![id("A", 1), tok(TokenKind::Arrow, 2), id("B", 3)]),
            vec![TokenKind::Id, TokenKind::Arrow, TokenKind::Id]
        );
    }

    #[test]
    fn multiplicity_without_arrow() {
        let input = vec![tok(TokenKind::Some, 1), id("r", 2)];
        assert_eq!(run(input.clone()), input);
    }
}
