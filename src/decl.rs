//! Declarations such as `disj a, b, c: X`, as built by grammar actions once
//! the quantifier ambiguity has been resolved.

use std::fmt;
use std::sync::OnceLock;

use crate::token::{Span, Token, TokenKind};

/// Characters a declared name may not contain.
const RESERVED: [char; 2] = ['/', '@'];

/// Anything with an optional source range.
pub trait Spanned {
    fn span(&self) -> Option<Span>;
}

impl Spanned for Span {
    fn span(&self) -> Option<Span> {
        Some(self.clone())
    }
}

impl Spanned for Option<Span> {
    fn span(&self) -> Option<Span> {
        self.clone()
    }
}

impl Spanned for Token {
    fn span(&self) -> Option<Span> {
        Some(self.span.clone())
    }
}

impl<T: Spanned + ?Sized> Spanned for &T {
    fn span(&self) -> Option<Span> {
        (**self).span()
    }
}

impl<T: Spanned + ?Sized> Spanned for Box<T> {
    fn span(&self) -> Option<Span> {
        (**self).span()
    }
}

/// Classifies a declaration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A declaration without any name.
    EmptyNameList,
    /// A name that is the empty string.
    EmptyName,
    /// A name containing `/` or `@`.
    ReservedCharacter(char),
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyNameList => {
                write!(f, "the list of declarations cannot be empty")
            }
            Self::EmptyName => {
                write!(f, "variable name cannot be empty")
            }
            Self::ReservedCharacter(ch) => {
                write!(f, "variable name cannot contain '{ch}'")
            }
        }
    }
}

/// Error produced while building a declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error{}: {kind}", location(.span))]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub span: Option<Span>,
}

#[allow(clippy::ref_option)]
fn location(span: &Option<Span>) -> String {
    match span {
        Some(Span {
            file: Some(file),
            line,
            column,
            ..
        }) => format!(" in {file} at line {line}, column {column}"),
        Some(span) => format!(" at {span}"),
        None => String::new(),
    }
}

/// A declared name and where it was written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    pub label: String,
    pub span: Span,
}

impl Name {
    #[must_use]
    pub fn new(label: impl Into<String>, span: Span) -> Self {
        Self {
            label: label.into(),
            span,
        }
    }

    /// The name carried by an identifier token.
    #[must_use]
    pub fn from_token(token: &Token) -> Option<Self> {
        if token.kind != TokenKind::Id {
            return None;
        }
        token
            .label()
            .map(|label| Self::new(label, token.span.clone()))
    }

    fn check(&self) -> Result<(), SyntaxError> {
        let kind = if self.label.is_empty() {
            SyntaxErrorKind::EmptyName
        } else if let Some(ch) = RESERVED.into_iter().find(|ch| self.label.contains(*ch)) {
            SyntaxErrorKind::ReservedCharacter(ch)
        } else {
            return Ok(());
        };
        Err(SyntaxError {
            kind,
            span: Some(self.span.clone()),
        })
    }
}

/// Immutable field, variable or parameter declaration such as `a, b: X`.
///
/// Invariants: at least one name; no name is empty or contains `/` or
/// `@`; a single-name declaration is never disjoint; `position` covers the
/// `disj` keyword and every name.
#[derive(Debug, Clone)]
pub struct Declaration<E> {
    position: Option<Span>,
    disjoint: Option<Span>,
    names: Vec<Name>,
    value: E,
    span: OnceLock<Option<Span>>,
}

impl<E: Spanned> Declaration<E> {
    /// Build a declaration of `names` bound by `value`.
    ///
    /// `disjoint` is the position of the `disj` keyword, if present. It is
    /// dropped (but still counted in the position) when there is only one
    /// name.
    ///
    /// # Errors
    ///
    /// Returns `SyntaxError` if `names` is empty or a name is empty or
    /// contains a reserved character. Names are checked in order and the
    /// first offender is reported.
    pub fn new(
        position: Option<Span>,
        names: Vec<Name>,
        disjoint: Option<Span>,
        value: E,
    ) -> Result<Self, SyntaxError> {
        let mut position = Span::cover(position.as_ref(), disjoint.as_ref());
        for name in &names {
            position = Span::cover(position.as_ref(), Some(&name.span));
        }

        if names.is_empty() {
            return Err(SyntaxError {
                kind: SyntaxErrorKind::EmptyNameList,
                span: position,
            });
        }
        for name in &names {
            name.check()?;
        }

        let disjoint = disjoint.filter(|_| names.len() > 1);
        Ok(Self {
            position,
            disjoint,
            names,
            value,
            span: OnceLock::new(),
        })
    }

    /// Build a declaration with exactly one name.
    ///
    /// # Errors
    ///
    /// See [`Declaration::new`].
    pub fn single(position: Option<Span>, name: Name, value: E) -> Result<Self, SyntaxError> {
        Self::new(position, vec![name], None, value)
    }

    /// Range covering the position, the `disj` keyword and the bound value.
    #[must_use]
    pub fn span(&self) -> Option<&Span> {
        self.span
            .get_or_init(|| {
                let own = Span::cover(self.position.as_ref(), self.disjoint.as_ref());
                Span::cover(own.as_ref(), self.value.span().as_ref())
            })
            .as_ref()
    }
}

impl<E> Declaration<E> {
    #[must_use]
    pub const fn position(&self) -> Option<&Span> {
        self.position.as_ref()
    }

    #[must_use]
    pub const fn is_disjoint(&self) -> bool {
        self.disjoint.is_some()
    }

    #[must_use]
    pub const fn disjoint_position(&self) -> Option<&Span> {
        self.disjoint.as_ref()
    }

    #[must_use]
    pub fn names(&self) -> &[Name] {
        &self.names
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|name| name.label.as_str())
    }

    #[must_use]
    pub const fn value(&self) -> &E {
        &self.value
    }
}

impl<E> fmt::Display for Declaration<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Declaration{{")?;
        for (i, label) in self.labels().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{label}")?;
        }
        write!(f, "}}")
    }
}

/// First name declared twice in `decls`, either within one declaration or
/// again in a later one.
#[must_use]
pub fn find_duplicate_name<E>(decls: &[Declaration<E>]) -> Option<&str> {
    for (i, decl) in decls.iter().enumerate() {
        for (j, name) in decl.names.iter().enumerate() {
            let label = name.label.as_str();
            let again_here = decl.names[j + 1..].iter().any(|n| n.label == label);
            let again_later = decls[i + 1..]
                .iter()
                .any(|later| later.labels().any(|l| l == label));
            if again_here || again_later {
                return Some(label);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(label: &str, col: usize) -> Name {
        Name::new(label, Span::point(1, col))
    }

    fn decl(labels: &[&str]) -> Declaration<Option<Span>> {
        let names = labels
            .iter()
            .enumerate()
            .map(|(i, l)| name(l, i + 1))
            .collect();
        Declaration::new(None, names, None, None).expect("valid declaration")
    }

    #[test]
    fn position_covers_disj_and_names() {
        let d = Declaration::new(
            None,
            vec![name("a", 6), name("b", 9)],
            Some(Span::new(1, 1, 1, 4)),
            Span::point(1, 12),
        )
        .expect("valid declaration");
        assert!(d.is_disjoint());
        assert_eq!(d.position(), Some(&Span::new(1, 1, 1, 9)));
        assert_eq!(d.span(), Some(&Span::new(1, 1, 1, 12)));
    }

    #[test]
    fn single_name_is_never_disjoint() {
        let d = Declaration::new(
            Some(Span::point(1, 1)),
            vec![name("a", 6)],
            Some(Span::new(1, 1, 1, 4)),
            Span::point(1, 9),
        )
        .expect("valid declaration");
        assert!(!d.is_disjoint());
        assert_eq!(d.disjoint_position(), None);
        assert_eq!(d.position(), Some(&Span::new(1, 1, 1, 6)));
    }

    #[test]
    fn reserved_characters_rejected() {
        let err = Declaration::new(None, vec![name("a", 1), name("x@y", 3)], None, None::<Span>)
            .unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::ReservedCharacter('@'));
        assert_eq!(err.span, Some(Span::point(1, 3)));
    }

    #[test]
    fn empty_name_rejected() {
        let err = Declaration::single(None, name("", 2), None::<Span>).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::EmptyName);
    }

    #[test]
    fn name_from_token() {
        let token = Token::ident("x", Span::point(2, 3));
        assert_eq!(Name::from_token(&token), Some(name_at("x", 2, 3)));
        assert_eq!(
            Name::from_token(&Token::new(TokenKind::Colon, Span::point(1, 1))),
            None
        );
    }

    fn name_at(label: &str, line: usize, col: usize) -> Name {
        Name::new(label, Span::point(line, col))
    }

    #[test]
    fn duplicates_within_one_declaration() {
        assert_eq!(find_duplicate_name(&[decl(&["a", "b", "a"])]), Some("a"));
    }

    #[test]
    fn duplicates_across_declarations() {
        let decls = [decl(&["a", "b"]), decl(&["c"]), decl(&["b", "a"])];
        assert_eq!(find_duplicate_name(&decls), Some("a"));
    }

    #[test]
    fn no_duplicates() {
        let decls = [decl(&["a", "b"]), decl(&["c"])];
        assert_eq!(find_duplicate_name(&decls), None);
        assert_eq!(find_duplicate_name::<Option<Span>>(&[]), None);
    }

    #[test]
    fn cached_span_shared_across_threads() {
        fn assert_sync<T: Send + Sync>(_: &T) {}

        let d = Declaration::new(None, vec![name("a", 1), name("b", 3)], None, Span::point(1, 6))
            .expect("valid declaration");
        assert_sync(&d);
        let spans: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4).map(|_| scope.spawn(|| d.span().cloned())).collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("thread panicked"))
                .collect()
        });
        assert!(spans.iter().all(|s| *s == Some(Span::new(1, 1, 1, 6))));
    }

    #[test]
    fn display_lists_names() {
        assert_eq!(decl(&["a", "b"]).to_string(), "Declaration{a,b}");
    }

    #[test]
    fn error_message_includes_file() {
        let err = SyntaxError {
            kind: SyntaxErrorKind::ReservedCharacter('/'),
            span: Some(Span::point(3, 7).with_file("m.als")),
        };
        assert_eq!(
            err.to_string(),
            "syntax error in m.als at line 3, column 7: variable name cannot contain '/'"
        );
    }
}
