use std::cmp::{max, min};
use std::fmt;

/// Source range for error reporting (1-based, inclusive end).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub file: Option<String>,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Span {
    #[must_use]
    pub const fn new(line: usize, column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
            end_line,
            end_column,
        }
    }

    /// A span covering a single character.
    #[must_use]
    pub const fn point(line: usize, column: usize) -> Self {
        Self::new(line, column, line, column)
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Smallest span covering both `self` and `other`.
    ///
    /// When the spans name different files the smaller file name is kept,
    /// so the result does not depend on argument order.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let (line, column) = min((self.line, self.column), (other.line, other.column));
        let (end_line, end_column) = max(
            (self.end_line, self.end_column),
            (other.end_line, other.end_column),
        );
        let file = match (&self.file, &other.file) {
            (Some(a), Some(b)) => Some(min(a, b).clone()),
            (a, b) => a.clone().or_else(|| b.clone()),
        };
        Self {
            file,
            line,
            column,
            end_line,
            end_column,
        }
    }

    /// Merge two optional spans; an absent span is the identity.
    #[must_use]
    pub fn cover(a: Option<&Self>, b: Option<&Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.merge(b)),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Token kinds seen by the grammar.
///
/// The scanner only ever produces the primitive kinds; the declaration
/// variants and every compound operator are introduced by the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Id,
    Number,
    Str,

    // Punctuation and operators.
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Slash,
    Bar,
    At,
    Hash,
    Tilde,
    Caret,
    Star,
    Plus,
    Minus,
    Amp,
    Arrow,
    Equals,
    Lt,
    Lte,
    Gt,
    Gte,
    /// `<:`
    Domain,
    /// `:>`
    Range,
    /// `++`
    Override,
    /// `<<`
    Shl,
    /// `>>`
    Sha,
    /// `>>>`
    Shr,
    And,
    Or,
    Not,
    Implies,
    Iff,

    // Keywords.
    Abstract,
    All,
    As,
    Assert,
    But,
    Check,
    Disj,
    Else,
    Exactly,
    Exh,
    Expect,
    Extends,
    Fact,
    For,
    Fun,
    Iden,
    In,
    /// `int`
    Int,
    Let,
    Lone,
    Module,
    No,
    None,
    One,
    Open,
    Part,
    Pred,
    Private,
    Run,
    Seq,
    Set,
    Sig,
    /// `Int`
    SigInt,
    Some,
    Sum,
    This,
    Univ,

    // Quantifiers that introduce a declaration.
    AllDecl,
    NoDecl,
    SumDecl,
    OneDecl,
    LoneDecl,
    SomeDecl,

    // Negated relations.
    NotIn,
    NotEquals,
    NotLt,
    NotLte,
    NotGt,
    NotGte,

    // Qualified built-ins.
    TotalOrder,
    IntAdd,
    IntSub,
    IntMul,
    IntDiv,
    IntRem,
    IntMin,
    IntMax,
    IntNext,

    // Multiplicity arrows.
    OneArrowOne,
    OneArrowLone,
    OneArrowSome,
    OneArrowAny,
    LoneArrowOne,
    LoneArrowLone,
    LoneArrowSome,
    LoneArrowAny,
    SomeArrowOne,
    SomeArrowLone,
    SomeArrowSome,
    SomeArrowAny,
    AnyArrowOne,
    AnyArrowLone,
    AnyArrowSome,
}

impl TokenKind {
    /// The kind a quantifier keyword takes when it introduces a declaration.
    #[must_use]
    pub const fn declaration_variant(self) -> Option<Self> {
        match self {
            Self::All => Some(Self::AllDecl),
            Self::No => Some(Self::NoDecl),
            Self::Sum => Some(Self::SumDecl),
            Self::One => Some(Self::OneDecl),
            Self::Lone => Some(Self::LoneDecl),
            Self::Some => Some(Self::SomeDecl),
            _ => None,
        }
    }

    /// `one`, `lone`, `some` or `set`.
    #[must_use]
    pub const fn is_multiplicity(self) -> bool {
        matches!(self, Self::One | Self::Lone | Self::Some | Self::Set)
    }

    /// Kinds after which a `-` is always binary subtraction.
    #[must_use]
    pub const fn is_literal_or_closing(self) -> bool {
        matches!(
            self,
            Self::RParen
                | Self::RBracket
                | Self::RBrace
                | Self::Disj
                | Self::TotalOrder
                | Self::Int
                | Self::Sum
                | Self::Id
                | Self::Number
                | Self::Str
                | Self::Iden
                | Self::This
                | Self::IntMin
                | Self::IntMax
                | Self::IntNext
                | Self::Univ
                | Self::SigInt
                | Self::None
        )
    }

    /// The negated form of a relational operator following `!`.
    #[must_use]
    pub const fn negated(self) -> Option<Self> {
        match self {
            Self::In => Some(Self::NotIn),
            Self::Equals => Some(Self::NotEquals),
            Self::Lt => Some(Self::NotLt),
            Self::Lte => Some(Self::NotLte),
            Self::Gt => Some(Self::NotGt),
            Self::Gte => Some(Self::NotGte),
            _ => None,
        }
    }

    /// Surface spelling, or a placeholder for kinds without one.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eof => "<end of file>",
            Self::Id => "<identifier>",
            Self::Number => "<number>",
            Self::Str => "<string>",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Dot => ".",
            Self::Slash => "/",
            Self::Bar => "|",
            Self::At => "@",
            Self::Hash => "#",
            Self::Tilde => "~",
            Self::Caret => "^",
            Self::Star => "*",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Amp => "&",
            Self::Arrow => "->",
            Self::Equals => "=",
            Self::Lt => "<",
            Self::Lte => "=<",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Domain => "<:",
            Self::Range => ":>",
            Self::Override => "++",
            Self::Shl => "<<",
            Self::Sha => ">>",
            Self::Shr => ">>>",
            Self::And => "&&",
            Self::Or => "||",
            Self::Not => "!",
            Self::Implies => "=>",
            Self::Iff => "<=>",
            Self::Abstract => "abstract",
            Self::All | Self::AllDecl => "all",
            Self::As => "as",
            Self::Assert => "assert",
            Self::But => "but",
            Self::Check => "check",
            Self::Disj => "disj",
            Self::Else => "else",
            Self::Exactly => "exactly",
            Self::Exh => "exh",
            Self::Expect => "expect",
            Self::Extends => "extends",
            Self::Fact => "fact",
            Self::For => "for",
            Self::Fun => "fun",
            Self::Iden => "iden",
            Self::In => "in",
            Self::Int => "int",
            Self::Let => "let",
            Self::Lone | Self::LoneDecl => "lone",
            Self::Module => "module",
            Self::No | Self::NoDecl => "no",
            Self::None => "none",
            Self::One | Self::OneDecl => "one",
            Self::Open => "open",
            Self::Part => "part",
            Self::Pred => "pred",
            Self::Private => "private",
            Self::Run => "run",
            Self::Seq => "seq",
            Self::Set => "set",
            Self::Sig => "sig",
            Self::SigInt => "Int",
            Self::Some | Self::SomeDecl => "some",
            Self::Sum | Self::SumDecl => "sum",
            Self::This => "this",
            Self::Univ => "univ",
            Self::NotIn => "!in",
            Self::NotEquals => "!=",
            Self::NotLt => "!<",
            Self::NotLte => "!=<",
            Self::NotGt => "!>",
            Self::NotGte => "!>=",
            Self::TotalOrder => "pred/totalOrder",
            Self::IntAdd => "fun/add",
            Self::IntSub => "fun/sub",
            Self::IntMul => "fun/mul",
            Self::IntDiv => "fun/div",
            Self::IntRem => "fun/rem",
            Self::IntMin => "fun/min",
            Self::IntMax => "fun/max",
            Self::IntNext => "fun/next",
            Self::OneArrowOne => "one->one",
            Self::OneArrowLone => "one->lone",
            Self::OneArrowSome => "one->some",
            Self::OneArrowAny => "one->",
            Self::LoneArrowOne => "lone->one",
            Self::LoneArrowLone => "lone->lone",
            Self::LoneArrowSome => "lone->some",
            Self::LoneArrowAny => "lone->",
            Self::SomeArrowOne => "some->one",
            Self::SomeArrowLone => "some->lone",
            Self::SomeArrowSome => "some->some",
            Self::SomeArrowAny => "some->",
            Self::AnyArrowOne => "->one",
            Self::AnyArrowLone => "->lone",
            Self::AnyArrowSome => "->some",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    None,
    Ident(String),
    Number(i64),
    Str(String),
}

/// A single token with its kind, payload, and source location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Value,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            value: Value::None,
            span,
        }
    }

    #[must_use]
    pub fn ident(label: impl Into<String>, span: Span) -> Self {
        Self {
            kind: TokenKind::Id,
            value: Value::Ident(label.into()),
            span,
        }
    }

    #[must_use]
    pub const fn number(value: i64, span: Span) -> Self {
        Self {
            kind: TokenKind::Number,
            value: Value::Number(value),
            span,
        }
    }

    #[must_use]
    pub fn string(text: impl Into<String>, span: Span) -> Self {
        Self {
            kind: TokenKind::Str,
            value: Value::Str(text.into()),
            span,
        }
    }

    #[must_use]
    pub const fn eof(span: Span) -> Self {
        Self::new(TokenKind::Eof, span)
    }

    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Identifier text, if this token carries one.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match &self.value {
            Value::Ident(label) => Some(label),
            _ => None,
        }
    }

    /// Identifier token whose text is exactly `label`.
    #[must_use]
    pub fn is_ident(&self, label: &str) -> bool {
        self.kind == TokenKind::Id && self.label() == Some(label)
    }
}
