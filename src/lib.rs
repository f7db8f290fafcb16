//! Token disambiguation between an Alloy scanner and its LALR grammar.
//!
//! Several Alloy constructs cannot be told apart by a context-free grammar
//! over the scanner's primitive tokens: `all x: A | ...` versus `all x`,
//! `name: run` versus a field, `one -> lone` versus three separate tokens.
//! The [`TokenFilter`] pipeline rewrites the primitive stream into the
//! stream the grammar expects, and [`Declaration`] captures the invariants
//! the grammar's quantifier productions rely on afterwards.
//!
//! # Quick start
//!
//! ```
//! use alloy_token_filter::{filter_str, TokenKind};
//!
//! let tokens = filter_str("all x: A | x !in B").unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::AllDecl);
//! assert_eq!(tokens[6].kind, TokenKind::NotIn);
//! ```
//!
//! ## Declarations
//!
//! ```
//! use alloy_token_filter::{find_duplicate_name, Declaration, Name, Span};
//!
//! let a = Name::new("a", Span::point(1, 5));
//! let b = Name::new("b", Span::point(1, 8));
//! let decl = Declaration::new(None, vec![a, b], Some(Span::new(1, 1, 1, 4)), Span::point(1, 11))
//!     .unwrap();
//! assert!(decl.is_disjoint());
//! assert_eq!(find_duplicate_name(&[decl]), None);
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod classifier;
pub mod commands;
pub mod decl;
pub mod filter;
pub mod lexer;
pub mod negative;
pub mod operators;
pub mod source;
pub mod token;

pub use classifier::Classifier;
pub use commands::NamedCommands;
pub use decl::{Declaration, Name, Spanned, SyntaxError, SyntaxErrorKind, find_duplicate_name};
pub use filter::{FilterConfig, TokenFilter};
pub use lexer::{LexError, LexErrorKind, Lexer, tokenize};
pub use negative::NegativeLiterals;
pub use operators::{OperatorMerge, multiplicity_arrow};
pub use source::{FatalError, TokenSource, TokenStream, collect_tokens};
pub use token::{Span, Token, TokenKind, Value};

/// Unified error type for scanning, filtering, and declaration building.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A scanner error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// The token source failed; the stream cannot continue.
    #[error("{0}")]
    Fatal(#[from] FatalError),
    /// An invalid declaration.
    #[error("{0}")]
    Syntax(#[from] SyntaxError),
}

/// Scan and filter a source string in one step.
///
/// The trailing `Eof` token is not included.
pub fn filter_str(input: &str) -> Result<Vec<Token>, Error> {
    collect_tokens(TokenFilter::new(input, FilterConfig::default()))
}

/// Filter an already scanned token sequence.
pub fn filter_tokens(tokens: Vec<Token>) -> Result<Vec<Token>, Error> {
    collect_tokens(TokenFilter::from_source(TokenStream::new(tokens)))
}
