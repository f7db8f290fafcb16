use tracing::debug;

use crate::Error;
use crate::classifier::Classifier;
use crate::commands::NamedCommands;
use crate::lexer::Lexer;
use crate::negative::NegativeLiterals;
use crate::operators::OperatorMerge;
use crate::source::TokenSource;
use crate::token::Token;

/// Where the filtered text comes from.
///
/// None of these settings affect how tokens are classified; they only end
/// up in token positions or are handed back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// Identity of the module being parsed.
    ///
    /// Informational: it never reaches a [`Span`](crate::Span) and never
    /// changes classification. Grammar actions read it back through
    /// [`TokenFilter::config`].
    pub module: Option<String>,
    /// File name recorded in every span.
    pub filename: Option<String>,
    /// Number of lines preceding the parsed fragment in its file.
    pub line_offset: usize,
}

impl FilterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    #[must_use]
    pub fn with_line_offset(mut self, line_offset: usize) -> Self {
        self.line_offset = line_offset;
        self
    }
}

type Pipeline<S> = NegativeLiterals<OperatorMerge<NamedCommands<Classifier<S>>>>;

/// The full disambiguation pipeline, itself a [`TokenSource`] for the
/// grammar.
///
/// Layers from the source up: declaration classifier, named commands,
/// operator merging, negative literals.
#[derive(Debug)]
pub struct TokenFilter<S> {
    inner: Pipeline<S>,
    config: FilterConfig,
}

impl<'a> TokenFilter<Lexer<'a>> {
    /// Filter the tokens of `input`, scanned with the built-in lexer.
    #[must_use]
    pub fn new(input: &'a str, config: FilterConfig) -> Self {
        let lexer = Lexer::new(input)
            .with_file(config.filename.clone())
            .with_line_offset(config.line_offset);
        Self::with_config(lexer, config)
    }
}

impl<S: TokenSource> TokenFilter<S> {
    /// Stack the pipeline over an arbitrary primitive token source.
    #[must_use]
    pub fn from_source(source: S) -> Self {
        Self::with_config(source, FilterConfig::default())
    }

    #[must_use]
    pub fn with_config(source: S, config: FilterConfig) -> Self {
        debug!(
            module = config.module.as_deref().unwrap_or("<none>"),
            file = config.filename.as_deref().unwrap_or("<none>"),
            line_offset = config.line_offset,
            "token filter created"
        );
        let inner = NegativeLiterals::new(OperatorMerge::new(NamedCommands::new(
            Classifier::new(source),
        )));
        Self { inner, config }
    }

    #[must_use]
    pub const fn config(&self) -> &FilterConfig {
        &self.config
    }
}

impl<S: TokenSource> TokenSource for TokenFilter<S> {
    fn next_token(&mut self) -> Result<Token, Error> {
        self.inner.next_token()
    }
}
