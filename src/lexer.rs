use std::fmt;

use crate::Error;
use crate::source::TokenSource;
use crate::token::{Span, Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Unterminated double-quoted string.
    UnterminatedString,
    /// `/*` without a matching `*/`.
    UnterminatedComment,
    /// Integer literal that does not fit in 64 bits.
    NumberOutOfRange(String),
    /// Character that cannot start any token.
    UnexpectedCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => {
                write!(f, "unterminated string literal")
            }
            Self::UnterminatedComment => {
                write!(f, "unterminated block comment")
            }
            Self::NumberOutOfRange(digits) => {
                write!(f, "number out of range: {digits}")
            }
            Self::UnexpectedCharacter(ch) => {
                write!(f, "unexpected character: {ch}")
            }
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.line, span.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// Tokenize a model source string into primitive tokens.
///
/// The trailing `Eof` token is not included.
///
/// # Errors
///
/// Returns `LexError` on unterminated strings or comments, oversized
/// numbers, or characters that cannot start a token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.scan()?;
        if token.is_eof() {
            return Ok(tokens);
        }
        tokens.push(token);
    }
}

fn keyword(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "abstract" => TokenKind::Abstract,
        "all" => TokenKind::All,
        "and" => TokenKind::And,
        "as" => TokenKind::As,
        "assert" => TokenKind::Assert,
        "but" => TokenKind::But,
        "check" => TokenKind::Check,
        "disj" => TokenKind::Disj,
        "else" => TokenKind::Else,
        "exactly" => TokenKind::Exactly,
        "exh" => TokenKind::Exh,
        "expect" => TokenKind::Expect,
        "extends" => TokenKind::Extends,
        "fact" => TokenKind::Fact,
        "for" => TokenKind::For,
        "fun" => TokenKind::Fun,
        "iden" => TokenKind::Iden,
        "iff" => TokenKind::Iff,
        "implies" => TokenKind::Implies,
        "in" => TokenKind::In,
        "int" => TokenKind::Int,
        "Int" => TokenKind::SigInt,
        "let" => TokenKind::Let,
        "lone" => TokenKind::Lone,
        "module" => TokenKind::Module,
        "no" => TokenKind::No,
        "none" => TokenKind::None,
        "not" => TokenKind::Not,
        "one" => TokenKind::One,
        "open" => TokenKind::Open,
        "or" => TokenKind::Or,
        "part" => TokenKind::Part,
        "pred" => TokenKind::Pred,
        "private" => TokenKind::Private,
        "run" => TokenKind::Run,
        "seq" => TokenKind::Seq,
        "set" => TokenKind::Set,
        "sig" => TokenKind::Sig,
        "some" => TokenKind::Some,
        "sum" => TokenKind::Sum,
        "this" => TokenKind::This,
        "univ" => TokenKind::Univ,
        _ => return None,
    };
    Some(kind)
}

/// Operators, longest spelling first.
const SYMBOLS: &[(&str, TokenKind)] = &[
    (">>>", TokenKind::Shr),
    ("<=>", TokenKind::Iff),
    ("->", TokenKind::Arrow),
    ("=>", TokenKind::Implies),
    ("=<", TokenKind::Lte),
    ("<=", TokenKind::Lte),
    (">=", TokenKind::Gte),
    ("<:", TokenKind::Domain),
    (":>", TokenKind::Range),
    ("++", TokenKind::Override),
    ("<<", TokenKind::Shl),
    (">>", TokenKind::Sha),
    ("&&", TokenKind::And),
    ("||", TokenKind::Or),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    (",", TokenKind::Comma),
    (":", TokenKind::Colon),
    (".", TokenKind::Dot),
    ("/", TokenKind::Slash),
    ("|", TokenKind::Bar),
    ("@", TokenKind::At),
    ("#", TokenKind::Hash),
    ("~", TokenKind::Tilde),
    ("^", TokenKind::Caret),
    ("*", TokenKind::Star),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("&", TokenKind::Amp),
    ("=", TokenKind::Equals),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("!", TokenKind::Not),
];

/// Primitive scanner over a model source string.
///
/// Produces tokens lazily; never emits any of the compound kinds the
/// filter introduces.
#[derive(Debug)]
pub struct Lexer<'a> {
    src: &'a str,
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
    file: Option<String>,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let bytes = input.as_bytes();
        let start = if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            3
        } else {
            0
        };
        Self {
            src: input,
            input: bytes,
            pos: start,
            line: 1,
            col: 1,
            file: None,
        }
    }

    /// Tag every span with `file`.
    #[must_use]
    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    /// Report lines as if the input started `offset` lines into a file.
    #[must_use]
    pub fn with_line_offset(mut self, offset: usize) -> Self {
        self.line = 1 + offset;
        self
    }

    /// Scan the next primitive token.
    ///
    /// # Errors
    ///
    /// See [`tokenize`].
    pub fn scan(&mut self) -> Result<Token, LexError> {
        self.skip_trivia()?;

        let (line, col) = (self.line, self.col);
        let Some(ch) = self.peek() else {
            return Ok(Token::eof(self.span(line, col, line, col)));
        };

        match ch {
            b'"' => self.read_string(line, col),
            b'0'..=b'9' => self.read_number(line, col),
            c if c.is_ascii_alphabetic() => Ok(self.read_word(line, col)),
            _ => self.read_symbol(line, col),
        }
    }

    fn span(&self, line: usize, col: usize, end_line: usize, end_col: usize) -> Span {
        let span = Span::new(line, col, end_line, end_col);
        match &self.file {
            Some(file) => span.with_file(file.clone()),
            None => span,
        }
    }

    /// Span from `(line, col)` to the character just consumed.
    fn span_to_here(&self, line: usize, col: usize) -> Span {
        self.span(line, col, self.line, self.col.saturating_sub(1).max(1))
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            if self.input[self.pos] == b'\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
            self.pos += 1;
        }
    }

    /// Consume one whole character, which may span several bytes.
    fn advance_char(&mut self) -> Option<char> {
        let ch = self.src.get(self.pos..)?.chars().next()?;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        while let Some(ch) = self.peek() {
            match ch {
                b' ' | b'\t' | b'\r' | b'\n' | b'\x0C' => self.advance(),
                b'/' | b'-' if self.peek_at(1) == Some(ch) => self.skip_line(),
                b'/' if self.peek_at(1) == Some(b'*') => self.skip_block_comment()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_line(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos] != b'\n' {
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let (line, col) = (self.line, self.col);
        self.advance(); // skip /
        self.advance(); // skip *
        loop {
            match self.peek() {
                None => {
                    return Err(LexError {
                        kind: LexErrorKind::UnterminatedComment,
                        span: self.span(line, col, line, col),
                    });
                }
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.advance();
                    self.advance();
                    return Ok(());
                }
                Some(_) => self.advance(),
            }
        }
    }

    fn read_string(&mut self, line: usize, col: usize) -> Result<Token, LexError> {
        self.advance(); // skip opening quote

        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    return Err(LexError {
                        kind: LexErrorKind::UnterminatedString,
                        span: self.span(line, col, line, col),
                    });
                }
                Some(b'\\') => {
                    self.advance();
                    match self.peek() {
                        Some(b'n') => value.push('\n'),
                        Some(b'"') => value.push('"'),
                        Some(b'\\') => value.push('\\'),
                        Some(_) => {
                            value.push('\\');
                            if let Some(ch) = self.advance_char() {
                                value.push(ch);
                            }
                            continue;
                        }
                        None => continue,
                    }
                    self.advance();
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    if let Some(ch) = self.advance_char() {
                        value.push(ch);
                    }
                }
            }
        }

        Ok(Token::string(value, self.span_to_here(line, col)))
    }

    fn read_number(&mut self, line: usize, col: usize) -> Result<Token, LexError> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.advance();
        }
        let digits = &self.src[start..self.pos];
        let span = self.span_to_here(line, col);
        match digits.parse::<i64>() {
            Ok(value) => Ok(Token::number(value, span)),
            Err(_) => Err(LexError {
                kind: LexErrorKind::NumberOutOfRange(digits.to_string()),
                span,
            }),
        }
    }

    fn read_segment(&mut self) {
        while matches!(
            self.peek(),
            Some(c) if c.is_ascii_alphanumeric() || c == b'_' || c == b'\'' || c == b'"'
        ) {
            self.advance();
        }
    }

    fn read_word(&mut self, line: usize, col: usize) -> Token {
        let start = self.pos;
        self.read_segment();

        if let Some(kind) = keyword(&self.src[start..self.pos]) {
            return Token::new(kind, self.span_to_here(line, col));
        }

        // qualified name such as util/ordering
        while self.peek() == Some(b'/') && matches!(self.peek_at(1), Some(c) if c.is_ascii_alphabetic())
        {
            self.advance();
            self.read_segment();
        }

        Token::ident(&self.src[start..self.pos], self.span_to_here(line, col))
    }

    fn read_symbol(&mut self, line: usize, col: usize) -> Result<Token, LexError> {
        let rest = &self.input[self.pos..];
        for (text, kind) in SYMBOLS {
            if rest.starts_with(text.as_bytes()) {
                for _ in 0..text.len() {
                    self.advance();
                }
                return Ok(Token::new(*kind, self.span_to_here(line, col)));
            }
        }

        let ch = self.src[self.pos..].chars().next().unwrap_or('\u{FFFD}');
        Err(LexError {
            kind: LexErrorKind::UnexpectedCharacter(ch),
            span: self.span(line, col, line, col),
        })
    }
}

impl TokenSource for Lexer<'_> {
    fn next_token(&mut self) -> Result<Token, Error> {
        Ok(self.scan()?)
    }
}
