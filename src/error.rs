use crate::token::TokenKind;
use std::fmt::{Display, Formatter};
use std::io;

/// The specific shape of lexical failure.
#[derive(Debug)]
pub enum LexErrorKind {
    IllegalCharacter(char),
    MalformedDateLiteral(String),
    MalformedNumberLiteral(String),
    IntegerOverflow(String),
}

impl Display for LexErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErrorKind::IllegalCharacter(c) => write!(f, "illegal character '{}'", c),
            LexErrorKind::MalformedDateLiteral(s) => write!(f, "malformed date literal '{}'", s),
            LexErrorKind::MalformedNumberLiteral(s) => {
                write!(f, "malformed number literal '{}'", s)
            }
            LexErrorKind::IntegerOverflow(s) => write!(f, "integer literal '{}' out of range", s),
        }
    }
}

/// A fatal lexical error: the offending token's text, its line, its column
/// span, and the source line it occurred on.
#[derive(Debug)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub left_column: usize,
    pub right_column: usize,
    pub source_line: String,
}

impl LexError {
    pub fn new(
        kind: LexErrorKind,
        line: usize,
        left_column: usize,
        right_column: usize,
        source_line: String,
    ) -> Self {
        Self {
            kind,
            line,
            left_column,
            right_column,
            source_line,
        }
    }
}

impl Display for LexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "LexError: {} at {}:{}-{}",
            self.kind, self.line, self.left_column, self.right_column
        )?;
        write!(f, "  {}", self.source_line)
    }
}

/// A fatal parse error: the token found and the kind that was required. The
/// parser does not backtrack or recover, so the first mismatch aborts the
/// parse.
#[derive(Debug)]
pub struct SyntaxError {
    pub found_lexeme: String,
    pub found_kind: TokenKind,
    pub line: usize,
    pub left_column: usize,
    pub expected: TokenKind,
}

impl SyntaxError {
    pub fn new(
        found_lexeme: String,
        found_kind: TokenKind,
        line: usize,
        left_column: usize,
        expected: TokenKind,
    ) -> Self {
        Self {
            found_lexeme,
            found_kind,
            line,
            left_column,
            expected,
        }
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "SyntaxError: unexpected {:?} '{}' at {}:{}",
            self.found_kind, self.found_lexeme, self.line, self.left_column
        )?;
        write!(f, "Expected: {}", self.expected)
    }
}

/// The top-level union of everything that can end a pipeline run. Every
/// variant is fatal; there is no partial result and no recovery.
#[derive(Debug)]
pub enum XError {
    Io(io::Error),
    Lex(LexError),
    Syntax(SyntaxError),
}

impl Display for XError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            XError::Io(err) => write!(f, "IoError: {}", err),
            XError::Lex(err) => write!(f, "{}", err),
            XError::Syntax(err) => write!(f, "{}", err),
        }
    }
}

impl From<io::Error> for XError {
    fn from(err: io::Error) -> Self {
        XError::Io(err)
    }
}
impl From<LexError> for XError {
    fn from(err: LexError) -> Self {
        XError::Lex(err)
    }
}
impl From<SyntaxError> for XError {
    fn from(err: SyntaxError) -> Self {
        XError::Syntax(err)
    }
}
