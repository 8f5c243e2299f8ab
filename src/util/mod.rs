mod code;
mod logger;
mod position;
use once_cell::unsync::OnceCell;

/// A line/column location within the source text, 1-based in both fields.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// The full source text, held once so diagnostics can recover the offending
/// source line without the lexer having to carry it around.
pub struct Code<'c> {
    pub value: &'c str,
    line_starts: OnceCell<Vec<usize>>,
}

/// Debug-level logger shared by the lexer, parser, and layout passes.
///
/// Each level is a strict superset of the one below it, so `order()` can be
/// compared directly to decide whether a message should print.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}
