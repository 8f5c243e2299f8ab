mod reader;

pub use reader::Reader;

use crate::error::{LexError, LexErrorKind};
use crate::source::Source;
use crate::symbol::SymbolTable;
use crate::token::{Token, TokenKind};
use crate::util::{Code, Log, Position};
use once_cell::unsync::OnceCell;

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Scans source text into a stream of [`Token`]s: a loop that recognizes
/// one token at a time and advances past it until the input is exhausted.
pub struct Lexer<'a> {
    reader: Reader,
    code: Code<'a>,
    symbols: &'a mut SymbolTable,
    debug: OnceCell<Log<&'static str>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a Source, symbols: &'a mut SymbolTable) -> Self {
        Self {
            reader: source.reader(),
            code: source.code(),
            symbols,
            debug: OnceCell::new(),
        }
    }

    /// Enable debug-level logging of each token as it is produced.
    pub fn set_debug(&mut self, level: Log<&'static str>) {
        let _ = self.debug.set(level);
    }

    fn log(&self) -> Log<&'static str> {
        *self.debug.get().unwrap_or(&Log::None)
    }

    /// Scan and return the next token, or `Ok(None)` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_trivia();
        let start = self.reader.position();
        let Some(c) = self.reader.peek() else {
            return Ok(None);
        };

        let token = if is_identifier_start(c) {
            Ok(self.scan_identifier(start))
        } else if c.is_ascii_digit() {
            self.scan_number_or_date(start)
        } else {
            self.scan_operator(start)
        }?;

        self.log()
            .emit(Log::Default(""), || format!("token {}", token));
        Ok(Some(token))
    }

    /// Scan every remaining token, stopping at the first error.
    pub fn tokenize_all(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Skip whitespace (including the reader's normalized end-of-line
    /// space) and `//` line comments, in any interleaving.
    fn skip_trivia(&mut self) {
        loop {
            match self.reader.peek() {
                Some(c) if c.is_whitespace() => {
                    self.reader.advance();
                }
                Some('/') if self.reader.peek_second() == Some('/') => {
                    self.skip_to_end_of_line();
                }
                _ => break,
            }
        }
    }

    /// Consume characters up to, but not including, the first character of
    /// the next physical line (or end of input).
    fn skip_to_end_of_line(&mut self) {
        let line = self.reader.position().line;
        while self.reader.peek().is_some() && self.reader.position().line == line {
            self.reader.advance();
        }
    }

    fn scan_identifier(&mut self, start: Position) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.reader.peek() {
            if !is_identifier_part(c) {
                break;
            }
            lexeme.push(c);
            self.reader.advance();
        }
        self.finish_literal(lexeme, TokenKind::Identifier, start)
    }

    /// Consume a run of ASCII digits; may be empty.
    fn scan_digit_run(&mut self) -> String {
        let mut run = String::new();
        while let Some(c) = self.reader.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            run.push(c);
            self.reader.advance();
        }
        run
    }

    /// Scan an `INTeger`, `NumberLit`, or `DateLit`.
    ///
    /// All three begin with a digit run; the character following it decides
    /// which literal it is. A trailing `.` followed by digits is a
    /// `NumberLit`; a trailing `~` begins the `month~day~year` shape of a
    /// `DateLit`; anything else closes out a plain `INTeger`.
    fn scan_number_or_date(&mut self, start: Position) -> Result<Token, LexError> {
        let first_run = self.scan_digit_run();

        match self.reader.peek() {
            Some('.') => {
                self.reader.advance();
                let fraction = self.scan_digit_run();
                if fraction.is_empty() {
                    let lexeme = format!("{}.", first_run);
                    return Err(self.error(
                        LexErrorKind::MalformedNumberLiteral(lexeme),
                        start,
                        self.reader.position(),
                    ));
                }
                let lexeme = format!("{}.{}", first_run, fraction);
                Ok(self.finish_literal(lexeme, TokenKind::NumberLit, start))
            }
            Some('~') => self.scan_date(first_run, start),
            _ => {
                if first_run.parse::<i64>().is_err() {
                    return Err(self.error(
                        LexErrorKind::IntegerOverflow(first_run.clone()),
                        start,
                        self.reader.position(),
                    ));
                }
                Ok(self.finish_literal(first_run, TokenKind::INTeger, start))
            }
        }
    }

    /// Continue scanning a `DateLit` after its month digits have already
    /// been read. The month must be at most 12; the day run must be
    /// non-empty and at most two digits; the year run must be exactly two
    /// or exactly four digits.
    fn scan_date(&mut self, month: String, start: Position) -> Result<Token, LexError> {
        if month.parse::<u32>().unwrap_or(u32::MAX) > 12 {
            return Err(self.error(
                LexErrorKind::MalformedDateLiteral(month),
                start,
                self.reader.position(),
            ));
        }
        self.reader.advance(); // the '~' after the month

        let day = self.scan_digit_run();
        if day.is_empty() || day.len() > 2 {
            let lexeme = format!("{}~{}", month, day);
            return Err(self.error(
                LexErrorKind::MalformedDateLiteral(lexeme),
                start,
                self.reader.position(),
            ));
        }

        if self.reader.peek() != Some('~') {
            let lexeme = format!("{}~{}", month, day);
            return Err(self.error(
                LexErrorKind::MalformedDateLiteral(lexeme),
                start,
                self.reader.position(),
            ));
        }
        self.reader.advance();

        let year = self.scan_digit_run();
        if year.len() != 2 && year.len() != 4 {
            let lexeme = format!("{}~{}~{}", month, day, year);
            return Err(self.error(
                LexErrorKind::MalformedDateLiteral(lexeme),
                start,
                self.reader.position(),
            ));
        }

        let lexeme = format!("{}~{}~{}", month, day, year);
        Ok(self.finish_literal(lexeme, TokenKind::DateLit, start))
    }

    fn finish_literal(&mut self, lexeme: String, kind: TokenKind, start: Position) -> Token {
        let end_column = start.column + lexeme.chars().count();
        let symbol = self.symbols.intern(&lexeme, kind);
        Token::new(start.column, end_column, start.line, symbol)
    }

    /// Scan a one- or two-character operator or punctuation mark, greedily
    /// preferring the two-character form (e.g. `<=` over `<` then `=`).
    fn scan_operator(&mut self, start: Position) -> Result<Token, LexError> {
        let c1 = self.reader.advance().expect("checked by caller");
        if let Some(c2) = self.reader.peek() {
            let pair: String = [c1, c2].iter().collect();
            if let Some(symbol) = self.symbols.lookup_reserved(&pair) {
                self.reader.advance();
                let end_column = start.column + 2;
                return Ok(Token::new(start.column, end_column, start.line, symbol));
            }
        }

        let single = c1.to_string();
        match self.symbols.lookup_reserved(&single) {
            Some(symbol) => Ok(Token::new(
                start.column,
                start.column + 1,
                start.line,
                symbol,
            )),
            None => Err(self.error(
                LexErrorKind::IllegalCharacter(c1),
                start,
                self.reader.position(),
            )),
        }
    }

    fn error(&self, kind: LexErrorKind, start: Position, end: Position) -> LexError {
        let source_line = self.code.line_text(start.line).unwrap_or("").to_string();
        LexError::new(kind, start.line, start.column, end.column, source_line)
    }
}
