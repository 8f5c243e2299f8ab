use crate::util::Position;
use std::io::{BufRead, Cursor};

/// Yields characters of the source one at a time, tracking `(line, column)`.
///
/// The source text is already fully in memory (`Source` reads the whole
/// file up front so diagnostics can quote any line), but lines are still
/// split out lazily, one at a time, as the scanner consumes them. The
/// newline at the end of each physical line is not handed to the scanner
/// as-is; instead a single normalized space character is yielded in its
/// place, while `line` is incremented internally. This lets the lexer's
/// whitespace-skipping logic treat line breaks like any other blank without
/// special-casing `\n`.
pub struct Reader {
    source: Option<Box<dyn BufRead>>,
    current: Vec<char>,
    cursor: usize,
    eol_emitted: bool,
    line: usize,
}

impl Reader {
    pub fn from_text(text: &str) -> Self {
        let mut reader = Self {
            source: Some(Box::new(Cursor::new(text.as_bytes().to_vec()))),
            current: Vec::new(),
            cursor: 0,
            eol_emitted: true,
            line: 0,
        };
        reader.ensure_available();
        reader
    }

    /// Next character without consuming it, or `None` at end of input.
    pub fn peek(&mut self) -> Option<char> {
        if !self.ensure_available() {
            return None;
        }
        if self.cursor < self.current.len() {
            Some(self.current[self.cursor])
        } else {
            Some(' ')
        }
    }

    /// The character one past `peek`, without consuming either. Used only to
    /// recognize the two-character `//` comment marker; cannot see across a
    /// line break, which is fine since a comment marker never needs to.
    pub fn peek_second(&mut self) -> Option<char> {
        if !self.ensure_available() {
            return None;
        }
        if self.cursor + 1 < self.current.len() {
            Some(self.current[self.cursor + 1])
        } else if self.cursor + 1 == self.current.len() {
            Some(' ')
        } else {
            None
        }
    }

    /// Consume and return the next character.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        if self.cursor < self.current.len() {
            self.cursor += 1;
        } else {
            self.eol_emitted = true;
        }
        Some(c)
    }

    /// Position of the next character `peek`/`advance` would return.
    pub fn position(&self) -> Position {
        Position::new(self.line.max(1), self.cursor + 1)
    }

    /// Ensure a character (real or the synthetic end-of-line space) is ready
    /// to be returned, reading further lines as needed. Drops the source
    /// once it is exhausted.
    fn ensure_available(&mut self) -> bool {
        loop {
            if self.cursor < self.current.len() {
                return true;
            }
            if !self.eol_emitted {
                return true;
            }
            if !self.load_next_line() {
                return false;
            }
        }
    }

    fn load_next_line(&mut self) -> bool {
        let Some(source) = self.source.as_mut() else {
            return false;
        };
        let mut buf = String::new();
        match source.read_line(&mut buf) {
            Ok(0) => {
                self.source = None;
                false
            }
            Ok(_) => {
                let had_newline = buf.ends_with('\n');
                if had_newline {
                    buf.pop();
                    if buf.ends_with('\r') {
                        buf.pop();
                    }
                }
                self.current = buf.chars().collect();
                self.cursor = 0;
                // A line with no trailing newline is the last line of a file
                // that doesn't end in one; there is no line break to
                // normalize into a space, so skip straight to "already
                // emitted" rather than synthesizing one at true EOF.
                self.eol_emitted = !had_newline;
                self.line += 1;
                true
            }
            Err(_) => {
                self.source = None;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_normalizes_trailing_newline_to_space() {
        let mut r = Reader::from_text("ab\n");
        assert_eq!(r.advance(), Some('a'));
        assert_eq!(r.advance(), Some('b'));
        assert_eq!(r.advance(), Some(' '));
        assert_eq!(r.advance(), None);
    }

    #[test]
    fn tracks_line_and_column_across_break() {
        let mut r = Reader::from_text("ab\ncd");
        assert_eq!(r.position(), Position::new(1, 1));
        r.advance();
        assert_eq!(r.position(), Position::new(1, 2));
        r.advance();
        assert_eq!(r.position(), Position::new(1, 3));
        r.advance(); // the normalized space
        assert_eq!(r.position(), Position::new(2, 1));
        assert_eq!(r.advance(), Some('c'));
    }

    #[test]
    fn blank_line_yields_one_space() {
        let mut r = Reader::from_text("a\n\nb");
        assert_eq!(r.advance(), Some('a'));
        assert_eq!(r.advance(), Some(' ')); // end of line 1
        assert_eq!(r.advance(), Some(' ')); // the empty line 2
        assert_eq!(r.advance(), Some('b'));
    }

    #[test]
    fn no_trailing_newline_still_terminates() {
        let mut r = Reader::from_text("xy");
        assert_eq!(r.advance(), Some('x'));
        assert_eq!(r.advance(), Some('y'));
        assert_eq!(r.advance(), None);
    }

    #[test]
    fn peek_second_sees_the_char_after_peek() {
        let mut r = Reader::from_text("//c");
        assert_eq!(r.peek(), Some('/'));
        assert_eq!(r.peek_second(), Some('/'));
        r.advance();
        assert_eq!(r.peek(), Some('/'));
        assert_eq!(r.peek_second(), Some('c'));
    }
}
