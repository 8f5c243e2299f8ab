use crate::lexer::Reader;
use crate::util::Code;
use std::fs::read_to_string;
use std::io;
use std::path::Path;

/// The one configurable input to the whole pipeline: a source file path.
/// Reads the file fully up front, closing the handle before a single token
/// is produced rather than holding it open across the whole scan.
pub struct Source {
    text: String,
}

impl Source {
    pub fn from_path(path: &Path) -> io::Result<Self> {
        Ok(Self {
            text: read_to_string(path)?,
        })
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn code(&self) -> Code {
        Code::new(&self.text)
    }

    pub fn reader(&self) -> Reader {
        Reader::from_text(&self.text)
    }
}
