use super::Code;
use once_cell::unsync::OnceCell;

impl<'c> From<&'c str> for Code<'c> {
    fn from(value: &'c str) -> Self {
        Code::new(value)
    }
}

impl<'c> Code<'c> {
    pub fn new(value: &'c str) -> Self {
        Self {
            value,
            line_starts: OnceCell::new(),
        }
    }

    fn obtain_line_starts(&self) -> &Vec<usize> {
        self.line_starts.get_or_init(|| {
            let mut starts = vec![0];
            starts.extend(
                self.value
                    .match_indices('\n')
                    .map(|(index, _)| index + 1),
            );
            starts
        })
    }

    /// Return the 1-based source line's text, without its trailing newline.
    ///
    /// Used only for error reporting: the lexer and parser track their own
    /// line/column as they scan, so this is a diagnostic-time lookup, not a
    /// hot path.
    pub fn line_text(&self, line: usize) -> Option<&'c str> {
        let starts = self.obtain_line_starts();
        let start = *starts.get(line.checked_sub(1)?)?;
        let end = starts
            .get(line)
            .map(|&next| next.saturating_sub(1))
            .unwrap_or(self.value.len());
        self.value.get(start..end)
    }
}
