use std::fmt::{Display, Formatter};

use super::Log;

impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Log::None => Ok(()),
            Log::Default(s) | Log::Success(s) | Log::Result(s) | Log::Verbose(s) => {
                write!(f, "{}", s)
            }
        }
    }
}

impl<T> Log<T> {
    /// Order of the log level; higher prints more.
    pub fn order(&self) -> u8 {
        match self {
            Log::None => 0,
            Log::Default(_) => 1,
            Log::Success(_) => 2,
            Log::Result(_) => 3,
            Log::Verbose(_) => 4,
        }
    }
}

impl<TL: Display> Log<TL> {
    /// Print `message()` when this label's level is at or above `at`.
    ///
    /// The message is built lazily so call sites pay no formatting cost when
    /// the label is `Log::None`, which is the default for release builds.
    pub fn emit<F: FnOnce() -> String>(&self, at: Log<()>, message: F) {
        #[cfg(debug_assertions)]
        if self.order() >= at.order() {
            println!("[{}] {}", self, message());
        }
        #[cfg(not(debug_assertions))]
        {
            let _ = at;
            let _ = message;
        }
    }
}
