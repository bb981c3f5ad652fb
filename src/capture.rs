//! Utterance capture.
//!
//! The session driver pulls user utterances through the
//! [`UtteranceSource`] trait so the console front end and test doubles
//! plug in interchangeably. [`ConsoleCapture`] is the line-oriented
//! implementation over standard input.

use std::io::{self, BufRead, Write};

use crate::error::ErrandError;

/// A source of user utterances.
///
/// `Ok(None)` means the source is exhausted (e.g. stdin reached EOF) and
/// the session should end. An empty or whitespace-only capture comes back
/// as `Ok(Some(""))` after trimming; the session driver decides how to
/// prompt again.
pub trait UtteranceSource: Send {
    /// Block until the next utterance is available.
    fn capture(&mut self) -> Result<Option<String>, ErrandError>;
}

/// Reads utterances line by line from standard input.
pub struct ConsoleCapture {
    prompt: String,
}

impl ConsoleCapture {
    /// Create a console capture with the given prompt string.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Default for ConsoleCapture {
    fn default() -> Self {
        Self::new("> ")
    }
}

impl UtteranceSource for ConsoleCapture {
    fn capture(&mut self) -> Result<Option<String>, ErrandError> {
        let mut stdout = io::stdout();
        stdout
            .write_all(self.prompt.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|e| ErrandError::CaptureError(format!("failed to write prompt: {e}")))?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| ErrandError::CaptureError(format!("failed to read input: {e}")))?;

        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
