//! Interactive session driver.
//!
//! Runs the capture / process / respond cycle around the dialogue loop:
//! pull an utterance, short-circuit exit phrases, hand everything else to
//! [`DialogueLoop::process`], and print the reply. In persistent mode the
//! returned conversation is threaded into the next utterance; in stateless
//! mode it is discarded.

use std::io::Write;

use crate::capture::UtteranceSource;
use crate::conversation::Conversation;
use crate::dialogue::{DialogueLoop, HistoryMode};
use crate::error::ErrandError;

/// Phrases that end the session, matched case-insensitively after trimming.
pub const EXIT_PHRASES: &[&str] = &["exit", "quit", "stop"];

const GREETING: &str = "How can I help with your tasks?";
const FAREWELL: &str = "Goodbye!";
const EMPTY_INPUT_PROMPT: &str = "I didn't catch that. Please try again.";

/// Whether the utterance is a session-ending phrase.
pub fn is_exit_phrase(utterance: &str) -> bool {
    let normalized = utterance.trim().to_lowercase();
    EXIT_PHRASES.contains(&normalized.as_str())
}

/// Drives an interactive session over a dialogue loop.
pub struct SessionDriver {
    dialogue: DialogueLoop,
}

impl SessionDriver {
    /// Create a session driver over the given dialogue loop.
    pub fn new(dialogue: DialogueLoop) -> Self {
        Self { dialogue }
    }

    /// Run the session until an exit phrase or the source is exhausted.
    pub async fn run(
        &self,
        source: &mut dyn UtteranceSource,
        out: &mut dyn Write,
    ) -> Result<(), ErrandError> {
        writeln!(out, "{GREETING}")
            .map_err(|e| ErrandError::CaptureError(format!("failed to write output: {e}")))?;

        let mut conversation: Option<Conversation> = None;

        loop {
            let utterance = match source.capture()? {
                Some(text) => text,
                None => {
                    tracing::info!("input exhausted, ending session");
                    break;
                }
            };

            if utterance.is_empty() {
                writeln!(out, "{EMPTY_INPUT_PROMPT}").map_err(|e| {
                    ErrandError::CaptureError(format!("failed to write output: {e}"))
                })?;
                continue;
            }

            if is_exit_phrase(&utterance) {
                writeln!(out, "{FAREWELL}").map_err(|e| {
                    ErrandError::CaptureError(format!("failed to write output: {e}"))
                })?;
                break;
            }

            let (reply, updated) = self.dialogue.process(&utterance, conversation.take()).await;
            if self.dialogue.mode() == HistoryMode::Persistent {
                conversation = Some(updated);
            }

            writeln!(out, "{reply}")
                .map_err(|e| ErrandError::CaptureError(format!("failed to write output: {e}")))?;
        }

        Ok(())
    }
}
