//! Concrete chat backend adapters.
//!
//! Each adapter implements [`crate::chat::ChatBackend`] for one provider
//! wire format. Request building and response parsing are pure functions
//! so they can be tested without a server.

pub mod openai;

pub use openai::{OpenAiChat, OpenAiConfig};
