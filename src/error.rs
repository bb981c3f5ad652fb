//! Error types for the errand crate.
//!
//! Each error variant carries a stable error code (SCREAMING_SNAKE_CASE)
//! that is included in the Display output and accessible via
//! [`ErrandError::code()`]. Codes are part of the public API contract.

/// Stable error codes for programmatic error handling.
///
/// These codes never change. Use them for distinguishing errors rather
/// than parsing Display output.
pub mod error_codes {
    /// Invalid or missing configuration.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// Authentication failed (invalid/missing API key or token).
    pub const AUTH_FAILED: &str = "AUTH_FAILED";

    /// Request to the language model backend failed.
    pub const REQUEST_FAILED: &str = "REQUEST_FAILED";

    /// The task backend rejected or failed an operation.
    pub const BACKEND_FAILED: &str = "BACKEND_FAILED";

    /// Utterance capture failed.
    pub const CAPTURE_FAILED: &str = "CAPTURE_FAILED";
}

/// Errors produced by the errand crate.
///
/// Each variant includes a stable error code accessible via
/// [`ErrandError::code()`]. The Display impl formats as `[CODE] message`.
#[derive(Debug, thiserror::Error)]
pub enum ErrandError {
    /// Invalid or missing configuration.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    ConfigError(String),

    /// Authentication failed (invalid/missing API key or token).
    #[error("[{}] {}", error_codes::AUTH_FAILED, .0)]
    AuthError(String),

    /// Request to the language model backend failed.
    #[error("[{}] {}", error_codes::REQUEST_FAILED, .0)]
    RequestError(String),

    /// The task backend rejected or failed an operation.
    #[error("[{}] {}", error_codes::BACKEND_FAILED, .0)]
    BackendError(String),

    /// Utterance capture failed.
    #[error("[{}] {}", error_codes::CAPTURE_FAILED, .0)]
    CaptureError(String),
}

impl ErrandError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => error_codes::CONFIG_INVALID,
            Self::AuthError(_) => error_codes::AUTH_FAILED,
            Self::RequestError(_) => error_codes::REQUEST_FAILED,
            Self::BackendError(_) => error_codes::BACKEND_FAILED,
            Self::CaptureError(_) => error_codes::CAPTURE_FAILED,
        }
    }

    /// Returns the inner message without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::ConfigError(m)
            | Self::AuthError(m)
            | Self::RequestError(m)
            | Self::BackendError(m)
            | Self::CaptureError(m) => m,
        }
    }
}

/// Convenience alias for errand results.
pub type Result<T> = std::result::Result<T, ErrandError>;
