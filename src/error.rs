//! Error types shared by the handle, queue and lookup helpers.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Precondition failures raised by the core helpers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Logical or absolute position outside of the live storage.
    #[error("invalid subscript")]
    InvalidSubscript,

    /// The container holds no elements.
    #[error("empty storage")]
    EmptyStorage,

    /// The container was constructed (or left behind by `take`) with zero capacity.
    #[error("container has no capacity")]
    NoCapacity,

    /// The duplication hook returned the invalid sentinel for a valid source.
    #[error("handle duplication failed")]
    DuplicationFailed,

    /// An optional OS feature could not be resolved at run time.
    #[error("feature unavailable: {0}")]
    FeatureUnavailable(String),
}

/// Numeric status code as returned by an OS or library call, kept verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (code {code:#x})")]
pub struct StatusError<N: core::fmt::LowerHex + core::fmt::Debug> {
    code: N,
    message: String,
}
impl<N: core::fmt::LowerHex + core::fmt::Debug> StatusError<N> {
    pub fn new(code: N, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub const fn code(&self) -> &N {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
impl StatusError<u32> {
    /// Captures the calling thread's last OS error code.
    pub fn from_last_os_error(message: impl Into<String>) -> Self {
        let code = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);

        Self::new(code as u32, message)
    }
}
