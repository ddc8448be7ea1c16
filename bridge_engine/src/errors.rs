use std::io;
use thiserror::Error;

/// Failures of the stdio frame channel.
#[derive(Error, Debug)]
pub enum FrameError {
    /// The underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended in the middle of a length prefix or payload.
    #[error("stream ended inside a frame ({read} of {expected} bytes read)")]
    Truncated { read: usize, expected: usize },

    /// The length prefix is above the configured limit. The payload has been skipped.
    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: usize, max: usize },

    /// The payload is not a valid inbound message.
    #[error("invalid message: {0}")]
    Decode(#[source] serde_json::Error),

    /// An outbound message could not be serialized.
    #[error("could not encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Failures while turning one inbound message into an HTTP call.
#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Failed to marshal JSON: {0}")]
    Marshal(#[source] serde_json::Error),

    #[error("Failed to create request: {0}")]
    InvalidHost(String),

    #[error("Failed to create request: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Failed to send request: {0}")]
    Send(#[source] reqwest::Error),

    #[error("Failed to read response: {source}")]
    ReadBody {
        code: u16,
        #[source]
        source: reqwest::Error,
    },
}

impl TranslateError {
    /// HTTP status known at the time of failure, if any.
    pub fn code(&self) -> Option<u16> {
        match self {
            TranslateError::ReadBody { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn invalid_host(msg: impl Into<String>) -> Self {
        TranslateError::InvalidHost(msg.into())
    }
}

/// Fatal errors that end the bridge loop.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("could not write response frame: {0}")]
    Write(#[source] FrameError),
}
