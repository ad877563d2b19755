//! Error types for capture and decode operations.
//!
//! The capture-retry workflow only branches on three decode outcomes:
//! a barcode, [`DecodeError::NotFound`] (retry) and [`DecodeError::Fatal`]
//! (give up). Capture failures are never retried.

/// Errors that can occur while taking a still image.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The capture program could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The capture program ran but reported failure.
    #[error("{program} failed: {status}")]
    Failed { program: String, status: String },

    /// Any other capture failure.
    #[error("Capture error: {0}")]
    Other(String),
}

impl CaptureError {
    /// Create a generic capture error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Errors that can occur while decoding the most recent image.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The image was processed but holds no readable barcode.
    ///
    /// Expected outcome for blurry images or when nothing is held up to the
    /// camera.
    #[error("The image doesn't contain a barcode or isn't sharp enough")]
    NotFound,

    /// Decoding failed for any other reason.
    #[error("Decode error: {message}")]
    Fatal { message: String },
}

impl DecodeError {
    /// Create a new fatal decode error.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal {
            message: message.into(),
        }
    }

    /// Whether this is the retryable "no barcode" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
