//! Error types for the capture-retry workflow and the kiosk event loop.

use scanmate_hardware::HardwareError;
use scanmate_scanner::{CaptureError, DecodeError};

/// Ways a capture-retry run can end without a barcode.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Every attempt ended with "no barcode". Not a failure of the kiosk.
    #[error("No barcode found after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Hardware(#[from] HardwareError),

    /// The run tried a transition outside the scan state table.
    #[error(transparent)]
    State(#[from] scanmate_core::Error),
}

impl WorkflowError {
    /// Whether the kiosk should simply go back to waiting for a press.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::AttemptsExhausted { .. })
    }

    /// Whether a GPIO line failed. Always fatal for the kiosk.
    pub fn is_hardware(&self) -> bool {
        matches!(self, Self::Hardware(_))
    }

    /// Whether the run broke the scan state table. Always fatal for the
    /// kiosk.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::State(_))
    }
}

/// Errors that stop the kiosk event loop.
#[derive(Debug, thiserror::Error)]
pub enum KioskError {
    #[error(transparent)]
    Hardware(#[from] HardwareError),

    #[error("Internal error: {0}")]
    Internal(#[source] scanmate_core::Error),

    /// A capture or decode failure while the kiosk is configured to exit on
    /// scan errors.
    #[error("Scan failed: {0}")]
    Scan(#[source] WorkflowError),
}

impl From<WorkflowError> for KioskError {
    fn from(error: WorkflowError) -> Self {
        match error {
            WorkflowError::Hardware(e) => Self::Hardware(e),
            WorkflowError::State(e) => Self::Internal(e),
            other => Self::Scan(other),
        }
    }
}
