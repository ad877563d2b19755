//! Error types for hardware operations.
//!
//! Every hardware error is fatal for the kiosk: once sysfs access is broken
//! there is no recovery path, so these errors carry enough context (pin
//! number, failing step) for the final log line before the process exits.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Pin export, direction or initial value configuration failed.
    #[error("Setup of GPIO pin {pin} failed: {message}")]
    Setup { pin: u32, message: String },

    /// Reading or writing a pin value failed after a successful setup.
    #[error("I/O error on GPIO pin {pin}: {source}")]
    Io {
        pin: u32,
        #[source]
        source: std::io::Error,
    },

    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },
}

impl HardwareError {
    /// Create a new setup error.
    pub fn setup(pin: u32, message: impl Into<String>) -> Self {
        Self::Setup {
            pin,
            message: message.into(),
        }
    }

    /// Create a new pin I/O error.
    pub fn io(pin: u32, source: std::io::Error) -> Self {
        Self::Io { pin, source }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// GPIO pin the error refers to, if any.
    pub fn pin(&self) -> Option<u32> {
        match self {
            Self::Setup { pin, .. } | Self::Io { pin, .. } => Some(*pin),
            Self::Disconnected { .. } => None,
        }
    }
}
