//! Enum wrapper for capture source dispatch.
//!
//! Mirrors [`scanmate_hardware::devices`]: the capture source is chosen at
//! startup and dispatched through a concrete enum because native async
//! trait methods are not object-safe.

use crate::command::CommandScanner;
use crate::console::ConsoleScanner;
use crate::error::{CaptureError, DecodeError};
use crate::mock::MockScanner;
use crate::traits::CaptureSource;

/// Enum wrapper for capture source dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyCaptureSource {
    /// External capture and decode programs.
    Command(CommandScanner),

    /// Operator answers on the console.
    Console(ConsoleScanner),

    /// Scripted source for testing.
    Mock(MockScanner),
}

impl CaptureSource for AnyCaptureSource {
    async fn capture_image(&mut self) -> Result<(), CaptureError> {
        match self {
            Self::Command(source) => source.capture_image().await,
            Self::Console(source) => source.capture_image().await,
            Self::Mock(source) => source.capture_image().await,
        }
    }

    async fn decode_image(&mut self) -> Result<String, DecodeError> {
        match self {
            Self::Command(source) => source.decode_image().await,
            Self::Console(source) => source.decode_image().await,
            Self::Mock(source) => source.decode_image().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_any_capture_source_mock() {
        let (scanner, handle) = MockScanner::new();
        let mut source = AnyCaptureSource::Mock(scanner);
        handle.decode_after_misses(0, "AUTH123");

        source.capture_image().await.unwrap();
        assert_eq!(source.decode_image().await.unwrap(), "AUTH123");
    }
}
