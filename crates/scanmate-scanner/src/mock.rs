//! Mock capture source for testing.
//!
//! Outcomes are scripted through a [`MockScannerHandle`]. Once the script
//! runs out, captures succeed and decodes report "no barcode", which is
//! what a real camera pointed at nothing does.

use crate::error::{CaptureError, DecodeError};
use crate::traits::CaptureSource;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Call made on a [`MockScanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCall {
    Capture,
    Decode,
}

#[derive(Debug, Default)]
struct MockScannerState {
    captures: VecDeque<Result<(), CaptureError>>,
    decodes: VecDeque<Result<String, DecodeError>>,
    calls: Vec<ScanCall>,
}

/// Scripted [`CaptureSource`].
///
/// # Examples
///
/// ```
/// use scanmate_scanner::mock::MockScanner;
/// use scanmate_scanner::CaptureSource;
///
/// #[tokio::main]
/// async fn main() {
///     let (mut scanner, handle) = MockScanner::new();
///     handle.decode_after_misses(1, "AUTH123");
///
///     scanner.capture_image().await.unwrap();
///     assert!(scanner.decode_image().await.unwrap_err().is_not_found());
///     scanner.capture_image().await.unwrap();
///     assert_eq!(scanner.decode_image().await.unwrap(), "AUTH123");
/// }
/// ```
#[derive(Debug)]
pub struct MockScanner {
    state: Arc<Mutex<MockScannerState>>,
}

impl MockScanner {
    /// Create a new mock scanner and the handle scripting it.
    pub fn new() -> (Self, MockScannerHandle) {
        let state = Arc::new(Mutex::new(MockScannerState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockScannerHandle { state },
        )
    }
}

impl CaptureSource for MockScanner {
    async fn capture_image(&mut self) -> Result<(), CaptureError> {
        let mut state = lock(&self.state);
        state.calls.push(ScanCall::Capture);
        state.captures.pop_front().unwrap_or(Ok(()))
    }

    async fn decode_image(&mut self) -> Result<String, DecodeError> {
        let mut state = lock(&self.state);
        state.calls.push(ScanCall::Decode);
        state
            .decodes
            .pop_front()
            .unwrap_or(Err(DecodeError::NotFound))
    }
}

/// Handle for scripting a [`MockScanner`] and inspecting its calls.
#[derive(Debug, Clone)]
pub struct MockScannerHandle {
    state: Arc<Mutex<MockScannerState>>,
}

impl MockScannerHandle {
    /// Queue the outcome of the next unscripted capture.
    pub fn push_capture(&self, outcome: Result<(), CaptureError>) {
        lock(&self.state).captures.push_back(outcome);
    }

    /// Queue the outcome of the next unscripted decode.
    pub fn push_decode(&self, outcome: Result<String, DecodeError>) {
        lock(&self.state).decodes.push_back(outcome);
    }

    /// Queue `misses` "no barcode" decodes followed by `barcode`.
    pub fn decode_after_misses(&self, misses: u32, barcode: &str) {
        let mut state = lock(&self.state);
        for _ in 0..misses {
            state.decodes.push_back(Err(DecodeError::NotFound));
        }
        state.decodes.push_back(Ok(barcode.to_string()));
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<ScanCall> {
        lock(&self.state).calls.clone()
    }

    pub fn capture_count(&self) -> usize {
        self.count(ScanCall::Capture)
    }

    pub fn decode_count(&self) -> usize {
        self.count(ScanCall::Decode)
    }

    fn count(&self, call: ScanCall) -> usize {
        lock(&self.state)
            .calls
            .iter()
            .filter(|c| **c == call)
            .count()
    }
}

fn lock(state: &Mutex<MockScannerState>) -> MutexGuard<'_, MockScannerState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
