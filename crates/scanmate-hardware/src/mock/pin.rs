//! Mock GPIO pin implementation for testing and development.
//!
//! This module provides a simulated pin that records every operation and
//! can be steered programmatically for testing without requiring physical
//! hardware.

use crate::{
    HardwareError, Result,
    traits::{InputPin, OutputPin},
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Operation performed on a [`MockPin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOp {
    /// Value was read, with the returned level.
    Read(bool),

    /// Line was driven high.
    Enable,

    /// Line was driven low.
    Disable,
}

#[derive(Debug, Default)]
struct MockPinState {
    value: bool,
    scripted_reads: VecDeque<bool>,
    fail_next_read: bool,
    fail_next_write: bool,
    ops: Vec<PinOp>,
}

/// Mock pin for testing and development.
///
/// Works as an input and as an output. Reads return queued levels first and
/// fall back to the current value once the queue is empty.
///
/// # Examples
///
/// ```
/// use scanmate_hardware::mock::{MockPin, PinOp};
/// use scanmate_hardware::traits::{InputPin, OutputPin};
///
/// #[tokio::main]
/// async fn main() -> scanmate_hardware::Result<()> {
///     let (mut pin, handle) = MockPin::new(17);
///
///     handle.queue_reads([true]);
///     assert!(pin.read().await?);
///     assert!(!pin.read().await?);
///
///     pin.enable().await?;
///     assert!(handle.value());
///     assert_eq!(handle.writes(), vec![PinOp::Enable]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockPin {
    id: u32,
    state: Arc<Mutex<MockPinState>>,
}

impl MockPin {
    /// Create a new mock pin.
    ///
    /// Returns a tuple of (MockPin, MockPinHandle) where the handle can be
    /// used to script reads, inject failures and inspect operations.
    pub fn new(id: u32) -> (Self, MockPinHandle) {
        let state = Arc::new(Mutex::new(MockPinState::default()));

        let pin = Self {
            id,
            state: Arc::clone(&state),
        };

        (pin, MockPinHandle { id, state })
    }

    fn state(&self) -> MutexGuard<'_, MockPinState> {
        lock(&self.state)
    }

    fn write(&self, high: bool) -> Result<()> {
        let mut state = self.state();
        if std::mem::take(&mut state.fail_next_write) {
            return Err(HardwareError::io(
                self.id,
                std::io::Error::other("simulated write failure"),
            ));
        }
        state.value = high;
        state
            .ops
            .push(if high { PinOp::Enable } else { PinOp::Disable });
        Ok(())
    }
}

impl InputPin for MockPin {
    fn id(&self) -> u32 {
        self.id
    }

    async fn read(&self) -> Result<bool> {
        let mut state = self.state();
        if std::mem::take(&mut state.fail_next_read) {
            return Err(HardwareError::io(
                self.id,
                std::io::Error::other("simulated read failure"),
            ));
        }
        let value = state.scripted_reads.pop_front().unwrap_or(state.value);
        state.ops.push(PinOp::Read(value));
        Ok(value)
    }
}

impl OutputPin for MockPin {
    async fn enable(&mut self) -> Result<()> {
        self.write(true)
    }

    async fn disable(&mut self) -> Result<()> {
        self.write(false)
    }
}

/// Handle for controlling a mock pin.
///
/// This handle shares state with its [`MockPin`] and can be cloned and
/// kept by the test after the pin has been moved into the code under test.
#[derive(Debug, Clone)]
pub struct MockPinHandle {
    id: u32,
    state: Arc<Mutex<MockPinState>>,
}

impl MockPinHandle {
    /// GPIO number of the pin.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Current level of the line.
    pub fn value(&self) -> bool {
        lock(&self.state).value
    }

    /// Set the level returned by reads once the scripted reads are used up.
    pub fn set_value(&self, high: bool) {
        lock(&self.state).value = high;
    }

    /// Queue levels returned by the next reads, in order.
    pub fn queue_reads(&self, levels: impl IntoIterator<Item = bool>) {
        lock(&self.state).scripted_reads.extend(levels);
    }

    /// Make the next read fail with an I/O error.
    pub fn fail_next_read(&self) {
        lock(&self.state).fail_next_read = true;
    }

    /// Make the next enable/disable fail with an I/O error.
    pub fn fail_next_write(&self) {
        lock(&self.state).fail_next_write = true;
    }

    /// All operations performed so far.
    pub fn ops(&self) -> Vec<PinOp> {
        lock(&self.state).ops.clone()
    }

    /// Enable/disable operations performed so far.
    pub fn writes(&self) -> Vec<PinOp> {
        lock(&self.state)
            .ops
            .iter()
            .copied()
            .filter(|op| !matches!(op, PinOp::Read(_)))
            .collect()
    }

    /// Number of reads performed so far.
    pub fn read_count(&self) -> usize {
        lock(&self.state)
            .ops
            .iter()
            .filter(|op| matches!(op, PinOp::Read(_)))
            .count()
    }

    /// Forget the recorded operations.
    pub fn clear_ops(&self) {
        lock(&self.state).ops.clear();
    }
}

// A panicking test must not hide the recorded operations from the others.
fn lock(state: &Mutex<MockPinState>) -> MutexGuard<'_, MockPinState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
