//! Scan state machine.
//!
//! Tracks where a capture-retry run is and keeps a bounded record of how it
//! got there. The machine only validates and records; the side effects
//! (LEDs, camera, decoder) live in [`crate::workflow`].
//!
//! # States
//!
//! - `Idle`: no run in progress
//! - `Start`: waiting color shown, letting the subject settle
//! - `Capturing`: taking a still image
//! - `Decoding`: looking for a barcode in the image
//! - `Success`: barcode decoded
//! - `NotFoundRetry`: no barcode in the image, another attempt follows
//! - `Exhausted`: no barcode and no attempts left
//! - `Fatal`: capture or decode failed for good
//!
//! # Valid Transitions
//!
//! - Idle → Start → Capturing → Decoding → Success → Idle
//! - Decoding → NotFoundRetry → Start (next attempt)
//! - Decoding → Exhausted → Idle
//! - Capturing/Decoding → Fatal → Idle
//!
//! # Examples
//!
//! ```
//! use scanmate_kiosk::state_machine::{ScanMachine, ScanState};
//!
//! let mut machine = ScanMachine::new();
//! assert_eq!(machine.current_state(), &ScanState::Idle);
//!
//! machine.transition_to(ScanState::Start).unwrap();
//! assert_eq!(machine.attempt(), 1);
//!
//! assert!(machine.transition_to(ScanState::Success).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use scanmate_core::{Error, Result};
use tokio::time::Instant;
use tracing::debug;

/// Maximum number of state transitions to keep in history.
///
/// A run that exhausts ten attempts records 42 transitions, so the history
/// always covers at least the last two runs.
const MAX_HISTORY_SIZE: usize = 100;

/// Phase of a capture-retry run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanState {
    /// No run in progress.
    Idle,

    /// Waiting color shown, subject settling before the picture.
    Start,

    /// Taking a still image.
    Capturing,

    /// Looking for a barcode in the most recent image.
    Decoding,

    /// Barcode decoded. Terminal.
    Success,

    /// Image held no barcode; another attempt follows.
    NotFoundRetry,

    /// Image held no barcode and the attempt limit is reached. Terminal.
    Exhausted,

    /// Capture or decode failed for a reason other than "no barcode".
    /// Terminal.
    Fatal,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            ScanState::Idle => "Idle",
            ScanState::Start => "Start",
            ScanState::Capturing => "Capturing",
            ScanState::Decoding => "Decoding",
            ScanState::Success => "Success",
            ScanState::NotFoundRetry => "NotFoundRetry",
            ScanState::Exhausted => "Exhausted",
            ScanState::Fatal => "Fatal",
        };
        write!(f, "{}", state_str)
    }
}

impl ScanState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use scanmate_kiosk::state_machine::ScanState;
    ///
    /// assert!(ScanState::Decoding.can_transition_to(&ScanState::NotFoundRetry));
    /// assert!(!ScanState::Capturing.can_transition_to(&ScanState::NotFoundRetry));
    /// ```
    pub fn can_transition_to(&self, target: &ScanState) -> bool {
        matches!(
            (self, target),
            (ScanState::Idle, ScanState::Start)
                | (ScanState::Start, ScanState::Capturing)
                | (ScanState::Capturing, ScanState::Decoding | ScanState::Fatal)
                | (
                    ScanState::Decoding,
                    ScanState::Success
                        | ScanState::NotFoundRetry
                        | ScanState::Exhausted
                        | ScanState::Fatal
                )
                | (ScanState::NotFoundRetry, ScanState::Start)
                | (
                    ScanState::Success | ScanState::Exhausted | ScanState::Fatal,
                    ScanState::Idle
                )
        )
    }

    /// Whether a run that reached this state is over.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanState::Success | ScanState::Exhausted | ScanState::Fatal
        )
    }
}

/// A single state transition with the attempt it belongs to.
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// The state transitioned from.
    pub from: ScanState,

    /// The state transitioned to.
    pub to: ScanState,

    /// Attempt number in effect after the transition (0 when idle).
    pub attempt: u32,

    /// When the transition occurred.
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: ScanState, to: ScanState, attempt: u32) -> Self {
        Self {
            from,
            to,
            attempt,
            timestamp: Instant::now(),
        }
    }

    /// Get the duration since this transition occurred.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// State machine for one capture-retry workflow.
///
/// Entering `Start` from `Idle` begins attempt 1, entering it from
/// `NotFoundRetry` begins the next attempt. Returning to `Idle` clears the
/// attempt counter.
#[derive(Debug)]
pub struct ScanMachine {
    current_state: ScanState,
    attempt: u32,
    state_entered_at: Instant,
    history: VecDeque<StateTransition>,
}

impl ScanMachine {
    /// Create a new state machine in the Idle state.
    pub fn new() -> Self {
        Self {
            current_state: ScanState::Idle,
            attempt: 0,
            state_entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> &ScanState {
        &self.current_state
    }

    /// Current attempt number, starting at 1. Zero while idle.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn time_in_current_state(&self) -> Duration {
        self.state_entered_at.elapsed()
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Get the last `count` state transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .cloned()
            .collect()
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] if `new_state` is not
    /// reachable from the current state. The machine is left unchanged.
    pub fn transition_to(&mut self, new_state: ScanState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let attempt = match (self.current_state, new_state) {
            (_, ScanState::Idle) => 0,
            (_, ScanState::Start) => self.attempt + 1,
            _ => self.attempt,
        };

        let transition = StateTransition::new(self.current_state, new_state, attempt);
        self.perform_state_change(transition.clone());

        Ok(transition)
    }

    /// Force the machine back to Idle.
    ///
    /// Used when a run is cut short by an error outside the transition
    /// table, e.g. a failing LED write in the middle of an attempt.
    pub fn reset(&mut self) -> StateTransition {
        let transition = StateTransition::new(self.current_state, ScanState::Idle, 0);
        self.perform_state_change(transition.clone());
        transition
    }

    fn perform_state_change(&mut self, transition: StateTransition) {
        debug!(
            from = %transition.from,
            to = %transition.to,
            attempt = transition.attempt,
            "scan state"
        );

        self.current_state = transition.to;
        self.attempt = transition.attempt;
        self.state_entered_at = transition.timestamp;

        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for ScanMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn machine_in(path: &[ScanState]) -> ScanMachine {
        let mut machine = ScanMachine::new();
        for state in path {
            machine.transition_to(*state).unwrap();
        }
        machine
    }

    #[test]
    fn test_new_machine_starts_idle() {
        let machine = ScanMachine::new();
        assert_eq!(machine.current_state(), &ScanState::Idle);
        assert_eq!(machine.attempt(), 0);
        assert!(machine.history().is_empty());
    }

    #[rstest]
    #[case(ScanState::Idle, ScanState::Start)]
    #[case(ScanState::Start, ScanState::Capturing)]
    #[case(ScanState::Capturing, ScanState::Decoding)]
    #[case(ScanState::Capturing, ScanState::Fatal)]
    #[case(ScanState::Decoding, ScanState::Success)]
    #[case(ScanState::Decoding, ScanState::NotFoundRetry)]
    #[case(ScanState::Decoding, ScanState::Exhausted)]
    #[case(ScanState::Decoding, ScanState::Fatal)]
    #[case(ScanState::NotFoundRetry, ScanState::Start)]
    #[case(ScanState::Success, ScanState::Idle)]
    #[case(ScanState::Exhausted, ScanState::Idle)]
    #[case(ScanState::Fatal, ScanState::Idle)]
    fn test_valid_transitions(#[case] from: ScanState, #[case] to: ScanState) {
        assert!(from.can_transition_to(&to));
    }

    #[rstest]
    #[case(ScanState::Idle, ScanState::Capturing)]
    #[case(ScanState::Start, ScanState::Decoding)]
    #[case(ScanState::Capturing, ScanState::NotFoundRetry)]
    #[case(ScanState::Capturing, ScanState::Success)]
    #[case(ScanState::NotFoundRetry, ScanState::Capturing)]
    #[case(ScanState::NotFoundRetry, ScanState::Idle)]
    #[case(ScanState::Success, ScanState::Start)]
    #[case(ScanState::Exhausted, ScanState::Start)]
    #[case(ScanState::Start, ScanState::Idle)]
    fn test_invalid_transitions(#[case] from: ScanState, #[case] to: ScanState) {
        assert!(!from.can_transition_to(&to));
    }

    #[test]
    fn test_invalid_transition_leaves_machine_unchanged() {
        let mut machine = machine_in(&[ScanState::Start]);

        let err = machine.transition_to(ScanState::Success).unwrap_err();

        assert!(matches!(err, Error::InvalidStateTransition { .. }));
        assert_eq!(err.to_string(), "Invalid state transition from Start to Success");
        assert_eq!(machine.current_state(), &ScanState::Start);
        assert_eq!(machine.history().len(), 1);
    }

    #[test]
    fn test_attempt_counter_follows_retries() {
        let mut machine = machine_in(&[
            ScanState::Start,
            ScanState::Capturing,
            ScanState::Decoding,
            ScanState::NotFoundRetry,
        ]);
        assert_eq!(machine.attempt(), 1);

        machine.transition_to(ScanState::Start).unwrap();
        assert_eq!(machine.attempt(), 2);

        machine.transition_to(ScanState::Capturing).unwrap();
        machine.transition_to(ScanState::Decoding).unwrap();
        machine.transition_to(ScanState::Success).unwrap();
        assert_eq!(machine.attempt(), 2);

        machine.transition_to(ScanState::Idle).unwrap();
        assert_eq!(machine.attempt(), 0);
    }

    #[test]
    fn test_terminal_states() {
        assert!(ScanState::Success.is_terminal());
        assert!(ScanState::Exhausted.is_terminal());
        assert!(ScanState::Fatal.is_terminal());
        assert!(!ScanState::NotFoundRetry.is_terminal());
        assert!(!ScanState::Idle.is_terminal());
    }

    #[test]
    fn test_transition_history_is_recorded() {
        let machine = machine_in(&[ScanState::Start, ScanState::Capturing, ScanState::Fatal]);

        let history: Vec<_> = machine.history().iter().collect();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].from, ScanState::Idle);
        assert_eq!(history[0].to, ScanState::Start);
        assert_eq!(history[2].from, ScanState::Capturing);
        assert_eq!(history[2].to, ScanState::Fatal);
        assert!(history.iter().all(|t| t.attempt == 1));
    }

    #[test]
    fn test_last_transitions_returns_most_recent() {
        let machine = machine_in(&[ScanState::Start, ScanState::Capturing, ScanState::Decoding]);

        let last_two = machine.last_transitions(2);
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two[0].to, ScanState::Capturing);
        assert_eq!(last_two[1].to, ScanState::Decoding);
    }

    #[test]
    fn test_history_size_is_bounded() {
        let mut machine = machine_in(&[ScanState::Start, ScanState::Capturing]);
        machine.transition_to(ScanState::Decoding).unwrap();

        for _ in 0..MAX_HISTORY_SIZE {
            machine.transition_to(ScanState::NotFoundRetry).unwrap();
            machine.transition_to(ScanState::Start).unwrap();
            machine.transition_to(ScanState::Capturing).unwrap();
            machine.transition_to(ScanState::Decoding).unwrap();
        }

        assert_eq!(machine.history().len(), MAX_HISTORY_SIZE);
        assert_eq!(
            machine.history().back().map(|t| t.to),
            Some(ScanState::Decoding)
        );
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut machine = machine_in(&[ScanState::Start, ScanState::Capturing]);

        let transition = machine.reset();

        assert_eq!(transition.from, ScanState::Capturing);
        assert_eq!(transition.to, ScanState::Idle);
        assert_eq!(machine.current_state(), &ScanState::Idle);
        assert_eq!(machine.attempt(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_in_current_state() {
        let mut machine = ScanMachine::new();
        machine.transition_to(ScanState::Start).unwrap();

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(machine.time_in_current_state(), Duration::from_millis(1500));
        assert_eq!(
            machine.history()[0].elapsed(),
            Duration::from_millis(1500)
        );
    }
}
