//! Capture-retry workflow.
//!
//! One run acquires one barcode:
//!
//! 1. Show the waiting color and let the subject settle.
//! 2. Capture an image. A capture failure blinks red and ends the run.
//! 3. Decode the image. A barcode ends the run. "No barcode" blinks yellow
//!    and starts the next attempt, or ends the run once the attempt limit is
//!    reached. Any other decode failure blinks red and ends the run.
//!
//! The indicator is turned off whenever a run ends, whatever the outcome.

use crate::config::KioskConfig;
use crate::error::WorkflowError;
use crate::state_machine::{ScanMachine, ScanState, StateTransition};
use scanmate_core::Barcode;
use scanmate_core::constants::{
    DEFAULT_FEEDBACK_BLINK_COUNT, DEFAULT_FEEDBACK_BLINK_INTERVAL_MS, DEFAULT_MAX_SCAN_ATTEMPTS,
    DEFAULT_SCAN_SETTLE_MS,
};
use scanmate_hardware::{Indicator, LedColor, OutputPin};
use scanmate_scanner::{CaptureSource, DecodeError};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Color blinked when no barcode was found in an image.
pub const NOT_FOUND_COLOR: LedColor = LedColor::Yellow;

/// Color blinked when capture or decode failed.
pub const FAILURE_COLOR: LedColor = LedColor::Red;

/// Timing and limits of a capture-retry run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// Wait between showing the waiting color and capturing.
    pub settle: Duration,
    pub blink_interval: Duration,
    pub blink_count: u32,
    pub max_attempts: u32,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(DEFAULT_SCAN_SETTLE_MS),
            blink_interval: Duration::from_millis(DEFAULT_FEEDBACK_BLINK_INTERVAL_MS),
            blink_count: DEFAULT_FEEDBACK_BLINK_COUNT,
            max_attempts: DEFAULT_MAX_SCAN_ATTEMPTS,
        }
    }
}

impl From<&KioskConfig> for WorkflowSettings {
    fn from(config: &KioskConfig) -> Self {
        Self {
            settle: config.timing.scan_settle(),
            blink_interval: config.timing.feedback_blink_interval(),
            blink_count: config.timing.feedback_blink_count,
            max_attempts: config.max_attempts,
        }
    }
}

/// Drives a [`CaptureSource`] and an [`Indicator`] until a barcode is read
/// or the run gives up.
///
/// The workflow owns no hardware. It keeps the scan state machine so the
/// transitions of past runs can be inspected.
///
/// # Examples
///
/// ```
/// use scanmate_hardware::{Indicator, LedColor};
/// use scanmate_hardware::mock::MockPin;
/// use scanmate_kiosk::workflow::{CaptureWorkflow, WorkflowSettings};
/// use scanmate_scanner::mock::MockScanner;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let (red, _) = MockPin::new(7);
///     let (green, _) = MockPin::new(8);
///     let (blue, _) = MockPin::new(25);
///     let mut indicator = Indicator::new(red, green, blue);
///
///     let (mut scanner, handle) = MockScanner::new();
///     handle.decode_after_misses(0, "AUTH123");
///
///     let mut workflow = CaptureWorkflow::new(WorkflowSettings {
///         settle: Duration::ZERO,
///         ..WorkflowSettings::default()
///     });
///     let barcode = workflow
///         .run(&mut indicator, &mut scanner, LedColor::Blue)
///         .await
///         .unwrap();
///     assert_eq!(barcode.as_str(), "AUTH123");
/// }
/// ```
#[derive(Debug, Default)]
pub struct CaptureWorkflow {
    settings: WorkflowSettings,
    machine: ScanMachine,
}

impl CaptureWorkflow {
    pub fn new(settings: WorkflowSettings) -> Self {
        Self {
            settings,
            machine: ScanMachine::new(),
        }
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    /// Transitions of recent runs, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        self.machine.history()
    }

    /// Acquire one barcode, showing `waiting` while the subject settles.
    ///
    /// The indicator is off when this returns. If turning it off fails
    /// after the run already failed, the run's error is returned.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::AttemptsExhausted`] after `max_attempts` images
    ///   without a barcode
    /// - [`WorkflowError::Capture`] on the first capture failure
    /// - [`WorkflowError::Decode`] on a decode failure other than "no
    ///   barcode", or if the decoded text is not a usable barcode
    /// - [`WorkflowError::Hardware`] if an LED line cannot be written
    pub async fn run<O, S>(
        &mut self,
        indicator: &mut Indicator<O>,
        source: &mut S,
        waiting: LedColor,
    ) -> Result<Barcode, WorkflowError>
    where
        O: OutputPin,
        S: CaptureSource,
    {
        if *self.machine.current_state() != ScanState::Idle {
            self.machine.reset();
        }

        let outcome = self.attempts(indicator, source, waiting).await;
        let cleared = indicator.off().await;

        if self.machine.current_state().is_terminal() {
            self.machine.transition_to(ScanState::Idle)?;
        } else {
            self.machine.reset();
        }

        match (outcome, cleared) {
            (Ok(barcode), Ok(())) => Ok(barcode),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(reset_error)) => {
                warn!(error = %reset_error, "failed to turn indicator off");
                Err(e)
            }
        }
    }

    async fn attempts<O, S>(
        &mut self,
        indicator: &mut Indicator<O>,
        source: &mut S,
        waiting: LedColor,
    ) -> Result<Barcode, WorkflowError>
    where
        O: OutputPin,
        S: CaptureSource,
    {
        let max_attempts = self.settings.max_attempts;

        for attempt in 1..=max_attempts {
            self.machine.transition_to(ScanState::Start)?;
            info!(attempt, max_attempts, %waiting, "capturing image");

            indicator.set_color(waiting).await?;
            sleep(self.settings.settle).await;

            self.machine.transition_to(ScanState::Capturing)?;
            if let Err(e) = source.capture_image().await {
                error!(attempt, error = %e, "capture failed");
                self.fail(indicator).await?;
                return Err(e.into());
            }
            indicator.off().await?;

            self.machine.transition_to(ScanState::Decoding)?;
            match source.decode_image().await {
                Ok(raw) => match Barcode::new(&raw) {
                    Ok(barcode) => {
                        self.machine.transition_to(ScanState::Success)?;
                        info!(attempt, %barcode, "barcode decoded");
                        return Ok(barcode);
                    }
                    Err(e) => {
                        error!(attempt, error = %e, "decoder returned unusable text");
                        self.fail(indicator).await?;
                        return Err(DecodeError::fatal(e.to_string()).into());
                    }
                },
                Err(DecodeError::NotFound) => {
                    indicator
                        .blink(
                            NOT_FOUND_COLOR,
                            self.settings.blink_interval,
                            self.settings.blink_count,
                        )
                        .await?;

                    if attempt == max_attempts {
                        self.machine.transition_to(ScanState::Exhausted)?;
                        warn!(attempts = max_attempts, "no barcode found, giving up");
                        return Err(WorkflowError::AttemptsExhausted {
                            attempts: max_attempts,
                        });
                    }

                    self.machine.transition_to(ScanState::NotFoundRetry)?;
                    info!(
                        attempt,
                        attempts_left = max_attempts - attempt,
                        "no barcode found, retrying"
                    );
                }
                Err(e) => {
                    error!(attempt, error = %e, "decode failed");
                    self.fail(indicator).await?;
                    return Err(e.into());
                }
            }
        }

        Err(WorkflowError::AttemptsExhausted {
            attempts: max_attempts,
        })
    }

    async fn fail<O: OutputPin>(
        &mut self,
        indicator: &mut Indicator<O>,
    ) -> Result<(), WorkflowError> {
        indicator
            .blink(
                FAILURE_COLOR,
                self.settings.blink_interval,
                self.settings.blink_count,
            )
            .await?;
        self.machine.transition_to(ScanState::Fatal)?;
        Ok(())
    }
}
