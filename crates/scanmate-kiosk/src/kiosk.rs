//! Kiosk event loop.
//!
//! The kiosk polls its button. Each press starts a transaction: one
//! capture-retry run for the authorization barcode and, if that succeeds,
//! one for the product barcode. Between transactions the indicator is off.

use crate::config::KioskConfig;
use crate::error::{KioskError, WorkflowError};
use crate::shutdown::ShutdownSignal;
use crate::workflow::{CaptureWorkflow, WorkflowSettings};
use scanmate_core::Transaction;
use scanmate_core::constants::{
    DEFAULT_BUTTON_SETTLE_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_READY_BLINK_COUNT,
    DEFAULT_SHUTDOWN_BLINK_COUNT, DEFAULT_STATUS_BLINK_INTERVAL_MS, DEFAULT_SUCCESS_DISPLAY_MS,
};
use scanmate_hardware::{Indicator, InputPin, LedColor, OutputPin};
use scanmate_scanner::CaptureSource;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Blinked once the kiosk is ready for presses.
pub const READY_COLOR: LedColor = LedColor::Green;

/// Blinked before the kiosk stops.
pub const SHUTDOWN_COLOR: LedColor = LedColor::Red;

/// Held after both barcodes were read.
pub const SUCCESS_COLOR: LedColor = LedColor::Green;

/// Timing and policy of the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KioskSettings {
    /// Wait between a press and the first capture.
    pub button_settle: Duration,
    pub success_display: Duration,
    pub status_blink_interval: Duration,
    pub ready_blink_count: u32,
    pub shutdown_blink_count: u32,
    pub poll_interval: Duration,
    /// Waiting color of the authorization step.
    pub auth_color: LedColor,
    /// Waiting color of the product step.
    pub product_color: LedColor,
    /// Stop on capture or decode failures. When unset the transaction is
    /// abandoned instead.
    pub exit_on_scan_error: bool,
}

impl Default for KioskSettings {
    fn default() -> Self {
        Self {
            button_settle: Duration::from_millis(DEFAULT_BUTTON_SETTLE_MS),
            success_display: Duration::from_millis(DEFAULT_SUCCESS_DISPLAY_MS),
            status_blink_interval: Duration::from_millis(DEFAULT_STATUS_BLINK_INTERVAL_MS),
            ready_blink_count: DEFAULT_READY_BLINK_COUNT,
            shutdown_blink_count: DEFAULT_SHUTDOWN_BLINK_COUNT,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            auth_color: LedColor::Blue,
            product_color: LedColor::Magenta,
            exit_on_scan_error: true,
        }
    }
}

impl From<&KioskConfig> for KioskSettings {
    fn from(config: &KioskConfig) -> Self {
        Self {
            button_settle: config.timing.button_settle(),
            success_display: config.timing.success_display(),
            status_blink_interval: config.timing.status_blink_interval(),
            ready_blink_count: config.timing.ready_blink_count,
            shutdown_blink_count: config.timing.shutdown_blink_count,
            poll_interval: config.timing.poll_interval(),
            auth_color: config.colors.auth,
            product_color: config.colors.product,
            exit_on_scan_error: config.exit_on_scan_error,
        }
    }
}

/// A kiosk: one button, one indicator, one capture source.
///
/// # Examples
///
/// ```
/// use scanmate_hardware::Indicator;
/// use scanmate_hardware::mock::MockPin;
/// use scanmate_kiosk::{Kiosk, KioskConfig, ShutdownSignal};
/// use scanmate_scanner::mock::MockScanner;
///
/// #[tokio::main]
/// async fn main() {
///     let (button, _) = MockPin::new(17);
///     let (red, _) = MockPin::new(7);
///     let (green, _) = MockPin::new(8);
///     let (blue, _) = MockPin::new(25);
///     let (scanner, _) = MockScanner::new();
///
///     let mut config = KioskConfig::default();
///     config.timing.status_blink_interval = 1;
///
///     let mut kiosk = Kiosk::from_config(
///         button,
///         Indicator::new(red, green, blue),
///         scanner,
///         &config,
///     );
///
///     let shutdown = ShutdownSignal::new();
///     shutdown.trigger();
///     kiosk.run(&shutdown).await.unwrap();
/// }
/// ```
#[derive(Debug)]
pub struct Kiosk<I, O, S> {
    button: I,
    indicator: Indicator<O>,
    source: S,
    workflow: CaptureWorkflow,
    settings: KioskSettings,
    last_transaction: Option<Transaction>,
    completed: u64,
}

impl<I, O, S> Kiosk<I, O, S>
where
    I: InputPin,
    O: OutputPin,
    S: CaptureSource,
{
    pub fn new(
        button: I,
        indicator: Indicator<O>,
        source: S,
        settings: KioskSettings,
        workflow: CaptureWorkflow,
    ) -> Self {
        Self {
            button,
            indicator,
            source,
            workflow,
            settings,
            last_transaction: None,
            completed: 0,
        }
    }

    pub fn from_config(
        button: I,
        indicator: Indicator<O>,
        source: S,
        config: &KioskConfig,
    ) -> Self {
        Self::new(
            button,
            indicator,
            source,
            KioskSettings::from(config),
            CaptureWorkflow::new(WorkflowSettings::from(config)),
        )
    }

    pub fn settings(&self) -> &KioskSettings {
        &self.settings
    }

    pub fn workflow(&self) -> &CaptureWorkflow {
        &self.workflow
    }

    /// Most recent transaction that read both barcodes.
    pub fn last_transaction(&self) -> Option<&Transaction> {
        self.last_transaction.as_ref()
    }

    /// Number of transactions that read both barcodes since start.
    pub fn completed_transactions(&self) -> u64 {
        self.completed
    }

    /// Poll the button until `shutdown` is triggered.
    ///
    /// Blinks the ready pattern first. On shutdown, blinks the shutdown
    /// pattern and turns the indicator off before returning `Ok`.
    ///
    /// # Errors
    ///
    /// - [`KioskError::Hardware`] if the button cannot be read or an LED
    ///   cannot be written
    /// - [`KioskError::Scan`] on a capture or decode failure, unless
    ///   `exit_on_scan_error` is unset
    /// - [`KioskError::Internal`] if a scan broke the state table
    pub async fn run(&mut self, shutdown: &ShutdownSignal) -> Result<(), KioskError> {
        self.indicator
            .blink(
                READY_COLOR,
                self.settings.status_blink_interval,
                self.settings.ready_blink_count,
            )
            .await?;
        info!(button = self.button.id(), "ready");

        loop {
            if shutdown.is_triggered() {
                return self.shut_down().await;
            }

            let pressed = self.button.read().await.inspect_err(|e| {
                error!(error = %e, "button read failed");
            })?;

            if pressed {
                info!("button pressed");
                sleep(self.settings.button_settle).await;
                self.handle_press().await?;
            }

            sleep(self.settings.poll_interval).await;
        }
    }

    /// Scan the authorization barcode, then the product barcode.
    ///
    /// On success the success color is shown for `success_display`. The
    /// indicator is left as it is; callers reset it.
    ///
    /// # Errors
    ///
    /// Returns the [`WorkflowError`] of the first step that failed. The
    /// product step is not attempted if the authorization step failed.
    pub async fn run_transaction(&mut self) -> Result<Transaction, WorkflowError> {
        info!(color = %self.settings.auth_color, "scan authorization barcode");
        let auth = self
            .workflow
            .run(&mut self.indicator, &mut self.source, self.settings.auth_color)
            .await?;
        info!(%auth, "authorization barcode read");

        info!(color = %self.settings.product_color, "scan product barcode");
        let product = self
            .workflow
            .run(&mut self.indicator, &mut self.source, self.settings.product_color)
            .await?;
        info!(%product, "product barcode read");

        let transaction = Transaction::new(auth, product);
        info!(%transaction, "transaction complete");

        self.indicator.set_color(SUCCESS_COLOR).await?;
        sleep(self.settings.success_display).await;

        Ok(transaction)
    }

    async fn handle_press(&mut self) -> Result<(), KioskError> {
        let outcome = self.run_transaction().await;
        let cleared = self.indicator.off().await;

        match outcome {
            Ok(transaction) => {
                self.completed += 1;
                self.last_transaction = Some(transaction);
            }
            Err(e) if e.is_benign() => {
                warn!(error = %e, "transaction abandoned");
            }
            Err(e) if stops_kiosk(&e, self.settings.exit_on_scan_error) => {
                error!(error = %e, "transaction failed, stopping");
                return Err(e.into());
            }
            Err(e) => {
                error!(error = %e, "transaction failed");
            }
        }

        cleared.map_err(KioskError::from)
    }

    async fn shut_down(&mut self) -> Result<(), KioskError> {
        info!("shutting down");
        self.indicator
            .blink(
                SHUTDOWN_COLOR,
                self.settings.status_blink_interval,
                self.settings.shutdown_blink_count,
            )
            .await?;
        self.indicator.off().await?;
        info!("stopped");
        Ok(())
    }
}

/// Whether a failed transaction ends the event loop.
///
/// GPIO failures and state table violations always do. Capture and decode
/// failures do when `exit_on_scan_error` is set.
fn stops_kiosk(error: &WorkflowError, exit_on_scan_error: bool) -> bool {
    if error.is_benign() {
        return false;
    }
    error.is_hardware() || error.is_internal() || exit_on_scan_error
}
