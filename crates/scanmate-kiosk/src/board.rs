//! Assembles the kiosk peripherals from configuration.
//!
//! The physical board has a push button and a red, a green and a blue LED on
//! sysfs GPIO lines, plus a camera driven by external programs. In
//! simulation mode the same roles are played by the operator console.

use crate::config::{PinConfig, ScannerConfig};
use scanmate_hardware::console::{
    ConsoleButton, ConsoleInput, ConsoleLed, FAIL_LED_COMMAND, FAIL_READ_COMMAND,
};
use scanmate_hardware::gpio::{SysfsLayout, SysfsPin};
use scanmate_hardware::{AnyInputPin, AnyOutputPin, HardwareError, Indicator};
use scanmate_scanner::console::ConsoleScanner;
use scanmate_scanner::{AnyCaptureSource, CommandScanner};
use tracing::info;

/// Button and indicator of one kiosk.
#[derive(Debug)]
pub struct Board {
    pub button: AnyInputPin,
    pub indicator: Indicator<AnyOutputPin>,
}

impl Board {
    /// Export and configure the four GPIO lines under `pins.sysfs_root`.
    ///
    /// The LED lines are driven low as part of their setup.
    ///
    /// # Errors
    ///
    /// Returns the [`HardwareError::Setup`] of the first line that could not
    /// be configured.
    pub async fn sysfs(pins: &PinConfig) -> Result<Self, HardwareError> {
        let layout = SysfsLayout::new(pins.sysfs_root.clone());
        info!(root = %layout.root().display(), "configuring GPIO pins");

        let button = SysfsPin::input(pins.button, &layout).await?;
        let red = SysfsPin::output(pins.red, &layout).await?;
        let green = SysfsPin::output(pins.green, &layout).await?;
        let blue = SysfsPin::output(pins.blue, &layout).await?;

        Ok(Self {
            button: AnyInputPin::Sysfs(button),
            indicator: Indicator::new(
                AnyOutputPin::Sysfs(red),
                AnyOutputPin::Sysfs(green),
                AnyOutputPin::Sysfs(blue),
            ),
        })
    }

    /// Console stand-ins: any line entered on `console` presses the button,
    /// except the failure commands.
    pub fn console(pins: &PinConfig, console: ConsoleInput) -> Self {
        info!(
            "simulating GPIO pins on the console, press <enter> to scan, \
             enter '{FAIL_READ_COMMAND}' or '{FAIL_LED_COMMAND}' to simulate a pin failure"
        );

        Self {
            indicator: Indicator::new(
                AnyOutputPin::Console(ConsoleLed::attached(pins.red, &console)),
                AnyOutputPin::Console(ConsoleLed::attached(pins.green, &console)),
                AnyOutputPin::Console(ConsoleLed::attached(pins.blue, &console)),
            ),
            button: AnyInputPin::Console(ConsoleButton::new(pins.button, console)),
        }
    }
}

/// Camera capture source running the configured programs.
pub fn command_scanner(scanner: &ScannerConfig) -> AnyCaptureSource {
    AnyCaptureSource::Command(CommandScanner::for_image(
        &scanner.capture_program,
        &scanner.decode_program,
        &scanner.image_path,
    ))
}

/// Capture source answered on `console`.
pub fn console_scanner(console: ConsoleInput) -> AnyCaptureSource {
    AnyCaptureSource::Console(ConsoleScanner::new(console))
}
