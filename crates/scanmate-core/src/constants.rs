//! Core constants for the Scanmate kiosk.
//!
//! This module defines the fixed values shared by the hardware layer, the
//! capture-retry workflow and the transaction orchestrator. Timing values are
//! expressed in milliseconds and converted to [`Duration`] at the call site:
//!
//! ```
//! use scanmate_core::constants::*;
//! use std::time::Duration;
//!
//! let settle = Duration::from_millis(DEFAULT_SCAN_SETTLE_MS);
//! assert_eq!(settle, Duration::from_millis(1500));
//! assert_eq!(DEFAULT_MAX_SCAN_ATTEMPTS, 10);
//! ```
//!
//! Most of these values are defaults for the kiosk configuration file. The
//! pin setup retry budget is not configurable.

// ============================================================================
// GPIO (sysfs)
// ============================================================================

/// Directory containing the sysfs GPIO control files.
///
/// ```text
/// /sys/class/gpio/export            <- write pin number to export
/// /sys/class/gpio/gpio17/direction  <- "in" / "out"
/// /sys/class/gpio/gpio17/value      <- "0" / "1"
/// ```
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// Name of the export control file inside [`SYSFS_GPIO_ROOT`].
pub const SYSFS_EXPORT_FILE: &str = "export";

/// Number of attempts to write a pin direction after export.
///
/// The kernel publishes the pin directory asynchronously after export and
/// udev fixes up permissions shortly afterwards. Writes in that window fail
/// with `EACCES`, so direction setup is retried.
pub const PIN_SETUP_ATTEMPTS: u32 = 10;

/// Delay between two pin direction write attempts (milliseconds).
///
/// Together with [`PIN_SETUP_ATTEMPTS`] this bounds setup to 200ms.
pub const PIN_SETUP_RETRY_DELAY_MS: u64 = 20;

/// Value written to enable an output pin.
pub const PIN_VALUE_HIGH: &[u8] = b"1";

/// Value written to disable an output pin.
pub const PIN_VALUE_LOW: &[u8] = b"0";

/// Default BCM pin of the push button.
pub const DEFAULT_BUTTON_PIN: u32 = 17;

/// Default BCM pin of the red LED.
pub const DEFAULT_RED_LED_PIN: u32 = 7;

/// Default BCM pin of the green LED.
pub const DEFAULT_GREEN_LED_PIN: u32 = 8;

/// Default BCM pin of the blue LED.
pub const DEFAULT_BLUE_LED_PIN: u32 = 25;

// ============================================================================
// Capture-retry workflow
// ============================================================================

/// Maximum number of capture/decode attempts per barcode.
pub const DEFAULT_MAX_SCAN_ATTEMPTS: u32 = 10;

/// Time the user gets to position the barcode before each capture (milliseconds).
pub const DEFAULT_SCAN_SETTLE_MS: u64 = 1500;

/// Interval of the red/yellow feedback blinks (milliseconds).
pub const DEFAULT_FEEDBACK_BLINK_INTERVAL_MS: u64 = 125;

/// Number of on/off cycles of the red/yellow feedback blinks.
pub const DEFAULT_FEEDBACK_BLINK_COUNT: u32 = 4;

// ============================================================================
// Transaction orchestrator
// ============================================================================

/// Delay between a button press and the first scan (milliseconds).
pub const DEFAULT_BUTTON_SETTLE_MS: u64 = 1000;

/// How long the green success color is shown (milliseconds).
pub const DEFAULT_SUCCESS_DISPLAY_MS: u64 = 3000;

/// Interval of the ready and shutdown blinks (milliseconds).
pub const DEFAULT_STATUS_BLINK_INTERVAL_MS: u64 = 100;

/// Number of green blinks after startup.
pub const DEFAULT_READY_BLINK_COUNT: u32 = 3;

/// Number of red blinks before shutdown.
pub const DEFAULT_SHUTDOWN_BLINK_COUNT: u32 = 3;

/// Pause between two button polls (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 20;

// ============================================================================
// External capture tools
// ============================================================================

/// Program used to take a still image.
pub const DEFAULT_CAPTURE_PROGRAM: &str = "raspistill";

/// Program used to decode a barcode from the still image.
pub const DEFAULT_DECODE_PROGRAM: &str = "zbarimg";

/// Location of the most recent still image.
///
/// Lives on a tmpfs so the SD card is not written on every scan.
pub const DEFAULT_IMAGE_PATH: &str = "/run/user/1000/barcode.jpg";

/// zbarimg exit status for "no barcode was detected, no other error occurred".
pub const ZBAR_EXIT_NO_BARCODE: i32 = 4;

/// Length of the random EAN-13 style codes produced by the console scanner.
pub const SIMULATED_BARCODE_LENGTH: usize = 13;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_setup_budget() {
        assert_eq!(
            u64::from(PIN_SETUP_ATTEMPTS) * PIN_SETUP_RETRY_DELAY_MS,
            200
        );
    }

    #[test]
    fn test_default_pins_are_distinct() {
        let pins = [
            DEFAULT_BUTTON_PIN,
            DEFAULT_RED_LED_PIN,
            DEFAULT_GREEN_LED_PIN,
            DEFAULT_BLUE_LED_PIN,
        ];
        for (i, a) in pins.iter().enumerate() {
            for b in &pins[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
