//! Kiosk configuration loaded from a TOML file.
//!
//! Every key is optional; missing keys fall back to the values the kiosk
//! hardware was built around.
//!
//! ```toml
//! max_attempts = 10
//! exit_on_scan_error = true
//!
//! [pins]
//! button = 17
//! red = 7
//! green = 8
//! blue = 25
//! sysfs_root = "/sys/class/gpio"
//!
//! [timing]
//! scan_settle = 1500
//! button_settle = 1000
//! success_display = 3000
//! feedback_blink_interval = 125
//! feedback_blink_count = 4
//! status_blink_interval = 100
//! ready_blink_count = 3
//! shutdown_blink_count = 3
//! poll_interval = 20
//!
//! [scanner]
//! capture_program = "raspistill"
//! decode_program = "zbarimg"
//! image_path = "/run/user/1000/barcode.jpg"
//!
//! [colors]
//! auth = "blue"
//! product = "magenta"
//! ```

use scanmate_core::constants::*;
use scanmate_core::{Error, Result};
use scanmate_hardware::LedColor;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PinConfig {
    pub button: u32,
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    /// Directory holding the GPIO `export` file and `gpio<N>` directories.
    pub sysfs_root: PathBuf,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            button: DEFAULT_BUTTON_PIN,
            red: DEFAULT_RED_LED_PIN,
            green: DEFAULT_GREEN_LED_PIN,
            blue: DEFAULT_BLUE_LED_PIN,
            sysfs_root: PathBuf::from(SYSFS_GPIO_ROOT),
        }
    }
}

/// Delays and blink patterns. Durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub scan_settle: u64,
    pub button_settle: u64,
    pub success_display: u64,
    pub feedback_blink_interval: u64,
    pub feedback_blink_count: u32,
    pub status_blink_interval: u64,
    pub ready_blink_count: u32,
    pub shutdown_blink_count: u32,
    pub poll_interval: u64,
}

impl TimingConfig {
    pub fn scan_settle(&self) -> Duration {
        Duration::from_millis(self.scan_settle)
    }

    pub fn button_settle(&self) -> Duration {
        Duration::from_millis(self.button_settle)
    }

    pub fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display)
    }

    pub fn feedback_blink_interval(&self) -> Duration {
        Duration::from_millis(self.feedback_blink_interval)
    }

    pub fn status_blink_interval(&self) -> Duration {
        Duration::from_millis(self.status_blink_interval)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            scan_settle: DEFAULT_SCAN_SETTLE_MS,
            button_settle: DEFAULT_BUTTON_SETTLE_MS,
            success_display: DEFAULT_SUCCESS_DISPLAY_MS,
            feedback_blink_interval: DEFAULT_FEEDBACK_BLINK_INTERVAL_MS,
            feedback_blink_count: DEFAULT_FEEDBACK_BLINK_COUNT,
            status_blink_interval: DEFAULT_STATUS_BLINK_INTERVAL_MS,
            ready_blink_count: DEFAULT_READY_BLINK_COUNT,
            shutdown_blink_count: DEFAULT_SHUTDOWN_BLINK_COUNT,
            poll_interval: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// External programs used by the camera capture source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScannerConfig {
    pub capture_program: String,
    pub decode_program: String,
    pub image_path: PathBuf,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            capture_program: DEFAULT_CAPTURE_PROGRAM.to_string(),
            decode_program: DEFAULT_DECODE_PROGRAM.to_string(),
            image_path: PathBuf::from(DEFAULT_IMAGE_PATH),
        }
    }
}

/// Waiting colors of the two transaction steps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub auth: LedColor,
    pub product: LedColor,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            auth: LedColor::Blue,
            product: LedColor::Magenta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KioskConfig {
    pub pins: PinConfig,
    pub timing: TimingConfig,
    pub scanner: ScannerConfig,
    pub colors: ColorConfig,
    /// Capture attempts per barcode before giving up.
    pub max_attempts: u32,
    /// Stop the kiosk on capture or decode failures. When unset the
    /// transaction is abandoned and the kiosk keeps polling.
    pub exit_on_scan_error: bool,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            pins: PinConfig::default(),
            timing: TimingConfig::default(),
            scanner: ScannerConfig::default(),
            colors: ColorConfig::default(),
            max_attempts: DEFAULT_MAX_SCAN_ATTEMPTS,
            exit_on_scan_error: true,
        }
    }
}

impl KioskConfig {
    /// Read and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Config`] if it does not parse or fails validation.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), config_message(e))))
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on syntax errors, unknown keys, wrong
    /// types or validation failures.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        let pins = [
            ("button", self.pins.button),
            ("red", self.pins.red),
            ("green", self.pins.green),
            ("blue", self.pins.blue),
        ];
        for (i, (name, pin)) in pins.iter().enumerate() {
            if let Some((other, _)) = pins[i + 1..].iter().find(|(_, p)| p == pin) {
                return Err(Error::Config(format!(
                    "pins.{name} and pins.{other} both use GPIO {pin}"
                )));
            }
        }

        if self.max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".into()));
        }

        let intervals = [
            ("feedback_blink_interval", self.timing.feedback_blink_interval),
            ("status_blink_interval", self.timing.status_blink_interval),
            ("poll_interval", self.timing.poll_interval),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, ms)| *ms == 0) {
            return Err(Error::Config(format!("timing.{name} must be nonzero")));
        }

        Ok(())
    }
}

fn config_message(error: Error) -> String {
    match error {
        Error::Config(message) => message,
        other => other.to_string(),
    }
}
