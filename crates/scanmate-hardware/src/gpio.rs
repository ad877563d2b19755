//! Sysfs GPIO pins.
//!
//! A pin is brought up in three steps:
//!
//! 1. export it by writing its number to `<root>/export`, unless
//!    `<root>/gpio<N>` already exists;
//! 2. write `in`/`out` to `<root>/gpio<N>/direction`, retrying
//!    [`PIN_SETUP_ATTEMPTS`] times with [`PIN_SETUP_RETRY_DELAY_MS`] between
//!    attempts (the kernel creates the pin directory before udev has made
//!    it writable);
//! 3. for output pins, force the value to `0`.
//!
//! After setup only `<root>/gpio<N>/value` is touched. Pins are never
//! unexported.
//!
//! File access goes through [`SysfsBackend`] so the setup race can be
//! reproduced in tests.

#![allow(async_fn_in_trait)]

use crate::error::{HardwareError, Result};
use crate::traits::{Direction, InputPin, OutputPin};
use scanmate_core::constants::{
    PIN_SETUP_ATTEMPTS, PIN_SETUP_RETRY_DELAY_MS, PIN_VALUE_HIGH, PIN_VALUE_LOW,
    SYSFS_EXPORT_FILE, SYSFS_GPIO_ROOT,
};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// File operations used by [`SysfsPin`].
pub trait SysfsBackend: Send + Sync {
    /// Check whether `path` exists.
    async fn exists(&self, path: &Path) -> bool;

    /// Replace the contents of `path`.
    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Read the whole contents of `path`.
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// [`SysfsBackend`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSysfs;

impl SysfsBackend for OsSysfs {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        tokio::fs::write(path, contents).await
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}

/// Paths of the sysfs GPIO control files below a root directory.
///
/// # Examples
///
/// ```
/// use scanmate_hardware::gpio::SysfsLayout;
/// use std::path::Path;
///
/// let layout = SysfsLayout::default();
/// assert_eq!(layout.export_file(), Path::new("/sys/class/gpio/export"));
/// assert_eq!(layout.value_file(17), Path::new("/sys/class/gpio/gpio17/value"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsLayout {
    root: PathBuf,
}

impl SysfsLayout {
    /// Create a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn export_file(&self) -> PathBuf {
        self.root.join(SYSFS_EXPORT_FILE)
    }

    pub fn pin_dir(&self, pin: u32) -> PathBuf {
        self.root.join(format!("gpio{pin}"))
    }

    pub fn direction_file(&self, pin: u32) -> PathBuf {
        self.pin_dir(pin).join("direction")
    }

    pub fn value_file(&self, pin: u32) -> PathBuf {
        self.pin_dir(pin).join("value")
    }
}

impl Default for SysfsLayout {
    fn default() -> Self {
        Self::new(SYSFS_GPIO_ROOT)
    }
}

/// A GPIO line driven through sysfs.
///
/// # Examples
///
/// ```no_run
/// use scanmate_hardware::gpio::{SysfsLayout, SysfsPin};
/// use scanmate_hardware::traits::{InputPin, OutputPin};
///
/// # async fn example() -> scanmate_hardware::Result<()> {
/// let layout = SysfsLayout::default();
/// let button = SysfsPin::input(17, &layout).await?;
/// let mut led = SysfsPin::output(7, &layout).await?;
///
/// if button.read().await? {
///     led.enable().await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SysfsPin<B: SysfsBackend = OsSysfs> {
    id: u32,
    direction: Direction,
    value_file: PathBuf,
    backend: B,
}

impl SysfsPin<OsSysfs> {
    /// Export and configure `pin` as an input.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Setup`] if the pin cannot be exported or
    /// configured.
    pub async fn input(pin: u32, layout: &SysfsLayout) -> Result<Self> {
        Self::setup(pin, Direction::In, layout, OsSysfs).await
    }

    /// Export and configure `pin` as an output, initially disabled.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Setup`] if the pin cannot be exported,
    /// configured or driven low.
    pub async fn output(pin: u32, layout: &SysfsLayout) -> Result<Self> {
        Self::setup(pin, Direction::Out, layout, OsSysfs).await
    }
}

impl<B: SysfsBackend> SysfsPin<B> {
    /// Export and configure `pin` using `backend` for file access.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Setup`] if:
    /// - writing the export file fails
    /// - all [`PIN_SETUP_ATTEMPTS`] direction writes fail
    /// - forcing an output pin low fails
    pub async fn setup(
        pin: u32,
        direction: Direction,
        layout: &SysfsLayout,
        backend: B,
    ) -> Result<Self> {
        if !backend.exists(&layout.pin_dir(pin)).await {
            debug!(pin, "exporting GPIO pin");
            backend
                .write(&layout.export_file(), pin.to_string().as_bytes())
                .await
                .map_err(|e| HardwareError::setup(pin, format!("export failed: {e}")))?;
        }

        let attempts = write_direction(&backend, pin, direction, layout).await?;

        let value_file = layout.value_file(pin);
        if direction == Direction::Out {
            backend
                .write(&value_file, PIN_VALUE_LOW)
                .await
                .map_err(|e| {
                    HardwareError::setup(pin, format!("initial value write failed: {e}"))
                })?;
        }

        info!(pin, %direction, attempts, "GPIO pin ready");

        Ok(Self {
            id: pin,
            direction,
            value_file,
            backend,
        })
    }

    /// Direction the pin was configured with.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Path of the value file.
    pub fn value_file(&self) -> &Path {
        &self.value_file
    }

    async fn write_value(&self, value: &[u8]) -> Result<()> {
        self.backend
            .write(&self.value_file, value)
            .await
            .map_err(|e| HardwareError::io(self.id, e))
    }
}

/// Write the direction file until it sticks, returning the attempts used.
async fn write_direction<B: SysfsBackend>(
    backend: &B,
    pin: u32,
    direction: Direction,
    layout: &SysfsLayout,
) -> Result<u32> {
    let path = layout.direction_file(pin);
    let delay = Duration::from_millis(PIN_SETUP_RETRY_DELAY_MS);
    let mut last_error = None;

    for attempt in 1..=PIN_SETUP_ATTEMPTS {
        match backend.write(&path, direction.as_str().as_bytes()).await {
            Ok(()) => return Ok(attempt),
            Err(e) => {
                debug!(pin, attempt, error = %e, "direction write failed");
                last_error = Some(e);
            }
        }

        if attempt < PIN_SETUP_ATTEMPTS {
            tokio::time::sleep(delay).await;
        }
    }

    let reason = last_error.map_or_else(|| "no attempt made".to_string(), |e| e.to_string());
    Err(HardwareError::setup(
        pin,
        format!("direction not writable after {PIN_SETUP_ATTEMPTS} attempts: {reason}"),
    ))
}

impl<B: SysfsBackend> InputPin for SysfsPin<B> {
    fn id(&self) -> u32 {
        self.id
    }

    async fn read(&self) -> Result<bool> {
        let contents = self
            .backend
            .read(&self.value_file)
            .await
            .map_err(|e| HardwareError::io(self.id, e))?;

        Ok(contents.first() == Some(&b'1'))
    }
}

impl<B: SysfsBackend> OutputPin for SysfsPin<B> {
    async fn enable(&mut self) -> Result<()> {
        self.write_value(PIN_VALUE_HIGH).await
    }

    async fn disable(&mut self) -> Result<()> {
        self.write_value(PIN_VALUE_LOW).await
    }
}
