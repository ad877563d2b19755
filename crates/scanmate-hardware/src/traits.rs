//! Pin capability traits.
//!
//! This module defines the contract between the kiosk logic and a digital
//! I/O line. A line is either an [`InputPin`] (button) or an [`OutputPin`]
//! (LED). Sysfs pins, console pins and mock pins all implement the same
//! capability set {read, enable, disable}, which is what makes the hardware
//! layer substitutable in tests and in simulation mode.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use std::fmt;

/// Direction of a GPIO line as written to the sysfs `direction` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Line is read by the kiosk (button).
    In,

    /// Line is driven by the kiosk (LED).
    Out,
}

impl Direction {
    /// Value written to the sysfs `direction` file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A digital line whose value can be read.
///
/// # Examples
///
/// ```no_run
/// use scanmate_hardware::traits::InputPin;
/// use scanmate_hardware::Result;
///
/// async fn wait_for_press<P: InputPin>(button: &P) -> Result<()> {
///     while !button.read().await? {
///         tokio::time::sleep(std::time::Duration::from_millis(20)).await;
///     }
///     Ok(())
/// }
/// ```
pub trait InputPin: Send + Sync {
    /// GPIO number of this line.
    fn id(&self) -> u32;

    /// Read the current value of the line.
    ///
    /// Returns `true` when the line is high (value file starts with `'1'`).
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be read. Read errors are never
    /// retried at this layer.
    async fn read(&self) -> Result<bool>;
}

/// A digital line driven by the kiosk.
pub trait OutputPin: InputPin {
    /// Drive the line high.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    async fn enable(&mut self) -> Result<()>;

    /// Drive the line low.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    async fn disable(&mut self) -> Result<()>;

    /// Drive the line to `high`, dispatching to [`enable`](Self::enable) or
    /// [`disable`](Self::disable).
    async fn set(&mut self, high: bool) -> Result<()> {
        if high {
            self.enable().await
        } else {
            self.disable().await
        }
    }
}
