//! Enum wrappers for pin dispatch.
//!
//! Native `async fn` in traits (RPITIT - Rust Edition 2024) are not
//! object-safe, so we cannot use `Box<dyn InputPin>`. The kiosk picks its
//! pin implementation at startup (sysfs or console) and these enums provide
//! concrete type dispatch for it.
//!
//! # Examples
//!
//! ```
//! use scanmate_hardware::devices::AnyOutputPin;
//! use scanmate_hardware::console::ConsoleLed;
//! use scanmate_hardware::traits::{InputPin, OutputPin};
//!
//! #[tokio::main]
//! async fn main() -> scanmate_hardware::Result<()> {
//!     let mut led = AnyOutputPin::Console(ConsoleLed::new(7));
//!     led.enable().await?;
//!     assert!(led.read().await?);
//!     Ok(())
//! }
//! ```

use crate::Result;
use crate::console::{ConsoleButton, ConsoleLed};
use crate::gpio::SysfsPin;
use crate::mock::MockPin;
use crate::traits::{InputPin, OutputPin};

/// Enum wrapper for input pin dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyInputPin {
    /// Sysfs GPIO line.
    Sysfs(SysfsPin),

    /// Button driven from the operator console.
    Console(ConsoleButton),

    /// Mock pin for testing.
    Mock(MockPin),
}

impl InputPin for AnyInputPin {
    fn id(&self) -> u32 {
        match self {
            Self::Sysfs(pin) => pin.id(),
            Self::Console(pin) => pin.id(),
            Self::Mock(pin) => pin.id(),
        }
    }

    async fn read(&self) -> Result<bool> {
        match self {
            Self::Sysfs(pin) => pin.read().await,
            Self::Console(pin) => pin.read().await,
            Self::Mock(pin) => pin.read().await,
        }
    }
}

/// Enum wrapper for output pin dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyOutputPin {
    /// Sysfs GPIO line.
    Sysfs(SysfsPin),

    /// LED shown in the log.
    Console(ConsoleLed),

    /// Mock pin for testing.
    Mock(MockPin),
}

impl InputPin for AnyOutputPin {
    fn id(&self) -> u32 {
        match self {
            Self::Sysfs(pin) => pin.id(),
            Self::Console(pin) => pin.id(),
            Self::Mock(pin) => pin.id(),
        }
    }

    async fn read(&self) -> Result<bool> {
        match self {
            Self::Sysfs(pin) => pin.read().await,
            Self::Console(pin) => pin.read().await,
            Self::Mock(pin) => pin.read().await,
        }
    }
}

impl OutputPin for AnyOutputPin {
    async fn enable(&mut self) -> Result<()> {
        match self {
            Self::Sysfs(pin) => pin.enable().await,
            Self::Console(pin) => pin.enable().await,
            Self::Mock(pin) => pin.enable().await,
        }
    }

    async fn disable(&mut self) -> Result<()> {
        match self {
            Self::Sysfs(pin) => pin.disable().await,
            Self::Console(pin) => pin.disable().await,
            Self::Mock(pin) => pin.disable().await,
        }
    }
}
