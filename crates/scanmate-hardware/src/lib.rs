//! Hardware abstraction layer for the Scanmate kiosk.
//!
//! This crate models the kiosk's digital I/O: one push button and a
//! three-LED (red/green/blue) status indicator. Each line is a boolean pin
//! behind the [`InputPin`] / [`OutputPin`] traits, so the kiosk logic runs
//! unchanged against sysfs GPIO, the operator console, or mock pins.
//!
//! # Pins
//!
//! Physical pins are set up through the Linux sysfs GPIO interface, see
//! [`gpio`] for the export/direction/value protocol and the setup retry:
//!
//! ```no_run
//! use scanmate_hardware::gpio::{SysfsLayout, SysfsPin};
//! use scanmate_hardware::traits::InputPin;
//!
//! # async fn example() -> scanmate_hardware::Result<()> {
//! let button = SysfsPin::input(17, &SysfsLayout::default()).await?;
//! let pressed = button.read().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Indicator
//!
//! [`Indicator`] addresses the three LEDs by [`LedColor`]:
//!
//! ```no_run
//! use scanmate_hardware::{Indicator, LedColor, OutputPin};
//! use std::time::Duration;
//!
//! async fn signal_ready<O: OutputPin>(indicator: &mut Indicator<O>) -> scanmate_hardware::Result<()> {
//!     indicator.blink(LedColor::Green, Duration::from_millis(100), 3).await
//! }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] which uses the
//! [`HardwareError`] error type. Hardware errors are fatal for the kiosk.
//!
//! # Mock Implementations
//!
//! [`mock::MockPin`] records every read and write and can be scripted
//! through its handle; the kiosk tests are written against it.

pub mod console;
pub mod devices;
pub mod error;
pub mod gpio;
pub mod indicator;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::{AnyInputPin, AnyOutputPin};
pub use error::{HardwareError, Result};
pub use indicator::Indicator;
pub use traits::{Direction, InputPin, OutputPin};
pub use types::LedColor;
