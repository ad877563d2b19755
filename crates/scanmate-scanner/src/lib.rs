//! Barcode capture sources for the Scanmate kiosk.
//!
//! A capture source takes a still image and decodes a barcode from it. The
//! kiosk core only depends on the [`CaptureSource`] trait and its three-way
//! decode outcome (barcode, [`DecodeError::NotFound`], [`DecodeError::Fatal`]).
//!
//! Implementations:
//!
//! - [`CommandScanner`]: `raspistill` + `zbarimg` on the kiosk.
//! - [`console::ConsoleScanner`]: operator answers prompts on stdin.
//! - [`mock::MockScanner`]: scripted outcomes for tests.

pub mod command;
pub mod console;
pub mod devices;
pub mod error;
pub mod mock;
pub mod traits;

pub use command::{CommandScanner, ToolCommand};
pub use devices::AnyCaptureSource;
pub use error::{CaptureError, DecodeError};
pub use traits::CaptureSource;
