//! Capture source trait definition.
//!
//! The kiosk core never looks at how an image is produced or decoded. It
//! calls [`CaptureSource::capture_image`] and then
//! [`CaptureSource::decode_image`] and branches on the outcome.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::{CaptureError, DecodeError};

/// Producer of barcode readings from still images.
///
/// # Examples
///
/// ```no_run
/// use scanmate_scanner::{CaptureSource, DecodeError};
///
/// async fn scan_once<S: CaptureSource>(source: &mut S) -> Option<String> {
///     source.capture_image().await.ok()?;
///     match source.decode_image().await {
///         Ok(barcode) => Some(barcode),
///         Err(DecodeError::NotFound) => None,
///         Err(DecodeError::Fatal { .. }) => None,
///     }
/// }
/// ```
pub trait CaptureSource: Send + Sync {
    /// Take a fresh still image at the well-known image location.
    ///
    /// # Errors
    ///
    /// Returns a [`CaptureError`] if no image could be produced.
    async fn capture_image(&mut self) -> Result<(), CaptureError>;

    /// Extract a barcode from the most recent image.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::NotFound`] if the image holds no readable
    /// barcode, [`DecodeError::Fatal`] on any other failure.
    async fn decode_image(&mut self) -> Result<String, DecodeError>;
}
