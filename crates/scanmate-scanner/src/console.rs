//! Capture source answered by an operator on the console.
//!
//! Used in simulation mode to walk through every workflow branch by hand:
//!
//! | Prompt | Answer | Outcome |
//! |--------|--------|---------|
//! | capture | `y` | capture error |
//! | capture | anything else | image "taken" |
//! | decode | `b` / `nobarcode` | no barcode found |
//! | decode | `f` / `fatal` | fatal decode error |
//! | decode | anything else | asks for the barcode, empty = random |

use crate::error::{CaptureError, DecodeError};
use crate::traits::CaptureSource;
use rand::Rng;
use scanmate_core::constants::SIMULATED_BARCODE_LENGTH;
use scanmate_hardware::console::ConsoleInput;
use tracing::info;

/// [`CaptureSource`] driven by console answers.
#[derive(Debug, Clone)]
pub struct ConsoleScanner {
    console: ConsoleInput,
}

impl ConsoleScanner {
    pub fn new(console: ConsoleInput) -> Self {
        Self { console }
    }

    async fn answer(&self, prompt: &str) -> Option<String> {
        info!("{prompt}");
        self.console
            .next_line()
            .await
            .map(|line| line.trim().to_string())
    }
}

impl CaptureSource for ConsoleScanner {
    async fn capture_image(&mut self) -> Result<(), CaptureError> {
        let answer = self
            .answer("Return error on capture? (y/n)")
            .await
            .ok_or_else(|| CaptureError::other("console input closed"))?;

        if answer.eq_ignore_ascii_case("y") {
            return Err(CaptureError::other("simulated capture failure"));
        }
        Ok(())
    }

    async fn decode_image(&mut self) -> Result<String, DecodeError> {
        let closed = || DecodeError::fatal("console input closed");

        let outcome = self
            .answer("Decode outcome? (b(arcode not found)/f(atal)/<enter> for success)")
            .await
            .ok_or_else(closed)?
            .to_ascii_lowercase();

        match outcome.as_str() {
            "b" | "nobarcode" => return Err(DecodeError::NotFound),
            "f" | "fatal" => return Err(DecodeError::fatal("simulated decode failure")),
            _ => {}
        }

        let barcode = self
            .answer("Enter barcode or leave empty for a random one")
            .await
            .ok_or_else(closed)?;

        if barcode.is_empty() {
            Ok(random_barcode(&mut rand::rng()))
        } else {
            Ok(barcode)
        }
    }
}

/// Random digit string shaped like an EAN-13 code (no valid check digit).
pub fn random_barcode(rng: &mut impl Rng) -> String {
    (0..SIMULATED_BARCODE_LENGTH)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}
