use crate::{Result, error::Error};
use std::fmt;

/// Decoded barcode (non-empty, trimmed ASCII)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Barcode(String);

impl Barcode {
    /// Create a new barcode with validation.
    ///
    /// Surrounding whitespace is removed before validation, decoders tend to
    /// print a trailing newline.
    ///
    /// # Errors
    /// Returns `Error::InvalidBarcode` if:
    /// - The barcode is empty after trimming
    /// - The barcode contains non-ASCII characters
    pub fn new(value: &str) -> Result<Self> {
        let value = value.trim();

        if value.is_empty() {
            return Err(Error::InvalidBarcode("Barcode must not be empty".to_string()));
        }

        if !value.is_ascii() {
            return Err(Error::InvalidBarcode(format!(
                "Barcode must be ASCII, got {value:?}"
            )));
        }

        Ok(Barcode(value.to_string()))
    }

    /// Get the barcode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the barcode and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Barcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Barcode::new(s)
    }
}

/// One completed button-press cycle: the authentication barcode followed by
/// the product (bottle) barcode.
///
/// Only exists while a press is handled, it is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Barcode identifying the customer.
    pub auth: Barcode,

    /// Barcode of the purchased product.
    pub product: Barcode,
}

impl Transaction {
    pub fn new(auth: Barcode, product: Barcode) -> Self {
        Self { auth, product }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "auth={} product={}", self.auth, self.product)
    }
}
