use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid barcode: {0}")]
    InvalidBarcode(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
