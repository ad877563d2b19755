//! Scanmate kiosk logic.
//!
//! This crate contains the capture-retry workflow, its state machine and
//! the event loop tying a button, an RGB indicator and a capture source
//! together. It is hardware agnostic: everything is generic over the
//! [`scanmate_hardware`] pin traits and [`scanmate_scanner::CaptureSource`].

pub mod board;
pub mod config;
pub mod error;
pub mod kiosk;
pub mod shutdown;
pub mod state_machine;
pub mod workflow;

pub use board::Board;
pub use config::KioskConfig;
pub use error::{KioskError, WorkflowError};
pub use kiosk::{Kiosk, KioskSettings};
pub use shutdown::ShutdownSignal;
pub use state_machine::{ScanMachine, ScanState, StateTransition};
pub use workflow::{CaptureWorkflow, WorkflowSettings};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
