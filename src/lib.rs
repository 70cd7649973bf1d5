//! PrintPulse: a simulated 3D printer with live telemetry.
//!
//! [`PrinterSimulator`] owns the device state and publishes snapshots and
//! temperature history; [`web`] exposes it over HTTP.

pub mod communication;
pub mod config;
pub mod display;
pub mod printer;
pub mod simulator;
pub mod web;

pub use communication::Subscription;
pub use printer::{
    CommandKind, DEFAULT_FILE_NAME, PrinterCommand, PrinterSnapshot, PrinterStatus,
    TemperatureSample,
};
pub use simulator::{CommandRejected, PrinterSimulator, SimulatorError};
