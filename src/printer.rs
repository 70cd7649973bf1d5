// src/printer.rs - Observable printer data model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Device status. Exactly one holds at a time and it decides which
/// commands are legal and what a tick does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterStatus {
    #[default]
    Idle,
    Printing,
    Paused,
    Error,
}

impl PrinterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrinterStatus::Idle => "idle",
            PrinterStatus::Printing => "printing",
            PrinterStatus::Paused => "paused",
            PrinterStatus::Error => "error",
        }
    }

    /// Human-facing label used by dashboards.
    pub fn label(&self) -> &'static str {
        match self {
            PrinterStatus::Idle => "Ready",
            PrinterStatus::Printing => "Printing",
            PrinterStatus::Paused => "Paused",
            PrinterStatus::Error => "Error",
        }
    }

    /// `true` while a job is loaded (running or held).
    pub fn has_active_job(&self) -> bool {
        matches!(self, PrinterStatus::Printing | PrinterStatus::Paused)
    }
}

impl fmt::Display for PrinterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of every printer field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterSnapshot {
    pub status: PrinterStatus,
    /// Rounded to one decimal place.
    pub extruder_temp: f64,
    pub extruder_target: f64,
    /// Rounded to one decimal place.
    pub bed_temp: f64,
    pub bed_target: f64,
    /// Percent complete, 0..=100.
    pub progress: f64,
    /// Elapsed print time in whole seconds.
    pub print_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// One entry of the rolling temperature log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSample {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub extruder_temp: f64,
    pub bed_temp: f64,
}

/// Payload-free command identifier, used for legality checks and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    StartPrint,
    Pause,
    Resume,
    Stop,
    SimulateError,
    ResetError,
}

impl CommandKind {
    /// Every command, in control-panel order.
    pub const ALL: [CommandKind; 6] = [
        CommandKind::StartPrint,
        CommandKind::Pause,
        CommandKind::Resume,
        CommandKind::Stop,
        CommandKind::SimulateError,
        CommandKind::ResetError,
    ];

    /// Transition guard: whether this command is legal from `status`.
    pub fn permitted_from(self, status: PrinterStatus) -> bool {
        match self {
            CommandKind::StartPrint => {
                matches!(status, PrinterStatus::Idle | PrinterStatus::Paused)
            }
            CommandKind::Pause => status == PrinterStatus::Printing,
            CommandKind::Resume => status == PrinterStatus::Paused,
            CommandKind::Stop => status.has_active_job(),
            CommandKind::SimulateError => true,
            CommandKind::ResetError => status == PrinterStatus::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::StartPrint => "start_print",
            CommandKind::Pause => "pause",
            CommandKind::Resume => "resume",
            CommandKind::Stop => "stop",
            CommandKind::SimulateError => "simulate_error",
            CommandKind::ResetError => "reset_error",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A control command issued against the printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterCommand {
    /// `None` falls back to [`DEFAULT_FILE_NAME`].
    StartPrint { file_name: Option<String> },
    Pause,
    Resume,
    Stop,
    SimulateError,
    ResetError,
}

/// File name used when a print is started without one.
pub const DEFAULT_FILE_NAME: &str = "sample_print.gcode";

impl PrinterCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            PrinterCommand::StartPrint { .. } => CommandKind::StartPrint,
            PrinterCommand::Pause => CommandKind::Pause,
            PrinterCommand::Resume => CommandKind::Resume,
            PrinterCommand::Stop => CommandKind::Stop,
            PrinterCommand::SimulateError => CommandKind::SimulateError,
            PrinterCommand::ResetError => CommandKind::ResetError,
        }
    }
}
