//! Contains the data models for API requests and responses.

use serde::{Deserialize, Serialize};

use crate::display::{self, MAX_BED_TEMP, MAX_EXTRUDER_TEMP};
use crate::printer::{CommandKind, PrinterSnapshot, PrinterStatus};
use crate::simulator::CommandRejected;

/// Snapshot plus the derived values a dashboard renders.
#[derive(Debug, Serialize)]
pub struct PrinterStatusResponse {
    #[serde(flatten)]
    pub snapshot: PrinterSnapshot,
    pub status_label: &'static str,
    pub print_time_display: String,
    pub extruder_fill_percent: f64,
    pub bed_fill_percent: f64,
    pub available_commands: Vec<CommandKind>,
}

impl From<PrinterSnapshot> for PrinterStatusResponse {
    fn from(snapshot: PrinterSnapshot) -> Self {
        Self {
            status_label: snapshot.status.label(),
            print_time_display: display::format_print_time(snapshot.print_time),
            extruder_fill_percent: display::fill_percent(snapshot.extruder_temp, MAX_EXTRUDER_TEMP),
            bed_fill_percent: display::fill_percent(snapshot.bed_temp, MAX_BED_TEMP),
            available_commands: display::available_commands(snapshot.status),
            snapshot,
        }
    }
}

/// Body of a start-print request.
#[derive(Debug, Default, Deserialize)]
pub struct StartPrintRequest {
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub max_points: Option<usize>,
}

/// Returned with `409 Conflict` when a command is not legal right now.
#[derive(Debug, Serialize)]
pub struct CommandRejectedResponse {
    pub error: String,
    pub command: CommandKind,
    pub status: PrinterStatus,
}

impl From<CommandRejected> for CommandRejectedResponse {
    fn from(rejected: CommandRejected) -> Self {
        Self {
            error: rejected.to_string(),
            command: rejected.command,
            status: rejected.status,
        }
    }
}
