// src/display.rs - Formatting helpers for dashboards
use crate::printer::{CommandKind, PrinterStatus, TemperatureSample};

/// Gauge full-scale for the extruder (°C).
pub const MAX_EXTRUDER_TEMP: f64 = 250.0;
/// Gauge full-scale for the bed (°C).
pub const MAX_BED_TEMP: f64 = 100.0;
/// Default number of points a temperature chart draws.
pub const CHART_POINT_BUDGET: usize = 300;

/// Formats elapsed seconds as `HH:MM:SS`. Hours are not wrapped.
pub fn format_print_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Gauge fill in percent, capped at 100.
pub fn fill_percent(current: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    (current / max * 100.0).clamp(0.0, 100.0)
}

/// Thins a series for charting by keeping every n-th sample, where
/// n = len / max_points once the series exceeds the budget.
pub fn downsample(samples: &[TemperatureSample], max_points: usize) -> Vec<TemperatureSample> {
    if max_points == 0 || samples.len() <= max_points {
        return samples.to_vec();
    }
    let stride = samples.len() / max_points;
    samples.iter().step_by(stride).copied().collect()
}

/// Commands that are legal from `status`, in control-panel order.
pub fn available_commands(status: PrinterStatus) -> Vec<CommandKind> {
    CommandKind::ALL
        .into_iter()
        .filter(|command| command.permitted_from(status))
        .collect()
}
