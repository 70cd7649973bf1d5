// src/simulator/state.rs - Guarded transitions and the per-tick update
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::history::TemperatureHistory;
use super::noise::NoiseSource;
use super::thermal::{BED_PROFILE, EXTRUDER_PROFILE, Heater};
use crate::printer::{
    CommandKind, DEFAULT_FILE_NAME, PrinterCommand, PrinterSnapshot, PrinterStatus,
    TemperatureSample,
};

/// A command that is not a legal transition from the current status.
/// The state is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{command} is not allowed while {status}")]
pub struct CommandRejected {
    pub command: CommandKind,
    pub status: PrinterStatus,
}

/// What a single tick changed, for logging by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    pub print_completed: bool,
}

#[derive(Debug, Clone)]
pub struct PrinterState {
    status: PrinterStatus,
    extruder: Heater,
    bed: Heater,
    progress: f64,
    print_time: u64,
    file_name: Option<String>,
    history: TemperatureHistory,
}

impl PrinterState {
    pub fn new() -> Self {
        Self {
            status: PrinterStatus::Idle,
            extruder: Heater::new(EXTRUDER_PROFILE),
            bed: Heater::new(BED_PROFILE),
            progress: 0.0,
            print_time: 0,
            file_name: None,
            history: TemperatureHistory::new(),
        }
    }

    pub fn status(&self) -> PrinterStatus {
        self.status
    }

    pub fn extruder(&self) -> &Heater {
        &self.extruder
    }

    pub fn bed(&self) -> &Heater {
        &self.bed
    }

    pub fn history(&self) -> &TemperatureHistory {
        &self.history
    }

    pub fn snapshot(&self, timestamp: DateTime<Utc>) -> PrinterSnapshot {
        PrinterSnapshot {
            status: self.status,
            extruder_temp: round_tenth(self.extruder.current),
            extruder_target: self.extruder.target,
            bed_temp: round_tenth(self.bed.current),
            bed_target: self.bed.target,
            progress: self.progress,
            print_time: self.print_time,
            file_name: self.file_name.clone(),
            timestamp,
        }
    }

    pub fn apply(
        &mut self,
        command: PrinterCommand,
        noise: &mut dyn NoiseSource,
    ) -> Result<(), CommandRejected> {
        let kind = command.kind();
        if !kind.permitted_from(self.status) {
            return Err(CommandRejected {
                command: kind,
                status: self.status,
            });
        }

        match command {
            PrinterCommand::StartPrint { file_name } => {
                self.extruder.set_target(200.0 + (noise.unit() * 15.0).floor());
                self.bed.set_target(50.0 + (noise.unit() * 15.0).floor());
                self.file_name = Some(file_name.unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()));
                self.progress = 0.0;
                self.print_time = 0;
                self.status = PrinterStatus::Printing;
            }
            PrinterCommand::Pause => self.status = PrinterStatus::Paused,
            PrinterCommand::Resume => self.status = PrinterStatus::Printing,
            PrinterCommand::Stop => {
                self.clear_job();
                self.progress = 0.0;
                self.print_time = 0;
                self.status = PrinterStatus::Idle;
            }
            PrinterCommand::SimulateError => self.status = PrinterStatus::Error,
            PrinterCommand::ResetError => self.status = PrinterStatus::Idle,
        }
        Ok(())
    }

    /// One tick: temperatures, then progress, then a history sample.
    pub fn advance(&mut self, noise: &mut dyn NoiseSource, now: DateTime<Utc>) -> TickOutcome {
        self.extruder.step(noise);
        self.bed.step(noise);

        let mut outcome = TickOutcome::default();
        if self.status == PrinterStatus::Printing {
            self.progress += noise.between(0.05, 0.15);
            self.print_time += 1;
            if self.progress >= 100.0 {
                self.progress = 100.0;
                self.status = PrinterStatus::Idle;
                self.clear_job();
                outcome.print_completed = true;
            }
        }

        self.history.push(TemperatureSample {
            timestamp: now,
            extruder_temp: self.extruder.current,
            bed_temp: self.bed.current,
        });
        outcome
    }

    fn clear_job(&mut self) {
        self.extruder.clear_target();
        self.bed.clear_target();
        self.file_name = None;
    }
}

impl Default for PrinterState {
    fn default() -> Self {
        Self::new()
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
