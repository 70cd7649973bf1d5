//! # Printer Simulator
//!
//! Owns the simulated device: status, heater trajectories, print progress
//! and a rolling temperature log. A 1 Hz ticker advances the physics and
//! pushes fresh values to subscribers; commands are guarded transitions
//! applied immediately.
//!
//! ```no_run
//! use printpulse::PrinterSimulator;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let simulator = PrinterSimulator::new();
//! let _sub = simulator.subscribe_to_snapshots(|snapshot| {
//!     println!("{} {:.1}%", snapshot.status, snapshot.progress);
//! });
//! simulator.start_simulation()?;
//! simulator.start_print(Some("benchy.gcode"))?;
//! # Ok(())
//! # }
//! ```

pub mod history;
pub mod noise;
pub mod state;
pub mod thermal;

use chrono::Utc;
use parking_lot::{Mutex, ReentrantMutex};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::communication::{ObserverRegistry, Subscription};
use crate::printer::{PrinterCommand, PrinterSnapshot, PrinterStatus, TemperatureSample};
use self::noise::{NoiseSource, RngNoise};
use self::state::PrinterState;

pub use self::state::CommandRejected;

/// Period of the simulation tick.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("no Tokio runtime available to drive the simulation tick")]
    NoRuntime,
}

/// Cloneable handle to one simulated printer. Clones share state.
#[derive(Clone)]
pub struct PrinterSimulator {
    shared: Arc<Shared>,
}

struct Shared {
    // Serializes deliveries across threads; re-entrant so listeners can
    // issue commands from inside a callback.
    delivery: ReentrantMutex<()>,
    core: Mutex<Core>,
    snapshot_observers: ObserverRegistry<PrinterSnapshot>,
    history_observers: ObserverRegistry<Vec<TemperatureSample>>,
    ticker: Mutex<Option<Ticker>>,
}

struct Core {
    state: PrinterState,
    noise: Box<dyn NoiseSource>,
}

struct Ticker {
    shutdown_tx: broadcast::Sender<()>,
    _task: JoinHandle<()>,
}

impl PrinterSimulator {
    /// Simulator with an entropy-seeded random source.
    pub fn new() -> Self {
        Self::with_noise(RngNoise::from_entropy())
    }

    /// Simulator whose trajectories are reproducible for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_noise(RngNoise::seeded(seed))
    }

    pub fn with_noise(noise: impl NoiseSource + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                delivery: ReentrantMutex::new(()),
                core: Mutex::new(Core {
                    state: PrinterState::new(),
                    noise: Box::new(noise),
                }),
                snapshot_observers: ObserverRegistry::new(),
                history_observers: ObserverRegistry::new(),
                ticker: Mutex::new(None),
            }),
        }
    }

    // --- Queries ---

    pub fn get_current_snapshot(&self) -> PrinterSnapshot {
        self.shared.core.lock().state.snapshot(Utc::now())
    }

    /// Owned copy of the temperature log, oldest first.
    pub fn get_temperature_history(&self) -> Vec<TemperatureSample> {
        self.shared.core.lock().state.history().to_vec()
    }

    pub fn status(&self) -> PrinterStatus {
        self.shared.core.lock().state.status()
    }

    /// Whether the periodic tick is running.
    pub fn is_running(&self) -> bool {
        self.shared.ticker.lock().is_some()
    }

    // --- Subscriptions ---

    /// Calls `listener` with the current snapshot, then on every command
    /// and tick until the returned handle is dropped.
    pub fn subscribe_to_snapshots<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&PrinterSnapshot) + Send + Sync + 'static,
    {
        let _delivery = self.shared.delivery.lock();
        listener(&self.get_current_snapshot());
        self.shared.snapshot_observers.register(Arc::new(listener))
    }

    /// Calls `listener` with the current history, then after every tick.
    pub fn subscribe_to_history<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Vec<TemperatureSample>) + Send + Sync + 'static,
    {
        let _delivery = self.shared.delivery.lock();
        listener(&self.get_temperature_history());
        self.shared.history_observers.register(Arc::new(listener))
    }

    // --- Tick ---

    /// Starts the 1 Hz tick on the current Tokio runtime. Calling it again
    /// while running does nothing.
    pub fn start_simulation(&self) -> Result<(), SimulatorError> {
        let mut ticker = self.shared.ticker.lock();
        if ticker.is_some() {
            return Ok(());
        }
        let runtime = Handle::try_current().map_err(|_| SimulatorError::NoRuntime)?;

        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
        let weak = Arc::downgrade(&self.shared);
        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => {
                        tracing::debug!("Simulation tick loop shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let Some(shared) = weak.upgrade() else {
                            break;
                        };
                        PrinterSimulator { shared }.tick();
                    }
                }
            }
        });

        *ticker = Some(Ticker {
            shutdown_tx,
            _task: task,
        });
        tracing::info!("Simulation started ({} ms tick)", TICK_PERIOD.as_millis());
        Ok(())
    }

    /// Stops the tick. A tick already in progress finishes; no further
    /// ticks run. Calling it while stopped does nothing.
    pub fn stop_simulation(&self) {
        if let Some(ticker) = self.shared.ticker.lock().take() {
            let _ = ticker.shutdown_tx.send(());
            tracing::info!("Simulation stopped");
        }
    }

    /// Runs one tick immediately: temperatures, progress, history
    /// (history subscribers notified), then a snapshot notification.
    pub fn tick(&self) {
        let _delivery = self.shared.delivery.lock();
        let (snapshot, history, outcome) = {
            let mut core = self.shared.core.lock();
            let Core { state, noise } = &mut *core;
            let now = Utc::now();
            let outcome = state.advance(noise.as_mut(), now);
            let history = if self.shared.history_observers.is_empty() {
                None
            } else {
                Some(state.history().to_vec())
            };
            (state.snapshot(now), history, outcome)
        };

        if outcome.print_completed {
            tracing::info!("Print completed after {}s", snapshot.print_time);
        }
        if let Some(history) = history {
            self.shared.history_observers.notify(&history);
        }
        self.shared.snapshot_observers.notify(&snapshot);
    }

    // --- Commands ---

    /// Applies `command` if it is legal from the current status and pushes
    /// the resulting snapshot. A rejected command changes nothing and
    /// notifies nobody.
    pub fn execute(&self, command: PrinterCommand) -> Result<(), CommandRejected> {
        let _delivery = self.shared.delivery.lock();
        let kind = command.kind();
        let snapshot = {
            let mut core = self.shared.core.lock();
            let Core { state, noise } = &mut *core;
            if let Err(rejected) = state.apply(command, noise.as_mut()) {
                tracing::debug!("Ignoring command: {}", rejected);
                return Err(rejected);
            }
            state.snapshot(Utc::now())
        };

        tracing::info!("Command {} applied, printer is {}", kind, snapshot.status);
        self.shared.snapshot_observers.notify(&snapshot);
        Ok(())
    }

    /// Legal unless printing or in error. `None` uses the default file name.
    pub fn start_print(&self, file_name: Option<&str>) -> Result<(), CommandRejected> {
        self.execute(PrinterCommand::StartPrint {
            file_name: file_name.map(str::to_string),
        })
    }

    pub fn pause_print(&self) -> Result<(), CommandRejected> {
        self.execute(PrinterCommand::Pause)
    }

    pub fn resume_print(&self) -> Result<(), CommandRejected> {
        self.execute(PrinterCommand::Resume)
    }

    pub fn stop_print(&self) -> Result<(), CommandRejected> {
        self.execute(PrinterCommand::Stop)
    }

    pub fn simulate_error(&self) -> Result<(), CommandRejected> {
        self.execute(PrinterCommand::SimulateError)
    }

    pub fn reset_error(&self) -> Result<(), CommandRejected> {
        self.execute(PrinterCommand::ResetError)
    }
}

impl Default for PrinterSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PrinterSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrinterSimulator")
            .field("status", &self.status())
            .field("running", &self.is_running())
            .field("snapshot_observers", &self.shared.snapshot_observers.len())
            .field("history_observers", &self.shared.history_observers.len())
            .finish()
    }
}
