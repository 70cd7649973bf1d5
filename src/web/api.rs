//! Defines the Axum API routes and handlers.

use crate::display;
use crate::printer::{PrinterCommand, PrinterSnapshot, TemperatureSample};
use crate::simulator::PrinterSimulator;
use crate::web::models::{
    CommandRejectedResponse, HistoryQuery, PrinterStatusResponse, StartPrintRequest,
};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
};
use futures::Stream;
use tokio::sync::mpsc;

/// Handlers share the simulator handle directly; it is cheap to clone.
pub type AppState = PrinterSimulator;

type CommandResult =
    Result<Json<PrinterStatusResponse>, (StatusCode, Json<CommandRejectedResponse>)>;

/// Creates the Axum router with all the API endpoints.
pub fn create_router(simulator: AppState) -> Router {
    Router::new()
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/history", get(get_history))
        .route("/api/v1/print/start", post(start_print))
        .route("/api/v1/print/pause", post(pause_print))
        .route("/api/v1/print/resume", post(resume_print))
        .route("/api/v1/print/stop", post(stop_print))
        .route("/api/v1/error/simulate", post(simulate_error))
        .route("/api/v1/error/reset", post(reset_error))
        .route("/api/v1/events/snapshots", get(snapshot_events))
        .route("/api/v1/events/history", get(history_events))
        .with_state(simulator)
}

/// Handler to get the current status of the printer.
async fn get_status(State(simulator): State<AppState>) -> Json<PrinterStatusResponse> {
    Json(simulator.get_current_snapshot().into())
}

async fn get_history(
    State(simulator): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<TemperatureSample>> {
    let history = simulator.get_temperature_history();
    match query.max_points {
        Some(max_points) => Json(display::downsample(&history, max_points)),
        None => Json(history),
    }
}

/// The body is optional; a bare POST starts the default file.
async fn start_print(
    State(simulator): State<AppState>,
    payload: Option<Json<StartPrintRequest>>,
) -> CommandResult {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    run_command(&simulator, PrinterCommand::StartPrint { file_name: payload.file_name })
}

async fn pause_print(State(simulator): State<AppState>) -> CommandResult {
    run_command(&simulator, PrinterCommand::Pause)
}

async fn resume_print(State(simulator): State<AppState>) -> CommandResult {
    run_command(&simulator, PrinterCommand::Resume)
}

async fn stop_print(State(simulator): State<AppState>) -> CommandResult {
    run_command(&simulator, PrinterCommand::Stop)
}

async fn simulate_error(State(simulator): State<AppState>) -> CommandResult {
    run_command(&simulator, PrinterCommand::SimulateError)
}

async fn reset_error(State(simulator): State<AppState>) -> CommandResult {
    run_command(&simulator, PrinterCommand::ResetError)
}

fn run_command(simulator: &PrinterSimulator, command: PrinterCommand) -> CommandResult {
    match simulator.execute(command) {
        Ok(()) => Ok(Json(simulator.get_current_snapshot().into())),
        Err(rejected) => Err((StatusCode::CONFLICT, Json(rejected.into()))),
    }
}

/// Server-sent snapshot stream. The first event is the current snapshot.
async fn snapshot_events(
    State(simulator): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<PrinterSnapshot>();
    let subscription = simulator.subscribe_to_snapshots(move |snapshot| {
        let _ = tx.send(snapshot.clone());
    });
    tracing::debug!("Snapshot event stream opened");

    let stream = async_stream::stream! {
        // Dropped with the stream when the client goes away.
        let _subscription = subscription;
        while let Some(snapshot) = rx.recv().await {
            yield Event::default().event("snapshot").json_data(&snapshot);
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Server-sent history stream, optionally downsampled per event.
async fn history_events(
    State(simulator): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<TemperatureSample>>();
    let subscription = simulator.subscribe_to_history(move |history| {
        let _ = tx.send(history.clone());
    });
    tracing::debug!("History event stream opened");

    let stream = async_stream::stream! {
        let _subscription = subscription;
        while let Some(history) = rx.recv().await {
            let history = match query.max_points {
                Some(max_points) => display::downsample(&history, max_points),
                None => history,
            };
            yield Event::default().event("history").json_data(&history);
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}
