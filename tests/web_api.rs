use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use printpulse::simulator::noise::FixedNoise;
use printpulse::{PrinterSimulator, web};
use serde_json::{Value, json};
use tower::ServiceExt; // for .oneshot()

fn app(simulator: &PrinterSimulator) -> Router {
    web::create_router(simulator.clone())
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_status_reports_idle_printer() {
    let simulator = PrinterSimulator::with_seed(1);
    let response = app(&simulator).oneshot(get("/api/v1/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "idle");
    assert_eq!(json["status_label"], "Ready");
    assert_eq!(json["extruder_temp"], 20.0);
    assert_eq!(json["print_time_display"], "00:00:00");
    assert_eq!(json["available_commands"], json!(["start_print", "simulate_error"]));
    assert!(json.get("file_name").is_none());
}

#[tokio::test]
async fn test_start_print_with_file_name() {
    let simulator = PrinterSimulator::with_seed(2);
    let response = app(&simulator)
        .oneshot(post("/api/v1/print/start", json!({"file_name": "benchy.gcode"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "printing");
    assert_eq!(json["file_name"], "benchy.gcode");
    assert_eq!(json["progress"], 0.0);
    let target = json["extruder_target"].as_f64().unwrap();
    assert!((200.0..215.0).contains(&target));
}

#[tokio::test]
async fn test_start_print_defaults_file_name() {
    let simulator = PrinterSimulator::with_seed(3);
    let response = app(&simulator)
        .oneshot(post("/api/v1/print/start", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["file_name"], "sample_print.gcode");
}

#[tokio::test]
async fn test_start_print_accepts_bare_post() {
    let simulator = PrinterSimulator::with_seed(8);
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/print/start")
        .body(Body::empty())
        .unwrap();
    let response = app(&simulator).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "printing");
    assert_eq!(json["file_name"], "sample_print.gcode");
}

#[tokio::test]
async fn test_illegal_command_is_conflict() {
    let simulator = PrinterSimulator::with_seed(4);
    let response = app(&simulator)
        .oneshot(post("/api/v1/print/pause", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = json_body(response).await;
    assert_eq!(json["command"], "pause");
    assert_eq!(json["status"], "idle");
    assert_eq!(json["error"], "pause is not allowed while idle");
}

#[tokio::test]
async fn test_error_cycle_over_http() {
    let simulator = PrinterSimulator::with_seed(5);
    let app = app(&simulator);

    let response = app.clone().oneshot(post("/api/v1/error/simulate", json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status_label"], "Error");

    let response = app.clone().oneshot(post("/api/v1/print/start", json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.clone().oneshot(post("/api/v1/error/reset", json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "idle");
}

#[tokio::test]
async fn test_pause_resume_stop_over_http() {
    let simulator = PrinterSimulator::with_seed(6);
    let app = app(&simulator);
    simulator.start_print(None).unwrap();
    for _ in 0..3 {
        simulator.tick();
    }

    let response = app.clone().oneshot(post("/api/v1/print/pause", json!({}))).await.unwrap();
    let json = json_body(response).await;
    assert_eq!(json["status"], "paused");
    assert_eq!(json["print_time_display"], "00:00:03");

    let response = app.clone().oneshot(post("/api/v1/print/resume", json!({}))).await.unwrap();
    assert_eq!(json_body(response).await["status"], "printing");

    let response = app.clone().oneshot(post("/api/v1/print/stop", json!({}))).await.unwrap();
    let json = json_body(response).await;
    assert_eq!(json["status"], "idle");
    assert_eq!(json["print_time"], 0);
    assert_eq!(json["extruder_target"], 0.0);
}

#[tokio::test]
async fn test_history_downsampling() {
    let simulator = PrinterSimulator::with_noise(FixedNoise::new(0.5));
    for _ in 0..10 {
        simulator.tick();
    }
    let app = app(&simulator);

    let response = app.clone().oneshot(get("/api/v1/history")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json.as_array().unwrap().len(), 10);
    assert_eq!(json[0]["extruder_temp"], 20.0);
    assert!(json[0]["timestamp"].is_i64());

    let response = app.oneshot(get("/api/v1/history?max_points=5")).await.unwrap();
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_snapshot_stream_starts_with_current_value() {
    let simulator = PrinterSimulator::with_seed(7);
    simulator.start_print(Some("stream.gcode")).unwrap();
    let response = app(&simulator)
        .oneshot(get("/api/v1/events/snapshots"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    let mut body = response.into_body();
    let frame = body.frame().await.unwrap().unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(text.starts_with("event: snapshot\n"));
    assert!(text.contains("\"file_name\":\"stream.gcode\""));

    simulator.tick();
    let frame = body.frame().await.unwrap().unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(text.contains("\"print_time\":1"));
}
