/// Integration tests for the transport client and controller against a live
/// local HTTP server.
///
/// Each test spawns a `tiny_http` server on an ephemeral port in a background
/// thread. The server answers a scripted list of responses, records what it
/// received, then waits briefly for any unexpected extra request so tests can
/// assert that no call was made.
use std::io::Read;
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cloudcost::api::{AnalysisService, ApiClient, ApiError, Endpoint};
use cloudcost::controller::{ActionError, ActionKind, Controller, DisplayState, SelectedFile};
use cloudcost::history::HistoryLog;
use serde_json::json;
use tiny_http::{Header, Response, Server, StatusCode};

/// What the mock server saw for one request.
#[derive(Debug)]
struct Captured {
    method: String,
    url: String,
    content_type: String,
    body: Vec<u8>,
}

struct MockService {
    base_url: String,
    handle: JoinHandle<Vec<Captured>>,
}

impl MockService {
    /// Serve `replies` in order, one per request.
    fn start(replies: Vec<(u16, &'static str)>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let base_url = format!("http://{addr}");

        let handle = thread::spawn(move || {
            let mut captured = Vec::new();
            for (status, body) in replies {
                let Ok(Some(request)) = server.recv_timeout(Duration::from_secs(10)) else {
                    break;
                };
                captured.push(answer(request, status, body));
            }
            // Anything beyond the script is recorded as unexpected.
            while let Ok(Some(request)) = server.recv_timeout(Duration::from_millis(150)) {
                captured.push(answer(request, 599, ""));
            }
            captured
        });

        Self { base_url, handle }
    }

    fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url, Some(Duration::from_secs(10)))
    }

    fn finish(self) -> Vec<Captured> {
        self.handle.join().unwrap()
    }
}

fn answer(mut request: tiny_http::Request, status: u16, body: &str) -> Captured {
    let mut received = Vec::new();
    request.as_reader().read_to_end(&mut received).unwrap();
    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.to_string())
        .unwrap_or_default();
    let captured = Captured {
        method: request.method().to_string(),
        url: request.url().to_string(),
        content_type,
        body: received,
    };

    let header = Header::from_bytes("Content-Type", "application/json").unwrap();
    let response = Response::from_string(body)
        .with_header(header)
        .with_status_code(StatusCode(status));
    request.respond(response).unwrap();
    captured
}

fn usage_csv() -> SelectedFile {
    SelectedFile::new(
        "usage.csv",
        b"timestamp,cpu,memory,cost\n2024-01-15T00:00:00,12.5,40,1.20\n".to_vec(),
    )
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[test]
fn uploads_multipart_file_field_and_parses_object() {
    let mock = MockService::start(vec![(200, r#"{"cost_predictions": {"trend": "rising"}}"#)]);
    let payload = mock
        .client()
        .analyze(Endpoint::PredictCost, &usage_csv())
        .unwrap();
    let captured = mock.finish();

    assert_eq!(payload["cost_predictions"]["trend"], json!("rising"));
    assert_eq!(captured.len(), 1);
    let req = &captured[0];
    assert_eq!(req.method, "POST");
    assert_eq!(req.url, "/predict-cost");
    assert!(req.content_type.starts_with("multipart/form-data; boundary="));

    let body = String::from_utf8_lossy(&req.body);
    assert!(body.contains("Content-Disposition: form-data; name=\"file\"; filename=\"usage.csv\""));
    assert!(body.contains("Content-Type: text/csv"));
    assert!(body.contains("2024-01-15T00:00:00,12.5,40,1.20"));
}

#[test]
fn detect_waste_hits_its_own_path() {
    let mock = MockService::start(vec![(200, "{}")]);
    mock.client()
        .analyze(Endpoint::DetectWaste, &usage_csv())
        .unwrap();
    assert_eq!(mock.finish()[0].url, "/detect-waste");
}

#[test]
fn error_body_is_surfaced_verbatim() {
    let mock = MockService::start(vec![(500, "model unavailable")]);
    let err = mock
        .client()
        .analyze(Endpoint::PredictCost, &usage_csv())
        .unwrap_err();
    mock.finish();

    assert_eq!(err, ApiError::Request("model unavailable".to_string()));
    assert_eq!(err.to_string(), "model unavailable");
}

#[test]
fn empty_error_body_falls_back_to_request_failed() {
    let mock = MockService::start(vec![(500, "")]);
    let err = mock
        .client()
        .analyze(Endpoint::DetectWaste, &usage_csv())
        .unwrap_err();
    mock.finish();

    assert_eq!(err.to_string(), "Request failed");
}

#[test]
fn non_json_success_is_a_parse_error() {
    let mock = MockService::start(vec![(200, "<html>oops</html>"), (200, "[1, 2]")]);
    let client = mock.client();
    let first = client
        .analyze(Endpoint::PredictCost, &usage_csv())
        .unwrap_err();
    let second = client
        .analyze(Endpoint::PredictCost, &usage_csv())
        .unwrap_err();
    mock.finish();

    assert!(matches!(first, ApiError::Parse(ref m) if !m.is_empty()));
    assert!(matches!(second, ApiError::Parse(_)));
}

#[test]
fn unreachable_service_is_a_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = ApiClient::new(&format!("http://127.0.0.1:{port}"), Some(Duration::from_secs(5)));
    let err = client
        .analyze(Endpoint::PredictCost, &usage_csv())
        .unwrap_err();

    assert!(matches!(err, ApiError::Network(ref m) if !m.is_empty()));
}

#[test]
fn trailing_slash_in_base_url_is_ignored() {
    let mock = MockService::start(vec![(200, "{}")]);
    let client = ApiClient::new(&format!("{}/", mock.base_url), None);
    client
        .analyze(Endpoint::PredictCost, &usage_csv())
        .unwrap();
    assert_eq!(mock.finish()[0].url, "/predict-cost");
}

// ---------------------------------------------------------------------------
// Controller over HTTP
// ---------------------------------------------------------------------------

#[test]
fn no_file_makes_no_network_call() {
    let mock = MockService::start(Vec::new());
    let controller = Controller::new(mock.client());
    let err = controller.run_action(ActionKind::Predict).unwrap_err();

    assert_eq!(err, ActionError::NoFile);
    assert_eq!(
        controller.display(),
        DisplayState::Error("Please upload a CSV file first".to_string())
    );
    assert!(mock.finish().is_empty());
}

#[test]
fn server_error_becomes_controller_error_state() {
    let mock = MockService::start(vec![(500, "model unavailable")]);
    let controller = Controller::new(mock.client());
    controller.select_file(Some(usage_csv()));
    controller.run_action(ActionKind::Waste).unwrap_err();
    mock.finish();

    let snap = controller.snapshot();
    assert_eq!(snap.error.as_deref(), Some("model unavailable"));
    assert_eq!(snap.result, None);
    assert!(!snap.loading);
}

#[test]
fn success_is_tagged_and_logged_to_history() {
    let dir = tempfile::tempdir().unwrap();
    let log = HistoryLog::new(dir.path().join("history.jsonl"));

    let mock = MockService::start(vec![
        (200, r#"{"waste_analysis": {"estimated_monthly_savings": 42}}"#),
        (503, "down for maintenance"),
    ]);
    let controller = Controller::new(mock.client()).with_history(log.clone());
    controller.select_file(Some(usage_csv()));

    let result = controller.run_action(ActionKind::Waste).unwrap();
    assert_eq!(result.payload["action"], json!("waste"));
    let keys: Vec<&String> = result.payload.keys().collect();
    assert_eq!(keys, ["waste_analysis", "action"]);

    controller.run_action(ActionKind::Predict).unwrap_err();
    mock.finish();

    let entries = log.read_all();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, "waste");
    assert_eq!(entries[0].file, "usage.csv");
    assert!(entries[0].success);
    assert_eq!(entries[1].action, "predict");
    assert!(!entries[1].success);
    assert_eq!(entries[1].error.as_deref(), Some("down for maintenance"));
}
