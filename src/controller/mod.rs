//! Upload/interaction controller.
//!
//! Owns the selected CSV file and the mutually exclusive loading / error /
//! result state, and dispatches `predict` or `waste` actions to an
//! [`AnalysisService`].
//!
//! State lives behind a `Mutex` so a controller can be shared between
//! callers. The lock is only held for state transitions, never across the
//! network call. A second [`Controller::run_action`] while one is in flight
//! is rejected with [`ActionError::Busy`] and leaves the state untouched:
//! the first action always wins.

mod file;

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::api::{AnalysisService, ApiError, Endpoint};
use crate::history::{HistoryEntry, HistoryLog};

pub use file::{SelectedFile, has_csv_extension};

/// Shown when an action is triggered before any file was chosen.
pub const NO_FILE_MESSAGE: &str = "Please upload a CSV file first";
/// Shown when a failure carries no message of its own.
pub const FALLBACK_ERROR: &str = "An error occurred";

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The two user-triggerable analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Predict,
    Waste,
}

impl ActionKind {
    /// Tag stored in the result's `action` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Predict => "predict",
            Self::Waste => "waste",
        }
    }

    pub fn endpoint(self) -> Endpoint {
        match self {
            Self::Predict => Endpoint::PredictCost,
            Self::Waste => Endpoint::DetectWaste,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Results and errors
// ---------------------------------------------------------------------------

/// A successful analysis, tagged with the action that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub action: ActionKind,
    /// The service's JSON object plus the `action` tag.
    pub payload: Map<String, Value>,
    pub completed_at: DateTime<Local>,
}

impl AnalysisResult {
    /// Tag a service payload with `action`. An existing `action` key is
    /// overwritten in place.
    pub fn new(action: ActionKind, mut payload: Map<String, Value>, completed_at: DateTime<Local>) -> Self {
        payload.insert("action".to_string(), Value::String(action.as_str().to_string()));
        Self {
            action,
            payload,
            completed_at,
        }
    }

    /// Two-space indented JSON of the tagged payload.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.payload)
    }
}

/// Why an action did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Please upload a CSV file first")]
    NoFile,
    #[error("An analysis is already in progress")]
    Busy,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ActionError {
    /// Message suitable for the error panel.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.is_empty() {
            FALLBACK_ERROR.to_string()
        } else {
            message
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct State {
    file: Option<SelectedFile>,
    loading: bool,
    error: Option<String>,
    result: Option<AnalysisResult>,
}

/// Point-in-time copy of the controller state.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSnapshot {
    pub file_name: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub result: Option<AnalysisResult>,
}

/// What the results area shows. Loading wins over everything else.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    Loading,
    Error(String),
    Result(AnalysisResult),
    Empty,
}

impl ControllerSnapshot {
    /// Whether an action may be triggered right now.
    pub fn can_run(&self) -> bool {
        self.file_name.is_some() && !self.loading
    }

    pub fn display(&self) -> DisplayState {
        if self.loading {
            DisplayState::Loading
        } else if let Some(ref error) = self.error {
            DisplayState::Error(error.clone())
        } else if let Some(ref result) = self.result {
            DisplayState::Result(result.clone())
        } else {
            DisplayState::Empty
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct Controller<S> {
    service: S,
    state: Mutex<State>,
    history: Option<HistoryLog>,
}

impl<S: AnalysisService> Controller<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: Mutex::new(State::default()),
            history: None,
        }
    }

    /// Record every completed action to `history`.
    pub fn with_history(mut self, history: HistoryLog) -> Self {
        self.history = Some(history);
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Store a newly chosen file. `None` (a cancelled picker) is a no-op.
    pub fn select_file(&self, candidate: Option<SelectedFile>) {
        let Some(file) = candidate else {
            return;
        };
        let mut state = self.lock();
        state.file = Some(file);
        state.error = None;
        state.result = None;
    }

    /// Run an analysis on the selected file.
    ///
    /// The outcome is both stored in the controller and returned. A
    /// [`ActionError::Busy`] rejection is only returned.
    pub fn run_action(&self, kind: ActionKind) -> Result<AnalysisResult, ActionError> {
        let file = {
            let mut state = self.lock();
            if state.loading {
                return Err(ActionError::Busy);
            }
            let Some(file) = state.file.clone() else {
                state.error = Some(NO_FILE_MESSAGE.to_string());
                state.result = None;
                return Err(ActionError::NoFile);
            };
            state.loading = true;
            state.error = None;
            state.result = None;
            file
        };

        let started = Instant::now();
        let outcome = self
            .service
            .analyze(kind.endpoint(), &file)
            .map(|payload| AnalysisResult::new(kind, payload, Local::now()))
            .map_err(ActionError::from);
        let latency_ms = started.elapsed().as_millis() as u64;

        {
            let mut state = self.lock();
            state.loading = false;
            match outcome {
                Ok(ref result) => {
                    state.error = None;
                    state.result = Some(result.clone());
                }
                Err(ref err) => {
                    state.result = None;
                    state.error = Some(err.user_message());
                }
            }
        }

        if let Some(ref history) = self.history {
            let error = outcome.as_ref().err().map(ActionError::user_message);
            history.append(&HistoryEntry::new(kind, file.name(), latency_ms, error));
        }

        outcome
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        let state = self.lock();
        ControllerSnapshot {
            file_name: state.file.as_ref().map(|f| f.name().to_string()),
            loading: state.loading,
            error: state.error.clone(),
            result: state.result.clone(),
        }
    }

    pub fn display(&self) -> DisplayState {
        self.snapshot().display()
    }

    /// The currently held result, if any.
    pub fn result(&self) -> Option<AnalysisResult> {
        self.lock().result.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::thread;

    struct Canned {
        calls: AtomicUsize,
        reply: Result<Value, ApiError>,
    }

    impl Canned {
        fn ok(value: Value) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Ok(value),
            }
        }

        fn err(err: ApiError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Err(err),
            }
        }
    }

    impl AnalysisService for Canned {
        fn analyze(&self, _endpoint: Endpoint, _file: &SelectedFile) -> Result<Map<String, Value>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply.clone()? {
                Value::Object(map) => Ok(map),
                _ => Err(ApiError::Parse("not an object".to_string())),
            }
        }
    }

    fn csv() -> SelectedFile {
        SelectedFile::new("usage.csv", b"timestamp,cost\n".to_vec())
    }

    #[test]
    fn no_file_sets_error_without_calling_service() {
        let controller = Controller::new(Canned::ok(json!({})));
        let err = controller.run_action(ActionKind::Predict).unwrap_err();

        assert_eq!(err, ActionError::NoFile);
        assert_eq!(controller.service().calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            controller.display(),
            DisplayState::Error("Please upload a CSV file first".to_string())
        );
    }

    #[test]
    fn success_tags_result_with_action() {
        let controller = Controller::new(Canned::ok(json!({"waste_analysis": {}})));
        controller.select_file(Some(csv()));
        let result = controller.run_action(ActionKind::Waste).unwrap();

        assert_eq!(result.action, ActionKind::Waste);
        assert_eq!(result.payload["action"], json!("waste"));
        let snap = controller.snapshot();
        assert!(!snap.loading);
        assert_eq!(snap.error, None);
        assert_eq!(snap.file_name.as_deref(), Some("usage.csv"));
        assert!(matches!(snap.display(), DisplayState::Result(_)));
    }

    #[test]
    fn failure_clears_result_and_surfaces_message() {
        let controller = Controller::new(Canned::err(ApiError::Request(
            "model unavailable".to_string(),
        )));
        controller.select_file(Some(csv()));
        let err = controller.run_action(ActionKind::Predict).unwrap_err();

        assert_eq!(err.user_message(), "model unavailable");
        let snap = controller.snapshot();
        assert_eq!(snap.error.as_deref(), Some("model unavailable"));
        assert_eq!(snap.result, None);
        assert!(!snap.loading);
    }

    #[test]
    fn empty_failure_message_falls_back() {
        let controller = Controller::new(Canned::err(ApiError::Network(String::new())));
        controller.select_file(Some(csv()));
        let _ = controller.run_action(ActionKind::Predict);
        assert_eq!(controller.snapshot().error.as_deref(), Some("An error occurred"));
    }

    #[test]
    fn selecting_a_file_clears_error_and_result() {
        let controller = Controller::new(Canned::ok(json!({})));
        let _ = controller.run_action(ActionKind::Predict);
        assert!(controller.snapshot().error.is_some());

        controller.select_file(Some(csv()));
        assert_eq!(controller.snapshot().error, None);

        controller.run_action(ActionKind::Predict).unwrap();
        controller.select_file(Some(SelectedFile::new("other.csv", Vec::<u8>::new())));
        assert_eq!(controller.result(), None);
    }

    #[test]
    fn cancelled_selection_is_a_no_op() {
        let controller = Controller::new(Canned::ok(json!({})));
        controller.select_file(Some(csv()));
        controller.select_file(None);
        assert_eq!(controller.snapshot().file_name.as_deref(), Some("usage.csv"));
    }

    #[test]
    fn busy_controller_rejects_reentry_without_touching_state() {
        let controller = Controller::new(Canned::ok(json!({})));
        controller.select_file(Some(csv()));
        controller.lock().loading = true;

        assert!(!controller.snapshot().can_run());
        assert_eq!(controller.run_action(ActionKind::Waste), Err(ActionError::Busy));
        assert_eq!(controller.service().calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.display(), DisplayState::Loading);
    }

    /// Blocks inside `analyze` until the test releases it.
    struct Gated {
        calls: AtomicUsize,
        entered: Mutex<Sender<()>>,
        release: Mutex<Receiver<()>>,
    }

    impl AnalysisService for Gated {
        fn analyze(&self, _endpoint: Endpoint, _file: &SelectedFile) -> Result<Map<String, Value>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _ = self.entered.lock().unwrap().send(());
            let _ = self.release.lock().unwrap().recv();
            let Value::Object(map) = json!({"cost_predictions": {"trend": "rising"}}) else {
                unreachable!();
            };
            Ok(map)
        }
    }

    #[test]
    fn second_action_from_another_thread_is_rejected_while_first_runs() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let controller = Controller::new(Gated {
            calls: AtomicUsize::new(0),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        });
        controller.select_file(Some(csv()));

        thread::scope(|scope| {
            let first = scope.spawn(|| controller.run_action(ActionKind::Predict));
            entered_rx.recv().unwrap();

            let snap = controller.snapshot();
            assert!(snap.loading);
            assert!(!snap.can_run());

            let second = scope
                .spawn(|| controller.run_action(ActionKind::Waste))
                .join()
                .unwrap();
            assert_eq!(second, Err(ActionError::Busy));
            assert_eq!(controller.display(), DisplayState::Loading);

            release_tx.send(()).unwrap();
            let result = first.join().unwrap().unwrap();
            assert_eq!(result.action, ActionKind::Predict);
        });

        assert_eq!(controller.service().calls.load(Ordering::SeqCst), 1);
        let snap = controller.snapshot();
        assert!(!snap.loading);
        assert!(snap.can_run());
        assert_eq!(
            snap.result.map(|r| r.payload["action"].clone()),
            Some(json!("predict"))
        );
    }

    #[test]
    fn can_run_requires_a_file() {
        let controller = Controller::new(Canned::ok(json!({})));
        assert!(!controller.snapshot().can_run());
        controller.select_file(Some(csv()));
        assert!(controller.snapshot().can_run());
    }

    #[test]
    fn existing_action_key_is_overwritten_in_place() {
        let mut payload = Map::new();
        payload.insert("action".to_string(), json!("other"));
        payload.insert("x".to_string(), json!(1));
        let result = AnalysisResult::new(ActionKind::Predict, payload, Local::now());
        let keys: Vec<&String> = result.payload.keys().collect();
        assert_eq!(keys, ["action", "x"]);
        assert_eq!(result.payload["action"], json!("predict"));
    }
}
