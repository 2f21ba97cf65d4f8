//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns a [`Reply`] that
//! the server loop turns into a `tiny_http` response.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tiny_http::{Header, Response, StatusCode};

use crate::api::AnalysisService;
use crate::controller::{
    ActionError, ActionKind, Controller, DisplayState, SelectedFile, has_csv_extension,
};
use crate::export;
use crate::render::{self, ResultView};

/// Returned by `POST /api/upload` for anything but a `.csv` name.
pub const NOT_A_CSV: &str = "Please select a CSV file";

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// A fully built response, independent of the socket it goes out on.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// Download file name, sent as `Content-Disposition: attachment`.
    pub attachment: Option<String>,
}

impl Reply {
    pub fn html(html: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: html.as_bytes().to_vec(),
            attachment: None,
        }
    }

    pub fn json<T: Serialize>(status: u16, data: &T) -> Result<Self> {
        let body = serde_json::to_vec(data).context("failed to serialize JSON response")?;
        Ok(Self {
            status,
            content_type: "application/json; charset=utf-8",
            body,
            attachment: None,
        })
    }

    /// `{"error": message}` with the given status.
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self {
            status,
            content_type: "application/json; charset=utf-8",
            body: body.into_bytes(),
            attachment: None,
        }
    }

    pub fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let mut response = Response::from_data(self.body).with_status_code(StatusCode(self.status));
        if let Ok(header) = Header::from_bytes("Content-Type", self.content_type) {
            response.add_header(header);
        }
        if let Some(name) = self.attachment {
            let value = format!("attachment; filename=\"{name}\"");
            if let Ok(header) = Header::from_bytes("Content-Disposition", value) {
                response.add_header(header);
            }
        }
        response
    }
}

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// Everything the page needs to redraw itself.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub file_name: Option<String>,
    /// Whether the action buttons are enabled.
    pub can_run: bool,
    /// `loading`, `error`, `result` or `empty`.
    pub display: &'static str,
    pub error: Option<String>,
    pub view: Option<ResultView>,
    /// Raw tagged payload, used for the clipboard copy.
    pub result: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct UploadRequest {
    name: String,
    content: String,
}

fn state_response<S: AnalysisService>(controller: &Controller<S>) -> StateResponse {
    let snapshot = controller.snapshot();
    let mut resp = StateResponse {
        file_name: snapshot.file_name.clone(),
        can_run: snapshot.can_run(),
        display: "empty",
        error: None,
        view: None,
        result: None,
    };

    match snapshot.display() {
        DisplayState::Loading => resp.display = "loading",
        DisplayState::Error(message) => {
            resp.display = "error";
            resp.error = Some(message);
        }
        DisplayState::Result(result) => {
            resp.display = "result";
            resp.view = Some(render::render(&result));
            resp.result = Some(result.payload);
        }
        DisplayState::Empty => {}
    }

    resp
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/state`: current controller state and rendered view.
pub fn get_state<S: AnalysisService>(controller: &Controller<S>) -> Result<Reply> {
    Reply::json(200, &state_response(controller))
}

/// `POST /api/upload`: select a file from `{"name", "content"}`.
pub fn post_upload<S: AnalysisService>(controller: &Controller<S>, body: &str) -> Result<Reply> {
    let req: UploadRequest = match serde_json::from_str(body) {
        Ok(req) => req,
        Err(e) => return Ok(Reply::error(400, &format!("invalid upload: {e}"))),
    };

    if !has_csv_extension(Path::new(&req.name)) {
        return Ok(Reply::error(400, NOT_A_CSV));
    }

    controller.select_file(Some(SelectedFile::new(req.name, req.content.into_bytes())));
    get_state(controller)
}

/// `POST /api/predict-cost` and `POST /api/detect-waste`: run an action.
///
/// Analysis failures are part of the returned state, not an HTTP error. A
/// request that arrives while another is running gets a 409.
pub fn post_action<S: AnalysisService>(
    controller: &Controller<S>,
    kind: ActionKind,
) -> Result<Reply> {
    match controller.run_action(kind) {
        Err(ActionError::Busy) => Ok(Reply::error(409, &ActionError::Busy.user_message())),
        _ => get_state(controller),
    }
}

/// `GET /api/report`: the current result as a JSON download.
pub fn get_report<S: AnalysisService>(controller: &Controller<S>) -> Result<Reply> {
    let Some(result) = controller.result() else {
        return Ok(Reply::error(404, "No result to export"));
    };

    let body = result
        .to_pretty_json()
        .context("failed to serialize report")?;
    Ok(Reply {
        status: 200,
        content_type: "application/json; charset=utf-8",
        body: body.into_bytes(),
        attachment: Some(export::report_file_name(export::report_date())),
    })
}
