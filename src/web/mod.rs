//! Embedded web dashboard for cloudcost.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page dashboard for uploading a CSV and viewing results
//! - JSON API endpoints driving one shared [`Controller`]
//!
//! Launched via `cloudcost web` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::Read;

use anyhow::{Context, Result};
use tiny_http::{Method, Server};

use crate::api::{AnalysisService, ApiClient};
use crate::config::schema::CloudCostConfig;
use crate::controller::{ActionKind, Controller};
use crate::history::HistoryLog;

pub use api::Reply;

/// Largest request body accepted; uploads carry the whole CSV inline.
pub const MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard server on the given address.
///
/// Blocks the current thread. Handles requests sequentially, so at most one
/// analysis runs at a time. Per-request errors become 500 responses and
/// never stop the server.
pub fn serve(cfg: &CloudCostConfig, addr: &str) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    let mut controller = Controller::new(ApiClient::from_config(&cfg.api));
    if let Some(log) = HistoryLog::from_config(&cfg.logging) {
        controller = controller.with_history(log);
    }
    let dashboard = Dashboard::new(controller);

    println!("cloudcost dashboard running at http://{addr}");
    println!("Analysis service: {}", cfg.api.base_url);
    println!("Press Ctrl+C to stop.\n");

    if cfg.web.open_browser {
        let _ = open_browser(&format!("http://{addr}"));
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let reply = match read_body(&method, request.as_reader(), MAX_BODY_BYTES) {
            Ok(body) => dashboard
                .dispatch(&method, &url, body.as_deref())
                .unwrap_or_else(|e| Reply::error(500, &format!("{e:#}"))),
            Err(e) => Reply::error(400, &format!("invalid request body: {e:#}")),
        };
        let status = reply.status;
        let _ = request.respond(reply.into_response());

        // Brief access log
        println!(
            "{} {} {} {}",
            method,
            url,
            status,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

/// Read the body of a `PUT`, `POST` or `PATCH` as UTF-8, up to `limit` bytes.
/// Other methods carry no body.
fn read_body(method: &Method, reader: impl Read, limit: u64) -> Result<Option<String>> {
    if !matches!(method, Method::Put | Method::Post | Method::Patch) {
        return Ok(None);
    }

    let mut bytes = Vec::new();
    reader
        .take(limit + 1)
        .read_to_end(&mut bytes)
        .context("failed to read request body")?;
    if bytes.len() as u64 > limit {
        anyhow::bail!("request body exceeds {limit} bytes");
    }
    let text = String::from_utf8(bytes).context("request body is not valid UTF-8")?;
    Ok(Some(text))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Request router over a shared controller.
pub struct Dashboard<S> {
    controller: Controller<S>,
}

impl<S: AnalysisService> Dashboard<S> {
    pub fn new(controller: Controller<S>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &Controller<S> {
        &self.controller
    }

    /// Dispatch an incoming request to the appropriate handler.
    pub fn dispatch(&self, method: &Method, url: &str, body: Option<&str>) -> Result<Reply> {
        // Strip query string for path matching
        let path = url.split('?').next().unwrap_or(url);

        match (method, path) {
            // Frontend
            (&Method::Get, "/") | (&Method::Get, "/index.html") => {
                Ok(Reply::html(frontend::INDEX_HTML))
            }

            // API
            (&Method::Get, "/api/state") => api::get_state(&self.controller),
            (&Method::Post, "/api/upload") => api::post_upload(&self.controller, body.unwrap_or("")),
            (&Method::Post, "/api/predict-cost") => {
                api::post_action(&self.controller, ActionKind::Predict)
            }
            (&Method::Post, "/api/detect-waste") => {
                api::post_action(&self.controller, ActionKind::Waste)
            }
            (&Method::Get, "/api/report") => api::get_report(&self.controller),

            // 404
            _ => Ok(Reply::error(404, "not found")),
        }
    }
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
