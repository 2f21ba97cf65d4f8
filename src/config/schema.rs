/// Configuration schema and defaults for cloudcost.
///
/// Defines the TOML-serializable structure with the sections `[api]`,
/// `[export]`, `[web]`, `[logging]` and `[display]`. Every field has a
/// built-in default; users only set what they want to override.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_BASE_URL;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Maps directly to `~/.cloudcost/config.toml` and `.cloudcost.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudCostConfig {
    pub api: ApiConfig,
    pub export: ExportConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
    pub display: DisplayConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Remote analysis service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; `/predict-cost` and `/detect-waste` are appended.
    pub base_url: String,
    /// Whole-request timeout in milliseconds. `0` waits indefinitely.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// [export]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory for downloaded reports. Unset means the current directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `cloudcost web`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append every analysis to the history log.
    pub enabled: bool,
    /// Override for `~/.cloudcost/history.jsonl`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            history_file: None,
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Colorize terminal output.
    pub color: bool,
    /// Character width of utilisation bars in terminal tables.
    pub bar_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            bar_width: 10,
        }
    }
}

impl CloudCostConfig {
    /// Annotated default config written by `cloudcost config init`.
    pub fn default_toml() -> &'static str {
        DEFAULT_TOML
    }
}

const DEFAULT_TOML: &str = r#"# cloudcost configuration
#
# Precedence (highest last): built-in defaults, this file,
# .cloudcost.toml in the working directory, CLOUDCOST_* environment variables.

[api]
# Analysis service base URL.
base_url = "https://cloudcost-optimizer-api.onrender.com"
# Request timeout in milliseconds (0 = wait indefinitely).
timeout_ms = 0

[export]
# Directory for downloaded reports (defaults to the working directory).
# dir = "/path/to/reports"

[web]
addr = "127.0.0.1:9747"
open_browser = true

[logging]
# Record every analysis in ~/.cloudcost/history.jsonl
enabled = true
# history_file = "/path/to/history.jsonl"

[display]
color = true
bar_width = 10
"#;
