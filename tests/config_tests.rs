/// Integration tests for configuration layering.
///
/// # Safety
///
/// The env override test uses `std::env::set_var` / `remove_var`, which are
/// `unsafe` in Rust 2024 edition. All env mutation lives in a single #[test]
/// so nothing else in this binary reads these variables concurrently.
use std::fs;
use std::path::PathBuf;

use cloudcost::config::{self, schema::CloudCostConfig};

/// Helper: set an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must only be called from single-threaded test contexts.
unsafe fn set_env(key: &str, val: &str) {
    unsafe { std::env::set_var(key, val) }
}

/// Helper: remove an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must only be called from single-threaded test contexts.
unsafe fn remove_env(key: &str) {
    unsafe { std::env::remove_var(key) }
}

const VARS: [&str; 6] = [
    "CLOUDCOST_API_URL",
    "CLOUDCOST_API_TIMEOUT_MS",
    "CLOUDCOST_EXPORT_DIR",
    "CLOUDCOST_WEB_ADDR",
    "CLOUDCOST_LOG",
    "CLOUDCOST_NO_COLOR",
];

#[test]
fn env_overrides_take_highest_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join(".cloudcost.toml");
    fs::write(
        &project,
        "[api]\nbase_url = \"http://from-file:1\"\ntimeout_ms = 500\n",
    )
    .unwrap();

    let mut cfg = config::load_from(None, Some(&project));
    assert_eq!(cfg.api.base_url, "http://from-file:1");

    unsafe {
        set_env("CLOUDCOST_API_URL", "http://from-env:2");
        set_env("CLOUDCOST_API_TIMEOUT_MS", "2500");
        set_env("CLOUDCOST_EXPORT_DIR", "/tmp/reports");
        set_env("CLOUDCOST_WEB_ADDR", "0.0.0.0:8080");
        set_env("CLOUDCOST_LOG", "off");
        set_env("CLOUDCOST_NO_COLOR", "1");
    }
    config::apply_env_overrides(&mut cfg);

    assert_eq!(cfg.api.base_url, "http://from-env:2");
    assert_eq!(cfg.api.timeout_ms, 2500);
    assert_eq!(cfg.export.dir, Some(PathBuf::from("/tmp/reports")));
    assert_eq!(cfg.web.addr, "0.0.0.0:8080");
    assert!(!cfg.logging.enabled);
    assert!(!cfg.display.color);

    // --- unparsable or empty values leave the layer below alone ---
    unsafe {
        set_env("CLOUDCOST_API_URL", "");
        set_env("CLOUDCOST_API_TIMEOUT_MS", "soon");
    }
    let mut cfg = config::load_from(None, Some(&project));
    config::apply_env_overrides(&mut cfg);
    assert_eq!(cfg.api.base_url, "http://from-file:1");
    assert_eq!(cfg.api.timeout_ms, 500);

    for var in VARS {
        unsafe { remove_env(var) };
    }
    let mut cfg = CloudCostConfig::default();
    config::apply_env_overrides(&mut cfg);
    assert_eq!(cfg, CloudCostConfig::default());
}

#[test]
fn global_and_project_layers_merge_per_field() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("config.toml");
    let project = dir.path().join(".cloudcost.toml");
    fs::write(&global, "[web]\naddr = \"127.0.0.1:1111\"\nopen_browser = false\n").unwrap();
    fs::write(&project, "[web]\naddr = \"127.0.0.1:2222\"\n").unwrap();

    let cfg = config::load_from(Some(&global), Some(&project));
    assert_eq!(cfg.web.addr, "127.0.0.1:2222");
    assert!(!cfg.web.open_browser);
    assert_eq!(cfg.api, CloudCostConfig::default().api);
}
