/// Configuration system for cloudcost.
///
/// Layered hierarchy, later layers win at the field level:
///
/// 1. **Built-in defaults**: [`schema::CloudCostConfig::default()`]
/// 2. **User global config**: `~/.cloudcost/config.toml`
/// 3. **Project local config**: `.cloudcost.toml` in the current directory
/// 4. **Environment variables**: `CLOUDCOST_*` overrides
///
/// Malformed files are ignored rather than aborting the command.
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::CloudCostConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> CloudCostConfig {
    let mut config = load_from(global_config_path().as_deref(), project_config_path().as_deref());
    apply_env_overrides(&mut config);
    config
}

/// Merge defaults with the given files (either may be absent). Does not
/// look at the environment.
pub fn load_from(global: Option<&Path>, project: Option<&Path>) -> CloudCostConfig {
    let mut merged = match toml::Value::try_from(CloudCostConfig::default()) {
        Ok(value) => value,
        Err(_) => return CloudCostConfig::default(),
    };

    for path in [global, project].into_iter().flatten() {
        if let Some(layer) = load_toml_value(path) {
            merge_values(&mut merged, layer);
        }
    }

    merged.try_into().unwrap_or_default()
}

/// Read a TOML file as a raw value tree. `None` if missing or malformed.
fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    // A layer that does not fit the schema is dropped whole.
    let _: CloudCostConfig = value.clone().try_into().ok()?;
    Some(value)
}

/// Overlay `overlay` onto `base`, table by table. Only keys present in the
/// overlay are replaced.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// `~/.cloudcost/config.toml`
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".cloudcost").join("config.toml"))
}

/// `.cloudcost.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".cloudcost.toml"))
}

/// Path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply `CLOUDCOST_*` overrides (highest precedence layer).
///
/// - `CLOUDCOST_API_URL`: analysis service base URL
/// - `CLOUDCOST_API_TIMEOUT_MS`: request timeout (`0` = none)
/// - `CLOUDCOST_EXPORT_DIR`: report download directory
/// - `CLOUDCOST_WEB_ADDR`: dashboard listen address
/// - `CLOUDCOST_LOG`: history logging (`1`/`true`/`yes`/`on`)
/// - `CLOUDCOST_NO_COLOR`: disable terminal colors when truthy
pub fn apply_env_overrides(config: &mut CloudCostConfig) {
    if let Ok(val) = std::env::var("CLOUDCOST_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("CLOUDCOST_API_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("CLOUDCOST_EXPORT_DIR")
        && !val.is_empty()
    {
        config.export.dir = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("CLOUDCOST_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Ok(val) = std::env::var("CLOUDCOST_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("CLOUDCOST_NO_COLOR") {
        config.display.color = !is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset / show
// ---------------------------------------------------------------------------

/// Write the annotated default config to `~/.cloudcost/config.toml`.
///
/// Fails if the file exists unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    write_default_config(&path, force)?;
    Ok(path)
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }

    fs::write(path, CloudCostConfig::default_toml()).context("failed to write config file")
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Set a dotted key (e.g. `api.timeout_ms`) in the global config file.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_at(&path, key, value)
}

fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut root: toml::Value = if path.exists() {
        let content = fs::read_to_string(path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config as TOML value")?
    } else {
        toml::Value::try_from(CloudCostConfig::default())
            .context("failed to serialize default config")?
    };

    set_toml_value(&mut root, key, value)?;

    // Refuse to write something the next load would discard.
    let _: CloudCostConfig = root
        .clone()
        .try_into()
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")
}

/// Set a value in a TOML value tree using a dotted key path. Missing
/// sections are created; the new value takes the type of the old one.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        let table = current
            .as_table_mut()
            .with_context(|| format!("expected table above '{part}' in '{key}'"))?;
        current = table
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table for '{key}'"))?;

    let new_value = match table.get(*leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// The effective configuration rendered as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}
