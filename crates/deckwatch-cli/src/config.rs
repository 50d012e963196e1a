//! Configuration – reads/writes `~/.deckwatch/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use deckwatch_runtime::{AdvisorConfig, LogFormat};
use deckwatch_types::AdvisorError;
use serde::{Deserialize, Serialize};

use crate::scenario::ScenarioConfig;

/// Persisted configuration stored in `~/.deckwatch/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Console log format; `DECKWATCH_LOG_FORMAT` wins when set.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Simulated time between ticks, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Print rendered displays every this many ticks in text mode.
    #[serde(default = "default_print_every")]
    pub print_every: u64,

    #[serde(default)]
    pub advisor: AdvisorConfig,

    #[serde(default)]
    pub scenario: ScenarioConfig,
}

fn default_tick_interval_ms() -> u64 {
    100
}
fn default_print_every() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            tick_interval_ms: default_tick_interval_ms(),
            print_every: default_print_every(),
            advisor: AdvisorConfig::default(),
            scenario: ScenarioConfig::default(),
        }
    }
}

/// Return the path to `~/.deckwatch/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".deckwatch").join("config.toml")
}

/// Load the config from `path`, applying environment overrides.  Returns
/// `None` if the file does not exist.
pub fn load_from(path: &Path) -> Result<Option<Config>, AdvisorError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        AdvisorError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    let mut cfg: Config = toml::from_str(&raw)
        .map_err(|e| AdvisorError::Config(format!("failed to parse {}: {e}", path.display())))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `DECKWATCH_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `DECKWATCH_OPERATIONAL_TWR` | `advisor.operational_twr` |
/// | `DECKWATCH_IDENTIFIER` | `advisor.identifier` |
/// | `DECKWATCH_ALERT_SOUND` | `advisor.alert_sound` |
/// | `DECKWATCH_TICK_INTERVAL_MS` | `tick_interval_ms` |
///
/// Unparseable numbers are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("DECKWATCH_OPERATIONAL_TWR")
        && let Ok(twr) = v.parse::<f64>()
        && twr.is_finite()
    {
        cfg.advisor.operational_twr = twr;
    }
    if let Ok(v) = std::env::var("DECKWATCH_IDENTIFIER") {
        cfg.advisor.identifier = v;
    }
    if let Ok(v) = std::env::var("DECKWATCH_ALERT_SOUND") {
        cfg.advisor.alert_sound = v;
    }
    if let Ok(v) = std::env::var("DECKWATCH_TICK_INTERVAL_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.tick_interval_ms = ms;
    }
}

/// Defaults with `DECKWATCH_*` overrides applied, for when no file can be
/// loaded.
pub fn default_with_env_overrides() -> Config {
    let mut cfg = Config::default();
    apply_env_overrides(&mut cfg);
    cfg
}

/// Save the config to `path`, creating the parent directory if necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), AdvisorError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AdvisorError::Config(format!("failed to create {}: {e}", parent.display()))
        })?;
        // Owner-only directory (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700)).map_err(|e| {
                AdvisorError::Config(format!("failed to set permissions on {}: {e}", parent.display()))
            })?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| AdvisorError::Config(format!("failed to serialize config: {e}")))?;
    // Owner-only file (rw-------) on Unix.
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| AdvisorError::Config(format!("failed to write {}: {e}", path.display())))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| AdvisorError::Config(format!("failed to write {}: {e}", path.display())))?;
    Ok(())
}

/// Serializes tests that set `DECKWATCH_*` variables or load a config
/// file, since every test in the binary shares one environment.
#[cfg(test)]
pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
