//! Settings resolution for the zork relay.
//!
//! Implements hierarchical resolution:
//! 1. Built-in defaults
//! 2. Settings file (explicit path, or ~/.config/zork/relay.json if present)
//! 3. Environment variables
//! 4. CLI arguments (highest priority, applied by the binary)
//!
//! Peer addresses are never read from here; they are always given on the
//! command line.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::signal::DEFAULT_MAX_SIGNAL_BYTES;

pub const ENV_CONNECT_TIMEOUT: &str = "ZORK_RELAY_CONNECT_TIMEOUT";
pub const ENV_MAX_SIGNAL_BYTES: &str = "ZORK_RELAY_MAX_SIGNAL_BYTES";
pub const ENV_LOG_LEVEL: &str = "ZORK_RELAY_LOG_LEVEL";

/// Tunable relay settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seconds to wait for each peer connection.
    pub connect_timeout_secs: u64,
    /// Longest accepted signal, in bytes, excluding the newline.
    pub max_signal_bytes: usize,
    /// Log level or `tracing` filter directive.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            max_signal_bytes: DEFAULT_MAX_SIGNAL_BYTES,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Reject values the relay cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout_secs == 0 {
            return Err(Error::Config(
                "connect_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.max_signal_bytes == 0 {
            return Err(Error::Config(
                "max_signal_bytes must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Load settings with hierarchical resolution.
///
/// An explicit `path` must exist; the global settings file is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(p) => load_settings_file(p)?,
        None => match global_settings_path() {
            Some(global) if global.exists() => load_settings_file(&global)?,
            _ => Settings::default(),
        },
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    settings.validate()?;
    Ok(settings)
}

/// Get the global settings file path.
pub fn global_settings_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".zork").join("relay.json"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/zork/relay.json"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("zork").join("relay.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

fn load_settings_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read settings file {}: {}",
            path.display(),
            e
        ))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse settings file {}: {}",
            path.display(),
            e
        ))
    })
}

/// Apply `ZORK_RELAY_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(ENV_CONNECT_TIMEOUT) {
        settings.connect_timeout_secs = parse_env(ENV_CONNECT_TIMEOUT, &val)?;
    }
    if let Some(val) = lookup(ENV_MAX_SIGNAL_BYTES) {
        settings.max_signal_bytes = parse_env(ENV_MAX_SIGNAL_BYTES, &val)?;
    }
    if let Some(val) = lookup(ENV_LOG_LEVEL) {
        settings.log_level = val;
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &str, val: &str) -> Result<T> {
    val.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} has invalid value {val:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.connect_timeout_secs, 10);
        assert_eq!(settings.max_signal_bytes, 1024 * 1024);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.json");
        std::fs::write(&path, r#"{"connect_timeout_secs": 3}"#).unwrap();

        let settings = load_settings_file(&path).unwrap();
        assert_eq!(settings.connect_timeout_secs, 3);
        assert_eq!(settings.max_signal_bytes, DEFAULT_MAX_SIGNAL_BYTES);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load_settings(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_settings_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut settings = Settings::default();
        apply_env_overrides(
            &mut settings,
            env(&[
                (ENV_CONNECT_TIMEOUT, "7"),
                (ENV_MAX_SIGNAL_BYTES, " 4096 "),
                (ENV_LOG_LEVEL, "debug"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.connect_timeout_secs, 7);
        assert_eq!(settings.max_signal_bytes, 4096);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn invalid_env_value_is_rejected() {
        let mut settings = Settings::default();
        let err = apply_env_overrides(&mut settings, env(&[(ENV_CONNECT_TIMEOUT, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_CONNECT_TIMEOUT));
    }

    #[test]
    fn zero_values_fail_validation() {
        let settings = Settings {
            connect_timeout_secs: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            max_signal_bytes: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
