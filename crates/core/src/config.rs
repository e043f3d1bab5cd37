//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the store and views.
//! Request handlers never read environment variables themselves, which keeps behaviour
//! consistent between the server, the CLI and the test harness.

use crate::constants::{DEFAULT_DATA_DIR, DEFAULT_POLL_SECS, RECORDS_SLOT_FILENAME};
use crate::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    poll_interval: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidInput` if the data directory is empty or the poll
    /// interval is zero.
    pub fn new(data_dir: PathBuf, poll_interval: Duration) -> ConfigResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidInput("data_dir cannot be empty".into()));
        }
        if poll_interval.is_zero() {
            return Err(ConfigError::InvalidInput(
                "poll interval must be at least one second".into(),
            ));
        }

        Ok(Self {
            data_dir,
            poll_interval,
        })
    }

    /// Builds the config from optional raw environment values.
    ///
    /// Blank values fall back to the defaults (`ot_data`, 10 seconds).
    pub fn from_env_values(
        data_dir: Option<String>,
        poll_secs: Option<String>,
    ) -> ConfigResult<Self> {
        let data_dir = data_dir
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.into());
        Self::new(
            PathBuf::from(data_dir),
            poll_interval_from_env_value(poll_secs)?,
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the JSON slot holding every patient record.
    pub fn records_slot_path(&self) -> PathBuf {
        self.data_dir.join(RECORDS_SLOT_FILENAME)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

/// Parse the display poll interval from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default of 10 seconds.
pub fn poll_interval_from_env_value(value: Option<String>) -> ConfigResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let secs = match value {
        Some(v) => v.parse::<u64>().map_err(|e| {
            ConfigError::InvalidInput(format!("OTBOARD_POLL_SECS is not a number: {e}"))
        })?,
        None => DEFAULT_POLL_SECS,
    };

    if secs == 0 {
        return Err(ConfigError::InvalidInput(
            "OTBOARD_POLL_SECS must be greater than zero".into(),
        ));
    }

    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_interval_defaults_when_unset_or_blank() {
        assert_eq!(
            poll_interval_from_env_value(None).expect("default should parse"),
            Duration::from_secs(10)
        );
        assert_eq!(
            poll_interval_from_env_value(Some("   ".into())).expect("blank should default"),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn poll_interval_parses_seconds() {
        assert_eq!(
            poll_interval_from_env_value(Some(" 15 ".into())).expect("should parse"),
            Duration::from_secs(15)
        );
    }

    #[test]
    fn poll_interval_rejects_zero_and_garbage() {
        assert!(poll_interval_from_env_value(Some("0".into())).is_err());
        assert!(poll_interval_from_env_value(Some("ten".into())).is_err());
    }

    #[test]
    fn config_rejects_zero_interval() {
        let err = CoreConfig::new(PathBuf::from("ot_data"), Duration::ZERO)
            .expect_err("zero interval must be rejected");
        assert!(matches!(err, ConfigError::InvalidInput(_)));
    }

    #[test]
    fn from_env_values_applies_defaults() {
        let cfg = CoreConfig::from_env_values(None, Some(" ".into())).expect("defaults");
        assert_eq!(cfg.data_dir(), Path::new("ot_data"));
        assert_eq!(cfg.poll_interval(), Duration::from_secs(10));

        let cfg = CoreConfig::from_env_values(Some("/tmp/ot".into()), Some("4".into()))
            .expect("explicit values");
        assert_eq!(cfg.data_dir(), Path::new("/tmp/ot"));
        assert_eq!(cfg.poll_interval(), Duration::from_secs(4));
    }

    #[test]
    fn records_slot_path_is_under_data_dir() {
        let cfg = CoreConfig::new(PathBuf::from("/srv/ot"), Duration::from_secs(10))
            .expect("config should build");
        assert_eq!(
            cfg.records_slot_path(),
            PathBuf::from("/srv/ot/ot_status_records.json")
        );
    }
}
