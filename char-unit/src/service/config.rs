use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError::{FieldRequired, InvalidConfig};
use crate::errors::Error;
use crate::utils::file::resolve_file;

/// The pin pulsed when a command does not name one.
pub const DEFAULT_PIN: &str = "11";
/// How long (in ms) the pin is held HIGH when a command does not say.
pub const DEFAULT_DURATION_MS: u64 = 60_000;

/// Configuration of a [`CharUnitLoad`](crate::service::CharUnitLoad) service.
///
/// # Example
/// ```
/// use char_unit::service::Config;
///
/// let config = Config::from_json(r#"{"board": "b1"}"#).unwrap();
/// assert_eq!(config.pin, "11");
/// assert_eq!(config.validate("services.0").unwrap(), vec!["b1"]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Name of the board dependency (required).
    #[serde(default)]
    pub board: String,
    /// Default pin to pulse.
    #[serde(default = "default_pin")]
    pub pin: String,
    /// Default pulse duration, in milliseconds.
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
}

fn default_pin() -> String {
    String::from(DEFAULT_PIN)
}

fn default_duration_ms() -> u64 {
    DEFAULT_DURATION_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            board: String::new(),
            pin: default_pin(),
            duration_ms: default_duration_ms(),
        }
    }
}

impl Config {
    /// Creates a configuration for the given board (default pin and duration).
    pub fn new<S: Into<String>>(board: S) -> Self {
        Self {
            board: board.into(),
            ..Default::default()
        }
    }

    /// Validates the configuration and returns the names of the dependencies it implies.
    ///
    /// # Parameters
    /// * `path`: where the configuration lives in the host configuration (used in error messages).
    ///
    /// # Errors
    /// * `FieldRequired`: `board` or `pin` is empty.
    /// * `InvalidConfig`: `duration_ms` is zero.
    pub fn validate(&self, path: &str) -> Result<Vec<String>, Error> {
        if self.board.is_empty() {
            return Err(FieldRequired {
                path: path.to_string(),
                field: "board",
            }
            .into());
        }
        if self.pin.is_empty() {
            return Err(FieldRequired {
                path: path.to_string(),
                field: "pin",
            }
            .into());
        }
        if self.duration_ms == 0 {
            return Err(InvalidConfig {
                info: format!("{}: \"duration_ms\" must be greater than 0", path),
            }
            .into());
        }
        Ok(vec![self.board.clone()])
    }

    /// Retrieves the default pulse duration.
    pub fn get_duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Builds a configuration from a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, Error> {
        Ok(serde_json::from_value(value)?)
    }

    /// Builds a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration from a JSON file (relative paths are resolved against the current directory).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = resolve_file(path)?;
        let content = std::fs::read_to_string(file)?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::errors::{ConfigError, Error};
    use crate::service::Config;

    #[test]
    fn test_defaults() {
        let config = Config::from_json(r#"{"board": "b1"}"#).unwrap();
        assert_eq!(config, Config::new("b1"));
        assert_eq!(config.pin, "11");
        assert_eq!(config.duration_ms, 60_000);
        assert_eq!(config.get_duration(), Duration::from_secs(60));
    }

    #[test]
    fn test_full() {
        let config = Config::from_value(serde_json::json!({
            "board": "b2",
            "pin": "GPIO17",
            "duration_ms": 1500,
        }))
        .unwrap();
        assert_eq!(config.board, "b2");
        assert_eq!(config.pin, "GPIO17");
        assert_eq!(config.get_duration(), Duration::from_millis(1500));
    }

    #[test]
    fn test_validate() {
        let config = Config::new("b1");
        assert_eq!(config.validate("services.0").unwrap(), vec!["b1"]);

        let result = Config::default().validate("services.0");
        assert!(matches!(
            result,
            Err(Error::ConfigError {
                source: ConfigError::FieldRequired { field: "board", .. }
            })
        ));

        let config = Config {
            pin: String::new(),
            ..Config::new("b1")
        };
        assert!(matches!(
            config.validate(""),
            Err(Error::ConfigError {
                source: ConfigError::FieldRequired { field: "pin", .. }
            })
        ));

        let config = Config {
            duration_ms: 0,
            ..Config::new("b1")
        };
        assert!(matches!(
            config.validate(""),
            Err(Error::ConfigError {
                source: ConfigError::InvalidConfig { .. }
            })
        ));
    }

    #[test]
    fn test_validate_message() {
        let error = Config::default().validate("services.0").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Configuration error: services.0: required field \"board\" is missing."
        );
    }

    #[test]
    fn test_invalid_json() {
        assert!(Config::from_json(r#"{"board": 12}"#).is_err());
        assert!(Config::from_json("not json").is_err());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join("char-unit-config-test.json");
        std::fs::write(&path, r#"{"board": "b3", "duration_ms": 10}"#).unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.board, "b3");
        assert_eq!(config.duration_ms, 10);
        std::fs::remove_file(&path).unwrap();

        assert!(Config::from_file("does/not/exist.json").is_err());
    }
}
