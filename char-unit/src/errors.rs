use log::error;
use snafu::Snafu;

pub use crate::errors::Error::*;

#[derive(Clone, Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Runtime error: no tokio runtime is available to run background tasks
    RuntimeError,
    /// Configuration error: {source}.
    ConfigError { source: ConfigError },
    /// Hardware error: {source}.
    HardwareError { source: HardwareError },
    /// Command error: {source}.
    CommandError { source: CommandError },
    /// Pulse on pin {pin} rejected: another pulse is in flight
    Busy { pin: String },
    /// Pulse on pin {pin} was cancelled
    Cancelled { pin: String },
    /// Unknown error: {info}.
    Unknown { info: String },
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        error!("std::io error {:?}", error);
        let info = match error.kind() {
            std::io::ErrorKind::NotFound => String::from("File not found"),
            std::io::ErrorKind::PermissionDenied => String::from("Permission denied"),
            _ => error.to_string(),
        };
        Self::ConfigError {
            source: ConfigError::InvalidConfig { info },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::ConfigError {
            source: ConfigError::InvalidConfig {
                info: error.to_string(),
            },
        }
    }
}

impl From<ConfigError> for Error {
    fn from(value: ConfigError) -> Self {
        Self::ConfigError { source: value }
    }
}

impl From<HardwareError> for Error {
    fn from(value: HardwareError) -> Self {
        Self::HardwareError { source: value }
    }
}

impl From<CommandError> for Error {
    fn from(value: CommandError) -> Self {
        Self::CommandError { source: value }
    }
}

#[derive(Clone, Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// {path}: required field "{field}" is missing
    FieldRequired { path: String, field: &'static str },
    /// {info}
    InvalidConfig { info: String },
    /// Dependency "{name}" could not be resolved
    DependencyNotFound { name: String },
}

#[derive(Clone, Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum HardwareError {
    /// Pin "{pin}" not found
    PinNotFound { pin: String },
    /// Pin "{pin}" write failed: {info}
    IoError { pin: String, info: String },
}

#[derive(Clone, Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CommandError {
    /// Empty command
    EmptyCommand,
    /// Unknown command key "{key}"
    UnknownCommandKey { key: String },
    /// Unknown command value for "{key}": {value}
    UnknownCommandValue { key: String, value: String },
    /// Invalid parameter "{name}": {info}
    InvalidParameter { name: String, info: String },
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::errors::CommandError::{UnknownCommandKey, UnknownCommandValue};
    use crate::errors::ConfigError::FieldRequired;
    use crate::errors::HardwareError::{IoError, PinNotFound};

    use super::*;

    #[test]
    fn test_error_display() {
        let runtime_error = RuntimeError;
        assert_eq!(
            format!("{}", runtime_error),
            "Runtime error: no tokio runtime is available to run background tasks"
        );

        let config_error = Error::from(FieldRequired {
            path: String::from("services.0"),
            field: "board",
        });
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: services.0: required field \"board\" is missing."
        );

        let hardware_error = Error::from(IoError {
            pin: String::from("11"),
            info: String::from("line busy"),
        });
        assert_eq!(
            format!("{}", hardware_error),
            "Hardware error: Pin \"11\" write failed: line busy."
        );

        let command_error = Error::from(UnknownCommandValue {
            key: String::from("char_load"),
            value: String::from("\"stop\""),
        });
        assert_eq!(
            format!("{}", command_error),
            "Command error: Unknown command value for \"char_load\": \"stop\"."
        );

        let busy_error = Busy {
            pin: String::from("11"),
        };
        assert_eq!(
            format!("{}", busy_error),
            "Pulse on pin 11 rejected: another pulse is in flight"
        );

        let unknown_error = Unknown {
            info: "Some unknown error".to_string(),
        };
        assert_eq!(
            format!("{}", unknown_error),
            "Unknown error: Some unknown error."
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        assert_eq!(format!("{}", error), "Configuration error: File not found.");
    }

    #[test]
    fn test_from_serde_error() {
        let serde_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = serde_error.into();
        assert!(matches!(
            error,
            Error::ConfigError {
                source: ConfigError::InvalidConfig { .. }
            }
        ));
    }

    #[test]
    fn test_from_hardware_error() {
        let hardware_error = PinNotFound {
            pin: String::from("42"),
        };
        let error: Error = hardware_error.into();
        assert_eq!(format!("{}", error), "Hardware error: Pin \"42\" not found.");
    }

    #[test]
    fn test_from_command_error() {
        let error: Error = UnknownCommandKey {
            key: String::from("foo"),
        }
        .into();
        assert_eq!(
            format!("{}", error),
            "Command error: Unknown command key \"foo\"."
        );
    }
}
