use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::devices::PulseController;
use crate::errors::CommandError::{
    EmptyCommand, InvalidParameter, UnknownCommandKey, UnknownCommandValue,
};
use crate::errors::Error;
use crate::service::Config;

/// A generic command (or command result): JSON values indexed by key (sorted by key).
pub type Command = Map<String, Value>;

/// The command key driving the char load.
pub const CHAR_LOAD: &str = "char_load";
/// The `char_load` sub-command starting a pulse.
pub const START: &str = "start";
/// Optional parameter: the pin to pulse (string or integer).
pub const PIN: &str = "pin";
/// Optional parameter: the pulse duration in milliseconds (positive integer).
pub const DURATION_MS: &str = "duration_ms";

/// Routes generic commands to a [`PulseController`].
///
/// The only recognized command is `{"char_load": "start"}`, optionally completed by the `pin` and
/// `duration_ms` parameters. Missing parameters fall back on the service [`Config`].
#[derive(Clone, Debug)]
pub struct CommandDispatcher {
    controller: PulseController,
    config: Arc<RwLock<Config>>,
}

impl CommandDispatcher {
    /// Creates a dispatcher for `controller`.
    ///
    /// The `config` lock also guards the controller board: whoever swaps the board must hold its
    /// write lock (see [`CharUnitLoad::reconfigure`](crate::service::CharUnitLoad::reconfigure)).
    pub fn new(controller: PulseController, config: Arc<RwLock<Config>>) -> Self {
        Self { controller, config }
    }

    /// Validates and executes a command.
    ///
    /// A `start` returns as soon as the pulse is started: it does not wait for the pulse to end.
    ///
    /// # Returns
    /// An empty command result.
    ///
    /// # Errors
    /// * `EmptyCommand`: the command has no key.
    /// * `UnknownCommandKey`: the command has no `char_load` key, or a key that is not a known parameter.
    /// * `UnknownCommandValue`: `char_load` is not `"start"`.
    /// * `InvalidParameter`: `pin` or `duration_ms` is malformed.
    /// * any error of [`PulseController::start`].
    pub fn dispatch(&self, command: &Command) -> Result<Command, Error> {
        debug!("Dispatch command: {:?}", command);

        let value = match command.get(CHAR_LOAD) {
            Some(value) => value,
            None => {
                return match command.keys().next() {
                    Some(key) => Err(UnknownCommandKey { key: key.clone() }.into()),
                    None => Err(EmptyCommand.into()),
                };
            }
        };

        if let Some(key) = command
            .keys()
            .find(|key| ![CHAR_LOAD, PIN, DURATION_MS].contains(&key.as_str()))
        {
            return Err(UnknownCommandKey { key: key.clone() }.into());
        }

        match value.as_str() {
            Some(START) => self.start(command),
            _ => Err(UnknownCommandValue {
                key: CHAR_LOAD.to_string(),
                value: value.to_string(),
            }
            .into()),
        }
    }

    fn start(&self, command: &Command) -> Result<Command, Error> {
        // Held until the pulse is reserved: the defaults and the board are read as one pair.
        let config = self.config.read();

        let pin = match command.get(PIN) {
            None => config.pin.clone(),
            Some(Value::String(pin)) if !pin.is_empty() => pin.clone(),
            Some(value) => match value.as_u64() {
                Some(id) => id.to_string(),
                None => {
                    return Err(InvalidParameter {
                        name: PIN.to_string(),
                        info: format!("expected a pin name, found {}", value),
                    }
                    .into())
                }
            },
        };

        let duration = match command.get(DURATION_MS) {
            None => config.get_duration(),
            Some(value) => match value.as_u64() {
                Some(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(InvalidParameter {
                        name: DURATION_MS.to_string(),
                        info: format!("expected a positive integer, found {}", value),
                    }
                    .into())
                }
            },
        };

        info!("Start pulse on pin {} for {:?}", pin, duration);
        self.controller.start(&pin, duration)?;
        Ok(Command::new())
    }
}
