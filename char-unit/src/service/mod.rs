//! Defines the char load service: a [`PulseController`] driven by generic commands.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::RwLock;

pub use crate::service::config::{Config, DEFAULT_DURATION_MS, DEFAULT_PIN};
pub use crate::service::dispatcher::{
    Command, CommandDispatcher, CHAR_LOAD, DURATION_MS, PIN, START,
};
use crate::devices::PulseController;
use crate::errors::Error;
use crate::hardware::Dependencies;
use crate::utils::task::TaskResult;
use crate::utils::EventHandler;

mod config;
mod dispatcher;

/// Represents a char load: a service pulsing one pin of a board on command.
///
/// # Example
/// ```
/// use char_unit::hardware::{Dependencies, VirtualBoard};
/// use char_unit::service::{CharUnitLoad, Command, Config};
///
/// #[tokio::main]
/// async fn main() {
///     let board = VirtualBoard::new("b1").with_pins(["11"]);
///     let dependencies = Dependencies::default().with_board(board.clone());
///     let service = CharUnitLoad::new("load", &dependencies, Config::new("b1")).unwrap();
///
///     let mut command = Command::new();
///     command.insert("char_load".into(), "start".into());
///     service.do_command(&command).unwrap();
///     char_unit::pause!(10);
///     assert_eq!(board.is_high("11"), Some(true));
///
///     service.close().unwrap();
/// }
/// ```
#[derive(Clone, Debug)]
pub struct CharUnitLoad {
    name: String,
    config: Arc<RwLock<Config>>,
    controller: PulseController,
    dispatcher: CommandDispatcher,
}

impl CharUnitLoad {
    /// Configures a new char load.
    ///
    /// # Parameters
    /// * `name`: the service name.
    /// * `dependencies`: the boards available to the service.
    /// * `config`: the service configuration.
    ///
    /// # Errors
    /// * `FieldRequired` | `InvalidConfig`: the configuration is invalid.
    /// * `DependencyNotFound`: the configured board is not among the dependencies.
    pub fn new<S: Into<String>>(
        name: S,
        dependencies: &Dependencies,
        config: Config,
    ) -> Result<Self, Error> {
        let name = name.into();
        config.validate(&name)?;
        let board = dependencies.resolve(&config.board)?;
        info!("Configure {}: {}", name, board);

        let config = Arc::new(RwLock::new(config));
        let controller = PulseController::new(board);
        let dispatcher = CommandDispatcher::new(controller.clone(), config.clone());
        Ok(Self {
            name,
            config,
            controller,
            dispatcher,
        })
    }

    /// Applies a new configuration.
    ///
    /// The next pulses use the new board and defaults; a pulse in flight completes as started.
    /// On error, the service keeps its previous configuration.
    pub fn reconfigure(&self, dependencies: &Dependencies, config: Config) -> Result<(), Error> {
        config.validate(&self.name)?;
        let board = dependencies.resolve(&config.board)?;
        info!("Reconfigure {}: {}", self.name, board);

        // Board and defaults are swapped together: a dispatch never sees one without the other.
        let mut current = self.config.write();
        self.controller.set_board(board);
        *current = config;
        Ok(())
    }

    /// Executes a generic command: see [`CommandDispatcher::dispatch`].
    pub fn do_command(&self, command: &Command) -> Result<Command, Error> {
        self.dispatcher.dispatch(command)
    }

    /// Closes the service: the pulse in flight, if any, is cancelled and its pin set back LOW.
    pub fn close(&self) -> Result<(), Error> {
        debug!("Close {}", self.name);
        self.controller.stop();
        info!("{} closed", self.name);
        Ok(())
    }

    /// Registers a callback on a controller event: see [`PulseController::on`].
    pub fn on<S, F, T, Fut>(&self, event: S, callback: F) -> EventHandler
    where
        S: Into<String>,
        T: 'static + Send + Sync + Clone,
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: Into<TaskResult>,
    {
        self.controller.on(event, callback)
    }

    // ########################################
    // Setters and Getters.

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_config(&self) -> Config {
        self.config.read().clone()
    }

    pub fn get_controller(&self) -> &PulseController {
        &self.controller
    }
}

impl Display for CharUnitLoad {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CharUnitLoad ({}) [{}]", self.name, self.controller)
    }
}
