//! Defines the pieces of hardware a service drives: boards and the digital pins they expose.

use std::collections::HashMap;
use std::fmt::{Debug, Display};

use dyn_clone::DynClone;

use crate::errors::ConfigError::DependencyNotFound;
use crate::errors::Error;
pub use crate::hardware::virtual_board::{VirtualBoard, VirtualPin};

mod virtual_board;

// Makes a Box<dyn Board> clone (used for board snapshots).
dyn_clone::clone_trait_object!(Board);

/// Defines the trait all boards must implement: a named collection of addressable digital pins.
///
/// A board is a handle: cloning it must give access to the same physical pins.
pub trait Board: DynClone + Send + Sync + Debug + Display {
    /// Returns the board name (the one used to declare it as a dependency).
    fn get_name(&self) -> &str;

    /// Lists the names of all pins exposed by this board.
    fn get_pin_names(&self) -> Vec<String>;

    /// Retrieves a pin handle by its name.
    ///
    /// # Errors
    /// * `PinNotFound`: the board has no pin with this name.
    fn pin_by_name(&self, name: &str) -> Result<Box<dyn Pin>, Error>;
}

// Makes a Box<dyn Pin> clone.
dyn_clone::clone_trait_object!(Pin);

/// Defines the trait all digital pins must implement.
pub trait Pin: DynClone + Send + Sync + Debug {
    /// Returns the pin name.
    fn get_name(&self) -> &str;

    /// Writes the `high` level on the pin.
    ///
    /// # Errors
    /// * `IoError`: the level could not be written.
    fn set_state(&mut self, high: bool) -> Result<(), Error>;
}

/// The boards a service may depend on, indexed by name.
#[derive(Clone, Debug, Default)]
pub struct Dependencies {
    boards: HashMap<String, Box<dyn Board>>,
}

impl Dependencies {
    /// Registers a board (under its own name) and returns the dependencies.
    pub fn with_board<B: Board + 'static>(mut self, board: B) -> Self {
        self.insert(board);
        self
    }

    /// Registers a board under its own name: any board previously registered with that name is replaced.
    pub fn insert<B: Board + 'static>(&mut self, board: B) {
        self.boards
            .insert(board.get_name().to_string(), Box::new(board));
    }

    /// Resolves a board by name.
    ///
    /// # Errors
    /// * `DependencyNotFound`: no board has been registered under this name.
    pub fn resolve(&self, name: &str) -> Result<Box<dyn Board>, Error> {
        self.boards.get(name).cloned().ok_or_else(|| {
            Error::from(DependencyNotFound {
                name: name.to_string(),
            })
        })
    }
}
