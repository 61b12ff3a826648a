use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use log::trace;
use parking_lot::RwLock;

use crate::errors::Error;
use crate::errors::HardwareError::PinNotFound;
use crate::hardware::{Board, Pin};

/// An in-memory [`Board`]: every pin simply remembers the last level written on it.
///
/// Useful for dry runs (no hardware attached) and for the command line harness.
#[derive(Clone, Debug)]
pub struct VirtualBoard {
    name: String,
    /// Current level of each pin, shared with all pin handles.
    levels: Arc<RwLock<BTreeMap<String, bool>>>,
}

impl VirtualBoard {
    /// Creates a virtual board without any pin.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            levels: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Adds the given (LOW by default) pins to the board.
    pub fn with_pins<I, S>(self, pins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut levels = self.levels.write();
            for pin in pins {
                levels.entry(pin.into()).or_insert(false);
            }
        }
        self
    }

    /// Returns the current level of a pin, if the pin exists.
    pub fn is_high(&self, pin: &str) -> Option<bool> {
        self.levels.read().get(pin).copied()
    }
}

impl Display for VirtualBoard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "VirtualBoard ({}) [pins={}]",
            self.name,
            self.levels.read().len()
        )
    }
}

impl Board for VirtualBoard {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_pin_names(&self) -> Vec<String> {
        self.levels.read().keys().cloned().collect()
    }

    fn pin_by_name(&self, name: &str) -> Result<Box<dyn Pin>, Error> {
        match self.levels.read().contains_key(name) {
            true => Ok(Box::new(VirtualPin {
                name: name.to_string(),
                levels: self.levels.clone(),
            })),
            false => Err(PinNotFound {
                pin: name.to_string(),
            }
            .into()),
        }
    }
}

/// A pin handle of a [`VirtualBoard`].
#[derive(Clone, Debug)]
pub struct VirtualPin {
    name: String,
    levels: Arc<RwLock<BTreeMap<String, bool>>>,
}

impl Pin for VirtualPin {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn set_state(&mut self, high: bool) -> Result<(), Error> {
        trace!("Virtual pin {} set to {}", self.name, high);
        self.levels.write().insert(self.name.clone(), high);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{Error, HardwareError};
    use crate::hardware::{Board, VirtualBoard};

    #[test]
    fn test_creation() {
        let board = VirtualBoard::new("b1").with_pins(["11", "12"]);
        assert_eq!(board.get_name(), "b1");
        assert_eq!(board.get_pin_names(), vec!["11", "12"]);
        assert_eq!(board.is_high("11"), Some(false));
        assert_eq!(board.is_high("13"), None);
    }

    #[test]
    fn test_set_state() {
        let board = VirtualBoard::new("b1").with_pins(["11"]);
        let mut pin = board.pin_by_name("11").unwrap();
        assert_eq!(pin.get_name(), "11");

        pin.set_state(true).unwrap();
        assert_eq!(board.is_high("11"), Some(true));

        // Clones of the board share the same pins.
        let clone = board.clone();
        pin.set_state(false).unwrap();
        assert_eq!(clone.is_high("11"), Some(false));
    }

    #[test]
    fn test_unknown_pin() {
        let board = VirtualBoard::new("b1").with_pins(["11"]);
        let result = board.pin_by_name("12");
        assert!(matches!(
            result,
            Err(Error::HardwareError {
                source: HardwareError::PinNotFound { .. }
            })
        ));
    }

    #[test]
    fn test_display() {
        let board = VirtualBoard::new("b1").with_pins(["11", "12"]);
        assert_eq!(format!("{}", board), "VirtualBoard (b1) [pins=2]");
    }
}
