use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::time::Instant;

use crate::errors::Error;
use crate::errors::HardwareError::{IoError, PinNotFound};
use crate::hardware::{Board, Pin};

/// Inner data of a [`MockPin`].
#[derive(Clone, Debug, Default)]
pub struct MockPinData {
    /// Last level successfully written.
    pub level: bool,
    /// All successful writes, timestamped with the tokio clock.
    pub history: Vec<(Instant, bool)>,
    /// Number of write attempts (failed ones included).
    pub attempts: usize,
    /// Writing HIGH fails.
    pub fail_high: bool,
    /// Writing LOW fails.
    pub fail_low: bool,
}

/// Mock [`Board`] for testing purposes: records every write and may be told to fail them.
#[derive(Clone, Debug)]
pub struct MockBoard {
    name: String,
    pins: Arc<RwLock<BTreeMap<String, MockPinData>>>,
    lookups: Arc<AtomicUsize>,
}

impl MockBoard {
    pub fn new<S: Into<String>>(name: S, pins: &[&str]) -> Self {
        Self {
            name: name.into(),
            pins: Arc::new(RwLock::new(
                pins.iter()
                    .map(|pin| (pin.to_string(), MockPinData::default()))
                    .collect(),
            )),
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Makes every write of `level` on `pin` fail.
    pub fn fail_on(&self, pin: &str, level: bool) {
        if let Some(data) = self.pins.write().get_mut(pin) {
            match level {
                true => data.fail_high = true,
                false => data.fail_low = true,
            }
        }
    }

    /// Returns a copy of the pin data.
    pub fn get_pin_data(&self, pin: &str) -> MockPinData {
        self.pins.read().get(pin).cloned().unwrap_or_default()
    }

    /// Returns the levels successfully written on `pin`, in order.
    pub fn get_writes(&self, pin: &str) -> Vec<bool> {
        self.get_pin_data(pin)
            .history
            .iter()
            .map(|(_, level)| *level)
            .collect()
    }

    /// Indicates if the last level written on `pin` is HIGH.
    pub fn is_high(&self, pin: &str) -> bool {
        self.get_pin_data(pin).level
    }

    /// Number of `pin_by_name` calls received.
    pub fn get_lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl Display for MockBoard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockBoard ({})", self.name)
    }
}

impl Board for MockBoard {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_pin_names(&self) -> Vec<String> {
        self.pins.read().keys().cloned().collect()
    }

    fn pin_by_name(&self, name: &str) -> Result<Box<dyn Pin>, Error> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match self.pins.read().contains_key(name) {
            true => Ok(Box::new(MockPin {
                name: name.to_string(),
                pins: self.pins.clone(),
            })),
            false => Err(PinNotFound {
                pin: name.to_string(),
            }
            .into()),
        }
    }
}

/// Mock [`Pin`] handle of a [`MockBoard`].
#[derive(Clone, Debug)]
pub struct MockPin {
    name: String,
    pins: Arc<RwLock<BTreeMap<String, MockPinData>>>,
}

impl Pin for MockPin {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn set_state(&mut self, high: bool) -> Result<(), Error> {
        let mut lock = self.pins.write();
        let data = lock.get_mut(&self.name).ok_or(PinNotFound {
            pin: self.name.clone(),
        })?;
        data.attempts += 1;
        if (high && data.fail_high) || (!high && data.fail_low) {
            return Err(IoError {
                pin: self.name.clone(),
                info: String::from("mocked write failure"),
            }
            .into());
        }
        data.level = high;
        data.history.push((Instant::now(), high));
        Ok(())
    }
}
