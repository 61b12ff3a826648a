//! Defines the devices driven through a board.

pub use crate::devices::pulse::{PulseController, PulseEvent, PulseHandle, PulseState};

mod pulse;
