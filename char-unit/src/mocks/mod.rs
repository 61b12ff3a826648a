//! Mocked entities (useful for tests mostly).

mod board;

pub use board::{MockBoard, MockPin, MockPinData};
