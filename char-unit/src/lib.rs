//! <h1 align="center">CHAR-UNIT - Timed digital-output pulse service</h1>
//!
//! # Features
//!
//! **char-unit** drives one digital pin of a board HIGH for a given duration, then LOW: the kind of
//! pulse a robotics host sends to a charge load, a relay or a solenoid.
//!
//! - Abstract the hardware with the [`Board`](hardware::Board) and [`Pin`](hardware::Pin) traits
//!   (a [`VirtualBoard`](hardware::VirtualBoard) is provided for dry runs)
//! - Run timed pulses with a [`PulseController`](devices::PulseController): one pulse at a time,
//!   pin set back LOW on every exit path (completion, cancellation, shutdown)
//! - Drive it through generic key/value commands with the [`CharUnitLoad`](service::CharUnitLoad)
//!   service, configured from JSON
//!
//! # Getting Started
//!
//! The following code pulses pin "11" of a virtual board for 500ms.
//! ```rust
//! use std::time::Duration;
//!
//! use char_unit::devices::PulseController;
//! use char_unit::hardware::VirtualBoard;
//!
//! #[tokio::main]
//! async fn main() {
//!     let board = VirtualBoard::new("b1").with_pins(["11"]);
//!     let controller = PulseController::new(Box::new(board.clone()));
//!
//!     controller.pulse("11", Duration::from_millis(500)).await.unwrap();
//!     assert_eq!(board.is_high("11"), Some(false));
//! }
//! ```
//!
//! # Feature flags
//!
//! - **mocks** -- Provides mocked entities of all kinds (useful for tests mostly).

pub mod devices;
pub mod errors;
pub mod hardware;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod service;
pub mod utils;
