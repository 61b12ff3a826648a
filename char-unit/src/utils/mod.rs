pub use tokio::time::sleep;

pub use events::{EventHandler, EventManager};

pub mod events;
pub(crate) mod file;
pub mod task;
