pub mod commands;
pub mod controller;
pub mod state;

pub use commands::{BlockQuery, BlockQueryResponse};
pub use controller::{BlockController, ControllerSnapshot};
pub use state::{SchedulerState, SchedulerStatus};
