//! Interrupts passive scrolling on recommendation feeds.
//!
//! On a matching host the page gets a wait timer that every bit of user input
//! restarts. When it expires, a block overlay counts down and then goes away,
//! and the next wait is armed. The pure pieces (settings, scheduler,
//! countdown, band geometry, search-box matching) are target independent; the
//! browser glue lives in `web` and the tokio driver in `driver`.

pub mod activity;
pub mod badge;
pub mod clock;
pub mod host;
pub mod models;
pub mod overlay;
pub mod popup;
pub mod ready;
pub mod settings;
pub mod timer;
pub mod utils;

#[cfg(not(target_arch = "wasm32"))]
pub mod driver;

#[cfg(target_arch = "wasm32")]
mod web;

pub use activity::ActivityKind;
pub use host::is_target_host;
pub use overlay::{OverlayStrategy, OverlaySurface};
pub use settings::BlockSettings;
pub use timer::{BlockController, BlockQuery, BlockQueryResponse};
