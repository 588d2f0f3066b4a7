//! Logging macros gated by a module-level `ENABLE_LOGS` flag.
//!
//! Every module that logs declares the flag next to its imports:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_info, log_warn};
//!
//! log_info!("overlay mounted ({} s)", secs);
//! ```
//! Flip the flag to `false` to silence a chatty module (the activity path
//! re-arms the wait timer on every mouse move) without touching `RUST_LOG`
//! or the browser console filter.

/// Debug-level log, emitted only when the calling module sets `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// Info-level log, emitted only when the calling module sets `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Warn-level log, emitted only when the calling module sets `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Error-level log, emitted only when the calling module sets `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}

/// Install `env_logger` for native builds, defaulting to Info unless `RUST_LOG` says otherwise.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_native() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
