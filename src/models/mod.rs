pub mod session;

pub use session::{SessionSnapshot, SessionState};
