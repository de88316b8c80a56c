//! External collaborator module
//!
//! This module contains the contract for the system that owns the blocking
//! state, the clock abstraction, and a local file-backed implementation.

pub mod backend;
pub mod clock;
pub mod local;

// Re-export main types
pub use backend::BlockingBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use local::LocalBackend;
