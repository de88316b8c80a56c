//! Block Pause - A challenge-gated control for temporarily pausing blocking
//!
//! This library provides the state machine behind a "disable for a few
//! minutes" button: a retyped random code guards the pause, a live countdown
//! shows when blocking comes back, and the persisted state decides every
//! render.

pub mod config;
pub mod state;
pub mod challenge;
pub mod controller;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, Phase, StoredState, View};
pub use controller::{Event, MachineSettings, ToggleMachine};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
