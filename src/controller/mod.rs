//! Toggle controller module
//!
//! This module contains the events the popup reacts to and the state machine
//! that turns them into blocking toggles and countdown renders.

pub mod events;
pub mod toggle;

// Re-export main types
pub use events::{Envelope, Event, PendingAction};
pub use toggle::{MachineSettings, ToggleMachine};
