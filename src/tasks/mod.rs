//! Background tasks module
//!
//! This module contains the popup event loop and the countdown ticker that
//! feeds it.

pub mod countdown;
pub mod dispatcher;

// Re-export main functions
pub use countdown::spawn_countdown_ticker;
pub use dispatcher::{run_dispatcher, spawn_popup, Popup, PopupHandle};
