//! State management module
//!
//! This module contains the persisted blocking state, the rendered view and
//! the state shared with the HTTP layer.

pub mod stored_state;
pub mod view;
pub mod app_state;

// Re-export main types
pub use stored_state::{StoredState, ToggleResponse};
pub use view::{Phase, View};
pub use app_state::AppState;
