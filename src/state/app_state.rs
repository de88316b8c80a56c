//! Shared state handed to the HTTP layer

use std::time::Instant;

use tokio::sync::watch;

use super::View;
use crate::{controller::Event, tasks::PopupHandle};

/// State shared by all HTTP handlers
///
/// Handlers never touch the state machine directly: every user action is
/// posted to the dispatcher, which serializes it with countdown ticks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Sender side of the popup event loop
    pub popup: PopupHandle,
    /// Latest rendered view
    pub view_rx: watch::Receiver<View>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
}

impl AppState {
    /// Create a new AppState around a running dispatcher
    pub fn new(popup: PopupHandle, view_rx: watch::Receiver<View>, port: u16, host: String) -> Self {
        Self {
            popup,
            view_rx,
            start_time: Instant::now(),
            port,
            host,
        }
    }

    /// Post a user event and wait for the view it produced
    pub async fn dispatch(&self, event: Event) -> Result<View, String> {
        self.popup.dispatch(event).await
    }

    /// Get the most recently rendered view
    pub fn current_view(&self) -> View {
        self.view_rx.borrow().clone()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
