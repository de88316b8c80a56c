//! Events consumed by the toggle state machine

use tokio::sync::oneshot;

use crate::state::View;

/// Something that happened on the popup surface or its timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Popup opened, render from the persisted state
    Load,
    /// Main button pressed
    ToggleClicked,
    /// Challenge input text changed
    ChallengeInput(String),
    /// Challenge confirm button pressed
    ConfirmClicked,
    /// Key pressed inside the challenge input
    KeyDown(String),
    /// One-second countdown tick from the ticker with this generation
    CountdownTick { generation: u64 },
}

/// Action the challenge gate releases once passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Toggle,
}

/// An event plus an optional channel for the view it produced
#[derive(Debug)]
pub struct Envelope {
    pub event: Event,
    pub reply: Option<oneshot::Sender<View>>,
}

impl Envelope {
    /// Fire-and-forget envelope
    pub fn event(event: Event) -> Self {
        Self { event, reply: None }
    }

    /// Envelope whose sender waits for the resulting view
    pub fn with_reply(event: Event) -> (Self, oneshot::Receiver<View>) {
        let (tx, rx) = oneshot::channel();
        (Self { event, reply: Some(tx) }, rx)
    }
}
