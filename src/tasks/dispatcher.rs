//! Popup event loop
//!
//! Every user action and countdown tick goes through one channel and is
//! handled to completion before the next one is looked at, so handlers never
//! interleave.

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info};

use crate::{
    controller::{Envelope, Event, ToggleMachine},
    services::{BlockingBackend, Clock},
    state::View,
};

/// Cloneable entry point for posting events to the popup
#[derive(Debug, Clone)]
pub struct PopupHandle {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl PopupHandle {
    pub fn new(tx: mpsc::UnboundedSender<Envelope>) -> Self {
        Self { tx }
    }

    /// Post an event and wait for the view rendered after handling it
    pub async fn dispatch(&self, event: Event) -> Result<View, String> {
        let (envelope, reply) = Envelope::with_reply(event);
        self.tx
            .send(envelope)
            .map_err(|e| format!("Popup event loop is not running: {}", e))?;
        reply
            .await
            .map_err(|e| format!("Popup event loop dropped the reply: {}", e))
    }
}

/// A running popup event loop
#[derive(Debug)]
pub struct Popup {
    pub handle: PopupHandle,
    pub view_rx: watch::Receiver<View>,
    pub task: JoinHandle<()>,
}

/// Start the event loop for `machine` on its own task
pub fn spawn_popup<B, C>(machine: ToggleMachine<B, C>, events: mpsc::UnboundedReceiver<Envelope>) -> Popup
where
    B: BlockingBackend,
    C: Clock,
{
    let handle = machine.popup_handle();
    let view_rx = machine.subscribe();
    let task = tokio::spawn(run_dispatcher(machine, events));

    Popup { handle, view_rx, task }
}

/// Handle events one at a time until every sender is gone
pub async fn run_dispatcher<B, C>(mut machine: ToggleMachine<B, C>, mut events: mpsc::UnboundedReceiver<Envelope>)
where
    B: BlockingBackend,
    C: Clock,
{
    info!("Starting popup event loop");

    while let Some(Envelope { event, reply }) = events.recv().await {
        debug!("Handling popup event: {:?}", event);
        machine.handle(event).await;

        if let Some(reply) = reply {
            if reply.send(machine.view()).is_err() {
                debug!("Event sender stopped waiting for the view");
            }
        }
    }

    info!("Popup event loop stopped");
}
