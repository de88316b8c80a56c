//! Toggle/countdown state machine

use std::time::Duration;

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use super::{Envelope, Event, PendingAction};
use crate::{
    challenge::{ChallengeGate, CodeGenerator, Submission},
    services::{BlockingBackend, Clock},
    state::{
        view::{countdown_label, disable_label, pending_resume_label},
        Phase, StoredState, ToggleResponse, View,
    },
    tasks::{spawn_countdown_ticker, PopupHandle},
};

/// Knobs for the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineSettings {
    /// Minutes a toggle pauses blocking, used in the button labels
    pub disable_minutes: u64,
    pub code_length: usize,
    pub regenerate_on_mismatch: bool,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            disable_minutes: 5,
            code_length: 10,
            regenerate_on_mismatch: false,
        }
    }
}

/// The one live countdown ticker
#[derive(Debug)]
struct Countdown {
    generation: u64,
    resume_time: i64,
    handle: JoinHandle<()>,
}

/// Drives the popup between blocking, challenge, cooldown and resuming.
///
/// The persisted store is the source of truth: every transition re-reads it
/// rather than trusting what was last rendered. At most one countdown ticker
/// exists; it is cancelled before any new one starts and before any toggle
/// command goes out. Ticks carry the generation of the ticker that sent
/// them, so a tick already queued from a cancelled ticker is dropped.
pub struct ToggleMachine<B, C> {
    backend: B,
    clock: C,
    settings: MachineSettings,
    gate: ChallengeGate<PendingAction>,
    phase: Phase,
    button_label: String,
    button_visible: bool,
    challenge_visible: bool,
    countdown: Option<Countdown>,
    next_generation: u64,
    tick_period: Duration,
    events: mpsc::UnboundedSender<Envelope>,
    view_tx: watch::Sender<View>,
}

impl<B: BlockingBackend, C: Clock> ToggleMachine<B, C> {
    /// Create a machine and the receiving end of its event channel
    pub fn new(backend: B, clock: C, settings: MachineSettings) -> (Self, mpsc::UnboundedReceiver<Envelope>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let initial = View::initial(settings.disable_minutes);
        let (view_tx, _) = watch::channel(initial.clone());
        let gate = ChallengeGate::new(settings.code_length)
            .regenerate_on_mismatch(settings.regenerate_on_mismatch);

        let machine = Self {
            backend,
            clock,
            gate,
            phase: initial.phase,
            button_label: initial.button_label,
            button_visible: initial.button_visible,
            challenge_visible: false,
            countdown: None,
            next_generation: 0,
            tick_period: Duration::from_secs(1),
            settings,
            events,
            view_tx,
        };
        (machine, events_rx)
    }

    /// Replace the source of challenge codes
    pub fn with_code_generator(mut self, generator: Box<dyn CodeGenerator>) -> Self {
        self.gate.set_generator(generator);
        self
    }

    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }

    /// Watch every view this machine renders
    pub fn subscribe(&self) -> watch::Receiver<View> {
        self.view_tx.subscribe()
    }

    /// Handle for posting events into this machine's channel
    pub fn popup_handle(&self) -> PopupHandle {
        PopupHandle::new(self.events.clone())
    }

    pub fn view(&self) -> View {
        self.view_tx.borrow().clone()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> &MachineSettings {
        &self.settings
    }

    pub fn has_countdown(&self) -> bool {
        self.countdown.is_some()
    }

    /// Generation of the live countdown ticker, if any
    pub fn countdown_generation(&self) -> Option<u64> {
        self.countdown.as_ref().map(|countdown| countdown.generation)
    }

    pub fn challenge_code(&self) -> Option<&str> {
        self.gate.code()
    }

    /// Process one event to completion
    pub async fn handle(&mut self, event: Event) {
        match event {
            Event::Load => self.load().await,
            Event::ToggleClicked => self.on_toggle_clicked().await,
            Event::ChallengeInput(text) => self.on_challenge_input(text),
            Event::ConfirmClicked => self.on_confirm().await,
            Event::KeyDown(key) => self.on_key_down(&key).await,
            Event::CountdownTick { generation } => self.on_tick(generation).await,
        }
    }

    async fn load(&mut self) {
        let stored = self.read_store().await;
        info!(
            "Popup loaded: blocking={}, resume_time={:?}",
            stored.is_blocking(),
            stored.resume_time
        );
        self.render_state(stored.is_blocking(), stored.resume_time).await;
    }

    async fn on_toggle_clicked(&mut self) {
        if matches!(self.phase, Phase::ChallengePending | Phase::Resuming) {
            debug!("Ignoring toggle click while {:?}", self.phase);
            return;
        }

        let stored = self.read_store().await;
        if stored.is_blocking() {
            self.open_challenge();
        } else {
            // Re-enabling early is not challenged
            self.toggle(false).await;
        }
    }

    fn on_challenge_input(&mut self, text: String) {
        if self.phase != Phase::ChallengePending {
            debug!("Ignoring challenge input while {:?}", self.phase);
            return;
        }
        self.gate.set_input(text);
        self.publish();
    }

    async fn on_confirm(&mut self) {
        if self.phase != Phase::ChallengePending {
            debug!("Ignoring confirm while {:?}", self.phase);
            return;
        }
        let submission = self.gate.confirm();
        self.on_submission(submission).await;
    }

    async fn on_key_down(&mut self, key: &str) {
        if self.phase != Phase::ChallengePending {
            return;
        }
        if let Some(submission) = self.gate.key_down(key) {
            self.on_submission(submission).await;
        }
    }

    async fn on_submission(&mut self, submission: Submission<PendingAction>) {
        match submission {
            Submission::Accepted(PendingAction::Toggle) => self.toggle(true).await,
            Submission::Rejected => {
                info!("Challenge failed, keeping it open");
                self.publish();
            }
            Submission::Closed => debug!("Submission with no challenge pending"),
        }
    }

    async fn on_tick(&mut self, generation: u64) {
        let resume_time = match &self.countdown {
            Some(countdown) if countdown.generation == generation => countdown.resume_time,
            _ => {
                debug!("Dropping stale countdown tick {}", generation);
                return;
            }
        };
        self.render_countdown(resume_time).await;
    }

    /// Clear the alarm, flip blocking, then render whatever the flip reports.
    ///
    /// On any failure the previous render is kept: a cancelled countdown is
    /// restarted toward the same instant and a passed challenge is re-armed.
    async fn toggle(&mut self, from_challenge: bool) {
        let previous_resume = self.cancel_countdown();

        if let Err(e) = self.backend.clear_resume_alarm().await {
            error!("Failed to clear resume alarm: {}", e);
            self.restore_after_failed_toggle(previous_resume, from_challenge);
            return;
        }

        let is_blocking = match self.backend.send_toggle_request().await {
            Ok(raw) => match ToggleResponse::parse(&raw) {
                Some(is_blocking) => is_blocking,
                None => {
                    warn!("Ignoring malformed toggle response: {}", raw);
                    self.restore_after_failed_toggle(previous_resume, from_challenge);
                    return;
                }
            },
            Err(e) => {
                error!("Toggle request failed: {}", e);
                self.restore_after_failed_toggle(previous_resume, from_challenge);
                return;
            }
        };

        info!("Toggle applied, blocking={}", is_blocking);
        let stored = self.read_store().await;
        self.render_state(is_blocking, stored.resume_time).await;
    }

    fn restore_after_failed_toggle(&mut self, previous_resume: Option<i64>, from_challenge: bool) {
        if let Some(resume_time) = previous_resume {
            self.start_countdown(resume_time);
        }
        if from_challenge {
            self.gate.rearm(PendingAction::Toggle);
        }
        self.publish();
    }

    /// Render from a blocking flag and resume time, re-reading the store once
    /// if the resume time has already passed
    async fn render_state(&mut self, is_blocking: bool, resume_time: Option<i64>) {
        if !self.render_settled(is_blocking, resume_time) {
            self.resume().await;
        }
    }

    /// Render a state that needs no store read.
    ///
    /// Returns `false` for a pause whose resume time already passed.
    fn render_settled(&mut self, is_blocking: bool, resume_time: Option<i64>) -> bool {
        self.cancel_countdown();
        if is_blocking {
            self.render_static(true);
            return true;
        }

        match resume_time {
            Some(resume_time) if resume_time > self.clock.now_ms() => {
                self.start_countdown(resume_time);
                true
            }
            Some(_) => false,
            None => {
                self.render_static(false);
                true
            }
        }
    }

    async fn render_countdown(&mut self, resume_time: i64) {
        let remaining_ms = resume_time - self.clock.now_ms();
        if remaining_ms > 0 {
            self.button_label = countdown_label(remaining_ms);
            self.publish();
        } else {
            info!("Countdown finished");
            self.cancel_countdown();
            self.resume().await;
        }
    }

    /// Cooldown is over; let the persisted state decide what comes next
    async fn resume(&mut self) {
        self.phase = Phase::Resuming;
        self.publish();

        let stored = self.read_store().await;
        if !self.render_settled(stored.is_blocking(), stored.resume_time) {
            debug!("Store still reports an elapsed pause");
            self.render_static(false);
        }
    }

    fn start_countdown(&mut self, resume_time: i64) {
        self.cancel_countdown();
        self.close_challenge();

        let generation = self.next_generation;
        self.next_generation += 1;

        self.phase = Phase::Cooldown;
        self.button_visible = true;
        self.button_label = countdown_label(resume_time - self.clock.now_ms());
        let handle = spawn_countdown_ticker(self.events.clone(), generation, self.tick_period);
        self.countdown = Some(Countdown {
            generation,
            resume_time,
            handle,
        });

        debug!("Countdown {} started toward {}", generation, resume_time);
        self.publish();
    }

    /// Stop the live ticker, returning the instant it was counting toward
    fn cancel_countdown(&mut self) -> Option<i64> {
        self.countdown.take().map(|countdown| {
            countdown.handle.abort();
            debug!("Countdown {} cancelled", countdown.generation);
            countdown.resume_time
        })
    }

    fn render_static(&mut self, is_blocking: bool) {
        self.cancel_countdown();
        self.close_challenge();

        if is_blocking {
            self.phase = Phase::Blocking;
            self.button_label = disable_label(self.settings.disable_minutes);
        } else {
            self.phase = Phase::Cooldown;
            self.button_label = pending_resume_label(self.settings.disable_minutes);
        }
        self.button_visible = true;
        self.publish();
    }

    fn open_challenge(&mut self) {
        self.cancel_countdown();
        self.gate.open(PendingAction::Toggle);

        self.phase = Phase::ChallengePending;
        self.button_visible = false;
        self.challenge_visible = true;
        self.publish();
    }

    fn close_challenge(&mut self) {
        self.gate.close();
        self.challenge_visible = false;
    }

    async fn read_store(&self) -> StoredState {
        match self.backend.get().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Failed to read blocking state, assuming defaults: {}", e);
                StoredState::default()
            }
        }
    }

    fn publish(&self) {
        let view = View {
            phase: self.phase,
            button_label: self.button_label.clone(),
            button_visible: self.button_visible,
            challenge_visible: self.challenge_visible,
            challenge_code: if self.challenge_visible {
                self.gate.code().unwrap_or_default().to_string()
            } else {
                String::new()
            },
            challenge_input: self.gate.input().to_string(),
            input_focused: self.challenge_visible && self.gate.input_focused(),
            error_visible: self.challenge_visible && self.gate.error_visible(),
        };
        self.view_tx.send_replace(view);
    }
}

impl<B, C> Drop for ToggleMachine<B, C> {
    fn drop(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.handle.abort();
        }
    }
}
