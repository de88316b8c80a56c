//! File-backed blocking backend with a resume alarm

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{anyhow, Context};
use serde_json::{json, Value};
use tokio::{task::JoinHandle, time::sleep};
use tracing::{debug, error, info, warn};

use super::{BlockingBackend, Clock};
use crate::state::StoredState;

/// Keeps the blocking state in memory, optionally mirrored to a JSON file.
///
/// Toggling to "not blocking" stamps a resume time and arms an alarm that
/// restores blocking when it fires. Clearing the alarm cancels it.
#[derive(Clone)]
pub struct LocalBackend<C: Clock> {
    inner: Arc<Inner<C>>,
}

struct Inner<C> {
    path: Option<PathBuf>,
    disable_duration: Duration,
    clock: C,
    state: Mutex<StoredState>,
    alarm: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Clock> LocalBackend<C> {
    /// Create a backend that forgets everything on exit
    pub fn in_memory(disable_duration: Duration, clock: C) -> Self {
        Self::with_state(None, StoredState::default(), disable_duration, clock)
    }

    /// Create a backend persisted at `path`, loading any state already there
    pub fn open(path: Option<PathBuf>, disable_duration: Duration, clock: C) -> anyhow::Result<Self> {
        let initial = match &path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read state file {}", path.display()))?;
                match serde_json::from_str::<StoredState>(&raw) {
                    Ok(state) => state,
                    Err(e) => {
                        warn!("Ignoring unreadable state file {}: {}", path.display(), e);
                        StoredState::default()
                    }
                }
            }
            _ => StoredState::default(),
        };

        info!(
            "Loaded blocking state: blocking={}, resume_time={:?}",
            initial.is_blocking(),
            initial.resume_time
        );
        Ok(Self::with_state(path, initial, disable_duration, clock))
    }

    fn with_state(path: Option<PathBuf>, state: StoredState, disable_duration: Duration, clock: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                path,
                disable_duration,
                clock,
                state: Mutex::new(state),
                alarm: Mutex::new(None),
            }),
        }
    }

    /// Current persisted values
    pub fn snapshot(&self) -> anyhow::Result<StoredState> {
        self.inner.snapshot()
    }

    /// Overwrite the persisted values without touching the alarm
    pub fn set_state(&self, state: StoredState) -> anyhow::Result<()> {
        self.inner.write_state(state)
    }

    /// Re-arm the alarm for a pause that was persisted before a restart.
    ///
    /// A pause whose resume time already passed is ended immediately.
    pub fn resume_pending_alarm(&self) -> anyhow::Result<()> {
        let state = self.snapshot()?;
        if state.is_blocking() {
            return Ok(());
        }

        match state.resume_time {
            Some(resume_time) => {
                let remaining_ms = resume_time.saturating_sub(self.inner.clock.now_ms());
                if remaining_ms > 0 {
                    Inner::schedule_alarm(&self.inner, Duration::from_millis(remaining_ms as u64))
                } else {
                    info!("Persisted pause already elapsed, re-enabling blocking");
                    self.inner.write_state(StoredState::blocking())
                }
            }
            None => {
                warn!("Blocking is paused without a resume time, no alarm armed");
                Ok(())
            }
        }
    }

    /// Whether an alarm is armed and has not fired yet
    pub fn alarm_pending(&self) -> bool {
        self.inner
            .alarm
            .lock()
            .map(|alarm| alarm.as_ref().is_some_and(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }
}

impl<C: Clock> Inner<C> {
    fn snapshot(&self) -> anyhow::Result<StoredState> {
        self.state
            .lock()
            .map(|state| *state)
            .map_err(|e| anyhow!("Failed to lock blocking state: {}", e))
    }

    /// Persist `new_state`, then make it current.
    ///
    /// The lock is held across the write so a failed write leaves the
    /// previous state in place.
    fn write_state(&self, new_state: StoredState) -> anyhow::Result<()> {
        let mut state = self.state.lock().map_err(|e| anyhow!("Failed to lock blocking state: {}", e))?;
        self.persist(&new_state)?;
        *state = new_state;
        Ok(())
    }

    fn persist(&self, state: &StoredState) -> anyhow::Result<()> {
        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(state)?;
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write state file {}", path.display()))?;
            debug!("Persisted blocking state to {}", path.display());
        }
        Ok(())
    }

    fn clear_alarm(&self) -> anyhow::Result<()> {
        let mut alarm = self.alarm.lock().map_err(|e| anyhow!("Failed to lock resume alarm: {}", e))?;
        if let Some(handle) = alarm.take() {
            handle.abort();
            debug!("Resume alarm cleared");
        }
        Ok(())
    }

    fn schedule_alarm(inner: &Arc<Self>, delay: Duration) -> anyhow::Result<()> {
        let task_inner = Arc::clone(inner);
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            info!("Resume alarm fired, re-enabling blocking");
            if let Err(e) = task_inner.write_state(StoredState::blocking()) {
                error!("Failed to re-enable blocking: {}", e);
            }
        });

        let mut alarm = inner.alarm.lock().map_err(|e| anyhow!("Failed to lock resume alarm: {}", e))?;
        if let Some(previous) = alarm.replace(handle) {
            previous.abort();
        }
        info!("Resume alarm armed for {}s", delay.as_secs());
        Ok(())
    }

    fn toggle(inner: &Arc<Self>) -> anyhow::Result<Value> {
        let current = inner.snapshot()?;
        let next = if current.is_blocking() {
            let pause_ms = i64::try_from(inner.disable_duration.as_millis()).unwrap_or(i64::MAX);
            let resume_time = inner.clock.now_ms().saturating_add(pause_ms);
            StoredState::paused_until(resume_time)
        } else {
            StoredState::blocking()
        };

        inner.write_state(next)?;
        if next.is_blocking() {
            inner.clear_alarm()?;
            info!("Blocking re-enabled");
        } else {
            Self::schedule_alarm(inner, inner.disable_duration)?;
            info!("Blocking paused until {:?}", next.resume_time);
        }

        Ok(json!({ "isBlocking": next.is_blocking() }))
    }
}

impl<C: Clock> BlockingBackend for LocalBackend<C> {
    fn get(&self) -> impl std::future::Future<Output = anyhow::Result<StoredState>> + Send {
        std::future::ready(self.inner.snapshot())
    }

    fn clear_resume_alarm(&self) -> impl std::future::Future<Output = anyhow::Result<()>> + Send {
        std::future::ready(self.inner.clear_alarm())
    }

    fn send_toggle_request(&self) -> impl std::future::Future<Output = anyhow::Result<Value>> + Send {
        let inner = Arc::clone(&self.inner);
        async move { Inner::toggle(&inner) }
    }
}
