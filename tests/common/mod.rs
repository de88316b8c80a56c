//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    future::Future,
    sync::{Arc, Mutex},
};

use anyhow::anyhow;
use serde_json::{json, Value};

use block_pause::{
    services::{BlockingBackend, Clock, ManualClock},
    StoredState,
};

pub const NOW: i64 = 1_700_000_000_000;
pub const PAUSE_MS: i64 = 5 * 60_000;

/// Collaborator calls, in the order the machine made them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Get,
    ClearAlarm,
    Toggle,
}

#[derive(Default)]
struct Script {
    current: StoredState,
    queued_reads: VecDeque<StoredState>,
    toggle_responses: VecDeque<Value>,
    fail_reads: bool,
    fail_clear: bool,
    calls: Vec<Call>,
}

/// Backend whose answers are scripted by the test.
///
/// Without a scripted response a toggle flips the current state the way the
/// real backend does, pausing for five minutes.
#[derive(Clone)]
pub struct ScriptedBackend {
    clock: ManualClock,
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    pub fn new(clock: ManualClock, state: StoredState) -> Self {
        Self {
            clock,
            script: Arc::new(Mutex::new(Script {
                current: state,
                ..Script::default()
            })),
        }
    }

    /// The next read returns `state`, which also becomes current
    pub fn queue_read(&self, state: StoredState) {
        self.script.lock().unwrap().queued_reads.push_back(state);
    }

    /// The next toggle answers `response` without changing any state
    pub fn queue_toggle_response(&self, response: Value) {
        self.script.lock().unwrap().toggle_responses.push_back(response);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.script.lock().unwrap().fail_reads = fail;
    }

    pub fn fail_clear(&self, fail: bool) {
        self.script.lock().unwrap().fail_clear = fail;
    }

    pub fn current(&self) -> StoredState {
        self.script.lock().unwrap().current
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.script.lock().unwrap().calls.clear();
    }

    fn read(&self) -> anyhow::Result<StoredState> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Get);
        if script.fail_reads {
            return Err(anyhow!("store unavailable"));
        }
        if let Some(next) = script.queued_reads.pop_front() {
            script.current = next;
        }
        Ok(script.current)
    }

    fn clear(&self) -> anyhow::Result<()> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::ClearAlarm);
        if script.fail_clear {
            return Err(anyhow!("alarm service unavailable"));
        }
        Ok(())
    }

    fn toggle(&self) -> anyhow::Result<Value> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Toggle);
        if let Some(response) = script.toggle_responses.pop_front() {
            return Ok(response);
        }

        script.current = if script.current.is_blocking() {
            StoredState::paused_until(self.clock.now_ms() + PAUSE_MS)
        } else {
            StoredState::blocking()
        };
        Ok(json!({ "isBlocking": script.current.is_blocking() }))
    }
}

impl BlockingBackend for ScriptedBackend {
    fn get(&self) -> impl Future<Output = anyhow::Result<StoredState>> + Send {
        std::future::ready(self.read())
    }

    fn clear_resume_alarm(&self) -> impl Future<Output = anyhow::Result<()>> + Send {
        std::future::ready(self.clear())
    }

    fn send_toggle_request(&self) -> impl Future<Output = anyhow::Result<Value>> + Send {
        std::future::ready(self.toggle())
    }
}
