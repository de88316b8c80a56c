//! Contract for the system that owns the blocking state

use std::future::Future;

use serde_json::Value;

use crate::state::StoredState;

/// Commands and reads the toggle state machine issues against the outside world
///
/// The machine never assumes these succeed: failures are logged and the
/// popup stays in whatever state it last rendered.
pub trait BlockingBackend: Send + Sync + 'static {
    /// Read `isBlocking` and `resumeTime` from the persisted store
    fn get(&self) -> impl Future<Output = anyhow::Result<StoredState>> + Send;

    /// Cancel any scheduled automatic resume
    fn clear_resume_alarm(&self) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Ask for the blocking state to be flipped.
    ///
    /// The answer is returned untouched; callers must cope with it not
    /// carrying a boolean `isBlocking`.
    fn send_toggle_request(&self) -> impl Future<Output = anyhow::Result<Value>> + Send;
}
