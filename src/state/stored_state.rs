//! Persisted blocking state and toggle responses

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Values kept by the persisted store
///
/// Both fields are optional because the store may never have been written.
/// An absent `is_blocking` means blocking is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_blocking: Option<bool>,
    /// Milliseconds since the Unix epoch at which blocking resumes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_time: Option<i64>,
}

impl StoredState {
    /// Blocking state with its default applied
    pub fn is_blocking(&self) -> bool {
        self.is_blocking.unwrap_or(true)
    }

    pub fn blocking() -> Self {
        Self {
            is_blocking: Some(true),
            resume_time: None,
        }
    }

    pub fn paused_until(resume_time: i64) -> Self {
        Self {
            is_blocking: Some(false),
            resume_time: Some(resume_time),
        }
    }
}

/// Well-formed answer to a toggle request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub is_blocking: bool,
}

impl ToggleResponse {
    /// Extract the new blocking state from a raw response.
    ///
    /// Returns `None` when the field is missing or not a boolean.
    pub fn parse(raw: &Value) -> Option<bool> {
        serde_json::from_value::<ToggleResponse>(raw.clone())
            .ok()
            .map(|response| response.is_blocking)
    }
}
