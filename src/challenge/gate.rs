//! Challenge gate guarding actions behind a retyped code

use tracing::{debug, info};

use super::code::{CodeGenerator, RandomCode};

/// Key that submits the challenge input, same as pressing confirm
pub const SUBMIT_KEY: &str = "Enter";

/// Result of submitting the current input
#[derive(Debug, PartialEq, Eq)]
pub enum Submission<A> {
    /// Input matched, the guarded action is released
    Accepted(A),
    /// Input did not match, the error indicator is shown
    Rejected,
    /// No challenge is waiting for input
    Closed,
}

/// One-shot verification gate.
///
/// `open` shows a fresh code and stores the action to release. The action
/// is handed back exactly once, on the first submission whose input equals
/// the code. A mismatch keeps the gate open with the same code unless
/// regeneration was requested. The code never expires.
pub struct ChallengeGate<A> {
    generator: Box<dyn CodeGenerator>,
    code_length: usize,
    regenerate_on_mismatch: bool,
    code: Option<String>,
    pending: Option<A>,
    input: String,
    error_visible: bool,
    input_focused: bool,
}

impl<A> ChallengeGate<A> {
    pub fn new(code_length: usize) -> Self {
        Self::with_generator(code_length, Box::new(RandomCode))
    }

    pub fn with_generator(code_length: usize, generator: Box<dyn CodeGenerator>) -> Self {
        Self {
            generator,
            code_length,
            regenerate_on_mismatch: false,
            code: None,
            pending: None,
            input: String::new(),
            error_visible: false,
            input_focused: false,
        }
    }

    pub fn regenerate_on_mismatch(mut self, enabled: bool) -> Self {
        self.regenerate_on_mismatch = enabled;
        self
    }

    pub fn set_generator(&mut self, generator: Box<dyn CodeGenerator>) {
        self.generator = generator;
    }

    /// Show a fresh code and wait for it to be retyped before releasing `on_success`
    pub fn open(&mut self, on_success: A) -> &str {
        let code = self.generator.generate(self.code_length);
        info!("Challenge opened with a {}-character code", code.chars().count());

        self.pending = Some(on_success);
        self.input.clear();
        self.error_visible = false;
        self.input_focused = true;
        self.code.insert(code).as_str()
    }

    /// Replace the text typed so far
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Compare the typed text with the displayed code
    pub fn confirm(&mut self) -> Submission<A> {
        let Some(code) = self.code.as_deref() else {
            return Submission::Closed;
        };
        if self.pending.is_none() {
            return Submission::Closed;
        }

        if self.input == code {
            info!("Challenge passed");
            self.error_visible = false;
            match self.pending.take() {
                Some(action) => Submission::Accepted(action),
                None => Submission::Closed,
            }
        } else {
            debug!("Challenge input did not match");
            self.error_visible = true;
            if self.regenerate_on_mismatch {
                self.code = Some(self.generator.generate(self.code_length));
                self.input.clear();
            }
            Submission::Rejected
        }
    }

    /// Handle a keystroke in the input field; only the submit key does anything
    pub fn key_down(&mut self, key: &str) -> Option<Submission<A>> {
        if key == SUBMIT_KEY {
            Some(self.confirm())
        } else {
            None
        }
    }

    /// Put an action back behind the code that was already passed.
    ///
    /// Used when the released action could not complete; the same code stays
    /// on screen and can be confirmed again.
    pub fn rearm(&mut self, on_success: A) {
        if self.code.is_some() {
            self.pending = Some(on_success);
        }
    }

    /// Discard the code and any pending action
    pub fn close(&mut self) {
        if self.code.take().is_some() {
            debug!("Challenge closed");
        }
        self.pending = None;
        self.input.clear();
        self.error_visible = false;
        self.input_focused = false;
    }

    /// Whether a submission can still release an action
    pub fn is_open(&self) -> bool {
        self.code.is_some() && self.pending.is_some()
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn error_visible(&self) -> bool {
        self.error_visible
    }

    pub fn input_focused(&self) -> bool {
        self.input_focused
    }
}
