//! Human verification module
//!
//! This module contains the random code generator and the gate that only
//! releases an action once the displayed code has been retyped.

pub mod code;
pub mod gate;

// Re-export main types
pub use code::{generate_random_string, CodeGenerator, FixedCode, RandomCode};
pub use gate::{ChallengeGate, Submission, SUBMIT_KEY};
