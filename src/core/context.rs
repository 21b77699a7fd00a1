//! Data carried alongside the state for the lifetime of one machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a successful feedback submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl Feedback {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }
}

/// Context accumulated by the feedback machine.
///
/// Only transition actions mutate it. All fields start at their defaults
/// when the machine starts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackContext {
    /// Failed submission attempts in the current retry cycle.
    pub retries: u32,
    /// The user's written explanation, set by a valid `SUBMIT`.
    pub response: String,
    /// Set once, by the successful submission.
    pub feedback: Option<Feedback>,
    /// Result of the fetch started on entering `question`.
    pub auxiliary_content: Option<String>,
}
