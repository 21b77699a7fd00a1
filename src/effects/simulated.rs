//! Stand-in services for demos and manual testing.

use super::error::ServiceError;
use super::services::{AuxiliaryContentSource, FeedbackSubmitter};
use crate::core::{Feedback, FeedbackContext};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1500);
pub const DEFAULT_FAILURE_RATE: f64 = 0.9;

/// Submitter that answers after a fixed latency and fails at random.
///
/// On success the feedback message is the response prefixed with
/// `"Feedback: "`.
#[derive(Debug, Clone)]
pub struct FlakySubmitter {
    latency: Duration,
    failure_rate: f64,
}

impl FlakySubmitter {
    /// `failure_rate` is clamped to `[0.0, 1.0]`.
    pub fn new(failure_rate: f64) -> Self {
        Self {
            latency: DEFAULT_LATENCY,
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }
}

impl Default for FlakySubmitter {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_RATE)
    }
}

#[async_trait]
impl FeedbackSubmitter for FlakySubmitter {
    async fn submit_feedback(&self, context: FeedbackContext) -> Result<Feedback, ServiceError> {
        let fails = rand::rng().random::<f64>() < self.failure_rate;
        tokio::time::sleep(self.latency).await;

        if fails {
            Err(ServiceError::Unavailable("Something went wrong".to_string()))
        } else {
            Ok(Feedback::new(format!("Feedback: {}", context.response)))
        }
    }
}

/// Content source that always yields the same text.
#[derive(Debug, Clone)]
pub struct StaticContent(pub String);

#[async_trait]
impl AuxiliaryContentSource for StaticContent {
    async fn fetch_auxiliary_content(&self) -> Result<String, ServiceError> {
        Ok(self.0.clone())
    }
}

/// Content source that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableContent;

#[async_trait]
impl AuxiliaryContentSource for UnavailableContent {
    async fn fetch_auxiliary_content(&self) -> Result<String, ServiceError> {
        Err(ServiceError::Unavailable("no auxiliary content".to_string()))
    }
}
