//! Tunables of the feedback machine.
//!
//! Validation uses Stillwater's `Validation` so that every problem in a
//! configuration is reported at once instead of one per attempt.
//!
//! # Example
//!
//! ```rust
//! use feedback_flow::config::{ConfigBuilder, RetryPolicy};
//! use std::time::Duration;
//!
//! let config = ConfigBuilder::new()
//!     .max_retries(3)
//!     .submit_timeout(Duration::from_secs(5))
//!     .retry_policy(RetryPolicy::Backoff {
//!         base: Duration::from_millis(100),
//!         cap: Duration::from_secs(1),
//!     })
//!     .build();
//!
//! assert!(config.validate().is_success());
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(2);

/// A single problem found in a configuration
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Submit timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Backoff base must be greater than zero")]
    ZeroBackoffBase,

    #[error("Backoff cap ({cap:?}) is below its base ({base:?})")]
    BackoffCapBelowBase { base: Duration, cap: Duration },

    #[error("Backoff base ({base:?}) must be shorter than the submit timeout ({timeout:?})")]
    BackoffBaseReachesTimeout { base: Duration, timeout: Duration },

    #[error("Backoff cap ({cap:?}) must be shorter than the submit timeout ({timeout:?})")]
    BackoffCapReachesTimeout { cap: Duration, timeout: Duration },

    #[error("Configuration could not be parsed: {0}")]
    Parse(String),
}

/// How soon a failed submission is re-invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Re-invoke as soon as the failure arrives
    #[default]
    Immediate,

    /// Double the delay on every retry, starting at `base`, never above `cap`
    Backoff {
        #[serde(rename = "base_ms", with = "millis")]
        base: Duration,
        #[serde(rename = "cap_ms", with = "millis")]
        cap: Duration,
    },
}

impl RetryPolicy {
    /// Delay before the invocation that follows `retries` failures.
    ///
    /// ```rust
    /// use feedback_flow::config::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::Backoff {
    ///     base: Duration::from_millis(100),
    ///     cap: Duration::from_millis(350),
    /// };
    /// assert_eq!(policy.delay_for(0), Duration::ZERO);
    /// assert_eq!(policy.delay_for(1), Duration::from_millis(100));
    /// assert_eq!(policy.delay_for(2), Duration::from_millis(200));
    /// assert_eq!(policy.delay_for(3), Duration::from_millis(350));
    /// ```
    pub fn delay_for(&self, retries: u32) -> Duration {
        match self {
            Self::Immediate => Duration::ZERO,
            Self::Backoff { .. } if retries == 0 => Duration::ZERO,
            Self::Backoff { base, cap } => {
                let factor = 2u32.saturating_pow(retries - 1);
                base.saturating_mul(factor).min(*cap)
            }
        }
    }
}

/// Feedback machine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Failed submissions retried before returning to the form
    pub max_retries: u32,

    /// Fallback that forces the form to complete if submission hangs
    #[serde(rename = "submit_timeout_ms", with = "millis")]
    pub submit_timeout: Duration,

    pub retry_policy: RetryPolicy,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            retry_policy: RetryPolicy::Immediate,
        }
    }
}

impl FeedbackConfig {
    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check every rule, accumulating ALL violations.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigError>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<ConfigError>>> = Vec::new();

        checks.push(if self.submit_timeout.is_zero() {
            Validation::fail(ConfigError::ZeroTimeout)
        } else {
            Validation::success(())
        });

        if let RetryPolicy::Backoff { base, cap } = self.retry_policy {
            if base.is_zero() {
                checks.push(Validation::fail(ConfigError::ZeroBackoffBase));
            }
            if cap < base {
                checks.push(Validation::fail(ConfigError::BackoffCapBelowBase { base, cap }));
            }

            // Every retry restarts the timeout, so a delay that reaches it
            // lets the timeout win before the retry is invoked.
            let timeout = self.submit_timeout;
            if !timeout.is_zero() {
                if base >= timeout {
                    checks.push(Validation::fail(ConfigError::BackoffBaseReachesTimeout {
                        base,
                        timeout,
                    }));
                }
                if cap >= timeout {
                    checks.push(Validation::fail(ConfigError::BackoffCapReachesTimeout {
                        cap,
                        timeout,
                    }));
                }
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// `validate` flattened into a `Result` listing every violation.
    pub fn check(&self) -> Result<(), Vec<ConfigError>> {
        match self.validate() {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => Err(errors.iter().cloned().collect()),
        }
    }
}

/// Builder for [`FeedbackConfig`]
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: FeedbackConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retry bound
    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    /// Set the submission fallback timeout
    pub fn submit_timeout(mut self, duration: Duration) -> Self {
        self.config.submit_timeout = duration;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config.retry_policy = policy;
        self
    }

    /// Build the configuration. Call `validate` on the result before use.
    pub fn build(self) -> FeedbackConfig {
        self.config
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
