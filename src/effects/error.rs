//! Service failure type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by an injected service.
///
/// The machine never propagates these; they are turned into internal events
/// and handled by the transition table.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ServiceError {
    /// The dependency could not be reached
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}
