//! The imperative edge of the machine.
//!
//! - **Commands**: effects the pure machine asks the runtime to perform
//! - **Services**: async capabilities injected at construction
//! - **Hooks**: receivers for the machine's named side effects
//! - **Simulated**: stand-in services for demos and manual testing

mod command;
mod error;
mod services;
mod simulated;

pub use command::{Command, Notification, ServiceKind};
pub use error::ServiceError;
pub use services::{AuxiliaryContentSource, EffectHooks, FeedbackSubmitter, TracingHooks};
pub use simulated::{
    FlakySubmitter, StaticContent, UnavailableContent, DEFAULT_FAILURE_RATE, DEFAULT_LATENCY,
};
