//! Feedback Flow: a hierarchical state machine for an embeddable feedback widget
//!
//! The widget asks a single question, collects an optional written
//! explanation, submits it to an unreliable service and thanks the user.
//! Everything it does is driven by an explicit transition table.
//!
//! The crate follows a "pure core, imperative shell" layout:
//!
//! - **core**: states, context, events, guards and history
//! - **machine**: the transition table and the pure [`FeedbackMachine`]
//! - **builder**: fluent construction of transition tables
//! - **effects**: commands, injected services and notification hooks
//! - **runtime**: the tokio interpreter behind [`FeedbackWidget`]
//! - **config**: retry bound, submission timeout and retry policy
//!
//! # Example
//!
//! ```rust
//! use feedback_flow::machine::{feedback_table, FeedbackMachine, StepOutcome};
//! use feedback_flow::{FeedbackConfig, FeedbackEvent, FeedbackState, FormState};
//! use std::sync::Arc;
//!
//! let table = feedback_table(&FeedbackConfig::default()).unwrap();
//! let (mut machine, _commands) = FeedbackMachine::start(Arc::new(table));
//!
//! machine.send(FeedbackEvent::Bad);
//! assert_eq!(machine.state(), &FeedbackState::Form(FormState::Pending));
//!
//! // Empty explanations are rejected without leaving the form
//! let step = machine.send(FeedbackEvent::submit(""));
//! assert!(matches!(step.outcome, StepOutcome::Ignored(_)));
//!
//! machine.send(FeedbackEvent::submit("too slow"));
//! assert!(machine.snapshot().matches("form.loading"));
//! assert_eq!(machine.context().response, "too slow");
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod effects;
pub mod machine;
pub mod runtime;

// Re-export commonly used types
pub use config::{FeedbackConfig, RetryPolicy};
pub use core::{FeedbackContext, FeedbackEvent, FeedbackState, FormState, State, StateHistory};
pub use machine::{FeedbackMachine, Snapshot};
pub use runtime::{FeedbackWidget, WidgetError};
