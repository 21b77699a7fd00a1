use crate::builder::BuildError;
use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised while constructing a widget.
#[derive(Debug, Error, PartialEq)]
pub enum WidgetError {
    #[error("Feedback widget must be built inside a tokio runtime")]
    NoRuntime,

    #[error("Invalid configuration: {0:?}")]
    InvalidConfig(Vec<ConfigError>),

    #[error("Missing service: {0}")]
    MissingService(&'static str),

    #[error("Failed to build transition table: {0}")]
    Build(#[from] BuildError),
}
