//! The imperative shell around the pure machine.

mod error;
mod widget;

pub use error::WidgetError;
pub use widget::{FeedbackWidget, WidgetBuilder, WidgetId};
