//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions over the machine context and the event
//! being processed. A guard that fails makes its transition behave as if it
//! did not exist: the event falls through to the next candidate, or is
//! ignored.

use std::fmt;
use std::sync::Arc;

/// Named pure predicate that determines if a transition can execute.
///
/// # Example
///
/// ```rust
/// use feedback_flow::core::{FeedbackContext, FeedbackEvent, Guard};
///
/// let form_valid = Guard::named("formValid", |_ctx: &FeedbackContext, event: &FeedbackEvent| {
///     matches!(event, FeedbackEvent::Submit { value } if !value.is_empty())
/// });
///
/// let context = FeedbackContext::default();
/// assert!(form_valid.check(&context, &FeedbackEvent::submit("too slow")));
/// assert!(!form_valid.check(&context, &FeedbackEvent::submit("")));
/// ```
pub struct Guard<C, E> {
    name: &'static str,
    predicate: Arc<dyn Fn(&C, &E) -> bool + Send + Sync>,
}

impl<C, E> Guard<C, E> {
    /// Create an anonymous guard from a pure predicate.
    ///
    /// The predicate must be deterministic and thread-safe.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C, &E) -> bool + Send + Sync + 'static,
    {
        Self::named("anonymous", predicate)
    }

    /// Create a guard with a name used in diagnostics.
    pub fn named<F>(name: &'static str, predicate: F) -> Self
    where
        F: Fn(&C, &E) -> bool + Send + Sync + 'static,
    {
        Guard {
            name,
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Evaluate the predicate without side effects.
    pub fn check(&self, context: &C, event: &E) -> bool {
        (self.predicate)(context, event)
    }
}

impl<C, E> Clone for Guard<C, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<C, E> fmt::Debug for Guard<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Counter {
        value: u32,
    }

    #[derive(Debug)]
    enum Input {
        Add(u32),
        Reset,
    }

    #[test]
    fn guard_sees_context_and_event() {
        let below_limit = Guard::new(|ctx: &Counter, event: &Input| match event {
            Input::Add(n) => ctx.value + n <= 10,
            Input::Reset => true,
        });

        let ctx = Counter { value: 8 };
        assert!(below_limit.check(&ctx, &Input::Add(2)));
        assert!(!below_limit.check(&ctx, &Input::Add(3)));
        assert!(below_limit.check(&ctx, &Input::Reset));
    }

    #[test]
    fn guard_is_deterministic() {
        let guard = Guard::new(|ctx: &Counter, _event: &Input| ctx.value < 5);
        let ctx = Counter { value: 4 };

        let result1 = guard.check(&ctx, &Input::Reset);
        let result2 = guard.check(&ctx, &Input::Reset);

        assert_eq!(result1, result2);
    }

    #[test]
    fn clones_share_predicate() {
        let guard = Guard::named("even", |ctx: &Counter, _event: &Input| ctx.value % 2 == 0);
        let cloned = guard.clone();

        assert_eq!(cloned.name(), "even");
        assert!(cloned.check(&Counter { value: 2 }, &Input::Reset));
        assert!(!cloned.check(&Counter { value: 3 }, &Input::Reset));
    }

    #[test]
    fn unnamed_guard_reports_placeholder() {
        let guard = Guard::new(|_: &Counter, _: &Input| true);
        assert_eq!(guard.name(), "anonymous");
        assert_eq!(format!("{guard:?}"), r#"Guard { name: "anonymous" }"#);
    }
}
