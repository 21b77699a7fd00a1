//! The feedback widget's machine definition.

use super::action::Action;
use super::table::{Invocation, TransitionTable};
use crate::builder::{simple_transition, BuildError, TableBuilder, TransitionBuilder};
use crate::config::FeedbackConfig;
use crate::core::{EventKind, FeedbackEvent, StateNode};
use crate::effects::{Notification, ServiceKind};

/// Build the transition table for the feedback widget.
///
/// ```text
/// question --GOOD--> thanks --CLOSE--> closed
///    |  \--CLOSE--> closed                ^
///   BAD                                   |
///    v                                  CLOSE
/// form: pending --SUBMIT--> loading --done/timeout--> submitted => thanks
///          ^                  |  ^
///          +--exhausted-------+  +--retry--+
/// ```
///
/// `config` supplies the retry bound, the submission timeout and the delay
/// policy applied between attempts.
pub fn feedback_table(config: &FeedbackConfig) -> Result<TransitionTable, BuildError> {
    let max_retries = config.max_retries;

    TableBuilder::new()
        .initial(StateNode::Question)
        .invoke(
            StateNode::Question,
            Invocation::new(ServiceKind::AuxiliaryContent),
        )
        .on_exit(
            StateNode::Question,
            Action::Notify(Notification::QuestionExited),
        )
        .on_entry(
            StateNode::Form,
            Action::assign("resetRetries", |ctx, _| ctx.retries = 0),
        )
        .invoke(
            StateNode::FormLoading,
            Invocation::new(ServiceKind::SubmitFeedback).with_retry_policy(config.retry_policy),
        )
        .after(StateNode::FormLoading, config.submit_timeout)
        .on_entry(
            StateNode::Thanks,
            Action::Notify(Notification::ThanksEntered),
        )
        // question
        .transition(
            simple_transition(StateNode::Question, EventKind::Good, StateNode::Thanks)
                .notify(Notification::PositiveOutcome),
        )?
        .transition(simple_transition(
            StateNode::Question,
            EventKind::Bad,
            StateNode::Form,
        ))?
        .transition(simple_transition(
            StateNode::Question,
            EventKind::Close,
            StateNode::Closed,
        ))?
        .transition(
            TransitionBuilder::new()
                .from(StateNode::Question)
                .on(EventKind::AuxiliaryDone)
                .assign("setAuxiliaryContent", |ctx, event| {
                    if let Some(FeedbackEvent::AuxiliaryLoaded { content, .. }) = event {
                        ctx.auxiliary_content = Some(content.clone());
                    }
                }),
        )?
        .transition(
            TransitionBuilder::new()
                .from(StateNode::Question)
                .on(EventKind::AuxiliaryError),
        )?
        // form
        .transition(
            simple_transition(StateNode::FormPending, EventKind::Submit, StateNode::FormLoading)
                .when("formValid", |_, event| {
                    matches!(event, FeedbackEvent::Submit { value } if !value.is_empty())
                })
                .assign("updateResponse", |ctx, event| {
                    if let Some(FeedbackEvent::Submit { value }) = event {
                        ctx.response = value.clone();
                    }
                }),
        )?
        .transition(
            simple_transition(
                StateNode::FormLoading,
                EventKind::SubmitDone,
                StateNode::FormSubmitted,
            )
            .assign("setFeedback", |ctx, event| {
                if let Some(FeedbackEvent::SubmitSucceeded { feedback, .. }) = event {
                    ctx.feedback = Some(feedback.clone());
                }
            }),
        )?
        .transition(
            simple_transition(
                StateNode::FormLoading,
                EventKind::SubmitError,
                StateNode::FormLoading,
            )
            .when("canRetry", move |ctx, _| ctx.retries < max_retries)
            .assign("incrementRetries", |ctx, _| ctx.retries += 1)
            .notify(Notification::SubmissionRetrying),
        )?
        .transition(
            simple_transition(
                StateNode::FormLoading,
                EventKind::SubmitError,
                StateNode::FormPending,
            )
            .assign("resetRetries", |ctx, _| ctx.retries = 0)
            .notify(Notification::RetriesExhausted),
        )?
        .transition(simple_transition(
            StateNode::FormLoading,
            EventKind::Timeout,
            StateNode::FormSubmitted,
        ))?
        .transition(simple_transition(
            StateNode::Form,
            EventKind::Close,
            StateNode::Closed,
        ))?
        .transition(simple_transition(
            StateNode::Form,
            EventKind::FormDone,
            StateNode::Thanks,
        ))?
        // thanks
        .transition(simple_transition(
            StateNode::Thanks,
            EventKind::Close,
            StateNode::Closed,
        ))?
        .build()
}
