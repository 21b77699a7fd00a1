//! Tokio interpreter for the feedback machine.
//!
//! The widget owns one [`FeedbackMachine`] behind a mutex. Commands returned
//! by a step are executed while the lock is still held, so the snapshot a
//! step publishes and the tasks it starts are never interleaved with another
//! dispatch. Effect hooks run after the lock is released.

use super::error::WidgetError;
use crate::config::FeedbackConfig;
use crate::core::{FeedbackContext, FeedbackEvent, FeedbackState, StateHistory, StateNode, Token};
use crate::effects::{
    AuxiliaryContentSource, Command, EffectHooks, FeedbackSubmitter, Notification, ServiceKind,
    TracingHooks,
};
use crate::machine::{feedback_table, FeedbackMachine, Snapshot, StepOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Identifies one widget instance in log output.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct WidgetId(Uuid);

impl WidgetId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone)]
struct Services {
    content: Arc<dyn AuxiliaryContentSource>,
    submitter: Arc<dyn FeedbackSubmitter>,
    hooks: Arc<dyn EffectHooks>,
}

struct Inner {
    id: WidgetId,
    machine: Mutex<FeedbackMachine>,
    snapshots: watch::Sender<Snapshot>,
    services: Services,
    runtime: Handle,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// A running feedback widget.
///
/// Dropping the widget aborts every service call and timer it started.
///
/// # Example
///
/// ```rust
/// use feedback_flow::effects::{FlakySubmitter, StaticContent};
/// use feedback_flow::{FeedbackEvent, FeedbackWidget};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let widget = FeedbackWidget::builder()
///     .content_source(StaticContent("dog.jpg".to_string()))
///     .submitter(FlakySubmitter::default())
///     .build()
///     .unwrap();
///
/// let snapshot = widget.send(FeedbackEvent::Bad);
/// assert!(snapshot.matches("form.pending"));
/// # }
/// ```
pub struct FeedbackWidget {
    inner: Arc<Inner>,
}

impl FeedbackWidget {
    pub fn builder() -> WidgetBuilder {
        WidgetBuilder::new()
    }

    pub fn id(&self) -> WidgetId {
        self.inner.id
    }

    /// Apply `event` and return the resulting snapshot.
    ///
    /// Events the current state does not handle return the unchanged
    /// snapshot.
    pub fn send(&self, event: FeedbackEvent) -> Snapshot {
        self.inner.dispatch(event)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.lock_machine().snapshot()
    }

    pub fn state(&self) -> FeedbackState {
        *self.inner.lock_machine().state()
    }

    /// Whether `event` would change the state right now.
    pub fn can(&self, event: &FeedbackEvent) -> bool {
        self.inner.lock_machine().can(event)
    }

    /// Receive every snapshot published after a change, including changes
    /// driven by service completions and timers.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.snapshots.subscribe()
    }

    pub fn history(&self) -> StateHistory<FeedbackState> {
        self.inner.lock_machine().history().clone()
    }
}

impl fmt::Debug for FeedbackWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedbackWidget")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for FeedbackWidget {
    fn drop(&mut self) {
        let tasks = self
            .inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for task in tasks.iter() {
            task.abort();
        }
        tracing::debug!(widget = %self.inner.id, "Feedback widget dropped");
    }
}

impl Inner {
    fn lock_machine(&self) -> std::sync::MutexGuard<'_, FeedbackMachine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(self: &Arc<Self>, event: FeedbackEvent) -> Snapshot {
        let kind = event.kind();

        let (snapshot, notifications) = {
            let mut machine = self.lock_machine();
            let step = machine.send(event);
            let snapshot = machine.snapshot();

            match &step.outcome {
                StepOutcome::Transitioned { from, to } => tracing::debug!(
                    widget = %self.id,
                    from = %from,
                    to = %to,
                    event = %kind,
                    "Transitioned"
                ),
                StepOutcome::Updated => {
                    tracing::debug!(widget = %self.id, event = %kind, "Handled without transition")
                }
                StepOutcome::Ignored(reason) => tracing::debug!(
                    widget = %self.id,
                    event = %kind,
                    reason = ?reason,
                    state = %snapshot.state,
                    "Event ignored"
                ),
            }

            if step.changed() {
                self.publish(&snapshot);
            }
            let notifications = self.execute(step.commands, &snapshot.context);
            (snapshot, notifications)
        };

        for notification in notifications {
            self.services.hooks.notify(notification, &snapshot.context);
        }
        snapshot
    }

    /// Wake subscribers only when the snapshot actually differs.
    fn publish(&self, snapshot: &Snapshot) {
        self.snapshots.send_if_modified(|current| {
            if current == snapshot {
                return false;
            }
            *current = snapshot.clone();
            true
        });
    }

    /// Start invocations and timers; hand notifications back to the caller.
    fn execute(self: &Arc<Self>, commands: Vec<Command>, context: &FeedbackContext) -> Vec<Notification> {
        let mut notifications = Vec::new();
        for command in commands {
            match command {
                Command::Invoke {
                    service,
                    token,
                    delay,
                } => self.spawn_invocation(service, token, delay, context.clone()),
                Command::StartTimer { node, token, delay } => self.spawn_timer(node, token, delay),
                Command::Notify(notification) => notifications.push(notification),
            }
        }
        notifications
    }

    fn spawn_invocation(
        self: &Arc<Self>,
        service: ServiceKind,
        token: Token,
        delay: Duration,
        context: FeedbackContext,
    ) {
        let widget = Arc::downgrade(self);
        let services = self.services.clone();
        let id = self.id;

        let task = self.runtime.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let event = match service {
                ServiceKind::AuxiliaryContent => {
                    match services.content.fetch_auxiliary_content().await {
                        Ok(content) => FeedbackEvent::AuxiliaryLoaded { token, content },
                        Err(error) => {
                            tracing::debug!(widget = %id, error = %error, "Auxiliary content unavailable");
                            FeedbackEvent::AuxiliaryFailed { token, error }
                        }
                    }
                }
                ServiceKind::SubmitFeedback => {
                    match services.submitter.submit_feedback(context).await {
                        Ok(feedback) => FeedbackEvent::SubmitSucceeded { token, feedback },
                        Err(error) => {
                            tracing::warn!(widget = %id, error = %error, "Feedback submission failed");
                            FeedbackEvent::SubmitFailed { token, error }
                        }
                    }
                }
            };

            deliver(&widget, event);
        });
        self.track(task);
    }

    fn spawn_timer(self: &Arc<Self>, node: StateNode, token: Token, delay: Duration) {
        let widget = Arc::downgrade(self);
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            deliver(&widget, FeedbackEvent::TimedOut { node, token });
        });
        self.track(task);
    }

    fn track(&self, task: JoinHandle<()>) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|t| !t.is_finished());
        tasks.push(task);
    }
}

fn deliver(widget: &Weak<Inner>, event: FeedbackEvent) {
    if let Some(inner) = widget.upgrade() {
        inner.dispatch(event);
    }
}

/// Builder for [`FeedbackWidget`].
pub struct WidgetBuilder {
    config: FeedbackConfig,
    content: Option<Arc<dyn AuxiliaryContentSource>>,
    submitter: Option<Arc<dyn FeedbackSubmitter>>,
    hooks: Arc<dyn EffectHooks>,
}

impl Default for WidgetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetBuilder {
    pub fn new() -> Self {
        Self {
            config: FeedbackConfig::default(),
            content: None,
            submitter: None,
            hooks: Arc::new(TracingHooks),
        }
    }

    pub fn config(mut self, config: FeedbackConfig) -> Self {
        self.config = config;
        self
    }

    /// Service invoked on entry to the question screen (required).
    pub fn content_source(mut self, source: impl AuxiliaryContentSource + 'static) -> Self {
        self.content = Some(Arc::new(source));
        self
    }

    /// Service invoked on entry to `form.loading` (required).
    pub fn submitter(mut self, submitter: impl FeedbackSubmitter + 'static) -> Self {
        self.submitter = Some(Arc::new(submitter));
        self
    }

    /// Receiver for notifications. Defaults to [`TracingHooks`].
    pub fn hooks(mut self, hooks: impl EffectHooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Start the widget in `question`, with the auxiliary fetch already
    /// running. Must be called from within a tokio runtime.
    pub fn build(self) -> Result<FeedbackWidget, WidgetError> {
        let runtime = Handle::try_current().map_err(|_| WidgetError::NoRuntime)?;
        self.config.check().map_err(WidgetError::InvalidConfig)?;

        let content = self
            .content
            .ok_or(WidgetError::MissingService("auxiliary content source"))?;
        let submitter = self
            .submitter
            .ok_or(WidgetError::MissingService("feedback submitter"))?;

        let table = feedback_table(&self.config)?;
        let (machine, commands) = FeedbackMachine::start(Arc::new(table));
        let snapshot = machine.snapshot();
        let (snapshots, _) = watch::channel(snapshot.clone());

        let inner = Arc::new(Inner {
            id: WidgetId::new(),
            machine: Mutex::new(machine),
            snapshots,
            services: Services {
                content,
                submitter,
                hooks: self.hooks,
            },
            runtime,
            tasks: Mutex::new(Vec::new()),
        });

        tracing::info!(
            widget = %inner.id,
            max_retries = self.config.max_retries,
            submit_timeout_ms = u64::try_from(self.config.submit_timeout.as_millis()).unwrap_or(u64::MAX),
            "Feedback widget created"
        );

        let notifications = {
            let _machine = inner.lock_machine();
            inner.execute(commands, &snapshot.context)
        };
        for notification in notifications {
            inner.services.hooks.notify(notification, &snapshot.context);
        }

        Ok(FeedbackWidget { inner })
    }
}
