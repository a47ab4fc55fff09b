//! The interceptor: hosts running tasks and routes packets to them.
//!
//! The host owns the connection. For every packet it receives it calls
//! [`Interceptor::dispatch`], then forwards the packet unless a handler
//! blocked it. Packets that tasks send arrive on the outbound channel
//! returned by [`Interceptor::channel`].
//!
//! ```text
//! host ──packet──► dispatch ──► task 1 subscriptions (in order)
//!                             ──► task 2 subscriptions (in order)
//!                             ──► ...
//!      ◄──forward unless blocked
//!      ◄──outbound channel── TaskContext::send
//! ```
//!
//! Dispatch is synchronous and takes `&mut self`, so handlers never run
//! concurrently or re-entrantly.

use parlor_protocol::{Direction, Dispatcher, Header, MessageKind, Packet, ProtocolError, Variant};
use tokio::sync::mpsc;

use crate::handle::{Completion, TaskHandle};
use crate::task::{Filter, Handler, Intercept, InterceptorTask, TaskContext};
use crate::{InterceptorConfig, TaskError};

// ---------------------------------------------------------------------------
// Runners
// ---------------------------------------------------------------------------

/// A subscription with its filter resolved against the session's table.
enum Matcher {
    Kind(MessageKind),
    Header(Direction, Header),
    Predicate(Direction, fn(&mut Packet) -> bool),
}

impl Matcher {
    fn accepts(&self, packet: &mut Packet, kind: Option<MessageKind>) -> bool {
        match self {
            Self::Kind(wanted) => kind == Some(*wanted),
            Self::Header(direction, header) => {
                packet.direction() == *direction && packet.header() == *header
            }
            Self::Predicate(direction, predicate) => {
                packet.direction() == *direction
                    && packet.peek(|p| {
                        p.reset();
                        predicate(p)
                    })
            }
        }
    }
}

/// A task type erased behind the operations the engine needs.
trait Runner: Send {
    fn id(&self) -> u64;
    fn name(&self) -> &'static str;
    fn is_done(&self) -> bool;
    fn handle(&mut self, packet: &mut Packet, kind: Option<MessageKind>, cx: TaskContext<'_>);
}

struct TaskRunner<T: InterceptorTask> {
    id: u64,
    task: T,
    subscriptions: Vec<(Matcher, Handler<T>)>,
    completion: Completion<T::Output>,
}

impl<T: InterceptorTask> Runner for TaskRunner<T> {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &'static str {
        T::NAME
    }

    fn is_done(&self) -> bool {
        self.completion.is_done()
    }

    fn handle(&mut self, packet: &mut Packet, kind: Option<MessageKind>, cx: TaskContext<'_>) {
        for (matcher, handler) in &self.subscriptions {
            if self.completion.is_done() {
                break;
            }
            if !matcher.accepts(packet, kind) {
                continue;
            }

            packet.reset();
            let mut intercept = Intercept::new(&mut *packet, &self.completion, cx);
            if let Err(error) = handler(&mut self.task, &mut intercept) {
                tracing::warn!(task = T::NAME, task_id = self.id, %error, "handler failed");
                self.completion.fail(error);
            }
        }
    }
}

impl<T: InterceptorTask> Drop for TaskRunner<T> {
    fn drop(&mut self) {
        if self.completion.fail(TaskError::Detached) {
            tracing::debug!(task = T::NAME, task_id = self.id, "task detached before completion");
        }
    }
}

// ---------------------------------------------------------------------------
// Interceptor
// ---------------------------------------------------------------------------

/// Runs interceptor tasks against one session's packet stream.
pub struct Interceptor {
    config: InterceptorConfig,
    dispatcher: Dispatcher,
    outbound: mpsc::UnboundedSender<Packet>,
    runners: Vec<Box<dyn Runner>>,
    next_id: u64,
}

impl Interceptor {
    /// Creates an interceptor that sends through `outbound`.
    ///
    /// Fails with [`ProtocolError::VariantMismatch`] if the dispatcher was
    /// built for a different variant than `config.variant`.
    pub fn new(
        config: InterceptorConfig,
        dispatcher: Dispatcher,
        outbound: mpsc::UnboundedSender<Packet>,
    ) -> Result<Self, ProtocolError> {
        if dispatcher.variant() != config.variant {
            return Err(ProtocolError::VariantMismatch {
                expected: config.variant,
                actual: dispatcher.variant(),
            });
        }
        Ok(Self {
            config,
            dispatcher,
            outbound,
            runners: Vec::new(),
            next_id: 1,
        })
    }

    /// Creates an interceptor together with the receiving end of its
    /// outbound channel.
    pub fn channel(
        config: InterceptorConfig,
        dispatcher: Dispatcher,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Packet>), ProtocolError> {
        let (tx, rx) = mpsc::unbounded_channel();
        Ok((Self::new(config, dispatcher, tx)?, rx))
    }

    pub fn config(&self) -> &InterceptorConfig {
        &self.config
    }

    pub fn variant(&self) -> Variant {
        self.config.variant
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Number of tasks still waiting for an outcome.
    pub fn active_tasks(&self) -> usize {
        self.runners.iter().filter(|r| !r.is_done()).count()
    }

    /// Starts `task` and returns a handle to its outcome.
    ///
    /// The task's initiating side effect runs before this returns. If it
    /// fails, the handle resolves to that error immediately.
    pub fn execute<T: InterceptorTask>(&mut self, mut task: T) -> TaskHandle<T::Output> {
        let (completion, receiver) = Completion::new();
        let handle = TaskHandle::new(completion.clone(), receiver, self.config.task_timeout);
        let id = self.next_id;
        self.next_id += 1;

        let cx = TaskContext::new(&self.dispatcher, &self.outbound);
        if let Err(error) = task.on_execute(&cx) {
            tracing::warn!(task = T::NAME, task_id = id, %error, "task failed to start");
            completion.fail(error);
            return handle;
        }

        let subscriptions = T::subscriptions()
            .into_iter()
            .filter(|s| s.variant.is_none_or(|v| v == self.config.variant))
            .filter_map(|s| Some((self.resolve(T::NAME, s.filter)?, s.handler)))
            .collect::<Vec<_>>();

        tracing::debug!(
            task = T::NAME,
            task_id = id,
            variant = %self.config.variant,
            subscriptions = subscriptions.len(),
            "task started"
        );
        self.runners.push(Box::new(TaskRunner {
            id,
            task,
            subscriptions,
            completion,
        }));
        handle
    }

    /// Routes one packet through every active task.
    ///
    /// Tasks see the packet in the order they were executed, and each
    /// task's handlers run in subscription order. A task that completes
    /// stops receiving events, including the rest of this one.
    ///
    /// The caller forwards the packet afterwards unless
    /// [`Packet::is_blocked`] is set.
    pub fn dispatch(&mut self, packet: &mut Packet) -> Result<(), ProtocolError> {
        let kind = self.dispatcher.dispatch(packet)?;
        self.prune();

        tracing::trace!(
            header = %packet.header(),
            direction = %packet.direction(),
            name = self.dispatcher.name_of(packet).unwrap_or("?"),
            kind = kind.map(|k| k.name()),
            "dispatch"
        );

        let cx = TaskContext::new(&self.dispatcher, &self.outbound);
        for runner in &mut self.runners {
            if !runner.is_done() {
                runner.handle(packet, kind, cx);
            }
        }
        packet.reset();

        self.prune();
        Ok(())
    }

    /// Drops every task. Tasks without an outcome resolve to
    /// [`TaskError::Detached`].
    pub fn detach_all(&mut self) {
        self.runners.clear();
    }

    fn prune(&mut self) {
        self.runners.retain(|runner| {
            let keep = !runner.is_done();
            if !keep {
                tracing::debug!(task = runner.name(), task_id = runner.id(), "task detached");
            }
            keep
        });
    }

    fn resolve(&self, task: &'static str, filter: Filter) -> Option<Matcher> {
        match filter {
            Filter::Message(kind) => Some(Matcher::Kind(kind)),
            Filter::Identifier(identifier) => match self.dispatcher.header(identifier) {
                Ok(header) => Some(Matcher::Header(identifier.direction, header)),
                Err(error) => {
                    tracing::debug!(task, %error, "subscription skipped");
                    None
                }
            },
            Filter::Predicate(direction, predicate) => Some(Matcher::Predicate(direction, predicate)),
        }
    }
}

impl std::fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor")
            .field("config", &self.config)
            .field("active_tasks", &self.active_tasks())
            .finish()
    }
}
