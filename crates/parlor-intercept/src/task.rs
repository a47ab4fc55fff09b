//! The task contract: what a task does on execute and which packets it
//! wants to see.
//!
//! A task is a plain struct holding its parameters and a private state
//! enum. Its subscription table is built by an associated function, once
//! per task type, and maps packet filters to handler functions:
//!
//! ```text
//! Subscription::message::<CantConnectMsg>(Self::on_cant_connect)
//! Subscription::identifier(STRIPINFO, Self::on_strip_info).on(Variant::Legacy)
//! ```
//!
//! Handlers receive the task, the decoded message (for typed
//! subscriptions), and an [`Intercept`] over the packet in flight.

use parlor_protocol::{
    Direction, Dispatcher, Identifier, Message, MessageKind, Packet, ProtocolError, Variant,
};
use tokio::sync::mpsc;

use crate::TaskError;
use crate::handle::Completion;

// ---------------------------------------------------------------------------
// InterceptorTask
// ---------------------------------------------------------------------------

/// A multi-packet exchange that resolves to one typed outcome.
pub trait InterceptorTask: Send + Sized + 'static {
    /// The task's result type.
    type Output: Send + 'static;

    /// Task name used in logs.
    const NAME: &'static str;

    /// Performs the initiating side effect, usually sending a request.
    ///
    /// An error here resolves the task's handle to that error and no
    /// subscriptions are installed.
    fn on_execute(&mut self, cx: &TaskContext<'_>) -> Result<(), TaskError>;

    /// The task's subscription table, in handler priority order.
    fn subscriptions() -> Vec<Subscription<Self>>;
}

// ---------------------------------------------------------------------------
// TaskContext
// ---------------------------------------------------------------------------

/// What a task can reach outside itself: the session's dispatcher and the
/// host's outbound channel.
#[derive(Clone, Copy)]
pub struct TaskContext<'a> {
    dispatcher: &'a Dispatcher,
    outbound: &'a mpsc::UnboundedSender<Packet>,
}

impl<'a> TaskContext<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher, outbound: &'a mpsc::UnboundedSender<Packet>) -> Self {
        Self {
            dispatcher,
            outbound,
        }
    }

    /// The session's protocol variant.
    pub fn variant(&self) -> Variant {
        self.dispatcher.variant()
    }

    pub fn dispatcher(&self) -> &'a Dispatcher {
        self.dispatcher
    }

    /// Returns `true` if `packet` carries `identifier` on this session.
    pub fn is(&self, packet: &Packet, identifier: Identifier) -> bool {
        self.dispatcher.is(packet, identifier)
    }

    /// Composes `message` for the session variant and hands it to the host.
    ///
    /// The host routes the packet by its direction: outgoing packets go to
    /// the server, incoming ones to the client.
    pub fn send<M: Message>(&self, message: &M) -> Result<(), TaskError> {
        let packet = self.dispatcher.compose(message)?;
        tracing::trace!(
            msg = M::NAME,
            header = %packet.header(),
            direction = %packet.direction(),
            "sending"
        );
        self.send_packet(packet)
    }

    /// Hands an already-built packet to the host.
    pub fn send_packet(&self, packet: Packet) -> Result<(), TaskError> {
        if packet.variant() != self.variant() {
            return Err(ProtocolError::VariantMismatch {
                expected: self.variant(),
                actual: packet.variant(),
            }
            .into());
        }
        self.outbound.send(packet).map_err(|_| TaskError::Send)
    }
}

// ---------------------------------------------------------------------------
// Intercept
// ---------------------------------------------------------------------------

/// One packet in flight, lent to a handler for the duration of one call.
///
/// Through it a handler can read, rewrite, clear or block the packet, send
/// other packets, and complete its task.
pub struct Intercept<'a, O> {
    packet: &'a mut Packet,
    completion: &'a Completion<O>,
    context: TaskContext<'a>,
}

impl<'a, O> Intercept<'a, O> {
    pub(crate) fn new(packet: &'a mut Packet, completion: &'a Completion<O>, context: TaskContext<'a>) -> Self {
        Self {
            packet,
            completion,
            context,
        }
    }

    pub fn packet(&self) -> &Packet {
        &*self.packet
    }

    /// The packet for reading and in-place edits (`read_*`, `replace_*`,
    /// `write_*`).
    pub fn packet_mut(&mut self) -> &mut Packet {
        &mut *self.packet
    }

    pub fn variant(&self) -> Variant {
        self.packet.variant()
    }

    /// Stops the packet from being forwarded.
    pub fn block(&mut self) {
        self.packet.block();
    }

    pub fn is_blocked(&self) -> bool {
        self.packet.is_blocked()
    }

    /// Empties the payload so it can be rewritten from scratch.
    pub fn clear(&mut self) {
        self.packet.clear();
    }

    /// Replaces the whole payload with `message`, composed for the
    /// packet's variant.
    pub fn rewrite<M: Message>(&mut self, message: &M) -> Result<(), TaskError> {
        self.packet.clear();
        message.compose(&mut *self.packet)?;
        self.packet.reset();
        Ok(())
    }

    pub fn context(&self) -> TaskContext<'a> {
        self.context
    }

    /// See [`TaskContext::send`].
    pub fn send<M: Message>(&self, message: &M) -> Result<(), TaskError> {
        self.context.send(message)
    }

    /// Completes the task with `value`. Returns `false` if it already had
    /// an outcome.
    pub fn complete(&self, value: O) -> bool {
        self.completion.complete(value)
    }

    /// Fails the task. Returns `false` if it already had an outcome.
    pub fn fail(&self, error: TaskError) -> bool {
        self.completion.fail(error)
    }

    pub fn is_completed(&self) -> bool {
        self.completion.is_done()
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

pub(crate) type Handler<T> = Box<
    dyn Fn(&mut T, &mut Intercept<'_, <T as InterceptorTask>::Output>) -> Result<(), TaskError>
        + Send
        + Sync,
>;

/// Which packets a subscription sees.
#[derive(Debug, Clone, Copy)]
pub enum Filter {
    /// Packets the dispatcher resolves to this message kind.
    Message(MessageKind),
    /// Packets carrying this identifier, decoded or not.
    Identifier(Identifier),
    /// Packets in `direction` the predicate accepts.
    Predicate(Direction, fn(&mut Packet) -> bool),
}

/// One row of a task's subscription table.
pub struct Subscription<T: InterceptorTask> {
    pub(crate) filter: Filter,
    pub(crate) variant: Option<Variant>,
    pub(crate) handler: Handler<T>,
}

impl<T: InterceptorTask> Subscription<T> {
    /// Subscribes to message type `M`. The handler gets the message parsed
    /// from the start of the payload; a decode failure fails the task.
    pub fn message<M: Message>(
        handler: fn(&mut T, M, &mut Intercept<'_, T::Output>) -> Result<(), TaskError>,
    ) -> Self {
        Self {
            filter: Filter::Message(MessageKind::of::<M>()),
            variant: None,
            handler: Box::new(move |task: &mut T, intercept: &mut Intercept<'_, T::Output>| {
                let message = intercept.packet_mut().parse::<M>()?;
                intercept.packet_mut().reset();
                handler(task, message, intercept)
            }),
        }
    }

    /// Subscribes to a raw identifier, for packets with no message type.
    pub fn identifier(
        identifier: Identifier,
        handler: fn(&mut T, &mut Intercept<'_, T::Output>) -> Result<(), TaskError>,
    ) -> Self {
        Self {
            filter: Filter::Identifier(identifier),
            variant: None,
            handler: Box::new(handler),
        }
    }

    /// Subscribes to every packet in `direction` that `predicate` accepts.
    pub fn predicate(
        direction: Direction,
        predicate: fn(&mut Packet) -> bool,
        handler: fn(&mut T, &mut Intercept<'_, T::Output>) -> Result<(), TaskError>,
    ) -> Self {
        Self {
            filter: Filter::Predicate(direction, predicate),
            variant: None,
            handler: Box::new(handler),
        }
    }

    /// Restricts the subscription to sessions on `variant`.
    pub fn on(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }
}

impl<T: InterceptorTask> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("task", &T::NAME)
            .field("filter", &self.filter)
            .field("variant", &self.variant)
            .finish()
    }
}
