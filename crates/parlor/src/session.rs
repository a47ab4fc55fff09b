//! `Session` builder and packet plumbing.
//!
//! A session is one client connection seen from the interceptor's side:
//! the host feeds it every packet it relays and drains the packets the
//! tasks want injected.

use std::path::Path;
use std::time::Duration;

use parlor_gamedata::KeyValueMap;
use parlor_intercept::{Interceptor, InterceptorConfig, InterceptorTask, TaskHandle};
use parlor_messages::headers;
use parlor_protocol::{Dispatcher, Id, Message, Packet, Variant, WallLocation};
use parlor_tasks::{EnterRoomResult, EnterRoomTask, PlaceWallItemResult, PlaceWallItemTask};
use tokio::sync::mpsc;

use crate::ParlorError;

/// Builder for a [`Session`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use parlor::prelude::*;
///
/// let session = Session::builder()
///     .variant(Variant::Legacy)
///     .task_timeout(Duration::from_secs(10))
///     .build()
///     .unwrap();
/// assert_eq!(session.variant(), Variant::Legacy);
/// ```
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    config: InterceptorConfig,
    overrides: Vec<KeyValueMap>,
}

impl SessionBuilder {
    /// Creates a builder for a modern session with no task timeout.
    pub fn new() -> Self {
        Self {
            config: InterceptorConfig::default(),
            overrides: Vec::new(),
        }
    }

    /// Sets the protocol variant.
    pub fn variant(mut self, variant: Variant) -> Self {
        self.config.variant = variant;
        self
    }

    /// Cancels tasks still running after `timeout`.
    pub fn task_timeout(mut self, timeout: Duration) -> Self {
        self.config.task_timeout = Some(timeout);
        self
    }

    /// Replaces the whole interceptor configuration.
    pub fn config(mut self, config: InterceptorConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds `In.Name=header` / `Out.Name=header` bindings for the session's
    /// variant. Later tables win over earlier ones.
    pub fn header_overrides(mut self, overrides: KeyValueMap) -> Self {
        self.overrides.push(overrides);
        self
    }

    /// Loads header bindings from a data file.
    pub fn headers_file(self, path: impl AsRef<Path>) -> Result<Self, ParlorError> {
        let overrides = KeyValueMap::load(path)?;
        Ok(self.header_overrides(overrides))
    }

    /// Builds the session's dispatcher and interceptor.
    pub fn build(self) -> Result<Session, ParlorError> {
        let variant = self.config.variant;
        let mut table = headers::default_table();
        for overrides in &self.overrides {
            let applied = table.apply_overrides(variant, overrides);
            tracing::debug!(%variant, applied, "header overrides applied");
        }

        let mut dispatcher = Dispatcher::new(variant, table);
        parlor_messages::register_all(&mut dispatcher);

        let (interceptor, outbound) = Interceptor::channel(self.config, dispatcher)?;
        tracing::info!(%variant, "session ready");
        Ok(Session {
            interceptor,
            outbound,
        })
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An interceptor bound to one connection, together with the queue of
/// packets its tasks inject.
#[derive(Debug)]
pub struct Session {
    interceptor: Interceptor,
    outbound: mpsc::UnboundedReceiver<Packet>,
}

impl Session {
    /// Creates a new builder.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn variant(&self) -> Variant {
        self.interceptor.variant()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        self.interceptor.dispatcher()
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    pub fn interceptor_mut(&mut self) -> &mut Interceptor {
        &mut self.interceptor
    }

    /// Starts `task`. See [`Interceptor::execute`].
    pub fn execute<T: InterceptorTask>(&mut self, task: T) -> TaskHandle<T::Output> {
        self.interceptor.execute(task)
    }

    /// Starts an [`EnterRoomTask`].
    pub fn enter_room(
        &mut self,
        room_id: Id,
        password: Option<String>,
    ) -> TaskHandle<EnterRoomResult> {
        self.execute(EnterRoomTask::new(room_id, password))
    }

    /// Starts a [`PlaceWallItemTask`].
    pub fn place_wall_item(
        &mut self,
        item_id: Id,
        location: WallLocation,
    ) -> TaskHandle<PlaceWallItemResult> {
        self.execute(PlaceWallItemTask::new(item_id, location))
    }

    /// Runs a relayed packet through every active task. The host forwards
    /// the packet afterwards unless it came back blocked.
    pub fn dispatch(&mut self, packet: &mut Packet) -> Result<(), ParlorError> {
        self.interceptor.dispatch(packet)?;
        Ok(())
    }

    /// Encodes `message` with this session's headers.
    pub fn compose<M: Message>(&self, message: &M) -> Result<Packet, ParlorError> {
        Ok(self.dispatcher().compose(message)?)
    }

    /// Takes the next packet a task asked to send, if one is queued.
    pub fn try_next_outbound(&mut self) -> Option<Packet> {
        self.outbound.try_recv().ok()
    }

    /// Waits for the next packet a task asks to send.
    ///
    /// The session holds the sending half, so this only returns `None`
    /// after [`close`](Self::close).
    pub async fn next_outbound(&mut self) -> Option<Packet> {
        self.outbound.recv().await
    }

    /// Detaches every running task and stops accepting injected packets.
    /// Packets already queued can still be drained.
    pub fn close(&mut self) {
        self.interceptor.detach_all();
        self.outbound.close();
    }
}
