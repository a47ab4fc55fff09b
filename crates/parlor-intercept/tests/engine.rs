//! Integration tests for the interceptor engine using the real message set
//! and small recording tasks.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use parlor_intercept::{
    Intercept, Interceptor, InterceptorConfig, InterceptorTask, Subscription, TaskContext,
    TaskError,
};
use parlor_messages::headers::legacy;
use parlor_messages::incoming::{CantConnectMsg, RoomEntryInfoMsg};
use parlor_messages::outgoing::GetRoomDataMsg;
use parlor_protocol::{Direction, Header, Id, Packet, ProtocolError, Variant};
use tokio::sync::mpsc;

// =========================================================================
// Test tasks
// =========================================================================

type Log = Arc<Mutex<Vec<String>>>;

fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Records every CantConnect it sees and completes on RoomEntryInfo.
struct Recorder {
    label: &'static str,
    log: Log,
}

impl Recorder {
    fn new(label: &'static str, log: &Log) -> Self {
        Self {
            label,
            log: Arc::clone(log),
        }
    }

    fn record(&self, event: impl std::fmt::Display) {
        self.log.lock().unwrap().push(format!("{}:{}", self.label, event));
    }

    fn on_cant_connect_first(
        &mut self,
        msg: CantConnectMsg,
        _: &mut Intercept<'_, Id>,
    ) -> Result<(), TaskError> {
        self.record(format!("first {}", msg.error));
        Ok(())
    }

    fn on_cant_connect_second(
        &mut self,
        msg: CantConnectMsg,
        _: &mut Intercept<'_, Id>,
    ) -> Result<(), TaskError> {
        self.record(format!("second {}", msg.error));
        Ok(())
    }

    fn on_entry(&mut self, msg: RoomEntryInfoMsg, e: &mut Intercept<'_, Id>) -> Result<(), TaskError> {
        self.record("entry");
        e.complete(msg.room_id);
        Ok(())
    }
}

impl InterceptorTask for Recorder {
    type Output = Id;
    const NAME: &'static str = "Recorder";

    fn on_execute(&mut self, _cx: &TaskContext<'_>) -> Result<(), TaskError> {
        Ok(())
    }

    fn subscriptions() -> Vec<Subscription<Self>> {
        vec![
            Subscription::message(Self::on_cant_connect_first),
            Subscription::message(Self::on_cant_connect_second),
            Subscription::message(Self::on_entry),
        ]
    }
}

/// Sends a probe on execute (modern), blocks legacy STRIPINFO and
/// completes on it.
struct Prober {
    room_id: Id,
}

impl Prober {
    fn on_strip_info(&mut self, e: &mut Intercept<'_, Id>) -> Result<(), TaskError> {
        e.block();
        e.complete(self.room_id);
        Ok(())
    }

    fn on_entry(&mut self, msg: RoomEntryInfoMsg, e: &mut Intercept<'_, Id>) -> Result<(), TaskError> {
        e.complete(msg.room_id);
        Ok(())
    }
}

impl InterceptorTask for Prober {
    type Output = Id;
    const NAME: &'static str = "Prober";

    fn on_execute(&mut self, cx: &TaskContext<'_>) -> Result<(), TaskError> {
        if cx.variant() == Variant::Modern {
            cx.send(&GetRoomDataMsg::probe(self.room_id))?;
        }
        Ok(())
    }

    fn subscriptions() -> Vec<Subscription<Self>> {
        vec![
            Subscription::identifier(legacy::STRIPINFO, Self::on_strip_info).on(Variant::Legacy),
            Subscription::message(Self::on_entry).on(Variant::Modern),
        ]
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn modern() -> (Interceptor, mpsc::UnboundedReceiver<Packet>) {
    Interceptor::channel(
        InterceptorConfig::default(),
        parlor_messages::dispatcher(Variant::Modern),
    )
    .unwrap()
}

fn legacy_session() -> (Interceptor, mpsc::UnboundedReceiver<Packet>) {
    Interceptor::channel(
        InterceptorConfig::new(Variant::Legacy),
        parlor_messages::dispatcher(Variant::Legacy),
    )
    .unwrap()
}

fn cant_connect(interceptor: &Interceptor, error: i32) -> Packet {
    interceptor.dispatcher().compose(&CantConnectMsg { error }).unwrap()
}

fn entry_info(interceptor: &Interceptor, room_id: i64) -> Packet {
    interceptor
        .dispatcher()
        .compose(&RoomEntryInfoMsg {
            room_id: Id(room_id),
            is_owner: false,
        })
        .unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_handlers_run_in_subscription_then_execution_order() {
    let (mut interceptor, _rx) = modern();
    let log = log();
    let _a = interceptor.execute(Recorder::new("a", &log));
    let _b = interceptor.execute(Recorder::new("b", &log));

    interceptor.dispatch(&mut cant_connect(&interceptor, 4)).unwrap();

    assert_eq!(
        entries(&log),
        ["a:first 4", "a:second 4", "b:first 4", "b:second 4"]
    );
}

#[tokio::test]
async fn test_completion_detaches_task() {
    let (mut interceptor, _rx) = modern();
    let log = log();
    let handle = interceptor.execute(Recorder::new("a", &log));

    interceptor.dispatch(&mut entry_info(&interceptor, 42)).unwrap();
    assert_eq!(interceptor.active_tasks(), 0);

    interceptor.dispatch(&mut cant_connect(&interceptor, 1)).unwrap();
    interceptor.dispatch(&mut entry_info(&interceptor, 43)).unwrap();

    assert_eq!(entries(&log), ["a:entry"]);
    assert_eq!(handle.result().await, Ok(Id(42)));
}

#[tokio::test]
async fn test_cancel_before_completion_detaches() {
    let (mut interceptor, _rx) = modern();
    let log = log();
    let handle = interceptor.execute(Recorder::new("a", &log));

    assert!(handle.cancel());
    interceptor.dispatch(&mut entry_info(&interceptor, 42)).unwrap();

    assert!(entries(&log).is_empty());
    assert_eq!(interceptor.active_tasks(), 0);
    assert_eq!(handle.result().await, Err(TaskError::Cancelled));
}

#[tokio::test]
async fn test_cancel_after_completion_keeps_result() {
    let (mut interceptor, _rx) = modern();
    let log = log();
    let handle = interceptor.execute(Recorder::new("a", &log));

    interceptor.dispatch(&mut entry_info(&interceptor, 7)).unwrap();
    assert!(!handle.cancel());
    assert_eq!(handle.result().await, Ok(Id(7)));
}

#[tokio::test]
async fn test_decode_failure_fails_subscribed_tasks() {
    let (mut interceptor, _rx) = modern();
    let log = log();
    let recorder = interceptor.execute(Recorder::new("a", &log));
    let prober = interceptor.execute(Prober { room_id: Id(1) });

    // RoomEntryInfo with the bool missing.
    let header = entry_info(&interceptor, 0).header();
    let mut truncated = Packet::with_data(header, Direction::Incoming, Variant::Modern, [0, 0, 0, 9]);
    interceptor.dispatch(&mut truncated).unwrap();

    for handle in [recorder, prober] {
        assert!(matches!(
            handle.result().await,
            Err(TaskError::Protocol(ProtocolError::UnexpectedEof { .. }))
        ));
    }
    assert_eq!(interceptor.active_tasks(), 0);
}

#[tokio::test]
async fn test_decode_failure_leaves_unrelated_task_running() {
    let (mut interceptor, _rx) = modern();
    let log = log();
    let recorder = interceptor.execute(Recorder::new("a", &log));
    let _prober = interceptor.execute(Prober { room_id: Id(1) });

    // CantConnect with no payload: only the recorder subscribes to it.
    let header = cant_connect(&interceptor, 0).header();
    let mut empty = Packet::new(header, Direction::Incoming, Variant::Modern);
    interceptor.dispatch(&mut empty).unwrap();

    assert!(matches!(recorder.result().await, Err(TaskError::Protocol(_))));
    assert_eq!(interceptor.active_tasks(), 1);
}

#[tokio::test]
async fn test_execute_sends_opening_request() {
    let (mut interceptor, mut rx) = modern();
    let _handle = interceptor.execute(Prober { room_id: Id(42) });

    let mut sent = rx.try_recv().unwrap();
    assert_eq!(sent.direction(), Direction::Outgoing);
    assert_eq!(sent.parse::<GetRoomDataMsg>().unwrap(), GetRoomDataMsg::probe(Id(42)));
}

#[tokio::test]
async fn test_execute_failure_resolves_handle_without_subscribing() {
    let (mut interceptor, rx) = modern();
    drop(rx);
    let handle = interceptor.execute(Prober { room_id: Id(42) });

    assert_eq!(interceptor.active_tasks(), 0);
    assert_eq!(handle.result().await, Err(TaskError::Send));
}

#[tokio::test]
async fn test_variant_constrained_subscription_blocks_packet() {
    let (mut interceptor, mut rx) = legacy_session();
    let handle = interceptor.execute(Prober { room_id: Id(5) });
    assert!(rx.try_recv().is_err());

    // The modern-only RoomEntryInfo subscription is not installed, and the
    // legacy dispatcher has no RoomEntryInfo anyway.
    let header = interceptor.dispatcher().header(legacy::STRIPINFO).unwrap();
    let mut strip = Packet::new(header, Direction::Incoming, Variant::Legacy);
    interceptor.dispatch(&mut strip).unwrap();

    assert!(strip.is_blocked());
    assert_eq!(handle.result().await, Ok(Id(5)));
}

#[tokio::test]
async fn test_unsupported_opening_request_fails_task() {
    struct LegacyOnlyProbe;

    impl InterceptorTask for LegacyOnlyProbe {
        type Output = ();
        const NAME: &'static str = "LegacyOnlyProbe";

        fn on_execute(&mut self, cx: &TaskContext<'_>) -> Result<(), TaskError> {
            cx.send(&GetRoomDataMsg::probe(Id(1)))
        }

        fn subscriptions() -> Vec<Subscription<Self>> {
            Vec::new()
        }
    }

    let (mut interceptor, _rx) = legacy_session();
    let handle = interceptor.execute(LegacyOnlyProbe);
    assert_eq!(
        handle.result().await,
        Err(TaskError::Protocol(ProtocolError::UnsupportedVariant {
            message: "GetRoomDataMsg",
            variant: Variant::Legacy,
        }))
    );
}

#[tokio::test]
async fn test_rejects_packets_of_other_variant() {
    let (mut interceptor, _rx) = modern();
    let mut packet = Packet::new(Header(1), Direction::Incoming, Variant::Legacy);
    assert_eq!(
        interceptor.dispatch(&mut packet),
        Err(ProtocolError::VariantMismatch {
            expected: Variant::Modern,
            actual: Variant::Legacy,
        })
    );
}

#[test]
fn test_new_rejects_mismatched_dispatcher() {
    let result = Interceptor::channel(
        InterceptorConfig::new(Variant::Legacy),
        parlor_messages::dispatcher(Variant::Modern),
    );
    assert!(matches!(result, Err(ProtocolError::VariantMismatch { .. })));
}

#[tokio::test]
async fn test_dropping_interceptor_detaches_tasks() {
    let (mut interceptor, _rx) = modern();
    let handle = interceptor.execute(Recorder::new("a", &log()));
    drop(interceptor);
    assert_eq!(handle.result().await, Err(TaskError::Detached));
}

#[tokio::test]
async fn test_configured_timeout_cancels() {
    let config = InterceptorConfig {
        variant: Variant::Modern,
        task_timeout: Some(Duration::from_millis(20)),
    };
    let (mut interceptor, _rx) =
        Interceptor::channel(config, parlor_messages::dispatcher(Variant::Modern)).unwrap();
    let handle = interceptor.execute(Recorder::new("a", &log()));

    assert_eq!(handle.result().await, Err(TaskError::Cancelled));
    assert_eq!(interceptor.active_tasks(), 0);
}
