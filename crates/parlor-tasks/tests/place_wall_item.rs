//! Wall item placement scenarios on both variants.

use parlor_intercept::{Interceptor, InterceptorConfig};
use parlor_messages::headers::legacy;
use parlor_messages::incoming::{NotificationDialogMsg, WallItem, WallItemAddedMsg};
use parlor_messages::outgoing::PlaceWallItemMsg;
use parlor_protocol::{Direction, Id, Message, Packet, Variant, WallLocation, WallOrientation};
use parlor_tasks::{PlaceWallItemResult, PlaceWallItemTask};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

const LOCATION: WallLocation = WallLocation::new(3, 4, 12, 35, WallOrientation::Right);

fn session(variant: Variant) -> (Interceptor, mpsc::UnboundedReceiver<Packet>) {
    Interceptor::channel(
        InterceptorConfig::new(variant),
        parlor_messages::dispatcher(variant),
    )
    .unwrap()
}

fn relay<M: Message>(interceptor: &mut Interceptor, msg: &M) -> Packet {
    let mut packet = interceptor.dispatcher().compose(msg).unwrap();
    interceptor.dispatch(&mut packet).unwrap();
    packet
}

fn strip_info(interceptor: &mut Interceptor) -> Packet {
    let header = interceptor.dispatcher().header(legacy::STRIPINFO).unwrap();
    let mut packet = Packet::new(header, Direction::Incoming, Variant::Legacy);
    interceptor.dispatch(&mut packet).unwrap();
    packet
}

fn item_added(id: i64) -> WallItemAddedMsg {
    WallItemAddedMsg {
        item: WallItem {
            id: Id(id),
            kind: 4010,
            location: LOCATION,
            data: String::new(),
            owner_id: Id(1),
            owner_name: "me".into(),
        },
    }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_sends_placement_on_execute() {
    for variant in Variant::ALL {
        let (mut interceptor, mut rx) = session(variant);
        let _handle = interceptor.execute(PlaceWallItemTask::new(Id(-7), LOCATION));

        let mut sent = rx.try_recv().unwrap();
        assert_eq!(
            sent.parse::<PlaceWallItemMsg>().unwrap(),
            PlaceWallItemMsg {
                item_id: Id(-7),
                location: LOCATION,
            }
        );
    }
}

#[tokio::test]
async fn test_item_added_with_absolute_id_succeeds() {
    for variant in Variant::ALL {
        let (mut interceptor, _rx) = session(variant);
        let handle = interceptor.execute(PlaceWallItemTask::new(Id(-7), LOCATION));

        relay(&mut interceptor, &item_added(8));
        assert!(!handle.is_finished());

        relay(&mut interceptor, &item_added(7));
        assert_eq!(handle.result().await, Ok(PlaceWallItemResult::Success), "{variant}");
    }
}

#[tokio::test]
async fn test_legacy_strip_info_is_error_and_blocked() {
    let (mut interceptor, _rx) = session(Variant::Legacy);
    let handle = interceptor.execute(PlaceWallItemTask::new(Id(-7), LOCATION));

    let packet = strip_info(&mut interceptor);
    assert!(packet.is_blocked());
    assert_eq!(handle.result().await, Ok(PlaceWallItemResult::Error));
}

#[tokio::test]
async fn test_strip_info_after_success_is_forwarded() {
    let (mut interceptor, _rx) = session(Variant::Legacy);
    let handle = interceptor.execute(PlaceWallItemTask::new(Id(7), LOCATION));

    relay(&mut interceptor, &item_added(7));
    let packet = strip_info(&mut interceptor);

    assert!(!packet.is_blocked());
    assert_eq!(handle.result().await, Ok(PlaceWallItemResult::Success));
}

#[tokio::test]
async fn test_modern_placement_error_notification() {
    let (mut interceptor, _rx) = session(Variant::Modern);
    let handle = interceptor.execute(PlaceWallItemTask::new(Id(7), LOCATION));

    relay(
        &mut interceptor,
        &NotificationDialogMsg {
            kind: "info".into(),
            parameters: Vec::new(),
        },
    );
    assert!(!handle.is_finished());

    let packet = relay(
        &mut interceptor,
        &NotificationDialogMsg {
            kind: NotificationDialogMsg::FURNI_PLACEMENT_ERROR.into(),
            parameters: vec![("message".into(), "${room.error.cant_set_item}".into())],
        },
    );
    assert!(!packet.is_blocked());
    assert_eq!(handle.result().await, Ok(PlaceWallItemResult::Error));
}

#[tokio::test]
async fn test_two_placements_resolve_independently() {
    let (mut interceptor, _rx) = session(Variant::Modern);
    let first = interceptor.execute(PlaceWallItemTask::new(Id(1), LOCATION));
    let second = interceptor.execute(PlaceWallItemTask::new(Id(2), LOCATION));

    relay(&mut interceptor, &item_added(2));
    assert!(!first.is_finished());
    assert_eq!(interceptor.active_tasks(), 1);

    assert!(first.cancel());
    assert_eq!(second.result().await, Ok(PlaceWallItemResult::Success));
    assert!(first.result().await.is_err());
}
