//! Concrete messages for both Parlor protocol variants.
//!
//! - [`outgoing`] — placement and room entry requests.
//! - [`incoming`] — room data, entry outcomes, item and notification events.
//! - [`headers`] — the identifiers those messages travel under and their
//!   default headers per variant.
//!
//! Most callers want [`dispatcher`], which returns a [`Dispatcher`] for one
//! variant with every message here registered:
//!
//! ```
//! use parlor_messages::outgoing::PlaceWallItemMsg;
//! use parlor_protocol::{Id, Variant, WallLocation};
//!
//! let dispatcher = parlor_messages::dispatcher(Variant::Modern);
//! let msg = PlaceWallItemMsg {
//!     item_id: Id(-7),
//!     location: ":w=3,4 l=12,35 r".parse::<WallLocation>().unwrap(),
//! };
//! let mut packet = dispatcher.compose(&msg).unwrap();
//! let kind = dispatcher.dispatch(&mut packet).unwrap().unwrap();
//! assert!(kind.is::<PlaceWallItemMsg>());
//! ```

pub mod headers;
pub mod incoming;
pub mod outgoing;

use parlor_protocol::{Dispatcher, Message, Packet, ProtocolError, Variant};

use incoming::{
    CantConnectMsg, ErrorMsg, LetInMsg, NotificationDialogMsg, RoomDataMsg, RoomEntryInfoMsg,
    RoomReadyMsg, WallItemAddedMsg,
};
use outgoing::{
    GetRoomDataMsg, GoToRoomMsg, OpenConnectionMsg, PlaceFloorItemMsg, PlaceWallItemMsg,
    TryEnterRoomMsg,
};

/// Registers every message in this crate with `dispatcher`.
///
/// Floor placement is registered before wall placement; the two share
/// `Out.PlaceObject` on modern and their predicates are exclusive.
pub fn register_all(dispatcher: &mut Dispatcher) {
    dispatcher
        .register::<PlaceFloorItemMsg>()
        .register::<PlaceWallItemMsg>()
        .register::<GetRoomDataMsg>()
        .register::<OpenConnectionMsg>()
        .register::<TryEnterRoomMsg>()
        .register::<GoToRoomMsg>()
        .register::<RoomDataMsg>()
        .register::<RoomEntryInfoMsg>()
        .register::<CantConnectMsg>()
        .register::<LetInMsg>()
        .register::<RoomReadyMsg>()
        .register::<ErrorMsg>()
        .register::<WallItemAddedMsg>()
        .register::<NotificationDialogMsg>();
}

/// A dispatcher for `variant` over the default identifier table, with every
/// message registered.
pub fn dispatcher(variant: Variant) -> Dispatcher {
    let mut dispatcher = Dispatcher::new(variant, headers::default_table());
    register_all(&mut dispatcher);
    tracing::debug!(%variant, "message dispatcher ready");
    dispatcher
}

/// Fails with `UnsupportedVariant` unless the packet is on `variant`.
pub(crate) fn only_on<M: Message>(packet: &Packet, variant: Variant) -> Result<(), ProtocolError> {
    if packet.variant() == variant {
        Ok(())
    } else {
        Err(M::unsupported(packet.variant()))
    }
}
