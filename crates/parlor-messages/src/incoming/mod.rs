//! Server → client messages.

mod items;
mod notification;
mod room;

pub use items::{WallItem, WallItemAddedMsg};
pub use notification::NotificationDialogMsg;
pub use room::{
    CantConnectMsg, ErrorMsg, LetInMsg, RoomAccess, RoomDataMsg, RoomEnterError, RoomEntryInfoMsg,
    RoomReadyMsg,
};
