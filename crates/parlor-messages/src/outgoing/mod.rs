//! Client → server messages.

mod place;
mod room;

pub use place::{PlaceFloorItemMsg, PlaceWallItemMsg};
pub use room::{GetRoomDataMsg, GoToRoomMsg, OpenConnectionMsg, TryEnterRoomMsg};
