//! Reference interceptor tasks for Parlor.
//!
//! - [`EnterRoomTask`] — steers the client into a room, filling in the
//!   password, and reports whether entry succeeded.
//! - [`PlaceWallItemTask`] — places a wall item and reports the server's
//!   verdict.
//!
//! Both work on either protocol variant; the interceptor's variant decides
//! which packet flow they follow.

mod enter_room;
mod place_wall_item;

pub use enter_room::{EnterRoomResult, EnterRoomTask};
pub use place_wall_item::{PlaceWallItemResult, PlaceWallItemTask};
