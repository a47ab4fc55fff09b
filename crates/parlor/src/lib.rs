//! # Parlor
//!
//! Typed interception for a game client's two protocol dialects.
//!
//! Parlor sits between a game client and its server. The host relays every
//! packet through a [`Session`]; tasks running on the session watch the
//! stream, rewrite or block packets in flight, inject their own requests,
//! and resolve to one result each.
//!
//! The building blocks live in their own crates and are re-exported here:
//!
//! - [`protocol`] — packets, wire codecs, identifiers and the dispatcher
//! - [`messages`] — the concrete messages of both variants
//! - [`intercept`] — the task engine
//! - [`tasks`] — room entry and wall item placement
//! - [`gamedata`] — `key=value` data files and external texts
//!
//! ## Quick Start
//!
//! ```
//! use parlor::prelude::*;
//!
//! let mut session = Session::builder().variant(Variant::Modern).build().unwrap();
//! let _entry = session.enter_room(Id(42), Some("secret".into()));
//!
//! // The task's opening request, ready to go to the server.
//! let request = session.try_next_outbound().unwrap();
//! assert_eq!(session.dispatcher().name_of(&request), Some("GetGuestRoom"));
//! ```

mod error;
mod session;

pub use error::ParlorError;
pub use session::{Session, SessionBuilder};

pub use parlor_gamedata as gamedata;
pub use parlor_intercept as intercept;
pub use parlor_messages as messages;
pub use parlor_protocol as protocol;
pub use parlor_tasks as tasks;

/// Common imports for hosts driving a session.
pub mod prelude {
    pub use crate::{ParlorError, Session, SessionBuilder};
    pub use parlor_gamedata::{ExternalTexts, KeyValueMap};
    pub use parlor_intercept::{
        Intercept, InterceptorConfig, InterceptorTask, Subscription, TaskContext, TaskError,
        TaskHandle,
    };
    pub use parlor_protocol::{
        Direction, Id, Message, Packet, Point, Variant, WallLocation, WallOrientation,
    };
    pub use parlor_tasks::{EnterRoomResult, PlaceWallItemResult};
}
