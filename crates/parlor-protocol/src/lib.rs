//! Wire protocol core for Parlor.
//!
//! This crate defines how raw packets of both protocol variants are read,
//! written and identified:
//!
//! - **Types** ([`Variant`], [`Direction`], [`Header`], [`Identifier`],
//!   [`Id`], [`Point`], [`WallLocation`]) — the vocabulary shared by every
//!   other crate.
//! - **Packet** ([`Packet`]) — a mutable field cursor over one packet.
//! - **Codec** ([`Message`]) — the per-message parse/compose contract.
//! - **Identifier table** ([`IdentifierTable`]) — per-variant mapping of
//!   symbolic identifiers to numeric headers.
//! - **Dispatcher** ([`Dispatcher`]) — resolves a raw packet to the message
//!   kind it carries, sniffing content when several kinds share a header.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! raw packet → Dispatcher (header + variant → MessageKind) → Message::parse
//! ```
//!
//! Nothing here knows about tasks or interception; see `parlor-intercept`.

mod codec;
mod dispatcher;
mod error;
mod packet;
mod table;
mod types;
pub mod wire;

pub use codec::Message;
pub use dispatcher::{Dispatcher, MessageKind};
pub use error::ProtocolError;
pub use packet::Packet;
pub use table::IdentifierTable;
pub use types::{
    Direction, Header, Id, Identifier, Point, Variant, WallLocation,
    WallOrientation,
};
