//! Room data and room entry responses.

use std::fmt;

use serde::{Deserialize, Serialize};

use parlor_protocol::{Direction, Id, Identifier, Message, Packet, ProtocolError, Variant};

use crate::headers::{legacy, modern};
use crate::only_on;

// ---------------------------------------------------------------------------
// RoomAccess & RoomEnterError
// ---------------------------------------------------------------------------

/// Who may enter a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomAccess {
    #[default]
    Open = 0,
    Doorbell = 1,
    Password = 2,
    Invisible = 3,
}

impl TryFrom<i32> for RoomAccess {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Open),
            1 => Ok(Self::Doorbell),
            2 => Ok(Self::Password),
            3 => Ok(Self::Invisible),
            other => Err(other),
        }
    }
}

impl fmt::Display for RoomAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Doorbell => write!(f, "doorbell"),
            Self::Password => write!(f, "password"),
            Self::Invisible => write!(f, "invisible"),
        }
    }
}

/// Reason codes carried by [`CantConnectMsg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomEnterError {
    Full = 1,
    Closed = 2,
    Queue = 3,
    Banned = 4,
}

impl RoomEnterError {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Full),
            2 => Some(Self::Closed),
            3 => Some(Self::Queue),
            4 => Some(Self::Banned),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomDataMsg
// ---------------------------------------------------------------------------

/// A room's data. Modern only.
///
/// Field order on the wire:
///
/// ```text
/// entering  id  name  owner_id  owner_name  access  user_count
/// max_users  description  forward  staff_pick  group_member  muted
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDataMsg {
    /// Whether the client asked for this data while entering the room.
    pub entering: bool,
    pub id: Id,
    pub name: String,
    pub owner_id: Id,
    pub owner_name: String,
    pub access: RoomAccess,
    pub user_count: i32,
    pub max_users: i32,
    pub description: String,
    /// Whether the client should move into the room on receipt.
    pub forward: bool,
    pub staff_pick: bool,
    pub group_member: bool,
    pub muted: bool,
}

impl Message for RoomDataMsg {
    const NAME: &'static str = "RoomDataMsg";
    const DIRECTION: Direction = Direction::Incoming;

    fn identifier(variant: Variant) -> Option<Identifier> {
        (variant == Variant::Modern).then_some(modern::GET_GUEST_ROOM_RESULT)
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        only_on::<Self>(packet, Variant::Modern)?;
        let entering = packet.read_bool()?;
        let id = packet.read_id()?;
        let name = packet.read_string()?;
        let owner_id = packet.read_id()?;
        let owner_name = packet.read_string()?;
        let access = packet.read_int()?;
        let access = RoomAccess::try_from(access).map_err(|v| ProtocolError::InvalidField {
            message: Self::NAME,
            field: "access",
            value: v.to_string(),
        })?;
        Ok(Self {
            entering,
            id,
            name,
            owner_id,
            owner_name,
            access,
            user_count: packet.read_int()?,
            max_users: packet.read_int()?,
            description: packet.read_string()?,
            forward: packet.read_bool()?,
            staff_pick: packet.read_bool()?,
            group_member: packet.read_bool()?,
            muted: packet.read_bool()?,
        })
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        only_on::<Self>(packet, Variant::Modern)?;
        packet.write_bool(self.entering)?;
        packet.write_id(self.id)?;
        packet.write_string(&self.name)?;
        packet.write_id(self.owner_id)?;
        packet.write_string(&self.owner_name)?;
        packet.write_int(self.access as i32)?;
        packet.write_int(self.user_count)?;
        packet.write_int(self.max_users)?;
        packet.write_string(&self.description)?;
        packet.write_bool(self.forward)?;
        packet.write_bool(self.staff_pick)?;
        packet.write_bool(self.group_member)?;
        packet.write_bool(self.muted)
    }
}

// ---------------------------------------------------------------------------
// Entry outcomes
// ---------------------------------------------------------------------------

/// Sent once the client is in the room. Modern only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomEntryInfoMsg {
    pub room_id: Id,
    pub is_owner: bool,
}

impl Message for RoomEntryInfoMsg {
    const NAME: &'static str = "RoomEntryInfoMsg";
    const DIRECTION: Direction = Direction::Incoming;

    fn identifier(variant: Variant) -> Option<Identifier> {
        (variant == Variant::Modern).then_some(modern::ROOM_ENTRY_INFO)
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        only_on::<Self>(packet, Variant::Modern)?;
        Ok(Self {
            room_id: packet.read_id()?,
            is_owner: packet.read_bool()?,
        })
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        only_on::<Self>(packet, Variant::Modern)?;
        packet.write_id(self.room_id)?;
        packet.write_bool(self.is_owner)
    }
}

/// Room entry was refused. Both variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CantConnectMsg {
    /// Raw reason code; see [`CantConnectMsg::reason`].
    pub error: i32,
}

impl CantConnectMsg {
    pub fn reason(&self) -> Option<RoomEnterError> {
        RoomEnterError::from_code(self.error)
    }
}

impl Message for CantConnectMsg {
    const NAME: &'static str = "CantConnectMsg";
    const DIRECTION: Direction = Direction::Incoming;

    fn identifier(variant: Variant) -> Option<Identifier> {
        Some(match variant {
            Variant::Modern => modern::CANT_CONNECT,
            Variant::Legacy => legacy::CANTCONNECT,
        })
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        Ok(Self {
            error: packet.read_int()?,
        })
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        packet.write_int(self.error)
    }
}

/// The flat accepted the entry attempt. Legacy only, empty payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetInMsg;

impl Message for LetInMsg {
    const NAME: &'static str = "LetInMsg";
    const DIRECTION: Direction = Direction::Incoming;

    fn identifier(variant: Variant) -> Option<Identifier> {
        (variant == Variant::Legacy).then_some(legacy::FLAT_LETIN)
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        only_on::<Self>(packet, Variant::Legacy)?;
        Ok(Self)
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        only_on::<Self>(packet, Variant::Legacy)
    }
}

/// The room has loaded. Legacy only; content is `"{model} {room_id}"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomReadyMsg {
    pub model: String,
    pub room_id: Id,
}

impl Message for RoomReadyMsg {
    const NAME: &'static str = "RoomReadyMsg";
    const DIRECTION: Direction = Direction::Incoming;

    fn identifier(variant: Variant) -> Option<Identifier> {
        (variant == Variant::Legacy).then_some(legacy::ROOM_READY)
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        only_on::<Self>(packet, Variant::Legacy)?;
        let content = packet.read_content()?;
        let (model, id) = content
            .split_once(' ')
            .ok_or(ProtocolError::MissingSeparator { message: Self::NAME })?;
        let room_id = id.parse().map_err(|_| ProtocolError::InvalidField {
            message: Self::NAME,
            field: "room_id",
            value: id.to_owned(),
        })?;
        Ok(Self {
            model: model.to_owned(),
            room_id,
        })
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        only_on::<Self>(packet, Variant::Legacy)?;
        packet.write_content(&format!("{} {}", self.model, self.room_id))
    }
}

/// A generic server error. Legacy only; the payload is the message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMsg {
    pub message: String,
}

impl ErrorMsg {
    /// Text the server sends when a flat password is wrong.
    pub const INCORRECT_FLAT_PASSWORD: &'static str = "Incorrect flat password";
}

impl Message for ErrorMsg {
    const NAME: &'static str = "ErrorMsg";
    const DIRECTION: Direction = Direction::Incoming;

    fn identifier(variant: Variant) -> Option<Identifier> {
        (variant == Variant::Legacy).then_some(legacy::ERROR)
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        only_on::<Self>(packet, Variant::Legacy)?;
        Ok(Self {
            message: packet.read_content()?,
        })
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        only_on::<Self>(packet, Variant::Legacy)?;
        packet.write_content(&self.message)
    }
}
