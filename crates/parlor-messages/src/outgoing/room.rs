//! Room entry requests.
//!
//! The modern client asks for room data, then opens a connection. The
//! legacy client tries the flat with a raw `id[/password]` string and, once
//! let in, sends `GOTOFLAT`.

use parlor_protocol::{Direction, Id, Identifier, Message, Packet, ProtocolError, Variant};

use crate::headers::{legacy, modern};
use crate::only_on;

fn parse_room_id(message: &'static str, text: &str) -> Result<Id, ProtocolError> {
    text.parse().map_err(|_| ProtocolError::InvalidField {
        message,
        field: "room_id",
        value: text.to_owned(),
    })
}

/// Requests a room's data. Modern only.
///
/// `entering` and `forward` travel as ints; any non-zero value reads as
/// `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetRoomDataMsg {
    pub room_id: Id,
    pub entering: bool,
    pub forward: bool,
}

impl GetRoomDataMsg {
    /// The request a client sends to look at a room without entering it.
    pub fn probe(room_id: Id) -> Self {
        Self {
            room_id,
            entering: false,
            forward: true,
        }
    }
}

impl Message for GetRoomDataMsg {
    const NAME: &'static str = "GetRoomDataMsg";
    const DIRECTION: Direction = Direction::Outgoing;

    fn identifier(variant: Variant) -> Option<Identifier> {
        (variant == Variant::Modern).then_some(modern::GET_GUEST_ROOM)
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        only_on::<Self>(packet, Variant::Modern)?;
        Ok(Self {
            room_id: packet.read_id()?,
            entering: packet.read_int()? != 0,
            forward: packet.read_int()? != 0,
        })
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        only_on::<Self>(packet, Variant::Modern)?;
        packet.write_id(self.room_id)?;
        packet.write_int(i32::from(self.entering))?;
        packet.write_int(i32::from(self.forward))
    }
}

/// Opens a connection to a room, carrying the password. Modern only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenConnectionMsg {
    pub room_id: Id,
    pub password: String,
}

impl Message for OpenConnectionMsg {
    const NAME: &'static str = "OpenConnectionMsg";
    const DIRECTION: Direction = Direction::Outgoing;

    fn identifier(variant: Variant) -> Option<Identifier> {
        (variant == Variant::Modern).then_some(modern::OPEN_FLAT_CONNECTION)
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        only_on::<Self>(packet, Variant::Modern)?;
        Ok(Self {
            room_id: packet.read_id()?,
            password: packet.read_string()?,
        })
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        only_on::<Self>(packet, Variant::Modern)?;
        packet.write_id(self.room_id)?;
        packet.write_string(&self.password)
    }
}

/// Asks to enter a flat. Legacy only; the payload is raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryEnterRoomMsg {
    pub room_id: Id,
    pub password: Option<String>,
}

impl Message for TryEnterRoomMsg {
    const NAME: &'static str = "TryEnterRoomMsg";
    const DIRECTION: Direction = Direction::Outgoing;

    fn identifier(variant: Variant) -> Option<Identifier> {
        (variant == Variant::Legacy).then_some(legacy::TRYFLAT)
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        only_on::<Self>(packet, Variant::Legacy)?;
        let content = packet.read_content()?;
        let (id, password) = match content.split_once('/') {
            Some((id, password)) => (id, Some(password.to_owned())),
            None => (content.as_str(), None),
        };
        Ok(Self {
            room_id: parse_room_id(Self::NAME, id)?,
            password,
        })
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        only_on::<Self>(packet, Variant::Legacy)?;
        let content = match &self.password {
            Some(password) => format!("{}/{}", self.room_id, password),
            None => self.room_id.to_string(),
        };
        packet.write_content(&content)
    }
}

/// Goes to a flat after being let in. Legacy only; the payload is the
/// room id as raw content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoToRoomMsg {
    pub room_id: Id,
}

impl Message for GoToRoomMsg {
    const NAME: &'static str = "GoToRoomMsg";
    const DIRECTION: Direction = Direction::Outgoing;

    fn identifier(variant: Variant) -> Option<Identifier> {
        (variant == Variant::Legacy).then_some(legacy::GOTOFLAT)
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        only_on::<Self>(packet, Variant::Legacy)?;
        let content = packet.read_content()?;
        Ok(Self {
            room_id: parse_room_id(Self::NAME, &content)?,
        })
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        only_on::<Self>(packet, Variant::Legacy)?;
        packet.write_content(&self.room_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use parlor_protocol::Header;

    use super::*;

    #[test]
    fn test_try_enter_content() {
        let mut p = Packet::new(Header(57), Direction::Outgoing, Variant::Legacy);
        TryEnterRoomMsg {
            room_id: Id(42),
            password: Some("pw".into()),
        }
        .compose(&mut p)
        .unwrap();
        assert_eq!(p.data(), b"42/pw");

        let mut p = Packet::new(Header(57), Direction::Outgoing, Variant::Legacy);
        TryEnterRoomMsg {
            room_id: Id(42),
            password: None,
        }
        .compose(&mut p)
        .unwrap();
        assert_eq!(p.data(), b"42");
    }

    #[test]
    fn test_try_enter_keeps_slashes_in_password() {
        let mut p = Packet::with_data(Header(57), Direction::Outgoing, Variant::Legacy, b"9/a/b");
        let msg = p.parse::<TryEnterRoomMsg>().unwrap();
        assert_eq!(msg.room_id, Id(9));
        assert_eq!(msg.password.as_deref(), Some("a/b"));
    }

    #[test]
    fn test_try_enter_rejects_bad_id() {
        let mut p = Packet::with_data(Header(57), Direction::Outgoing, Variant::Legacy, b"abc");
        assert!(matches!(
            p.parse::<TryEnterRoomMsg>(),
            Err(ProtocolError::InvalidField { field: "room_id", .. })
        ));
    }

    #[test]
    fn test_probe_layout() {
        let mut p = Packet::new(Header(2230), Direction::Outgoing, Variant::Modern);
        GetRoomDataMsg::probe(Id(42)).compose(&mut p).unwrap();
        assert_eq!(p.data(), &[0, 0, 0, 42, 0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_modern_only_rejects_legacy_packet() {
        let mut p = Packet::new(Header(1), Direction::Outgoing, Variant::Legacy);
        assert_eq!(
            GetRoomDataMsg::probe(Id(1)).compose(&mut p),
            Err(ProtocolError::UnsupportedVariant {
                message: "GetRoomDataMsg",
                variant: Variant::Legacy,
            })
        );
        assert!(p.is_empty());
    }
}
