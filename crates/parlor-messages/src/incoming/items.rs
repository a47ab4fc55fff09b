use parlor_protocol::{Direction, Id, Identifier, Message, Packet, ProtocolError, Variant, WallLocation};

use crate::headers::{legacy, modern};

/// A wall item as the server describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallItem {
    /// Sent as a decimal string on both variants.
    pub id: Id,
    pub kind: i32,
    pub location: WallLocation,
    pub data: String,
    pub owner_id: Id,
    pub owner_name: String,
}

/// A wall item appeared in the room. Both variants, same field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallItemAddedMsg {
    pub item: WallItem,
}

impl Message for WallItemAddedMsg {
    const NAME: &'static str = "WallItemAddedMsg";
    const DIRECTION: Direction = Direction::Incoming;

    fn identifier(variant: Variant) -> Option<Identifier> {
        Some(match variant {
            Variant::Modern => modern::ITEM_ADD,
            Variant::Legacy => legacy::ADDITEM,
        })
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        let id = packet.read_string()?;
        let id = id.parse().map_err(|_| ProtocolError::InvalidField {
            message: Self::NAME,
            field: "id",
            value: id.clone(),
        })?;
        let kind = packet.read_int()?;
        let location = packet.read_string()?.parse()?;
        Ok(Self {
            item: WallItem {
                id,
                kind,
                location,
                data: packet.read_string()?,
                owner_id: packet.read_id()?,
                owner_name: packet.read_string()?,
            },
        })
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        let item = &self.item;
        packet.write_string(&item.id.to_string())?;
        packet.write_int(item.kind)?;
        packet.write_string(&item.location.to_string())?;
        packet.write_string(&item.data)?;
        packet.write_id(item.owner_id)?;
        packet.write_string(&item.owner_name)
    }
}
