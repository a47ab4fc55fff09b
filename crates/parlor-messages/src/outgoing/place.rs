//! Item placement requests.
//!
//! On the modern variant floor and wall placement share one identifier
//! (`PlaceObject`) and carry a single string. The text after the first
//! space tells them apart: a wall location always starts with `:`.
//!
//! ```text
//! "123 4 5 2"            floor: id, x, y, direction
//! "123 :w=3,4 l=12,35 r" wall: id, location
//! ```

use parlor_protocol::{Direction, Id, Identifier, Message, Packet, Point, ProtocolError, Variant, WallLocation};

use crate::headers::{legacy, modern};

/// Whether a modern `PlaceObject` payload describes a wall placement.
///
/// `None` if the payload has no space, or nothing after it; such a
/// packet belongs to neither placement message.
fn modern_targets_wall(packet: &mut Packet) -> Option<bool> {
    let content = packet.read_string().ok()?;
    let (_, rest) = content.split_once(' ')?;
    rest.chars().next().map(|c| c == ':')
}

fn invalid(message: &'static str, field: &'static str, value: &str) -> ProtocolError {
    ProtocolError::InvalidField {
        message,
        field,
        value: value.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// PlaceFloorItemMsg
// ---------------------------------------------------------------------------

/// Sent when placing a floor item in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceFloorItemMsg {
    pub item_id: Id,
    pub location: Point,
    pub direction: i32,
}

impl Message for PlaceFloorItemMsg {
    const NAME: &'static str = "PlaceFloorItemMsg";
    const DIRECTION: Direction = Direction::Outgoing;

    fn identifier(variant: Variant) -> Option<Identifier> {
        Some(match variant {
            Variant::Modern => modern::PLACE_OBJECT,
            Variant::Legacy => legacy::PLACESTUFF,
        })
    }

    fn matches(packet: &mut Packet) -> bool {
        match packet.variant() {
            Variant::Legacy => true,
            Variant::Modern => modern_targets_wall(packet) == Some(false),
        }
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        match packet.variant() {
            Variant::Legacy => Ok(Self {
                item_id: packet.read_id()?,
                location: Point::new(packet.read_int()?, packet.read_int()?),
                direction: packet.read_int()?,
            }),
            Variant::Modern => {
                let content = packet.read_string()?;
                let fields: Vec<&str> = content.split(' ').collect();
                let [id, x, y, direction] = fields[..] else {
                    return Err(if fields.len() < 4 {
                        ProtocolError::MissingSeparator { message: Self::NAME }
                    } else {
                        invalid(Self::NAME, "content", &content)
                    });
                };
                let int = |field, text: &str| text.parse::<i32>().map_err(|_| invalid(Self::NAME, field, text));
                Ok(Self {
                    item_id: id.parse().map_err(|_| invalid(Self::NAME, "item_id", id))?,
                    location: Point::new(int("x", x)?, int("y", y)?),
                    direction: int("direction", direction)?,
                })
            }
        }
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        match packet.variant() {
            Variant::Legacy => {
                packet.write_id(self.item_id)?;
                packet.write_int(self.location.x)?;
                packet.write_int(self.location.y)?;
                packet.write_int(self.direction)
            }
            Variant::Modern => packet.write_string(&format!(
                "{} {} {} {}",
                self.item_id, self.location.x, self.location.y, self.direction
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// PlaceWallItemMsg
// ---------------------------------------------------------------------------

/// Sent when placing a wall item in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceWallItemMsg {
    pub item_id: Id,
    pub location: WallLocation,
}

impl Message for PlaceWallItemMsg {
    const NAME: &'static str = "PlaceWallItemMsg";
    const DIRECTION: Direction = Direction::Outgoing;

    fn identifier(variant: Variant) -> Option<Identifier> {
        Some(match variant {
            Variant::Modern => modern::PLACE_OBJECT,
            Variant::Legacy => legacy::PLACEITEM,
        })
    }

    fn matches(packet: &mut Packet) -> bool {
        match packet.variant() {
            Variant::Legacy => true,
            Variant::Modern => modern_targets_wall(packet) == Some(true),
        }
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        let (item_id, location) = match packet.variant() {
            Variant::Legacy => {
                let item_id = packet.read_id()?;
                (item_id, packet.read_string()?)
            }
            Variant::Modern => {
                let content = packet.read_string()?;
                let (id, location) = content
                    .split_once(' ')
                    .ok_or(ProtocolError::MissingSeparator { message: Self::NAME })?;
                let item_id = id.parse().map_err(|_| invalid(Self::NAME, "item_id", id))?;
                (item_id, location.to_owned())
            }
        };
        Ok(Self {
            item_id,
            location: location.parse()?,
        })
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        match packet.variant() {
            Variant::Legacy => {
                packet.write_id(self.item_id)?;
                packet.write_string(&self.location.to_string())
            }
            Variant::Modern => packet.write_string(&format!("{} {}", self.item_id, self.location)),
        }
    }
}
