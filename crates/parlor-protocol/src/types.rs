//! Core protocol types shared by every Parlor crate.
//!
//! These are the small value types that describe *where* a packet comes
//! from (variant, direction), *what* it is (header, identifier), and the
//! handful of field types that show up inside many messages (ids and
//! placement locations).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Variant & Direction
// ---------------------------------------------------------------------------

/// A protocol dialect.
///
/// The two variants are spoken by different client generations and are
/// not wire-compatible: field encodings differ, and the same logical
/// operation usually has a different identifier on each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Big-endian fixed-width integers, length-prefixed strings.
    Modern,
    /// VL64 integers, B64 length prefixes and terminated strings.
    Legacy,
}

impl Variant {
    /// Every variant, in a stable order.
    pub const ALL: [Variant; 2] = [Variant::Modern, Variant::Legacy];
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modern => write!(f, "modern"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// Which way a packet travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Server → client.
    Incoming,
    /// Client → server.
    Outgoing,
}

impl Direction {
    /// The short prefix used in identifier names: `In` or `Out`.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Incoming => "In",
            Self::Outgoing => "Out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incoming => write!(f, "incoming"),
            Self::Outgoing => write!(f, "outgoing"),
        }
    }
}

// ---------------------------------------------------------------------------
// Header & Identifier
// ---------------------------------------------------------------------------

/// The numeric opcode at the front of a packet.
///
/// A header only has meaning together with a variant and a direction;
/// `Header(90)` outgoing on legacy and `Header(90)` incoming on modern
/// are unrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Header(pub u16);

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A symbolic packet identifier, e.g. `Out.PlaceObject`.
///
/// Identifiers are resolved to a [`Header`] through an
/// [`IdentifierTable`](crate::IdentifierTable), always within one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub direction: Direction,
    pub name: &'static str,
}

impl Identifier {
    /// An incoming identifier.
    pub const fn incoming(name: &'static str) -> Self {
        Self {
            direction: Direction::Incoming,
            name,
        }
    }

    /// An outgoing identifier.
    pub const fn outgoing(name: &'static str) -> Self {
        Self {
            direction: Direction::Outgoing,
            name,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.direction.prefix(), self.name)
    }
}

// ---------------------------------------------------------------------------
// Id
// ---------------------------------------------------------------------------

/// An entity id (room, item, user).
///
/// Negative values are legal: callers use them as client-local
/// placeholders that the server later echoes back resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(pub i64);

impl Id {
    /// The absolute value of this id.
    pub fn abs(self) -> Id {
        Id(self.0.saturating_abs())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Id {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Id)
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id(value)
    }
}

// ---------------------------------------------------------------------------
// Placement locations
// ---------------------------------------------------------------------------

/// A floor tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Which side of a wall an item hangs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallOrientation {
    #[serde(rename = "l")]
    Left,
    #[serde(rename = "r")]
    Right,
}

impl WallOrientation {
    fn as_char(self) -> char {
        match self {
            Self::Left => 'l',
            Self::Right => 'r',
        }
    }
}

/// A wall placement: wall tile `(wx, wy)`, pixel offset `(lx, ly)` on
/// that tile, and the wall side.
///
/// Text form (used by both variants inside messages):
///
/// ```text
/// :w=3,4 l=12,35 r
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallLocation {
    pub wx: i32,
    pub wy: i32,
    pub lx: i32,
    pub ly: i32,
    pub orientation: WallOrientation,
}

impl WallLocation {
    pub const fn new(
        wx: i32,
        wy: i32,
        lx: i32,
        ly: i32,
        orientation: WallOrientation,
    ) -> Self {
        Self {
            wx,
            wy,
            lx,
            ly,
            orientation,
        }
    }
}

impl fmt::Display for WallLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ":w={},{} l={},{} {}",
            self.wx,
            self.wy,
            self.lx,
            self.ly,
            self.orientation.as_char()
        )
    }
}

impl FromStr for WallLocation {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProtocolError::InvalidWallLocation(s.to_owned());

        let rest = s.strip_prefix(":w=").ok_or_else(invalid)?;
        let mut parts = rest.split(' ');
        let (wall, local, side) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(w), Some(l), Some(o), None) => (w, l, o),
                _ => return Err(invalid()),
            };
        let local = local.strip_prefix("l=").ok_or_else(invalid)?;

        let pair = |text: &str| -> Option<(i32, i32)> {
            let (a, b) = text.split_once(',')?;
            Some((a.parse().ok()?, b.parse().ok()?))
        };
        let (wx, wy) = pair(wall).ok_or_else(invalid)?;
        let (lx, ly) = pair(local).ok_or_else(invalid)?;
        let orientation = match side {
            "l" => WallOrientation::Left,
            "r" => WallOrientation::Right,
            _ => return Err(invalid()),
        };

        Ok(Self::new(wx, wy, lx, ly, orientation))
    }
}
