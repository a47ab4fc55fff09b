//! Identifiers and their default headers.
//!
//! Legacy headers are fixed by the protocol. Modern headers are the
//! defaults for the client revision this crate was written against;
//! newer revisions renumber them, which is what
//! [`IdentifierTable::apply_overrides`] is for.

use parlor_protocol::{Header, Identifier, IdentifierTable, Variant};

/// Modern variant identifiers.
pub mod modern {
    use parlor_protocol::Identifier;

    pub const GET_GUEST_ROOM: Identifier = Identifier::outgoing("GetGuestRoom");
    pub const OPEN_FLAT_CONNECTION: Identifier = Identifier::outgoing("OpenFlatConnection");
    pub const PLACE_OBJECT: Identifier = Identifier::outgoing("PlaceObject");

    pub const GET_GUEST_ROOM_RESULT: Identifier = Identifier::incoming("GetGuestRoomResult");
    pub const ROOM_ENTRY_INFO: Identifier = Identifier::incoming("RoomEntryInfo");
    pub const CANT_CONNECT: Identifier = Identifier::incoming("CantConnect");
    pub const ITEM_ADD: Identifier = Identifier::incoming("ItemAdd");
    pub const NOTIFICATION_DIALOG: Identifier = Identifier::incoming("NotificationDialog");
}

/// Legacy variant identifiers.
pub mod legacy {
    use parlor_protocol::Identifier;

    pub const TRYFLAT: Identifier = Identifier::outgoing("TRYFLAT");
    pub const GOTOFLAT: Identifier = Identifier::outgoing("GOTOFLAT");
    pub const PLACESTUFF: Identifier = Identifier::outgoing("PLACESTUFF");
    pub const PLACEITEM: Identifier = Identifier::outgoing("PLACEITEM");

    pub const ERROR: Identifier = Identifier::incoming("ERROR");
    pub const FLAT_LETIN: Identifier = Identifier::incoming("FLAT_LETIN");
    pub const ROOM_READY: Identifier = Identifier::incoming("ROOM_READY");
    pub const CANTCONNECT: Identifier = Identifier::incoming("CANTCONNECT");
    pub const ADDITEM: Identifier = Identifier::incoming("ADDITEM");
    /// Inventory strip contents. Has no message type; tasks watch it raw.
    pub const STRIPINFO: Identifier = Identifier::incoming("STRIPINFO");
}

const MODERN_DEFAULTS: &[(Identifier, u16)] = &[
    (modern::GET_GUEST_ROOM, 2230),
    (modern::OPEN_FLAT_CONNECTION, 2312),
    (modern::PLACE_OBJECT, 1258),
    (modern::GET_GUEST_ROOM_RESULT, 687),
    (modern::ROOM_ENTRY_INFO, 749),
    (modern::CANT_CONNECT, 899),
    (modern::ITEM_ADD, 2187),
    (modern::NOTIFICATION_DIALOG, 1992),
];

const LEGACY_DEFAULTS: &[(Identifier, u16)] = &[
    (legacy::TRYFLAT, 57),
    (legacy::GOTOFLAT, 59),
    (legacy::PLACESTUFF, 90),
    (legacy::PLACEITEM, 83),
    (legacy::ERROR, 33),
    (legacy::FLAT_LETIN, 41),
    (legacy::ROOM_READY, 69),
    (legacy::CANTCONNECT, 224),
    (legacy::ADDITEM, 83),
    (legacy::STRIPINFO, 140),
];

/// The built-in identifier table for both variants.
pub fn default_table() -> IdentifierTable {
    let mut table = IdentifierTable::new();
    for (variant, defaults) in [(Variant::Modern, MODERN_DEFAULTS), (Variant::Legacy, LEGACY_DEFAULTS)] {
        for &(identifier, header) in defaults {
            table.insert(variant, identifier, Header(header));
        }
    }
    table
}
