//! Dispatcher resolution with test-only message types.

use parlor_protocol::{
    Direction, Dispatcher, Header, Identifier, IdentifierTable, Message, Packet, ProtocolError,
    Variant,
};

// =========================================================================
// Test messages: two kinds sharing one outgoing identifier on modern,
// told apart by the sign of their first int.
// =========================================================================

const SHARED: Identifier = Identifier::outgoing("Shared");
const LONE: Identifier = Identifier::incoming("Lone");

#[derive(Debug, PartialEq)]
struct Positive(i32);

#[derive(Debug, PartialEq)]
struct Negative(i32);

#[derive(Debug, PartialEq)]
struct Lone(String);

impl Message for Positive {
    const NAME: &'static str = "Positive";
    const DIRECTION: Direction = Direction::Outgoing;

    fn identifier(_: Variant) -> Option<Identifier> {
        Some(SHARED)
    }

    fn matches(packet: &mut Packet) -> bool {
        packet.read_int().is_ok_and(|v| v > 0)
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        packet.read_int().map(Positive)
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        packet.write_int(self.0)
    }
}

impl Message for Negative {
    const NAME: &'static str = "Negative";
    const DIRECTION: Direction = Direction::Outgoing;

    fn identifier(_: Variant) -> Option<Identifier> {
        Some(SHARED)
    }

    fn matches(packet: &mut Packet) -> bool {
        packet.read_int().is_ok_and(|v| v < 0)
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        packet.read_int().map(Negative)
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        packet.write_int(self.0)
    }
}

impl Message for Lone {
    const NAME: &'static str = "Lone";
    const DIRECTION: Direction = Direction::Incoming;

    fn identifier(variant: Variant) -> Option<Identifier> {
        (variant == Variant::Modern).then_some(LONE)
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        packet.read_string().map(Lone)
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        if packet.variant() != Variant::Modern {
            return Err(Self::unsupported(packet.variant()));
        }
        packet.write_string(&self.0)
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn dispatcher(variant: Variant) -> Dispatcher {
    let mut table = IdentifierTable::new();
    table.insert(Variant::Modern, SHARED, Header(10));
    table.insert(Variant::Modern, LONE, Header(20));
    table.insert(Variant::Legacy, SHARED, Header(30));

    let mut dispatcher = Dispatcher::new(variant, table);
    dispatcher
        .register::<Positive>()
        .register::<Negative>()
        .register::<Lone>();
    dispatcher
}

fn shared_packet(value: i32) -> Packet {
    let mut p = Packet::new(Header(10), Direction::Outgoing, Variant::Modern);
    p.write_int(value).unwrap();
    p.reset();
    p
}

// =========================================================================
// Tests
// =========================================================================

#[test]
fn test_resolve_returns_candidates_in_registration_order() {
    let d = dispatcher(Variant::Modern);
    let names: Vec<_> = d
        .resolve(Header(10), Variant::Modern, Direction::Outgoing)
        .unwrap()
        .iter()
        .map(|k| k.name())
        .collect();
    assert_eq!(names, ["Positive", "Negative"]);
}

#[test]
fn test_resolve_unknown_header_is_empty() {
    let d = dispatcher(Variant::Modern);
    assert!(d.resolve(Header(99), Variant::Modern, Direction::Outgoing).unwrap().is_empty());
    // Same number, other direction.
    assert!(d.resolve(Header(10), Variant::Modern, Direction::Incoming).unwrap().is_empty());
}

#[test]
fn test_resolve_rejects_other_variant() {
    let d = dispatcher(Variant::Modern);
    assert_eq!(
        d.resolve(Header(10), Variant::Legacy, Direction::Outgoing),
        Err(ProtocolError::VariantMismatch {
            expected: Variant::Modern,
            actual: Variant::Legacy,
        })
    );
}

#[test]
fn test_dispatch_picks_first_matching_predicate() {
    let d = dispatcher(Variant::Modern);

    let kind = d.dispatch(&mut shared_packet(5)).unwrap().unwrap();
    assert!(kind.is::<Positive>());

    let kind = d.dispatch(&mut shared_packet(-5)).unwrap().unwrap();
    assert!(kind.is::<Negative>());
}

#[test]
fn test_dispatch_unresolved_when_no_predicate_matches() {
    let d = dispatcher(Variant::Modern);
    assert_eq!(d.dispatch(&mut shared_packet(0)).unwrap(), None);
}

#[test]
fn test_dispatch_is_deterministic_and_leaves_cursor() {
    let d = dispatcher(Variant::Modern);
    let mut packet = shared_packet(-3);
    let first = d.dispatch(&mut packet).unwrap();
    let second = d.dispatch(&mut packet).unwrap();
    assert_eq!(first, second);
    assert_eq!(packet.position(), 0);
    assert_eq!(packet.parse::<Negative>().unwrap(), Negative(-3));
}

#[test]
fn test_dispatch_single_candidate_skips_predicate() {
    let d = dispatcher(Variant::Modern);
    let mut packet = Packet::with_data(Header(20), Direction::Incoming, Variant::Modern, [0, 0]);
    let kind = d.dispatch(&mut packet).unwrap().unwrap();
    assert!(kind.is::<Lone>());
    assert_eq!(packet.parse::<Lone>().unwrap(), Lone(String::new()));
}

#[test]
fn test_register_skips_messages_missing_on_variant() {
    let d = dispatcher(Variant::Legacy);
    assert!(d.resolve(Header(20), Variant::Legacy, Direction::Incoming).unwrap().is_empty());
    assert_eq!(d.resolve(Header(30), Variant::Legacy, Direction::Outgoing).unwrap().len(), 2);
}

#[test]
fn test_compose_sets_header_and_resets_cursor() {
    let d = dispatcher(Variant::Modern);
    let packet = d.compose(&Lone("hey".into())).unwrap();
    assert_eq!(packet.header(), Header(20));
    assert_eq!(packet.direction(), Direction::Incoming);
    assert_eq!(packet.position(), 0);
    assert!(d.is(&packet, LONE));
    assert_eq!(d.name_of(&packet), Some("Lone"));
}

#[test]
fn test_compose_unsupported_variant() {
    let d = dispatcher(Variant::Legacy);
    assert_eq!(
        d.compose(&Lone("x".into())),
        Err(ProtocolError::UnsupportedVariant {
            message: "Lone",
            variant: Variant::Legacy,
        })
    );
}

#[test]
fn test_compose_unknown_identifier() {
    let d = Dispatcher::new(Variant::Modern, IdentifierTable::new());
    assert_eq!(
        d.compose(&Positive(1)),
        Err(ProtocolError::UnknownIdentifier {
            identifier: SHARED,
            variant: Variant::Modern,
        })
    );
}
