//! The per-message codec contract.
//!
//! Every concrete message type implements [`Message`]. The trait ties
//! together the three things the rest of the system needs to know about a
//! message:
//!
//! 1. **Identity** — which identifier it travels under on each variant
//!    ([`Message::identifier`]), and, when several types share an
//!    identifier, how to tell them apart ([`Message::matches`]).
//! 2. **Decoding** — [`Message::parse`] turns a packet into a value.
//! 3. **Encoding** — [`Message::compose`] writes a value into a packet.
//!
//! For any valid value `m` and any variant the type supports,
//! `parse(compose(m)) == m`.

use crate::{Direction, Identifier, Packet, ProtocolError, Variant};

/// A typed protocol message.
///
/// Implementations branch on `packet.variant()` inside `parse` and
/// `compose` to pick the variant's field layout. `compose` must return
/// [`ProtocolError::UnsupportedVariant`] before writing anything when the
/// variant has no layout for this message.
pub trait Message: Sized + 'static {
    /// Type name used in logs and error messages.
    const NAME: &'static str;

    /// The direction this message travels in.
    const DIRECTION: Direction;

    /// The identifier this message uses on `variant`, or `None` if the
    /// message does not exist there.
    ///
    /// Returning a different identifier per variant is how "targeted"
    /// messages are declared.
    fn identifier(variant: Variant) -> Option<Identifier>;

    /// Content sniffing for identifiers shared by several message types.
    ///
    /// Called with the cursor at the start of the payload; the caller
    /// restores the cursor afterwards, so implementations may read freely.
    /// The default claims every packet.
    fn matches(_packet: &mut Packet) -> bool {
        true
    }

    /// Decodes the message from the packet, reading from the cursor.
    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError>;

    /// Encodes the message into the packet at the cursor.
    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError>;

    /// Shorthand for the error `compose` returns on an unsupported variant.
    fn unsupported(variant: Variant) -> ProtocolError {
        ProtocolError::UnsupportedVariant {
            message: Self::NAME,
            variant,
        }
    }
}
