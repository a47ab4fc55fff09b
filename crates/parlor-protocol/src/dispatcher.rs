//! Resolves raw packets to the message kind they carry.
//!
//! The dispatcher is configured for one [`Variant`]. Message types are
//! registered once; each registration looks up the type's identifier in
//! the [`IdentifierTable`] and appends the type to that header's candidate
//! list. Resolution then works like this:
//!
//! ```text
//! (header, direction) ──► candidates
//!   0 candidates  → unresolved
//!   1 candidate   → that kind
//!   n candidates  → first whose `matches` accepts the payload,
//!                   in registration order; none → unresolved
//! ```
//!
//! Predicates run against the undecoded packet and the cursor is restored
//! after each one, so the eventual `parse` sees the payload untouched.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use crate::{Direction, Header, Identifier, IdentifierTable, Message, Packet, ProtocolError, Variant};

// ---------------------------------------------------------------------------
// MessageKind
// ---------------------------------------------------------------------------

/// A type-erased handle to a registered [`Message`] type.
#[derive(Clone, Copy)]
pub struct MessageKind {
    name: &'static str,
    type_id: TypeId,
    matches: fn(&mut Packet) -> bool,
}

impl MessageKind {
    /// The kind for message type `M`.
    pub fn of<M: Message>() -> Self {
        Self {
            name: M::NAME,
            type_id: TypeId::of::<M>(),
            matches: M::matches,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if this kind is message type `M`.
    pub fn is<M: Message>(&self) -> bool {
        self.type_id == TypeId::of::<M>()
    }

    fn matches(&self, packet: &mut Packet) -> bool {
        let predicate = self.matches;
        packet.peek(|p| {
            p.reset();
            predicate(p)
        })
    }
}

impl PartialEq for MessageKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for MessageKind {}

impl fmt::Debug for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageKind").field(&self.name).finish()
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Header → message kind resolution for one protocol variant.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    variant: Variant,
    table: IdentifierTable,
    candidates: HashMap<(Direction, Header), Vec<MessageKind>>,
}

impl Dispatcher {
    /// Creates a dispatcher for `variant` with no registered messages.
    pub fn new(variant: Variant, table: IdentifierTable) -> Self {
        Self {
            variant,
            table,
            candidates: HashMap::new(),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn table(&self) -> &IdentifierTable {
        &self.table
    }

    /// Registers message type `M` as a candidate for its identifier's
    /// header on this dispatcher's variant.
    ///
    /// Types that do not exist on the variant are skipped. Registration
    /// order is disambiguation priority.
    pub fn register<M: Message>(&mut self) -> &mut Self {
        let Some(identifier) = M::identifier(self.variant) else {
            tracing::trace!(msg = M::NAME, variant = %self.variant, "not available on variant");
            return self;
        };
        let Some(header) = self.table.header(self.variant, identifier) else {
            tracing::warn!(
                msg = M::NAME,
                %identifier,
                variant = %self.variant,
                "identifier has no header, message not registered"
            );
            return self;
        };

        let kind = MessageKind::of::<M>();
        let list = self.candidates.entry((identifier.direction, header)).or_default();
        if !list.contains(&kind) {
            list.push(kind);
        }
        self
    }

    /// The ordered candidate kinds for a header.
    ///
    /// `variant` must be this dispatcher's variant.
    pub fn resolve(
        &self,
        header: Header,
        variant: Variant,
        direction: Direction,
    ) -> Result<&[MessageKind], ProtocolError> {
        self.check_variant(variant)?;
        Ok(self
            .candidates
            .get(&(direction, header))
            .map_or(&[][..], Vec::as_slice))
    }

    /// Resolves the packet to a single message kind.
    ///
    /// `Ok(None)` means unresolved: no candidates, or several candidates
    /// and none claimed the payload. The cursor is left where it was.
    pub fn dispatch(&self, packet: &mut Packet) -> Result<Option<MessageKind>, ProtocolError> {
        let candidates = self.resolve(packet.header(), packet.variant(), packet.direction())?;
        let kind = match candidates {
            [] => None,
            [only] => Some(*only),
            shared => {
                let winner = shared.iter().find(|kind| kind.matches(packet)).copied();
                if winner.is_none() {
                    tracing::debug!(
                        header = %packet.header(),
                        direction = %packet.direction(),
                        candidates = shared.len(),
                        "shared identifier left unresolved"
                    );
                }
                winner
            }
        };
        Ok(kind)
    }

    /// The header for `identifier` on this variant.
    pub fn header(&self, identifier: Identifier) -> Result<Header, ProtocolError> {
        self.table
            .header(self.variant, identifier)
            .ok_or(ProtocolError::UnknownIdentifier {
                identifier,
                variant: self.variant,
            })
    }

    /// Returns `true` if the packet carries `identifier`.
    pub fn is(&self, packet: &Packet, identifier: Identifier) -> bool {
        packet.variant() == self.variant
            && packet.direction() == identifier.direction
            && self.table.header(self.variant, identifier) == Some(packet.header())
    }

    /// The identifier name of a packet's header, for logging.
    pub fn name_of(&self, packet: &Packet) -> Option<&str> {
        self.table.name(self.variant, packet.direction(), packet.header())
    }

    /// Composes `message` into a new packet for this variant, cursor reset.
    ///
    /// Fails with [`ProtocolError::UnsupportedVariant`] if the message has
    /// no identifier here, before anything is written.
    pub fn compose<M: Message>(&self, message: &M) -> Result<Packet, ProtocolError> {
        let identifier = M::identifier(self.variant).ok_or_else(|| M::unsupported(self.variant))?;
        let header = self.header(identifier)?;
        let mut packet = Packet::new(header, M::DIRECTION, self.variant);
        message.compose(&mut packet)?;
        packet.reset();
        Ok(packet)
    }

    fn check_variant(&self, variant: Variant) -> Result<(), ProtocolError> {
        if variant == self.variant {
            Ok(())
        } else {
            Err(ProtocolError::VariantMismatch {
                expected: self.variant,
                actual: variant,
            })
        }
    }
}
