//! Error types for the protocol layer.
//!
//! Decode failures are scoped to one packet. Nothing in this enum is
//! fatal to a dispatch loop; the engine decides what to do with them.

use crate::{Id, Identifier, Variant};

/// Errors that can occur while reading, writing or identifying packets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// A read ran past the end of the packet.
    #[error("unexpected end of packet at position {position}")]
    UnexpectedEof { position: usize },

    /// A legacy variable-length integer was malformed.
    #[error("invalid VL64 integer at position {position}")]
    InvalidVl64 { position: usize },

    /// A string field was not valid UTF-8.
    #[error("invalid UTF-8 in string at position {position}")]
    InvalidUtf8 { position: usize },

    /// A string is too long for the variant's length prefix, or contains
    /// the legacy terminator byte.
    #[error("string cannot be encoded: {0}")]
    UnencodableString(String),

    /// An id does not fit the wire's 32-bit id field.
    #[error("id {0} out of range for the wire format")]
    IdOutOfRange(Id),

    /// A field inside a message could not be parsed.
    #[error("failed to parse {field} in {message}: '{value}'")]
    InvalidField {
        message: &'static str,
        field: &'static str,
        value: String,
    },

    /// A delimited field was missing its separator.
    #[error("no separator in {message}")]
    MissingSeparator { message: &'static str },

    /// A wall location string did not match `:w=x,y l=x,y o`.
    #[error("invalid wall location: '{0}'")]
    InvalidWallLocation(String),

    /// The message type cannot be composed for this variant.
    #[error("{message} is not supported on the {variant} variant")]
    UnsupportedVariant {
        message: &'static str,
        variant: Variant,
    },

    /// The identifier has no header in this variant's table.
    #[error("no header for {identifier} on the {variant} variant")]
    UnknownIdentifier {
        identifier: Identifier,
        variant: Variant,
    },

    /// A packet of one variant was handed to a component configured
    /// for the other.
    #[error("packet variant {actual} does not match {expected}")]
    VariantMismatch { expected: Variant, actual: Variant },
}
