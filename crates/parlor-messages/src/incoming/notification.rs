use parlor_protocol::{Direction, Identifier, Message, Packet, ProtocolError, Variant};

use crate::headers::modern;
use crate::only_on;

/// A server-side notification popup. Modern only.
///
/// Parameters keep their wire order; keys may repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDialogMsg {
    pub kind: String,
    pub parameters: Vec<(String, String)>,
}

impl NotificationDialogMsg {
    /// Sent when the server refuses a furni placement.
    pub const FURNI_PLACEMENT_ERROR: &'static str = "furni_placement_error";

    /// The first value for `key`.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl Message for NotificationDialogMsg {
    const NAME: &'static str = "NotificationDialogMsg";
    const DIRECTION: Direction = Direction::Incoming;

    fn identifier(variant: Variant) -> Option<Identifier> {
        (variant == Variant::Modern).then_some(modern::NOTIFICATION_DIALOG)
    }

    fn parse(packet: &mut Packet) -> Result<Self, ProtocolError> {
        only_on::<Self>(packet, Variant::Modern)?;
        let kind = packet.read_string()?;
        let count = packet.read_int()?;
        let count = usize::try_from(count).map_err(|_| ProtocolError::InvalidField {
            message: Self::NAME,
            field: "parameter_count",
            value: count.to_string(),
        })?;
        // Each pair is at least four bytes of length prefixes.
        let mut parameters = Vec::with_capacity(count.min(packet.remaining() / 4));
        for _ in 0..count {
            parameters.push((packet.read_string()?, packet.read_string()?));
        }
        Ok(Self { kind, parameters })
    }

    fn compose(&self, packet: &mut Packet) -> Result<(), ProtocolError> {
        only_on::<Self>(packet, Variant::Modern)?;
        let count = i32::try_from(self.parameters.len()).map_err(|_| ProtocolError::InvalidField {
            message: Self::NAME,
            field: "parameter_count",
            value: self.parameters.len().to_string(),
        })?;
        packet.write_string(&self.kind)?;
        packet.write_int(count)?;
        for (key, value) in &self.parameters {
            packet.write_string(key)?;
            packet.write_string(value)?;
        }
        Ok(())
    }
}
