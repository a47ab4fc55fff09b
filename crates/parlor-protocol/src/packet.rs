//! The packet buffer: a field cursor over one packet's payload.
//!
//! A [`Packet`] knows its variant and direction, so the same call
//! (`read_int`, `write_string`, ...) picks the right encoding:
//!
//! | Field | Modern | Legacy |
//! |---|---|---|
//! | bool | 1 byte | VL64 `0`/`1` |
//! | int | `i32` big-endian | VL64 |
//! | id | `i32` big-endian | VL64 |
//! | string | `u16` length + UTF-8 | outgoing: B64 length + bytes; incoming: bytes + `0x02` |
//! | content | raw bytes to end of packet | raw bytes to end of packet |
//!
//! Writes overwrite from the cursor and grow the buffer as needed.
//! `replace_*` reads the field currently under the cursor and splices a
//! new value of the same type in its place, so the new value may have a
//! different encoded length.

use bytes::{BufMut, BytesMut};

use crate::wire::{self, B64_MAX};
use crate::{Direction, Header, Id, Message, ProtocolError, Variant};

const LEGACY_STRING_TERMINATOR: u8 = 0x02;

/// One packet's header, metadata and payload, plus a read/write cursor.
///
/// Packets are mutable only while in flight: the interceptor lends a
/// `&mut Packet` to handlers for the duration of one dispatch, and
/// forwards whatever the buffer holds afterwards (unless blocked).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    header: Header,
    direction: Direction,
    variant: Variant,
    data: BytesMut,
    position: usize,
    blocked: bool,
}

impl Packet {
    /// Creates an empty packet.
    pub fn new(header: Header, direction: Direction, variant: Variant) -> Self {
        Self {
            header,
            direction,
            variant,
            data: BytesMut::new(),
            position: 0,
            blocked: false,
        }
    }

    /// Creates a packet over an existing payload, cursor at the start.
    pub fn with_data(
        header: Header,
        direction: Direction,
        variant: Variant,
        data: impl AsRef<[u8]>,
    ) -> Self {
        Self {
            data: BytesMut::from(data.as_ref()),
            ..Self::new(header, direction, variant)
        }
    }

    pub fn header(&self) -> Header {
        self.header
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The raw payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor, clamped to the end of the payload.
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.data.len());
    }

    /// Moves the cursor back to the start.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Marks the packet so it is not forwarded to its destination.
    pub fn block(&mut self) {
        self.blocked = true;
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Empties the payload and resets the cursor.
    pub fn clear(&mut self) {
        self.data.clear();
        self.position = 0;
    }

    /// Runs `f` and restores the cursor afterwards, whatever `f` read.
    pub fn peek<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.position;
        let out = f(self);
        self.position = saved;
        out
    }

    /// Parses the whole payload as message `M`, starting from the
    /// beginning regardless of the current cursor.
    pub fn parse<M: Message>(&mut self) -> Result<M, ProtocolError> {
        self.reset();
        M::parse(self)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        match self.variant {
            Variant::Modern => {
                let byte = *self.rest().first().ok_or_else(|| self.eof())?;
                self.position += 1;
                Ok(byte != 0)
            }
            Variant::Legacy => Ok(self.read_vl64()? != 0),
        }
    }

    pub fn read_int(&mut self) -> Result<i32, ProtocolError> {
        match self.variant {
            Variant::Modern => {
                let bytes: [u8; 4] = self
                    .rest()
                    .get(..4)
                    .and_then(|b| b.try_into().ok())
                    .ok_or_else(|| self.eof())?;
                self.position += 4;
                Ok(i32::from_be_bytes(bytes))
            }
            Variant::Legacy => self.read_vl64(),
        }
    }

    pub fn read_id(&mut self) -> Result<Id, ProtocolError> {
        self.read_int().map(|v| Id(i64::from(v)))
    }

    pub fn read_string(&mut self) -> Result<String, ProtocolError> {
        let (skip, len, total) = self.string_span()?;
        let start = self.position + skip;
        let text = std::str::from_utf8(&self.data[start..start + len])
            .map_err(|_| ProtocolError::InvalidUtf8 {
                position: self.position,
            })?
            .to_owned();
        self.position += total;
        Ok(text)
    }

    /// Reads every remaining byte as text.
    pub fn read_content(&mut self) -> Result<String, ProtocolError> {
        let text = std::str::from_utf8(self.rest())
            .map_err(|_| ProtocolError::InvalidUtf8 {
                position: self.position,
            })?
            .to_owned();
        self.position = self.data.len();
        Ok(text)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    pub fn write_bool(&mut self, value: bool) -> Result<(), ProtocolError> {
        let bytes = self.encode_bool(value);
        self.overwrite(&bytes);
        Ok(())
    }

    pub fn write_int(&mut self, value: i32) -> Result<(), ProtocolError> {
        let bytes = self.encode_int(value);
        self.overwrite(&bytes);
        Ok(())
    }

    pub fn write_id(&mut self, value: Id) -> Result<(), ProtocolError> {
        let bytes = self.encode_id(value)?;
        self.overwrite(&bytes);
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) -> Result<(), ProtocolError> {
        let bytes = self.encode_string(value)?;
        self.overwrite(&bytes);
        Ok(())
    }

    /// Writes raw text with no length prefix or terminator.
    pub fn write_content(&mut self, value: &str) -> Result<(), ProtocolError> {
        self.overwrite(value.as_bytes());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // In-place replacement
    // -----------------------------------------------------------------------

    pub fn replace_bool(&mut self, value: bool) -> Result<(), ProtocolError> {
        let old = self.bool_span()?;
        let bytes = self.encode_bool(value);
        self.splice(old, &bytes);
        Ok(())
    }

    pub fn replace_int(&mut self, value: i32) -> Result<(), ProtocolError> {
        let old = self.int_span()?;
        let bytes = self.encode_int(value);
        self.splice(old, &bytes);
        Ok(())
    }

    pub fn replace_id(&mut self, value: Id) -> Result<(), ProtocolError> {
        let old = self.int_span()?;
        let bytes = self.encode_id(value)?;
        self.splice(old, &bytes);
        Ok(())
    }

    pub fn replace_string(&mut self, value: &str) -> Result<(), ProtocolError> {
        let (_, _, old) = self.string_span()?;
        let bytes = self.encode_string(value)?;
        self.splice(old, &bytes);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn rest(&self) -> &[u8] {
        &self.data[self.position..]
    }

    fn eof(&self) -> ProtocolError {
        ProtocolError::UnexpectedEof {
            position: self.position,
        }
    }

    fn read_vl64(&mut self) -> Result<i32, ProtocolError> {
        let (value, len) = self.vl64_at()?;
        self.position += len;
        Ok(value)
    }

    fn vl64_at(&self) -> Result<(i32, usize), ProtocolError> {
        if self.remaining() == 0 {
            return Err(self.eof());
        }
        wire::decode_vl64(self.rest()).ok_or(ProtocolError::InvalidVl64 {
            position: self.position,
        })
    }

    fn bool_span(&self) -> Result<usize, ProtocolError> {
        match self.variant {
            Variant::Modern if self.remaining() >= 1 => Ok(1),
            Variant::Modern => Err(self.eof()),
            Variant::Legacy => self.vl64_at().map(|(_, len)| len),
        }
    }

    fn int_span(&self) -> Result<usize, ProtocolError> {
        match self.variant {
            Variant::Modern if self.remaining() >= 4 => Ok(4),
            Variant::Modern => Err(self.eof()),
            Variant::Legacy => self.vl64_at().map(|(_, len)| len),
        }
    }

    /// `(prefix length, text length, total encoded length)` of the string
    /// under the cursor.
    fn string_span(&self) -> Result<(usize, usize, usize), ProtocolError> {
        let rest = self.rest();
        match (self.variant, self.direction) {
            (Variant::Modern, _) => {
                let len = match rest {
                    [hi, lo, ..] => usize::from(u16::from_be_bytes([*hi, *lo])),
                    _ => return Err(self.eof()),
                };
                if rest.len() < 2 + len {
                    return Err(self.eof());
                }
                Ok((2, len, 2 + len))
            }
            (Variant::Legacy, Direction::Outgoing) => {
                let len = usize::from(wire::decode_b64(rest).ok_or_else(|| self.eof())?);
                if rest.len() < 2 + len {
                    return Err(self.eof());
                }
                Ok((2, len, 2 + len))
            }
            (Variant::Legacy, Direction::Incoming) => {
                let len = rest
                    .iter()
                    .position(|&b| b == LEGACY_STRING_TERMINATOR)
                    .ok_or_else(|| self.eof())?;
                Ok((0, len, len + 1))
            }
        }
    }

    fn encode_bool(&self, value: bool) -> Vec<u8> {
        match self.variant {
            Variant::Modern => vec![u8::from(value)],
            Variant::Legacy => self.encode_int(i32::from(value)),
        }
    }

    fn encode_int(&self, value: i32) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4);
        match self.variant {
            Variant::Modern => buf.put_i32(value),
            Variant::Legacy => wire::put_vl64(&mut buf, value),
        }
        buf
    }

    fn encode_id(&self, value: Id) -> Result<Vec<u8>, ProtocolError> {
        let raw = i32::try_from(value.0).map_err(|_| ProtocolError::IdOutOfRange(value))?;
        Ok(self.encode_int(raw))
    }

    fn encode_string(&self, value: &str) -> Result<Vec<u8>, ProtocolError> {
        let text = value.as_bytes();
        let mut buf = Vec::with_capacity(text.len() + 2);
        match (self.variant, self.direction) {
            (Variant::Modern, _) => {
                let len = u16::try_from(text.len()).map_err(|_| {
                    ProtocolError::UnencodableString(format!("{} bytes exceeds u16 prefix", text.len()))
                })?;
                buf.put_u16(len);
                buf.put_slice(text);
            }
            (Variant::Legacy, Direction::Outgoing) => {
                let len = u16::try_from(text.len())
                    .ok()
                    .filter(|len| *len <= B64_MAX)
                    .ok_or_else(|| {
                        ProtocolError::UnencodableString(format!("{} bytes exceeds B64 prefix", text.len()))
                    })?;
                wire::put_b64(&mut buf, len);
                buf.put_slice(text);
            }
            (Variant::Legacy, Direction::Incoming) => {
                if text.contains(&LEGACY_STRING_TERMINATOR) {
                    return Err(ProtocolError::UnencodableString(
                        "contains the 0x02 terminator".into(),
                    ));
                }
                buf.put_slice(text);
                buf.put_u8(LEGACY_STRING_TERMINATOR);
            }
        }
        Ok(buf)
    }

    fn overwrite(&mut self, bytes: &[u8]) {
        let end = self.position + bytes.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.position..end].copy_from_slice(bytes);
        self.position = end;
    }

    fn splice(&mut self, old_len: usize, bytes: &[u8]) {
        let tail = self.data.split_off(self.position + old_len);
        self.data.truncate(self.position);
        self.data.extend_from_slice(bytes);
        self.data.extend_from_slice(&tail);
        self.position += bytes.len();
    }
}
