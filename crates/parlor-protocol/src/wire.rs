//! Legacy variant integer encodings.
//!
//! The legacy protocol uses two printable-byte integer formats:
//!
//! - **B64**: fixed-width, 6 bits per byte, each byte offset by 64.
//!   Used for headers and string length prefixes.
//! - **VL64**: variable-length signed integer. The first byte carries the
//!   total byte count (bits 3..6), a sign flag (bit 2) and the two lowest
//!   value bits; each following byte carries 6 more bits.
//!
//! ```text
//! 0   → "H"      1 → "I"      -1 → "M"      4 → "PA"
//! ```

use bytes::BufMut;

/// Longest VL64 encoding: 2 + 5 × 6 = 32 value bits.
pub const VL64_MAX_LEN: usize = 6;

/// Appends the VL64 encoding of `value`.
pub fn put_vl64(buf: &mut impl BufMut, value: i32) {
    let mut out = [0u8; VL64_MAX_LEN];
    let len = encode_vl64(value, &mut out);
    buf.put_slice(&out[..len]);
}

/// Encodes `value` into `out`, returning the number of bytes used.
pub fn encode_vl64(value: i32, out: &mut [u8; VL64_MAX_LEN]) -> usize {
    let negative = value < 0;
    let mut magnitude = value.unsigned_abs();

    out[0] = 64 | (magnitude & 0b11) as u8;
    magnitude >>= 2;
    let mut len = 1;
    while magnitude != 0 {
        out[len] = 64 | (magnitude & 0b11_1111) as u8;
        magnitude >>= 6;
        len += 1;
    }

    out[0] |= (len as u8) << 3;
    if negative {
        out[0] |= 0b100;
    }
    len
}

/// Decodes a VL64 integer from the front of `data`.
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// bytes are truncated or not a valid encoding.
pub fn decode_vl64(data: &[u8]) -> Option<(i32, usize)> {
    let first = *data.first()?;
    if first & 0b1100_0000 != 64 {
        return None;
    }
    let len = usize::from((first >> 3) & 0b111);
    if len == 0 || len > VL64_MAX_LEN || data.len() < len {
        return None;
    }

    let mut magnitude = i64::from(first & 0b11);
    let mut shift = 2;
    for &byte in &data[1..len] {
        if byte & 0b1100_0000 != 64 {
            return None;
        }
        magnitude |= i64::from(byte & 0b11_1111) << shift;
        shift += 6;
    }

    let value = if first & 0b100 != 0 {
        -magnitude
    } else {
        magnitude
    };
    i32::try_from(value).ok().map(|v| (v, len))
}

/// Largest value a two-byte B64 field can hold.
pub const B64_MAX: u16 = 0x0FFF;

/// Appends `value` as two B64 bytes. Values above [`B64_MAX`] are masked.
pub fn put_b64(buf: &mut impl BufMut, value: u16) {
    buf.put_u8(64 | ((value >> 6) & 0b11_1111) as u8);
    buf.put_u8(64 | (value & 0b11_1111) as u8);
}

/// Decodes a two-byte B64 value from the front of `data`.
pub fn decode_b64(data: &[u8]) -> Option<u16> {
    match data {
        [hi, lo, ..] if hi & 0b1100_0000 == 64 && lo & 0b1100_0000 == 64 => {
            Some((u16::from(hi & 0b11_1111) << 6) | u16::from(lo & 0b11_1111))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vl64(value: i32) -> Vec<u8> {
        let mut buf = Vec::new();
        put_vl64(&mut buf, value);
        buf
    }

    #[test]
    fn test_vl64_known_encodings() {
        assert_eq!(vl64(0), b"H");
        assert_eq!(vl64(1), b"I");
        assert_eq!(vl64(3), b"K");
        assert_eq!(vl64(-1), b"M");
        assert_eq!(vl64(4), b"PA");
    }

    #[test]
    fn test_vl64_decode_boundaries() {
        for value in [0, 1, -1, 3, 4, 63, 64, 255, 256, -7, 100_000, i32::MAX, i32::MIN] {
            let bytes = vl64(value);
            assert_eq!(decode_vl64(&bytes), Some((value, bytes.len())), "value {value}");
        }
    }

    #[test]
    fn test_vl64_decode_ignores_trailing_bytes() {
        let mut bytes = vl64(300);
        let len = bytes.len();
        bytes.extend_from_slice(b"rest");
        assert_eq!(decode_vl64(&bytes), Some((300, len)));
    }

    #[test]
    fn test_vl64_decode_rejects_truncated_and_garbage() {
        let bytes = vl64(100_000);
        assert_eq!(decode_vl64(&bytes[..bytes.len() - 1]), None);
        assert_eq!(decode_vl64(b""), None);
        assert_eq!(decode_vl64(b"@"), None); // length 0
        assert_eq!(decode_vl64(&[0x02]), None);
    }

    #[test]
    fn test_b64() {
        let mut buf = Vec::new();
        put_b64(&mut buf, 0);
        put_b64(&mut buf, 59);
        put_b64(&mut buf, B64_MAX);
        assert_eq!(&buf, b"@@@{\x7f\x7f");
        assert_eq!(decode_b64(&buf[2..]), Some(59));
        assert_eq!(decode_b64(&buf[4..]), Some(B64_MAX));
        assert_eq!(decode_b64(b"@"), None);
    }
}
