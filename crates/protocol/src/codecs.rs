//! Wire primitive codecs
//!
//! Free functions over `BytesMut`. Reads consume bytes from the front of the
//! buffer and writes append to the back, so one buffer serves as both read and
//! write position. [`crate::WireCursor`] wraps these together with the
//! negotiated protocol version.
//!
//! Fixed-width numbers are big-endian. Variable-length integers carry 7 payload
//! bits per byte, least significant group first, with the high bit flagging a
//! continuation byte.

use bytes::{Buf, BufMut, BytesMut};
use packetmap_core::{ProtocolError, Result};

/// Longest valid encoding of a 32-bit var-int
pub const MAX_VAR_INT_BYTES: usize = 5;

/// Longest valid encoding of a 64-bit var-long
pub const MAX_VAR_LONG_BYTES: usize = 10;

/// Default cap on string length (UTF-16 code units)
pub const MAX_STRING_LENGTH: usize = 32767;

/// Fail with `BufferUnderrun` unless `needed` bytes are left
#[inline]
pub fn ensure_remaining(buf: &BytesMut, needed: usize) -> Result<()> {
    let remaining = buf.remaining();
    if remaining < needed {
        return Err(ProtocolError::BufferUnderrun { needed, remaining });
    }
    Ok(())
}

/// Number of bytes `val` occupies as a var-int
pub fn var_int_size(val: i32) -> usize {
    let bits = 32 - (val as u32).leading_zeros() as usize;
    (bits.max(1) + 6) / 7
}

/// Number of bytes `val` occupies as a var-long
pub fn var_long_size(val: i64) -> usize {
    let bits = 64 - (val as u64).leading_zeros() as usize;
    (bits.max(1) + 6) / 7
}

/// Write a var-int
///
/// Negative values are encoded by their unsigned bit pattern and therefore
/// always take five bytes.
#[inline]
pub fn write_var_int(buf: &mut BytesMut, val: i32) {
    write_var(buf, u64::from(val as u32));
}

/// Read a var-int
#[inline]
pub fn read_var_int(buf: &mut BytesMut) -> Result<i32> {
    Ok(read_var(buf, 32, MAX_VAR_INT_BYTES)? as u32 as i32)
}

/// Write a var-long
#[inline]
pub fn write_var_long(buf: &mut BytesMut, val: i64) {
    write_var(buf, val as u64);
}

/// Read a var-long
#[inline]
pub fn read_var_long(buf: &mut BytesMut) -> Result<i64> {
    Ok(read_var(buf, 64, MAX_VAR_LONG_BYTES)? as i64)
}

fn write_var(buf: &mut BytesMut, mut value: u64) {
    loop {
        if value & !0x7F == 0 {
            buf.put_u8(value as u8);
            return;
        }
        buf.put_u8((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
}

/// Shared var-int/var-long decoder
///
/// Rejects encodings that are longer than necessary: a trailing zero group,
/// or payload bits in the last byte beyond the integer's width.
fn read_var(buf: &mut BytesMut, width: usize, max_bytes: usize) -> Result<u64> {
    let mut value = 0u64;
    for position in 0..max_bytes {
        ensure_remaining(buf, 1)?;
        let byte = buf.get_u8();
        let payload = byte & 0x7F;
        let shift = 7 * position;

        if width - shift < 7 && (payload >> (width - shift)) != 0 {
            return Err(ProtocolError::InvalidData(format!(
                "Var-int group {} overflows {} bits",
                position, width
            )));
        }
        value |= u64::from(payload) << shift;

        if byte & 0x80 == 0 {
            if payload == 0 && position > 0 {
                return Err(ProtocolError::InvalidData("Over-long var-int encoding".into()));
            }
            return Ok(value);
        }
    }
    Err(ProtocolError::VarIntTooLong { max_bytes })
}

/// Read a length prefix (var-int) and reject negative values
pub fn read_length(buf: &mut BytesMut) -> Result<usize> {
    let length = read_var_int(buf)?;
    usize::try_from(length)
        .map_err(|_| ProtocolError::InvalidData(format!("Negative length prefix: {}", length)))
}

/// Write a string (var-int byte length + UTF-8)
///
/// No length check is made here; see [`write_string_bounded`].
#[inline]
pub fn write_string(buf: &mut BytesMut, val: &str) {
    write_var_int(buf, val.len() as i32);
    buf.put_slice(val.as_bytes());
}

/// Write a string, failing if it exceeds `max_chars` UTF-16 code units
pub fn write_string_bounded(buf: &mut BytesMut, val: &str, max_chars: usize) -> Result<()> {
    let length = val.encode_utf16().count();
    if length > max_chars {
        return Err(ProtocolError::StringTooLong {
            length,
            max: max_chars,
        });
    }
    write_string(buf, val);
    Ok(())
}

/// Read a string of at most `max_chars` UTF-16 code units
///
/// # Format
/// - VarInt: byte length
/// - UTF-8 bytes
///
/// A byte length above `max_chars * 3` cannot decode to an acceptable string
/// and is rejected before the payload is touched.
pub fn read_string(buf: &mut BytesMut, max_chars: usize) -> Result<String> {
    let byte_length = read_length(buf)?;
    let max_bytes = max_chars.saturating_mul(3);
    if byte_length > max_bytes {
        return Err(ProtocolError::StringTooLong {
            length: byte_length,
            max: max_bytes,
        });
    }
    ensure_remaining(buf, byte_length)?;

    let bytes = buf.split_to(byte_length);
    let text = std::str::from_utf8(&bytes)
        .map_err(|e| ProtocolError::InvalidData(format!("Invalid UTF-8: {}", e)))?
        .to_string();

    let length = text.encode_utf16().count();
    if length > max_chars {
        return Err(ProtocolError::StringTooLong {
            length,
            max: max_chars,
        });
    }
    Ok(text)
}

/// Write a byte array (var-int length + raw bytes)
#[inline]
pub fn write_byte_array(buf: &mut BytesMut, val: &[u8]) {
    write_var_int(buf, val.len() as i32);
    buf.put_slice(val);
}

/// Read a byte array of at most `max_length` bytes
pub fn read_byte_array(buf: &mut BytesMut, max_length: usize) -> Result<Vec<u8>> {
    let length = read_length(buf)?;
    if length > max_length {
        return Err(ProtocolError::CollectionTooLarge {
            length,
            max: max_length,
        });
    }
    ensure_remaining(buf, length)?;
    Ok(buf.split_to(length).to_vec())
}

/// Write a UUID as two big-endian longs (most significant first)
#[inline]
pub fn write_uuid(buf: &mut BytesMut, val: u128) {
    buf.put_u128(val);
}

/// Read a UUID
#[inline]
pub fn read_uuid(buf: &mut BytesMut) -> Result<u128> {
    ensure_remaining(buf, 16)?;
    Ok(buf.get_u128())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encoded(val: i32) -> Vec<u8> {
        let mut buf = BytesMut::new();
        write_var_int(&mut buf, val);
        buf.to_vec()
    }

    #[test]
    fn test_var_int_known_encodings() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(1), vec![0x01]);
        assert_eq!(encoded(127), vec![0x7f]);
        assert_eq!(encoded(128), vec![0x80, 0x01]);
        assert_eq!(encoded(255), vec![0xff, 0x01]);
        assert_eq!(encoded(25565), vec![0xdd, 0xc7, 0x01]);
        assert_eq!(encoded(i32::MAX), vec![0xff, 0xff, 0xff, 0xff, 0x07]);
        assert_eq!(encoded(-1), vec![0xff, 0xff, 0xff, 0xff, 0x0f]);
        assert_eq!(encoded(i32::MIN), vec![0x80, 0x80, 0x80, 0x80, 0x08]);
    }

    #[test]
    fn test_var_int_rejects_overlong() {
        let mut buf = BytesMut::from(&[0x80u8, 0x00][..]);
        assert!(matches!(read_var_int(&mut buf), Err(ProtocolError::InvalidData(_))));

        // -1 with an extra bit in the fifth group
        let mut buf = BytesMut::from(&[0xffu8, 0xff, 0xff, 0xff, 0x1f][..]);
        assert!(matches!(read_var_int(&mut buf), Err(ProtocolError::InvalidData(_))));
    }

    #[test]
    fn test_var_int_too_long() {
        let mut buf = BytesMut::from(&[0x80u8, 0x80, 0x80, 0x80, 0x80, 0x01][..]);
        assert!(matches!(
            read_var_int(&mut buf),
            Err(ProtocolError::VarIntTooLong { max_bytes: 5 })
        ));
    }

    #[test]
    fn test_var_int_underrun() {
        let mut buf = BytesMut::from(&[0x80u8, 0x80][..]);
        assert!(matches!(
            read_var_int(&mut buf),
            Err(ProtocolError::BufferUnderrun { needed: 1, remaining: 0 })
        ));
    }

    #[test]
    fn test_var_long_extremes() {
        for val in [0i64, 1, -1, i64::MAX, i64::MIN] {
            let mut buf = BytesMut::new();
            write_var_long(&mut buf, val);
            assert_eq!(buf.len(), var_long_size(val));
            assert_eq!(read_var_long(&mut buf).unwrap(), val);
        }
        let mut buf = BytesMut::new();
        write_var_long(&mut buf, -1);
        assert_eq!(buf.len(), MAX_VAR_LONG_BYTES);
    }

    #[test]
    fn test_string_roundtrip() {
        let test_cases = vec!["", "Hello", "minecraft:stone", "ünïcødé ✓"];

        for val in test_cases {
            let mut buf = BytesMut::new();
            write_string(&mut buf, val);
            let decoded = read_string(&mut buf, MAX_STRING_LENGTH).unwrap();
            assert_eq!(val, decoded, "Failed for {}", val);
        }
    }

    #[test]
    fn test_string_limit_counts_utf16_units() {
        // one supplementary character is two UTF-16 code units
        let mut buf = BytesMut::new();
        write_string(&mut buf, "😀");
        assert!(matches!(
            read_string(&mut buf, 1),
            Err(ProtocolError::StringTooLong { length: 2, max: 1 })
        ));
    }

    #[test]
    fn test_string_rejects_oversized_prefix_early() {
        let mut buf = BytesMut::new();
        write_var_int(&mut buf, 1000);
        assert!(matches!(
            read_string(&mut buf, 16),
            Err(ProtocolError::StringTooLong { length: 1000, max: 48 })
        ));
    }

    #[test]
    fn test_string_negative_length() {
        let mut buf = BytesMut::new();
        write_var_int(&mut buf, -5);
        assert!(matches!(read_string(&mut buf, 16), Err(ProtocolError::InvalidData(_))));
    }

    #[test]
    fn test_bounded_write() {
        let mut buf = BytesMut::new();
        assert!(write_string_bounded(&mut buf, "abc", 3).is_ok());
        assert!(matches!(
            write_string_bounded(&mut buf, "abcd", 3),
            Err(ProtocolError::StringTooLong { length: 4, max: 3 })
        ));
    }

    #[test]
    fn test_byte_array_limit() {
        let mut buf = BytesMut::new();
        write_byte_array(&mut buf, &[1, 2, 3, 4]);
        assert!(matches!(
            read_byte_array(&mut buf.clone(), 3),
            Err(ProtocolError::CollectionTooLarge { length: 4, max: 3 })
        ));
        assert_eq!(read_byte_array(&mut buf, 4).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_uuid_is_big_endian() {
        let mut buf = BytesMut::new();
        write_uuid(&mut buf, 0x0123_4567_89ab_cdef_0011_2233_4455_6677);
        assert_eq!(buf[0], 0x01);
        assert_eq!(buf[15], 0x77);
        assert_eq!(read_uuid(&mut buf).unwrap(), 0x0123_4567_89ab_cdef_0011_2233_4455_6677);
    }

    proptest! {
        #[test]
        fn var_int_roundtrip_is_minimal(val in any::<i32>()) {
            let mut buf = BytesMut::new();
            write_var_int(&mut buf, val);
            prop_assert_eq!(buf.len(), var_int_size(val));
            prop_assert_eq!(read_var_int(&mut buf).unwrap(), val);
            prop_assert!(buf.is_empty());
        }

        #[test]
        fn var_long_roundtrip(val in any::<i64>()) {
            let mut buf = BytesMut::new();
            write_var_long(&mut buf, val);
            prop_assert_eq!(read_var_long(&mut buf).unwrap(), val);
        }

        #[test]
        fn string_within_limit_roundtrips(val in "\\PC{0,64}") {
            let limit = val.encode_utf16().count();
            let mut buf = BytesMut::new();
            write_string(&mut buf, &val);
            prop_assert_eq!(read_string(&mut buf, limit).unwrap(), val);
        }

        #[test]
        fn string_over_limit_fails(val in "[a-z]{2,64}") {
            let limit = val.len() - 1;
            let mut buf = BytesMut::new();
            write_string(&mut buf, &val);
            let is_too_long = matches!(read_string(&mut buf, limit), Err(ProtocolError::StringTooLong { .. }));
            prop_assert!(is_too_long);
        }
    }
}
