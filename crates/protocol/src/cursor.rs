//! Version-aware read/write cursor over a message buffer

use crate::codecs::{self, ensure_remaining, MAX_STRING_LENGTH};
use bytes::{Buf, BufMut, BytesMut};
use indexmap::IndexMap;
use packetmap_core::{ClientVersion, Identifier, ProtocolError, Result};
use std::hash::Hash;

/// Cursor threaded through every codec call
///
/// Reads consume bytes from the front of the buffer, writes append to the
/// back. The version is fixed for the lifetime of the cursor and is what
/// version-sensitive codecs branch on.
///
/// A cursor belongs to a single in-flight message and is not shared between
/// threads.
#[derive(Debug, Clone)]
pub struct WireCursor {
    buf: BytesMut,
    version: ClientVersion,
}

impl WireCursor {
    /// Empty cursor for writing a message
    pub fn new(version: ClientVersion) -> Self {
        Self {
            buf: BytesMut::new(),
            version,
        }
    }

    /// Cursor over received bytes
    pub fn from_bytes(buf: BytesMut, version: ClientVersion) -> Self {
        Self { buf, version }
    }

    pub fn from_slice(bytes: &[u8], version: ClientVersion) -> Self {
        Self::from_bytes(BytesMut::from(bytes), version)
    }

    pub fn version(&self) -> ClientVersion {
        self.version
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> BytesMut {
        self.buf
    }

    // ---------------------------------------------------------------------
    // Fixed-width numerics
    // ---------------------------------------------------------------------

    pub fn read_u8(&mut self) -> Result<u8> {
        ensure_remaining(&self.buf, 1)?;
        Ok(self.buf.get_u8())
    }

    pub fn write_u8(&mut self, val: u8) {
        self.buf.put_u8(val);
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        ensure_remaining(&self.buf, 1)?;
        Ok(self.buf.get_i8())
    }

    pub fn write_i8(&mut self, val: i8) {
        self.buf.put_i8(val);
    }

    /// Any non-zero byte reads as `true`
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn write_bool(&mut self, val: bool) {
        self.buf.put_u8(u8::from(val));
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        ensure_remaining(&self.buf, 2)?;
        Ok(self.buf.get_i16())
    }

    pub fn write_i16(&mut self, val: i16) {
        self.buf.put_i16(val);
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        ensure_remaining(&self.buf, 2)?;
        Ok(self.buf.get_u16())
    }

    pub fn write_u16(&mut self, val: u16) {
        self.buf.put_u16(val);
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        ensure_remaining(&self.buf, 4)?;
        Ok(self.buf.get_i32())
    }

    pub fn write_i32(&mut self, val: i32) {
        self.buf.put_i32(val);
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        ensure_remaining(&self.buf, 8)?;
        Ok(self.buf.get_i64())
    }

    pub fn write_i64(&mut self, val: i64) {
        self.buf.put_i64(val);
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        ensure_remaining(&self.buf, 4)?;
        Ok(self.buf.get_f32())
    }

    pub fn write_f32(&mut self, val: f32) {
        self.buf.put_f32(val);
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        ensure_remaining(&self.buf, 8)?;
        Ok(self.buf.get_f64())
    }

    pub fn write_f64(&mut self, val: f64) {
        self.buf.put_f64(val);
    }

    pub fn read_uuid(&mut self) -> Result<u128> {
        codecs::read_uuid(&mut self.buf)
    }

    pub fn write_uuid(&mut self, val: u128) {
        codecs::write_uuid(&mut self.buf, val);
    }

    // ---------------------------------------------------------------------
    // Variable-length integers
    // ---------------------------------------------------------------------

    pub fn read_var_int(&mut self) -> Result<i32> {
        codecs::read_var_int(&mut self.buf)
    }

    pub fn write_var_int(&mut self, val: i32) {
        codecs::write_var_int(&mut self.buf, val);
    }

    pub fn read_var_long(&mut self) -> Result<i64> {
        codecs::read_var_long(&mut self.buf)
    }

    pub fn write_var_long(&mut self, val: i64) {
        codecs::write_var_long(&mut self.buf, val);
    }

    // ---------------------------------------------------------------------
    // Strings, identifiers and raw bytes
    // ---------------------------------------------------------------------

    /// Read a string capped at [`MAX_STRING_LENGTH`]
    pub fn read_string(&mut self) -> Result<String> {
        codecs::read_string(&mut self.buf, MAX_STRING_LENGTH)
    }

    /// Read a string capped at `max_chars`
    ///
    /// Caps differ per field and per era, so callers pick them.
    pub fn read_string_bounded(&mut self, max_chars: usize) -> Result<String> {
        codecs::read_string(&mut self.buf, max_chars)
    }

    pub fn write_string(&mut self, val: &str) {
        codecs::write_string(&mut self.buf, val);
    }

    pub fn write_string_bounded(&mut self, val: &str, max_chars: usize) -> Result<()> {
        codecs::write_string_bounded(&mut self.buf, val, max_chars)
    }

    pub fn read_identifier(&mut self) -> Result<Identifier> {
        Ok(Identifier::parse(&self.read_string()?))
    }

    pub fn write_identifier(&mut self, val: &Identifier) {
        self.write_string(&val.to_string());
    }

    pub fn read_byte_array(&mut self, max_length: usize) -> Result<Vec<u8>> {
        codecs::read_byte_array(&mut self.buf, max_length)
    }

    pub fn write_byte_array(&mut self, val: &[u8]) {
        codecs::write_byte_array(&mut self.buf, val);
    }

    /// Read exactly `length` raw bytes
    pub fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        ensure_remaining(&self.buf, length)?;
        Ok(self.buf.split_to(length).to_vec())
    }

    pub fn write_bytes(&mut self, val: &[u8]) {
        self.buf.put_slice(val);
    }

    /// Consume everything left in the buffer
    pub fn read_remaining(&mut self) -> Vec<u8> {
        self.buf.split().to_vec()
    }

    // ---------------------------------------------------------------------
    // Framing
    // ---------------------------------------------------------------------

    /// Read a presence flag, then the value if present
    pub fn read_optional<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Option<T>> {
        if self.read_bool()? {
            read(self).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Write a presence flag, then the value if present
    pub fn write_optional<T>(
        &mut self,
        val: Option<&T>,
        write: impl FnOnce(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        match val {
            Some(inner) => {
                self.write_bool(true);
                write(self, inner)
            }
            None => {
                self.write_bool(false);
                Ok(())
            }
        }
    }

    /// Read a var-int element count, then the elements
    pub fn read_list<T>(&mut self, read: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        self.read_list_bounded(usize::MAX, read)
    }

    /// Like [`read_list`](Self::read_list), failing if the count exceeds `max`
    pub fn read_list_bounded<T>(
        &mut self,
        max: usize,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let count = codecs::read_length(&mut self.buf)?;
        if count > max {
            return Err(ProtocolError::CollectionTooLarge { length: count, max });
        }
        // each element takes at least one byte
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(read(self)?);
        }
        Ok(items)
    }

    /// Write a var-int element count, then the elements
    ///
    /// No implicit maximum is applied.
    pub fn write_list<T>(
        &mut self,
        items: &[T],
        mut write: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        self.write_var_int(items.len() as i32);
        for item in items {
            write(self, item)?;
        }
        Ok(())
    }

    /// Read a var-int pair count, then key/value pairs
    ///
    /// Insertion order is preserved. A repeated key is rejected.
    pub fn read_map<K, V>(
        &mut self,
        mut read_key: impl FnMut(&mut Self) -> Result<K>,
        mut read_value: impl FnMut(&mut Self) -> Result<V>,
    ) -> Result<IndexMap<K, V>>
    where
        K: Hash + Eq,
    {
        let count = codecs::read_length(&mut self.buf)?;
        let mut map = IndexMap::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            let key = read_key(self)?;
            let value = read_value(self)?;
            if map.insert(key, value).is_some() {
                return Err(ProtocolError::InvalidData("Duplicate map key".into()));
            }
        }
        Ok(map)
    }

    pub fn write_map<K, V>(
        &mut self,
        map: &IndexMap<K, V>,
        mut write_key: impl FnMut(&mut Self, &K) -> Result<()>,
        mut write_value: impl FnMut(&mut Self, &V) -> Result<()>,
    ) -> Result<()> {
        self.write_var_int(map.len() as i32);
        for (key, value) in map {
            write_key(self, key)?;
            write_value(self, value)?;
        }
        Ok(())
    }
}
