//! NBT tree format and its wire framing
//!
//! # Format
//! Each tag is a type byte followed by its payload. Compound children are
//! `type | name | payload` triples terminated by an end tag (type 0). Strings
//! inside the tree are prefixed with a big-endian `u16` byte length.
//!
//! How a root tag is framed depends on the version:
//!
//! | Versions        | Root framing                                          |
//! |-----------------|-------------------------------------------------------|
//! | < 1.8           | `i16` length, then a gzip-compressed named root       |
//! | 1.8 ..< 1.20.2  | named root: type byte, name (always empty), payload   |
//! | >= 1.20.2       | nameless root: type byte, payload                     |
//!
//! A length of `-1` (oldest framing) or a type byte of `0` means no tag.

use crate::compression::{self, CompressionType};
use crate::cursor::WireCursor;
use indexmap::IndexMap;
use packetmap_core::{ClientVersion, ProtocolError, Result};

/// Deepest nesting accepted on read
pub const MAX_DEPTH: usize = 512;

/// Largest inflated root accepted from the gzip framing
pub const MAX_INFLATED_SIZE: usize = 2 * 1024 * 1024;

const TAG_END: u8 = 0;
const TAG_BYTE: u8 = 1;
const TAG_SHORT: u8 = 2;
const TAG_INT: u8 = 3;
const TAG_LONG: u8 = 4;
const TAG_FLOAT: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_BYTE_ARRAY: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_LIST: u8 = 9;
const TAG_COMPOUND: u8 = 10;
const TAG_INT_ARRAY: u8 = 11;
const TAG_LONG_ARRAY: u8 = 12;

#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    /// Elements must all be the same variant
    List(Vec<Tag>),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    pub fn type_id(&self) -> u8 {
        match self {
            Self::Byte(_) => TAG_BYTE,
            Self::Short(_) => TAG_SHORT,
            Self::Int(_) => TAG_INT,
            Self::Long(_) => TAG_LONG,
            Self::Float(_) => TAG_FLOAT,
            Self::Double(_) => TAG_DOUBLE,
            Self::ByteArray(_) => TAG_BYTE_ARRAY,
            Self::String(_) => TAG_STRING,
            Self::List(_) => TAG_LIST,
            Self::Compound(_) => TAG_COMPOUND,
            Self::IntArray(_) => TAG_INT_ARRAY,
            Self::LongArray(_) => TAG_LONG_ARRAY,
        }
    }

    pub fn as_byte(&self) -> Option<i8> {
        match self {
            Self::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Self::Compound(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Self::IntArray(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Compound> for Tag {
    fn from(compound: Compound) -> Self {
        Self::Compound(compound)
    }
}

/// Insertion-ordered compound tag
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Compound(IndexMap<String, Tag>);

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, tag: impl Into<Tag>) -> Option<Tag> {
        self.0.insert(key.into(), tag.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Tag> {
        self.0.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.0.iter().map(|(key, tag)| (key.as_str(), tag))
    }

    pub fn put_int(&mut self, key: &str, value: i32) {
        self.insert(key, Tag::Int(value));
    }

    pub fn put_float(&mut self, key: &str, value: f32) {
        self.insert(key, Tag::Float(value));
    }

    pub fn put_string(&mut self, key: &str, value: impl Into<String>) {
        self.insert(key, Tag::String(value.into()));
    }

    pub fn put_int_array(&mut self, key: &str, value: Vec<i32>) {
        self.insert(key, Tag::IntArray(value));
    }

    /// Typed lookups that fail with `InvalidData` when the key is missing or
    /// holds another tag type.
    pub fn require_int(&self, key: &str) -> Result<i32> {
        self.get(key).and_then(Tag::as_int).ok_or_else(|| missing(key, "int"))
    }

    pub fn require_float(&self, key: &str) -> Result<f32> {
        self.get(key).and_then(Tag::as_float).ok_or_else(|| missing(key, "float"))
    }

    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.get(key).and_then(Tag::as_str).ok_or_else(|| missing(key, "string"))
    }

    pub fn require_int_array(&self, key: &str) -> Result<&[i32]> {
        self.get(key)
            .and_then(Tag::as_int_array)
            .ok_or_else(|| missing(key, "int array"))
    }

    pub fn require_compound(&self, key: &str) -> Result<&Compound> {
        self.get(key)
            .and_then(Tag::as_compound)
            .ok_or_else(|| missing(key, "compound"))
    }
}

fn missing(key: &str, kind: &str) -> ProtocolError {
    ProtocolError::InvalidData(format!("Expected {} tag at '{}'", kind, key))
}

impl FromIterator<(String, Tag)> for Compound {
    fn from_iter<I: IntoIterator<Item = (String, Tag)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// -------------------------------------------------------------------------
// Tree payloads
// -------------------------------------------------------------------------

fn read_tree_string(cursor: &mut WireCursor) -> Result<String> {
    let length = cursor.read_u16()? as usize;
    let bytes = cursor.read_bytes(length)?;
    String::from_utf8(bytes).map_err(|_| ProtocolError::InvalidData("Invalid UTF-8 in NBT string".into()))
}

fn write_tree_string(cursor: &mut WireCursor, val: &str) -> Result<()> {
    let length = u16::try_from(val.len()).map_err(|_| ProtocolError::StringTooLong {
        length: val.len(),
        max: u16::MAX as usize,
    })?;
    cursor.write_u16(length);
    cursor.write_bytes(val.as_bytes());
    Ok(())
}

/// Read an `i32` element count, rejecting negatives and counts the remaining
/// bytes cannot hold
fn read_count(cursor: &mut WireCursor, element_size: usize) -> Result<usize> {
    let count = cursor.read_i32()?;
    let count = usize::try_from(count)
        .map_err(|_| ProtocolError::InvalidData(format!("Negative NBT length: {}", count)))?;
    let needed = count.saturating_mul(element_size);
    if needed > cursor.remaining() {
        return Err(ProtocolError::BufferUnderrun {
            needed,
            remaining: cursor.remaining(),
        });
    }
    Ok(count)
}

fn read_payload(cursor: &mut WireCursor, type_id: u8, depth: usize) -> Result<Tag> {
    if depth > MAX_DEPTH {
        return Err(ProtocolError::InvalidData(format!(
            "NBT nested deeper than {}",
            MAX_DEPTH
        )));
    }
    Ok(match type_id {
        TAG_BYTE => Tag::Byte(cursor.read_i8()?),
        TAG_SHORT => Tag::Short(cursor.read_i16()?),
        TAG_INT => Tag::Int(cursor.read_i32()?),
        TAG_LONG => Tag::Long(cursor.read_i64()?),
        TAG_FLOAT => Tag::Float(cursor.read_f32()?),
        TAG_DOUBLE => Tag::Double(cursor.read_f64()?),
        TAG_BYTE_ARRAY => {
            let count = read_count(cursor, 1)?;
            Tag::ByteArray(cursor.read_bytes(count)?.into_iter().map(|b| b as i8).collect())
        }
        TAG_STRING => Tag::String(read_tree_string(cursor)?),
        TAG_LIST => {
            let element_type = cursor.read_u8()?;
            let count = read_count(cursor, 0)?;
            if element_type == TAG_END && count > 0 {
                return Err(ProtocolError::InvalidData(
                    "NBT list of end tags is not empty".into(),
                ));
            }
            let mut items = Vec::with_capacity(count.min(cursor.remaining()));
            for _ in 0..count {
                items.push(read_payload(cursor, element_type, depth + 1)?);
            }
            Tag::List(items)
        }
        TAG_COMPOUND => {
            let mut compound = Compound::new();
            loop {
                let child_type = cursor.read_u8()?;
                if child_type == TAG_END {
                    break;
                }
                let name = read_tree_string(cursor)?;
                let child = read_payload(cursor, child_type, depth + 1)?;
                compound.insert(name, child);
            }
            Tag::Compound(compound)
        }
        TAG_INT_ARRAY => {
            let count = read_count(cursor, 4)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(cursor.read_i32()?);
            }
            Tag::IntArray(items)
        }
        TAG_LONG_ARRAY => {
            let count = read_count(cursor, 8)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(cursor.read_i64()?);
            }
            Tag::LongArray(items)
        }
        other => {
            return Err(ProtocolError::InvalidData(format!(
                "Unknown NBT tag type {}",
                other
            )))
        }
    })
}

fn write_payload(cursor: &mut WireCursor, tag: &Tag) -> Result<()> {
    match tag {
        Tag::Byte(v) => cursor.write_i8(*v),
        Tag::Short(v) => cursor.write_i16(*v),
        Tag::Int(v) => cursor.write_i32(*v),
        Tag::Long(v) => cursor.write_i64(*v),
        Tag::Float(v) => cursor.write_f32(*v),
        Tag::Double(v) => cursor.write_f64(*v),
        Tag::ByteArray(items) => {
            cursor.write_i32(items.len() as i32);
            for b in items {
                cursor.write_i8(*b);
            }
        }
        Tag::String(v) => write_tree_string(cursor, v)?,
        Tag::List(items) => {
            let element_type = items.first().map_or(TAG_END, Tag::type_id);
            if items.iter().any(|item| item.type_id() != element_type) {
                return Err(ProtocolError::InvalidData(
                    "NBT list elements differ in type".into(),
                ));
            }
            cursor.write_u8(element_type);
            cursor.write_i32(items.len() as i32);
            for item in items {
                write_payload(cursor, item)?;
            }
        }
        Tag::Compound(compound) => {
            for (name, child) in compound.iter() {
                cursor.write_u8(child.type_id());
                write_tree_string(cursor, name)?;
                write_payload(cursor, child)?;
            }
            cursor.write_u8(TAG_END);
        }
        Tag::IntArray(items) => {
            cursor.write_i32(items.len() as i32);
            for v in items {
                cursor.write_i32(*v);
            }
        }
        Tag::LongArray(items) => {
            cursor.write_i32(items.len() as i32);
            for v in items {
                cursor.write_i64(*v);
            }
        }
    }
    Ok(())
}

fn read_named_root(cursor: &mut WireCursor) -> Result<Option<Tag>> {
    let type_id = cursor.read_u8()?;
    if type_id == TAG_END {
        return Ok(None);
    }
    read_tree_string(cursor)?;
    read_payload(cursor, type_id, 0).map(Some)
}

fn write_named_root(cursor: &mut WireCursor, tag: Option<&Tag>) -> Result<()> {
    match tag {
        Some(tag) => {
            cursor.write_u8(tag.type_id());
            write_tree_string(cursor, "")?;
            write_payload(cursor, tag)
        }
        None => {
            cursor.write_u8(TAG_END);
            Ok(())
        }
    }
}

impl WireCursor {
    /// Read a root tag framed for this cursor's version
    pub fn read_nbt(&mut self) -> Result<Option<Tag>> {
        let version = self.version();
        if version.is_older_than(ClientVersion::V1_8) {
            let length = self.read_i16()?;
            if length < 0 {
                return Ok(None);
            }
            let compressed = self.read_bytes(length as usize)?;
            let raw =
                compression::decompress_bounded(&compressed, CompressionType::Gzip, MAX_INFLATED_SIZE)?;
            let mut inner = WireCursor::from_slice(&raw, version);
            read_named_root(&mut inner)
        } else if version.is_older_than(ClientVersion::V1_20_2) {
            read_named_root(self)
        } else {
            let type_id = self.read_u8()?;
            if type_id == TAG_END {
                return Ok(None);
            }
            read_payload(self, type_id, 0).map(Some)
        }
    }

    /// Read a root tag that must be a compound when present
    pub fn read_nbt_compound(&mut self) -> Result<Option<Compound>> {
        match self.read_nbt()? {
            Some(Tag::Compound(compound)) => Ok(Some(compound)),
            Some(other) => Err(ProtocolError::InvalidData(format!(
                "Expected compound root, found tag type {}",
                other.type_id()
            ))),
            None => Ok(None),
        }
    }

    /// Write a root tag framed for this cursor's version
    pub fn write_nbt(&mut self, tag: Option<&Tag>) -> Result<()> {
        let version = self.version();
        if version.is_older_than(ClientVersion::V1_8) {
            let Some(tag) = tag else {
                self.write_i16(-1);
                return Ok(());
            };
            let mut inner = WireCursor::new(version);
            write_named_root(&mut inner, Some(tag))?;
            let compressed = compression::compress(inner.as_bytes(), CompressionType::Gzip)?;
            let length = i16::try_from(compressed.len()).map_err(|_| {
                ProtocolError::CollectionTooLarge {
                    length: compressed.len(),
                    max: i16::MAX as usize,
                }
            })?;
            self.write_i16(length);
            self.write_bytes(&compressed);
            Ok(())
        } else if version.is_older_than(ClientVersion::V1_20_2) {
            write_named_root(self, tag)
        } else {
            match tag {
                Some(tag) => {
                    self.write_u8(tag.type_id());
                    write_payload(self, tag)
                }
                None => {
                    self.write_u8(TAG_END);
                    Ok(())
                }
            }
        }
    }
}
