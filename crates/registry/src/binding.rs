//! Declarative codec binding
//!
//! A [`ProtocolType`] is a registry entry with wire and tree codecs bound at
//! declaration. Any codec may be absent:
//!
//! | Codec   | Absent behaviour                                              |
//! |---------|---------------------------------------------------------------|
//! | reader  | returns [`Payload::empty`] without touching the cursor        |
//! | decoder | returns [`Payload::empty`]                                    |
//! | writer  | no-op for an empty value, `UnsupportedPayload` otherwise      |
//! | encoder | no-op for an empty value, `UnsupportedPayload` otherwise      |

use crate::entry::{EntryData, MappedEntity};
use crate::registry::VersionedRegistry;
use packetmap_core::{ClientVersion, ProtocolError, Result};
use packetmap_protocol::{Compound, WireCursor};
use std::fmt;
use std::sync::Arc;

/// Value carried by a protocol type
pub trait Payload: Sized + Send + Sync + 'static {
    /// Canonical value of a type without data
    fn empty() -> Self;

    fn is_empty(&self) -> bool;
}

pub type Reader<T> = fn(&mut WireCursor) -> Result<T>;
pub type Writer<T> = fn(&mut WireCursor, &T) -> Result<()>;
pub type Decoder<T> = fn(&Compound, ClientVersion) -> Result<T>;
pub type Encoder<T> = fn(&T, ClientVersion, &mut Compound) -> Result<()>;

/// Registry entry with its codecs, immutable once defined
pub struct ProtocolType<T: Payload> {
    data: EntryData,
    reader: Option<Reader<T>>,
    writer: Option<Writer<T>>,
    decoder: Option<Decoder<T>>,
    encoder: Option<Encoder<T>>,
}

impl<T: Payload> ProtocolType<T> {
    pub fn read(&self, cursor: &mut WireCursor) -> Result<T> {
        match self.reader {
            Some(reader) => reader(cursor),
            None => Ok(T::empty()),
        }
    }

    pub fn write(&self, cursor: &mut WireCursor, value: &T) -> Result<()> {
        match self.writer {
            Some(writer) => writer(cursor, value),
            None => self.check_empty(value, "writer"),
        }
    }

    pub fn decode(&self, tag: &Compound, version: ClientVersion) -> Result<T> {
        match self.decoder {
            Some(decoder) => decoder(tag, version),
            None => Ok(T::empty()),
        }
    }

    pub fn encode(&self, value: &T, version: ClientVersion, tag: &mut Compound) -> Result<()> {
        match self.encoder {
            Some(encoder) => encoder(value, version, tag),
            None => self.check_empty(value, "encoder"),
        }
    }

    /// Whether the type has no codecs at all
    pub fn is_marker(&self) -> bool {
        self.reader.is_none()
            && self.writer.is_none()
            && self.decoder.is_none()
            && self.encoder.is_none()
    }

    pub fn has_wire_codec(&self) -> bool {
        self.reader.is_some() || self.writer.is_some()
    }

    pub fn has_tree_codec(&self) -> bool {
        self.decoder.is_some() || self.encoder.is_some()
    }

    fn check_empty(&self, value: &T, codec: &str) -> Result<()> {
        if value.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::UnsupportedPayload(format!(
                "{} has no {} for non-empty values",
                self.data.identifier(),
                codec
            )))
        }
    }
}

impl<T: Payload> MappedEntity for ProtocolType<T> {
    fn data(&self) -> &EntryData {
        &self.data
    }
}

impl<T: Payload> fmt::Debug for ProtocolType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolType")
            .field("identifier", &self.data.identifier().to_string())
            .field("wire", &self.has_wire_codec())
            .field("tree", &self.has_tree_codec())
            .finish()
    }
}

pub type ProtocolRegistry<T> = VersionedRegistry<ProtocolType<T>>;

/// Declare a type with wire codecs only
pub fn define<T: Payload>(
    registry: &mut ProtocolRegistry<T>,
    name: &str,
    reader: Reader<T>,
    writer: Writer<T>,
) -> Result<Arc<ProtocolType<T>>> {
    define_partial(registry, name, Some(reader), Some(writer), None, None)
}

/// Declare a type with wire and tree codecs
pub fn define_with_tree<T: Payload>(
    registry: &mut ProtocolRegistry<T>,
    name: &str,
    reader: Reader<T>,
    writer: Writer<T>,
    decoder: Decoder<T>,
    encoder: Encoder<T>,
) -> Result<Arc<ProtocolType<T>>> {
    define_partial(registry, name, Some(reader), Some(writer), Some(decoder), Some(encoder))
}

/// Declare a type that never carries data
pub fn define_marker<T: Payload>(
    registry: &mut ProtocolRegistry<T>,
    name: &str,
) -> Result<Arc<ProtocolType<T>>> {
    define_partial(registry, name, None, None, None, None)
}

pub fn define_partial<T: Payload>(
    registry: &mut ProtocolRegistry<T>,
    name: &str,
    reader: Option<Reader<T>>,
    writer: Option<Writer<T>>,
    decoder: Option<Decoder<T>>,
    encoder: Option<Encoder<T>>,
) -> Result<Arc<ProtocolType<T>>> {
    registry.declare(name, |data| ProtocolType {
        data,
        reader,
        writer,
        decoder,
        encoder,
    })
}

/// Read a leading var-int type ID, then that type's payload
pub fn read_typed<T: Payload>(
    registry: &ProtocolRegistry<T>,
    cursor: &mut WireCursor,
) -> Result<(Arc<ProtocolType<T>>, T)> {
    let kind = registry.read_id(cursor)?.clone();
    let value = kind.read(cursor)?;
    Ok((kind, value))
}

/// Write `kind`'s ID for the cursor's version, then the payload
pub fn write_typed<T: Payload>(
    registry: &ProtocolRegistry<T>,
    cursor: &mut WireCursor,
    kind: &ProtocolType<T>,
    value: &T,
) -> Result<()> {
    registry.write_id(cursor, kind)?;
    kind.write(cursor, value)
}
