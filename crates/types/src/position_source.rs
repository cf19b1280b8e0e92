//! Position sources (vibration targets)
//!
//! A typed source is sent as its type followed by the type's payload. The
//! type is an identifier before 1.20.5 and a var-int ID from 1.20.5 on.

use packetmap_core::{BlockPosition, ClientVersion, Identifier, ProtocolError, Result};
use packetmap_protocol::{Compound, WireCursor};
use packetmap_registry::{EntryData, MappedEntity, VersionDiff, VersionedRegistry};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionSource {
    Block(BlockPosition),
    Entity {
        entity_id: i32,
        /// Sent from 1.19 on
        y_offset: f32,
    },
}

type SourceReader = fn(&mut WireCursor) -> Result<PositionSource>;
type SourceWriter = fn(&mut WireCursor, &PositionSource) -> Result<()>;
type SourceDecoder = fn(&Compound, ClientVersion) -> Result<PositionSource>;
type SourceEncoder = fn(&PositionSource, ClientVersion, &mut Compound) -> Result<()>;

pub struct PositionSourceType {
    data: EntryData,
    reader: SourceReader,
    writer: SourceWriter,
    decoder: SourceDecoder,
    encoder: SourceEncoder,
}

impl PositionSourceType {
    pub fn read(&self, cursor: &mut WireCursor) -> Result<PositionSource> {
        (self.reader)(cursor)
    }

    pub fn write(&self, cursor: &mut WireCursor, source: &PositionSource) -> Result<()> {
        (self.writer)(cursor, source)
    }

    pub fn decode(&self, tag: &Compound, version: ClientVersion) -> Result<PositionSource> {
        (self.decoder)(tag, version)
    }

    pub fn encode(&self, source: &PositionSource, version: ClientVersion, tag: &mut Compound) -> Result<()> {
        (self.encoder)(source, version, tag)
    }
}

impl MappedEntity for PositionSourceType {
    fn data(&self) -> &EntryData {
        &self.data
    }
}

impl fmt::Debug for PositionSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PositionSourceType({})", self.data.identifier())
    }
}

fn read_block(cursor: &mut WireCursor) -> Result<PositionSource> {
    Ok(PositionSource::Block(cursor.read_block_position()?))
}

fn write_block(cursor: &mut WireCursor, source: &PositionSource) -> Result<()> {
    match source {
        PositionSource::Block(pos) => cursor.write_block_position(*pos),
        other => Err(mismatch("block", other)),
    }
}

fn decode_block(tag: &Compound, _: ClientVersion) -> Result<PositionSource> {
    match tag.require_int_array("pos")? {
        &[x, y, z] => Ok(PositionSource::Block([x, y, z].into())),
        other => Err(ProtocolError::InvalidData(format!(
            "Block position source needs 3 coordinates, got {}",
            other.len()
        ))),
    }
}

fn encode_block(source: &PositionSource, _: ClientVersion, tag: &mut Compound) -> Result<()> {
    match source {
        PositionSource::Block(pos) => {
            tag.put_int_array("pos", pos.to_array().to_vec());
            Ok(())
        }
        other => Err(mismatch("block", other)),
    }
}

fn read_entity(cursor: &mut WireCursor) -> Result<PositionSource> {
    let entity_id = cursor.read_var_int()?;
    let y_offset = if cursor.version().is_newer_than_or_equals(ClientVersion::V1_19) {
        cursor.read_f32()?
    } else {
        0.0
    };
    Ok(PositionSource::Entity { entity_id, y_offset })
}

fn write_entity(cursor: &mut WireCursor, source: &PositionSource) -> Result<()> {
    match *source {
        PositionSource::Entity { entity_id, y_offset } => {
            cursor.write_var_int(entity_id);
            if cursor.version().is_newer_than_or_equals(ClientVersion::V1_19) {
                cursor.write_f32(y_offset);
            }
            Ok(())
        }
        ref other => Err(mismatch("entity", other)),
    }
}

fn decode_entity(tag: &Compound, _: ClientVersion) -> Result<PositionSource> {
    Ok(PositionSource::Entity {
        entity_id: tag.require_int("source_entity")?,
        y_offset: tag.require_float("y_offset")?,
    })
}

fn encode_entity(source: &PositionSource, _: ClientVersion, tag: &mut Compound) -> Result<()> {
    match *source {
        PositionSource::Entity { entity_id, y_offset } => {
            tag.put_int("source_entity", entity_id);
            tag.put_float("y_offset", y_offset);
            Ok(())
        }
        ref other => Err(mismatch("entity", other)),
    }
}

fn mismatch(expected: &str, found: &PositionSource) -> ProtocolError {
    ProtocolError::InvalidData(format!("Expected a {} position source, got {:?}", expected, found))
}

/// The `position_source_type` registry
pub struct PositionSourceTypes {
    registry: VersionedRegistry<PositionSourceType>,
    pub block: Arc<PositionSourceType>,
    pub entity: Arc<PositionSourceType>,
}

impl PositionSourceTypes {
    pub const REGISTRY: &'static str = "position_source_type";

    pub fn declare(diffs: Vec<VersionDiff>) -> Result<Self> {
        let mut registry = VersionedRegistry::with_mappings(Self::REGISTRY, diffs);
        let block = registry.declare("block", |data| PositionSourceType {
            data,
            reader: read_block,
            writer: write_block,
            decoder: decode_block,
            encoder: encode_block,
        })?;
        let entity = registry.declare("entity", |data| PositionSourceType {
            data,
            reader: read_entity,
            writer: write_entity,
            decoder: decode_entity,
            encoder: encode_entity,
        })?;
        Ok(Self {
            registry,
            block,
            entity,
        })
    }

    pub fn registry(&self) -> &VersionedRegistry<PositionSourceType> {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut VersionedRegistry<PositionSourceType> {
        &mut self.registry
    }

    pub fn kind_of(&self, source: &PositionSource) -> &Arc<PositionSourceType> {
        match source {
            PositionSource::Block(_) => &self.block,
            PositionSource::Entity { .. } => &self.entity,
        }
    }

    /// Read a source type, then its payload
    pub fn read(&self, cursor: &mut WireCursor) -> Result<PositionSource> {
        let kind = if cursor.version().is_older_than(ClientVersion::V1_20_5) {
            let name = cursor.read_identifier()?;
            self.registry.get_by_name(&name)?
        } else {
            self.registry.read_id(cursor)?
        };
        kind.read(cursor)
    }

    pub fn write(&self, cursor: &mut WireCursor, source: &PositionSource) -> Result<()> {
        let kind = self.kind_of(source);
        if cursor.version().is_older_than(ClientVersion::V1_20_5) {
            cursor.write_identifier(kind.name());
        } else {
            self.registry.write_id(cursor, kind)?;
        }
        kind.write(cursor, source)
    }

    /// Tree form: the payload keys plus `type`
    pub fn decode(&self, tag: &Compound, version: ClientVersion) -> Result<PositionSource> {
        let name = tag.require_str("type")?;
        self.registry.get_by_name(&Identifier::parse(name))?.decode(tag, version)
    }

    pub fn encode(&self, source: &PositionSource, version: ClientVersion, tag: &mut Compound) -> Result<()> {
        let kind = self.kind_of(source);
        tag.put_string("type", kind.name().to_string());
        kind.encode(source, version, tag)
    }
}
