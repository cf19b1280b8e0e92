//! Command argument parsers
//!
//! The `argument_type` registry ships without ID data, so wire IDs are the
//! declaration order below. Numeric parsers carry a flag byte whose bits
//! 0x01 and 0x02 say whether a minimum and a maximum follow.

use packetmap_core::{ClientVersion, Identifier, ProtocolError, Result};
use packetmap_protocol::WireCursor;
use packetmap_registry::{
    define_partial, read_typed, write_typed, Payload, ProtocolRegistry, ProtocolType, Reader,
    VersionDiff, Writer,
};
use std::sync::Arc;

const HAS_MIN: i8 = 0x01;
const HAS_MAX: i8 = 0x02;

#[derive(Debug, Clone, PartialEq)]
pub enum ParserProperties {
    None,
    Float { flags: i8, min: f32, max: f32 },
    Double { flags: i8, min: f64, max: f64 },
    Integer { flags: i8, min: i32, max: i32 },
    Long { flags: i8, min: i64, max: i64 },
    /// 0 single word, 1 quotable phrase, 2 greedy phrase
    StringKind(i32),
    EntityFlags(i8),
    ScoreHolderFlags(i8),
    /// Sent from 1.19.4 on
    Time { min: i32 },
    Resource(Identifier),
}

impl Payload for ParserProperties {
    fn empty() -> Self {
        ParserProperties::None
    }

    fn is_empty(&self) -> bool {
        matches!(self, ParserProperties::None)
    }
}

pub type Parser = ProtocolType<ParserProperties>;

fn mismatch(expected: &str, found: &ParserProperties) -> ProtocolError {
    ProtocolError::InvalidData(format!("Expected {} parser properties, got {:?}", expected, found))
}

/// Generates the reader/writer pair for a flag-bounded numeric parser
macro_rules! bounded_parser {
    ($read:ident, $write:ident, $variant:ident, $ty:ty, $read_value:ident, $write_value:ident) => {
        fn $read(cursor: &mut WireCursor) -> Result<ParserProperties> {
            let flags = cursor.read_i8()?;
            let min = if flags & HAS_MIN != 0 {
                cursor.$read_value()?
            } else {
                <$ty>::MIN
            };
            let max = if flags & HAS_MAX != 0 {
                cursor.$read_value()?
            } else {
                <$ty>::MAX
            };
            Ok(ParserProperties::$variant { flags, min, max })
        }

        fn $write(cursor: &mut WireCursor, properties: &ParserProperties) -> Result<()> {
            match *properties {
                ParserProperties::$variant { flags, min, max } => {
                    cursor.write_i8(flags);
                    if flags & HAS_MIN != 0 {
                        cursor.$write_value(min);
                    }
                    if flags & HAS_MAX != 0 {
                        cursor.$write_value(max);
                    }
                    Ok(())
                }
                ref other => Err(mismatch(stringify!($variant), other)),
            }
        }
    };
}

// MIN for floats is the most negative finite value, matching -MAX
bounded_parser!(read_float, write_float, Float, f32, read_f32, write_f32);
bounded_parser!(read_double, write_double, Double, f64, read_f64, write_f64);
bounded_parser!(read_integer, write_integer, Integer, i32, read_i32, write_i32);
bounded_parser!(read_long, write_long, Long, i64, read_i64, write_i64);

fn read_string_kind(cursor: &mut WireCursor) -> Result<ParserProperties> {
    Ok(ParserProperties::StringKind(cursor.read_var_int()?))
}

fn write_string_kind(cursor: &mut WireCursor, properties: &ParserProperties) -> Result<()> {
    match properties {
        ParserProperties::StringKind(kind) => {
            cursor.write_var_int(*kind);
            Ok(())
        }
        other => Err(mismatch("string", other)),
    }
}

fn read_entity(cursor: &mut WireCursor) -> Result<ParserProperties> {
    Ok(ParserProperties::EntityFlags(cursor.read_i8()?))
}

fn write_entity(cursor: &mut WireCursor, properties: &ParserProperties) -> Result<()> {
    match properties {
        ParserProperties::EntityFlags(flags) => {
            cursor.write_i8(*flags);
            Ok(())
        }
        other => Err(mismatch("entity", other)),
    }
}

fn read_score_holder(cursor: &mut WireCursor) -> Result<ParserProperties> {
    Ok(ParserProperties::ScoreHolderFlags(cursor.read_i8()?))
}

fn write_score_holder(cursor: &mut WireCursor, properties: &ParserProperties) -> Result<()> {
    match properties {
        ParserProperties::ScoreHolderFlags(flags) => {
            cursor.write_i8(*flags);
            Ok(())
        }
        other => Err(mismatch("score holder", other)),
    }
}

fn has_time_minimum(version: ClientVersion) -> bool {
    version.is_newer_than_or_equals(ClientVersion::V1_19_4)
}

fn read_time(cursor: &mut WireCursor) -> Result<ParserProperties> {
    let min = if has_time_minimum(cursor.version()) {
        cursor.read_i32()?
    } else {
        0
    };
    Ok(ParserProperties::Time { min })
}

fn write_time(cursor: &mut WireCursor, properties: &ParserProperties) -> Result<()> {
    match *properties {
        ParserProperties::Time { min } => {
            if has_time_minimum(cursor.version()) {
                cursor.write_i32(min);
            }
            Ok(())
        }
        ref other => Err(mismatch("time", other)),
    }
}

fn read_resource(cursor: &mut WireCursor) -> Result<ParserProperties> {
    Ok(ParserProperties::Resource(cursor.read_identifier()?))
}

fn write_resource(cursor: &mut WireCursor, properties: &ParserProperties) -> Result<()> {
    match properties {
        ParserProperties::Resource(registry) => {
            cursor.write_identifier(registry);
            Ok(())
        }
        other => Err(mismatch("resource", other)),
    }
}

type ParserCodec = Option<(Reader<ParserProperties>, Writer<ParserProperties>)>;

const fn wire(reader: Reader<ParserProperties>, writer: Writer<ParserProperties>) -> ParserCodec {
    Some((reader, writer))
}

/// Parsers in wire ID order
const PARSERS: &[(&str, ParserCodec)] = &[
    ("brigadier:bool", None),
    ("brigadier:float", wire(read_float, write_float)),
    ("brigadier:double", wire(read_double, write_double)),
    ("brigadier:integer", wire(read_integer, write_integer)),
    ("brigadier:long", wire(read_long, write_long)),
    ("brigadier:string", wire(read_string_kind, write_string_kind)),
    ("entity", wire(read_entity, write_entity)),
    ("game_profile", None),
    ("block_pos", None),
    ("column_pos", None),
    ("vec3", None),
    ("vec2", None),
    ("block_state", None),
    ("block_predicate", None),
    ("item_stack", None),
    ("item_predicate", None),
    ("color", None),
    ("component", None),
    ("style", None),
    ("message", None),
    ("nbt_compound_tag", None),
    ("nbt_tag", None),
    ("nbt_path", None),
    ("objective", None),
    ("objective_criteria", None),
    ("operation", None),
    ("particle", None),
    ("angle", None),
    ("rotation", None),
    ("scoreboard_slot", None),
    ("score_holder", wire(read_score_holder, write_score_holder)),
    ("swizzle", None),
    ("team", None),
    ("item_slot", None),
    ("item_slots", None),
    ("resource_location", None),
    ("mob_effect", None),
    ("function", None),
    ("entity_anchor", None),
    ("int_range", None),
    ("float_range", None),
    ("item_enchantment", None),
    ("entity_summon", None),
    ("dimension", None),
    ("gamemode", None),
    ("time", wire(read_time, write_time)),
    ("resource_or_tag", wire(read_resource, write_resource)),
    ("resource_or_tag_key", wire(read_resource, write_resource)),
    ("resource", wire(read_resource, write_resource)),
    ("resource_key", wire(read_resource, write_resource)),
    ("template_mirror", None),
    ("template_rotation", None),
    ("heightmap", None),
    ("loot_table", None),
    ("loot_predicate", None),
    ("loot_modifier", None),
    ("uuid", None),
];

/// The `argument_type` registry
pub struct Parsers {
    registry: ProtocolRegistry<ParserProperties>,
}

impl Parsers {
    pub const REGISTRY: &'static str = "argument_type";

    pub fn declare(diffs: Vec<VersionDiff>) -> Result<Self> {
        let mut registry = ProtocolRegistry::with_mappings(Self::REGISTRY, diffs);
        for &(name, codec) in PARSERS {
            let (reader, writer) = codec.unzip();
            define_partial(&mut registry, name, reader, writer, None, None)?;
        }
        Ok(Self { registry })
    }

    pub fn registry(&self) -> &ProtocolRegistry<ParserProperties> {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ProtocolRegistry<ParserProperties> {
        &mut self.registry
    }

    pub fn get(&self, name: &str) -> Result<&Arc<Parser>> {
        self.registry.get_by_name(&Identifier::parse(name))
    }

    /// Read a parser ID, then its properties
    pub fn read(&self, cursor: &mut WireCursor) -> Result<(Arc<Parser>, ParserProperties)> {
        read_typed(&self.registry, cursor)
    }

    pub fn write(&self, cursor: &mut WireCursor, parser: &Parser, properties: &ParserProperties) -> Result<()> {
        write_typed(&self.registry, cursor, parser, properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packetmap_registry::MappedEntity;

    fn parsers() -> Parsers {
        let mut parsers = Parsers::declare(Vec::new()).unwrap();
        parsers.registry_mut().load_mappings().unwrap();
        parsers
    }

    #[test]
    fn test_ordinal_ids() {
        let parsers = parsers();
        let registry = parsers.registry();
        assert!(!registry.is_explicit_at(ClientVersion::V1_19));
        assert_eq!(registry.len(), PARSERS.len());

        let bool_parser = parsers.get("brigadier:bool").unwrap();
        assert_eq!(bool_parser.name().namespace(), "brigadier");
        assert_eq!(registry.id_of(bool_parser, ClientVersion::V1_19), Some(0));
        assert_eq!(registry.id_of(parsers.get("entity").unwrap(), ClientVersion::V1_19), Some(6));
        assert_eq!(registry.id_of(parsers.get("time").unwrap(), ClientVersion::V1_20_5), Some(45));
        assert_eq!(registry.id_of(parsers.get("uuid").unwrap(), ClientVersion::V1_21), Some(56));
    }

    #[test]
    fn test_bounded_defaults() {
        let parsers = parsers();
        let mut cursor = WireCursor::from_slice(&[0x03, 0x00], ClientVersion::V1_19);
        let (parser, properties) = parsers.read(&mut cursor).unwrap();
        assert_eq!(parser.name().key(), "integer");
        assert_eq!(
            properties,
            ParserProperties::Integer {
                flags: 0,
                min: i32::MIN,
                max: i32::MAX
            }
        );
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_bounded_flags() {
        let parsers = parsers();
        let float = parsers.get("brigadier:float").unwrap();
        let properties = ParserProperties::Float {
            flags: HAS_MIN,
            min: 0.5,
            max: f32::MAX,
        };
        let mut cursor = WireCursor::new(ClientVersion::V1_20_3);
        parsers.write(&mut cursor, float, &properties).unwrap();
        assert_eq!(cursor.as_bytes(), &[0x01, 0x01, 0x3f, 0x00, 0x00, 0x00]);
        assert_eq!(parsers.read(&mut cursor).unwrap().1, properties);

        let long = parsers.get("brigadier:long").unwrap();
        let properties = ParserProperties::Long {
            flags: HAS_MIN | HAS_MAX,
            min: -5,
            max: 5,
        };
        let mut cursor = WireCursor::new(ClientVersion::V1_20_3);
        parsers.write(&mut cursor, long, &properties).unwrap();
        assert_eq!(cursor.remaining(), 1 + 1 + 16);
        assert_eq!(parsers.read(&mut cursor).unwrap().1, properties);
    }

    #[test]
    fn test_time_minimum_from_1_19_4() {
        let parsers = parsers();
        let time = parsers.get("time").unwrap();
        let properties = ParserProperties::Time { min: 20 };

        let mut cursor = WireCursor::new(ClientVersion::V1_19_3);
        parsers.write(&mut cursor, time, &properties).unwrap();
        assert_eq!(cursor.as_bytes(), &[45]);
        assert_eq!(parsers.read(&mut cursor).unwrap().1, ParserProperties::Time { min: 0 });

        let mut cursor = WireCursor::new(ClientVersion::V1_19_4);
        parsers.write(&mut cursor, time, &properties).unwrap();
        assert_eq!(parsers.read(&mut cursor).unwrap().1, properties);
    }

    #[test]
    fn test_resource_and_markers() {
        let parsers = parsers();
        let resource = parsers.get("resource").unwrap();
        let properties = ParserProperties::Resource(Identifier::minecraft("worldgen/biome"));
        let mut cursor = WireCursor::new(ClientVersion::V1_20_5);
        parsers.write(&mut cursor, resource, &properties).unwrap();
        assert_eq!(parsers.read(&mut cursor).unwrap().1, properties);

        let vec3 = parsers.get("vec3").unwrap();
        assert!(vec3.is_marker());
        let mut cursor = WireCursor::new(ClientVersion::V1_20_5);
        parsers.write(&mut cursor, vec3, &ParserProperties::None).unwrap();
        assert_eq!(cursor.as_bytes(), &[10]);
        assert!(parsers
            .write(&mut cursor, vec3, &ParserProperties::EntityFlags(1))
            .is_err());
    }
}
