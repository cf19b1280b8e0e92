//! Entity data (metadata) serializers
//!
//! Each serializer is a registry entry with a reader and a writer for one
//! [`EntityDataValue`] variant. A metadata list is a sequence of
//! `(index, serializer, value)` items:
//!
//! * before 1.9: a header byte `serializer << 5 | index`, the value, and a
//!   `0x7f` terminator
//! * from 1.9: an index byte, a var-int serializer ID, the value, and a
//!   `0xff` terminator

use crate::catalog::catalog;
use crate::item::{read_item_stack, write_item_stack, ItemStack};
use crate::particle::Particle;
use packetmap_core::{
    BlockPosition, ClientVersion, Direction, Identifier, ProtocolError, Result, Vector3f,
};
use packetmap_protocol::{Tag, TextComponent, WireCursor};
use packetmap_registry::{EntryData, MappedEntity, VersionDiff, VersionedRegistry};
use std::fmt;
use std::sync::Arc;

const LEGACY_END: u8 = 0x7f;
const END: u8 = 0xff;
const LEGACY_MAX_INDEX: u8 = 0x1f;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VillagerData {
    pub kind: i32,
    pub profession: i32,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalPosition {
    pub dimension: Identifier,
    pub position: BlockPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityDataValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    String(String),
    Component(TextComponent),
    OptionalComponent(Option<TextComponent>),
    ItemStack(Option<ItemStack>),
    Boolean(bool),
    Rotation(Vector3f),
    BlockPosition(BlockPosition),
    OptionalBlockPosition(Option<BlockPosition>),
    BlockFace(Direction),
    OptionalUuid(Option<u128>),
    BlockState(i32),
    /// `None` is air
    OptionalBlockState(Option<i32>),
    Nbt(Option<Tag>),
    Particle(Particle),
    Particles(Vec<Particle>),
    VillagerData(VillagerData),
    OptionalInt(Option<i32>),
    Pose(i32),
    CatVariant(i32),
    WolfVariant(i32),
    FrogVariant(i32),
    OptionalGlobalPosition(Option<GlobalPosition>),
    PaintingVariant(i32),
    SnifferState(i32),
    ArmadilloState(i32),
    Vector3f(Vector3f),
    Quaternion([f32; 4]),
}

impl EntityDataValue {
    /// Name of the serializer that carries this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Byte(_) => "byte",
            Self::Short(_) => "short",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Component(_) => "component",
            Self::OptionalComponent(_) => "optional_component",
            Self::ItemStack(_) => "itemstack",
            Self::Boolean(_) => "boolean",
            Self::Rotation(_) => "rotation",
            Self::BlockPosition(_) => "block_position",
            Self::OptionalBlockPosition(_) => "optional_block_position",
            Self::BlockFace(_) => "block_face",
            Self::OptionalUuid(_) => "optional_uuid",
            Self::BlockState(_) => "block_state",
            Self::OptionalBlockState(_) => "optional_block_state",
            Self::Nbt(_) => "nbt",
            Self::Particle(_) => "particle",
            Self::Particles(_) => "particles",
            Self::VillagerData(_) => "villager_data",
            Self::OptionalInt(_) => "optional_int",
            Self::Pose(_) => "entity_pose",
            Self::CatVariant(_) => "cat_variant_type",
            Self::WolfVariant(_) => "wolf_variant_type",
            Self::FrogVariant(_) => "frog_variant_type",
            Self::OptionalGlobalPosition(_) => "optional_global_position",
            Self::PaintingVariant(_) => "painting_variant_type",
            Self::SnifferState(_) => "sniffer_state",
            Self::ArmadilloState(_) => "armadillo_state",
            Self::Vector3f(_) => "vector3f",
            Self::Quaternion(_) => "quaternion",
        }
    }
}

type DataReader = fn(&mut WireCursor) -> Result<EntityDataValue>;
type DataWriter = fn(&mut WireCursor, &EntityDataValue) -> Result<()>;

pub struct EntityDataType {
    data: EntryData,
    reader: DataReader,
    writer: DataWriter,
}

impl EntityDataType {
    pub fn read(&self, cursor: &mut WireCursor) -> Result<EntityDataValue> {
        (self.reader)(cursor)
    }

    pub fn write(&self, cursor: &mut WireCursor, value: &EntityDataValue) -> Result<()> {
        (self.writer)(cursor, value)
    }
}

impl MappedEntity for EntityDataType {
    fn data(&self) -> &EntryData {
        &self.data
    }
}

impl fmt::Debug for EntityDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityDataType({})", self.data.identifier())
    }
}

fn mismatch(expected: &str, found: &EntityDataValue) -> ProtocolError {
    ProtocolError::InvalidData(format!(
        "Expected {} entity data, got {}",
        expected,
        found.type_name()
    ))
}

fn is_legacy(version: ClientVersion) -> bool {
    version.is_older_than(ClientVersion::V1_9)
}

fn read_int_like(cursor: &mut WireCursor) -> Result<i32> {
    if is_legacy(cursor.version()) {
        cursor.read_i32()
    } else {
        cursor.read_var_int()
    }
}

fn write_int_like(cursor: &mut WireCursor, value: i32) {
    if is_legacy(cursor.version()) {
        cursor.write_i32(value);
    } else {
        cursor.write_var_int(value);
    }
}

fn read_vector(cursor: &mut WireCursor) -> Result<Vector3f> {
    Ok(Vector3f::new(cursor.read_f32()?, cursor.read_f32()?, cursor.read_f32()?))
}

fn write_vector(cursor: &mut WireCursor, value: &Vector3f) {
    cursor.write_f32(value.x);
    cursor.write_f32(value.y);
    cursor.write_f32(value.z);
}

fn read_position(cursor: &mut WireCursor) -> Result<BlockPosition> {
    if is_legacy(cursor.version()) {
        Ok(BlockPosition::new(cursor.read_i32()?, cursor.read_i32()?, cursor.read_i32()?))
    } else {
        cursor.read_block_position()
    }
}

fn write_position(cursor: &mut WireCursor, pos: &BlockPosition) -> Result<()> {
    if is_legacy(cursor.version()) {
        cursor.write_i32(pos.x);
        cursor.write_i32(pos.y);
        cursor.write_i32(pos.z);
        Ok(())
    } else {
        cursor.write_block_position(*pos)
    }
}

/// Generates the reader/writer pair for one serializer
macro_rules! entity_data_codec {
    ($read:ident, $write:ident, $variant:ident,
     |$rc:ident| $reader:expr,
     |$wc:ident, $value:ident| $writer:expr) => {
        fn $read($rc: &mut WireCursor) -> Result<EntityDataValue> {
            Ok(EntityDataValue::$variant($reader))
        }

        fn $write($wc: &mut WireCursor, value: &EntityDataValue) -> Result<()> {
            match value {
                EntityDataValue::$variant($value) => $writer,
                other => Err(mismatch(stringify!($variant), other)),
            }
        }
    };
}

entity_data_codec!(read_byte, write_byte, Byte, |c| c.read_i8()?, |c, v| {
    c.write_i8(*v);
    Ok(())
});

entity_data_codec!(read_short, write_short, Short, |c| c.read_i16()?, |c, v| {
    c.write_i16(*v);
    Ok(())
});

entity_data_codec!(read_int, write_int, Int, |c| read_int_like(c)?, |c, v| {
    write_int_like(c, *v);
    Ok(())
});

entity_data_codec!(read_long, write_long, Long, |c| c.read_var_long()?, |c, v| {
    c.write_var_long(*v);
    Ok(())
});

entity_data_codec!(read_float, write_float, Float, |c| c.read_f32()?, |c, v| {
    c.write_f32(*v);
    Ok(())
});

entity_data_codec!(read_string, write_string, String, |c| c.read_string()?, |c, v| {
    c.write_string(v);
    Ok(())
});

entity_data_codec!(
    read_component,
    write_component,
    Component,
    |c| c.read_component()?,
    |c, v| c.write_component(v)
);

entity_data_codec!(
    read_optional_component,
    write_optional_component,
    OptionalComponent,
    |c| c.read_optional(|c| c.read_component())?,
    |c, v| c.write_optional(v.as_ref(), |c, text| c.write_component(text))
);

entity_data_codec!(
    read_item,
    write_item,
    ItemStack,
    |c| read_item_stack(c)?,
    |c, v| write_item_stack(c, v.as_ref())
);

entity_data_codec!(read_boolean, write_boolean, Boolean, |c| c.read_bool()?, |c, v| {
    c.write_bool(*v);
    Ok(())
});

entity_data_codec!(read_rotation, write_rotation, Rotation, |c| read_vector(c)?, |c, v| {
    write_vector(c, v);
    Ok(())
});

entity_data_codec!(
    read_block_position,
    write_block_position,
    BlockPosition,
    |c| read_position(c)?,
    |c, v| write_position(c, v)
);

entity_data_codec!(
    read_optional_block_position,
    write_optional_block_position,
    OptionalBlockPosition,
    |c| c.read_optional(|c| c.read_block_position())?,
    |c, v| c.write_optional(v.as_ref(), |c, pos| c.write_block_position(*pos))
);

entity_data_codec!(
    read_block_face,
    write_block_face,
    BlockFace,
    |c| {
        let index = c.read_var_int()?;
        Direction::from_index(index)
            .ok_or_else(|| ProtocolError::InvalidData(format!("Invalid block face {}", index)))?
    },
    |c, v| {
        c.write_var_int(v.index());
        Ok(())
    }
);

entity_data_codec!(
    read_optional_uuid,
    write_optional_uuid,
    OptionalUuid,
    |c| c.read_optional(|c| c.read_uuid())?,
    |c, v| c.write_optional(v.as_ref(), |c, uuid| {
        c.write_uuid(*uuid);
        Ok(())
    })
);

entity_data_codec!(read_block_state, write_block_state, BlockState, |c| c.read_var_int()?, |c, v| {
    c.write_var_int(*v);
    Ok(())
});

entity_data_codec!(
    read_optional_block_state,
    write_optional_block_state,
    OptionalBlockState,
    |c| Some(c.read_var_int()?).filter(|&state| state != 0),
    |c, v| {
        c.write_var_int(v.unwrap_or(0));
        Ok(())
    }
);

entity_data_codec!(read_nbt, write_nbt, Nbt, |c| c.read_nbt()?, |c, v| c.write_nbt(v.as_ref()));

entity_data_codec!(read_particle, write_particle, Particle, |c| Particle::read(c)?, |c, v| v.write(c));

entity_data_codec!(
    read_particles,
    write_particles,
    Particles,
    |c| c.read_list(Particle::read)?,
    |c, v| c.write_list(v, |c, particle| particle.write(c))
);

entity_data_codec!(
    read_villager_data,
    write_villager_data,
    VillagerData,
    |c| VillagerData {
        kind: c.read_var_int()?,
        profession: c.read_var_int()?,
        level: c.read_var_int()?,
    },
    |c, v| {
        c.write_var_int(v.kind);
        c.write_var_int(v.profession);
        c.write_var_int(v.level);
        Ok(())
    }
);

entity_data_codec!(
    read_optional_int,
    write_optional_int,
    OptionalInt,
    |c| match c.read_var_int()? {
        0 => None,
        n => Some(n - 1),
    },
    |c, v| {
        c.write_var_int(v.map_or(0, |n| n + 1));
        Ok(())
    }
);

entity_data_codec!(read_pose, write_pose, Pose, |c| c.read_var_int()?, |c, v| {
    c.write_var_int(*v);
    Ok(())
});

entity_data_codec!(read_cat_variant, write_cat_variant, CatVariant, |c| c.read_var_int()?, |c, v| {
    c.write_var_int(*v);
    Ok(())
});

entity_data_codec!(read_wolf_variant, write_wolf_variant, WolfVariant, |c| c.read_var_int()?, |c, v| {
    c.write_var_int(*v);
    Ok(())
});

entity_data_codec!(read_frog_variant, write_frog_variant, FrogVariant, |c| c.read_var_int()?, |c, v| {
    c.write_var_int(*v);
    Ok(())
});

entity_data_codec!(
    read_optional_global_position,
    write_optional_global_position,
    OptionalGlobalPosition,
    |c| c.read_optional(|c| {
        Ok(GlobalPosition {
            dimension: c.read_identifier()?,
            position: c.read_block_position()?,
        })
    })?,
    |c, v| c.write_optional(v.as_ref(), |c, global| {
        c.write_identifier(&global.dimension);
        c.write_block_position(global.position)
    })
);

entity_data_codec!(
    read_painting_variant,
    write_painting_variant,
    PaintingVariant,
    |c| c.read_var_int()?,
    |c, v| {
        c.write_var_int(*v);
        Ok(())
    }
);

entity_data_codec!(read_sniffer_state, write_sniffer_state, SnifferState, |c| c.read_var_int()?, |c, v| {
    c.write_var_int(*v);
    Ok(())
});

entity_data_codec!(
    read_armadillo_state,
    write_armadillo_state,
    ArmadilloState,
    |c| c.read_var_int()?,
    |c, v| {
        c.write_var_int(*v);
        Ok(())
    }
);

entity_data_codec!(read_vector3f, write_vector3f, Vector3f, |c| read_vector(c)?, |c, v| {
    write_vector(c, v);
    Ok(())
});

entity_data_codec!(
    read_quaternion,
    write_quaternion,
    Quaternion,
    |c| [c.read_f32()?, c.read_f32()?, c.read_f32()?, c.read_f32()?],
    |c, v| {
        for component in v {
            c.write_f32(*component);
        }
        Ok(())
    }
);

const SERIALIZERS: &[(&str, DataReader, DataWriter)] = &[
    ("byte", read_byte, write_byte),
    ("short", read_short, write_short),
    ("int", read_int, write_int),
    ("long", read_long, write_long),
    ("float", read_float, write_float),
    ("string", read_string, write_string),
    ("component", read_component, write_component),
    ("optional_component", read_optional_component, write_optional_component),
    ("itemstack", read_item, write_item),
    ("boolean", read_boolean, write_boolean),
    ("rotation", read_rotation, write_rotation),
    ("block_position", read_block_position, write_block_position),
    ("optional_block_position", read_optional_block_position, write_optional_block_position),
    ("block_face", read_block_face, write_block_face),
    ("optional_uuid", read_optional_uuid, write_optional_uuid),
    ("block_state", read_block_state, write_block_state),
    ("optional_block_state", read_optional_block_state, write_optional_block_state),
    ("nbt", read_nbt, write_nbt),
    ("particle", read_particle, write_particle),
    ("particles", read_particles, write_particles),
    ("villager_data", read_villager_data, write_villager_data),
    ("optional_int", read_optional_int, write_optional_int),
    ("entity_pose", read_pose, write_pose),
    ("cat_variant_type", read_cat_variant, write_cat_variant),
    ("wolf_variant_type", read_wolf_variant, write_wolf_variant),
    ("frog_variant_type", read_frog_variant, write_frog_variant),
    ("optional_global_position", read_optional_global_position, write_optional_global_position),
    ("painting_variant_type", read_painting_variant, write_painting_variant),
    ("sniffer_state", read_sniffer_state, write_sniffer_state),
    ("armadillo_state", read_armadillo_state, write_armadillo_state),
    ("vector3f", read_vector3f, write_vector3f),
    ("quaternion", read_quaternion, write_quaternion),
];

/// One item of an entity's metadata list
#[derive(Debug, Clone, PartialEq)]
pub struct EntityData {
    pub index: u8,
    pub value: EntityDataValue,
}

impl EntityData {
    pub fn new(index: u8, value: EntityDataValue) -> Self {
        Self { index, value }
    }
}

/// The `entity_data_serializer` registry
pub struct EntityDataTypes {
    registry: VersionedRegistry<EntityDataType>,
}

impl EntityDataTypes {
    pub const REGISTRY: &'static str = "entity_data_serializer";

    pub fn declare(diffs: Vec<VersionDiff>) -> Result<Self> {
        let mut registry = VersionedRegistry::with_mappings(Self::REGISTRY, diffs);
        for &(name, reader, writer) in SERIALIZERS {
            registry.declare(name, |data| EntityDataType {
                data,
                reader,
                writer,
            })?;
        }
        Ok(Self { registry })
    }

    pub fn registry(&self) -> &VersionedRegistry<EntityDataType> {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut VersionedRegistry<EntityDataType> {
        &mut self.registry
    }

    pub fn get(&self, name: &str) -> Result<&Arc<EntityDataType>> {
        self.registry.get_by_name(&Identifier::parse(name))
    }

    /// Serializer for `value`
    pub fn kind_of(&self, value: &EntityDataValue) -> Result<&Arc<EntityDataType>> {
        self.get(value.type_name())
    }

    pub fn read_metadata(&self, cursor: &mut WireCursor) -> Result<Vec<EntityData>> {
        let mut items = Vec::new();
        if is_legacy(cursor.version()) {
            loop {
                let header = cursor.read_u8()?;
                if header == LEGACY_END {
                    break;
                }
                let kind = self
                    .registry
                    .get_by_id(cursor.version(), i32::from(header >> 5))?;
                let value = kind.read(cursor)?;
                items.push(EntityData::new(header & LEGACY_MAX_INDEX, value));
            }
        } else {
            loop {
                let index = cursor.read_u8()?;
                if index == END {
                    break;
                }
                let value = self.registry.read_id(cursor)?.read(cursor)?;
                items.push(EntityData::new(index, value));
            }
        }
        Ok(items)
    }

    pub fn write_metadata(&self, cursor: &mut WireCursor, items: &[EntityData]) -> Result<()> {
        let legacy = is_legacy(cursor.version());
        for item in items {
            let kind = self.kind_of(&item.value)?;
            if legacy {
                if item.index > LEGACY_MAX_INDEX {
                    return Err(ProtocolError::InvalidData(format!(
                        "Entity data index {} does not fit a legacy header",
                        item.index
                    )));
                }
                let id = self.registry.id_of(kind, cursor.version()).ok_or_else(|| {
                    ProtocolError::UnsupportedPayload(format!(
                        "{} entity data does not exist in {}",
                        kind.name(),
                        cursor.version()
                    ))
                })?;
                cursor.write_u8(((id as u8) << 5) | item.index);
            } else {
                if item.index == END {
                    return Err(ProtocolError::InvalidData("Entity data index 255 is reserved".into()));
                }
                cursor.write_u8(item.index);
                self.registry.write_id(cursor, kind)?;
            }
            kind.write(cursor, &item.value)?;
        }
        cursor.write_u8(if legacy { LEGACY_END } else { END });
        Ok(())
    }
}

/// Read a metadata list through the global catalog
pub fn read_entity_metadata(cursor: &mut WireCursor) -> Result<Vec<EntityData>> {
    catalog()?.entity_data_types().read_metadata(cursor)
}

pub fn write_entity_metadata(cursor: &mut WireCursor, items: &[EntityData]) -> Result<()> {
    catalog()?.entity_data_types().write_metadata(cursor, items)
}
