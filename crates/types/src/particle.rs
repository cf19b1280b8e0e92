//! Particle types and particle data
//!
//! A particle travels as its var-int type ID followed by the type's data.
//! Most types carry nothing; the rest are listed below with the versions
//! their layout changed in.
//!
//! | Types                                         | Data                                   |
//! |-----------------------------------------------|----------------------------------------|
//! | block, block_marker, falling_dust, dust_pillar, block_crumble | var-int block state    |
//! | dust                                          | RGB (floats, int from 1.21.2), scale   |
//! | dust_color_transition                         | two RGBs and a scale                   |
//! | entity_effect                                 | ARGB int from 1.20.5                   |
//! | item                                          | item stack                             |
//! | vibration                                     | origin before 1.19, source, ticks      |
//! | sculk_charge                                  | float roll                             |
//! | shriek                                        | var-int delay                          |
//! | trail                                         | target, RGB, duration from 1.21.4      |

use crate::catalog::catalog;
use crate::item::{read_item_stack, write_item_stack, ItemStack};
use crate::position_source::PositionSource;
use packetmap_core::{BlockPosition, ClientVersion, Identifier, ProtocolError, Result, Vector3f};
use packetmap_protocol::{Compound, Tag, WireCursor};
use packetmap_registry::{
    define_marker, define_with_tree, read_typed, write_typed, MappedEntity, Payload,
    ProtocolRegistry, ProtocolType, VersionDiff,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum ParticleData {
    Empty,
    BlockState(i32),
    Dust {
        color: Vector3f,
        scale: f32,
    },
    DustColorTransition {
        from: Vector3f,
        to: Vector3f,
        scale: f32,
    },
    /// Packed ARGB
    Color(i32),
    Item(ItemStack),
    Vibration {
        /// Only sent before 1.19
        origin: Option<BlockPosition>,
        source: PositionSource,
        ticks: i32,
    },
    SculkCharge {
        roll: f32,
    },
    Shriek {
        delay: i32,
    },
    Trail {
        target: [f64; 3],
        color: i32,
        /// Sent from 1.21.4 on
        duration: i32,
    },
}

impl Payload for ParticleData {
    fn empty() -> Self {
        ParticleData::Empty
    }

    fn is_empty(&self) -> bool {
        matches!(self, ParticleData::Empty)
    }
}

pub type ParticleType = ProtocolType<ParticleData>;

/// A particle type together with its data
#[derive(Debug, Clone)]
pub struct Particle {
    pub kind: Arc<ParticleType>,
    pub data: ParticleData,
}

impl Particle {
    pub fn new(kind: Arc<ParticleType>, data: ParticleData) -> Self {
        Self { kind, data }
    }

    /// Read through the global catalog
    pub fn read(cursor: &mut WireCursor) -> Result<Self> {
        catalog()?.particle_types().read(cursor)
    }

    pub fn write(&self, cursor: &mut WireCursor) -> Result<()> {
        catalog()?.particle_types().write(cursor, self)
    }
}

impl PartialEq for Particle {
    fn eq(&self, other: &Self) -> bool {
        self.kind.key() == other.kind.key() && self.data == other.data
    }
}

fn mismatch(expected: &str, found: &ParticleData) -> ProtocolError {
    ProtocolError::InvalidData(format!("Expected {} particle data, got {:?}", expected, found))
}

fn packs_rgb(version: ClientVersion) -> bool {
    version.is_newer_than_or_equals(ClientVersion::V1_21_2)
}

fn read_rgb(cursor: &mut WireCursor) -> Result<Vector3f> {
    if packs_rgb(cursor.version()) {
        let rgb = cursor.read_i32()?;
        let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
        Ok(Vector3f::new(channel(16), channel(8), channel(0)))
    } else {
        Ok(Vector3f::new(cursor.read_f32()?, cursor.read_f32()?, cursor.read_f32()?))
    }
}

fn write_rgb(cursor: &mut WireCursor, color: Vector3f) {
    if packs_rgb(cursor.version()) {
        let channel = |value: f32| ((value.clamp(0.0, 1.0) * 255.0).round() as i32) & 0xff;
        cursor.write_i32((channel(color.x) << 16) | (channel(color.y) << 8) | channel(color.z));
    } else {
        cursor.write_f32(color.x);
        cursor.write_f32(color.y);
        cursor.write_f32(color.z);
    }
}

fn put_vec3(tag: &mut Compound, key: &str, value: Vector3f) {
    tag.insert(
        key,
        Tag::List(vec![Tag::Float(value.x), Tag::Float(value.y), Tag::Float(value.z)]),
    );
}

fn require_vec3(tag: &Compound, key: &str) -> Result<Vector3f> {
    let floats: Option<Vec<f32>> = match tag.get(key) {
        Some(Tag::List(items)) => items.iter().map(Tag::as_float).collect(),
        _ => None,
    };
    match floats.as_deref() {
        Some(&[x, y, z]) => Ok(Vector3f::new(x, y, z)),
        _ => Err(ProtocolError::InvalidData(format!("Missing float triple '{}'", key))),
    }
}

// block, block_marker, falling_dust, dust_pillar, block_crumble

fn read_block_state(cursor: &mut WireCursor) -> Result<ParticleData> {
    Ok(ParticleData::BlockState(cursor.read_var_int()?))
}

fn write_block_state(cursor: &mut WireCursor, data: &ParticleData) -> Result<()> {
    match data {
        ParticleData::BlockState(state) => {
            cursor.write_var_int(*state);
            Ok(())
        }
        other => Err(mismatch("block state", other)),
    }
}

fn decode_block_state(tag: &Compound, _: ClientVersion) -> Result<ParticleData> {
    Ok(ParticleData::BlockState(tag.require_int("block_state")?))
}

fn encode_block_state(data: &ParticleData, _: ClientVersion, tag: &mut Compound) -> Result<()> {
    match data {
        ParticleData::BlockState(state) => {
            tag.put_int("block_state", *state);
            Ok(())
        }
        other => Err(mismatch("block state", other)),
    }
}

// dust

fn read_dust(cursor: &mut WireCursor) -> Result<ParticleData> {
    let color = read_rgb(cursor)?;
    let scale = cursor.read_f32()?;
    Ok(ParticleData::Dust { color, scale })
}

fn write_dust(cursor: &mut WireCursor, data: &ParticleData) -> Result<()> {
    match *data {
        ParticleData::Dust { color, scale } => {
            write_rgb(cursor, color);
            cursor.write_f32(scale);
            Ok(())
        }
        ref other => Err(mismatch("dust", other)),
    }
}

fn decode_dust(tag: &Compound, _: ClientVersion) -> Result<ParticleData> {
    Ok(ParticleData::Dust {
        color: require_vec3(tag, "color")?,
        scale: tag.require_float("scale")?,
    })
}

fn encode_dust(data: &ParticleData, _: ClientVersion, tag: &mut Compound) -> Result<()> {
    match *data {
        ParticleData::Dust { color, scale } => {
            put_vec3(tag, "color", color);
            tag.put_float("scale", scale);
            Ok(())
        }
        ref other => Err(mismatch("dust", other)),
    }
}

// dust_color_transition: the scale sits between the colors before 1.20.5

fn read_dust_transition(cursor: &mut WireCursor) -> Result<ParticleData> {
    let from = read_rgb(cursor)?;
    let (to, scale) = if cursor.version().is_older_than(ClientVersion::V1_20_5) {
        let scale = cursor.read_f32()?;
        (read_rgb(cursor)?, scale)
    } else {
        let to = read_rgb(cursor)?;
        (to, cursor.read_f32()?)
    };
    Ok(ParticleData::DustColorTransition { from, to, scale })
}

fn write_dust_transition(cursor: &mut WireCursor, data: &ParticleData) -> Result<()> {
    match *data {
        ParticleData::DustColorTransition { from, to, scale } => {
            write_rgb(cursor, from);
            if cursor.version().is_older_than(ClientVersion::V1_20_5) {
                cursor.write_f32(scale);
                write_rgb(cursor, to);
            } else {
                write_rgb(cursor, to);
                cursor.write_f32(scale);
            }
            Ok(())
        }
        ref other => Err(mismatch("dust color transition", other)),
    }
}

fn decode_dust_transition(tag: &Compound, _: ClientVersion) -> Result<ParticleData> {
    Ok(ParticleData::DustColorTransition {
        from: require_vec3(tag, "from_color")?,
        to: require_vec3(tag, "to_color")?,
        scale: tag.require_float("scale")?,
    })
}

fn encode_dust_transition(data: &ParticleData, _: ClientVersion, tag: &mut Compound) -> Result<()> {
    match *data {
        ParticleData::DustColorTransition { from, to, scale } => {
            put_vec3(tag, "from_color", from);
            put_vec3(tag, "to_color", to);
            tag.put_float("scale", scale);
            Ok(())
        }
        ref other => Err(mismatch("dust color transition", other)),
    }
}

// entity_effect

fn has_effect_color(version: ClientVersion) -> bool {
    version.is_newer_than_or_equals(ClientVersion::V1_20_5)
}

fn read_color(cursor: &mut WireCursor) -> Result<ParticleData> {
    if has_effect_color(cursor.version()) {
        Ok(ParticleData::Color(cursor.read_i32()?))
    } else {
        Ok(ParticleData::Empty)
    }
}

fn write_color(cursor: &mut WireCursor, data: &ParticleData) -> Result<()> {
    match data {
        ParticleData::Color(argb) if has_effect_color(cursor.version()) => {
            cursor.write_i32(*argb);
            Ok(())
        }
        ParticleData::Empty if !has_effect_color(cursor.version()) => Ok(()),
        ParticleData::Color(_) => Err(ProtocolError::UnsupportedPayload(format!(
            "entity_effect carries no color before 1.20.5 (writing {})",
            cursor.version()
        ))),
        other => Err(mismatch("color", other)),
    }
}

fn decode_color(tag: &Compound, version: ClientVersion) -> Result<ParticleData> {
    if has_effect_color(version) {
        Ok(ParticleData::Color(tag.require_int("color")?))
    } else {
        Ok(ParticleData::Empty)
    }
}

fn encode_color(data: &ParticleData, _: ClientVersion, tag: &mut Compound) -> Result<()> {
    match data {
        ParticleData::Color(argb) => tag.put_int("color", *argb),
        ParticleData::Empty => {}
        other => return Err(mismatch("color", other)),
    }
    Ok(())
}

// item

fn read_item(cursor: &mut WireCursor) -> Result<ParticleData> {
    read_item_stack(cursor)?
        .map(ParticleData::Item)
        .ok_or_else(|| ProtocolError::InvalidData("Item particle with an empty stack".into()))
}

fn write_item(cursor: &mut WireCursor, data: &ParticleData) -> Result<()> {
    match data {
        ParticleData::Item(stack) => write_item_stack(cursor, Some(stack)),
        other => Err(mismatch("item", other)),
    }
}

fn decode_item(tag: &Compound, _: ClientVersion) -> Result<ParticleData> {
    Ok(ParticleData::Item(ItemStack::decode(tag.require_compound("item")?)?))
}

fn encode_item(data: &ParticleData, _: ClientVersion, tag: &mut Compound) -> Result<()> {
    match data {
        ParticleData::Item(stack) => {
            let mut item = Compound::new();
            stack.encode(&mut item);
            tag.insert("item", item);
            Ok(())
        }
        other => Err(mismatch("item", other)),
    }
}

// vibration

fn has_origin(version: ClientVersion) -> bool {
    version.is_older_than(ClientVersion::V1_19)
}

fn read_vibration(cursor: &mut WireCursor) -> Result<ParticleData> {
    let origin = if has_origin(cursor.version()) {
        Some(cursor.read_block_position()?)
    } else {
        None
    };
    let source = catalog()?.position_sources().read(cursor)?;
    let ticks = cursor.read_var_int()?;
    Ok(ParticleData::Vibration {
        origin,
        source,
        ticks,
    })
}

fn write_vibration(cursor: &mut WireCursor, data: &ParticleData) -> Result<()> {
    match data {
        ParticleData::Vibration {
            origin,
            source,
            ticks,
        } => {
            if has_origin(cursor.version()) {
                let origin = origin.ok_or_else(|| {
                    ProtocolError::InvalidData(format!(
                        "Vibration origin is required before {}",
                        ClientVersion::V1_19
                    ))
                })?;
                cursor.write_block_position(origin)?;
            }
            catalog()?.position_sources().write(cursor, source)?;
            cursor.write_var_int(*ticks);
            Ok(())
        }
        other => Err(mismatch("vibration", other)),
    }
}

fn decode_vibration(tag: &Compound, version: ClientVersion) -> Result<ParticleData> {
    let destination = tag.require_compound("destination")?;
    Ok(ParticleData::Vibration {
        origin: None,
        source: catalog()?.position_sources().decode(destination, version)?,
        ticks: tag.require_int("arrival_in_ticks")?,
    })
}

fn encode_vibration(data: &ParticleData, version: ClientVersion, tag: &mut Compound) -> Result<()> {
    match data {
        ParticleData::Vibration { source, ticks, .. } => {
            let mut destination = Compound::new();
            catalog()?
                .position_sources()
                .encode(source, version, &mut destination)?;
            tag.insert("destination", destination);
            tag.put_int("arrival_in_ticks", *ticks);
            Ok(())
        }
        other => Err(mismatch("vibration", other)),
    }
}

// sculk_charge

fn read_sculk_charge(cursor: &mut WireCursor) -> Result<ParticleData> {
    Ok(ParticleData::SculkCharge {
        roll: cursor.read_f32()?,
    })
}

fn write_sculk_charge(cursor: &mut WireCursor, data: &ParticleData) -> Result<()> {
    match *data {
        ParticleData::SculkCharge { roll } => {
            cursor.write_f32(roll);
            Ok(())
        }
        ref other => Err(mismatch("sculk charge", other)),
    }
}

fn decode_sculk_charge(tag: &Compound, _: ClientVersion) -> Result<ParticleData> {
    Ok(ParticleData::SculkCharge {
        roll: tag.require_float("roll")?,
    })
}

fn encode_sculk_charge(data: &ParticleData, _: ClientVersion, tag: &mut Compound) -> Result<()> {
    match *data {
        ParticleData::SculkCharge { roll } => {
            tag.put_float("roll", roll);
            Ok(())
        }
        ref other => Err(mismatch("sculk charge", other)),
    }
}

// shriek

fn read_shriek(cursor: &mut WireCursor) -> Result<ParticleData> {
    Ok(ParticleData::Shriek {
        delay: cursor.read_var_int()?,
    })
}

fn write_shriek(cursor: &mut WireCursor, data: &ParticleData) -> Result<()> {
    match *data {
        ParticleData::Shriek { delay } => {
            cursor.write_var_int(delay);
            Ok(())
        }
        ref other => Err(mismatch("shriek", other)),
    }
}

fn decode_shriek(tag: &Compound, _: ClientVersion) -> Result<ParticleData> {
    Ok(ParticleData::Shriek {
        delay: tag.require_int("delay")?,
    })
}

fn encode_shriek(data: &ParticleData, _: ClientVersion, tag: &mut Compound) -> Result<()> {
    match *data {
        ParticleData::Shriek { delay } => {
            tag.put_int("delay", delay);
            Ok(())
        }
        ref other => Err(mismatch("shriek", other)),
    }
}

// trail

fn has_trail_duration(version: ClientVersion) -> bool {
    version.is_newer_than_or_equals(ClientVersion::V1_21_4)
}

fn read_trail(cursor: &mut WireCursor) -> Result<ParticleData> {
    let target = [cursor.read_f64()?, cursor.read_f64()?, cursor.read_f64()?];
    let color = cursor.read_i32()?;
    let duration = if has_trail_duration(cursor.version()) {
        cursor.read_var_int()?
    } else {
        0
    };
    Ok(ParticleData::Trail {
        target,
        color,
        duration,
    })
}

fn write_trail(cursor: &mut WireCursor, data: &ParticleData) -> Result<()> {
    match *data {
        ParticleData::Trail {
            target,
            color,
            duration,
        } => {
            for axis in target {
                cursor.write_f64(axis);
            }
            cursor.write_i32(color);
            if has_trail_duration(cursor.version()) {
                cursor.write_var_int(duration);
            }
            Ok(())
        }
        ref other => Err(mismatch("trail", other)),
    }
}

fn decode_trail(tag: &Compound, _: ClientVersion) -> Result<ParticleData> {
    let target = match tag.get("target") {
        Some(Tag::List(items)) => match items.as_slice() {
            [Tag::Double(x), Tag::Double(y), Tag::Double(z)] => [*x, *y, *z],
            _ => return Err(ProtocolError::InvalidData("Trail target needs 3 doubles".into())),
        },
        _ => return Err(ProtocolError::InvalidData("Missing trail target".into())),
    };
    Ok(ParticleData::Trail {
        target,
        color: tag.require_int("color")?,
        duration: tag.get("duration").and_then(Tag::as_int).unwrap_or(0),
    })
}

fn encode_trail(data: &ParticleData, _: ClientVersion, tag: &mut Compound) -> Result<()> {
    match *data {
        ParticleData::Trail {
            target,
            color,
            duration,
        } => {
            tag.insert("target", Tag::List(target.iter().map(|&v| Tag::Double(v)).collect()));
            tag.put_int("color", color);
            tag.put_int("duration", duration);
            Ok(())
        }
        ref other => Err(mismatch("trail", other)),
    }
}

/// Particle types without data, in declaration order
const MARKERS: &[&str] = &[
    "ambient_entity_effect",
    "angry_villager",
    "bubble",
    "cloud",
    "crit",
    "damage_indicator",
    "dragon_breath",
    "dripping_lava",
    "falling_lava",
    "landing_lava",
    "dripping_water",
    "falling_water",
    "effect",
    "elder_guardian",
    "enchanted_hit",
    "enchant",
    "end_rod",
    "explosion_emitter",
    "explosion",
    "sonic_boom",
    "firework",
    "fishing",
    "flame",
    "sculk_soul",
    "sculk_charge_pop",
    "soul_fire_flame",
    "soul",
    "flash",
    "happy_villager",
    "composter",
    "heart",
    "instant_effect",
    "item_slime",
    "item_snowball",
    "large_smoke",
    "lava",
    "mycelium",
    "note",
    "poof",
    "portal",
    "rain",
    "smoke",
    "sneeze",
    "spit",
    "squid_ink",
    "sweep_attack",
    "totem_of_undying",
    "underwater",
    "splash",
    "witch",
    "bubble_pop",
    "current_down",
    "bubble_column_up",
    "nautilus",
    "dolphin",
    "campfire_cosy_smoke",
    "campfire_signal_smoke",
    "dripping_honey",
    "falling_honey",
    "landing_honey",
    "falling_nectar",
    "falling_spore_blossom",
    "ash",
    "crimson_spore",
    "warped_spore",
    "spore_blossom_air",
    "dripping_obsidian_tear",
    "falling_obsidian_tear",
    "landing_obsidian_tear",
    "reverse_portal",
    "white_ash",
    "small_flame",
    "snowflake",
    "dripping_dripstone_lava",
    "falling_dripstone_lava",
    "dripping_dripstone_water",
    "falling_dripstone_water",
    "glow_squid_ink",
    "glow",
    "wax_on",
    "wax_off",
    "electric_spark",
    "scrape",
    "dripping_cherry_leaves",
    "falling_cherry_leaves",
    "landing_cherry_leaves",
    "egg_crack",
    "gust",
    "gust_emitter",
    "white_smoke",
    "dust_plume",
    "trial_spawner_detection",
    "small_gust",
    "gust_emitter_large",
    "gust_emitter_small",
    "infested",
    "item_cobweb",
    "trial_spawner_detection_ominous",
    "vault_connection",
    "ominous_spawning",
    "raid_omen",
    "trial_omen",
];

/// The `particle_type` registry
///
/// Mapping data also names particles this catalog does not model (barrier,
/// light), so the registry tolerates unknown identifiers.
pub struct ParticleTypes {
    registry: ProtocolRegistry<ParticleData>,
    pub block: Arc<ParticleType>,
    pub block_marker: Arc<ParticleType>,
    pub falling_dust: Arc<ParticleType>,
    pub dust: Arc<ParticleType>,
    pub dust_color_transition: Arc<ParticleType>,
    pub entity_effect: Arc<ParticleType>,
    pub item: Arc<ParticleType>,
    pub vibration: Arc<ParticleType>,
    pub sculk_charge: Arc<ParticleType>,
    pub shriek: Arc<ParticleType>,
    pub dust_pillar: Arc<ParticleType>,
    pub trail: Arc<ParticleType>,
    pub block_crumble: Arc<ParticleType>,
}

impl ParticleTypes {
    pub const REGISTRY: &'static str = "particle_type";

    pub fn declare(diffs: Vec<VersionDiff>) -> Result<Self> {
        let mut registry =
            ProtocolRegistry::with_mappings(Self::REGISTRY, diffs).tolerate_unknown(true);
        for name in MARKERS {
            define_marker(&mut registry, name)?;
        }

        let block_state = |registry: &mut ProtocolRegistry<ParticleData>, name: &str| {
            define_with_tree(
                registry,
                name,
                read_block_state,
                write_block_state,
                decode_block_state,
                encode_block_state,
            )
        };
        let block = block_state(&mut registry, "block")?;
        let block_marker = block_state(&mut registry, "block_marker")?;
        let falling_dust = block_state(&mut registry, "falling_dust")?;
        let dust_pillar = block_state(&mut registry, "dust_pillar")?;
        let block_crumble = block_state(&mut registry, "block_crumble")?;

        let dust = define_with_tree(&mut registry, "dust", read_dust, write_dust, decode_dust, encode_dust)?;
        let dust_color_transition = define_with_tree(
            &mut registry,
            "dust_color_transition",
            read_dust_transition,
            write_dust_transition,
            decode_dust_transition,
            encode_dust_transition,
        )?;
        let entity_effect = define_with_tree(
            &mut registry,
            "entity_effect",
            read_color,
            write_color,
            decode_color,
            encode_color,
        )?;
        let item = define_with_tree(&mut registry, "item", read_item, write_item, decode_item, encode_item)?;
        let vibration = define_with_tree(
            &mut registry,
            "vibration",
            read_vibration,
            write_vibration,
            decode_vibration,
            encode_vibration,
        )?;
        let sculk_charge = define_with_tree(
            &mut registry,
            "sculk_charge",
            read_sculk_charge,
            write_sculk_charge,
            decode_sculk_charge,
            encode_sculk_charge,
        )?;
        let shriek = define_with_tree(
            &mut registry,
            "shriek",
            read_shriek,
            write_shriek,
            decode_shriek,
            encode_shriek,
        )?;
        let trail = define_with_tree(&mut registry, "trail", read_trail, write_trail, decode_trail, encode_trail)?;

        Ok(Self {
            registry,
            block,
            block_marker,
            falling_dust,
            dust,
            dust_color_transition,
            entity_effect,
            item,
            vibration,
            sculk_charge,
            shriek,
            dust_pillar,
            trail,
            block_crumble,
        })
    }

    pub fn registry(&self) -> &ProtocolRegistry<ParticleData> {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ProtocolRegistry<ParticleData> {
        &mut self.registry
    }

    pub fn get(&self, name: &str) -> Result<&Arc<ParticleType>> {
        self.registry.get_by_name(&Identifier::parse(name))
    }

    pub fn read(&self, cursor: &mut WireCursor) -> Result<Particle> {
        let (kind, data) = read_typed(&self.registry, cursor)?;
        Ok(Particle { kind, data })
    }

    pub fn write(&self, cursor: &mut WireCursor, particle: &Particle) -> Result<()> {
        write_typed(&self.registry, cursor, &particle.kind, &particle.data)
    }

    /// Tree form: `{type: "<name>", ...data}`
    pub fn decode(&self, tag: &Compound, version: ClientVersion) -> Result<Particle> {
        let kind = self.get(tag.require_str("type")?)?.clone();
        let data = kind.decode(tag, version)?;
        Ok(Particle { kind, data })
    }

    pub fn encode(&self, particle: &Particle, version: ClientVersion) -> Result<Compound> {
        let mut tag = Compound::new();
        tag.put_string("type", particle.kind.name().to_string());
        particle.kind.encode(&particle.data, version, &mut tag)?;
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particles() -> &'static ParticleTypes {
        crate::init().unwrap();
        catalog().unwrap().particle_types()
    }

    fn roundtrip(version: ClientVersion, particle: &Particle) -> Particle {
        let particles = particles();
        let mut cursor = WireCursor::new(version);
        particles.write(&mut cursor, particle).unwrap();
        let read = particles.read(&mut cursor).unwrap();
        assert!(cursor.is_empty(), "{} left bytes at {}", particle.kind.name(), version);
        read
    }

    #[test]
    fn test_ids_follow_mappings() {
        let particles = particles();
        let registry = particles.registry();
        assert_eq!(registry.id_of(&particles.block, ClientVersion::V1_13), Some(3));
        assert_eq!(registry.id_of(&particles.dust, ClientVersion::V1_13), Some(11));
        assert_eq!(registry.id_of(&particles.block, ClientVersion::V1_20_5), Some(1));
        assert_eq!(registry.id_of(&particles.dust, ClientVersion::V1_20_5), Some(13));
        assert_eq!(registry.id_of(&particles.trail, ClientVersion::V1_21), None);

        let ambient = particles.get("ambient_entity_effect").unwrap();
        assert_eq!(registry.id_of(ambient, ClientVersion::V1_20_3), Some(0));
        assert_eq!(registry.id_of(ambient, ClientVersion::V1_20_5), None);
    }

    #[test]
    fn test_no_particle_ids_before_1_13() {
        let particles = particles();
        assert!(!particles.registry().is_explicit_at(ClientVersion::V1_12_2));
        assert!(particles.registry().get_by_id(ClientVersion::V1_12_2, 0).is_err());
    }

    #[test]
    fn test_block_particle_bytes() {
        let particles = particles();
        let particle = Particle::new(particles.block.clone(), ParticleData::BlockState(1));
        let mut cursor = WireCursor::new(ClientVersion::V1_13);
        particles.write(&mut cursor, &particle).unwrap();
        assert_eq!(cursor.as_bytes(), &[0x03, 0x01]);
    }

    #[test]
    fn test_marker_particle() {
        let particles = particles();
        let flame = particles.get("flame").unwrap().clone();
        let particle = Particle::new(flame.clone(), ParticleData::Empty);
        assert_eq!(roundtrip(ClientVersion::V1_16, &particle), particle);

        let mut cursor = WireCursor::new(ClientVersion::V1_16);
        let bad = Particle::new(flame, ParticleData::Shriek { delay: 1 });
        assert!(matches!(
            particles.write(&mut cursor, &bad),
            Err(ProtocolError::UnsupportedPayload(_))
        ));
    }

    #[test]
    fn test_dust_color_encoding() {
        let particles = particles();
        let dust = Particle::new(
            particles.dust.clone(),
            ParticleData::Dust {
                color: Vector3f::new(1.0, 0.0, 0.0),
                scale: 2.0,
            },
        );
        assert_eq!(roundtrip(ClientVersion::V1_16, &dust), dust);
        assert_eq!(roundtrip(ClientVersion::V1_21_2, &dust), dust);

        let mut cursor = WireCursor::new(ClientVersion::V1_21_2);
        write_dust(&mut cursor, &dust.data).unwrap();
        assert_eq!(cursor.read_i32().unwrap(), 0xff0000);
    }

    #[test]
    fn test_dust_transition_field_order() {
        let data = ParticleData::DustColorTransition {
            from: Vector3f::new(1.0, 1.0, 1.0),
            to: Vector3f::new(0.0, 0.0, 0.0),
            scale: 0.5,
        };
        let mut old = WireCursor::new(ClientVersion::V1_20_3);
        write_dust_transition(&mut old, &data).unwrap();
        assert_eq!(&old.as_bytes()[12..16], &0.5f32.to_be_bytes());

        let mut new = WireCursor::new(ClientVersion::V1_20_5);
        write_dust_transition(&mut new, &data).unwrap();
        assert_eq!(&new.as_bytes()[24..28], &0.5f32.to_be_bytes());
        assert_eq!(read_dust_transition(&mut new).unwrap(), data);
    }

    #[test]
    fn test_entity_effect_color_from_1_20_5() {
        let particles = particles();
        let colored = Particle::new(particles.entity_effect.clone(), ParticleData::Color(0x7f00ff00));
        assert_eq!(roundtrip(ClientVersion::V1_20_5, &colored), colored);

        let mut cursor = WireCursor::new(ClientVersion::V1_19_4);
        assert!(particles.write(&mut cursor, &colored).is_err());
        let plain = Particle::new(particles.entity_effect.clone(), ParticleData::Empty);
        assert_eq!(roundtrip(ClientVersion::V1_19_4, &plain), plain);
    }

    #[test]
    fn test_item_particle() {
        let particles = particles();
        let item = Particle::new(particles.item.clone(), ParticleData::Item(ItemStack::new(5, 1)));
        assert_eq!(roundtrip(ClientVersion::V1_18, &item), item);
    }

    #[test]
    fn test_vibration_particle() {
        let particles = particles();
        let source = PositionSource::Entity {
            entity_id: 12,
            y_offset: 1.0,
        };
        let modern = Particle::new(
            particles.vibration.clone(),
            ParticleData::Vibration {
                origin: None,
                source,
                ticks: 40,
            },
        );
        assert_eq!(roundtrip(ClientVersion::V1_19, &modern), modern);
        assert_eq!(roundtrip(ClientVersion::V1_21, &modern), modern);

        let legacy = Particle::new(
            particles.vibration.clone(),
            ParticleData::Vibration {
                origin: Some(BlockPosition::new(1, 64, 1)),
                source: PositionSource::Block(BlockPosition::new(3, 60, 3)),
                ticks: 20,
            },
        );
        assert_eq!(roundtrip(ClientVersion::V1_18, &legacy), legacy);

        let mut cursor = WireCursor::new(ClientVersion::V1_18);
        assert!(matches!(
            particles.write(&mut cursor, &modern),
            Err(ProtocolError::InvalidData(_))
        ));
    }

    #[test]
    fn test_trail_duration_from_1_21_4() {
        let particles = particles();
        let trail = Particle::new(
            particles.trail.clone(),
            ParticleData::Trail {
                target: [1.0, 2.0, 3.0],
                color: 0xffffff,
                duration: 15,
            },
        );
        assert_eq!(roundtrip(ClientVersion::V1_21_4, &trail), trail);

        let read = roundtrip(ClientVersion::V1_21_2, &trail);
        assert!(matches!(read.data, ParticleData::Trail { duration: 0, .. }));
    }

    #[test]
    fn test_tree_codecs() {
        let particles = particles();
        let version = ClientVersion::latest();
        for particle in [
            Particle::new(particles.falling_dust.clone(), ParticleData::BlockState(9)),
            Particle::new(particles.shriek.clone(), ParticleData::Shriek { delay: 4 }),
            Particle::new(particles.sculk_charge.clone(), ParticleData::SculkCharge { roll: 0.25 }),
            Particle::new(particles.item.clone(), ParticleData::Item(ItemStack::new(7, 3))),
            Particle::new(
                particles.vibration.clone(),
                ParticleData::Vibration {
                    origin: None,
                    source: PositionSource::Block(BlockPosition::new(0, 0, 0)),
                    ticks: 10,
                },
            ),
        ] {
            let tag = particles.encode(&particle, version).unwrap();
            assert_eq!(particles.decode(&tag, version).unwrap(), particle);
        }
    }

    #[test]
    fn test_unknown_particle_id() {
        let particles = particles();
        let mut cursor = WireCursor::from_slice(&[0x7f], ClientVersion::V1_21);
        assert!(matches!(
            particles.read(&mut cursor),
            Err(ProtocolError::UnknownId { id: 127, .. })
        ));
    }
}
