//! Wolf variants (1.20.5+)
//!
//! Each variant names three textures and the biomes it spawns in. The biome
//! set is either a tag (`#minecraft:is_savanna`) or a list of biome
//! identifiers. In registry data a single biome may be sent as a bare string.

use packetmap_core::{Identifier, ProtocolError, Result};
use packetmap_protocol::{Compound, Tag, WireCursor};
use packetmap_registry::{EntryData, MappedEntity, VersionDiff, VersionedRegistry};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BiomeSelector {
    Tag(Identifier),
    Biomes(Vec<Identifier>),
}

impl BiomeSelector {
    pub fn single(biome: &str) -> Self {
        Self::Biomes(vec![Identifier::parse(biome)])
    }

    fn decode(tag: &Tag) -> Result<Self> {
        match tag {
            Tag::String(text) => match text.strip_prefix('#') {
                Some(name) => Ok(Self::Tag(Identifier::parse(name))),
                None => Ok(Self::single(text)),
            },
            Tag::List(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(Identifier::parse).ok_or_else(|| {
                        ProtocolError::InvalidData("Biome list holds a non-string tag".into())
                    })
                })
                .collect::<Result<_>>()
                .map(Self::Biomes),
            other => Err(ProtocolError::InvalidData(format!(
                "Expected a biome tag or list, found tag type {}",
                other.type_id()
            ))),
        }
    }

    fn encode(&self) -> Tag {
        match self {
            Self::Tag(name) => Tag::String(format!("#{}", name)),
            Self::Biomes(biomes) => {
                Tag::List(biomes.iter().map(|biome| Tag::String(biome.to_string())).collect())
            }
        }
    }
}

/// Properties of a wolf variant, as carried in registry data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WolfVariantData {
    pub wild_texture: Identifier,
    pub tame_texture: Identifier,
    pub angry_texture: Identifier,
    pub biomes: BiomeSelector,
}

impl WolfVariantData {
    /// Textures under `entity/wolf/` named after `asset`
    pub fn from_asset(asset: &str, biomes: BiomeSelector) -> Self {
        let texture = |suffix: &str| Identifier::minecraft(format!("entity/wolf/{}{}", asset, suffix));
        Self {
            wild_texture: texture(""),
            tame_texture: texture("_tame"),
            angry_texture: texture("_angry"),
            biomes,
        }
    }

    pub fn decode(tag: &Compound) -> Result<Self> {
        let texture = |key: &str| tag.require_str(key).map(Identifier::parse);
        let biomes = tag
            .get("biomes")
            .ok_or_else(|| ProtocolError::InvalidData("Missing tag 'biomes'".into()))?;
        Ok(Self {
            wild_texture: texture("wild_texture")?,
            tame_texture: texture("tame_texture")?,
            angry_texture: texture("angry_texture")?,
            biomes: BiomeSelector::decode(biomes)?,
        })
    }

    pub fn encode(&self, tag: &mut Compound) {
        tag.put_string("wild_texture", self.wild_texture.to_string());
        tag.put_string("tame_texture", self.tame_texture.to_string());
        tag.put_string("angry_texture", self.angry_texture.to_string());
        tag.insert("biomes", self.biomes.encode());
    }
}

pub struct WolfVariant {
    data: EntryData,
    properties: WolfVariantData,
}

impl WolfVariant {
    pub fn properties(&self) -> &WolfVariantData {
        &self.properties
    }
}

impl MappedEntity for WolfVariant {
    fn data(&self) -> &EntryData {
        &self.data
    }
}

impl fmt::Debug for WolfVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WolfVariant")
            .field("identifier", &self.data.identifier().to_string())
            .field("properties", &self.properties)
            .finish()
    }
}

/// The `wolf_variant` registry
pub struct WolfVariants {
    registry: VersionedRegistry<WolfVariant>,
}

impl WolfVariants {
    pub const REGISTRY: &'static str = "wolf_variant";

    pub fn declare(diffs: Vec<VersionDiff>) -> Result<Self> {
        let mut registry = VersionedRegistry::with_mappings(Self::REGISTRY, diffs);
        let tag = |name: &str| BiomeSelector::Tag(Identifier::minecraft(name));
        let variants = [
            ("pale", "wolf", BiomeSelector::single("taiga")),
            ("spotted", "wolf_spotted", tag("is_savanna")),
            ("snowy", "wolf_snowy", BiomeSelector::single("grove")),
            ("black", "wolf_black", BiomeSelector::single("old_growth_pine_taiga")),
            ("ashen", "wolf_ashen", BiomeSelector::single("snowy_taiga")),
            ("rusty", "wolf_rusty", tag("is_jungle")),
            ("woods", "wolf_woods", BiomeSelector::single("forest")),
            ("chestnut", "wolf_chestnut", BiomeSelector::single("old_growth_spruce_taiga")),
            ("striped", "wolf_striped", tag("is_badlands")),
        ];
        for (name, asset, biomes) in variants {
            registry.declare(name, |data| WolfVariant {
                data,
                properties: WolfVariantData::from_asset(asset, biomes),
            })?;
        }
        Ok(Self { registry })
    }

    pub fn registry(&self) -> &VersionedRegistry<WolfVariant> {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut VersionedRegistry<WolfVariant> {
        &mut self.registry
    }

    pub fn get(&self, name: &str) -> Result<&Arc<WolfVariant>> {
        self.registry.get_by_name(&Identifier::parse(name))
    }

    pub fn read(&self, cursor: &mut WireCursor) -> Result<&Arc<WolfVariant>> {
        self.registry.read_id(cursor)
    }

    pub fn write(&self, cursor: &mut WireCursor, variant: &WolfVariant) -> Result<()> {
        self.registry.write_id(cursor, variant)
    }
}
