//! Villager types and professions
//!
//! Neither registry ships ID data. Wire IDs are the declaration order, which
//! has been stable since villager data became a serializer in 1.14.

use crate::entity_data::VillagerData;
use packetmap_core::{ClientVersion, Identifier, Result};
use packetmap_protocol::WireCursor;
use packetmap_registry::{EntryData, MappedEntity, VersionDiff, VersionedRegistry};
use std::fmt;
use std::sync::Arc;

/// Biome flavour of a villager
pub struct VillagerType {
    data: EntryData,
}

impl MappedEntity for VillagerType {
    fn data(&self) -> &EntryData {
        &self.data
    }
}

impl fmt::Debug for VillagerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VillagerType({})", self.data.identifier())
    }
}

pub struct VillagerProfession {
    data: EntryData,
}

impl MappedEntity for VillagerProfession {
    fn data(&self) -> &EntryData {
        &self.data
    }
}

impl fmt::Debug for VillagerProfession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VillagerProfession({})", self.data.identifier())
    }
}

const TYPES: &[&str] = &["desert", "jungle", "plains", "savanna", "snow", "swamp", "taiga"];

const PROFESSIONS: &[&str] = &[
    "none",
    "armorer",
    "butcher",
    "cartographer",
    "cleric",
    "farmer",
    "fisherman",
    "fletcher",
    "leatherworker",
    "librarian",
    "mason",
    "nitwit",
    "shepherd",
    "toolsmith",
    "weaponsmith",
];

/// The `villager_type` registry
pub struct VillagerTypes {
    registry: VersionedRegistry<VillagerType>,
}

impl VillagerTypes {
    pub const REGISTRY: &'static str = "villager_type";

    pub fn declare(diffs: Vec<VersionDiff>) -> Result<Self> {
        let mut registry = VersionedRegistry::with_mappings(Self::REGISTRY, diffs);
        for name in TYPES {
            registry.declare(*name, |data| VillagerType { data })?;
        }
        Ok(Self { registry })
    }

    pub fn registry(&self) -> &VersionedRegistry<VillagerType> {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut VersionedRegistry<VillagerType> {
        &mut self.registry
    }

    pub fn get(&self, name: &str) -> Result<&Arc<VillagerType>> {
        self.registry.get_by_name(&Identifier::parse(name))
    }

    pub fn read(&self, cursor: &mut WireCursor) -> Result<&Arc<VillagerType>> {
        self.registry.read_id(cursor)
    }

    pub fn write(&self, cursor: &mut WireCursor, kind: &VillagerType) -> Result<()> {
        self.registry.write_id(cursor, kind)
    }
}

/// The `villager_profession` registry
pub struct VillagerProfessions {
    registry: VersionedRegistry<VillagerProfession>,
}

impl VillagerProfessions {
    pub const REGISTRY: &'static str = "villager_profession";

    pub fn declare(diffs: Vec<VersionDiff>) -> Result<Self> {
        let mut registry = VersionedRegistry::with_mappings(Self::REGISTRY, diffs);
        for name in PROFESSIONS {
            registry.declare(*name, |data| VillagerProfession { data })?;
        }
        Ok(Self { registry })
    }

    pub fn registry(&self) -> &VersionedRegistry<VillagerProfession> {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut VersionedRegistry<VillagerProfession> {
        &mut self.registry
    }

    pub fn get(&self, name: &str) -> Result<&Arc<VillagerProfession>> {
        self.registry.get_by_name(&Identifier::parse(name))
    }

    pub fn read(&self, cursor: &mut WireCursor) -> Result<&Arc<VillagerProfession>> {
        self.registry.read_id(cursor)
    }

    pub fn write(&self, cursor: &mut WireCursor, profession: &VillagerProfession) -> Result<()> {
        self.registry.write_id(cursor, profession)
    }
}

impl VillagerData {
    pub fn villager_type<'a>(
        &self,
        types: &'a VillagerTypes,
        version: ClientVersion,
    ) -> Result<&'a Arc<VillagerType>> {
        types.registry().get_by_id(version, self.kind)
    }

    pub fn profession<'a>(
        &self,
        professions: &'a VillagerProfessions,
        version: ClientVersion,
    ) -> Result<&'a Arc<VillagerProfession>> {
        professions.registry().get_by_id(version, self.profession)
    }
}
