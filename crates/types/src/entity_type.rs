//! Entity types and their hierarchy
//!
//! Concrete types live in the `entity_type` registry. Abstract types
//! (living_entity, mob, projectile, ...) only exist as parents: they have
//! detached metadata and no wire ID. Before 1.14 objects also had a separate
//! spawn ID, carried as the second facet of their eras.

use packetmap_core::{ClientVersion, Identifier, Result};
use packetmap_protocol::WireCursor;
use packetmap_registry::{EntryData, KeySet, MappedEntity, VersionDiff, VersionedRegistry};
use std::fmt;
use std::sync::{Arc, Weak};

const LEGACY_FACET: usize = 1;

pub struct EntityType {
    data: EntryData,
    parent: Option<Weak<EntityType>>,
    /// Own key plus every ancestor's
    lineage: KeySet,
}

impl EntityType {
    fn new(data: EntryData, parent: Option<&Arc<EntityType>>) -> Self {
        let mut lineage = KeySet::new();
        lineage.insert(data.key());
        if let Some(parent) = parent {
            lineage.union_with(&parent.lineage);
        }
        Self {
            data,
            parent: parent.map(Arc::downgrade),
            lineage,
        }
    }

    pub fn parent(&self) -> Option<Arc<EntityType>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Whether this type is `candidate` or descends from it
    pub fn is_instance_of(&self, candidate: &EntityType) -> bool {
        self.lineage.contains(candidate.key())
    }

    /// Object spawn ID, only defined before 1.14
    pub fn legacy_id(&self, version: ClientVersion) -> Option<i32> {
        if version.is_newer_than_or_equals(ClientVersion::V1_14) {
            return None;
        }
        self.data.id_facet(version, LEGACY_FACET)
    }
}

impl MappedEntity for EntityType {
    fn data(&self) -> &EntryData {
        &self.data
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType")
            .field("identifier", &self.data.identifier().to_string())
            .field("parent", &self.parent().map(|parent| parent.name().to_string()))
            .finish()
    }
}

/// The `entity_type` registry and the abstract types above it
pub struct EntityTypes {
    registry: VersionedRegistry<EntityType>,
    pub entity: Arc<EntityType>,
    pub living_entity: Arc<EntityType>,
    pub mob: Arc<EntityType>,
    pub animal: Arc<EntityType>,
    pub monster: Arc<EntityType>,
    pub projectile: Arc<EntityType>,
    pub abstract_arrow: Arc<EntityType>,
}

impl EntityTypes {
    pub const REGISTRY: &'static str = "entity_type";

    pub fn declare(diffs: Vec<VersionDiff>) -> Result<Self> {
        let detached = |name: &str, parent: Option<&Arc<EntityType>>| {
            Arc::new(EntityType::new(EntryData::detached(name, Self::REGISTRY), parent))
        };
        let entity = detached("entity", None);
        let living_entity = detached("living_entity", Some(&entity));
        let mob = detached("mob", Some(&living_entity));
        let animal = detached("animal", Some(&mob));
        let monster = detached("monster", Some(&mob));
        let projectile = detached("projectile", Some(&entity));
        let abstract_arrow = detached("abstract_arrow", Some(&projectile));

        let mut registry = VersionedRegistry::with_mappings(Self::REGISTRY, diffs);
        let mut declare = |name: &str, parent: &Arc<EntityType>| {
            registry.declare(name, |data| EntityType::new(data, Some(parent)))
        };

        for name in ["item", "experience_orb", "oak_boat", "minecart", "falling_block", "tnt"] {
            declare(name, &entity)?;
        }
        for name in ["player", "armor_stand"] {
            declare(name, &living_entity)?;
        }
        for name in ["cow", "pig", "sheep", "chicken", "wolf", "armadillo"] {
            declare(name, &animal)?;
        }
        let zombie = declare("zombie", &monster)?;
        let skeleton = declare("skeleton", &monster)?;
        for name in ["creeper", "spider"] {
            declare(name, &monster)?;
        }
        for name in ["husk", "drowned", "zombie_villager"] {
            declare(name, &zombie)?;
        }
        declare("stray", &skeleton)?;
        for name in ["snowball", "egg", "ender_pearl"] {
            declare(name, &projectile)?;
        }
        for name in ["arrow", "spectral_arrow", "trident"] {
            declare(name, &abstract_arrow)?;
        }

        Ok(Self {
            registry,
            entity,
            living_entity,
            mob,
            animal,
            monster,
            projectile,
            abstract_arrow,
        })
    }

    pub fn registry(&self) -> &VersionedRegistry<EntityType> {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut VersionedRegistry<EntityType> {
        &mut self.registry
    }

    pub fn get(&self, name: &str) -> Result<&Arc<EntityType>> {
        self.registry.get_by_name(&Identifier::parse(name))
    }

    /// Resolve an object spawn ID (before 1.14)
    pub fn get_by_legacy_id(&self, version: ClientVersion, id: i32) -> Option<&Arc<EntityType>> {
        if version.is_newer_than_or_equals(ClientVersion::V1_14) {
            return None;
        }
        self.registry.get_by_facet_id(version, LEGACY_FACET, id)
    }

    pub fn read(&self, cursor: &mut WireCursor) -> Result<&Arc<EntityType>> {
        self.registry.read_id(cursor)
    }

    pub fn write(&self, cursor: &mut WireCursor, kind: &EntityType) -> Result<()> {
        self.registry.write_id(cursor, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use packetmap_core::ProtocolError;

    fn types() -> &'static EntityTypes {
        crate::init().unwrap();
        catalog().unwrap().entity_types()
    }

    #[test]
    fn test_hierarchy() {
        let types = types();
        let husk = types.get("husk").unwrap();
        let zombie = types.get("zombie").unwrap();

        assert!(husk.is_instance_of(husk));
        assert!(husk.is_instance_of(zombie));
        assert!(husk.is_instance_of(&types.monster));
        assert!(husk.is_instance_of(&types.living_entity));
        assert!(husk.is_instance_of(&types.entity));
        assert!(!husk.is_instance_of(&types.animal));
        assert!(!zombie.is_instance_of(husk));

        let trident = types.get("trident").unwrap();
        assert!(trident.is_instance_of(&types.abstract_arrow));
        assert!(trident.is_instance_of(&types.projectile));
        assert!(!trident.is_instance_of(&types.living_entity));

        assert_eq!(husk.parent().unwrap().name(), zombie.name());
        assert!(types.entity.parent().is_none());
    }

    #[test]
    fn test_abstract_types_have_no_ids() {
        let types = types();
        assert!(types.get("mob").is_err());
        assert_eq!(types.registry().id_of(&types.mob, ClientVersion::V1_16), None);
    }

    #[test]
    fn test_rename_keeps_history() {
        let types = types();
        let registry = types.registry();
        let boat = types.get("oak_boat").unwrap();
        assert!(matches!(
            types.get("boat"),
            Err(ProtocolError::UnknownIdentifier { .. })
        ));
        assert_eq!(registry.id_of(boat, ClientVersion::V1_12_2), Some(41));
        assert_eq!(registry.id_of(boat, ClientVersion::V1_20_5), Some(3));
        assert_eq!(registry.id_of(boat, ClientVersion::V1_21_2), Some(14));
        assert_eq!(registry.id_of(boat, ClientVersion::V1_21_4), Some(14));
    }

    #[test]
    fn test_legacy_ids() {
        let types = types();
        let item = types.get("item").unwrap();
        assert_eq!(item.legacy_id(ClientVersion::V1_8), Some(2));
        assert_eq!(item.legacy_id(ClientVersion::V1_14), None);
        assert_eq!(types.get("creeper").unwrap().legacy_id(ClientVersion::V1_8), None);

        let arrow = types.get_by_legacy_id(ClientVersion::V1_12_2, 60).unwrap();
        assert_eq!(arrow.name().key(), "arrow");
        let boat = types.get_by_legacy_id(ClientVersion::V1_8, 1).unwrap();
        assert_eq!(boat.name().key(), "oak_boat");
        assert!(types.get_by_legacy_id(ClientVersion::V1_16, 60).is_none());
    }

    #[test]
    fn test_presence_by_version() {
        let types = types();
        let registry = types.registry();
        let armadillo = types.get("armadillo").unwrap();
        assert_eq!(registry.id_of(armadillo, ClientVersion::V1_20_3), None);
        assert_eq!(registry.id_of(armadillo, ClientVersion::V1_20_5), Some(0));

        let player = types.get("player").unwrap();
        assert_eq!(registry.id_of(player, ClientVersion::V1_12_2), None);
        assert_eq!(registry.id_of(player, ClientVersion::V1_13), Some(26));
    }

    #[test]
    fn test_wire_ids() {
        let types = types();
        let pig = types.get("pig").unwrap();
        let mut cursor = WireCursor::new(ClientVersion::V1_13);
        types.write(&mut cursor, pig).unwrap();
        assert_eq!(cursor.as_bytes(), &[14]);
        assert!(Arc::ptr_eq(types.read(&mut cursor).unwrap(), pig));

        let mut cursor = WireCursor::from_slice(&[90], ClientVersion::V1_8);
        assert_eq!(types.read(&mut cursor).unwrap().name().key(), "pig");
    }
}
