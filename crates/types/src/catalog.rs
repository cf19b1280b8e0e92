//! Start-up of the concrete registries
//!
//! Every registry is declared first, then all load their mappings, then all
//! release them. The resulting [`Catalog`] is frozen and can be installed
//! process-wide with [`init`] so that codecs crossing registries (entity
//! data holding particles, vibrations holding position sources) can reach it.

use crate::entity_data::EntityDataTypes;
use crate::entity_type::EntityTypes;
use crate::map_decoration::MapDecorationTypes;
use crate::parser::Parsers;
use crate::particle::ParticleTypes;
use crate::position_source::PositionSourceTypes;
use crate::score::ScoreFormatTypes;
use crate::villager::{VillagerProfessions, VillagerTypes};
use crate::wolf_variant::WolfVariants;
use packetmap_config::ProtocolConfig;
use packetmap_core::{ProtocolError, Result};
use packetmap_registry::{MappedEntity, MappingBundle, RegistryView, VersionedRegistry};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

static CATALOG: OnceLock<Catalog> = OnceLock::new();

const BUNDLED_MAPPINGS: &str = include_str!("../data/mappings.json");

/// Mapping data compiled into the crate
pub fn bundled_mappings() -> Result<MappingBundle> {
    MappingBundle::from_json(BUNDLED_MAPPINGS)
}

/// The configured external bundle, or the compiled-in one
pub fn load_bundle(config: &ProtocolConfig) -> Result<MappingBundle> {
    match &config.mappings {
        Some(path) => {
            info!("Loading mappings from {}", path.display());
            MappingBundle::load_from_file(path)
        }
        None => bundled_mappings(),
    }
}

pub struct Catalog {
    entity_data_types: EntityDataTypes,
    particle_types: ParticleTypes,
    parsers: Parsers,
    score_formats: ScoreFormatTypes,
    position_sources: PositionSourceTypes,
    entity_types: EntityTypes,
    villager_types: VillagerTypes,
    villager_professions: VillagerProfessions,
    wolf_variants: WolfVariants,
    map_decorations: MapDecorationTypes,
}

fn load<T: MappedEntity>(registry: &mut VersionedRegistry<T>, config: &ProtocolConfig) -> Result<()> {
    if config.tolerates_unknown(registry.name()) {
        registry.set_tolerate_unknown(true);
    }
    registry.load_mappings()
}

impl Catalog {
    pub fn bootstrap(mut bundle: MappingBundle, config: &ProtocolConfig) -> Result<Self> {
        let mut catalog = Self {
            entity_data_types: EntityDataTypes::declare(bundle.take(EntityDataTypes::REGISTRY))?,
            particle_types: ParticleTypes::declare(bundle.take(ParticleTypes::REGISTRY))?,
            parsers: Parsers::declare(bundle.take(Parsers::REGISTRY))?,
            score_formats: ScoreFormatTypes::declare(bundle.take(ScoreFormatTypes::REGISTRY))?,
            position_sources: PositionSourceTypes::declare(bundle.take(PositionSourceTypes::REGISTRY))?,
            entity_types: EntityTypes::declare(bundle.take(EntityTypes::REGISTRY))?,
            villager_types: VillagerTypes::declare(bundle.take(VillagerTypes::REGISTRY))?,
            villager_professions: VillagerProfessions::declare(
                bundle.take(VillagerProfessions::REGISTRY),
            )?,
            wolf_variants: WolfVariants::declare(bundle.take(WolfVariants::REGISTRY))?,
            map_decorations: MapDecorationTypes::declare(bundle.take(MapDecorationTypes::REGISTRY))?,
        };
        for name in bundle.registry_names() {
            warn!("Ignoring mappings for unknown registry {}", name);
        }

        load(catalog.entity_data_types.registry_mut(), config)?;
        load(catalog.particle_types.registry_mut(), config)?;
        load(catalog.parsers.registry_mut(), config)?;
        load(catalog.score_formats.registry_mut(), config)?;
        load(catalog.position_sources.registry_mut(), config)?;
        load(catalog.entity_types.registry_mut(), config)?;
        load(catalog.villager_types.registry_mut(), config)?;
        load(catalog.villager_professions.registry_mut(), config)?;
        load(catalog.wolf_variants.registry_mut(), config)?;
        load(catalog.map_decorations.registry_mut(), config)?;

        catalog.entity_data_types.registry_mut().unload_mappings();
        catalog.particle_types.registry_mut().unload_mappings();
        catalog.parsers.registry_mut().unload_mappings();
        catalog.score_formats.registry_mut().unload_mappings();
        catalog.position_sources.registry_mut().unload_mappings();
        catalog.entity_types.registry_mut().unload_mappings();
        catalog.villager_types.registry_mut().unload_mappings();
        catalog.villager_professions.registry_mut().unload_mappings();
        catalog.wolf_variants.registry_mut().unload_mappings();
        catalog.map_decorations.registry_mut().unload_mappings();

        for registry in catalog.registries() {
            debug!("{}: {} entries", registry.name(), registry.len());
        }
        info!(
            "Registries ready: {} registries, {} entries",
            catalog.registries().len(),
            catalog.registries().iter().map(|registry| registry.len()).sum::<usize>()
        );
        Ok(catalog)
    }

    pub fn entity_data_types(&self) -> &EntityDataTypes {
        &self.entity_data_types
    }

    pub fn particle_types(&self) -> &ParticleTypes {
        &self.particle_types
    }

    pub fn parsers(&self) -> &Parsers {
        &self.parsers
    }

    pub fn score_formats(&self) -> &ScoreFormatTypes {
        &self.score_formats
    }

    pub fn position_sources(&self) -> &PositionSourceTypes {
        &self.position_sources
    }

    pub fn entity_types(&self) -> &EntityTypes {
        &self.entity_types
    }

    pub fn villager_types(&self) -> &VillagerTypes {
        &self.villager_types
    }

    pub fn villager_professions(&self) -> &VillagerProfessions {
        &self.villager_professions
    }

    pub fn wolf_variants(&self) -> &WolfVariants {
        &self.wolf_variants
    }

    pub fn map_decorations(&self) -> &MapDecorationTypes {
        &self.map_decorations
    }

    /// Type-erased views, in start-up order
    pub fn registries(&self) -> Vec<&dyn RegistryView> {
        vec![
            self.entity_data_types.registry(),
            self.particle_types.registry(),
            self.parsers.registry(),
            self.score_formats.registry(),
            self.position_sources.registry(),
            self.entity_types.registry(),
            self.villager_types.registry(),
            self.villager_professions.registry(),
            self.wolf_variants.registry(),
            self.map_decorations.registry(),
        ]
    }

    pub fn registry(&self, name: &str) -> Option<&dyn RegistryView> {
        self.registries()
            .into_iter()
            .find(|registry| registry.name() == name)
    }
}

/// Install the catalog built from the default configuration
pub fn init() -> Result<&'static Catalog> {
    init_with(&ProtocolConfig::default())
}

/// Install the catalog built from `config`
///
/// Only the first successful call builds anything; later calls return the
/// installed catalog whatever their configuration.
pub fn init_with(config: &ProtocolConfig) -> Result<&'static Catalog> {
    if let Some(catalog) = CATALOG.get() {
        return Ok(catalog);
    }
    let catalog = Catalog::bootstrap(load_bundle(config)?, config)?;
    Ok(CATALOG.get_or_init(|| catalog))
}

/// The installed catalog
pub fn catalog() -> Result<&'static Catalog> {
    CATALOG.get().ok_or(ProtocolError::Uninitialized("registry catalog"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use packetmap_core::ClientVersion;
    use packetmap_registry::{DiffOp, VersionDiff};
    use std::io::Write;

    fn bogus_entity_type() -> Vec<VersionDiff> {
        vec![VersionDiff::new(
            ClientVersion::V1_8,
            vec![DiffOp::Add {
                name: "ghast".into(),
                id: 56.into(),
            }],
        )]
    }

    #[test]
    fn test_bootstrap_bundled() {
        let catalog = Catalog::bootstrap(bundled_mappings().unwrap(), &ProtocolConfig::default()).unwrap();
        let registries = catalog.registries();
        assert_eq!(registries.len(), 10);
        for registry in &registries {
            assert!(registry.is_released(), "{}", registry.name());
            assert!(!registry.has_raw_mappings(), "{}", registry.name());
            assert!(!registry.is_empty(), "{}", registry.name());
        }
        assert!(catalog.registry("particle_type").is_some());
        assert!(catalog.registry("wolf_variant").is_some());
        assert!(catalog.registry("block_type").is_none());
    }

    #[test]
    fn test_registry_view_lookups() {
        let catalog = Catalog::bootstrap(bundled_mappings().unwrap(), &ProtocolConfig::default()).unwrap();
        let view = catalog.registry("entity_type").unwrap();
        let pig = view.data_by_name(&"pig".into()).unwrap();
        assert_eq!(view.id_of_data(pig, ClientVersion::V1_8), Some(90));
        assert_eq!(view.data_by_id(ClientVersion::V1_8, 90).unwrap(), pig);
    }

    #[test]
    fn test_undeclared_name_is_fatal() {
        let mut bundle = bundled_mappings().unwrap();
        bundle.insert(EntityTypes::REGISTRY, bogus_entity_type());
        assert!(matches!(
            Catalog::bootstrap(bundle, &ProtocolConfig::default()),
            Err(ProtocolError::MappingLoad(_))
        ));
    }

    #[test]
    fn test_configured_tolerance() {
        let mut bundle = bundled_mappings().unwrap();
        bundle.insert(EntityTypes::REGISTRY, bogus_entity_type());
        let config = ProtocolConfig::parse("tolerate_unknown = entity_type");
        let catalog = Catalog::bootstrap(bundle, &config).unwrap();
        assert!(catalog.entity_types().get("ghast").is_err());
    }

    #[test]
    fn test_unknown_registry_is_ignored() {
        let mut bundle = bundled_mappings().unwrap();
        bundle.insert("block_type", Vec::new());
        assert!(Catalog::bootstrap(bundle, &ProtocolConfig::default()).is_ok());
    }

    #[test]
    fn test_external_bundle() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BUNDLED_MAPPINGS.as_bytes()).unwrap();
        let config = ProtocolConfig {
            mappings: Some(file.path().to_path_buf()),
            ..ProtocolConfig::default()
        };
        assert_eq!(load_bundle(&config).unwrap(), bundled_mappings().unwrap());

        let missing = ProtocolConfig {
            mappings: Some("/nonexistent/mappings.json".into()),
            ..ProtocolConfig::default()
        };
        assert!(matches!(load_bundle(&missing), Err(ProtocolError::Io(_))));
    }

    #[test]
    fn test_init_is_idempotent() {
        let first = init().unwrap();
        let second = init_with(&ProtocolConfig::parse("default_version = 1.8")).unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(catalog().unwrap(), first));
    }
}
