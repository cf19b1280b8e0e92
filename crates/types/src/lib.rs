//! packetmap types - the concrete protocol registries
//!
//! Entity data serializers, particles, command argument parsers, score
//! formats, position sources, entity types, villager types and professions,
//! wolf variants and map decorations, each backed by a
//! [`VersionedRegistry`](packetmap_registry::VersionedRegistry) and the
//! mapping data bundled with this crate. Also the book edit payload, whose
//! limits depend on the client version.
//!
//! ```no_run
//! use packetmap_core::ClientVersion;
//! use packetmap_protocol::WireCursor;
//!
//! let catalog = packetmap_types::init()?;
//! let pig = catalog.entity_types().get("pig")?;
//!
//! let mut cursor = WireCursor::new(ClientVersion::V1_12_2);
//! catalog.entity_types().write(&mut cursor, pig)?;
//! assert_eq!(cursor.as_bytes(), &[90]);
//! # Ok::<(), packetmap_core::ProtocolError>(())
//! ```

pub mod book;
pub mod catalog;
pub mod entity_data;
pub mod entity_type;
pub mod item;
pub mod map_decoration;
pub mod parser;
pub mod particle;
pub mod position_source;
pub mod score;
pub mod villager;
pub mod wolf_variant;

pub use book::{read_book_edit, write_book_edit, BookEdit, BookLimits};
pub use catalog::{bundled_mappings, catalog, init, init_with, load_bundle, Catalog};
pub use entity_data::{
    read_entity_metadata, write_entity_metadata, EntityData, EntityDataType, EntityDataTypes,
    EntityDataValue, GlobalPosition, VillagerData,
};
pub use entity_type::{EntityType, EntityTypes};
pub use item::{read_item_stack, write_item_stack, ItemStack};
pub use map_decoration::{MapDecorationType, MapDecorationTypes};
pub use parser::{Parser, ParserProperties, Parsers};
pub use particle::{Particle, ParticleData, ParticleType, ParticleTypes};
pub use position_source::{PositionSource, PositionSourceType, PositionSourceTypes};
pub use score::{ScoreFormat, ScoreFormatType, ScoreFormatTypes};
pub use villager::{VillagerProfession, VillagerProfessions, VillagerType, VillagerTypes};
pub use wolf_variant::{BiomeSelector, WolfVariant, WolfVariantData, WolfVariants};
