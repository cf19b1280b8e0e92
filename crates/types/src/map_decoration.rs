//! Map decoration types
//!
//! A static registry from 1.20.5 and a fixed icon enum before that. New
//! decorations have only ever been appended, so the declaration order below
//! gives the wire ID in every version that has the decoration.

use packetmap_core::{Identifier, Result};
use packetmap_protocol::WireCursor;
use packetmap_registry::{EntryData, MappedEntity, VersionDiff, VersionedRegistry};
use std::fmt;
use std::sync::Arc;

const LIGHT_GRAY: i32 = 0x999999;

pub struct MapDecorationType {
    data: EntryData,
    pub asset_id: Identifier,
    pub show_on_item_frame: bool,
    /// Color drawn on the map item's icon, if any
    pub map_color: Option<i32>,
    /// Target of an explorer map
    pub exploration_map_element: bool,
    pub track_count: bool,
}

impl MappedEntity for MapDecorationType {
    fn data(&self) -> &EntryData {
        &self.data
    }
}

impl fmt::Debug for MapDecorationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapDecorationType")
            .field("identifier", &self.data.identifier().to_string())
            .field("asset_id", &self.asset_id.to_string())
            .finish()
    }
}

struct Shape {
    asset: String,
    show_on_item_frame: bool,
    map_color: Option<i32>,
    track_count: bool,
    exploration_map_element: bool,
}

/// Marker shown wherever it is placed
fn marker(asset: &str, show_on_item_frame: bool, track_count: bool) -> Shape {
    Shape {
        asset: asset.to_string(),
        show_on_item_frame,
        map_color: None,
        track_count,
        exploration_map_element: false,
    }
}

/// Explorer map target
fn structure(asset: &str, color: i32) -> Shape {
    Shape {
        asset: asset.to_string(),
        show_on_item_frame: true,
        map_color: Some(color),
        track_count: false,
        exploration_map_element: true,
    }
}

const BANNER_COLORS: [&str; 16] = [
    "white",
    "orange",
    "magenta",
    "light_blue",
    "yellow",
    "lime",
    "pink",
    "gray",
    "light_gray",
    "cyan",
    "purple",
    "blue",
    "brown",
    "green",
    "red",
    "black",
];

/// The `map_decoration_type` registry
pub struct MapDecorationTypes {
    registry: VersionedRegistry<MapDecorationType>,
}

impl MapDecorationTypes {
    pub const REGISTRY: &'static str = "map_decoration_type";

    pub fn declare(diffs: Vec<VersionDiff>) -> Result<Self> {
        let mut decorations = vec![
            ("player".to_string(), marker("player", false, true)),
            ("frame".to_string(), marker("frame", true, true)),
            ("red_marker".to_string(), marker("red_marker", false, true)),
            ("blue_marker".to_string(), marker("blue_marker", false, true)),
            ("target_x".to_string(), marker("target_x", true, false)),
            ("target_point".to_string(), marker("target_point", true, false)),
            ("player_off_map".to_string(), marker("player_off_map", false, true)),
            ("player_off_limits".to_string(), marker("player_off_limits", false, true)),
            ("mansion".to_string(), structure("woodland_mansion", 0x524c44)),
            ("monument".to_string(), structure("ocean_monument", 0x3a7265)),
        ];
        for color in BANNER_COLORS {
            let asset = format!("{}_banner", color);
            decorations.push((format!("banner_{}", color), marker(&asset, true, true)));
        }
        decorations.push(("red_x".to_string(), marker("red_x", true, false)));
        for village in ["desert", "plains", "savanna", "snowy", "taiga"] {
            decorations.push((
                format!("village_{}", village),
                structure(&format!("{}_village", village), LIGHT_GRAY),
            ));
        }
        decorations.push(("jungle_temple".to_string(), structure("jungle_temple", LIGHT_GRAY)));
        decorations.push(("swamp_hut".to_string(), structure("swamp_hut", LIGHT_GRAY)));
        decorations.push(("trial_chambers".to_string(), structure("trial_chambers", 0xc26c4c)));

        let mut registry = VersionedRegistry::with_mappings(Self::REGISTRY, diffs);
        for (name, shape) in decorations {
            registry.declare(name, |data| MapDecorationType {
                data,
                asset_id: Identifier::minecraft(shape.asset),
                show_on_item_frame: shape.show_on_item_frame,
                map_color: shape.map_color,
                exploration_map_element: shape.exploration_map_element,
                track_count: shape.track_count,
            })?;
        }
        Ok(Self { registry })
    }

    pub fn registry(&self) -> &VersionedRegistry<MapDecorationType> {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut VersionedRegistry<MapDecorationType> {
        &mut self.registry
    }

    pub fn get(&self, name: &str) -> Result<&Arc<MapDecorationType>> {
        self.registry.get_by_name(&Identifier::parse(name))
    }

    pub fn read(&self, cursor: &mut WireCursor) -> Result<&Arc<MapDecorationType>> {
        self.registry.read_id(cursor)
    }

    pub fn write(&self, cursor: &mut WireCursor, kind: &MapDecorationType) -> Result<()> {
        self.registry.write_id(cursor, kind)
    }
}
