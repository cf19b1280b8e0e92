//! Mapping bundle: per-registry, per-version diff records
//!
//! # Format
//! ```json
//! {"format": 1, "registries": {"particle_type": [
//!     {"version": "1.13", "ops": [{"op": "add", "name": "block", "id": 3}]},
//!     {"version": "1.14", "ops": [{"op": "renumber", "name": "block", "id": 4}]}
//! ]}}
//! ```
//! `id` is either a single primary ID or an array of ID facets. The bundle
//! may be gzip or zlib compressed.

use crate::entry::EraIds;
use packetmap_core::{ClientVersion, Identifier, ProtocolError, Result};
use packetmap_protocol::{decompress, CompressionType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Only supported bundle format
pub const BUNDLE_FORMAT: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdSpec {
    One(i32),
    Many(Vec<i32>),
}

impl IdSpec {
    pub fn to_ids(&self) -> EraIds {
        match self {
            Self::One(id) => EraIds::from_elem(*id, 1),
            Self::Many(ids) => EraIds::from_slice(ids),
        }
    }
}

impl From<i32> for IdSpec {
    fn from(id: i32) -> Self {
        Self::One(id)
    }
}

/// One change applied at a version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DiffOp {
    Add { name: Identifier, id: IdSpec },
    Remove { name: Identifier },
    Rename { from: Identifier, to: Identifier },
    Renumber { name: Identifier, id: IdSpec },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDiff {
    pub version: ClientVersion,
    #[serde(default)]
    pub ops: Vec<DiffOp>,
}

impl VersionDiff {
    pub fn new(version: ClientVersion, ops: Vec<DiffOp>) -> Self {
        Self { version, ops }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingBundle {
    format: u32,
    #[serde(default)]
    registries: BTreeMap<String, Vec<VersionDiff>>,
}

impl Default for MappingBundle {
    fn default() -> Self {
        Self {
            format: BUNDLE_FORMAT,
            registries: BTreeMap::new(),
        }
    }
}

impl MappingBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let bundle: Self = serde_json::from_str(json)
            .map_err(|e| ProtocolError::MappingLoad(format!("Malformed mapping bundle: {}", e)))?;
        bundle.check_format()?;
        Ok(bundle)
    }

    /// Parse a bundle that may be gzip or zlib compressed
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw = decompress(bytes, CompressionType::detect(bytes))?;
        let json = std::str::from_utf8(&raw)
            .map_err(|_| ProtocolError::MappingLoad("Mapping bundle is not UTF-8".into()))?;
        Self::from_json(json)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    fn check_format(&self) -> Result<()> {
        if self.format != BUNDLE_FORMAT {
            return Err(ProtocolError::MappingLoad(format!(
                "Unsupported mapping bundle format {}",
                self.format
            )));
        }
        Ok(())
    }

    pub fn registry_names(&self) -> impl Iterator<Item = &str> {
        self.registries.keys().map(String::as_str)
    }

    pub fn diffs(&self, registry: &str) -> &[VersionDiff] {
        self.registries.get(registry).map_or(&[], Vec::as_slice)
    }

    /// Remove and return a registry's diffs, empty if it has none
    pub fn take(&mut self, registry: &str) -> Vec<VersionDiff> {
        self.registries.remove(registry).unwrap_or_default()
    }

    pub fn insert(&mut self, registry: impl Into<String>, diffs: Vec<VersionDiff>) {
        self.registries.insert(registry.into(), diffs);
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::MappingLoad(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packetmap_protocol::compress;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "format": 1,
        "registries": {
            "particle_type": [
                {"version": "1.13", "ops": [
                    {"op": "add", "name": "block", "id": 3},
                    {"op": "add", "name": "minecraft:dust", "id": [11]}
                ]},
                {"version": "1.14", "ops": [
                    {"op": "renumber", "name": "block", "id": 4},
                    {"op": "rename", "from": "dust", "to": "dust_old"},
                    {"op": "remove", "name": "dust_old"}
                ]}
            ]
        }
    }"#;

    #[test]
    fn test_parse_ops() {
        let mut bundle = MappingBundle::from_json(SAMPLE).unwrap();
        assert_eq!(bundle.registry_names().collect::<Vec<_>>(), vec!["particle_type"]);

        let diffs = bundle.take("particle_type");
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].version, ClientVersion::V1_13);
        assert_eq!(
            diffs[0].ops[0],
            DiffOp::Add {
                name: Identifier::minecraft("block"),
                id: IdSpec::One(3)
            }
        );
        assert_eq!(
            diffs[1].ops[1],
            DiffOp::Rename {
                from: Identifier::minecraft("dust"),
                to: Identifier::minecraft("dust_old")
            }
        );
        assert!(bundle.take("particle_type").is_empty());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            MappingBundle::from_json(r#"{"format": 2, "registries": {}}"#),
            Err(ProtocolError::MappingLoad(_))
        ));
        assert!(matches!(
            MappingBundle::from_json(r#"{"format": 1, "registries": {"x": [{"version": "0.1"}]}}"#),
            Err(ProtocolError::MappingLoad(_))
        ));
        assert!(matches!(
            MappingBundle::from_json(r#"{"format": 1, "registries": {"x": [{"version": "1.8", "ops": [{"op": "grow"}]}]}}"#),
            Err(ProtocolError::MappingLoad(_))
        ));
    }

    #[test]
    fn test_compressed_file() {
        let gz = compress(SAMPLE.as_bytes(), CompressionType::Gzip).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&gz).unwrap();

        let bundle = MappingBundle::load_from_file(file.path()).unwrap();
        assert_eq!(bundle.diffs("particle_type").len(), 2);
        assert_eq!(bundle, MappingBundle::from_json(SAMPLE).unwrap());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            MappingBundle::load_from_file("/nonexistent/mappings.json"),
            Err(ProtocolError::Io(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let bundle = MappingBundle::from_json(SAMPLE).unwrap();
        let zlib = compress(bundle.to_json().unwrap().as_bytes(), CompressionType::Zlib).unwrap();
        assert_eq!(MappingBundle::from_bytes(&zlib).unwrap(), bundle);
    }
}
