//! Versioned name/ID registry

use crate::bundle::VersionDiff;
use crate::entry::{EntryData, MappedEntity};
use crate::replay::replay;
use indexmap::IndexMap;
use packetmap_core::{ClientVersion, Identifier, ProtocolError, Result};
use packetmap_protocol::WireCursor;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// Lifecycle of a registry's raw mapping data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingState {
    /// Raw diffs held, era tables not yet built
    Pending,
    /// Era tables built, raw diffs still held
    Loaded,
    /// Raw diffs dropped
    Released,
}

/// Resolution table for one version
#[derive(Debug, Default)]
struct VersionTable {
    /// Whether any entry has an era covering this version
    explicit: bool,
    /// Wire ID to entry index
    by_id: HashMap<i32, usize>,
    /// Entry index to wire ID
    ids: Vec<Option<i32>>,
}

/// Named concepts with per-version wire IDs
///
/// Entries are declared once under their latest name, then [`load_mappings`]
/// replays the raw diffs into each entry's era table. After start-up every
/// lookup takes `&self` and the registry can be shared freely.
///
/// [`load_mappings`]: VersionedRegistry::load_mappings
pub struct VersionedRegistry<T: MappedEntity> {
    name: Arc<str>,
    entries: IndexMap<Identifier, Arc<T>>,
    raw: Option<Vec<VersionDiff>>,
    state: MappingState,
    tolerate_unknown: bool,
    tables: OnceLock<Vec<VersionTable>>,
}

impl<T: MappedEntity> VersionedRegistry<T> {
    pub fn new(name: &str) -> Self {
        Self::with_mappings(name, Vec::new())
    }

    pub fn with_mappings(name: &str, diffs: Vec<VersionDiff>) -> Self {
        Self {
            name: Arc::from(name),
            entries: IndexMap::new(),
            raw: Some(diffs),
            state: MappingState::Pending,
            tolerate_unknown: false,
            tables: OnceLock::new(),
        }
    }

    /// Skip diff records naming identifiers nothing declared
    pub fn tolerate_unknown(mut self, tolerate: bool) -> Self {
        self.tolerate_unknown = tolerate;
        self
    }

    pub fn set_tolerate_unknown(&mut self, tolerate: bool) {
        self.tolerate_unknown = tolerate;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in declaration order
    pub fn entries(&self) -> impl Iterator<Item = &Arc<T>> {
        self.entries.values()
    }

    pub fn state(&self) -> MappingState {
        self.state
    }

    pub fn has_raw_mappings(&self) -> bool {
        self.raw.is_some()
    }

    pub fn is_released(&self) -> bool {
        self.state == MappingState::Released
    }

    /// Declare an entry
    ///
    /// The factory receives metadata whose era table is still empty; the
    /// returned value must carry that same metadata.
    pub fn declare(
        &mut self,
        identifier: impl Into<Identifier>,
        factory: impl FnOnce(EntryData) -> T,
    ) -> Result<Arc<T>> {
        let identifier = identifier.into();
        if self.entries.contains_key(&identifier) {
            return Err(ProtocolError::DuplicateIdentifier {
                registry: self.name.to_string(),
                identifier: identifier.to_string(),
            });
        }

        let data = EntryData::new(self.entries.len(), identifier.clone(), self.name.clone());
        let entry = Arc::new(factory(data.clone()));
        debug_assert_eq!(entry.data(), &data);

        match self.state {
            MappingState::Pending => {}
            MappingState::Loaded => {
                let diffs = self.raw.as_deref().unwrap_or(&[]);
                if let Some(eras) = replay(diffs)?.swap_remove(&identifier) {
                    data.set_eras(eras);
                }
            }
            MappingState::Released => {
                warn!(
                    "{}: {} declared after mappings were released, it has no era data",
                    self.name, identifier
                );
            }
        }

        self.entries.insert(identifier, entry.clone());
        self.tables = OnceLock::new();
        Ok(entry)
    }

    /// Replay raw diffs into every entry's era table
    ///
    /// A no-op once loaded or released.
    pub fn load_mappings(&mut self) -> Result<()> {
        if self.state != MappingState::Pending {
            debug!("{}: mappings already {:?}", self.name, self.state);
            return Ok(());
        }
        let diffs = self.raw.as_deref().unwrap_or(&[]);
        let tables = replay(diffs)?;

        let mut assigned = Vec::with_capacity(tables.len());
        for (identifier, eras) in tables {
            match self.entries.get(&identifier) {
                Some(entry) => assigned.push((entry.data().clone(), eras)),
                None if self.tolerate_unknown => {
                    debug!("{}: skipping unknown identifier {}", self.name, identifier);
                }
                None => {
                    return Err(ProtocolError::MappingLoad(format!(
                        "{}: diff references undeclared identifier {}",
                        self.name, identifier
                    )))
                }
            }
        }

        let explicit = assigned.len();
        for (data, eras) in assigned {
            data.set_eras(eras);
        }
        self.state = MappingState::Loaded;
        self.tables = OnceLock::new();
        debug!(
            "{}: loaded {} entries, {} with explicit eras",
            self.name,
            self.entries.len(),
            explicit
        );
        Ok(())
    }

    /// Drop the raw diffs; era tables stay
    pub fn unload_mappings(&mut self) {
        self.raw = None;
        self.state = MappingState::Released;
    }

    pub fn find_by_name(&self, identifier: &Identifier) -> Option<&Arc<T>> {
        self.entries.get(identifier)
    }

    pub fn get_by_name(&self, identifier: &Identifier) -> Result<&Arc<T>> {
        self.find_by_name(identifier)
            .ok_or_else(|| ProtocolError::UnknownIdentifier {
                registry: self.name.to_string(),
                identifier: identifier.to_string(),
            })
    }

    /// Resolve a wire ID
    ///
    /// Explicit era data wins; when no entry has an era covering `version`,
    /// IDs are the declaration order of the entries present at `version`.
    pub fn get_by_id(&self, version: ClientVersion, id: i32) -> Result<&Arc<T>> {
        self.table(version)
            .by_id
            .get(&id)
            .and_then(|&index| self.entries.get_index(index))
            .map(|(_, entry)| entry)
            .ok_or_else(|| ProtocolError::UnknownId {
                registry: self.name.to_string(),
                version,
                id,
            })
    }

    /// Wire ID of `entry` at `version`, the inverse of [`get_by_id`](Self::get_by_id)
    pub fn id_of(&self, entry: &T, version: ClientVersion) -> Option<i32> {
        let index = self.index_of(entry.data())?;
        self.table(version).ids.get(index).copied().flatten()
    }

    /// Resolve an ID in a secondary ID space
    pub fn get_by_facet_id(&self, version: ClientVersion, facet: usize, id: i32) -> Option<&Arc<T>> {
        self.entries
            .values()
            .find(|entry| entry.data().id_facet(version, facet) == Some(id))
    }

    /// Whether resolution at `version` uses explicit era data
    pub fn is_explicit_at(&self, version: ClientVersion) -> bool {
        self.table(version).explicit
    }

    /// Read a leading var-int ID and resolve it for the cursor's version
    pub fn read_id(&self, cursor: &mut WireCursor) -> Result<&Arc<T>> {
        let id = cursor.read_var_int()?;
        self.get_by_id(cursor.version(), id)
    }

    /// Like [`id_of`](Self::id_of), failing when the entry has no ID at `version`
    pub fn require_id(&self, entry: &T, version: ClientVersion) -> Result<i32> {
        self.id_of(entry, version)
            .ok_or_else(|| ProtocolError::UnknownIdentifier {
                registry: self.name.to_string(),
                identifier: format!("{} (at {})", entry.name(), version),
            })
    }

    pub fn write_id(&self, cursor: &mut WireCursor, entry: &T) -> Result<()> {
        let id = self.require_id(entry, cursor.version())?;
        cursor.write_var_int(id);
        Ok(())
    }

    fn index_of(&self, data: &EntryData) -> Option<usize> {
        let index = self.entries.get_index_of(data.identifier())?;
        (self.entries[index].data() == data).then_some(index)
    }

    fn table(&self, version: ClientVersion) -> &VersionTable {
        let tables = self.tables.get_or_init(|| {
            ClientVersion::ALL
                .iter()
                .map(|&version| self.build_table(version))
                .collect()
        });
        &tables[version.ordinal()]
    }

    fn build_table(&self, version: ClientVersion) -> VersionTable {
        let mut table = VersionTable {
            ids: vec![None; self.entries.len()],
            ..VersionTable::default()
        };

        // Latest-starting era wins a contested ID
        let mut claimed: HashMap<i32, ClientVersion> = HashMap::new();
        for (index, entry) in self.entries.values().enumerate() {
            let Some(era) = entry.data().era_at(version) else {
                continue;
            };
            let Some(id) = era.id() else {
                continue;
            };
            table.explicit = true;
            table.ids[index] = Some(id);
            if claimed.get(&id).map_or(true, |&since| era.since >= since) {
                claimed.insert(id, era.since);
                table.by_id.insert(id, index);
            }
        }

        if !table.explicit {
            let present = self
                .entries
                .values()
                .enumerate()
                .filter(|(_, entry)| entry.data().is_present(version));
            for (ordinal, (index, _)) in present.enumerate() {
                table.ids[index] = Some(ordinal as i32);
                table.by_id.insert(ordinal as i32, index);
            }
        }
        table
    }
}

/// Object-safe view of a registry, independent of its entry type
pub trait RegistryView: Send + Sync {
    fn name(&self) -> &str;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_released(&self) -> bool;

    fn has_raw_mappings(&self) -> bool;

    /// Entry metadata in declaration order
    fn entry_data(&self) -> Vec<&EntryData>;

    fn data_by_name(&self, identifier: &Identifier) -> Result<&EntryData>;

    fn data_by_id(&self, version: ClientVersion, id: i32) -> Result<&EntryData>;

    fn id_of_data(&self, data: &EntryData, version: ClientVersion) -> Option<i32>;
}

impl<T: MappedEntity> RegistryView for VersionedRegistry<T> {
    fn name(&self) -> &str {
        VersionedRegistry::name(self)
    }

    fn len(&self) -> usize {
        VersionedRegistry::len(self)
    }

    fn is_released(&self) -> bool {
        VersionedRegistry::is_released(self)
    }

    fn has_raw_mappings(&self) -> bool {
        VersionedRegistry::has_raw_mappings(self)
    }

    fn entry_data(&self) -> Vec<&EntryData> {
        self.entries.values().map(|entry| entry.data()).collect()
    }

    fn data_by_name(&self, identifier: &Identifier) -> Result<&EntryData> {
        self.get_by_name(identifier).map(|entry| entry.data())
    }

    fn data_by_id(&self, version: ClientVersion, id: i32) -> Result<&EntryData> {
        self.get_by_id(version, id).map(|entry| entry.data())
    }

    fn id_of_data(&self, data: &EntryData, version: ClientVersion) -> Option<i32> {
        let index = self.index_of(data)?;
        self.table(version).ids.get(index).copied().flatten()
    }
}

impl<T: MappedEntity> std::fmt::Debug for VersionedRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedRegistry")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::DiffOp;
    use proptest::prelude::*;

    struct Kind {
        data: EntryData,
    }

    impl MappedEntity for Kind {
        fn data(&self) -> &EntryData {
            &self.data
        }
    }

    fn kind(data: EntryData) -> Kind {
        Kind { data }
    }

    fn add(name: &str, id: i32) -> DiffOp {
        DiffOp::Add {
            name: name.into(),
            id: id.into(),
        }
    }

    #[test]
    fn test_duplicate_declaration() {
        let mut registry = VersionedRegistry::new("test");
        registry.declare("a", kind).unwrap();
        assert!(matches!(
            registry.declare("minecraft:a", kind),
            Err(ProtocolError::DuplicateIdentifier { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_ordinal_fallback() {
        let mut registry = VersionedRegistry::new("test");
        let a = registry.declare("a", kind).unwrap();
        let b = registry.declare("b", kind).unwrap();
        let c = registry.declare("c", kind).unwrap();
        registry.load_mappings().unwrap();

        for version in [ClientVersion::oldest(), ClientVersion::V1_16, ClientVersion::latest()] {
            assert!(Arc::ptr_eq(registry.get_by_id(version, 0).unwrap(), &a));
            assert!(Arc::ptr_eq(registry.get_by_id(version, 1).unwrap(), &b));
            assert!(Arc::ptr_eq(registry.get_by_id(version, 2).unwrap(), &c));
            assert_eq!(registry.id_of(&c, version), Some(2));
            assert!(!registry.is_explicit_at(version));
        }
        assert!(matches!(
            registry.get_by_id(ClientVersion::V1_16, 3),
            Err(ProtocolError::UnknownId { id: 3, .. })
        ));
    }

    #[test]
    fn test_era_specific_ids() {
        let diffs = vec![
            VersionDiff::new(ClientVersion::V1_13, vec![add("x", 5)]),
            VersionDiff::new(
                ClientVersion::V1_16,
                vec![DiffOp::Renumber {
                    name: "x".into(),
                    id: 9.into(),
                }],
            ),
        ];
        let mut registry = VersionedRegistry::with_mappings("test", diffs);
        let x = registry.declare("x", kind).unwrap();
        registry.load_mappings().unwrap();

        assert!(Arc::ptr_eq(registry.get_by_id(ClientVersion::V1_14, 5).unwrap(), &x));
        assert!(Arc::ptr_eq(registry.get_by_id(ClientVersion::V1_20, 9).unwrap(), &x));
        assert!(matches!(
            registry.get_by_id(ClientVersion::V1_14, 9),
            Err(ProtocolError::UnknownId { id: 9, .. })
        ));
        assert_eq!(x.data().id(ClientVersion::V1_15_2), Some(5));
        // before its first era the entry does not exist
        assert_eq!(registry.id_of(&x, ClientVersion::V1_12_2), None);
        assert!(registry.get_by_id(ClientVersion::V1_12_2, 0).is_err());
    }

    #[test]
    fn test_ordinal_skips_removed_entries() {
        let diffs = vec![
            VersionDiff::new(ClientVersion::V1_8, vec![add("b", 0)]),
            VersionDiff::new(
                ClientVersion::V1_9,
                vec![DiffOp::Remove { name: "b".into() }],
            ),
        ];
        let mut registry = VersionedRegistry::with_mappings("test", diffs);
        let a = registry.declare("a", kind).unwrap();
        registry.declare("b", kind).unwrap();
        let c = registry.declare("c", kind).unwrap();
        registry.load_mappings().unwrap();

        // 1.8 is explicit, 1.9 falls back to ordinals without b
        assert!(registry.is_explicit_at(ClientVersion::V1_8));
        assert!(!registry.is_explicit_at(ClientVersion::V1_9));
        assert!(Arc::ptr_eq(registry.get_by_id(ClientVersion::V1_9, 0).unwrap(), &a));
        assert!(Arc::ptr_eq(registry.get_by_id(ClientVersion::V1_9, 1).unwrap(), &c));
        assert_eq!(registry.id_of(&a, ClientVersion::V1_8), None);
    }

    #[test]
    fn test_latest_starting_era_wins() {
        let diffs = vec![
            VersionDiff::new(ClientVersion::V1_13, vec![add("old", 1)]),
            VersionDiff::new(ClientVersion::V1_14, vec![add("new", 1)]),
        ];
        let mut registry = VersionedRegistry::with_mappings("test", diffs);
        registry.declare("old", kind).unwrap();
        let new = registry.declare("new", kind).unwrap();
        registry.load_mappings().unwrap();

        assert!(Arc::ptr_eq(registry.get_by_id(ClientVersion::V1_16, 1).unwrap(), &new));
        assert_eq!(
            registry.get_by_id(ClientVersion::V1_13, 1).unwrap().name(),
            &Identifier::from("old")
        );
    }

    #[test]
    fn test_unknown_identifier_in_diffs() {
        let diffs = vec![VersionDiff::new(ClientVersion::V1_13, vec![add("ghost", 1), add("a", 2)])];

        let mut strict: VersionedRegistry<Kind> = VersionedRegistry::with_mappings("test", diffs.clone());
        strict.declare("a", kind).unwrap();
        assert!(matches!(strict.load_mappings(), Err(ProtocolError::MappingLoad(_))));

        let mut lenient = VersionedRegistry::with_mappings("test", diffs).tolerate_unknown(true);
        let a = lenient.declare("a", kind).unwrap();
        lenient.load_mappings().unwrap();
        assert_eq!(lenient.id_of(&a, ClientVersion::V1_13), Some(2));
    }

    #[test]
    fn test_load_unload_lifecycle() {
        let diffs = vec![VersionDiff::new(ClientVersion::V1_13, vec![add("a", 4)])];
        let mut registry = VersionedRegistry::with_mappings("test", diffs);
        let a = registry.declare("a", kind).unwrap();
        assert_eq!(registry.state(), MappingState::Pending);

        registry.load_mappings().unwrap();
        registry.load_mappings().unwrap();
        assert!(registry.has_raw_mappings());

        registry.unload_mappings();
        registry.load_mappings().unwrap();
        assert!(registry.is_released());
        assert!(!registry.has_raw_mappings());
        assert!(Arc::ptr_eq(registry.get_by_id(ClientVersion::V1_21, 4).unwrap(), &a));
        assert!(Arc::ptr_eq(registry.get_by_name(&"a".into()).unwrap(), &a));
    }

    #[test]
    fn test_declare_after_load() {
        let diffs = vec![VersionDiff::new(ClientVersion::V1_13, vec![add("a", 4), add("b", 7)])];
        let mut registry = VersionedRegistry::with_mappings("test", diffs);
        registry.declare("a", kind).unwrap();
        registry.set_tolerate_unknown(true);
        registry.load_mappings().unwrap();

        let b = registry.declare("b", kind).unwrap();
        assert_eq!(registry.id_of(&b, ClientVersion::V1_13), Some(7));

        registry.unload_mappings();
        let c = registry.declare("c", kind).unwrap();
        assert!(!c.data().has_explicit_data());
    }

    #[test]
    fn test_foreign_entry_has_no_id() {
        let mut one = VersionedRegistry::new("one");
        let mut two = VersionedRegistry::new("two");
        one.declare("a", kind).unwrap();
        let foreign = two.declare("a", kind).unwrap();
        assert_eq!(one.id_of(&foreign, ClientVersion::latest()), None);
        assert!(matches!(
            one.require_id(&foreign, ClientVersion::latest()),
            Err(ProtocolError::UnknownIdentifier { .. })
        ));
        assert_eq!(two.require_id(&foreign, ClientVersion::latest()).unwrap(), 0);
        assert!(matches!(
            one.get_by_name(&"b".into()),
            Err(ProtocolError::UnknownIdentifier { .. })
        ));
    }

    #[test]
    fn test_leading_id_dispatch() {
        let mut registry = VersionedRegistry::new("test");
        registry.declare("a", kind).unwrap();
        let b = registry.declare("b", kind).unwrap();

        let mut cursor = WireCursor::new(ClientVersion::latest());
        registry.write_id(&mut cursor, &b).unwrap();
        assert_eq!(cursor.as_bytes(), &[0x01]);
        assert!(Arc::ptr_eq(registry.read_id(&mut cursor).unwrap(), &b));
    }

    proptest! {
        #[test]
        fn resolution_is_consistent_both_ways(
            ids in prop::collection::hash_set(0i32..1000, 1..20),
            renumbered in prop::collection::vec(any::<bool>(), 20),
        ) {
            let ids: Vec<i32> = ids.into_iter().collect();
            let names: Vec<String> = (0..ids.len()).map(|i| format!("entry_{}", i)).collect();
            let first = VersionDiff::new(
                ClientVersion::V1_13,
                names.iter().zip(&ids).map(|(name, &id)| add(name, id)).collect(),
            );
            // shift renumbered entries into a disjoint ID range
            let second = VersionDiff::new(
                ClientVersion::V1_17,
                names
                    .iter()
                    .zip(&ids)
                    .zip(&renumbered)
                    .filter(|(_, flag)| **flag)
                    .map(|((name, &id), _)| DiffOp::Renumber { name: name.as_str().into(), id: (id + 1000).into() })
                    .collect(),
            );

            let mut registry = VersionedRegistry::with_mappings("prop", vec![first, second]);
            for name in &names {
                registry.declare(name.as_str(), kind).unwrap();
            }
            registry.load_mappings().unwrap();
            registry.unload_mappings();

            for version in [ClientVersion::V1_13, ClientVersion::V1_16, ClientVersion::V1_17, ClientVersion::latest()] {
                for entry in registry.entries() {
                    let id = entry.data().id(version).unwrap();
                    let by_name = registry.get_by_name(entry.name()).unwrap();
                    prop_assert!(Arc::ptr_eq(registry.get_by_id(version, id).unwrap(), by_name));
                    prop_assert_eq!(registry.id_of(entry, version), Some(id));
                }
            }
        }
    }
}
