//! Registry entry metadata

use packetmap_core::{ClientVersion, EntryKey, Identifier};
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// ID facets of an era; facet 0 is the primary wire ID
pub type EraIds = SmallVec<[i32; 2]>;

/// Version range over which an entry's wire IDs are constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Era {
    pub since: ClientVersion,
    /// Exclusive
    pub until: Option<ClientVersion>,
    pub ids: EraIds,
}

impl Era {
    pub fn new(since: ClientVersion, until: Option<ClientVersion>, ids: EraIds) -> Self {
        Self { since, until, ids }
    }

    pub fn covers(&self, version: ClientVersion) -> bool {
        self.since <= version && self.until.map_or(true, |until| version < until)
    }

    pub fn id(&self) -> Option<i32> {
        self.facet(0)
    }

    pub fn facet(&self, facet: usize) -> Option<i32> {
        self.ids.get(facet).copied()
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.until {
            Some(until) => write!(f, "{}..{}", self.since, until)?,
            None => write!(f, "{}..", self.since)?,
        }
        write!(f, " {:?}", self.ids.as_slice())
    }
}

struct EntryInner {
    key: EntryKey,
    ordinal: usize,
    identifier: Identifier,
    registry: Arc<str>,
    eras: OnceLock<Vec<Era>>,
}

/// Shared metadata of a declared entry
///
/// Cloning is cheap and clones share the era table, which is written at most
/// once when the owning registry loads its mappings. Equality and hashing go
/// by [`EntryKey`] only.
#[derive(Clone)]
pub struct EntryData(Arc<EntryInner>);

impl EntryData {
    pub(crate) fn new(ordinal: usize, identifier: Identifier, registry: Arc<str>) -> Self {
        Self(Arc::new(EntryInner {
            key: EntryKey::allocate(),
            ordinal,
            identifier,
            registry,
            eras: OnceLock::new(),
        }))
    }

    /// Metadata for a concept that is never registered or sent on the wire
    ///
    /// It gets a fresh key, no eras, and no IDs in any registry.
    pub fn detached(identifier: impl Into<Identifier>, registry: &str) -> Self {
        Self::new(0, identifier.into(), Arc::from(registry))
    }

    pub fn key(&self) -> EntryKey {
        self.0.key
    }

    /// Declaration position within the owning registry
    pub fn ordinal(&self) -> usize {
        self.0.ordinal
    }

    pub fn identifier(&self) -> &Identifier {
        &self.0.identifier
    }

    pub fn registry_name(&self) -> &str {
        &self.0.registry
    }

    /// Era table, oldest first; empty before load or without explicit data
    pub fn eras(&self) -> &[Era] {
        self.0.eras.get().map_or(&[], Vec::as_slice)
    }

    pub fn has_explicit_data(&self) -> bool {
        !self.eras().is_empty()
    }

    /// Whether the entry exists at `version`
    ///
    /// Entries without explicit data are present everywhere.
    pub fn is_present(&self, version: ClientVersion) -> bool {
        let eras = self.eras();
        eras.is_empty() || eras.iter().any(|era| era.covers(version))
    }

    pub fn era_at(&self, version: ClientVersion) -> Option<&Era> {
        self.eras().iter().rev().find(|era| era.covers(version))
    }

    /// Explicit primary ID at `version`
    ///
    /// Ordinal IDs depend on the other entries, so only the registry knows
    /// them; see `VersionedRegistry::id_of`.
    pub fn id(&self, version: ClientVersion) -> Option<i32> {
        self.id_facet(version, 0)
    }

    pub fn id_facet(&self, version: ClientVersion, facet: usize) -> Option<i32> {
        self.era_at(version).and_then(|era| era.facet(facet))
    }

    /// Returns `false` if the table was already set
    pub(crate) fn set_eras(&self, eras: Vec<Era>) -> bool {
        self.0.eras.set(eras).is_ok()
    }
}

impl PartialEq for EntryData {
    fn eq(&self, other: &Self) -> bool {
        self.0.key == other.0.key
    }
}

impl Eq for EntryData {}

impl Hash for EntryData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.key.hash(state);
    }
}

impl fmt::Debug for EntryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryData")
            .field("registry", &self.registry_name())
            .field("identifier", &self.0.identifier.to_string())
            .field("key", &self.0.key.get())
            .field("eras", &self.eras())
            .finish()
    }
}

/// Anything stored in a [`VersionedRegistry`](crate::VersionedRegistry)
pub trait MappedEntity: Send + Sync + 'static {
    fn data(&self) -> &EntryData;

    fn name(&self) -> &Identifier {
        self.data().identifier()
    }

    fn key(&self) -> EntryKey {
        self.data().key()
    }
}

impl MappedEntity for EntryData {
    fn data(&self) -> &EntryData {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn entry() -> EntryData {
        EntryData::new(0, Identifier::minecraft("dust"), Arc::from("particle_type"))
    }

    #[test]
    fn test_era_bounds() {
        let era = Era::new(ClientVersion::V1_13, Some(ClientVersion::V1_14), smallvec![5]);
        assert!(!era.covers(ClientVersion::V1_12_2));
        assert!(era.covers(ClientVersion::V1_13));
        assert!(era.covers(ClientVersion::V1_13_2));
        assert!(!era.covers(ClientVersion::V1_14));

        let open = Era::new(ClientVersion::V1_14, None, smallvec![9, 2]);
        assert!(open.covers(ClientVersion::latest()));
        assert_eq!(open.facet(1), Some(2));
        assert_eq!(open.facet(2), None);
    }

    #[test]
    fn test_eras_are_write_once() {
        let data = entry();
        assert!(data.is_present(ClientVersion::V1_8));
        assert!(!data.has_explicit_data());

        let clone = data.clone();
        assert!(data.set_eras(vec![Era::new(ClientVersion::V1_13, None, smallvec![5])]));
        assert!(!clone.set_eras(Vec::new()));

        assert_eq!(clone.id(ClientVersion::V1_16), Some(5));
        assert_eq!(clone.id(ClientVersion::V1_12), None);
        assert!(!clone.is_present(ClientVersion::V1_12));
    }

    #[test]
    fn test_identity_is_the_key() {
        let a = entry();
        let b = entry();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_detached_entry() {
        let data = EntryData::detached("living_entity", "entity_type");
        assert_eq!(data.identifier(), &Identifier::minecraft("living_entity"));
        assert_eq!(data.registry_name(), "entity_type");
        assert!(data.eras().is_empty());
        assert_eq!(data.id(ClientVersion::latest()), None);
    }
}
