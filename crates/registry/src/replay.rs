//! Diff replay: turns per-version diff records into per-entry era tables

use crate::bundle::{DiffOp, IdSpec, VersionDiff};
use crate::entry::{Era, EraIds};
use indexmap::IndexMap;
use packetmap_core::{ClientVersion, Identifier, ProtocolError, Result};
use std::collections::HashMap;

/// Wire name history of one continuous life of an entry
struct Track {
    name: Identifier,
    eras: Vec<Era>,
    open: Option<(ClientVersion, EraIds)>,
}

impl Track {
    fn close(&mut self, until: Option<ClientVersion>) {
        if let Some((since, ids)) = self.open.take() {
            // added and removed at the same version
            if Some(since) != until {
                self.eras.push(Era::new(since, until, ids));
            }
        }
    }
}

fn ids_of(spec: &IdSpec, name: &Identifier, version: ClientVersion) -> Result<EraIds> {
    let ids = spec.to_ids();
    if ids.is_empty() {
        return Err(ProtocolError::MappingLoad(format!(
            "{} at {}: empty id list",
            name, version
        )));
    }
    Ok(ids)
}

fn not_live(op: &str, name: &Identifier, version: ClientVersion) -> ProtocolError {
    ProtocolError::MappingLoad(format!("{} at {}: {} is not live", op, version, name))
}

/// Replay diffs in version order
///
/// Returns the era table of every entry keyed by its latest wire name, so an
/// `add` is attributed to whatever name the entry carries after all later
/// renames. A name that is removed and added again keeps a single table.
pub fn replay(diffs: &[VersionDiff]) -> Result<IndexMap<Identifier, Vec<Era>>> {
    let mut ordered: Vec<&VersionDiff> = diffs.iter().collect();
    ordered.sort_by_key(|diff| diff.version);
    for pair in ordered.windows(2) {
        if pair[0].version == pair[1].version {
            return Err(ProtocolError::MappingLoad(format!(
                "Duplicate diff for version {}",
                pair[0].version
            )));
        }
    }

    let mut tracks: Vec<Track> = Vec::new();
    let mut live: HashMap<Identifier, usize> = HashMap::new();

    for diff in ordered {
        let version = diff.version;
        for op in &diff.ops {
            match op {
                DiffOp::Add { name, id } => {
                    if live.contains_key(name) {
                        return Err(ProtocolError::MappingLoad(format!(
                            "add at {}: {} is already live",
                            version, name
                        )));
                    }
                    let ids = ids_of(id, name, version)?;
                    live.insert(name.clone(), tracks.len());
                    tracks.push(Track {
                        name: name.clone(),
                        eras: Vec::new(),
                        open: Some((version, ids)),
                    });
                }
                DiffOp::Remove { name } => {
                    let index = live
                        .remove(name)
                        .ok_or_else(|| not_live("remove", name, version))?;
                    tracks[index].close(Some(version));
                }
                DiffOp::Renumber { name, id } => {
                    let index = *live
                        .get(name)
                        .ok_or_else(|| not_live("renumber", name, version))?;
                    let ids = ids_of(id, name, version)?;
                    let track = &mut tracks[index];
                    track.close(Some(version));
                    track.open = Some((version, ids));
                }
                DiffOp::Rename { from, to } => {
                    if live.contains_key(to) {
                        return Err(ProtocolError::MappingLoad(format!(
                            "rename at {}: {} is already live",
                            version, to
                        )));
                    }
                    let index = live
                        .remove(from)
                        .ok_or_else(|| not_live("rename", from, version))?;
                    tracks[index].name = to.clone();
                    live.insert(to.clone(), index);
                }
            }
        }
    }

    let mut tables: IndexMap<Identifier, Vec<Era>> = IndexMap::new();
    for mut track in tracks {
        track.close(None);
        tables.entry(track.name).or_default().extend(track.eras);
    }
    for eras in tables.values_mut() {
        eras.sort_by_key(|era| era.since);
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn add(name: &str, id: i32) -> DiffOp {
        DiffOp::Add {
            name: name.into(),
            id: id.into(),
        }
    }

    fn remove(name: &str) -> DiffOp {
        DiffOp::Remove { name: name.into() }
    }

    fn renumber(name: &str, id: i32) -> DiffOp {
        DiffOp::Renumber {
            name: name.into(),
            id: id.into(),
        }
    }

    fn rename(from: &str, to: &str) -> DiffOp {
        DiffOp::Rename {
            from: from.into(),
            to: to.into(),
        }
    }

    #[test]
    fn test_add_renumber_remove() {
        let diffs = vec![
            VersionDiff::new(ClientVersion::V1_14, vec![renumber("a", 9)]),
            VersionDiff::new(ClientVersion::V1_13, vec![add("a", 5), add("b", 6)]),
            VersionDiff::new(ClientVersion::V1_16, vec![remove("b")]),
        ];
        let tables = replay(&diffs).unwrap();

        assert_eq!(
            tables[&Identifier::from("a")],
            vec![
                Era::new(ClientVersion::V1_13, Some(ClientVersion::V1_14), smallvec![5]),
                Era::new(ClientVersion::V1_14, None, smallvec![9]),
            ]
        );
        assert_eq!(
            tables[&Identifier::from("b")],
            vec![Era::new(ClientVersion::V1_13, Some(ClientVersion::V1_16), smallvec![6])]
        );
    }

    #[test]
    fn test_add_follows_later_renames() {
        let diffs = vec![
            VersionDiff::new(ClientVersion::V1_13, vec![add("grass", 1)]),
            VersionDiff::new(ClientVersion::V1_20_3, vec![rename("grass", "short_grass")]),
        ];
        let tables = replay(&diffs).unwrap();
        assert!(!tables.contains_key(&Identifier::from("grass")));
        assert_eq!(
            tables[&Identifier::from("short_grass")],
            vec![Era::new(ClientVersion::V1_13, None, smallvec![1])]
        );
    }

    #[test]
    fn test_removed_then_added_again() {
        let diffs = vec![
            VersionDiff::new(ClientVersion::V1_13, vec![add("a", 1)]),
            VersionDiff::new(ClientVersion::V1_14, vec![remove("a")]),
            VersionDiff::new(ClientVersion::V1_16, vec![add("a", 3)]),
        ];
        let eras = &replay(&diffs).unwrap()[&Identifier::from("a")];
        assert_eq!(eras.len(), 2);
        assert_eq!(eras[1].since, ClientVersion::V1_16);
    }

    #[test]
    fn test_malformed_sequences() {
        let cases = vec![
            vec![
                VersionDiff::new(ClientVersion::V1_13, vec![add("a", 1)]),
                VersionDiff::new(ClientVersion::V1_13, vec![add("b", 2)]),
            ],
            vec![VersionDiff::new(ClientVersion::V1_13, vec![add("a", 1), add("a", 2)])],
            vec![VersionDiff::new(ClientVersion::V1_13, vec![remove("a")])],
            vec![VersionDiff::new(ClientVersion::V1_13, vec![renumber("a", 1)])],
            vec![VersionDiff::new(ClientVersion::V1_13, vec![rename("a", "b")])],
            vec![VersionDiff::new(
                ClientVersion::V1_13,
                vec![DiffOp::Add {
                    name: "a".into(),
                    id: IdSpec::Many(Vec::new()),
                }],
            )],
        ];
        for diffs in cases {
            assert!(matches!(replay(&diffs), Err(ProtocolError::MappingLoad(_))), "{:?}", diffs);
        }
    }

    #[test]
    fn test_same_version_add_remove_leaves_no_era() {
        let diffs = vec![VersionDiff::new(ClientVersion::V1_13, vec![add("a", 1), remove("a")])];
        assert!(replay(&diffs).unwrap()[&Identifier::from("a")].is_empty());
    }
}
