//! Subcommand implementations
//!
//! Each command renders its report as lines so `main` only prints them.

use anyhow::{anyhow, bail, Context, Result};
use packetmap_core::{ClientVersion, Identifier};
use packetmap_protocol::{PositionPacking, WireCursor};
use packetmap_registry::{EntryData, MappedEntity, RegistryView};
use packetmap_types::{BookEdit, Catalog, EntityDataValue};

fn registry<'a>(catalog: &'a Catalog, name: &str) -> Result<&'a dyn RegistryView> {
    catalog
        .registry(name)
        .ok_or_else(|| anyhow!("Unknown registry '{}'", name))
}

fn describe(data: &EntryData) -> String {
    let eras = data.eras();
    if eras.is_empty() {
        return format!("{} (ordinal {})", data.identifier(), data.ordinal());
    }
    let eras: Vec<String> = eras.iter().map(ToString::to_string).collect();
    format!("{} [{}]", data.identifier(), eras.join(", "))
}

pub fn versions() -> Vec<String> {
    ClientVersion::ALL
        .iter()
        .map(|version| format!("{:<8} protocol {}", version.to_string(), version.protocol_version()))
        .collect()
}

pub fn registries(catalog: &Catalog) -> Vec<String> {
    catalog
        .registries()
        .into_iter()
        .map(|registry| format!("{:<24} {} entries", registry.name(), registry.len()))
        .collect()
}

/// Wire ID to identifier
pub fn resolve(catalog: &Catalog, name: &str, id: i32, version: ClientVersion) -> Result<String> {
    let data = registry(catalog, name)?.data_by_id(version, id)?;
    Ok(format!("{} -> {}", id, data.identifier()))
}

/// Identifier to wire ID, with its era history
pub fn lookup(catalog: &Catalog, name: &str, identifier: &str, version: ClientVersion) -> Result<Vec<String>> {
    let registry = registry(catalog, name)?;
    let data = registry.data_by_name(&Identifier::parse(identifier))?;
    let id = match registry.id_of_data(data, version) {
        Some(id) => id.to_string(),
        None => format!("absent in {}", version),
    };
    Ok(vec![describe(data), format!("{} -> {}", data.identifier(), id)])
}

/// Every entry present at `version`, ordered by ID
pub fn dump(catalog: &Catalog, name: &str, version: ClientVersion) -> Result<Vec<String>> {
    let registry = registry(catalog, name)?;
    let mut present: Vec<(i32, &EntryData)> = registry
        .entry_data()
        .into_iter()
        .filter_map(|data| registry.id_of_data(data, version).map(|id| (id, data)))
        .collect();
    present.sort_by_key(|(id, _)| *id);
    Ok(present
        .into_iter()
        .map(|(id, data)| format!("{:>4} {}", id, data.identifier()))
        .collect())
}

pub fn decode_position(raw: i64, version: ClientVersion) -> String {
    let packing = PositionPacking::for_version(version);
    let pos = packing.unpack(raw);
    format!("{:?} ({:?}) -> {} {} {}", raw, packing, pos.x, pos.y, pos.z)
}

/// Names for values that hold registry IDs
fn annotate(catalog: &Catalog, value: &EntityDataValue, version: ClientVersion) -> Option<String> {
    match value {
        EntityDataValue::VillagerData(data) => {
            let kind = data.villager_type(catalog.villager_types(), version).ok()?;
            let profession = data.profession(catalog.villager_professions(), version).ok()?;
            Some(format!("{} {}", kind.name(), profession.name()))
        }
        EntityDataValue::WolfVariant(id) => {
            let variant = catalog.wolf_variants().registry().get_by_id(version, *id).ok()?;
            Some(variant.name().to_string())
        }
        _ => None,
    }
}

pub fn decode_metadata(catalog: &Catalog, hex: &str, version: ClientVersion) -> Result<Vec<String>> {
    let bytes = parse_hex(hex)?;
    let mut cursor = WireCursor::from_slice(&bytes, version);
    let items = packetmap_types::read_entity_metadata(&mut cursor)?;
    let mut lines: Vec<String> = items
        .iter()
        .map(|item| {
            let line = format!("{:>3} {:<20} {:?}", item.index, item.value.type_name(), item.value);
            match annotate(catalog, &item.value, version) {
                Some(names) => format!("{} ({})", line, names),
                None => line,
            }
        })
        .collect();
    push_trailing(&mut lines, &mut cursor);
    Ok(lines)
}

/// Decode a hex book edit payload
pub fn decode_book(hex: &str, version: ClientVersion) -> Result<Vec<String>> {
    let bytes = parse_hex(hex)?;
    let mut cursor = WireCursor::from_slice(&bytes, version);
    let mut lines = match packetmap_types::read_book_edit(&mut cursor)? {
        BookEdit::Pages { slot, pages, title } => {
            let mut lines = vec![format!("slot {}, {} pages", slot, pages.len())];
            if let Some(title) = title {
                lines.push(format!("signed as {:?}", title));
            }
            lines.extend(
                pages
                    .iter()
                    .enumerate()
                    .map(|(index, page)| format!("{:>3} {:?}", index + 1, page)),
            );
            lines
        }
        BookEdit::Item { item, signing, slot } => {
            vec![format!("slot {}, signing {}, item {:?}", slot, signing, item)]
        }
    };
    push_trailing(&mut lines, &mut cursor);
    Ok(lines)
}

fn push_trailing(lines: &mut Vec<String>, cursor: &mut WireCursor) {
    let trailing = cursor.read_remaining();
    if !trailing.is_empty() {
        let hex: Vec<String> = trailing.iter().map(|byte| format!("{:02x}", byte)).collect();
        lines.push(format!("{} trailing bytes: {}", trailing.len(), hex.join(" ")));
    }
}

/// Accepts whitespace and an optional `0x` prefix
pub fn parse_hex(hex: &str) -> Result<Vec<u8>> {
    let digits: String = hex
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if !digits.is_ascii() {
        bail!("Hex input must be ASCII");
    }
    if digits.len() % 2 != 0 {
        bail!("Odd number of hex digits");
    }
    digits
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let pair = String::from_utf8_lossy(pair);
            u8::from_str_radix(&pair, 16).with_context(|| format!("Invalid hex byte '{}'", pair))
        })
        .collect()
}

/// Decimal, or hex with a `0x` prefix
pub fn parse_long(value: &str) -> Result<i64> {
    match value.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16)
            .map(|raw| raw as i64)
            .with_context(|| format!("Invalid hex value '{}'", value)),
        None => value
            .parse()
            .with_context(|| format!("Invalid integer '{}'", value)),
    }
}
