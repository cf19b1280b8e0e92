//! Item stack slot codec
//!
//! # Format
//! | Versions         | Layout                                                  |
//! |------------------|---------------------------------------------------------|
//! | < 1.13           | `i16` item (-1 = empty), `i8` count, `i16` damage, NBT  |
//! | 1.13 ..< 1.13.2  | `i16` item (-1 = empty), `i8` count, NBT                |
//! | 1.13.2 ..< 1.20.5| `bool` present, var-int item, `i8` count, NBT           |
//! | >= 1.20.5        | var-int count (0 = empty), var-int item, component patch |
//!
//! Component patches are not modelled; only empty patches are accepted.

use packetmap_core::{ClientVersion, ProtocolError, Result};
use packetmap_protocol::{Compound, WireCursor};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemStack {
    pub item: i32,
    pub count: i32,
    /// Only carried before 1.13
    pub damage: i16,
    pub nbt: Option<Compound>,
}

impl ItemStack {
    pub fn new(item: i32, count: i32) -> Self {
        Self {
            item,
            count,
            ..Self::default()
        }
    }

    /// Tree form: `{id: int, count: int}`
    pub fn decode(tag: &Compound) -> Result<Self> {
        Ok(Self::new(tag.require_int("id")?, tag.require_int("count")?))
    }

    pub fn encode(&self, tag: &mut Compound) {
        tag.put_int("id", self.item);
        tag.put_int("count", self.count);
    }
}

fn slot_count(stack: &ItemStack) -> Result<i8> {
    i8::try_from(stack.count)
        .map_err(|_| ProtocolError::InvalidData(format!("Item count {} does not fit a byte", stack.count)))
}

pub fn read_item_stack(cursor: &mut WireCursor) -> Result<Option<ItemStack>> {
    let version = cursor.version();
    if version.is_older_than(ClientVersion::V1_13_2) {
        let item = cursor.read_i16()?;
        if item < 0 {
            return Ok(None);
        }
        let count = cursor.read_i8()?;
        let damage = if version.is_older_than(ClientVersion::V1_13) {
            cursor.read_i16()?
        } else {
            0
        };
        Ok(Some(ItemStack {
            item: i32::from(item),
            count: i32::from(count),
            damage,
            nbt: cursor.read_nbt_compound()?,
        }))
    } else if version.is_older_than(ClientVersion::V1_20_5) {
        if !cursor.read_bool()? {
            return Ok(None);
        }
        let item = cursor.read_var_int()?;
        let count = cursor.read_i8()?;
        Ok(Some(ItemStack {
            item,
            count: i32::from(count),
            damage: 0,
            nbt: cursor.read_nbt_compound()?,
        }))
    } else {
        let count = cursor.read_var_int()?;
        if count <= 0 {
            return Ok(None);
        }
        let item = cursor.read_var_int()?;
        let added = cursor.read_var_int()?;
        let removed = cursor.read_var_int()?;
        if added != 0 || removed != 0 {
            return Err(ProtocolError::UnsupportedPayload(
                "Item component patches are not supported".into(),
            ));
        }
        Ok(Some(ItemStack::new(item, count)))
    }
}

pub fn write_item_stack(cursor: &mut WireCursor, stack: Option<&ItemStack>) -> Result<()> {
    let version = cursor.version();
    if version.is_older_than(ClientVersion::V1_13_2) {
        let Some(stack) = stack else {
            cursor.write_i16(-1);
            return Ok(());
        };
        let item = i16::try_from(stack.item)
            .map_err(|_| ProtocolError::InvalidData(format!("Item id {} out of range", stack.item)))?;
        let count = slot_count(stack)?;
        cursor.write_i16(item);
        cursor.write_i8(count);
        if version.is_older_than(ClientVersion::V1_13) {
            cursor.write_i16(stack.damage);
        }
        cursor.write_nbt(stack.nbt.clone().map(Into::into).as_ref())
    } else if version.is_older_than(ClientVersion::V1_20_5) {
        cursor.write_optional(stack, |cursor, stack| {
            let count = slot_count(stack)?;
            cursor.write_var_int(stack.item);
            cursor.write_i8(count);
            cursor.write_nbt(stack.nbt.clone().map(Into::into).as_ref())
        })
    } else {
        match stack {
            Some(stack) if stack.count > 0 => {
                if stack.nbt.is_some() {
                    return Err(ProtocolError::UnsupportedPayload(
                        "Item NBT is replaced by components from 1.20.5".into(),
                    ));
                }
                cursor.write_var_int(stack.count);
                cursor.write_var_int(stack.item);
                cursor.write_var_int(0);
                cursor.write_var_int(0);
            }
            _ => cursor.write_var_int(0),
        }
        Ok(())
    }
}
