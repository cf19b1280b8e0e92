//! Book edit payload
//!
//! # Format
//! | Versions          | Layout                                                   |
//! |-------------------|----------------------------------------------------------|
//! | < 1.17.1          | item slot, `bool` signing, var-int slot                   |
//! | >= 1.17.1         | var-int slot, page list, optional title                  |
//!
//! Page and title lengths are capped per version: 200 pages of 8192
//! characters with a 128 character title, then 100 pages of 1024 characters
//! with a 32 character title from 1.21.2.

use crate::item::{read_item_stack, write_item_stack, ItemStack};
use packetmap_core::{ClientVersion, ProtocolError, Result};
use packetmap_protocol::WireCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookLimits {
    pub pages: usize,
    pub page_chars: usize,
    pub title_chars: usize,
}

impl BookLimits {
    pub const LEGACY: BookLimits = BookLimits {
        pages: 200,
        page_chars: 8192,
        title_chars: 128,
    };

    pub const MODERN: BookLimits = BookLimits {
        pages: 100,
        page_chars: 1024,
        title_chars: 32,
    };

    pub fn for_version(version: ClientVersion) -> Self {
        if version.is_newer_than_or_equals(ClientVersion::V1_21_2) {
            Self::MODERN
        } else {
            Self::LEGACY
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookEdit {
    /// From 1.17.1
    Pages {
        slot: i32,
        pages: Vec<String>,
        /// Present when the book is being signed
        title: Option<String>,
    },
    /// Before 1.17.1 the whole book item was sent
    Item {
        item: Option<ItemStack>,
        signing: bool,
        slot: i32,
    },
}

fn sends_pages(version: ClientVersion) -> bool {
    version.is_newer_than_or_equals(ClientVersion::V1_17_1)
}

pub fn read_book_edit(cursor: &mut WireCursor) -> Result<BookEdit> {
    let version = cursor.version();
    if !sends_pages(version) {
        let item = read_item_stack(cursor)?;
        let signing = cursor.read_bool()?;
        let slot = cursor.read_var_int()?;
        return Ok(BookEdit::Item { item, signing, slot });
    }

    let limits = BookLimits::for_version(version);
    let slot = cursor.read_var_int()?;
    let pages = cursor.read_list_bounded(limits.pages, |c| c.read_string_bounded(limits.page_chars))?;
    let title = cursor.read_optional(|c| c.read_string_bounded(limits.title_chars))?;
    Ok(BookEdit::Pages { slot, pages, title })
}

pub fn write_book_edit(cursor: &mut WireCursor, edit: &BookEdit) -> Result<()> {
    let version = cursor.version();
    match edit {
        BookEdit::Pages { slot, pages, title } if sends_pages(version) => {
            let limits = BookLimits::for_version(version);
            if pages.len() > limits.pages {
                return Err(ProtocolError::CollectionTooLarge {
                    length: pages.len(),
                    max: limits.pages,
                });
            }
            cursor.write_var_int(*slot);
            cursor.write_list(pages, |c, page| c.write_string_bounded(page, limits.page_chars))?;
            cursor.write_optional(title.as_ref(), |c, title| {
                c.write_string_bounded(title, limits.title_chars)
            })
        }
        BookEdit::Item { item, signing, slot } if !sends_pages(version) => {
            write_item_stack(cursor, item.as_ref())?;
            cursor.write_bool(*signing);
            cursor.write_var_int(*slot);
            Ok(())
        }
        other => Err(ProtocolError::InvalidData(format!(
            "Book edit {:?} cannot be sent to {}",
            other, version
        ))),
    }
}
