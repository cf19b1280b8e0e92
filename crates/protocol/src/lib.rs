//! # packetmap Protocol Library
//!
//! Version-sensitive wire primitives for the game protocol. Nothing here knows
//! about registries or messages; it only knows how values are laid out on the
//! wire for a given [`ClientVersion`](packetmap_core::ClientVersion).
//!
//! ## Architecture
//!
//! ### 1. Codecs Layer ([`codecs`])
//! Free functions over [`bytes::BytesMut`]:
//! - VarInt / VarLong: 7-bit groups, little-endian, at most 5 / 10 bytes
//! - String: var-int byte length, UTF-8, capped in UTF-16 code units
//! - Byte array: var-int length, raw bytes
//! - UUID: two big-endian `u64`
//!
//! ### 2. Cursor ([`cursor`])
//! [`WireCursor`] binds a buffer to the negotiated version and adds framing:
//! optionals, lists, maps and identifiers.
//!
//! ### 3. Version-dependent layouts
//! - [`position`]: block position packing (int triple, legacy, modern)
//! - [`nbt`]: NBT tree format and its root framing per era
//! - [`component`]: text components as JSON or NBT
//!
//! ### 4. Compression ([`compression`])
//! Gzip and zlib via `flate2`, used by the oldest NBT framing and by mapping
//! bundles.
//!
//! ## Usage Example
//!
//! ```rust
//! use packetmap_core::{BlockPosition, ClientVersion};
//! use packetmap_protocol::WireCursor;
//!
//! let mut cursor = WireCursor::new(ClientVersion::V1_20_5);
//! cursor.write_var_int(300);
//! cursor.write_block_position(BlockPosition::new(100, 64, -200)).unwrap();
//!
//! assert_eq!(cursor.read_var_int().unwrap(), 300);
//! assert_eq!(cursor.read_block_position().unwrap(), BlockPosition::new(100, 64, -200));
//! ```

pub mod codecs;
pub mod component;
pub mod compression;
pub mod cursor;
pub mod nbt;
pub mod position;

// Re-export commonly used items
pub use codecs::*;
pub use component::*;
pub use compression::*;
pub use cursor::*;
pub use nbt::{Compound, Tag};
pub use position::*;
