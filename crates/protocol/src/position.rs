//! Block position wire packing
//!
//! The packed form changed twice:
//!
//! | Versions          | Layout                                     |
//! |-------------------|--------------------------------------------|
//! | < 1.8             | three big-endian `i32` (x, y, z)           |
//! | 1.8 ..< 1.14      | one `i64`: x (26 bits) \| y (12) \| z (26) |
//! | >= 1.14           | one `i64`: x (26 bits) \| z (26) \| y (12) |
//!
//! Components are two's complement within their field, and unpacking
//! sign-extends them back.

use crate::cursor::WireCursor;
use packetmap_core::{BlockPosition, ClientVersion, ProtocolError, Result};

const XZ_BITS: u32 = 26;
const Y_BITS: u32 = 12;
const XZ_MASK: i64 = (1 << XZ_BITS) - 1;
const Y_MASK: i64 = (1 << Y_BITS) - 1;

/// Packing used for a block position on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionPacking {
    IntTriple,
    Legacy,
    Modern,
}

impl PositionPacking {
    pub fn for_version(version: ClientVersion) -> Self {
        if version.is_older_than(ClientVersion::V1_8) {
            Self::IntTriple
        } else if version.is_older_than(ClientVersion::V1_14) {
            Self::Legacy
        } else {
            Self::Modern
        }
    }

    /// Pack into a single `i64`
    ///
    /// Fails with `PositionOutOfRange` when a component does not fit its
    /// field, and with `InvalidData` for [`PositionPacking::IntTriple`],
    /// which has no packed form.
    pub fn pack(self, pos: BlockPosition) -> Result<i64> {
        let (x, y, z) = (i64::from(pos.x), i64::from(pos.y), i64::from(pos.z));
        match self {
            Self::IntTriple => Err(ProtocolError::InvalidData(
                "Int-triple positions have no packed form".into(),
            )),
            Self::Legacy => {
                check_range(pos)?;
                Ok(((x & XZ_MASK) << 38) | ((y & Y_MASK) << 26) | (z & XZ_MASK))
            }
            Self::Modern => {
                check_range(pos)?;
                Ok(((x & XZ_MASK) << 38) | ((z & XZ_MASK) << 12) | (y & Y_MASK))
            }
        }
    }

    /// Unpack a value produced by [`pack`](Self::pack)
    ///
    /// [`PositionPacking::IntTriple`] is treated like the legacy layout.
    pub fn unpack(self, raw: i64) -> BlockPosition {
        match self {
            Self::IntTriple | Self::Legacy => BlockPosition::new(
                (raw >> 38) as i32,
                ((raw << 26) >> 52) as i32,
                ((raw << 38) >> 38) as i32,
            ),
            Self::Modern => BlockPosition::new(
                (raw >> 38) as i32,
                ((raw << 52) >> 52) as i32,
                ((raw << 26) >> 38) as i32,
            ),
        }
    }
}

fn check_range(pos: BlockPosition) -> Result<()> {
    let xz = -(1 << (XZ_BITS - 1))..(1 << (XZ_BITS - 1));
    let y = -(1 << (Y_BITS - 1))..(1 << (Y_BITS - 1));
    for (axis, value, range) in [('x', pos.x, &xz), ('y', pos.y, &y), ('z', pos.z, &xz)] {
        if !range.contains(&value) {
            return Err(ProtocolError::PositionOutOfRange { axis, value });
        }
    }
    Ok(())
}

impl WireCursor {
    pub fn read_block_position(&mut self) -> Result<BlockPosition> {
        match PositionPacking::for_version(self.version()) {
            PositionPacking::IntTriple => {
                let x = self.read_i32()?;
                let y = self.read_i32()?;
                let z = self.read_i32()?;
                Ok(BlockPosition::new(x, y, z))
            }
            packing => Ok(packing.unpack(self.read_i64()?)),
        }
    }

    pub fn write_block_position(&mut self, pos: BlockPosition) -> Result<()> {
        match PositionPacking::for_version(self.version()) {
            PositionPacking::IntTriple => {
                self.write_i32(pos.x);
                self.write_i32(pos.y);
                self.write_i32(pos.z);
            }
            packing => self.write_i64(packing.pack(pos)?),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_packing_per_version() {
        assert_eq!(PositionPacking::for_version(ClientVersion::V1_7_10), PositionPacking::IntTriple);
        assert_eq!(PositionPacking::for_version(ClientVersion::V1_8), PositionPacking::Legacy);
        assert_eq!(PositionPacking::for_version(ClientVersion::V1_13_2), PositionPacking::Legacy);
        assert_eq!(PositionPacking::for_version(ClientVersion::V1_14), PositionPacking::Modern);
        assert_eq!(PositionPacking::for_version(ClientVersion::latest()), PositionPacking::Modern);
    }

    #[test]
    fn test_modern_bit_layout() {
        let raw = PositionPacking::Modern.pack(BlockPosition::new(1, 2, 3)).unwrap();
        assert_eq!(raw, (1 << 38) | (3 << 12) | 2);

        let raw = PositionPacking::Legacy.pack(BlockPosition::new(1, 2, 3)).unwrap();
        assert_eq!(raw, (1 << 38) | (2 << 26) | 3);
    }

    #[test]
    fn test_modern_negative_roundtrip() {
        let mut cursor = WireCursor::new(ClientVersion::V1_20_5);
        cursor.write_block_position(BlockPosition::new(100, 64, -200)).unwrap();
        assert_eq!(cursor.remaining(), 8);
        assert_eq!(cursor.read_block_position().unwrap(), BlockPosition::new(100, 64, -200));
    }

    #[test]
    fn test_int_triple_uses_twelve_bytes() {
        let mut cursor = WireCursor::new(ClientVersion::V1_7_10);
        cursor.write_block_position(BlockPosition::new(i32::MAX, -1, i32::MIN)).unwrap();
        assert_eq!(cursor.remaining(), 12);
        assert_eq!(
            cursor.read_block_position().unwrap(),
            BlockPosition::new(i32::MAX, -1, i32::MIN)
        );
    }

    #[test]
    fn test_out_of_range() {
        let mut cursor = WireCursor::new(ClientVersion::V1_16);
        assert!(matches!(
            cursor.write_block_position(BlockPosition::new(0, 2048, 0)),
            Err(ProtocolError::PositionOutOfRange { axis: 'y', value: 2048 })
        ));
        assert!(matches!(
            PositionPacking::Legacy.pack(BlockPosition::new(0, 0, 1 << 25)),
            Err(ProtocolError::PositionOutOfRange { axis: 'z', .. })
        ));
        assert!(cursor.is_empty());
    }

    proptest! {
        #[test]
        fn packed_roundtrip(
            x in -(1i32 << 25)..(1i32 << 25),
            y in -2048i32..2048,
            z in -(1i32 << 25)..(1i32 << 25),
        ) {
            let pos = BlockPosition::new(x, y, z);
            for version in [ClientVersion::V1_7_10, ClientVersion::V1_12_2, ClientVersion::V1_21_4] {
                let mut cursor = WireCursor::new(version);
                cursor.write_block_position(pos).unwrap();
                prop_assert_eq!(cursor.read_block_position().unwrap(), pos);
            }
        }
    }
}
