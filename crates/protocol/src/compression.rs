//! Compression for NBT payloads and mapping bundles

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use packetmap_core::{ProtocolError, Result};
use std::io::{Read, Write};

/// Compression method of a byte blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    None = 0,
    Zlib = 1,
    Gzip = 2,
}

impl CompressionType {
    /// Guess the method from the leading magic bytes
    pub fn detect(data: &[u8]) -> Self {
        match data {
            [0x1f, 0x8b, ..] => Self::Gzip,
            // CMF 0x78 with a valid FCHECK
            [0x78, flg, ..] if (0x7800u16 | u16::from(*flg)) % 31 == 0 => Self::Zlib,
            _ => Self::None,
        }
    }
}

/// Compress data using the specified method
pub fn compress(data: &[u8], method: CompressionType) -> Result<Vec<u8>> {
    match method {
        CompressionType::None => Ok(data.to_vec()),
        CompressionType::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }
        CompressionType::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }
    }
}

/// Decompress data using the specified method
pub fn decompress(data: &[u8], method: CompressionType) -> Result<Vec<u8>> {
    let mut decompressed = Vec::new();
    match method {
        CompressionType::None => decompressed.extend_from_slice(data),
        CompressionType::Zlib => {
            ZlibDecoder::new(data).read_to_end(&mut decompressed)?;
        }
        CompressionType::Gzip => {
            GzDecoder::new(data).read_to_end(&mut decompressed)?;
        }
    }
    Ok(decompressed)
}

/// Decompress, failing with `InvalidData` once the output passes `limit` bytes
pub fn decompress_bounded(data: &[u8], method: CompressionType, limit: usize) -> Result<Vec<u8>> {
    let mut decompressed = Vec::new();
    let cap = limit as u64 + 1;
    match method {
        CompressionType::None => decompressed.extend_from_slice(data),
        CompressionType::Zlib => {
            ZlibDecoder::new(data).take(cap).read_to_end(&mut decompressed)?;
        }
        CompressionType::Gzip => {
            GzDecoder::new(data).take(cap).read_to_end(&mut decompressed)?;
        }
    }
    if decompressed.len() > limit {
        return Err(ProtocolError::InvalidData(format!(
            "Decompressed data exceeds {} bytes",
            limit
        )));
    }
    Ok(decompressed)
}
