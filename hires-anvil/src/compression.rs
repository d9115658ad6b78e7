//! Chunk payload compression.

use std::io::{Read, Write};

use flate2::Compression as FlateLevel;
use flate2::write::{GzEncoder, ZlibEncoder};

/// Compression types used in the Anvil format.
pub const GZIP: u8 = 1;
pub const ZLIB: u8 = 2;
pub const NONE: u8 = 3;
pub const LZ4: u8 = 4;

/// Set on the compression tag when the payload lives in a `.mcc` file.
pub const EXTERNAL_FLAG: u8 = 0x80;

/// Decompress a chunk payload.
/// Supports GZip (1), ZLib (2), None (3), and LZ4 (4).
pub fn decompress(compression_type: u8, data: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut decompressed = Vec::new();
    match compression_type {
        ZLIB => {
            flate2::read::ZlibDecoder::new(data).read_to_end(&mut decompressed)?;
        }
        GZIP => {
            flate2::read::GzDecoder::new(data).read_to_end(&mut decompressed)?;
        }
        NONE => decompressed.extend_from_slice(data),
        LZ4 => {
            lz4_java_wrc::Lz4BlockInput::new(data).read_to_end(&mut decompressed)?;
        }
        _ => anyhow::bail!("Unknown compression type: {}", compression_type),
    }
    Ok(decompressed)
}

/// Compress a payload. LZ4 is read-only.
pub fn compress(compression_type: u8, data: &[u8]) -> anyhow::Result<Vec<u8>> {
    match compression_type {
        ZLIB => {
            let mut encoder = ZlibEncoder::new(Vec::new(), FlateLevel::default());
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }
        GZIP => {
            let mut encoder = GzEncoder::new(Vec::new(), FlateLevel::default());
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }
        NONE => Ok(data.to_vec()),
        _ => anyhow::bail!("Cannot compress with type: {}", compression_type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        for tag in [GZIP, ZLIB, NONE] {
            let compressed = compress(tag, &data).unwrap();
            assert_eq!(decompress(tag, &compressed).unwrap(), data);
        }
    }

    #[test]
    fn test_unknown_type() {
        assert!(decompress(9, &[1, 2, 3]).is_err());
        assert!(compress(LZ4, &[1, 2, 3]).is_err());
    }

    #[test]
    fn test_corrupt_zlib() {
        assert!(decompress(ZLIB, &[0xde, 0xad, 0xbe, 0xef]).is_err());
    }
}
