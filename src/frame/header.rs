//! Frame-header bytes, block-size codes, and the header checksum.
//!
//! A modern stream header is 7 bytes: the magic, a flag byte (format version
//! `01` in the top bits, the block-independence bit at `0x20`, everything
//! else zero — no checksums, no content size, no dictionary id), a
//! block-maximum byte carrying the block-size code in its high nibble, and a
//! single checksum byte derived from XXH32 over the two descriptor bytes.
//!
//! Legacy streams carry only their magic: 8 MiB independent blocks, no
//! descriptor, no end mark.

use crate::block::types::KB;
use crate::error::{Lz4OptError, Result};
use crate::xxhash::xxh32_oneshot;

/// Modern frame magic, little-endian `0x184D2204`.
pub const FRAME_MAGIC: [u8; 4] = [0x04, 0x22, 0x4D, 0x18];

/// Legacy frame magic, little-endian `0x184C2102`.
pub const LEGACY_MAGIC: [u8; 4] = [0x02, 0x21, 0x4C, 0x18];

/// Version bits `01` in the flag byte's top two bits.
pub const FLG_VERSION: u8 = 0b0100_0000;

/// Flag bit: blocks are independent (no inter-block back-references).
pub const FLG_BLOCK_INDEPENDENCE: u8 = 0x20;

/// High bit of a block prefix: the block is stored uncompressed.
pub const BLOCK_UNCOMPRESSED_FLAG: u32 = 0x8000_0000;

/// Block prefix value marking the end of the stream.
pub const END_MARK: u32 = 0;

/// Smallest and largest valid block-size codes (64 KiB .. 4 MiB).
pub const MIN_BLOCK_CODE: u8 = 4;
pub const MAX_BLOCK_CODE: u8 = 7;

/// Default block-size code when the user does not pick one.
pub const DEFAULT_BLOCK_CODE: u8 = 7;

/// Size of the modern stream header in bytes.
pub const FRAME_HEADER_SIZE: usize = 7;

/// Maps a block-size code (4..=7) to its block size in bytes.
pub fn block_size_from_code(code: u8) -> Result<usize> {
    match code {
        4 => Ok(64 * KB),
        5 => Ok(256 * KB),
        6 => Ok(1024 * KB),
        7 => Ok(4096 * KB),
        _ => Err(Lz4OptError::Format("invalid block size code")),
    }
}

/// Picks the smallest code (≥ 4, capped at `requested`) whose block size
/// still covers `src_size`: compressing an 80 KB input under a 4 MiB default
/// effectively downgrades to 256 KiB blocks.
pub fn optimal_block_code(requested: u8, src_size: usize) -> u8 {
    let mut code = MIN_BLOCK_CODE;
    while code < requested {
        match block_size_from_code(code) {
            Ok(size) if src_size <= size => return code,
            _ => code += 1,
        }
    }
    requested
}

/// The single-byte header checksum: `(xxh32(descriptor, 0) >> 8) & 0xff`.
#[inline]
pub fn header_checksum(descriptor: &[u8]) -> u8 {
    ((xxh32_oneshot(descriptor, 0) >> 8) & 0xFF) as u8
}

/// Assembles the 7-byte modern stream header.
pub fn write_frame_header(independent: bool, block_code: u8) -> [u8; FRAME_HEADER_SIZE] {
    debug_assert!((MIN_BLOCK_CODE..=MAX_BLOCK_CODE).contains(&block_code));
    let flg = FLG_VERSION | if independent { FLG_BLOCK_INDEPENDENCE } else { 0 };
    let bd = block_code << 4;
    let hc = header_checksum(&[flg, bd]);
    [
        FRAME_MAGIC[0],
        FRAME_MAGIC[1],
        FRAME_MAGIC[2],
        FRAME_MAGIC[3],
        flg,
        bd,
        hc,
    ]
}

/// Validates the descriptor bytes of a modern header (magic already
/// consumed). Returns `(independent, block_code)`.
pub fn parse_frame_descriptor(descriptor: &[u8; 3]) -> Result<(bool, u8)> {
    let [flg, bd, hc] = *descriptor;
    if header_checksum(&[flg, bd]) != hc {
        return Err(Lz4OptError::Checksum);
    }
    // Version must be 01; every feature bit this decoder does not implement
    // must be clear.
    if flg & !FLG_BLOCK_INDEPENDENCE != FLG_VERSION {
        return Err(Lz4OptError::Format("unsupported frame flags"));
    }
    if bd & 0x0F != 0 {
        return Err(Lz4OptError::Format("reserved block-descriptor bits set"));
    }
    let code = bd >> 4;
    block_size_from_code(code)?;
    Ok((flg & FLG_BLOCK_INDEPENDENCE != 0, code))
}

/// Reads a little-endian `u32` from `src` at `offset`.
#[inline]
pub fn read_le32(src: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        src[offset],
        src[offset + 1],
        src[offset + 2],
        src[offset + 3],
    ])
}

/// Writes a little-endian `u32` into `dst` at `offset`.
#[inline]
pub fn write_le32(dst: &mut [u8], offset: usize, value: u32) {
    dst[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
