//! Thin wrapper around the `xxhash-rust` crate providing the XXH32 API used
//! by the rest of this crate.
//!
//! Only XXH32 is needed: the frame layer uses it exclusively for the
//! single-byte header checksum.

/// One-shot XXH32 hash of `data` with the given `seed`.
#[inline]
pub fn xxh32_oneshot(data: &[u8], seed: u32) -> u32 {
    xxhash_rust::xxh32::xxh32(data, seed)
}
