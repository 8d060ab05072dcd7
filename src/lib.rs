// lz4opt — optimal LZ4 block compression

pub mod bench;
pub mod block;
pub mod cli;
pub mod error;
pub mod frame;
pub mod io;
pub mod selftest;
pub mod timefn;
pub mod xxhash;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the most common API entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// Crate-wide error taxonomy.
pub use error::Lz4OptError;

/// Reusable block compression context (owns all large buffers).
pub use block::compress::CompressCtx;

/// Worst-case compressed size for an `n`-byte block.
pub use block::compress::compress_bound;

/// Bounds-checked single-block decoder (verification decoder).
pub use block::decompress::decompress_block;

/// Parser bias: minimal size vs. decoder-friendly commands.
pub use block::types::FavorMode;

/// Frame writer options resolved by the CLI or a library caller.
pub use frame::CompressOptions;

/// One-shot stream compression (modern frame, legacy frame, or raw block).
pub use frame::compress::compress_stream;

/// One-shot stream decompression with automatic format detection.
pub use frame::decompress::decompress_stream;

// ─────────────────────────────────────────────────────────────────────────────
// Version API
// ─────────────────────────────────────────────────────────────────────────────

pub const VERSION_MAJOR: i32 = 0;
pub const VERSION_MINOR: i32 = 9;
pub const VERSION_RELEASE: i32 = 0;
pub const VERSION_STRING: &str = "0.9.0";

/// Returns the library version string.
pub fn version_string() -> &'static str {
    VERSION_STRING
}
