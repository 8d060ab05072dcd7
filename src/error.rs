//! Crate-wide error taxonomy.
//!
//! One enum covers every failure the library can surface:
//! - I/O failures at the boundaries (`SourceRead`, `SinkWrite`, `Dictionary`),
//! - allocation failure during context setup (`OutOfMemory`),
//! - invariant breaches inside the compressor (`InternalCompression`),
//! - user configuration errors in raw-block mode (`RawTooLarge`,
//!   `RawIncompressible`),
//! - decoder-side stream errors (`Format`, `Checksum`,
//!   `InternalDecompression`).
//!
//! "This block is incompressible" is deliberately **not** an error: the block
//! emitter reports it as a value (`None`) and the frame layer reacts by
//! storing the block uncompressed.

use core::fmt;
use std::io;

/// Errors produced by compression, decompression, and the surrounding I/O.
#[derive(Debug)]
pub enum Lz4OptError {
    /// Reading from the input stream failed.
    SourceRead(io::Error),
    /// Writing to the output stream failed.
    SinkWrite(io::Error),
    /// The dictionary file could not be read.
    Dictionary(io::Error),
    /// Buffer allocation failed during context construction.
    OutOfMemory,
    /// The compressor violated one of its own invariants; indicates a bug.
    InternalCompression(&'static str),
    /// Raw-block mode accepts at most one 4 MiB block.
    RawTooLarge,
    /// Raw-block mode has no uncompressed fallback; the input did not shrink.
    RawIncompressible,
    /// The compressed stream is malformed.
    Format(&'static str),
    /// The frame header checksum byte does not match.
    Checksum,
    /// The decoder violated one of its own invariants; indicates a bug.
    InternalDecompression(&'static str),
}

impl fmt::Display for Lz4OptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lz4OptError::SourceRead(e) => write!(f, "error reading source: {}", e),
            Lz4OptError::SinkWrite(e) => write!(f, "error writing output: {}", e),
            Lz4OptError::Dictionary(e) => write!(f, "error reading dictionary: {}", e),
            Lz4OptError::OutOfMemory => write!(f, "out of memory"),
            Lz4OptError::InternalCompression(what) => {
                write!(f, "internal compression error: {}", what)
            }
            Lz4OptError::RawTooLarge => {
                write!(f, "raw block mode only supports inputs up to 4 MiB")
            }
            Lz4OptError::RawIncompressible => {
                write!(f, "incompressible data in raw block mode")
            }
            Lz4OptError::Format(what) => write!(f, "invalid compressed stream: {}", what),
            Lz4OptError::Checksum => write!(f, "frame header checksum mismatch"),
            Lz4OptError::InternalDecompression(what) => {
                write!(f, "internal decompression error: {}", what)
            }
        }
    }
}

impl std::error::Error for Lz4OptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Lz4OptError::SourceRead(e)
            | Lz4OptError::SinkWrite(e)
            | Lz4OptError::Dictionary(e) => Some(e),
            _ => None,
        }
    }
}

/// Crate-local result alias.
pub type Result<T> = core::result::Result<T, Lz4OptError>;
