//! Stream plumbing between the CLI and the frame layer.
//!
//! Sources and sinks are plain `Read`/`Write` trait objects with three
//! concrete families behind them:
//!
//! - files (buffered), selected by path;
//! - the `stdin` / `stdout` sentinels;
//! - in-memory buffers and the [`CompareWriter`] sink, which verifies
//!   everything written against an expected byte sequence instead of
//!   storing it (used by `-c` verification, the self-test, and the
//!   decompression benchmark).
//!
//! End-of-stream and error state travel through `io::Result`; closing is
//! dropping.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use crate::block::types::HISTORY_SIZE;
use crate::error::{Lz4OptError, Result};

/// Sentinel path: read from standard input.
pub const STDIN_MARK: &str = "stdin";

/// Sentinel path: write to standard output.
pub const STDOUT_MARK: &str = "stdout";

/// Opens a source for reading: the `stdin` sentinel or a buffered file.
pub fn open_src_file(path: &str) -> Result<Box<dyn Read>> {
    if path == STDIN_MARK {
        return Ok(Box::new(io::stdin()));
    }
    let f = File::open(path).map_err(Lz4OptError::SourceRead)?;
    Ok(Box::new(BufReader::new(f)))
}

/// Opens a destination for writing: the `stdout` sentinel or a buffered
/// file (created or truncated).
pub fn open_dst_file(path: &str) -> Result<Box<dyn Write>> {
    if path == STDOUT_MARK {
        return Ok(Box::new(io::stdout()));
    }
    let f = File::create(path).map_err(Lz4OptError::SinkWrite)?;
    Ok(Box::new(BufWriter::new(f)))
}

/// Loads the dictionary file, keeping its trailing [`HISTORY_SIZE`] bytes.
pub fn load_dictionary(path: &str) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    File::open(path)
        .and_then(|mut f| f.read_to_end(&mut data))
        .map_err(Lz4OptError::Dictionary)?;
    if data.len() > HISTORY_SIZE {
        data.drain(..data.len() - HISTORY_SIZE);
    }
    Ok(data)
}

/// A write sink that compares incoming bytes against an expected sequence.
///
/// Mismatches and overruns are recorded, not raised, so a verification pass
/// can drain its input and report one result at the end via [`Self::ok`].
pub struct CompareWriter<'a> {
    expected: &'a [u8],
    pos: usize,
    /// Offset of the first diverging byte, if any.
    pub first_mismatch: Option<usize>,
}

impl<'a> CompareWriter<'a> {
    pub fn new(expected: &'a [u8]) -> Self {
        CompareWriter {
            expected,
            pos: 0,
            first_mismatch: None,
        }
    }

    /// Bytes successfully compared so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// True when everything written matched and the whole expected sequence
    /// was covered.
    pub fn ok(&self) -> bool {
        self.first_mismatch.is_none() && self.pos == self.expected.len()
    }
}

impl Write for CompareWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.first_mismatch.is_none() {
            let remaining = &self.expected[self.pos.min(self.expected.len())..];
            if buf.len() > remaining.len() {
                self.first_mismatch = Some(self.pos + remaining.len());
            } else if let Some(i) = buf.iter().zip(remaining).position(|(a, b)| a != b) {
                self.first_mismatch = Some(self.pos + i);
            }
        }
        self.pos += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_writer_accepts_exact_stream() {
        let mut w = CompareWriter::new(b"expected bytes");
        w.write_all(b"expected ").unwrap();
        w.write_all(b"bytes").unwrap();
        assert!(w.ok());
    }

    #[test]
    fn compare_writer_flags_divergence() {
        let mut w = CompareWriter::new(b"expected");
        w.write_all(b"exPected").unwrap();
        assert!(!w.ok());
        assert_eq!(w.first_mismatch, Some(2));
    }

    #[test]
    fn compare_writer_flags_short_stream() {
        let mut w = CompareWriter::new(b"expected");
        w.write_all(b"exp").unwrap();
        assert!(!w.ok());
        assert_eq!(w.first_mismatch, None);
        assert_eq!(w.position(), 3);
    }

    #[test]
    fn compare_writer_flags_overrun() {
        let mut w = CompareWriter::new(b"abc");
        w.write_all(b"abcd").unwrap();
        assert!(!w.ok());
        assert_eq!(w.first_mismatch, Some(3));
    }

    #[test]
    fn dictionary_keeps_trailing_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.bin");
        let data: Vec<u8> = (0..HISTORY_SIZE + 100).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &data).unwrap();
        let loaded = load_dictionary(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.len(), HISTORY_SIZE);
        assert_eq!(loaded[..], data[100..]);
    }
}
