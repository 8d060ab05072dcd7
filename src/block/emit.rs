//! Serialises a finished parse into LZ4 block bytes.
//!
//! Each command is `token | varlen-literals | literals | offset16 |
//! varlen-match`; the final command carries only literals. Literal-run and
//! match-length fields saturate their token nibble at 15 and continue in
//! extra bytes of 255 plus a remainder.
//!
//! The emitter never writes past the caller's buffer: running out of room is
//! the "incompressible" signal (`Ok(None)`), not an error. A parse that
//! violates the format invariants (offset out of range, a fused sentinel at
//! a command boundary) is a compressor bug and surfaces as
//! `InternalCompression`.

use crate::block::types::{ParseMatch, ML_MASK, MINMATCH, RUN_MASK};
use crate::error::{Lz4OptError, Result};

struct ByteSink<'a> {
    out: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteSink<'a> {
    #[inline]
    fn put(&mut self, b: u8) -> bool {
        if self.pos >= self.out.len() {
            return false;
        }
        self.out[self.pos] = b;
        self.pos += 1;
        true
    }

    #[inline]
    fn put_slice(&mut self, s: &[u8]) -> bool {
        if self.pos + s.len() > self.out.len() {
            return false;
        }
        self.out[self.pos..self.pos + s.len()].copy_from_slice(s);
        self.pos += s.len();
        true
    }

    /// Extra length bytes for a field that saturated its token nibble:
    /// 255-markers followed by the remainder.
    #[inline]
    fn put_varlen(&mut self, mut v: usize) -> bool {
        while v >= 255 {
            if !self.put(255) {
                return false;
            }
            v -= 255;
        }
        self.put(v as u8)
    }
}

/// Walks the parse over `[start, end)` and emits block bytes into `out`.
///
/// Returns `Ok(Some(size))`, or `Ok(None)` when `out` is too small (the
/// block is incompressible at this output budget). With `raw_sentinel`, a
/// two-byte zero offset trailer is appended after the final literals.
pub fn emit_block(
    window: &[u8],
    matches: &[ParseMatch],
    start: usize,
    end: usize,
    out: &mut [u8],
    raw_sentinel: bool,
) -> Result<Option<usize>> {
    let mut sink = ByteSink { out, pos: 0 };
    let mut p = start;

    loop {
        // Gather the literal run in front of the next match.
        let run_start = p;
        while p < end && !matches[p].is_match() {
            if matches[p].length < 0 {
                return Err(Lz4OptError::InternalCompression(
                    "fused-match sentinel at a command boundary",
                ));
            }
            p += 1;
        }
        let run = p - run_start;

        if p >= end {
            // Final command: literals only.
            let token = (run.min(RUN_MASK as usize) as u8) << 4;
            if !sink.put(token) {
                return Ok(None);
            }
            if run >= RUN_MASK as usize && !sink.put_varlen(run - RUN_MASK as usize) {
                return Ok(None);
            }
            if !sink.put_slice(&window[run_start..end]) {
                return Ok(None);
            }
            if raw_sentinel && !sink.put_slice(&[0, 0]) {
                return Ok(None);
            }
            return Ok(Some(sink.pos));
        }

        let m = matches[p];
        let mlen = m.length as usize;
        let offset = m.offset as usize;
        if offset == 0 || offset > crate::block::types::MAX_OFFSET || p < offset {
            return Err(Lz4OptError::InternalCompression("match offset out of range"));
        }
        let enc_len = mlen - MINMATCH;

        let token = ((run.min(RUN_MASK as usize) as u8) << 4)
            | (enc_len.min(ML_MASK as usize) as u8);
        if !sink.put(token) {
            return Ok(None);
        }
        if run >= RUN_MASK as usize && !sink.put_varlen(run - RUN_MASK as usize) {
            return Ok(None);
        }
        if !sink.put_slice(&window[run_start..p]) {
            return Ok(None);
        }
        if !sink.put_slice(&(offset as u16).to_le_bytes()) {
            return Ok(None);
        }
        if enc_len >= ML_MASK as usize && !sink.put_varlen(enc_len - ML_MASK as usize) {
            return Ok(None);
        }

        p += mlen;
    }
}
