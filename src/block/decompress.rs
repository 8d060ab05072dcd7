//! Bounds-checked LZ4 block decoder.
//!
//! This is the in-tree verification decoder: every read and write is
//! range-checked, corrupt input yields an error rather than undefined
//! output, and production at most `max_new` bytes is enforced before any
//! copy. Match expansion is byte-at-a-time, which handles overlapping
//! back-references (offset < length) for free.
//!
//! The output vector may arrive pre-seeded with history (the previous
//! block's tail or a dictionary); back-references may reach into it, and the
//! function returns only the number of newly produced bytes.

use crate::block::types::{MAX_OFFSET, MINMATCH, ML_MASK, RUN_MASK};
use crate::error::{Lz4OptError, Result};

/// Reads the varlen extension of a saturated token nibble.
#[inline]
fn read_varlen(src: &[u8], pos: &mut usize, base: usize) -> Result<usize> {
    let mut total = base;
    loop {
        let b = *src
            .get(*pos)
            .ok_or(Lz4OptError::Format("truncated length field"))?;
        *pos += 1;
        total += b as usize;
        if b != 255 {
            return Ok(total);
        }
    }
}

/// Decodes one LZ4 block from `src`, appending to `out`.
///
/// `out` may hold history; matches may reference it. At most `max_new` new
/// bytes are produced. In `raw` mode the block ends at the two-byte zero
/// offset sentinel (which is consumed); otherwise it ends when `src` is
/// exhausted after a literal run.
///
/// Returns the number of bytes appended.
pub fn decompress_block(
    src: &[u8],
    out: &mut Vec<u8>,
    max_new: usize,
    raw: bool,
) -> Result<usize> {
    let base = out.len();
    let mut pos = 0usize;

    loop {
        let token = *src
            .get(pos)
            .ok_or(Lz4OptError::Format("missing command token"))?;
        pos += 1;

        // Literal run.
        let mut lit_len = (token >> 4) as usize;
        if lit_len == RUN_MASK as usize {
            lit_len = read_varlen(src, &mut pos, lit_len)?;
        }
        if pos + lit_len > src.len() {
            return Err(Lz4OptError::Format("literal run exceeds input"));
        }
        if out.len() - base + lit_len > max_new {
            return Err(Lz4OptError::Format("output exceeds declared block size"));
        }
        out.extend_from_slice(&src[pos..pos + lit_len]);
        pos += lit_len;

        if pos == src.len() {
            if raw {
                return Err(Lz4OptError::Format("raw block missing end sentinel"));
            }
            // Final command of a framed block.
            return Ok(out.len() - base);
        }

        // Match offset.
        if pos + 2 > src.len() {
            return Err(Lz4OptError::Format("truncated match offset"));
        }
        let offset = u16::from_le_bytes([src[pos], src[pos + 1]]) as usize;
        pos += 2;
        if offset == 0 {
            if raw {
                // Raw end sentinel: part of the stream, not of the payload.
                return Ok(out.len() - base);
            }
            return Err(Lz4OptError::Format("zero match offset"));
        }
        debug_assert!(offset <= MAX_OFFSET);
        if offset > out.len() {
            return Err(Lz4OptError::Format("match offset reaches before the window"));
        }

        // Match length.
        let mut match_len = (token & ML_MASK as u8) as usize;
        if match_len == ML_MASK as usize {
            match_len = read_varlen(src, &mut pos, match_len)?;
        }
        match_len += MINMATCH;
        if out.len() - base + match_len > max_new {
            return Err(Lz4OptError::Format("output exceeds declared block size"));
        }

        // Byte-at-a-time copy tolerates overlap.
        for _ in 0..match_len {
            let b = out[out.len() - offset];
            out.push(b);
        }
    }
}
