//! Frame writers: modern frames, legacy frames, and raw single-block
//! streams.
//!
//! The writer owns the window buffer (up to 64 KiB of history plus one
//! block), preloads one block-sized read to decide the effective block-size
//! code for short inputs, and hands each window to the block core. A block
//! that does not shrink is stored uncompressed behind the high bit of its
//! size prefix; legacy frames have no such escape and always carry
//! compressed bytes; raw mode aborts instead.

use std::io::{Read, Write};

use crate::block::compress::{compress_bound, CompressCtx};
use crate::block::types::{HISTORY_SIZE, LEGACY_BLOCK_SIZE, MAX_BLOCK_SIZE};
use crate::error::{Lz4OptError, Result};
use crate::frame::header::{
    block_size_from_code, optimal_block_code, write_frame_header, write_le32,
    BLOCK_UNCOMPRESSED_FLAG, END_MARK, LEGACY_MAGIC,
};
use crate::frame::CompressOptions;

/// Byte counts reported back to the CLI for the result summary.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompressStats {
    pub bytes_read: u64,
    pub bytes_written: u64,
}

/// Reads until `buf` is full or the source reports end of input.
fn read_full(src: &mut dyn Read, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Lz4OptError::SourceRead(e)),
        }
    }
    Ok(filled)
}

fn write_all(dst: &mut dyn Write, bytes: &[u8]) -> Result<()> {
    dst.write_all(bytes).map_err(Lz4OptError::SinkWrite)
}

/// The trailing [`HISTORY_SIZE`] bytes of a dictionary seed the first block's
/// history; shorter dictionaries are used whole.
fn dictionary_tail(dict: &[u8]) -> &[u8] {
    &dict[dict.len().saturating_sub(HISTORY_SIZE)..]
}

fn reserved_bytes(len: usize) -> Result<Vec<u8>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| Lz4OptError::OutOfMemory)?;
    v.resize(len, 0);
    Ok(v)
}

/// Compresses `src` into `dst` according to `opts`.
pub fn compress_stream(
    src: &mut dyn Read,
    dst: &mut dyn Write,
    opts: &CompressOptions,
    dict: Option<&[u8]>,
) -> Result<CompressStats> {
    if opts.raw {
        compress_raw(src, dst, opts, dict)
    } else if opts.legacy {
        compress_legacy(src, dst, opts)
    } else {
        compress_frame(src, dst, opts, dict)
    }
}

fn compress_frame(
    src: &mut dyn Read,
    dst: &mut dyn Write,
    opts: &CompressOptions,
    dict: Option<&[u8]>,
) -> Result<CompressStats> {
    let requested = opts.block_code;
    let requested_size = block_size_from_code(requested)?;

    let mut window = reserved_bytes(HISTORY_SIZE + requested_size)?;
    let mut hist_len = 0usize;
    if let Some(d) = dict {
        let tail = dictionary_tail(d);
        window[..tail.len()].copy_from_slice(tail);
        hist_len = tail.len();
    }

    // One preloaded read decides the effective code: a short input under a
    // large default downgrades to the smallest covering block size. The
    // chosen code is recorded in the header; readers never infer it.
    let first_read = read_full(src, &mut window[hist_len..hist_len + requested_size])?;
    let eof_after_first = first_read < requested_size;
    let code = if eof_after_first {
        optimal_block_code(requested, first_read)
    } else {
        requested
    };
    let block_size = block_size_from_code(code)?;

    let mut stats = CompressStats::default();
    let header = write_frame_header(opts.independent, code);
    write_all(dst, &header)?;
    stats.bytes_written += header.len() as u64;

    let mut ctx = CompressCtx::new(block_size, opts.favor)?;
    let mut out = reserved_bytes(block_size)?;
    let mut prefix = [0u8; 4];

    let mut filled = first_read;
    let mut eof = eof_after_first;
    while filled > 0 {
        let window_len = hist_len + filled;
        let compressed =
            ctx.compress_block(&window[..window_len], hist_len, &mut out[..filled], false)?;

        match compressed {
            Some(size) if size < filled => {
                write_le32(&mut prefix, 0, size as u32);
                write_all(dst, &prefix)?;
                write_all(dst, &out[..size])?;
                stats.bytes_written += 4 + size as u64;
            }
            _ => {
                // Did not shrink: store the block uncompressed.
                write_le32(&mut prefix, 0, filled as u32 | BLOCK_UNCOMPRESSED_FLAG);
                write_all(dst, &prefix)?;
                write_all(dst, &window[hist_len..window_len])?;
                stats.bytes_written += 4 + filled as u64;
            }
        }
        stats.bytes_read += filled as u64;

        if opts.independent {
            hist_len = 0;
        } else {
            let keep = window_len.min(HISTORY_SIZE);
            window.copy_within(window_len - keep..window_len, 0);
            hist_len = keep;
        }

        if eof {
            break;
        }
        filled = read_full(src, &mut window[hist_len..hist_len + block_size])?;
        eof = filled < block_size;
    }

    write_le32(&mut prefix, 0, END_MARK);
    write_all(dst, &prefix)?;
    stats.bytes_written += 4;
    dst.flush().map_err(Lz4OptError::SinkWrite)?;
    Ok(stats)
}

fn compress_legacy(
    src: &mut dyn Read,
    dst: &mut dyn Write,
    opts: &CompressOptions,
) -> Result<CompressStats> {
    let mut stats = CompressStats::default();
    write_all(dst, &LEGACY_MAGIC)?;
    stats.bytes_written += LEGACY_MAGIC.len() as u64;

    let mut window = reserved_bytes(LEGACY_BLOCK_SIZE)?;
    // Legacy blocks are always stored compressed; give the emitter a
    // worst-case buffer so "incompressible" cannot occur.
    let mut out = reserved_bytes(compress_bound(LEGACY_BLOCK_SIZE))?;
    let mut ctx = CompressCtx::new(LEGACY_BLOCK_SIZE, opts.favor)?;
    let mut prefix = [0u8; 4];

    loop {
        let filled = read_full(src, &mut window)?;
        if filled == 0 {
            break;
        }
        let size = ctx
            .compress_block(&window[..filled], 0, &mut out, false)?
            .ok_or(Lz4OptError::InternalCompression(
                "bound-sized legacy buffer overflowed",
            ))?;
        write_le32(&mut prefix, 0, size as u32);
        write_all(dst, &prefix)?;
        write_all(dst, &out[..size])?;
        stats.bytes_read += filled as u64;
        stats.bytes_written += 4 + size as u64;
        if filled < LEGACY_BLOCK_SIZE {
            break;
        }
    }
    dst.flush().map_err(Lz4OptError::SinkWrite)?;
    Ok(stats)
}

fn compress_raw(
    src: &mut dyn Read,
    dst: &mut dyn Write,
    opts: &CompressOptions,
    dict: Option<&[u8]>,
) -> Result<CompressStats> {
    let mut data = Vec::new();
    Read::take(&mut *src, MAX_BLOCK_SIZE as u64 + 1)
        .read_to_end(&mut data)
        .map_err(Lz4OptError::SourceRead)?;
    if data.len() > MAX_BLOCK_SIZE {
        return Err(Lz4OptError::RawTooLarge);
    }

    let tail = dict.map(dictionary_tail).unwrap_or(&[]);
    let mut window = reserved_bytes(tail.len() + data.len())?;
    window[..tail.len()].copy_from_slice(tail);
    window[tail.len()..].copy_from_slice(&data);

    let mut ctx = CompressCtx::new(data.len().max(1), opts.favor)?;
    // The sentinel is part of the compressed stream, so the output budget is
    // the input size with the trailer included; a small floor lets
    // degenerate inputs (under one command's overhead) still encode.
    let mut out = reserved_bytes(data.len().max(16))?;
    let size = ctx
        .compress_block(&window, tail.len(), &mut out, true)?
        .ok_or(Lz4OptError::RawIncompressible)?;

    write_all(dst, &out[..size])?;
    dst.flush().map_err(Lz4OptError::SinkWrite)?;
    Ok(CompressStats {
        bytes_read: data.len() as u64,
        bytes_written: size as u64,
    })
}
