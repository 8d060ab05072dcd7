//! Frame readers: modern frames, legacy frames, and raw single-block
//! streams.
//!
//! Every size field is validated against the declared geometry before any
//! buffer is sized from it, so a corrupt stream yields an error or a
//! bounded, partial output, never unbounded allocation or out-of-range
//! writes. History is carried across blocks exactly the way the writer
//! carries it: the trailing 64 KiB of decoded output in dependent mode, the
//! dictionary tail ahead of the first block, nothing otherwise.

use std::io::{Read, Write};

use crate::block::compress::compress_bound;
use crate::block::decompress::decompress_block;
use crate::block::types::{HISTORY_SIZE, LEGACY_BLOCK_SIZE, MAX_BLOCK_SIZE};
use crate::error::{Lz4OptError, Result};
use crate::frame::header::{
    block_size_from_code, parse_frame_descriptor, read_le32, BLOCK_UNCOMPRESSED_FLAG, END_MARK,
    FRAME_MAGIC, LEGACY_MAGIC,
};

/// Byte counts reported back to the CLI for the result summary.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecompressStats {
    pub bytes_read: u64,
    pub bytes_written: u64,
}

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

fn read_exact(src: &mut dyn Read, buf: &mut [u8]) -> Result<()> {
    if read_full(src, buf)? != buf.len() {
        return Err(Lz4OptError::Format("truncated stream"));
    }
    Ok(())
}

fn write_all(dst: &mut dyn Write, bytes: &[u8]) -> Result<()> {
    dst.write_all(bytes).map_err(Lz4OptError::SinkWrite)
}

fn dictionary_tail(dict: &[u8]) -> &[u8] {
    &dict[dict.len().saturating_sub(HISTORY_SIZE)..]
}

/// Decompresses `src` into `dst`. `raw` selects raw single-block decoding;
/// otherwise the stream's magic selects the modern or legacy reader.
pub fn decompress_stream(
    src: &mut dyn Read,
    dst: &mut dyn Write,
    raw: bool,
    dict: Option<&[u8]>,
) -> Result<DecompressStats> {
    if raw {
        return decompress_raw(src, dst, dict);
    }

    let mut magic = [0u8; 4];
    read_exact(src, &mut magic)?;
    if magic == FRAME_MAGIC {
        decompress_frame(src, dst, dict)
    } else if magic == LEGACY_MAGIC {
        decompress_legacy(src, dst)
    } else {
        Err(Lz4OptError::Format("unrecognized stream magic"))
    }
}

fn decompress_frame(
    src: &mut dyn Read,
    dst: &mut dyn Write,
    dict: Option<&[u8]>,
) -> Result<DecompressStats> {
    let mut descriptor = [0u8; 3];
    read_exact(src, &mut descriptor)?;
    let (independent, code) = parse_frame_descriptor(&descriptor)?;
    let block_size = block_size_from_code(code)?;
    let max_compressed = compress_bound(block_size);

    let mut stats = DecompressStats {
        bytes_read: 7, // magic + descriptor; prefixes counted in the loop
        bytes_written: 0,
    };

    // `win` holds history followed by the block being decoded.
    let mut win: Vec<u8> = Vec::new();
    let mut hist_len = 0usize;
    if let Some(d) = dict {
        win.extend_from_slice(dictionary_tail(d));
        hist_len = win.len();
    }
    let mut compressed: Vec<u8> = Vec::new();
    let mut prefix = [0u8; 4];

    loop {
        read_exact(src, &mut prefix)?;
        stats.bytes_read += 4;
        let word = read_le32(&prefix, 0);
        if word == END_MARK {
            break;
        }
        let stored = word & BLOCK_UNCOMPRESSED_FLAG != 0;
        let size = (word & !BLOCK_UNCOMPRESSED_FLAG) as usize;
        if size == 0 {
            return Err(Lz4OptError::Format("empty block"));
        }

        let produced = if stored {
            if size > block_size {
                return Err(Lz4OptError::Format("stored block exceeds block size"));
            }
            win.resize(hist_len + size, 0);
            read_exact(src, &mut win[hist_len..hist_len + size])?;
            size
        } else {
            if size > max_compressed {
                return Err(Lz4OptError::Format("compressed block exceeds bound"));
            }
            compressed.resize(size, 0);
            read_exact(src, &mut compressed)?;
            win.truncate(hist_len);
            decompress_block(&compressed, &mut win, block_size, false)?
        };
        stats.bytes_read += size as u64;
        if produced > block_size {
            return Err(Lz4OptError::InternalDecompression(
                "block decoder exceeded its output cap",
            ));
        }

        write_all(dst, &win[hist_len..hist_len + produced])?;
        stats.bytes_written += produced as u64;

        if independent {
            win.clear();
            hist_len = 0;
        } else {
            let total = hist_len + produced;
            let keep = total.min(HISTORY_SIZE);
            win.copy_within(total - keep..total, 0);
            win.truncate(keep);
            hist_len = keep;
        }
    }

    dst.flush().map_err(Lz4OptError::SinkWrite)?;
    Ok(stats)
}

fn decompress_legacy(src: &mut dyn Read, dst: &mut dyn Write) -> Result<DecompressStats> {
    let legacy_word = u32::from_le_bytes(LEGACY_MAGIC);
    let max_compressed = compress_bound(LEGACY_BLOCK_SIZE);

    let mut stats = DecompressStats {
        bytes_read: 4,
        bytes_written: 0,
    };
    let mut compressed: Vec<u8> = Vec::new();
    let mut out: Vec<u8> = Vec::new();
    let mut prefix = [0u8; 4];

    loop {
        // Legacy streams have no end mark: end of input terminates, and a
        // repeated magic starts a concatenated frame.
        let got = read_full(src, &mut prefix)?;
        if got == 0 {
            break;
        }
        if got != 4 {
            return Err(Lz4OptError::Format("truncated legacy block prefix"));
        }
        stats.bytes_read += 4;
        let word = read_le32(&prefix, 0);
        if word == legacy_word {
            continue;
        }
        let size = word as usize;
        if size == 0 || size > max_compressed {
            return Err(Lz4OptError::Format("legacy block size out of range"));
        }
        compressed.resize(size, 0);
        read_exact(src, &mut compressed)?;
        stats.bytes_read += size as u64;

        out.clear();
        let produced = decompress_block(&compressed, &mut out, LEGACY_BLOCK_SIZE, false)?;
        if produced > LEGACY_BLOCK_SIZE {
            return Err(Lz4OptError::InternalDecompression(
                "block decoder exceeded its output cap",
            ));
        }
        write_all(dst, &out[..produced])?;
        stats.bytes_written += produced as u64;
    }

    dst.flush().map_err(Lz4OptError::SinkWrite)?;
    Ok(stats)
}

fn decompress_raw(
    src: &mut dyn Read,
    dst: &mut dyn Write,
    dict: Option<&[u8]>,
) -> Result<DecompressStats> {
    let limit = compress_bound(MAX_BLOCK_SIZE) as u64 + 2;
    let mut data = Vec::new();
    Read::take(&mut *src, limit + 1)
        .read_to_end(&mut data)
        .map_err(Lz4OptError::SourceRead)?;
    if data.len() as u64 > limit {
        return Err(Lz4OptError::Format("raw stream exceeds maximum block size"));
    }

    let mut win: Vec<u8> = Vec::new();
    let mut hist_len = 0usize;
    if let Some(d) = dict {
        win.extend_from_slice(dictionary_tail(d));
        hist_len = win.len();
    }
    let produced = decompress_block(&data, &mut win, MAX_BLOCK_SIZE, true)?;
    write_all(dst, &win[hist_len..hist_len + produced])?;
    dst.flush().map_err(Lz4OptError::SinkWrite)?;
    Ok(DecompressStats {
        bytes_read: data.len() as u64,
        bytes_written: produced as u64,
    })
}
