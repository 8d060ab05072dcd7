//! In-memory benchmark harness behind `-cbench` and `-dbench`.
//!
//! The input file is loaded fully into memory, the measured operation runs
//! repeatedly against memory buffers (at least four iterations and roughly a
//! second of wall time), and the best iteration is reported. Timing uses the
//! monotonic clock in [`crate::timefn`].

use std::io::Read;

use crate::displaylevel;
use crate::error::{Lz4OptError, Result};
use crate::frame::compress::compress_stream;
use crate::frame::decompress::decompress_stream;
use crate::frame::CompressOptions;
use crate::io::open_src_file;
use crate::timefn;

const MIN_ITERATIONS: u32 = 4;
const MIN_TOTAL_NS: u64 = 1_000_000_000;

fn load_input(path: &str) -> Result<Vec<u8>> {
    let mut src = open_src_file(path)?;
    let mut data = Vec::new();
    src.read_to_end(&mut data).map_err(Lz4OptError::SourceRead)?;
    Ok(data)
}

fn mb_per_s(bytes: usize, ns: u64) -> f64 {
    if ns == 0 {
        return f64::INFINITY;
    }
    (bytes as f64 / 1e6) / (ns as f64 / 1e9)
}

/// Benchmarks compression of `path` under `opts`.
pub fn compression_bench(
    path: &str,
    opts: &CompressOptions,
    dict: Option<&[u8]>,
) -> Result<()> {
    let data = load_input(path)?;
    let mut out = Vec::new();
    let mut best_ns = u64::MAX;
    let mut total_ns = 0u64;
    let mut iterations = 0u32;
    let mut compressed_size = 0usize;

    while iterations < MIN_ITERATIONS || total_ns < MIN_TOTAL_NS {
        out.clear();
        let mut src: &[u8] = &data;
        let t0 = timefn::get_time();
        compress_stream(&mut src, &mut out, opts, dict)?;
        let ns = timefn::clock_span_ns(t0);
        best_ns = best_ns.min(ns);
        total_ns += ns;
        iterations += 1;
        compressed_size = out.len();
    }

    let ratio = if data.is_empty() {
        0.0
    } else {
        100.0 * compressed_size as f64 / data.len() as f64
    };
    displaylevel!(
        1,
        "{}: {} -> {} bytes ({:.2}%), {:.1} MB/s ({} rounds)\n",
        path,
        data.len(),
        compressed_size,
        ratio,
        mb_per_s(data.len(), best_ns),
        iterations
    );
    Ok(())
}

/// Benchmarks decompression of the already-compressed `path`.
pub fn decompression_bench(path: &str, raw: bool, dict: Option<&[u8]>) -> Result<()> {
    let data = load_input(path)?;
    let mut best_ns = u64::MAX;
    let mut total_ns = 0u64;
    let mut iterations = 0u32;
    let mut produced = 0u64;

    while iterations < MIN_ITERATIONS || total_ns < MIN_TOTAL_NS {
        let mut src: &[u8] = &data;
        let mut sink = std::io::sink();
        let t0 = timefn::get_time();
        let stats = decompress_stream(&mut src, &mut sink, raw, dict)?;
        let ns = timefn::clock_span_ns(t0);
        best_ns = best_ns.min(ns);
        total_ns += ns;
        iterations += 1;
        produced = stats.bytes_written;
    }

    displaylevel!(
        1,
        "{}: {} -> {} bytes, {:.1} MB/s ({} rounds)\n",
        path,
        data.len(),
        produced,
        mb_per_s(produced as usize, best_ns),
        iterations
    );
    Ok(())
}
