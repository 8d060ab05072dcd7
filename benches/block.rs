//! Criterion benchmarks for the block compression pipeline and the
//! verification decoder.
//!
//! Run with:
//!   cargo bench --bench block

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use lz4opt::block::types::FavorMode;
use lz4opt::selftest::lorem_text;
use lz4opt::{compress_bound, decompress_block, CompressCtx};

fn bench_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("block");
    group.sample_size(10);

    for &chunk_size in &[65_536usize, 262_144] {
        let chunk = lorem_text(chunk_size);
        let bound = compress_bound(chunk_size);

        for (label, favor) in [("ratio", FavorMode::Ratio), ("speed", FavorMode::Speed)] {
            let mut ctx = CompressCtx::new(chunk_size, favor).unwrap();
            let mut dst = vec![0u8; bound];
            group.throughput(Throughput::Bytes(chunk_size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("compress_{label}"), chunk_size),
                &chunk,
                |b, chunk| {
                    b.iter(|| {
                        ctx.compress_block(chunk, 0, &mut dst, false)
                            .unwrap()
                            .unwrap()
                    })
                },
            );
        }

        // Decode throughput over the ratio-mode output.
        {
            let mut ctx = CompressCtx::new(chunk_size, FavorMode::Ratio).unwrap();
            let mut tmp = vec![0u8; bound];
            let n = ctx
                .compress_block(&chunk, 0, &mut tmp, false)
                .unwrap()
                .unwrap();
            let compressed = tmp[..n].to_vec();
            let mut out = Vec::with_capacity(chunk_size);

            group.throughput(Throughput::Bytes(chunk_size as u64));
            group.bench_with_input(
                BenchmarkId::new("decompress", chunk_size),
                &compressed,
                |b, compressed| {
                    b.iter(|| {
                        out.clear();
                        decompress_block(compressed, &mut out, chunk_size, false).unwrap()
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_block);
criterion_main!(benches);
