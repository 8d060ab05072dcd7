//! Per-session compression context and the single-block pipeline.
//!
//! A [`CompressCtx`] owns every large buffer the pipeline needs — suffix
//! array and LCP scratch, the packed interval index, visitation marks, the
//! parse array, and the parser's cost accumulators — all sized for the
//! maximum window (history + largest block) at construction and reused for
//! every block. The input window itself is owned by the caller.
//!
//! One block flows through:
//! window → suffix array + LCP → interval index → match per position →
//! optimal parse → peephole fix-up → block bytes (or the incompressible
//! signal).

use crate::block::index::{build_intervals, LCP_CAP};
use crate::block::suffix_array::SuffixArrayBuilder;
use crate::block::types::{FavorMode, ParseMatch, HISTORY_SIZE, MINMATCH};
use crate::block::{emit, matchfinder, optimal, peephole};
use crate::error::{Lz4OptError, Result};

/// Worst-case compressed size of an `n`-byte block: one extra byte per 255
/// literals plus command overhead.
pub const fn compress_bound(n: usize) -> usize {
    n + n / 255 + 16
}

/// Reusable compression state for one session.
pub struct CompressCtx {
    max_window: usize,
    favor: FavorMode,
    sa_builder: SuffixArrayBuilder,
    sa: Vec<u32>,
    lcp: Vec<u32>,
    intervals: Vec<u64>,
    pos_data: Vec<u64>,
    visit: Vec<u32>,
    matches: Vec<ParseMatch>,
    cost: Vec<u32>,
    score: Vec<u32>,
}

fn reserved<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| Lz4OptError::OutOfMemory)?;
    Ok(v)
}

impl CompressCtx {
    /// Creates a context able to compress blocks up to `max_block_size`
    /// bytes with up to 64 KiB of history in front.
    pub fn new(max_block_size: usize, favor: FavorMode) -> Result<Self> {
        let max_window = HISTORY_SIZE + max_block_size;
        Ok(CompressCtx {
            max_window,
            favor,
            sa_builder: SuffixArrayBuilder::new(max_window)?,
            sa: reserved(max_window)?,
            lcp: reserved(max_window)?,
            intervals: reserved(max_window)?,
            pos_data: reserved(max_window)?,
            visit: reserved(max_window)?,
            matches: reserved(max_window)?,
            cost: reserved(max_window)?,
            score: reserved(max_window)?,
        })
    }

    pub fn favor_mode(&self) -> FavorMode {
        self.favor
    }

    pub fn set_favor_mode(&mut self, favor: FavorMode) {
        self.favor = favor;
    }

    /// Compresses `window[history_len..]` into `out`, with
    /// `window[..history_len]` available as reference-only history.
    ///
    /// Returns `Ok(Some(size))` on success or `Ok(None)` when the block
    /// cannot be encoded within `out` (incompressible at this budget). With
    /// `raw_sentinel`, the two-byte zero-offset trailer is appended.
    pub fn compress_block(
        &mut self,
        window: &[u8],
        history_len: usize,
        out: &mut [u8],
        raw_sentinel: bool,
    ) -> Result<Option<usize>> {
        let n = window.len();
        debug_assert!(history_len <= n);
        if n > self.max_window {
            return Err(Lz4OptError::InternalCompression(
                "window exceeds the context's maximum",
            ));
        }
        if history_len == n {
            // Nothing to compress: emit an empty literal run.
            return emit::emit_block(window, &[], n, n, out, raw_sentinel);
        }

        self.sa_builder.build_suffix_array(window, &mut self.sa);
        self.sa_builder
            .build_lcp(window, &self.sa, &mut self.lcp, LCP_CAP, MINMATCH);
        let interval_count =
            build_intervals(&self.sa, &self.lcp, &mut self.intervals, &mut self.pos_data);

        self.visit.clear();
        self.visit.resize(interval_count, matchfinder::NOT_VISITED);
        self.matches.clear();
        self.matches.resize(n, ParseMatch::NONE);
        self.cost.clear();
        self.cost.resize(n, 0);
        self.score.clear();
        self.score.resize(n, 0);

        matchfinder::skip(
            &self.intervals,
            &self.pos_data,
            &mut self.visit,
            0,
            history_len,
        );
        matchfinder::find_all(
            &self.intervals,
            &self.pos_data,
            &mut self.visit,
            history_len,
            n,
            &mut self.matches,
        );
        optimal::optimize(
            &mut self.matches,
            &mut self.cost,
            &mut self.score,
            history_len,
            n,
            self.favor,
        );
        peephole::reduce(window, &mut self.matches, history_len, n);
        emit::emit_block(window, &self.matches, history_len, n, out, raw_sentinel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::decompress::decompress_block;

    fn roundtrip(payload: &[u8], history: &[u8]) -> Vec<u8> {
        let mut ctx = CompressCtx::new(payload.len().max(1024), FavorMode::Ratio).unwrap();
        let mut window = history.to_vec();
        window.extend_from_slice(payload);
        let mut out = vec![0u8; compress_bound(payload.len())];
        let size = ctx
            .compress_block(&window, history.len(), &mut out, false)
            .unwrap()
            .expect("bound-sized buffer cannot overflow");
        let mut decoded = history.to_vec();
        let produced =
            decompress_block(&out[..size], &mut decoded, payload.len() + 64, false).unwrap();
        assert_eq!(produced, payload.len());
        decoded[history.len()..].to_vec()
    }

    #[test]
    fn single_byte_roundtrip() {
        assert_eq!(roundtrip(b"a", b""), b"a");
    }

    #[test]
    fn short_periodic_roundtrip() {
        assert_eq!(roundtrip(b"abcabcabcabc", b""), b"abcabcabcabc");
    }

    #[test]
    fn zeros_compress_to_one_match_command() {
        let payload = vec![0u8; 65536];
        let mut ctx = CompressCtx::new(payload.len(), FavorMode::Ratio).unwrap();
        let mut out = vec![0u8; compress_bound(payload.len())];
        let size = ctx
            .compress_block(&payload, 0, &mut out, false)
            .unwrap()
            .unwrap();
        let mut decoded = Vec::new();
        let produced = decompress_block(&out[..size], &mut decoded, 65536, false).unwrap();
        assert_eq!(produced, 65536);
        assert!(decoded.iter().all(|&b| b == 0));

        // Walk the stream structure: exactly one command may carry a match,
        // and its length must respect the 65535 cap (reached via fusion).
        let bytes = &out[..size];
        let mut pos = 0usize;
        let mut match_commands = 0usize;
        while pos < bytes.len() {
            let token = bytes[pos];
            pos += 1;
            let mut lit = (token >> 4) as usize;
            if lit == 15 {
                loop {
                    let b = bytes[pos];
                    pos += 1;
                    lit += b as usize;
                    if b != 255 {
                        break;
                    }
                }
            }
            pos += lit;
            if pos == bytes.len() {
                break;
            }
            pos += 2; // offset
            let mut ml = (token & 0x0F) as usize;
            if ml == 15 {
                loop {
                    let b = bytes[pos];
                    pos += 1;
                    ml += b as usize;
                    if b != 255 {
                        break;
                    }
                }
            }
            assert!(ml + MINMATCH <= 65_535);
            match_commands += 1;
        }
        assert_eq!(match_commands, 1, "zero block must be a single long match");
        // One literal, one fused match (long varlen), one closing run.
        assert!(size < 300, "zero block compressed to {} bytes", size);
    }

    #[test]
    fn history_backed_block_roundtrip() {
        let history = b"the quick brown fox jumps over the lazy dog. ".repeat(8);
        let payload = b"the quick brown fox jumps over the lazy dog. again!".to_vec();
        assert_eq!(roundtrip(&payload, &history), payload);
    }

    #[test]
    fn incompressible_budget_signals_none() {
        // Random-ish bytes with a tiny output budget.
        let mut payload = vec![0u8; 512];
        let mut state = 1u32;
        for b in payload.iter_mut() {
            state = state.wrapping_mul(48271) % 0x7FFF_FFFF;
            *b = (state >> 7) as u8;
        }
        let mut ctx = CompressCtx::new(payload.len(), FavorMode::Ratio).unwrap();
        let mut out = vec![0u8; 64];
        assert!(matches!(
            ctx.compress_block(&payload, 0, &mut out, false),
            Ok(None)
        ));
    }

    #[test]
    fn speed_mode_never_produces_more_commands() {
        let corpus = b"It is a truth universally acknowledged, that a single man in \
                       possession of a good fortune, must be in want of a wife. "
            .repeat(64);
        let count_commands = |bytes: &[u8]| -> usize {
            // Each emitted token is one command; walk the stream.
            let mut out = Vec::new();
            decompress_block(bytes, &mut out, corpus.len() + 64, false).unwrap();
            // Cheap proxy: command count equals token count; recount by
            // re-parsing the stream structure.
            let mut pos = 0usize;
            let mut commands = 0usize;
            while pos < bytes.len() {
                let token = bytes[pos];
                pos += 1;
                let mut lit = (token >> 4) as usize;
                if lit == 15 {
                    loop {
                        let b = bytes[pos];
                        pos += 1;
                        lit += b as usize;
                        if b != 255 {
                            break;
                        }
                    }
                }
                pos += lit;
                commands += 1;
                if pos == bytes.len() {
                    break;
                }
                pos += 2; // offset
                let mut ml = (token & 0x0F) as usize;
                if ml == 15 {
                    loop {
                        let b = bytes[pos];
                        pos += 1;
                        ml += b as usize;
                        if b != 255 {
                            break;
                        }
                    }
                }
            }
            commands
        };

        let mut out_ratio = vec![0u8; compress_bound(corpus.len())];
        let mut out_speed = vec![0u8; compress_bound(corpus.len())];

        let mut ctx = CompressCtx::new(corpus.len(), FavorMode::Ratio).unwrap();
        let size_ratio = ctx
            .compress_block(&corpus, 0, &mut out_ratio, false)
            .unwrap()
            .unwrap();
        ctx.set_favor_mode(FavorMode::Speed);
        let size_speed = ctx
            .compress_block(&corpus, 0, &mut out_speed, false)
            .unwrap()
            .unwrap();

        assert!(size_ratio < corpus.len());
        assert!(size_speed < corpus.len());
        assert!(count_commands(&out_speed[..size_speed]) <= count_commands(&out_ratio[..size_ratio]));
    }
}
