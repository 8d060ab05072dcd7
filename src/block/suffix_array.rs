//! Suffix-array and longest-common-prefix construction over the input
//! window.
//!
//! The suffix array is built by prefix doubling (Larsson–Sadakane) with a
//! two-pass counting sort per round: `O(N log N)` time, integer-only, and no
//! unsafe code. The LCP values are computed in permuted (text) order with the
//! Φ method in amortised linear time, then rotated into suffix order, capped,
//! and thresholded so the interval builder never sees a value below the
//! minimum match length.
//!
//! All scratch buffers live in [`SuffixArrayBuilder`] and are allocated once
//! per compression context, then reused for every block.

use crate::error::{Lz4OptError, Result};

const NO_PRED: u32 = u32::MAX;

/// Reusable scratch state for suffix-array and LCP construction.
pub struct SuffixArrayBuilder {
    rank: Vec<u32>,
    new_rank: Vec<u32>,
    order: Vec<u32>,
    cnt: Vec<u32>,
    phi: Vec<u32>,
    plcp: Vec<u32>,
}

fn reserved(len: usize) -> Result<Vec<u32>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| Lz4OptError::OutOfMemory)?;
    Ok(v)
}

impl SuffixArrayBuilder {
    /// Allocates scratch for windows up to `max_window` bytes.
    pub fn new(max_window: usize) -> Result<Self> {
        Ok(SuffixArrayBuilder {
            rank: reserved(max_window)?,
            new_rank: reserved(max_window)?,
            order: reserved(max_window)?,
            cnt: reserved(max_window.max(256) + 2)?,
            phi: reserved(max_window)?,
            plcp: reserved(max_window)?,
        })
    }

    /// Builds the suffix array of `text` into `sa`.
    ///
    /// On return `sa` holds a permutation of `0..text.len()` such that the
    /// suffixes `text[sa[r]..]` are in strictly increasing lexicographic
    /// order.
    pub fn build_suffix_array(&mut self, text: &[u8], sa: &mut Vec<u32>) {
        let n = text.len();
        sa.clear();
        if n == 0 {
            return;
        }
        sa.resize(n, 0);

        let Self {
            rank,
            new_rank,
            order,
            cnt,
            ..
        } = self;
        rank.clear();
        rank.extend(text.iter().map(|&b| b as u32));
        new_rank.clear();
        new_rank.resize(n, 0);
        order.clear();
        order.resize(n, 0);
        cnt.clear();
        cnt.resize(n.max(256) + 2, 0);

        // Round 0: counting sort on single bytes.
        cnt[..257].fill(0);
        for &b in text {
            cnt[b as usize] += 1;
        }
        let mut sum = 0u32;
        for slot in cnt[..256].iter_mut() {
            let c = *slot;
            *slot = sum;
            sum += c;
        }
        for (i, &b) in text.iter().enumerate() {
            sa[cnt[b as usize] as usize] = i as u32;
            cnt[b as usize] += 1;
        }
        let mut max_rank = 0u32;
        new_rank[sa[0] as usize] = 0;
        for j in 1..n {
            if text[sa[j] as usize] != text[sa[j - 1] as usize] {
                max_rank += 1;
            }
            new_rank[sa[j] as usize] = max_rank;
        }
        core::mem::swap(rank, new_rank);
        if max_rank as usize == n - 1 {
            return;
        }

        // Doubling rounds: sort by (rank[i], rank[i + k]) until all ranks
        // are distinct. Second-key values are shifted by one so "past the
        // end" sorts first.
        let mut k = 1usize;
        loop {
            let key_bound = n + 1;

            // Pass 1: order positions by the second key.
            cnt[..=key_bound].fill(0);
            for i in 0..n {
                let k2 = if i + k < n { rank[i + k] + 1 } else { 0 };
                cnt[k2 as usize] += 1;
            }
            let mut sum = 0u32;
            for slot in cnt[..=key_bound].iter_mut() {
                let c = *slot;
                *slot = sum;
                sum += c;
            }
            for i in 0..n {
                let k2 = if i + k < n { rank[i + k] + 1 } else { 0 };
                order[cnt[k2 as usize] as usize] = i as u32;
                cnt[k2 as usize] += 1;
            }

            // Pass 2: stable sort by the first key.
            cnt[..=key_bound].fill(0);
            for i in 0..n {
                cnt[rank[i] as usize] += 1;
            }
            let mut sum = 0u32;
            for slot in cnt[..=key_bound].iter_mut() {
                let c = *slot;
                *slot = sum;
                sum += c;
            }
            for &i in order.iter() {
                let k1 = rank[i as usize] as usize;
                sa[cnt[k1] as usize] = i;
                cnt[k1] += 1;
            }

            // Re-rank on the sorted pair keys.
            let pair = |i: usize| -> (u32, u32) {
                let second = if i + k < n { rank[i + k] + 1 } else { 0 };
                (rank[i], second)
            };
            max_rank = 0;
            new_rank[sa[0] as usize] = 0;
            for j in 1..n {
                if pair(sa[j] as usize) != pair(sa[j - 1] as usize) {
                    max_rank += 1;
                }
                new_rank[sa[j] as usize] = max_rank;
            }
            core::mem::swap(rank, new_rank);
            if max_rank as usize == n - 1 {
                return;
            }
            k <<= 1;
        }
    }

    /// Computes the LCP array in suffix order: `lcp[r]` is the length of the
    /// common prefix of suffixes `sa[r - 1]` and `sa[r]` (`lcp[0] == 0`),
    /// capped at `cap` and zeroed when below `min_match`.
    pub fn build_lcp(
        &mut self,
        text: &[u8],
        sa: &[u32],
        lcp: &mut Vec<u32>,
        cap: u32,
        min_match: usize,
    ) {
        let n = text.len();
        lcp.clear();
        if n == 0 {
            return;
        }
        lcp.resize(n, 0);

        let Self { phi, plcp, .. } = self;
        phi.clear();
        phi.resize(n, NO_PRED);
        plcp.clear();
        plcp.resize(n, 0);

        for r in 1..n {
            phi[sa[r] as usize] = sa[r - 1];
        }

        // Φ method: walking text positions left to right, the common-prefix
        // counter drops by at most one per step, so the total extension work
        // is linear.
        let mut l = 0usize;
        for i in 0..n {
            let pred = phi[i];
            if pred == NO_PRED {
                plcp[i] = 0;
                l = 0;
                continue;
            }
            let j = pred as usize;
            while i + l < n && j + l < n && text[i + l] == text[j + l] {
                l += 1;
            }
            plcp[i] = l as u32;
            l = l.saturating_sub(1);
        }

        for r in 0..n {
            let mut v = plcp[sa[r] as usize];
            if v > cap {
                v = cap;
            }
            if (v as usize) < min_match {
                v = 0;
            }
            lcp[r] = v;
        }
    }
}
