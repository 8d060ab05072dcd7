//! Best-match enumeration over the LCP-interval index.
//!
//! Positions are consumed strictly left to right. Each interval carries a
//! visitation mark: the most recent position whose ascent traversed it. The
//! walk for position `p` starts at the deepest interval containing `p`
//! (`pos_data[p]`) and ascends parent links:
//!
//! - an unvisited interval is marked with `p` and the ascent continues;
//! - the first visited interval proves that some earlier position shares
//!   exactly that interval's LCP with `p` (deeper intervals on the path were
//!   unvisited, so no earlier position shares more), and its mark is the most
//!   recent such position, i.e. the nearest candidate;
//! - if that candidate is farther back than the format allows, the ascent
//!   continues to shallower (shorter, nearer) intervals.
//!
//! Stopping at the first admissible candidate leaves the remaining ancestors
//! untouched; every ancestor of a visited interval has been visited before,
//! so the "first visited interval on the path gives the longest match"
//! argument is unaffected. Amortised, each interval edge is traversed a
//! bounded number of times per block.
//!
//! `skip` performs the same walk without recording, so the history prefix
//! participates in the index but is never scored.

use crate::block::index::{packed_idx, packed_lcp};
use crate::block::types::{ParseMatch, LASTLITERALS, MAX_OFFSET, MFLIMIT, MINMATCH};

/// Visitation mark for "no position has traversed this interval yet".
pub const NOT_VISITED: u32 = u32::MAX;

/// Advances the visitation state over `[start, end)` without recording
/// matches.
pub fn skip(intervals: &[u64], pos_data: &[u64], visit: &mut [u32], start: usize, end: usize) {
    for p in start..end {
        let mut word = pos_data[p];
        while packed_lcp(word) as usize >= MINMATCH {
            let idx = packed_idx(word);
            let seen = visit[idx];
            visit[idx] = p as u32;
            if seen != NOT_VISITED {
                break;
            }
            word = intervals[idx];
        }
    }
}

/// Writes the best eligible match for every position in `[start, end)` into
/// `matches`, or `ParseMatch::NONE` where there is none.
///
/// `end` is the end of the parse range: matches never start within the final
/// [`MFLIMIT`] bytes and never extend into the final [`LASTLITERALS`] bytes.
pub fn find_all(
    intervals: &[u64],
    pos_data: &[u64],
    visit: &mut [u32],
    start: usize,
    end: usize,
    matches: &mut [ParseMatch],
) {
    for p in start..end {
        if p + MFLIMIT > end {
            matches[p] = ParseMatch::NONE;
            continue;
        }

        let mut best = ParseMatch::NONE;
        let mut word = pos_data[p];
        while packed_lcp(word) as usize >= MINMATCH {
            let idx = packed_idx(word);
            let seen = visit[idx];
            visit[idx] = p as u32;
            if seen != NOT_VISITED {
                let offset = p as u32 - seen;
                if offset as usize <= MAX_OFFSET {
                    best = ParseMatch {
                        length: packed_lcp(word) as i32,
                        offset,
                    };
                    break;
                }
            }
            word = intervals[idx];
        }

        if best.is_match() {
            let max_len = end - LASTLITERALS - p;
            if best.length as usize > max_len {
                best.length = max_len as i32;
            }
            if !best.is_match() {
                best = ParseMatch::NONE;
            }
        }
        matches[p] = best;
    }
}
