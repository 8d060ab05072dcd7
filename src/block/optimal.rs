//! Reverse-order dynamic-programming parser.
//!
//! Rewrites the match array over `[start, end)` so that executing the implied
//! commands yields the minimum total encoded bits; among equal-size parses
//! the one with the lower weighted command count wins.
//!
//! Cost model per command: 8 bits of token, 16 bits of match offset, one
//! extra byte per 255-step of literal-run length once the run reaches 15,
//! one extra byte per 255-step of encoded match length once it reaches 15,
//! plus a one-bit penalty whenever the following command is a match.
//!
//! The sweep runs backward so `cost[p + k]` is already final when position
//! `p` is decided; this also keeps the tie-breaking deterministic.

use crate::block::types::{
    match_varlen_bits, FavorMode, ParseMatch, LEAVE_ALONE_MATCH_SIZE, MINMATCH,
    MODESWITCH_PENALTY, RUN_MASK, SCORE_PER_MATCH_RATIO, SCORE_PER_MATCH_SPEED,
};

/// Decoder fast paths handle encoded match lengths below the token nibble
/// limit specially; in speed mode, chosen lengths in `(14, 28]` are truncated
/// to 14 so the shortened match still beats two short ones.
const FAST_PATH_TRUNCATE_MAX: i32 = 28;
const FAST_PATH_LENGTH: i32 = 14;

/// Runs the reverse DP over `matches[start..end]`, rewriting it in place
/// into the chosen commanding. `cost` and `score` are caller-owned scratch
/// covering at least `end` entries.
pub fn optimize(
    matches: &mut [ParseMatch],
    cost: &mut [u32],
    score: &mut [u32],
    start: usize,
    end: usize,
    favor: FavorMode,
) {
    if end <= start {
        return;
    }

    let match_weight = match favor {
        FavorMode::Ratio => SCORE_PER_MATCH_RATIO,
        FavorMode::Speed => SCORE_PER_MATCH_SPEED,
    };

    // Base: the final position is a literal carried by the closing token.
    cost[end - 1] = 8;
    score[end - 1] = 0;
    matches[end - 1] = ParseMatch::NONE;

    // Nearest decided match start strictly beyond the current position;
    // `end` while there is none.
    let mut next_match = end;

    for p in (start..end - 1).rev() {
        // Option 1: emit W[p] as a literal.
        let literals_len = next_match - p;
        let mut best_cost = 8 + cost[p + 1];
        if literals_len >= RUN_MASK as usize && (literals_len - RUN_MASK as usize) % 255 == 0 {
            // This literal pushes the run across a varlen boundary.
            best_cost += 8;
        }
        if matches[p + 1].is_match() {
            best_cost += MODESWITCH_PENALTY;
        }
        let mut best_score = 1 + score[p + 1];
        let mut best_len: i32 = 0;
        let mut best_offset: u32 = 0;

        // Option 2: the match found at p, at every useful trim.
        let found = matches[p];
        if found.is_match() {
            let full = found.length as usize;
            let min_k = if full >= LEAVE_ALONE_MATCH_SIZE {
                // Long matches are never worth shortening.
                full
            } else {
                MINMATCH
            };
            for k in min_k..=full {
                let mut c = 8 + 16 + match_varlen_bits(k - MINMATCH) + cost[p + k];
                if matches[p + k].is_match() {
                    c += MODESWITCH_PENALTY;
                }
                let s = match_weight + score[p + k];
                if c < best_cost || (c == best_cost && s < best_score) {
                    best_cost = c;
                    best_score = s;
                    best_len = k as i32;
                    best_offset = found.offset;
                }
            }
        }

        if favor == FavorMode::Speed
            && best_len > FAST_PATH_LENGTH
            && best_len <= FAST_PATH_TRUNCATE_MAX
        {
            let k = FAST_PATH_LENGTH as usize;
            best_cost = 8 + 16 + cost[p + k];
            if matches[p + k].is_match() {
                best_cost += MODESWITCH_PENALTY;
            }
            best_score = match_weight + score[p + k];
            best_len = FAST_PATH_LENGTH;
        }

        if best_len >= MINMATCH as i32 {
            matches[p] = ParseMatch {
                length: best_len,
                offset: best_offset,
            };
            next_match = p;
        } else {
            matches[p] = ParseMatch::NONE;
        }
        cost[p] = best_cost;
        score[p] = best_score;
    }
}
