//! Forward command-count reducer.
//!
//! Two local rewrites, each a non-enlarging replacement of the parse:
//!
//! - **Demotion**: a short match (≤ 19 bytes) whose command costs at least
//!   as much as spelling its bytes as literals is converted to literals. The
//!   comparison accounts for how the pending literal run and any following
//!   literals merge into one run afterwards.
//! - **Fusion**: two adjacent matches whose combined span is still predicted
//!   by the first offset collapse into a single long command. Only spans of
//!   at least [`LEAVE_ALONE_MATCH_SIZE`] fuse, and never beyond the 65535
//!   length cap. Consumed positions are marked with [`FUSED_SENTINEL`]; the
//!   scan does not advance after a fusion so chains keep collapsing.
//!
//! The output decodes to identical bytes, is never larger, and running the
//! pass twice changes nothing.

use crate::block::types::{
    literal_varlen_bits, match_varlen_bits, ParseMatch, FUSED_SENTINEL,
    LEAVE_ALONE_MATCH_SIZE, MINMATCH,
};

/// Longest match the demotion rules consider; anything longer always beats
/// its literal spelling.
const DEMOTE_MAX_LEN: usize = 19;

/// Maximum command length encodable in one LZ4 match.
const MAX_FUSED_LEN: usize = 65_535;

pub fn reduce(window: &[u8], matches: &mut [ParseMatch], start: usize, end: usize) {
    let mut literals_run: usize = 0;
    let mut p = start;

    while p < end {
        let m = matches[p];
        debug_assert!(m.length != FUSED_SENTINEL, "scan landed inside a fused match");
        if !m.is_match() {
            literals_run += 1;
            p += 1;
            continue;
        }

        let mlen = m.length as usize;
        let off = m.offset as usize;

        if mlen <= DEMOTE_MAX_LEN && p + mlen < end {
            let cmd_bits = 8
                + literal_varlen_bits(literals_run)
                + 16
                + match_varlen_bits(mlen - MINMATCH);

            if matches[p + mlen].is_match() {
                // Case A: another match follows immediately; demoting merges
                // the pending run with the converted bytes.
                if cmd_bits >= 8 * mlen as u32 + literal_varlen_bits(literals_run + mlen) {
                    for slot in matches[p..p + mlen].iter_mut() {
                        *slot = ParseMatch::NONE;
                    }
                    literals_run += mlen;
                    p += mlen;
                    continue;
                }
            } else {
                // Case B: literal bytes follow; demoting merges the pending
                // run, the converted bytes, and that following run.
                let mut next_lits = 0usize;
                let mut q = p + mlen;
                while q < end && matches[q].length == 0 {
                    next_lits += 1;
                    q += 1;
                }
                if next_lits > 0
                    && cmd_bits
                        >= 8 * mlen as u32
                            + literal_varlen_bits(literals_run + next_lits + mlen)
                            - literal_varlen_bits(next_lits)
                {
                    for slot in matches[p..p + mlen].iter_mut() {
                        *slot = ParseMatch::NONE;
                    }
                    literals_run += mlen;
                    p += mlen;
                    continue;
                }
            }
        }

        // Fusion: extend this match over the next one when the current
        // offset keeps predicting the bytes.
        if mlen >= 2 && p + mlen < end {
            let next = matches[p + mlen];
            if next.length >= 2 {
                let next_len = next.length as usize;
                let combined = mlen + next_len;
                if combined >= LEAVE_ALONE_MATCH_SIZE
                    && combined <= MAX_FUSED_LEN
                    && window[p + mlen..p + combined]
                        == window[p + mlen - off..p + combined - off]
                {
                    matches[p] = ParseMatch {
                        length: combined as i32,
                        offset: m.offset,
                    };
                    matches[p + mlen] = ParseMatch {
                        length: FUSED_SENTINEL,
                        offset: 0,
                    };
                    // Re-examine the grown match; it may fuse again.
                    continue;
                }
            }
        }

        literals_run = 0;
        p += mlen;
    }
}
