//! Built-in self-test behind `-test`.
//!
//! Runs a fixed set of inputs through every supported flag combination —
//! block codes 4 through 7, dependent and independent blocks, both parser
//! biases, legacy frames, raw blocks, with and without a dictionary — and
//! verifies each round-trip through the in-tree decoder via a comparison
//! sink. A handful of structural checks (header tampering, compressible
//! inputs actually shrinking) ride along.
//!
//! Every failure is reported; the caller maps "any failure" to the single
//! error exit code.

use std::io::Write;

use crate::block::types::FavorMode;
use crate::displaylevel;
use crate::frame::compress::compress_stream;
use crate::frame::decompress::decompress_stream;
use crate::frame::header::{MAX_BLOCK_CODE, MIN_BLOCK_CODE};
use crate::frame::CompressOptions;
use crate::io::CompareWriter;

/// Deterministic filler text with natural-language statistics, used where a
/// corpus file would otherwise be needed.
pub fn lorem_text(len: usize) -> Vec<u8> {
    const WORDS: &[&str] = &[
        "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit",
        "sed", "do", "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore",
        "magna", "aliqua", "vestibulum", "mattis", "velit", "commodo", "lacus", "arcu",
        "mauris", "nulla", "malesuada", "pellentesque", "gravida", "dictum", "erat",
        "maecenas", "blandit", "aliquam", "etiam", "enim", "lobortis", "fermentum",
        "faucibus", "ornare", "elementum", "facilisis", "odio", "morbi", "quis",
    ];
    let mut out = Vec::with_capacity(len + 16);
    let mut state = 0x0139_408Du32;
    let mut words_in_sentence = 0u32;
    while out.len() < len {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let word = WORDS[(state >> 16) as usize % WORDS.len()];
        if words_in_sentence == 0 {
            let mut chars = word.as_bytes().to_vec();
            chars[0] = chars[0].to_ascii_uppercase();
            out.extend_from_slice(&chars);
        } else {
            out.extend_from_slice(word.as_bytes());
        }
        words_in_sentence += 1;
        let sentence_len = 6 + (state >> 28);
        if words_in_sentence >= sentence_len {
            out.extend_from_slice(b". ");
            words_in_sentence = 0;
        } else {
            out.push(b' ');
        }
    }
    out.truncate(len);
    out
}

struct Scenario {
    name: &'static str,
    data: Vec<u8>,
    compressible: bool,
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "empty",
            data: Vec::new(),
            compressible: false,
        },
        Scenario {
            name: "one byte",
            data: b"a".to_vec(),
            compressible: false,
        },
        Scenario {
            name: "abc x4",
            data: b"abcabcabcabc".to_vec(),
            compressible: false,
        },
        Scenario {
            name: "64 Ki zeros",
            data: vec![0u8; 65_536],
            compressible: true,
        },
        Scenario {
            name: "1 MiB alternating",
            data: [0xAAu8, 0x55].repeat(512 * 1024),
            compressible: true,
        },
        Scenario {
            name: "100 KB lorem",
            data: lorem_text(100_000),
            compressible: true,
        },
    ]
}

/// One compress/decompress/compare cycle. Returns the compressed size on
/// success or a description of what went wrong.
fn roundtrip(
    data: &[u8],
    opts: &CompressOptions,
    dict: Option<&[u8]>,
) -> std::result::Result<usize, String> {
    let mut src = data;
    let mut compressed = Vec::new();
    compress_stream(&mut src, &mut compressed, opts, dict)
        .map_err(|e| format!("compression failed: {}", e))?;

    let mut reader: &[u8] = &compressed;
    let mut sink = CompareWriter::new(data);
    decompress_stream(&mut reader, &mut sink, opts.raw, dict)
        .map_err(|e| format!("decompression failed: {}", e))?;
    sink.flush().ok();
    if !sink.ok() {
        return Err(match sink.first_mismatch {
            Some(at) => format!("decoded bytes diverge at offset {}", at),
            None => format!(
                "decoded {} of {} bytes",
                sink.position(),
                data.len()
            ),
        });
    }
    Ok(compressed.len())
}

fn check(
    failures: &mut u32,
    checks: &mut u32,
    name: &str,
    result: std::result::Result<usize, String>,
) -> Option<usize> {
    *checks += 1;
    match result {
        Ok(size) => Some(size),
        Err(why) => {
            *failures += 1;
            displaylevel!(1, "FAIL {}: {}\n", name, why);
            None
        }
    }
}

/// Runs the whole matrix. Returns `true` when every check passed.
pub fn run_self_test() -> bool {
    let mut failures = 0u32;
    let mut checks = 0u32;
    let dict = lorem_text(8_192);

    for scenario in scenarios() {
        displaylevel!(2, "testing {} ({} bytes)\n", scenario.name, scenario.data.len());

        for code in MIN_BLOCK_CODE..=MAX_BLOCK_CODE {
            for independent in [false, true] {
                for favor in [FavorMode::Ratio, FavorMode::Speed] {
                    for with_dict in [false, true] {
                        let opts = CompressOptions {
                            block_code: code,
                            independent,
                            favor,
                            ..CompressOptions::default()
                        };
                        let name = format!(
                            "{} -B{}{}{}{}",
                            scenario.name,
                            code,
                            if independent { " -BI" } else { " -BD" },
                            if favor == FavorMode::Speed {
                                " --favor-decSpeed"
                            } else {
                                ""
                            },
                            if with_dict { " -D" } else { "" },
                        );
                        let dict_arg = with_dict.then_some(dict.as_slice());
                        if let Some(size) = check(
                            &mut failures,
                            &mut checks,
                            &name,
                            roundtrip(&scenario.data, &opts, dict_arg),
                        ) {
                            if scenario.compressible && size >= scenario.data.len() {
                                failures += 1;
                                displaylevel!(
                                    1,
                                    "FAIL {}: did not shrink ({} -> {})\n",
                                    name,
                                    scenario.data.len(),
                                    size
                                );
                            }
                        }
                    }
                }
            }
        }

        // Legacy frames.
        let legacy = CompressOptions {
            legacy: true,
            ..CompressOptions::default()
        };
        check(
            &mut failures,
            &mut checks,
            &format!("{} -l", scenario.name),
            roundtrip(&scenario.data, &legacy, None),
        );

        // Raw block mode (all self-test inputs fit 4 MiB and encode within
        // their raw budget).
        let raw = CompressOptions {
            raw: true,
            ..CompressOptions::default()
        };
        check(
            &mut failures,
            &mut checks,
            &format!("{} -r", scenario.name),
            roundtrip(&scenario.data, &raw, None),
        );
    }

    // Header tampering must be rejected.
    {
        checks += 1;
        let mut src: &[u8] = b"tamper target";
        let mut compressed = Vec::new();
        compress_stream(&mut src, &mut compressed, &CompressOptions::default(), None)
            .expect("compressing a short literal input cannot fail");
        compressed[6] ^= 0x01;
        let mut reader: &[u8] = &compressed;
        let mut out = Vec::new();
        if decompress_stream(&mut reader, &mut out, false, None).is_ok() {
            failures += 1;
            displaylevel!(1, "FAIL header tampering: corrupted checksum accepted\n");
        }
    }

    if failures == 0 {
        displaylevel!(1, "self-test passed ({} checks)\n", checks);
        true
    } else {
        displaylevel!(1, "self-test FAILED: {} of {} checks\n", failures, checks);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lorem_is_deterministic_and_sized() {
        let a = lorem_text(1000);
        let b = lorem_text(1000);
        assert_eq!(a, b);
        assert_eq!(a.len(), 1000);
        assert!(a.iter().all(|&c| c.is_ascii()));
    }

    #[test]
    fn lorem_compresses() {
        let data = lorem_text(50_000);
        let mut src: &[u8] = &data;
        let mut out = Vec::new();
        compress_stream(&mut src, &mut out, &CompressOptions::default(), None).unwrap();
        assert!(out.len() < data.len());
    }
}
