//! Usage and help text.

use crate::cli::constants::COMPRESSOR_NAME;
use crate::displayout;

/// Prints the one-screen usage summary to stdout.
pub fn print_usage(exe_name: &str) {
    let exe = if exe_name.is_empty() {
        COMPRESSOR_NAME
    } else {
        exe_name
    };
    displayout!("usage: {} [command] [flags] [input] [output]", exe);
    displayout!();
    displayout!("commands (mutually exclusive):");
    displayout!("  -z              compress (default)");
    displayout!("  -d              decompress");
    displayout!("  -cbench         in-memory compression benchmark");
    displayout!("  -dbench         in-memory decompression benchmark");
    displayout!("  -test           run the built-in self-test");
    displayout!();
    displayout!("flags:");
    displayout!("  -c              verify output after compressing");
    displayout!("  -B4 .. -B7      block size 64 KiB .. 4 MiB (default -B7)");
    displayout!("  -BD / -BI       dependent (default) / independent blocks");
    displayout!("  -l              legacy frame format (8 MiB blocks)");
    displayout!("  -r              raw block, no framing (max 4 MiB input)");
    displayout!("  --favor-decSpeed  trade a little ratio for faster decoding");
    displayout!("  -D <file>       use the last 64 KiB of <file> as dictionary");
    displayout!("  -v              more verbose output (repeatable)");
    displayout!("  -h, --help      this text");
    displayout!();
    displayout!("input/output default to stdin/stdout.");
}
