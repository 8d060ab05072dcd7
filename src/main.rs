//! Binary entry point for the `lz4opt` command-line tool.
//!
//! Control flow: parse arguments, load the dictionary if one was named,
//! dispatch on the operation mode, and fold every failure into the single
//! error exit code.

use std::io::{Read, Write};

use lz4opt::cli::args::{parse_args, OpMode, ParsedArgs};
use lz4opt::cli::constants::EXIT_FAILURE;
use lz4opt::displaylevel;
use lz4opt::error::{Lz4OptError, Result};
use lz4opt::frame::compress::compress_stream;
use lz4opt::frame::decompress::decompress_stream;
use lz4opt::io::{load_dictionary, open_dst_file, open_src_file, CompareWriter, STDIN_MARK};

/// Compress input to output; with `-c`, re-decode the result against the
/// original bytes before reporting success.
///
/// Verification needs two passes over the input, so that path buffers the
/// whole input in memory (stdin cannot be reopened).
fn run_compress(args: &ParsedArgs, dict: Option<&[u8]>) -> Result<()> {
    let mut dst = open_dst_file(args.output())?;

    if args.verify {
        let mut src = open_src_file(args.input())?;
        let mut original = Vec::new();
        src.read_to_end(&mut original)
            .map_err(Lz4OptError::SourceRead)?;

        let mut compressed = Vec::new();
        let mut reader: &[u8] = &original;
        let stats = compress_stream(&mut reader, &mut compressed, &args.opts, dict)?;

        let mut check = CompareWriter::new(&original);
        let mut creader: &[u8] = &compressed;
        decompress_stream(&mut creader, &mut check, args.opts.raw, dict)?;
        if !check.ok() {
            return Err(Lz4OptError::InternalCompression(
                "verification decode does not match the input",
            ));
        }
        displaylevel!(3, "verified: decoded output matches the input\n");

        dst.write_all(&compressed).map_err(Lz4OptError::SinkWrite)?;
        dst.flush().map_err(Lz4OptError::SinkWrite)?;
        report(stats.bytes_read, stats.bytes_written);
        return Ok(());
    }

    let mut src = open_src_file(args.input())?;
    let stats = compress_stream(src.as_mut(), dst.as_mut(), &args.opts, dict)?;
    report(stats.bytes_read, stats.bytes_written);
    Ok(())
}

fn run_decompress(args: &ParsedArgs, dict: Option<&[u8]>) -> Result<()> {
    let mut src = open_src_file(args.input())?;
    let mut dst = open_dst_file(args.output())?;
    let stats = decompress_stream(src.as_mut(), dst.as_mut(), args.opts.raw, dict)?;
    report(stats.bytes_read, stats.bytes_written);
    Ok(())
}

fn report(bytes_in: u64, bytes_out: u64) {
    let ratio = if bytes_in == 0 {
        0.0
    } else {
        100.0 * bytes_out as f64 / bytes_in as f64
    };
    displaylevel!(2, "{} -> {} bytes ({:.2}%)\n", bytes_in, bytes_out, ratio);
}

fn run(args: &ParsedArgs) -> Result<bool> {
    let dictionary = match &args.dictionary_filename {
        Some(path) => Some(load_dictionary(path)?),
        None => None,
    };
    let dict = dictionary.as_deref();

    match args.op_mode {
        OpMode::Compress => run_compress(args, dict).map(|_| true),
        OpMode::Decompress => run_decompress(args, dict).map(|_| true),
        OpMode::CompressBench => {
            if args.input() == STDIN_MARK {
                displaylevel!(1, "benchmark needs a file argument\n");
                return Ok(false);
            }
            lz4opt::bench::compression_bench(args.input(), &args.opts, dict).map(|_| true)
        }
        OpMode::DecompressBench => {
            if args.input() == STDIN_MARK {
                displaylevel!(1, "benchmark needs a file argument\n");
                return Ok(false);
            }
            lz4opt::bench::decompression_bench(args.input(), args.opts.raw, dict).map(|_| true)
        }
        OpMode::SelfTest => Ok(lz4opt::selftest::run_self_test()),
    }
}

fn main() {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("lz4opt: {}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };
    if args.exit_early {
        std::process::exit(0);
    }

    match run(&args) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(EXIT_FAILURE),
        Err(e) => {
            displaylevel!(1, "lz4opt: {}\n", e);
            std::process::exit(EXIT_FAILURE);
        }
    }
}
