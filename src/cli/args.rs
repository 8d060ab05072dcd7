//! Command-line argument parsing.
//!
//! The entry points are [`parse_args`] (reads `std::env::args()`) and
//! [`parse_args_from`] (takes an explicit slice, suitable for unit tests).
//! Both return a [`ParsedArgs`] value capturing the selected operation, the
//! frame options, and the filenames.
//!
//! The flag vocabulary (`-B4`, `-BD`, `-cbench`, …) is scanned by hand, the
//! way single-dash multi-letter options have to be. Unrecognized options
//! return an `Err` with a message beginning with `"bad usage: "`.

use anyhow::{anyhow, Result};

use crate::block::types::FavorMode;
use crate::cli::constants::{display_level, set_display_level};
use crate::frame::CompressOptions;
use crate::io::{STDIN_MARK, STDOUT_MARK};

/// The mutually exclusive operations.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum OpMode {
    #[default]
    Compress,
    Decompress,
    CompressBench,
    DecompressBench,
    SelfTest,
}

/// Complete set of options and filenames produced by the parsing loop.
#[derive(Debug)]
pub struct ParsedArgs {
    pub op_mode: OpMode,
    pub opts: CompressOptions,
    /// Verify the output against the input after compressing (`-c`).
    pub verify: bool,
    pub dictionary_filename: Option<String>,
    pub input_filename: Option<String>,
    pub output_filename: Option<String>,
    /// When `true`, a help flag was processed; the caller should exit 0.
    pub exit_early: bool,
    /// Program name (argv[0]), used by help output.
    pub exe_name: String,
}

impl ParsedArgs {
    /// Input path with the stdin default applied.
    pub fn input(&self) -> &str {
        self.input_filename.as_deref().unwrap_or(STDIN_MARK)
    }

    /// Output path with the stdout default applied.
    pub fn output(&self) -> &str {
        self.output_filename.as_deref().unwrap_or(STDOUT_MARK)
    }
}

/// Parses `std::env::args()`.
pub fn parse_args() -> Result<ParsedArgs> {
    let exe_name = std::env::args().next().unwrap_or_default();
    let argv: Vec<String> = std::env::args().skip(1).collect();
    parse_args_from(&exe_name, &argv)
}

/// Parses an explicit argument list. `exe_name` is argv[0]; `argv` is
/// argv[1..]. Callable from tests without touching `std::env`.
pub fn parse_args_from(exe_name: &str, argv: &[String]) -> Result<ParsedArgs> {
    let mut op_mode: Option<OpMode> = None;
    let mut opts = CompressOptions::default();
    let mut verify = false;
    let mut dictionary_filename: Option<String> = None;
    let mut input_filename: Option<String> = None;
    let mut output_filename: Option<String> = None;
    let mut exit_early = false;

    let set_mode = |slot: &mut Option<OpMode>, mode: OpMode| -> Result<()> {
        match slot {
            Some(existing) if *existing != mode => {
                Err(anyhow!("bad usage: conflicting commands"))
            }
            _ => {
                *slot = Some(mode);
                Ok(())
            }
        }
    };

    let mut arg_idx = 0usize;
    while arg_idx < argv.len() {
        let argument = argv[arg_idx].as_str();
        match argument {
            "" => {}
            "-z" => set_mode(&mut op_mode, OpMode::Compress)?,
            "-d" => set_mode(&mut op_mode, OpMode::Decompress)?,
            "-cbench" => set_mode(&mut op_mode, OpMode::CompressBench)?,
            "-dbench" => set_mode(&mut op_mode, OpMode::DecompressBench)?,
            "-test" => set_mode(&mut op_mode, OpMode::SelfTest)?,
            "-c" => verify = true,
            "-B4" | "-B5" | "-B6" | "-B7" => {
                opts.block_code = argument.as_bytes()[2] - b'0';
            }
            "-BD" => opts.independent = false,
            "-BI" => opts.independent = true,
            "-l" => opts.legacy = true,
            "-r" => opts.raw = true,
            "-v" => set_display_level(display_level() + 1),
            "--favor-decSpeed" => opts.favor = FavorMode::Speed,
            "-D" => {
                arg_idx += 1;
                let path = argv
                    .get(arg_idx)
                    .ok_or_else(|| anyhow!("bad usage: -D requires a dictionary file"))?;
                dictionary_filename = Some(path.clone());
            }
            "-h" | "--help" => {
                crate::cli::help::print_usage(exe_name);
                exit_early = true;
            }
            _ if argument.starts_with('-') && argument.len() > 1 => {
                return Err(anyhow!("bad usage: unknown option '{}'", argument));
            }
            _ => {
                // Positional: input first, then output.
                if input_filename.is_none() {
                    input_filename = Some(argument.to_owned());
                } else if output_filename.is_none() {
                    output_filename = Some(argument.to_owned());
                } else {
                    return Err(anyhow!("bad usage: extra argument '{}'", argument));
                }
            }
        }
        arg_idx += 1;
    }

    Ok(ParsedArgs {
        op_mode: op_mode.unwrap_or_default(),
        opts,
        verify,
        dictionary_filename,
        input_filename,
        output_filename,
        exit_early,
        exe_name: exe_name.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ParsedArgs> {
        let argv: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        parse_args_from("lz4opt", &argv)
    }

    #[test]
    fn defaults() {
        let p = parse(&[]).unwrap();
        assert_eq!(p.op_mode, OpMode::Compress);
        assert_eq!(p.opts.block_code, 7);
        assert!(!p.opts.independent);
        assert!(!p.opts.legacy);
        assert!(!p.opts.raw);
        assert_eq!(p.opts.favor, FavorMode::Ratio);
        assert_eq!(p.input(), "stdin");
        assert_eq!(p.output(), "stdout");
    }

    #[test]
    fn commands_and_flags() {
        let p = parse(&["-d", "-v", "in.lz4", "out.bin"]).unwrap();
        assert_eq!(p.op_mode, OpMode::Decompress);
        assert_eq!(p.input(), "in.lz4");
        assert_eq!(p.output(), "out.bin");

        let p = parse(&["-z", "-c", "-B5", "-BI", "--favor-decSpeed", "file"]).unwrap();
        assert_eq!(p.op_mode, OpMode::Compress);
        assert!(p.verify);
        assert_eq!(p.opts.block_code, 5);
        assert!(p.opts.independent);
        assert_eq!(p.opts.favor, FavorMode::Speed);
    }

    #[test]
    fn dictionary_takes_a_path() {
        let p = parse(&["-D", "words.dict", "input"]).unwrap();
        assert_eq!(p.dictionary_filename.as_deref(), Some("words.dict"));
        assert_eq!(p.input(), "input");
        assert!(parse(&["-D"]).is_err());
    }

    #[test]
    fn conflicting_commands_are_rejected() {
        assert!(parse(&["-d", "-cbench"]).is_err());
        // Repeating the same command is harmless.
        assert!(parse(&["-d", "-d"]).is_ok());
    }

    #[test]
    fn unknown_options_are_rejected() {
        let err = parse(&["-Q"]).unwrap_err();
        assert!(err.to_string().starts_with("bad usage: "));
        assert!(parse(&["-B9"]).is_err());
        assert!(parse(&["--nope"]).is_err());
    }

    #[test]
    fn extra_positional_is_rejected() {
        assert!(parse(&["a", "b", "c"]).is_err());
    }

    #[test]
    fn bench_and_test_modes() {
        assert_eq!(parse(&["-cbench", "f"]).unwrap().op_mode, OpMode::CompressBench);
        assert_eq!(parse(&["-dbench", "f"]).unwrap().op_mode, OpMode::DecompressBench);
        assert_eq!(parse(&["-test"]).unwrap().op_mode, OpMode::SelfTest);
    }

    #[test]
    fn legacy_and_raw_flags() {
        let p = parse(&["-l", "f"]).unwrap();
        assert!(p.opts.legacy);
        let p = parse(&["-r", "f"]).unwrap();
        assert!(p.opts.raw);
    }
}
