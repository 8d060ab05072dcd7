//! Structural invariants of emitted blocks: command layout, offset
//! legality, and the trailing-literal rule.

use lz4opt::block::types::FavorMode;
use lz4opt::selftest::lorem_text;
use lz4opt::{compress_bound, CompressCtx};

/// One decoded command as re-read from the wire.
struct Command {
    literals: usize,
    match_len: Option<usize>,
    offset: Option<usize>,
}

fn parse_commands(block: &[u8]) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut pos = 0usize;
    while pos < block.len() {
        let token = block[pos];
        pos += 1;
        let mut literals = (token >> 4) as usize;
        if literals == 15 {
            loop {
                let b = block[pos];
                pos += 1;
                literals += b as usize;
                if b != 255 {
                    break;
                }
            }
        }
        pos += literals;
        if pos == block.len() {
            commands.push(Command {
                literals,
                match_len: None,
                offset: None,
            });
            break;
        }
        let offset = u16::from_le_bytes([block[pos], block[pos + 1]]) as usize;
        pos += 2;
        let mut ml = (token & 0x0F) as usize;
        if ml == 15 {
            loop {
                let b = block[pos];
                pos += 1;
                ml += b as usize;
                if b != 255 {
                    break;
                }
            }
        }
        commands.push(Command {
            literals,
            match_len: Some(ml + 4),
            offset: Some(offset),
        });
    }
    commands
}

fn compress_one_block(data: &[u8], favor: FavorMode) -> Vec<u8> {
    let mut ctx = CompressCtx::new(data.len().max(1024), favor).unwrap();
    let mut out = vec![0u8; compress_bound(data.len()) + 16];
    let size = ctx
        .compress_block(data, 0, &mut out, false)
        .unwrap()
        .expect("bound buffer");
    out.truncate(size);
    out
}

fn test_inputs() -> Vec<Vec<u8>> {
    vec![
        b"a".to_vec(),
        b"abcabcabcabc".to_vec(),
        vec![0u8; 65_536],
        [0xAAu8, 0x55].repeat(8 * 1024),
        lorem_text(50_000),
        (0u32..10_000).flat_map(|i| (i % 257).to_le_bytes()).collect(),
    ]
}

#[test]
fn final_command_carries_at_least_the_trailing_literals() {
    for data in test_inputs() {
        for favor in [FavorMode::Ratio, FavorMode::Speed] {
            let block = compress_one_block(&data, favor);
            let commands = parse_commands(&block);
            let last = commands.last().expect("at least one command");
            assert!(last.match_len.is_none(), "final command must be literal-only");
            if data.len() >= 5 {
                assert!(
                    last.literals >= 5,
                    "the final 5 bytes of a block must be literals (got {})",
                    last.literals
                );
            }
        }
    }
}

#[test]
fn offsets_are_legal_at_every_position() {
    for data in test_inputs() {
        let block = compress_one_block(&data, FavorMode::Ratio);
        let commands = parse_commands(&block);
        let mut produced = 0usize;
        for cmd in &commands {
            produced += cmd.literals;
            if let (Some(len), Some(offset)) = (cmd.match_len, cmd.offset) {
                assert!(offset >= 1 && offset <= 65_535);
                assert!(offset <= produced, "offset reaches before the block start");
                assert!(len >= 4);
                produced += len;
            }
        }
        assert_eq!(produced, data.len(), "commands must cover the input exactly");
    }
}

#[test]
fn match_lengths_respect_the_command_cap() {
    let data = vec![0u8; 200_000];
    let block = compress_one_block(&data, FavorMode::Ratio);
    for cmd in parse_commands(&block) {
        if let Some(len) = cmd.match_len {
            assert!(len <= 65_535);
        }
    }
}
