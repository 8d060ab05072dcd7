//! CLI integration: drives the built binary end to end over real files.

use std::process::Command;

use lz4opt::selftest::lorem_text;

fn exe() -> &'static str {
    env!("CARGO_BIN_EXE_lz4opt")
}

#[test]
fn compress_then_decompress_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.bin");
    let packed = dir.path().join("input.bin.lz4");
    let unpacked = dir.path().join("roundtrip.bin");
    let data = lorem_text(50_000);
    std::fs::write(&input, &data).unwrap();

    let status = Command::new(exe())
        .args(["-z", input.to_str().unwrap(), packed.to_str().unwrap()])
        .status()
        .unwrap();
    assert!(status.success());
    let compressed = std::fs::read(&packed).unwrap();
    assert!(compressed.len() < data.len());

    let status = Command::new(exe())
        .args(["-d", packed.to_str().unwrap(), unpacked.to_str().unwrap()])
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(std::fs::read(&unpacked).unwrap(), data);
}

#[test]
fn verify_flag_checks_the_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.bin");
    let packed = dir.path().join("out.lz4");
    std::fs::write(&input, lorem_text(10_000)).unwrap();

    let status = Command::new(exe())
        .args([
            "-z",
            "-c",
            input.to_str().unwrap(),
            packed.to_str().unwrap(),
        ])
        .status()
        .unwrap();
    assert!(status.success());
}

#[test]
fn raw_and_legacy_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.bin");
    let data = lorem_text(20_000);
    std::fs::write(&input, &data).unwrap();

    for flag in ["-r", "-l"] {
        let packed = dir.path().join(format!("out{}.lz4", flag));
        let unpacked = dir.path().join(format!("back{}.bin", flag));
        let status = Command::new(exe())
            .args([
                "-z",
                flag,
                input.to_str().unwrap(),
                packed.to_str().unwrap(),
            ])
            .status()
            .unwrap();
        assert!(status.success());
        let mut args = vec!["-d"];
        if flag == "-r" {
            args.push("-r");
        }
        args.push(packed.to_str().unwrap());
        args.push(unpacked.to_str().unwrap());
        let status = Command::new(exe()).args(&args).status().unwrap();
        assert!(status.success());
        assert_eq!(std::fs::read(&unpacked).unwrap(), data);
    }
}

#[test]
fn dictionary_option_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let dict = dir.path().join("dict.bin");
    let input = dir.path().join("input.bin");
    let packed = dir.path().join("out.lz4");
    let unpacked = dir.path().join("back.bin");
    let dict_data = lorem_text(30_000);
    let data = dict_data[5_000..15_000].to_vec();
    std::fs::write(&dict, &dict_data).unwrap();
    std::fs::write(&input, &data).unwrap();

    let status = Command::new(exe())
        .args([
            "-z",
            "-D",
            dict.to_str().unwrap(),
            input.to_str().unwrap(),
            packed.to_str().unwrap(),
        ])
        .status()
        .unwrap();
    assert!(status.success());

    let status = Command::new(exe())
        .args([
            "-d",
            "-D",
            dict.to_str().unwrap(),
            packed.to_str().unwrap(),
            unpacked.to_str().unwrap(),
        ])
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(std::fs::read(&unpacked).unwrap(), data);
}

#[test]
fn errors_exit_with_code_100() {
    // Unknown flag.
    let status = Command::new(exe()).arg("-Q").status().unwrap();
    assert_eq!(status.code(), Some(100));

    // Missing input file.
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let out = dir.path().join("out.lz4");
    let status = Command::new(exe())
        .args(["-z", missing.to_str().unwrap(), out.to_str().unwrap()])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(100));

    // Corrupt compressed input.
    let bad = dir.path().join("bad.lz4");
    std::fs::write(&bad, b"definitely not lz4").unwrap();
    let back = dir.path().join("back.bin");
    let status = Command::new(exe())
        .args(["-d", bad.to_str().unwrap(), back.to_str().unwrap()])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(100));
}

#[test]
fn help_exits_zero() {
    let status = Command::new(exe()).arg("--help").status().unwrap();
    assert_eq!(status.code(), Some(0));
}
