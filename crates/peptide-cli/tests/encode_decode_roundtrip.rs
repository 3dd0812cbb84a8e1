use std::fs;
use std::process::Command;

fn run_ok(cmd: &mut Command) -> std::process::Output {
    let out = cmd.output().expect("spawn command");
    assert!(
        out.status.success(),
        "command failed: status={:?}\nstdout:\n{}\nstderr:\n{}",
        out.status.code(),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    out
}

#[test]
fn encode_then_decode_matches_original_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, b"hello from the peptide cli integration test").unwrap();
    let out_dir = dir.path().join("encoded");
    let decoded = dir.path().join("decoded.txt");

    let mut enc = Command::new(env!("CARGO_BIN_EXE_peptide"));
    enc.args([
        "encode",
        "--in",
        input.to_str().unwrap(),
        "--out",
        out_dir.to_str().unwrap(),
        "--rs-profile",
        "rs8",
    ]);
    run_ok(&mut enc);

    assert!(out_dir.join("peptides.txt").exists());
    assert!(out_dir.join("meta.json").exists());

    let mut dec = Command::new(env!("CARGO_BIN_EXE_peptide"));
    dec.args([
        "decode",
        "--in",
        out_dir.to_str().unwrap(),
        "--out",
        decoded.to_str().unwrap(),
    ]);
    run_ok(&mut dec);

    let original = fs::read(&input).unwrap();
    let roundtripped = fs::read(&decoded).unwrap();
    assert_eq!(original, roundtripped, "decoded bytes differ from original");
}

#[test]
fn profiles_command_lists_known_profiles() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_peptide"));
    cmd.arg("profiles");
    let out = run_ok(&mut cmd);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("rs8"));
    assert!(stdout.contains("fnt20"));
}

#[test]
fn run_command_reports_success_on_a_noiseless_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, b"run subcommand roundtrip check").unwrap();

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_peptide"));
    cmd.args([
        "run",
        "--in",
        input.to_str().unwrap(),
        "--rs-profile",
        "none",
        "--loss-prob",
        "0",
        "--mutation-prob",
        "0",
        "--insertion-prob",
        "0",
        "--shuffle-prob",
        "0",
    ]);
    let out = run_ok(&mut cmd);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("success"), "unexpected run output: {stdout}");
}
