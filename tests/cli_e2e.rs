use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use jsontlv::{decode, TlvValue};

const SAMPLE: &str = "{\"key1\":\"value\",\"key2\":42,\"key3\":true}\n\
                      {\"key2\":-5,\"sadsf\":\"dsewtew\"}\n";

fn jsontlv_bin() -> &'static str {
    env!("CARGO_BIN_EXE_jsontlv")
}

fn tlvdump_bin() -> &'static str {
    env!("CARGO_BIN_EXE_tlvdump")
}

fn test_temp_dir(tag: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("jsontlv-cli-e2e-{tag}-{}-{ts}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn run(bin: &str, args: &[&str]) -> Output {
    Command::new(bin)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run binary")
}

fn path_str(p: &Path) -> &str {
    p.to_str().expect("utf-8 path")
}

#[test]
fn cli_encodes_sample_file() {
    let dir = test_temp_dir("sample");
    let input = dir.join("in.json");
    let output = dir.join("out.tlv");
    fs::write(&input, SAMPLE).expect("write json");

    let out = run(jsontlv_bin(), &[path_str(&input), path_str(&output)]);
    assert!(out.status.success(), "encode failed: {}", String::from_utf8_lossy(&out.stderr));
    assert!(!dir.join("out.tlv.tmp").exists(), "tmp file left behind");

    let bytes = fs::read(&output).expect("read tlv");
    let decoded = decode(&bytes).expect("decode");
    let named: Vec<(&str, &TlvValue)> = decoded.named_fields().collect();
    assert_eq!(named.len(), 5);
    assert_eq!(named[1], ("key2", &TlvValue::UInt8(42)));
    assert_eq!(named[3], ("key2", &TlvValue::Int8(-5)));
    assert_eq!(decoded.dictionary().len(), 4);
}

#[test]
fn cli_missing_arguments_prints_usage() {
    let out = run(jsontlv_bin(), &[]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Usage"), "stderr: {stderr}");
}

#[test]
fn cli_missing_input_file_fails() {
    let dir = test_temp_dir("missing");
    let input = dir.join("nope.json");
    let output = dir.join("out.tlv");

    let out = run(jsontlv_bin(), &[path_str(&input), path_str(&output)]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
    assert!(stderr.contains("nope.json"), "stderr: {stderr}");
    assert!(!output.exists());
}

/// Ungueltige Zeilen werden uebersprungen und als Warnung geloggt.
#[test]
fn cli_skips_malformed_lines_with_warning() {
    let dir = test_temp_dir("skip");
    let input = dir.join("in.json");
    let output = dir.join("out.tlv");
    fs::write(&input, "{\"a\":1}\n{broken\n{\"b\":2}\n").expect("write json");

    let out = run(jsontlv_bin(), &[path_str(&input), path_str(&output)]);
    assert!(out.status.success(), "encode failed: {}", String::from_utf8_lossy(&out.stderr));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("line 2"), "stderr: {stderr}");

    let decoded = decode(&fs::read(&output).expect("read tlv")).expect("decode");
    assert_eq!(decoded.fields(), &[(1, TlvValue::UInt8(1)), (2, TlvValue::UInt8(2))]);
}

/// Im Strict-Modus bleibt keine (auch keine tmp-) Ausgabedatei zurueck.
#[test]
fn cli_strict_mode_fails_without_output() {
    let dir = test_temp_dir("strict");
    let input = dir.join("in.json");
    let output = dir.join("out.tlv");
    fs::write(&input, "{\"a\":1}\n[1,2]\n").expect("write json");

    let out = run(jsontlv_bin(), &[path_str(&input), path_str(&output), "--strict"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!output.exists());
    assert!(!dir.join("out.tlv.tmp").exists());
}

#[test]
fn cli_null_value_fails() {
    let dir = test_temp_dir("null");
    let input = dir.join("in.json");
    let output = dir.join("out.tlv");
    fs::write(&input, "{\"a\":null}\n").expect("write json");

    let out = run(jsontlv_bin(), &[path_str(&input), path_str(&output)]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unsupported data type"), "stderr: {stderr}");
}

#[test]
fn cli_max_value_length() {
    let dir = test_temp_dir("maxlen");
    let input = dir.join("in.json");
    let output = dir.join("out.tlv");
    fs::write(&input, "{\"k\":\"0123456789\"}\n").expect("write json");

    let out = run(
        jsontlv_bin(),
        &[path_str(&input), path_str(&output), "--max-value-length", "8"],
    );
    assert_eq!(out.status.code(), Some(1));

    let out = run(jsontlv_bin(), &[path_str(&input), path_str(&output), "--max-value-length", "0"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("invalid option"), "stderr: {stderr}");
}

#[test]
fn cli_output_is_deterministic() {
    let dir = test_temp_dir("determinism");
    let input = dir.join("in.json");
    let first = dir.join("a.tlv");
    let second = dir.join("b.tlv");
    fs::write(&input, SAMPLE).expect("write json");

    assert!(run(jsontlv_bin(), &[path_str(&input), path_str(&first)]).status.success());
    assert!(run(jsontlv_bin(), &[path_str(&input), path_str(&second)]).status.success());
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn tlvdump_prints_fields_and_dictionary() {
    let dir = test_temp_dir("dump");
    let input = dir.join("in.json");
    let output = dir.join("out.tlv");
    fs::write(&input, SAMPLE).expect("write json");
    assert!(run(jsontlv_bin(), &[path_str(&input), path_str(&output)]).status.success());

    let out = run(tlvdump_bin(), &[path_str(&output)]);
    assert!(out.status.success(), "dump failed: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("dictionary: 4 keys, 5 fields"), "stdout: {stdout}");
    assert!(stdout.contains("sadsf"), "stdout: {stdout}");
    assert!(stdout.contains("dsewtew"), "stdout: {stdout}");
}

#[test]
fn tlvdump_rejects_garbage() {
    let dir = test_temp_dir("garbage");
    let file = dir.join("bad.tlv");
    fs::write(&file, [0xEEu8, 1, 2, 3]).expect("write garbage");

    let out = run(tlvdump_bin(), &[path_str(&file)]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("invalid TLV tag 238"), "stderr: {stderr}");
}
