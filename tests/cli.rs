use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pennybook"))
}

fn temp_path(name: &str, ext: &str) -> PathBuf {
    let mut path = env::temp_dir();
    let now = SystemTime::now().duration_since(UNIX_EPOCH).expect("time");
    path.push(format!(
        "pennybook_cli_{}_{}_{}.{}",
        name,
        now.as_secs(),
        now.subsec_nanos(),
        ext
    ));
    path
}

fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
    let path = temp_path(name, "html");
    fs::write(&path, contents).expect("write temp file");
    path
}

const RECEIPT: &str = r#"<table><tr><td width="50%">A</td><td width="50%" align="right">B</td></tr></table>"#;

#[test]
fn renders_file_to_stdout() {
    let input = temp_file("stdout", RECEIPT.as_bytes());
    let output = Command::new(bin_path())
        .args(["--width", "10", input.to_str().expect("path")])
        .env_remove("PENNYBOOK_WIDTH")
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "A        B\n");
}

#[test]
fn width_comes_from_environment() {
    let input = temp_file("env", RECEIPT.as_bytes());
    let output = Command::new(bin_path())
        .arg(input.to_str().expect("path"))
        .env("PENNYBOOK_WIDTH", "4")
        .output()
        .expect("run");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "A  B\n");
}

#[test]
fn writes_output_file() {
    let input = temp_file("outfile", b"Total<br>");
    let out_path = temp_path("outfile_result", "txt");
    let status = Command::new(bin_path())
        .args([
            input.to_str().expect("path"),
            out_path.to_str().expect("path"),
        ])
        .status()
        .expect("run");

    assert!(status.success());
    assert_eq!(fs::read_to_string(&out_path).expect("read output"), "Total\n");
}

#[test]
fn reads_stdin_with_dash() {
    let mut child = Command::new(bin_path())
        .args(["-w", "10", "-"])
        .env_remove("PENNYBOOK_WIDTH")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(RECEIPT.as_bytes())
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "A        B\n");
}

#[test]
fn missing_width_fails_with_message() {
    let input = temp_file("nowidth", b"<table><tr><td>A</td></tr></table>");
    let output = Command::new(bin_path())
        .arg(input.to_str().expect("path"))
        .output()
        .expect("run");

    assert!(!output.status.success(), "expected error exit code");
    assert!(output.stdout.is_empty(), "no partial output");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("width"), "stderr: {stderr}");
}

#[test]
fn non_utf8_input_fails() {
    let input = temp_file("binary", b"\xff\xfe<br>");
    let output = Command::new(bin_path())
        .arg(input.to_str().expect("path"))
        .output()
        .expect("run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("UTF-8"), "stderr: {stderr}");
}

#[test]
fn oversized_width_is_rejected() {
    let input = temp_file("hugewidth", RECEIPT.as_bytes());
    let output = Command::new(bin_path())
        .args(["-w", "184467440737095516", input.to_str().expect("path")])
        .env_remove("PENNYBOOK_WIDTH")
        .output()
        .expect("run");

    assert!(!output.status.success(), "expected error exit code");
    assert!(output.stdout.is_empty(), "no partial output");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("max_line_width"), "stderr: {stderr}");
}
