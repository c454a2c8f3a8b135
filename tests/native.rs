//! Builds the generated C++ with the system compiler and runs it.
//! Skipped when no `c++` is on the PATH.

use fsmc::parser::parse_source;
use fsmc::processor;
use fsmc::writer::cpp;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

fn have_cxx() -> bool {
    Command::new("c++")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn build(src: &str, dir: &Path) -> PathBuf {
    let program = processor::run(parse_source(src).unwrap()).unwrap();
    let cpp_path = dir.join("machine.cpp");
    cpp::emit(&program, "machine.fsm", &cpp_path).unwrap();

    let exe = dir.join("machine");
    let status = Command::new("c++")
        .args(["-std=c++11", "-o"])
        .arg(&exe)
        .arg(&cpp_path)
        .status()
        .unwrap();
    assert!(status.success(), "c++ rejected the generated code");
    exe
}

fn run_with_stdin(exe: &Path, dir: &Path, stdin: &str) -> String {
    let mut child = Command::new(exe)
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn generated_accept_reject_runs() {
    if !have_cxx() {
        eprintln!("no c++ compiler found, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let exe = build(include_str!("../demos/accept_reject.fsm"), dir.path());

    assert_eq!(run_with_stdin(&exe, dir.path(), "y"), "accepted");
    assert_eq!(run_with_stdin(&exe, dir.path(), "n"), "rejected");
    assert_eq!(run_with_stdin(&exe, dir.path(), ""), "");
}

#[test]
fn generated_turnstile_matches_interpreter() {
    if !have_cxx() {
        eprintln!("no c++ compiler found, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let exe = build(include_str!("../demos/turnstile.fsm"), dir.path());

    let out = run_with_stdin(&exe, dir.path(), "coin\npush\nquit\ncoin\n");
    assert_eq!(out, "locked ()\nunlocked (coin)\nlocked (push)\n");

    let log = std::fs::read_to_string(dir.path().join("turnstile.log")).unwrap();
    assert_eq!(log, "locked after \nunlocked after coin\nlocked after push\n");
}

#[test]
fn generated_escaped_quotes_compile() {
    if !have_cxx() {
        eprintln!("no c++ compiler found, skipping");
        return;
    }
    let src = r#"
INPUT quoted "\"q\""
STATE Wait [quoted:Said]
STATE Said [quoted:END]
{ PRINT "say \"hi\" to $in, path C:\\tmp\n" }
SCAN ","
"#;
    let dir = tempfile::tempdir().unwrap();
    let exe = build(src, dir.path());

    assert_eq!(
        run_with_stdin(&exe, dir.path(), "\"q\",\"q\",x,"),
        "say \"hi\" to \"q\", path C:\\tmp\n"
    );
}
