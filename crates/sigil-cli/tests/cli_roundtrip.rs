//! Black-box determinism tests for the `sigil` binary:
//! same input => same sigil, and a rehydrated tree reproduces it.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn sigil_bin() -> &'static str {
    env!("CARGO_BIN_EXE_sigil")
}

fn run(args: &[&str], cwd: &Path) -> Output {
    Command::new(sigil_bin())
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("failed to spawn sigil")
}

fn stdout_json(out: &Output) -> serde_json::Value {
    assert!(
        out.status.success(),
        "sigil failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("stdout is not JSON")
}

fn seed_fixture(root: &Path) {
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("README.md"), b"# demo\n").unwrap();
    fs::write(root.join("src").join("main.txt"), b"hello world\n").unwrap();
    fs::write(root.join("src").join("data.bin"), [0u8, 1, 2, 255]).unwrap();
}

#[test]
fn compute_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fixture");
    seed_fixture(&input);

    let a = stdout_json(&run(&["--json", "compute", "fixture"], dir.path()));
    let b = stdout_json(&run(&["--json", "compute", "fixture"], dir.path()));
    assert_eq!(a["sigil"], b["sigil"]);
    assert!(a["sigil"].as_str().unwrap().starts_with("v1-"));
}

#[test]
fn rehydrate_reproduces_the_sigil() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fixture");
    seed_fixture(&input);

    let computed = stdout_json(&run(&["--json", "compute", "fixture"], dir.path()));
    let sigil = computed["sigil"].as_str().unwrap().to_string();

    let rehydrated = stdout_json(&run(&["--json", "rehydrate", &sigil, "restored"], dir.path()));
    assert_eq!(rehydrated["wrote"], "tree");
    assert_eq!(
        fs::read(dir.path().join("restored").join("src").join("main.txt")).unwrap(),
        b"hello world\n"
    );

    let recomputed = stdout_json(&run(&["--json", "compute", "restored"], dir.path()));
    assert_eq!(recomputed["sigil"].as_str().unwrap(), sigil);
}

#[test]
fn verify_distinguishes_match_from_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fixture");
    seed_fixture(&input);

    let computed = stdout_json(&run(&["--json", "compute", "fixture"], dir.path()));
    let sigil = computed["sigil"].as_str().unwrap().to_string();

    let ok = run(&["--json", "verify", "fixture", &sigil], dir.path());
    assert_eq!(ok.status.code(), Some(0));

    // One byte changes: verification fails with exit code 1.
    fs::write(input.join("README.md"), b"# demP\n").unwrap();
    let bad = run(&["--json", "verify", "fixture", &sigil], dir.path());
    assert_eq!(bad.status.code(), Some(1));
}

#[test]
fn corrupted_sigil_exits_with_checksum_code() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fixture");
    seed_fixture(&input);

    let computed = stdout_json(&run(&["--json", "compute", "fixture"], dir.path()));
    let sigil = computed["sigil"].as_str().unwrap().to_string();

    // Swap one glyph group for a different valid ordinal.
    let mut parts: Vec<String> = sigil.split('-').map(str::to_string).collect();
    let idx = 1;
    parts[idx] = if parts[idx] == "042" { "043".into() } else { "042".into() };
    let corrupted = parts.join("-");

    let out = run(&["--json", "verify", "fixture", &corrupted], dir.path());
    assert_eq!(out.status.code(), Some(5), "expected checksum-mismatch exit");
}

#[test]
fn gc_then_rehydrate_reports_missing_content() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fixture");
    seed_fixture(&input);

    let computed = stdout_json(&run(&["--json", "compute", "fixture"], dir.path()));
    let sigil = computed["sigil"].as_str().unwrap().to_string();

    // Collect with nothing kept: the store empties.
    let gc = stdout_json(&run(&["--json", "gc"], dir.path()));
    assert!(gc["removed"].as_u64().unwrap() >= 3);

    let out = run(&["--json", "rehydrate", &sigil, "restored"], dir.path());
    assert_eq!(out.status.code(), Some(3), "expected not-found exit");
}

#[test]
fn json_description_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("desc.json"),
        br#"{"b":2,"a":1,"blob":{"$blob":"68656c6c6f"}}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("desc_reordered.json"),
        br#"{"a":1,"blob":{"$blob":"68656c6c6f"},"b":2}"#,
    )
    .unwrap();

    let a = stdout_json(&run(&["--json", "compute", "desc.json"], dir.path()));
    let b = stdout_json(&run(&["--json", "compute", "desc_reordered.json"], dir.path()));
    assert_eq!(a["sigil"], b["sigil"]);

    let sigil = a["sigil"].as_str().unwrap().to_string();
    let rehydrated = stdout_json(&run(&["--json", "rehydrate", &sigil, "restored.json"], dir.path()));
    assert_eq!(rehydrated["wrote"], "json");

    let recomputed = stdout_json(&run(&["--json", "compute", "restored.json"], dir.path()));
    assert_eq!(recomputed["sigil"].as_str().unwrap(), sigil);
}
