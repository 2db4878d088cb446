/// Smoke tests: drive the binary through its one-shot commands
use std::process::{Command, Output};

fn termclock(args: &[&str]) -> Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .output()
        .expect("Failed to execute cargo run")
}

#[test]
fn binary_shows_help() {
    let output = termclock(&["--help"]);
    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("termclock"), "Help output should mention termclock");
    for command in ["board", "sun", "terminator", "lookup", "sync"] {
        assert!(stdout.contains(command), "Help should list `{command}`");
    }
}

#[test]
fn binary_shows_version() {
    let output = termclock(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn sun_prints_solstice_position() {
    let output = termclock(&["sun", "--at", "2026-06-21T12:00:00Z"]);
    assert!(
        output.status.success(),
        "sun failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("declination       0.409"));
    assert!(stdout.contains("23.45°N"));
}

#[test]
fn terminator_prints_every_sample() {
    let output = termclock(&["terminator", "--at", "2026-12-21T00:00:00Z", "--format", "points"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 181);

    let output = termclock(&["terminator", "--at", "2026-12-21T00:00:00Z"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("M 0.00 "));
}

#[test]
fn unreadable_map_falls_back_to_plain_projection() {
    let output = termclock(&[
        "terminator",
        "--at",
        "2026-12-21T00:00:00Z",
        "--format",
        "points",
        "--map",
        "/nonexistent/land-110m.json",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 181);
    assert!(stdout.lines().last().unwrap_or_default().starts_with("800.00 "));
}

#[test]
fn unreachable_server_fails_without_panic() {
    let output = termclock(&["--server", "http://127.0.0.1:9", "sync"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Sync failed"));
    assert!(!stderr.contains("panicked at"));
}

#[test]
fn invalid_subcommand_fails_gracefully() {
    let output = termclock(&["nonexistent-command"]);

    // Should fail with error, not panic
    assert!(
        !output.status.success(),
        "Invalid subcommand should return error status"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("panicked at"),
        "Invalid subcommand should not cause panic"
    );
}
