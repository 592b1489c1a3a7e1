//! CLI arg handling of the clusterdash binary.
use assert_cmd::Command;

fn run(args: &[&str]) -> (bool, String) {
    let output = Command::cargo_bin("clusterdash")
        .expect("binary built")
        .args(args)
        .env("XDG_CONFIG_HOME", std::env::temp_dir().join("clusterdash-cli-tests"))
        .output()
        .expect("run clusterdash");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    (output.status.success(), text)
}

#[test]
fn help_mentions_short_and_long_flags() {
    let (ok, text) = run(&["--help"]);
    assert!(ok);
    for flag in ["--tls-ca", "-t", "--profile", "-P", "--timeout", "--dry-run"] {
        assert!(text.contains(flag), "help text missing {flag}\n{text}");
    }
}

#[test]
fn flags_are_accepted_before_help() {
    for args in [
        &["--tls-ca", "/tmp/cert.pem", "--help"][..],
        &["-t", "/tmp/cert.pem", "--help"][..],
        &["--profile", "dev", "--help"][..],
        &["--timeout", "5", "--help"][..],
    ] {
        let (ok, text) = run(args);
        assert!(ok, "{args:?} did not succeed");
        assert!(text.contains("Usage:"), "{args:?}: {text}");
    }
}

#[test]
fn dry_run_reports_resolved_endpoint() {
    let (ok, text) = run(&["--timeout", "7", "--dry-run", "http://127.0.0.1:5000/api/clusters"]);
    assert!(ok, "{text}");
    assert!(text.contains("endpoint: http://127.0.0.1:5000/api/clusters"), "{text}");
    assert!(text.contains("timeout: 7s"), "{text}");
}

#[test]
fn non_http_endpoint_is_refused() {
    let (ok, text) = run(&["--dry-run", "ws://127.0.0.1:3000/ws"]);
    assert!(!ok);
    assert!(text.contains("unsupported scheme"), "{text}");
}
