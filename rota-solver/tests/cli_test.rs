#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use helpers::*;

#[test]
fn cli_prints_the_roster_and_the_summary() {
    let instance = fixture("week.toml");
    let config = fixture("week_rules.toml");
    let output = run_solver(&[
        instance.to_str().expect("utf-8 path"),
        "--config",
        config.to_str().expect("utf-8 path"),
        "--time-limit",
        "30000",
    ]);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains("Day 1 (Monday)"));
    assert!(stdout.contains("Day 7 (Sunday)"));
    assert!(stdout.contains("1800 - 0200"));
    assert!(stdout.lines().any(|line| line.starts_with("Ann")));
    assert!(stdout.contains("Penalties:"));
    assert!(stdout.contains("Status: "));
}

#[test]
fn cli_logs_statistics_on_request() {
    let instance = fixture("week.toml");
    let config = fixture("week_rules.toml");
    let output = run_solver(&[
        instance.to_str().expect("utf-8 path"),
        "--config",
        config.to_str().expect("utf-8 path"),
        "--log-statistics",
        "--time-limit",
        "30000",
    ]);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains("%% stat:"));
}

#[test]
fn cli_fails_on_an_invalid_instance() {
    let instance = fixture("unknown_staff.toml");
    let output = run_solver(&[instance.to_str().expect("utf-8 path")]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains("Execution failed"));
    assert!(stdout.contains("Zed"));
}

#[test]
fn cli_fails_on_a_missing_config() {
    let instance = fixture("week.toml");
    let config = fixture("does_not_exist.toml");
    let output = run_solver(&[
        instance.to_str().expect("utf-8 path"),
        "--config",
        config.to_str().expect("utf-8 path"),
    ]);

    assert_eq!(output.status.code(), Some(1));
}
