//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the lipsync crates MUST NOT call sleep.
//! Periodic work uses `tokio::time::interval`; waiting uses channels.
//! Test code is exempt.

use architectural_enforcement::{sleep_violations, workspace_sources};

#[test]
fn test_no_sleep_in_production_code() {
    let sources = workspace_sources().expect("production sources readable");
    assert!(!sources.is_empty(), "no production sources found");

    let violations: Vec<_> = sources.iter().flat_map(sleep_violations).collect();

    if !violations.is_empty() {
        eprintln!("\n❌ Sleep calls found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Use instead:");
        eprintln!("  - tokio::time::interval() for periodic ticks");
        eprintln!("  - watch / oneshot / Notify to wait for events");

        panic!(
            "\nFound {} sleep violation(s) in production code.",
            violations.len()
        );
    }
}

#[test]
fn test_tick_task_uses_interval() {
    let sources = workspace_sources().expect("production sources readable");
    let tick = sources
        .iter()
        .find(|file| file.path.ends_with("animation/tick.rs"))
        .expect("tick task source present");

    assert!(tick
        .lines
        .iter()
        .any(|line| line.contains("tokio::time::interval(")));
}
