//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async code in the lipsync crates MUST NOT use blocking I/O.
//! **Required**: `tokio::fs`, async `reqwest`, not `std::fs`, `std::net`,
//! `reqwest::blocking`.
//!
//! Plain (non-async) functions may block; configuration is loaded that way
//! before any utterance runs.

use architectural_enforcement::{blocking_io_violations, workspace_sources};

#[test]
fn test_no_blocking_io_in_async_code() {
    let sources = workspace_sources().expect("production sources readable");
    assert!(!sources.is_empty(), "no production sources found");

    let violations: Vec<_> = sources.iter().flat_map(blocking_io_violations).collect();

    if !violations.is_empty() {
        eprintln!("\n❌ Blocking I/O found in async code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n❌ FORBIDDEN in async fns:");
        eprintln!("  - std::fs::read(), std::fs::write(), std::fs::File");
        eprintln!("  - std::net::TcpStream, std::net::TcpListener");
        eprintln!("  - std::process::Command");
        eprintln!("  - reqwest::blocking::* (anywhere)");
        eprintln!("\n✅ REQUIRED:");
        eprintln!("  - tokio::fs::write().await");
        eprintln!("  - reqwest::Client (async)");

        panic!(
            "\nFound {} blocking I/O violation(s) in async code.",
            violations.len()
        );
    }
}
