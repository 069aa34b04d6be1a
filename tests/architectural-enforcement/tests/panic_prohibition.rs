//! Integration Test: Panic Prohibition
//!
//! **Policy**: Production code propagates errors; it does not `unwrap()`.
//!
//! A panic in a connection task only kills that connection, but a panic on
//! the startup path or in the accept loop takes the whole listener down.

use architectural_enforcement::{production_sources, SourceFile};

/// Test that production code does not unwrap or expect
#[test]
fn test_no_unwrap_in_production_code() {
    let mut violations = Vec::new();

    for source in production_sources() {
        check_source(&source, &mut violations);
    }

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Panicking calls found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {}", violation);
        }

        eprintln!("\n✅ INSTEAD:");
        eprintln!("  - Return ListenerError from the library");
        eprintln!("  - Use anyhow::Context in the binaries");
        eprintln!("  - Log and continue for per-connection failures");

        panic!(
            "\nFound {} panicking call(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

fn check_source(source: &SourceFile, violations: &mut Vec<String>) {
    for idx in 0..source.lines.len() {
        let code = source.code(idx);

        if code.contains(".unwrap()") || code.contains(".expect(") || code.contains("panic!(") {
            violations.push(source.violation(idx, "Panicking call"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_unwrap_detection() {
        let src = SourceFile {
            path: PathBuf::from("fake.rs"),
            lines: vec![
                "let listener = UnixListener::bind(path).unwrap();".to_string(),
                "let meta = metadata.unwrap_or(default);".to_string(),
            ],
        };

        let mut violations = Vec::new();
        check_source(&src, &mut violations);
        assert_eq!(violations.len(), 1);
    }
}
