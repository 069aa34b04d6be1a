//! Architectural Enforcement Integration Tests
//!
//! Source-scanning tests that keep the greeter's production code honest:
//! - No blocking I/O inside async functions
//! - No sleep() calls
//! - No unwrap()/expect() outside tests
//!
//! The helpers here locate the production sources and strip test modules so
//! each test only has to look for its own pattern.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["greeter/core/src", "greeter/daemon/src"];

/// Workspace root (two levels above this crate)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// A production source file with its test module removed
pub struct SourceFile {
    /// Path to the file
    pub path: PathBuf,
    /// Lines up to (not including) the first `#[cfg(test)]`
    pub lines: Vec<String>,
}

impl SourceFile {
    /// Load `path`, dropping everything from the first `#[cfg(test)]` on
    pub fn load(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        let lines = content
            .lines()
            .take_while(|line| line.trim() != "#[cfg(test)]")
            .map(str::to_owned)
            .collect();

        Some(Self {
            path: path.to_path_buf(),
            lines,
        })
    }

    /// Code part of line `idx` (line comments and doc comments stripped)
    pub fn code(&self, idx: usize) -> &str {
        let line = &self.lines[idx];
        line.split("//").next().unwrap_or(line)
    }

    /// Format a violation for line `idx`
    pub fn violation(&self, idx: usize, what: &str) -> String {
        format!(
            "{}:{} - {}: {}",
            self.path.display(),
            idx + 1,
            what,
            self.lines[idx].trim()
        )
    }
}

/// Every production `.rs` file in the workspace
pub fn production_sources() -> Vec<SourceFile> {
    let root = workspace_root();

    PRODUCTION_DIRS
        .iter()
        .map(|dir| root.join(dir))
        .filter(|dir| dir.exists())
        .flat_map(|dir| {
            walkdir::WalkDir::new(dir)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
                .map(|e| e.into_path())
                .collect::<Vec<_>>()
        })
        .filter_map(|path| SourceFile::load(&path))
        .collect()
}

/// Whether line `idx` sits inside an `async fn`
///
/// Scans backwards for the nearest function signature.
pub fn is_in_async_function(lines: &[String], idx: usize) -> bool {
    for line in lines[..=idx].iter().rev() {
        let line = line.trim();

        if line.contains("async fn ") {
            return true;
        }

        if line.contains("fn ") && !line.starts_with("//") {
            return false;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_finds_production_sources() {
        let sources = production_sources();
        assert!(
            sources.iter().any(|s| s.path.ends_with("listener.rs")),
            "listener.rs should be scanned"
        );
        assert!(
            sources.iter().any(|s| s.path.ends_with("main.rs")),
            "daemon main.rs should be scanned"
        );
    }

    #[test]
    fn test_async_function_detection() {
        let code = lines(&[
            "pub async fn bind(config: ListenerConfig) -> Result<Self, ListenerError> {",
            "    let x = 1;",
            "}",
        ]);
        assert!(is_in_async_function(&code, 1));
    }

    #[test]
    fn test_sync_function_detection() {
        let code = lines(&[
            "fn parse_mode(s: &str) -> Result<u32, String> {",
            "    let digits = s;",
            "}",
        ]);
        assert!(!is_in_async_function(&code, 1));
    }
}
