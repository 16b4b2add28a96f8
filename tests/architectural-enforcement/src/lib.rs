//! Architectural Enforcement
//!
//! Source scanners shared by the integration tests in `tests/`. They enforce
//! the async discipline of the lipsync crates:
//! - No sleep calls in production code (periodic work uses `tokio::time::interval`)
//! - No blocking I/O inside async functions
//!
//! Scanning is line based. Everything from the first `#[cfg(test)]` in a
//! file onward is treated as test code and skipped.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Production source trees checked by the enforcement tests
pub const PRODUCTION_DIRS: [&str; 2] = ["lipsync/core/src", "lipsync/cli/src"];

/// Workspace root (two levels above this crate)
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// A rule violation at a source line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// File the violation is in
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// What rule was broken
    pub kind: &'static str,
    /// The offending source line, trimmed
    pub text: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.kind,
            self.text
        )
    }
}

/// A production source file, test section removed
#[derive(Clone, Debug)]
pub struct SourceFile {
    /// Path on disk
    pub path: PathBuf,
    /// Lines before the first `#[cfg(test)]`
    pub lines: Vec<String>,
}

impl SourceFile {
    /// Build from file contents
    pub fn from_content(path: impl Into<PathBuf>, content: &str) -> Self {
        Self {
            path: path.into(),
            lines: production_lines(content)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Record a violation at 0-based line `idx`
    #[must_use]
    pub fn violation(&self, idx: usize, kind: &'static str) -> Violation {
        Violation {
            path: self.path.clone(),
            line: idx + 1,
            kind,
            text: self.lines[idx].trim().to_string(),
        }
    }
}

/// Lines up to (not including) the first `#[cfg(test)]`
#[must_use]
pub fn production_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .take_while(|line| !line.trim_start().starts_with("#[cfg(test)]"))
        .collect()
}

/// The part of a line before any `//` comment
#[must_use]
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Kind of function a line sits in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FnKind {
    /// `fn`
    Sync,
    /// `async fn`
    Async,
}

/// If `line` starts a function, whether it is async
#[must_use]
pub fn fn_signature(line: &str) -> Option<FnKind> {
    let mut is_async = false;
    for token in code_part(line).split_whitespace() {
        match token {
            "async" => is_async = true,
            "fn" => {
                return Some(if is_async { FnKind::Async } else { FnKind::Sync });
            }
            t if t == "pub" || t.starts_with("pub(") || t == "const" || t == "unsafe" => {}
            _ => return None,
        }
    }
    None
}

/// Innermost function enclosing line `idx`, found by scanning upward
#[must_use]
pub fn enclosing_fn<S: AsRef<str>>(lines: &[S], idx: usize) -> Option<FnKind> {
    (0..=idx)
        .rev()
        .find_map(|i| fn_signature(lines[i].as_ref()))
}

/// Load every `.rs` file under `dir`
///
/// A missing directory is an error: a scanner pointed at nothing would pass
/// vacuously.
pub fn load_sources(dir: &Path) -> std::io::Result<Vec<SourceFile>> {
    if !dir.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("source directory {} does not exist", dir.display()),
        ));
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
    {
        let content = fs::read_to_string(entry.path())?;
        files.push(SourceFile::from_content(entry.path(), &content));
    }
    Ok(files)
}

/// Load all production sources of the workspace
pub fn workspace_sources() -> std::io::Result<Vec<SourceFile>> {
    let root = workspace_root();
    let mut files = Vec::new();
    for dir in PRODUCTION_DIRS {
        files.extend(load_sources(&root.join(dir))?);
    }
    Ok(files)
}

/// Sleep calls anywhere in production code
#[must_use]
pub fn sleep_violations(file: &SourceFile) -> Vec<Violation> {
    file.lines
        .iter()
        .enumerate()
        .filter(|(_, line)| {
            let code = code_part(line);
            code.contains("::sleep(") || code.contains(".sleep(") || code.contains("sleep_until(")
        })
        .map(|(idx, _)| file.violation(idx, "Sleep call"))
        .collect()
}

const BLOCKING_PATTERNS: [(&str, &str); 6] = [
    ("std::fs::", "Blocking file I/O"),
    ("use std::fs", "Blocking file I/O"),
    ("std::net::", "Blocking network I/O"),
    ("std::process::Command", "Blocking process I/O"),
    ("reqwest::blocking", "Blocking HTTP client"),
    ("std::io::stdin()", "Blocking stdin in async"),
];

/// Blocking I/O inside async functions
///
/// Blocking calls in plain functions (config loading before the runtime
/// does real work) are allowed. `reqwest::blocking` is never allowed.
#[must_use]
pub fn blocking_io_violations(file: &SourceFile) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (idx, line) in file.lines.iter().enumerate() {
        let code = code_part(line);
        for (pattern, kind) in BLOCKING_PATTERNS {
            if !code.contains(pattern) {
                continue;
            }
            let in_async = enclosing_fn(&file.lines, idx) == Some(FnKind::Async);
            if in_async || pattern == "reqwest::blocking" {
                violations.push(file.violation(idx, kind));
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let content = "fn a() {}\n#[cfg(test)]\nmod tests {\n    fn b() {}\n}\n";
        assert_eq!(production_lines(content), vec!["fn a() {}"]);
    }

    #[test]
    fn test_fn_signature() {
        assert_eq!(fn_signature("pub async fn run(self) {"), Some(FnKind::Async));
        assert_eq!(fn_signature("    async fn synthesize("), Some(FnKind::Async));
        assert_eq!(fn_signature("pub(crate) fn build() {"), Some(FnKind::Sync));
        assert_eq!(fn_signature("pub const fn raw() -> Self {"), Some(FnKind::Sync));
        assert_eq!(fn_signature("let f = |x| x;"), None);
        assert_eq!(fn_signature("// fn commented()"), None);
    }

    #[test]
    fn test_blocking_io_detection() {
        let file = SourceFile::from_content(
            "bad.rs",
            "async fn bad_function() {\n    let s = std::fs::read_to_string(\"f\")?;\n}\n",
        );
        let violations = blocking_io_violations(&file);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 2);
        assert_eq!(violations[0].kind, "Blocking file I/O");
    }

    #[test]
    fn test_blocking_io_allowed_in_sync_fn() {
        let file = SourceFile::from_content(
            "ok.rs",
            "pub fn load() {\n    let s = std::fs::read_to_string(\"config.toml\");\n}\n",
        );
        assert!(blocking_io_violations(&file).is_empty());
    }

    #[test]
    fn test_blocking_io_in_test_module_ignored() {
        let file = SourceFile::from_content(
            "ok.rs",
            "fn a() {}\n#[cfg(test)]\nmod tests {\n    async fn t() { std::fs::read(\"x\"); }\n}\n",
        );
        assert!(blocking_io_violations(&file).is_empty());
    }

    #[test]
    fn test_sleep_detection() {
        let file = SourceFile::from_content(
            "bad.rs",
            "async fn poll() {\n    tokio::time::sleep(d).await;\n    // thread::sleep(d)\n}\n",
        );
        let violations = sleep_violations(&file);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 2);
    }

    #[test]
    fn test_workspace_root_contains_production_dirs() {
        let root = workspace_root();
        for dir in PRODUCTION_DIRS {
            assert!(root.join(dir).is_dir(), "missing {dir}");
        }
    }
}
