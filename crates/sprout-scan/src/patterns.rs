//! Turning gitignore lines into glob patterns.
//!
//! Every non-empty line becomes a pair of globs: one for the path itself
//! and one for everything beneath it, so `build/` hides the directory
//! and its whole subtree. Unanchored lines get a `**/` prefix so they
//! match at any depth below the ignore file.

use crate::error::{Result, ScanError};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// One glob derived from an ignore line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobPattern {
    /// Glob text, relative to the directory the rule was read from.
    pub glob: String,

    /// The line started with `!` (re-include in gitignore terms).
    pub negated: bool,
}

impl GlobPattern {
    pub fn new(glob: impl Into<String>, negated: bool) -> Self {
        Self {
            glob: glob.into(),
            negated,
        }
    }

    /// The glob with any negation dropped, for use as a plain exclude.
    pub fn exclusion(&self) -> &str {
        &self.glob
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "!{}", self.glob)
        } else {
            write!(f, "{}", self.glob)
        }
    }
}

/// Reads an ignore file and translates every line.
pub fn patterns_from_file(path: &Path) -> Result<Vec<GlobPattern>> {
    let contents = fs::read_to_string(path).map_err(|source| ScanError::ReadIgnoreFile {
        path: path.to_path_buf(),
        source,
    })?;
    let patterns = patterns_from_str(&contents);
    debug!("{} patterns from {}", patterns.len(), path.display());
    Ok(patterns)
}

/// Translates newline-separated gitignore lines.
pub fn patterns_from_str(contents: &str) -> Vec<GlobPattern> {
    contents.lines().flat_map(translate_line).collect()
}

/// Translates a single line. Blank lines and comments yield nothing.
fn translate_line(line: &str) -> Vec<GlobPattern> {
    let line = trim_trailing_spaces(line.trim_end_matches('\r'));
    if line.is_empty() || line.starts_with('#') {
        return Vec::new();
    }

    let (negated, line) = match line.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, line),
    };

    // `\#` and `\!` escape a literal first character.
    let line = match line.strip_prefix('\\') {
        Some(rest) if rest.starts_with('#') || rest.starts_with('!') => rest,
        _ => line,
    };

    let line = line.trim_end_matches('/');
    if line.is_empty() {
        return Vec::new();
    }

    // A separator at the start or in the middle ties the pattern to the
    // ignore file's directory.
    let anchored = line.contains('/');
    let mut body = line.trim_start_matches('/');
    while let Some(rest) = body.strip_suffix("/**") {
        body = rest;
    }

    if body.is_empty() || body == "**" {
        return vec![GlobPattern::new("**", negated)];
    }

    let base = if anchored || body.starts_with("**/") {
        body.to_string()
    } else {
        format!("**/{}", body)
    };

    vec![
        GlobPattern::new(format!("{}/**", base), negated),
        GlobPattern::new(base, negated),
    ]
}

/// Drops trailing spaces unless escaped with a backslash.
fn trim_trailing_spaces(line: &str) -> &str {
    let mut end = line.len();
    while line[..end].ends_with(' ') && !line[..end - 1].ends_with('\\') {
        end -= 1;
    }
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn globs(contents: &str) -> Vec<String> {
        patterns_from_str(contents)
            .into_iter()
            .map(|p| p.to_string())
            .collect()
    }

    #[test]
    fn test_directory_pattern_matches_anywhere() {
        assert_eq!(globs("ignored/"), ["**/ignored/**", "**/ignored"]);
    }

    #[test]
    fn test_recursive_suffix_is_anchored() {
        assert_eq!(globs("ignored/**"), ["ignored/**", "ignored"]);
    }

    #[test]
    fn test_leading_slash_anchors() {
        assert_eq!(globs("/build"), ["build/**", "build"]);
        assert_eq!(globs("docs/api"), ["docs/api/**", "docs/api"]);
    }

    #[test]
    fn test_double_star_prefix_kept() {
        assert_eq!(globs("**/.git"), ["**/.git/**", "**/.git"]);
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        assert!(globs("# comment\n\n   \n").is_empty());
    }

    #[test]
    fn test_negation_recorded() {
        let patterns = patterns_from_str("!keep/");
        assert!(patterns.iter().all(|p| p.negated));
        assert_eq!(patterns[1].exclusion(), "**/keep");
        assert_eq!(patterns[1].to_string(), "!**/keep");
    }

    #[test]
    fn test_escaped_leading_characters() {
        assert_eq!(globs("\\#notes"), ["**/#notes/**", "**/#notes"]);
        let patterns = patterns_from_str("\\!bang");
        assert!(patterns.iter().all(|p| !p.negated));
        assert_eq!(patterns[1].glob, "**/!bang");
    }

    #[test]
    fn test_crlf_and_trailing_spaces() {
        assert_eq!(globs("tmp  \r\nlog\\ "), ["**/tmp/**", "**/tmp", "**/log\\ /**", "**/log\\ "]);
    }

    #[test]
    fn test_everything_pattern() {
        assert_eq!(globs("**"), ["**"]);
        assert_eq!(globs("/**"), ["**"]);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".gitignore");
        fs::write(&path, "target/\n").unwrap();

        let patterns = patterns_from_file(&path).unwrap();
        assert_eq!(patterns.len(), 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = patterns_from_file(&dir.path().join(".gitignore")).unwrap_err();
        assert!(matches!(err, ScanError::ReadIgnoreFile { .. }));
    }
}
