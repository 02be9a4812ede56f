//! Ignore patterns for source enumeration.
//!
//! Patterns use gitignore semantics via the `ignore` crate: a pattern without
//! a `/` matches a file or directory name at any depth.

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::CollectError;

/// Patterns skipped unless disabled: VCS folders, dotfiles and editor backups.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &["CVS", ".*", "*~"];

/// Compiled ignore patterns.
#[derive(Debug, Clone)]
pub struct IgnorePatterns {
    matcher: Gitignore,
    patterns: Vec<String>,
}

impl Default for IgnorePatterns {
    fn default() -> Self {
        Self::empty()
    }
}

impl IgnorePatterns {
    /// A pattern set that matches nothing.
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
            patterns: Vec::new(),
        }
    }

    /// Compiles `patterns`. Blank lines and `#` comments are skipped.
    pub fn new<I, S>(patterns: I) -> Result<Self, CollectError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GitignoreBuilder::new("");
        let mut kept = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() || pattern.starts_with('#') {
                continue;
            }
            builder
                .add_line(None, pattern)
                .map_err(|e| CollectError::IgnorePattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                })?;
            kept.push(pattern.to_string());
        }

        let matcher = builder.build().map_err(|e| CollectError::IgnorePattern {
            pattern: kept.join(", "),
            message: e.to_string(),
        })?;

        Ok(Self {
            matcher,
            patterns: kept,
        })
    }

    /// Compiles `extra` patterns, preceded by [`DEFAULT_IGNORE_PATTERNS`]
    /// when `use_defaults` is set.
    pub fn with_defaults(extra: &[String], use_defaults: bool) -> Result<Self, CollectError> {
        let defaults = DEFAULT_IGNORE_PATTERNS
            .iter()
            .copied()
            .filter(|_| use_defaults);
        Self::new(defaults.chain(extra.iter().map(String::as_str)))
    }

    /// Checks a `/`-separated path relative to the source root.
    pub fn is_ignored(&self, relative: &str, is_dir: bool) -> bool {
        self.matcher.matched(relative, is_dir).is_ignore()
    }

    /// Patterns in effect, in the order they were added.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ignores_nothing() {
        let patterns = IgnorePatterns::empty();
        assert!(!patterns.is_ignored(".git", true));
        assert!(patterns.patterns().is_empty());
    }

    #[test]
    fn defaults_ignore_dotfiles_backups_and_cvs() {
        let patterns = IgnorePatterns::with_defaults(&[], true).unwrap();
        assert!(patterns.is_ignored(".DS_Store", false));
        assert!(patterns.is_ignored("css/.hidden", false));
        assert!(patterns.is_ignored("app.js~", false));
        assert!(patterns.is_ignored("CVS", true));
        assert!(patterns.is_ignored("vendor/CVS", true));
        assert!(!patterns.is_ignored("app.js", false));
        assert!(!patterns.is_ignored("css", true));
    }

    #[test]
    fn defaults_can_be_disabled() {
        let patterns = IgnorePatterns::with_defaults(&["*.map".to_string()], false).unwrap();
        assert!(!patterns.is_ignored(".DS_Store", false));
        assert!(patterns.is_ignored("js/app.js.map", false));
        assert_eq!(patterns.patterns(), ["*.map"]);
    }

    #[test]
    fn comments_and_blank_lines_skipped() {
        let patterns = IgnorePatterns::new(["# comment", "", "  *.scss  "]).unwrap();
        assert_eq!(patterns.patterns(), ["*.scss"]);
        assert!(patterns.is_ignored("css/main.scss", false));
    }

    #[test]
    fn anchored_patterns_match_from_root() {
        let patterns = IgnorePatterns::new(["/admin"]).unwrap();
        assert!(patterns.is_ignored("admin", true));
        assert!(!patterns.is_ignored("vendor/admin", true));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let result = IgnorePatterns::new(["{unclosed"]);
        assert!(matches!(result, Err(CollectError::IgnorePattern { .. })));
    }
}
