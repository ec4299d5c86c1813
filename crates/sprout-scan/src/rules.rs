//! Compiled exclusion rules.
//!
//! A [`RuleSet`] is the compiled form of one pattern source: one ignore
//! file, or the exclusion settings. Its globs are relative to a base
//! directory, and it only has an opinion about paths under that base.

use crate::error::{Result, ScanError};
use crate::gitignore::gitignore_chain;
use crate::patterns::{patterns_from_file, patterns_from_str, GlobPattern};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use sprout_core::NegationMode;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// What a rule set says about a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Some pattern excludes the path.
    Excluded,
    /// The deciding pattern was a negation.
    Included,
    /// No pattern matched.
    Unmatched,
}

/// Where a rule set's patterns came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    IgnoreFile(PathBuf),
    Settings,
}

/// Patterns from one source, compiled against a base directory.
#[derive(Debug, Clone)]
pub struct RuleSet {
    base: PathBuf,
    source: RuleSource,
    patterns: Vec<GlobPattern>,
    set: GlobSet,
}

impl RuleSet {
    /// Compiles `patterns` relative to `base`.
    ///
    /// Globs are compiled without their negation marker; the marker is
    /// kept alongside for [`NegationMode::Honor`].
    pub fn new(base: PathBuf, source: RuleSource, patterns: Vec<GlobPattern>) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            let glob = GlobBuilder::new(pattern.exclusion())
                .literal_separator(true)
                .backslash_escape(true)
                .build()
                .map_err(|e| ScanError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| ScanError::InvalidPattern {
            pattern: patterns
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            reason: e.to_string(),
        })?;

        Ok(Self {
            base,
            source,
            patterns,
            set,
        })
    }

    /// Reads and compiles the ignore file at `path`, based at its directory.
    pub fn from_ignore_file(path: &Path) -> Result<Self> {
        let base = path.parent().unwrap_or(path);
        Self::from_ignore_file_at(path, base)
    }

    /// Reads and compiles the ignore file at `path`, matching relative to
    /// `base` instead of the file's own directory.
    pub fn from_ignore_file_at(path: &Path, base: &Path) -> Result<Self> {
        let patterns = patterns_from_file(path)?;
        Self::new(
            base.to_path_buf(),
            RuleSource::IgnoreFile(path.to_path_buf()),
            patterns,
        )
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn source(&self) -> &RuleSource {
        &self.source
    }

    pub fn patterns(&self) -> &[GlobPattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Judges an absolute path.
    pub fn verdict(&self, path: &Path, mode: NegationMode) -> Verdict {
        let Some(relative) = relative_glob_path(&self.base, path) else {
            return Verdict::Unmatched;
        };

        match mode {
            NegationMode::Strip => {
                if self.set.is_match(relative.as_str()) {
                    Verdict::Excluded
                } else {
                    Verdict::Unmatched
                }
            }
            NegationMode::Honor => {
                match self.set.matches(relative.as_str()).into_iter().max() {
                    Some(index) if self.patterns[index].negated => Verdict::Included,
                    Some(_) => Verdict::Excluded,
                    None => Verdict::Unmatched,
                }
            }
        }
    }
}

/// `path` relative to `base`, `/`-separated. `None` if outside `base`
/// or equal to it.
fn relative_glob_path(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// All rules that apply to one scan.
///
/// Ignore-file sets are kept outermost first so that, under
/// [`NegationMode::Honor`], a deeper file overrides a shallower one.
/// Settings exclusions are applied on top and can't be re-included.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    ignore_files: Vec<RuleSet>,
    settings: Option<RuleSet>,
    mode: NegationMode,
}

impl ExclusionSet {
    /// Gathers the rules for a scan of `root`.
    ///
    /// With `use_gitignore`, every `.gitignore` from `root` up to the
    /// filesystem root contributes. Every `true` entry of `exclude`
    /// contributes. All of these are matched relative to `root`, so a
    /// parent rule that names the root itself never hides its contents.
    pub fn build(
        root: &Path,
        use_gitignore: bool,
        exclude: &BTreeMap<String, bool>,
        mode: NegationMode,
    ) -> Result<Self> {
        let mut ignore_files = Vec::new();
        if use_gitignore {
            for file in gitignore_chain(root)?.into_iter().rev() {
                ignore_files.push(RuleSet::from_ignore_file_at(&file, root)?);
            }
        }

        let enabled: Vec<&str> = exclude
            .iter()
            .filter(|(_, on)| **on)
            .map(|(pattern, _)| pattern.as_str())
            .collect();
        let settings = if enabled.is_empty() {
            None
        } else {
            let patterns = patterns_from_str(&enabled.join("\n"));
            Some(RuleSet::new(root.to_path_buf(), RuleSource::Settings, patterns)?)
        };

        let set = Self {
            ignore_files,
            settings,
            mode,
        };
        debug!(
            "Exclusion set for {}: {} ignore files, {} patterns",
            root.display(),
            set.ignore_files.len(),
            set.pattern_count()
        );
        Ok(set)
    }

    /// Adds the rules of an ignore file found inside the scanned tree.
    ///
    /// It must be deeper than every set already present.
    pub fn push_ignore_file(&mut self, rules: RuleSet) {
        self.ignore_files.push(rules);
    }

    /// Drops ignore-file sets whose base isn't an ancestor of `path`.
    pub fn retain_ancestors_of(&mut self, path: &Path) {
        self.ignore_files
            .retain(|rules| path.starts_with(rules.base()) && path != rules.base());
    }

    pub fn mode(&self) -> NegationMode {
        self.mode
    }

    /// Total number of compiled patterns.
    pub fn pattern_count(&self) -> usize {
        self.ignore_files.iter().map(|r| r.patterns().len()).sum::<usize>()
            + self.settings.as_ref().map_or(0, |s| s.patterns().len())
    }

    /// Every pattern, outermost ignore file first, settings last.
    pub fn patterns(&self) -> impl Iterator<Item = &GlobPattern> {
        self.ignore_files
            .iter()
            .chain(self.settings.iter())
            .flat_map(|rules| rules.patterns().iter())
    }

    /// True if `path` (absolute) should be left out.
    pub fn is_excluded(&self, path: &Path) -> bool {
        if let Some(settings) = &self.settings {
            if settings.verdict(path, self.mode) == Verdict::Excluded {
                return true;
            }
        }

        let mut excluded = false;
        for rules in &self.ignore_files {
            match rules.verdict(path, self.mode) {
                Verdict::Excluded => {
                    if self.mode == NegationMode::Strip {
                        return true;
                    }
                    excluded = true;
                }
                Verdict::Included => excluded = false,
                Verdict::Unmatched => {}
            }
        }
        excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn rules(base: &str, contents: &str) -> RuleSet {
        RuleSet::new(
            PathBuf::from(base),
            RuleSource::Settings,
            patterns_from_str(contents),
        )
        .unwrap()
    }

    #[test]
    fn test_unanchored_matches_at_any_depth() {
        let rules = rules("/w", "build/");
        let mode = NegationMode::Strip;

        assert_eq!(rules.verdict(Path::new("/w/build"), mode), Verdict::Excluded);
        assert_eq!(rules.verdict(Path::new("/w/a/b/build"), mode), Verdict::Excluded);
        assert_eq!(rules.verdict(Path::new("/w/build/x"), mode), Verdict::Excluded);
        assert_eq!(rules.verdict(Path::new("/w/builder"), mode), Verdict::Unmatched);
    }

    #[test]
    fn test_anchored_matches_only_at_base() {
        let rules = rules("/w", "/build");
        let mode = NegationMode::Strip;

        assert_eq!(rules.verdict(Path::new("/w/build"), mode), Verdict::Excluded);
        assert_eq!(rules.verdict(Path::new("/w/a/build"), mode), Verdict::Unmatched);
    }

    #[test]
    fn test_paths_outside_base_are_unmatched() {
        let rules = rules("/w/sub", "build/");
        assert_eq!(
            rules.verdict(Path::new("/w/build"), NegationMode::Strip),
            Verdict::Unmatched
        );
        assert_eq!(
            rules.verdict(Path::new("/w/sub"), NegationMode::Strip),
            Verdict::Unmatched
        );
    }

    #[test]
    fn test_star_does_not_cross_separator() {
        let rules = rules("/w", "/src/*");
        let mode = NegationMode::Strip;
        assert_eq!(rules.verdict(Path::new("/w/src/a"), mode), Verdict::Excluded);
        // `src/*/**` still covers the subtree of an excluded child.
        assert_eq!(rules.verdict(Path::new("/w/src/a/b"), mode), Verdict::Excluded);
        assert_eq!(rules.verdict(Path::new("/w/src"), mode), Verdict::Unmatched);
    }

    #[test]
    fn test_negation_strip_vs_honor() {
        let rules = rules("/w", "logs/\n!logs/");
        let path = Path::new("/w/logs");

        assert_eq!(rules.verdict(path, NegationMode::Strip), Verdict::Excluded);
        assert_eq!(rules.verdict(path, NegationMode::Honor), Verdict::Included);
    }

    #[test]
    fn test_invalid_glob_is_an_error() {
        let err = RuleSet::new(
            PathBuf::from("/w"),
            RuleSource::Settings,
            patterns_from_str("[unclosed"),
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::InvalidPattern { .. }));
    }

    #[test]
    fn test_build_uses_only_true_settings() {
        let dir = tempdir().unwrap();
        let exclude = BTreeMap::from([
            ("ignored/".to_string(), true),
            ("folder/".to_string(), false),
        ]);

        let set = ExclusionSet::build(dir.path(), false, &exclude, NegationMode::Strip).unwrap();

        assert!(set.is_excluded(&dir.path().join("ignored")));
        assert!(!set.is_excluded(&dir.path().join("folder")));
    }

    #[test]
    fn test_build_reads_gitignore_when_enabled() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "cache/\n").unwrap();
        let none = BTreeMap::new();

        let with = ExclusionSet::build(dir.path(), true, &none, NegationMode::Strip).unwrap();
        assert!(with.is_excluded(&dir.path().join("cache")));

        let without = ExclusionSet::build(dir.path(), false, &none, NegationMode::Strip).unwrap();
        assert!(!without.is_excluded(&dir.path().join("cache")));
        assert_eq!(without.pattern_count(), 0);
    }

    #[test]
    fn test_parent_ignore_file_is_based_at_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("build");
        fs::create_dir_all(&root).unwrap();
        fs::write(dir.path().join(".gitignore"), "build/\n/out\n").unwrap();
        let none = BTreeMap::new();

        let set = ExclusionSet::build(&root, true, &none, NegationMode::Strip).unwrap();

        assert!(!set.is_excluded(&root.join("src")));
        assert!(set.is_excluded(&root.join("build")));
        assert!(set.is_excluded(&root.join("out")));
        assert!(!set.is_excluded(&root.join("src").join("out")));
    }

    #[test]
    fn test_deeper_ignore_file_overrides_under_honor() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "generated/\n").unwrap();
        let none = BTreeMap::new();
        let mut set = ExclusionSet::build(dir.path(), true, &none, NegationMode::Honor).unwrap();

        let sub = dir.path().join("pkg");
        set.push_ignore_file(rules(sub.to_str().unwrap(), "!generated/"));

        assert!(set.is_excluded(&dir.path().join("generated")));
        assert!(!set.is_excluded(&sub.join("generated")));
    }

    #[test]
    fn test_retain_ancestors_drops_siblings() {
        let dir = tempdir().unwrap();
        let none = BTreeMap::new();
        let mut set = ExclusionSet::build(dir.path(), false, &none, NegationMode::Strip).unwrap();
        let a = dir.path().join("a");
        set.push_ignore_file(rules(a.to_str().unwrap(), "x/"));

        set.retain_ancestors_of(&a.join("y"));
        assert!(set.is_excluded(&a.join("x")));

        set.retain_ancestors_of(&dir.path().join("b"));
        assert!(!set.is_excluded(&a.join("x")));
    }
}
