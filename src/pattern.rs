//! Include/exclude path matching for fileset classification.
//! Patterns follow directory-glob semantics: `*` stays within one path segment,
//! `**` spans any number of segments (including none) and `?` matches a single
//! character. Separators are normalized to `/` on both sides, so a pattern
//! written with `/` matches a candidate written with `\` and vice versa.

use crate::constants::DEFAULT_EXCLUDES;
use crate::error::{Error, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use log::debug;

/// Include pattern used when a fileset declares none.
pub const DEFAULT_INCLUDE: &str = "**/*";

/// Compiled include/exclude pattern pair.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    includes: GlobSet,
    excludes: GlobSet,
}

impl PatternMatcher {
    /// Compiles include and exclude patterns.
    ///
    /// # Arguments
    /// * `includes` - Include patterns; `**/*` is used when empty
    /// * `excludes` - Caller excludes, added to [`DEFAULT_EXCLUDES`]
    /// * `case_sensitive` - Whether matching distinguishes letter case
    ///
    /// # Errors
    /// * `Error::PatternError` if any pattern is not a valid glob
    pub fn new<S: AsRef<str>>(
        includes: &[S],
        excludes: &[S],
        case_sensitive: bool,
    ) -> Result<Self> {
        let includes: Vec<&str> = if includes.iter().all(|p| p.as_ref().trim().is_empty()) {
            vec![DEFAULT_INCLUDE]
        } else {
            includes.iter().map(AsRef::as_ref).collect()
        };
        let excludes: Vec<&str> = DEFAULT_EXCLUDES
            .iter()
            .copied()
            .chain(excludes.iter().map(AsRef::as_ref))
            .collect();

        debug!("Compiling includes {includes:?} with {} excludes", excludes.len());

        Ok(Self {
            includes: build_set(&includes, case_sensitive)?,
            excludes: build_set(&excludes, case_sensitive)?,
        })
    }

    /// Returns true if `path` matches at least one include and no exclude.
    pub fn matches(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.includes.is_match(&path) && !self.excludes.is_match(&path)
    }
}

/// Evaluates a single path against include and exclude patterns (case-sensitive).
///
/// # Errors
/// * `Error::PatternError` if any pattern is not a valid glob
pub fn matches<S: AsRef<str>>(path: &str, includes: &[S], excludes: &[S]) -> Result<bool> {
    Ok(PatternMatcher::new(includes, excludes, true)?.matches(path))
}

fn build_set(patterns: &[&str], case_sensitive: bool) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for raw in patterns {
        let pattern = normalize_pattern(raw);
        if pattern.is_empty() {
            continue;
        }
        let glob = GlobBuilder::new(&pattern)
            .literal_separator(true)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|source| Error::PatternError { pattern: raw.to_string(), source })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| Error::PatternError {
        pattern: patterns.join(","),
        source,
    })
}

/// Normalizes a relative path to `/` separators without leading `./` or `/`
/// and without empty segments.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalizes a pattern the same way as a path. A trailing separator marks a
/// directory pattern, which selects everything beneath that directory.
pub fn normalize_pattern(pattern: &str) -> String {
    let pattern = pattern.trim();
    let directory = pattern.ends_with('/') || pattern.ends_with('\\');
    let normalized = normalize_path(pattern);
    if directory && !normalized.is_empty() {
        format!("{normalized}/**")
    } else {
        normalized
    }
}

/// Splits the comma-separated pattern form into individual patterns.
pub fn split_patterns(patterns: &str) -> Vec<String> {
    patterns
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
