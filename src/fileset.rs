//! Fileset specifications and classification of project files into filesets.
//!
//! A [`FilesetSpec`] names a base directory, include/exclude patterns evaluated
//! relative to that directory, and the rendering attributes shared by every
//! file it selects. [`classify`] filters a [`CandidatePaths`] set down to the
//! files of one fileset; [`Filesets::classify_all`] runs every configured
//! fileset in role precedence order so each file is claimed at most once.

use crate::constants::{DESCRIPTOR_FILE, PROJECT_FILE};
use crate::descriptor::Role;
use crate::encoding::Charset;
use crate::error::{Error, Result};
use crate::pattern::{normalize_path, split_patterns, PatternMatcher};
use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::Deserialize;
use std::path::Path;
use walkdir::WalkDir;

/// One logical group of files, e.g. the main sources.
#[derive(Debug, Clone)]
pub struct FilesetSpec {
    directory: String,
    includes: Vec<String>,
    excludes: Vec<String>,
    encoding: Charset,
    filtered: bool,
    packaged: bool,
    case_sensitive: bool,
    matcher: PatternMatcher,
}

impl FilesetSpec {
    /// Starts a fileset rooted at `directory` whose files use `encoding`.
    pub fn builder<S: Into<String>>(directory: S, encoding: Charset) -> FilesetBuilder {
        FilesetBuilder {
            directory: directory.into(),
            includes: Vec::new(),
            excludes: Vec::new(),
            encoding,
            filtered: true,
            packaged: false,
            case_sensitive: true,
        }
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    pub fn encoding(&self) -> &Charset {
        &self.encoding
    }

    pub fn filtered(&self) -> bool {
        self.filtered
    }

    pub fn packaged(&self) -> bool {
        self.packaged
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Returns true if `relative` (relative to the fileset directory) is selected.
    pub fn matches(&self, relative: &str) -> bool {
        self.matcher.matches(relative)
    }
}

/// Builder for [`FilesetSpec`]. Patterns are compiled by [`FilesetBuilder::build`].
#[derive(Debug, Clone)]
pub struct FilesetBuilder {
    directory: String,
    includes: Vec<String>,
    excludes: Vec<String>,
    encoding: Charset,
    filtered: bool,
    packaged: bool,
    case_sensitive: bool,
}

impl FilesetBuilder {
    pub fn include<S: Into<String>>(mut self, pattern: S) -> Self {
        self.includes.push(pattern.into());
        self
    }

    pub fn includes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn exclude<S: Into<String>>(mut self, pattern: S) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn filtered(mut self, filtered: bool) -> Self {
        self.filtered = filtered;
        self
    }

    pub fn packaged(mut self, packaged: bool) -> Self {
        self.packaged = packaged;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Compiles the patterns and freezes the fileset.
    ///
    /// # Errors
    /// * `Error::PatternError` if an include or exclude is not a valid glob
    pub fn build(self) -> Result<FilesetSpec> {
        let matcher = PatternMatcher::new(&self.includes, &self.excludes, self.case_sensitive)?;
        Ok(FilesetSpec {
            directory: normalize_path(&self.directory),
            includes: self.includes,
            excludes: self.excludes,
            encoding: self.encoding,
            filtered: self.filtered,
            packaged: self.packaged,
            case_sensitive: self.case_sensitive,
            matcher,
        })
    }
}

/// Every regular file under a project root, as `/`-separated relative paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePaths {
    paths: IndexSet<String>,
}

impl CandidatePaths {
    /// Builds a candidate set from paths using either separator style.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = paths
            .into_iter()
            .map(|p| normalize_path(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();
        Self { paths }
    }

    /// Walks `root` and collects every regular file except the project
    /// descriptor and the archetype manifest. A missing root yields an empty set.
    ///
    /// # Errors
    /// * `Error::WalkError` if a directory cannot be read
    pub fn scan<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            debug!("'{}' does not exist, nothing to scan", root.display());
            return Ok(Self::default());
        }

        let mut paths = IndexSet::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| Error::ConfigError(e.to_string()))?;
            let relative = normalize_path(&relative.to_string_lossy());
            if relative == PROJECT_FILE || relative == DESCRIPTOR_FILE {
                continue;
            }
            paths.insert(relative);
        }
        debug!("Found {} candidate files under '{}'", paths.len(), root.display());
        Ok(Self { paths })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(&normalize_path(path))
    }

    /// Drops the given paths from the set, keeping the order of the rest.
    pub fn remove_all<'a, I: IntoIterator<Item = &'a str>>(&mut self, claimed: I) {
        for path in claimed {
            self.paths.shift_remove(path);
        }
    }
}

/// Returns `path` relative to `base` if it lies strictly beneath it. Without
/// `case_sensitive` the directory names of `base` match in any case.
fn relativize<'a>(path: &'a str, base: &str, case_sensitive: bool) -> Option<&'a str> {
    if base.is_empty() {
        return Some(path);
    }
    let prefix = path.get(..base.len())?;
    let same = if case_sensitive {
        prefix == base
    } else {
        prefix.to_lowercase() == base.to_lowercase()
    };
    if !same {
        return None;
    }
    path[base.len()..].strip_prefix('/').filter(|rest| !rest.is_empty())
}

/// Joins two relative directories, ignoring empty parts.
pub fn join_relative(base: &str, directory: &str) -> String {
    normalize_path(&format!("{base}/{directory}"))
}

/// Selects the candidates that belong to `spec`.
///
/// Candidates are first restricted to those nested under `basedir` joined with
/// the fileset directory, then matched against the fileset patterns relative to
/// that directory. The result keeps the input order and the project-relative
/// form of each path. A directory absent from the candidates yields an empty list.
pub fn classify(basedir: &str, spec: &FilesetSpec, candidates: &CandidatePaths) -> Vec<String> {
    let base = join_relative(basedir, spec.directory());
    candidates
        .iter()
        .filter(|path| {
            relativize(path, &base, spec.case_sensitive())
                .is_some_and(|relative| spec.matches(relative))
        })
        .map(str::to_string)
        .collect()
}

/// A candidate claimed by a fileset.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedPath<'a> {
    pub role: Role,
    pub path: String,
    pub fileset: &'a FilesetSpec,
}

/// Filesets grouped by the descriptor role they populate.
#[derive(Debug, Clone, Default)]
pub struct Filesets {
    filesets: IndexMap<Role, Vec<FilesetSpec>>,
}

impl Filesets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conventional Maven layout.
    pub fn maven_defaults(encoding: &Charset) -> Result<Self> {
        let mut filesets = Self::new();
        filesets.add(
            Role::Sources,
            FilesetSpec::builder("src/main/java", encoding.clone()).packaged(true).build()?,
        );
        filesets.add(
            Role::TestSources,
            FilesetSpec::builder("src/test/java", encoding.clone()).packaged(true).build()?,
        );
        filesets.add(
            Role::Resources,
            FilesetSpec::builder("src/main/resources", encoding.clone()).build()?,
        );
        filesets.add(
            Role::TestResources,
            FilesetSpec::builder("src/test/resources", encoding.clone()).build()?,
        );
        filesets.add(
            Role::SiteResources,
            FilesetSpec::builder("src/site", encoding.clone()).build()?,
        );
        Ok(filesets)
    }

    /// Reads fileset definitions from a JSON or YAML file.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the content is neither valid JSON nor YAML
    /// * `Error::PatternError` / `Error::UnsupportedEncodingError` for invalid fileset fields
    pub fn from_file<P: AsRef<Path>>(path: P, default_encoding: &Charset) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading filesets from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, default_encoding)
    }

    /// Parses fileset definitions keyed by role, trying JSON first and YAML second.
    pub fn parse(content: &str, default_encoding: &Charset) -> Result<Self> {
        let raw: IndexMap<Role, Vec<FilesetConfig>> = match serde_json::from_str(content) {
            Ok(v) => v,
            Err(_) => serde_yaml::from_str(content).map_err(|e| {
                Error::ConfigError(format!("Invalid fileset configuration: {e}"))
            })?,
        };

        let mut filesets = Self::new();
        for (role, configs) in raw {
            for config in configs {
                filesets.add(role, config.into_spec(default_encoding)?);
            }
        }
        Ok(filesets)
    }

    pub fn add(&mut self, role: Role, spec: FilesetSpec) {
        self.filesets.entry(role).or_default().push(spec);
    }

    pub fn get(&self, role: Role) -> &[FilesetSpec] {
        self.filesets.get(&role).map(Vec::as_slice).unwrap_or_default()
    }

    /// Classifies candidates into every fileset in role precedence order.
    ///
    /// Paths claimed by an earlier fileset are removed from the pool of later
    /// ones, so each candidate appears at most once in the result.
    pub fn classify_all(
        &self,
        basedir: &str,
        candidates: &CandidatePaths,
    ) -> Vec<ClassifiedPath<'_>> {
        let mut pool = candidates.clone();
        let mut classified = Vec::new();

        for role in Role::PRECEDENCE {
            for spec in self.get(role) {
                let claimed = classify(basedir, spec, &pool);
                debug!(
                    "{} fileset '{}' claimed {} files",
                    role,
                    spec.directory(),
                    claimed.len()
                );
                pool.remove_all(claimed.iter().map(String::as_str));
                classified.extend(claimed.into_iter().map(|path| ClassifiedPath {
                    role,
                    path,
                    fileset: spec,
                }));
            }
        }
        classified
    }
}

impl PartialEq for FilesetSpec {
    fn eq(&self, other: &Self) -> bool {
        self.directory == other.directory
            && self.includes == other.includes
            && self.excludes == other.excludes
            && self.encoding == other.encoding
            && self.filtered == other.filtered
            && self.packaged == other.packaged
            && self.case_sensitive == other.case_sensitive
    }
}

/// Patterns given either as a list or as one comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PatternList {
    List(Vec<String>),
    Csv(String),
}

impl Default for PatternList {
    fn default() -> Self {
        PatternList::List(Vec::new())
    }
}

impl PatternList {
    pub fn into_patterns(self) -> Vec<String> {
        match self {
            PatternList::List(patterns) => patterns,
            PatternList::Csv(patterns) => split_patterns(&patterns),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Serialized form of a fileset in a fileset configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesetConfig {
    pub directory: String,
    #[serde(default)]
    pub includes: PatternList,
    #[serde(default)]
    pub excludes: PatternList,
    pub encoding: Option<String>,
    #[serde(default = "default_true")]
    pub filtered: bool,
    #[serde(default)]
    pub packaged: bool,
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
}

impl FilesetConfig {
    /// Validates the configuration, falling back to `default_encoding`.
    pub fn into_spec(self, default_encoding: &Charset) -> Result<FilesetSpec> {
        let encoding = match self.encoding {
            Some(label) => Charset::for_label(label)?,
            None => default_encoding.clone(),
        };
        FilesetSpec::builder(self.directory, encoding)
            .includes(self.includes.into_patterns())
            .excludes(self.excludes.into_patterns())
            .filtered(self.filtered)
            .packaged(self.packaged)
            .case_sensitive(self.case_sensitive)
            .build()
    }
}
