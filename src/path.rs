//! Path rendering for template files.
//! Template paths carry `__name__` tokens; `__packageInPathFormat__` stands for
//! the package directories (`com.example` → `com/example`).

use crate::constants::PACKAGE_IN_PATH_FORMAT;
use crate::error::{Error, Result};
use crate::pattern::normalize_path;
use crate::properties::{package_to_path, PropertyBag};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PATH_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"__([A-Za-z][A-Za-z0-9.\-]*)__").expect("path token pattern is valid")
});

fn token_value(key: &str, properties: &PropertyBag) -> Option<String> {
    match properties.get(key) {
        Some(value) => Some(value.to_string()),
        None if key == PACKAGE_IN_PATH_FORMAT => properties.get("package").map(package_to_path),
        None => None,
    }
}

/// Renders a template path into a concrete project path.
///
/// Tokens naming unknown properties stay in place. Empty segments left by an
/// empty package are dropped.
pub fn render_path(template_path: &str, properties: &PropertyBag) -> String {
    normalize_path(&render_tokens(template_path, properties))
}

fn render_tokens(template_path: &str, properties: &PropertyBag) -> String {
    PATH_TOKEN
        .replace_all(template_path, |caps: &Captures| {
            token_value(&caps[1], properties).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Renders a template path and checks that the result stays below the
/// directory it will be joined to.
///
/// # Errors
/// * `Error::TemplateError` if the rendered path is empty, absolute or has a `..` segment
pub fn render_target_path(template_path: &str, properties: &PropertyBag) -> Result<String> {
    let rendered = render_tokens(template_path, properties);
    if !is_rendered_path_valid(&rendered) {
        return Err(Error::TemplateError(format!(
            "template path '{template_path}' renders to '{rendered}', which is not a relative path \
             inside the output directory"
        )));
    }
    Ok(normalize_path(&rendered))
}

/// Returns true for a non-empty relative path without `..` segments, root or
/// drive prefix. Either separator style is accepted.
pub fn is_rendered_path_valid(path: &str) -> bool {
    let path = path.replace('\\', "/");
    if path.starts_with('/') {
        return false;
    }
    let segments: Vec<&str> =
        path.split('/').filter(|segment| !segment.is_empty() && *segment != ".").collect();
    match segments.first() {
        None => false,
        Some(first) if first.chars().nth(1) == Some(':') => false,
        Some(_) => !segments.contains(&".."),
    }
}

/// Collapses the package directories of a concrete path into the package token.
///
/// Only the segments directly beneath `root` are compared with the package, so
/// a directory elsewhere in the path that happens to share a package name is
/// left alone. Paths outside `root`, or with nothing below the package
/// directories, are returned unchanged (normalized).
pub fn collapse_package(path: &str, root: &str, package: &str) -> String {
    let path = normalize_path(path);
    let root = normalize_path(root);
    let package_dirs: Vec<&str> = package.split('.').filter(|s| !s.is_empty()).collect();
    if package_dirs.is_empty() {
        return path;
    }

    let rest = if root.is_empty() {
        Some(path.as_str())
    } else {
        path.strip_prefix(&root).and_then(|rest| rest.strip_prefix('/'))
    };
    let Some(rest) = rest else {
        return path;
    };

    let segments: Vec<&str> = rest.split('/').collect();
    if segments.len() <= package_dirs.len() || segments[..package_dirs.len()] != package_dirs[..] {
        return path;
    }

    let remainder = segments[package_dirs.len()..].join("/");
    let token = format!("__{PACKAGE_IN_PATH_FORMAT}__");
    normalize_path(&format!("{root}/{token}/{remainder}"))
}
