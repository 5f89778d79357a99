//! Template renderer and content rendering for archetype files.
//! Placeholders take the form `${name}`. Only names present in the property
//! bag are substituted; anything else, such as build-tool expressions like
//! `${project.version}`, is left exactly as written.

use crate::encoding::Charset;
use crate::error::{Error, Result};
use crate::properties::PropertyBag;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^${}\s]+)\}").expect("placeholder pattern is valid"));

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given properties.
    ///
    /// # Arguments
    /// * `template` - Template string to render
    /// * `properties` - Values for placeholder substitution
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template string
    fn render(&self, template: &str, properties: &PropertyBag) -> Result<String>;
}

/// Renderer for `${name}` placeholders.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderRenderer;

impl PlaceholderRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for PlaceholderRenderer {
    fn render(&self, template: &str, properties: &PropertyBag) -> Result<String> {
        let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| {
            match properties.get(&caps[1]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            }
        });
        Ok(rendered.into_owned())
    }
}

/// Renders file content declared in `encoding`.
///
/// The content is decoded strictly, rendered and encoded back in the same
/// charset, so multi-byte sequences survive untouched.
///
/// # Errors
/// * `Error::MalformedContentError` if the bytes are not valid in `encoding` or the
///   rendered text contains characters the charset cannot represent
pub fn render_content(
    source: &[u8],
    encoding: &Charset,
    properties: &PropertyBag,
    renderer: &dyn TemplateRenderer,
) -> Result<Vec<u8>> {
    let malformed = || Error::MalformedContentError { encoding: encoding.label().to_string() };
    let text = encoding.decode(source).ok_or_else(malformed)?;
    let rendered = renderer.render(&text, properties)?;
    let bytes = encoding.encode(&rendered).ok_or_else(malformed)?;
    Ok(bytes.into_owned())
}

/// Replaces occurrences of property values with `${key}` placeholders.
///
/// At each position the longest matching value wins; the text is scanned once,
/// so inserted placeholders are never rewritten again. When two keys share a
/// value, `prefer` wins if it is one of them, otherwise the key inserted first.
/// Empty values and `skip` keys are ignored.
pub fn templatize(
    text: &str,
    properties: &PropertyBag,
    skip: &[&str],
    prefer: Option<&str>,
) -> Result<String> {
    let mut by_value: Vec<(&str, &str)> = Vec::new();
    for (key, value) in properties.iter() {
        if value.is_empty() || skip.contains(&key) {
            continue;
        }
        match by_value.iter_mut().find(|(_, v)| *v == value) {
            Some(existing) if prefer == Some(key) => existing.0 = key,
            Some(_) => {}
            None => by_value.push((key, value)),
        }
    }
    if by_value.is_empty() {
        return Ok(text.to_string());
    }
    by_value.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let alternation =
        by_value.iter().map(|(_, value)| regex::escape(value)).collect::<Vec<_>>().join("|");
    let pattern = Regex::new(&alternation).map_err(|e| Error::TemplateError(e.to_string()))?;
    let templated = pattern.replace_all(text, |caps: &Captures| {
        let matched = &caps[0];
        by_value
            .iter()
            .find(|(_, value)| *value == matched)
            .map(|(key, _)| format!("${{{key}}}"))
            .unwrap_or_else(|| matched.to_string())
    });
    Ok(templated.into_owned())
}
