//! In-memory model of an archetype manifest.
//!
//! Each of the five roles keeps its entries in one insertion-ordered map from
//! template path to [`TemplateDescriptor`], so the path order and the per-path
//! attributes cannot drift apart.

pub mod xml;

use crate::encoding::Charset;
use crate::pattern::normalize_path;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;

/// The five file lists of an archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Sources,
    TestSources,
    Resources,
    TestResources,
    SiteResources,
}

impl Role {
    /// Order in which filesets claim files during creation.
    pub const PRECEDENCE: [Role; 5] = [
        Role::Sources,
        Role::TestSources,
        Role::Resources,
        Role::TestResources,
        Role::SiteResources,
    ];

    /// Manifest element holding the list.
    pub fn list_element(self) -> &'static str {
        match self {
            Role::Sources => "sources",
            Role::TestSources => "testSources",
            Role::Resources => "resources",
            Role::TestResources => "testResources",
            Role::SiteResources => "siteResources",
        }
    }

    /// Manifest element of a single entry.
    pub fn entry_element(self) -> &'static str {
        match self {
            Role::Sources | Role::TestSources => "source",
            Role::Resources | Role::TestResources | Role::SiteResources => "resource",
        }
    }

    pub fn from_list_element(name: &str) -> Option<Role> {
        Role::PRECEDENCE.into_iter().find(|role| role.list_element() == name)
    }

    fn index(self) -> usize {
        match self {
            Role::Sources => 0,
            Role::TestSources => 1,
            Role::Resources => 2,
            Role::TestResources => 3,
            Role::SiteResources => 4,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.list_element())
    }
}

/// Rendering attributes of a single template file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDescriptor {
    pub filtered: bool,
    pub encoding: Charset,
}

impl TemplateDescriptor {
    pub fn new(filtered: bool, encoding: Charset) -> Self {
        Self { filtered, encoding }
    }
}

/// A property the archetype expects to be set before generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredProperty {
    pub key: String,
    pub default_value: Option<String>,
    pub validation_regex: Option<String>,
}

impl RequiredProperty {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self { key: key.into(), default_value: None, validation_regex: None }
    }

    pub fn with_default<S: Into<String>>(mut self, default_value: S) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn with_validation<S: Into<String>>(mut self, regex: S) -> Self {
        self.validation_regex = Some(regex.into());
        self
    }
}

/// The archetype manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchetypeDescriptor {
    id: String,
    allow_partial: bool,
    default_encoding: Charset,
    required_properties: Vec<RequiredProperty>,
    entries: [IndexMap<String, TemplateDescriptor>; 5],
}

impl ArchetypeDescriptor {
    /// Creates an empty descriptor. Entries added without explicit attributes
    /// are filtered and use `default_encoding`.
    pub fn new<S: Into<String>>(id: S, default_encoding: Charset) -> Self {
        Self {
            id: id.into(),
            allow_partial: false,
            default_encoding,
            required_properties: Vec::new(),
            entries: Default::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn allow_partial(&self) -> bool {
        self.allow_partial
    }

    pub fn set_allow_partial(&mut self, allow_partial: bool) {
        self.allow_partial = allow_partial;
    }

    pub fn default_encoding(&self) -> &Charset {
        &self.default_encoding
    }

    /// Descriptor attached to paths added without explicit attributes.
    pub fn default_template(&self) -> TemplateDescriptor {
        TemplateDescriptor::new(true, self.default_encoding.clone())
    }

    /// Appends `path` to the list of `role` unless present. A path that is
    /// already listed keeps its current descriptor.
    pub fn add(&mut self, role: Role, path: &str) {
        let template = self.default_template();
        self.insert(role, path, template);
    }

    /// Appends `path` with `template` unless present; an existing entry wins.
    pub fn insert(&mut self, role: Role, path: &str, template: TemplateDescriptor) {
        self.entries[role.index()].entry(normalize_path(path)).or_insert(template);
    }

    /// Replaces the descriptor of `path`, appending the path if needed. A listed
    /// path keeps its position.
    pub fn set_template(&mut self, role: Role, path: &str, template: TemplateDescriptor) {
        self.entries[role.index()].insert(normalize_path(path), template);
    }

    pub fn add_source(&mut self, path: &str) {
        self.add(Role::Sources, path);
    }

    pub fn add_test_source(&mut self, path: &str) {
        self.add(Role::TestSources, path);
    }

    pub fn add_resource(&mut self, path: &str) {
        self.add(Role::Resources, path);
    }

    pub fn add_test_resource(&mut self, path: &str) {
        self.add(Role::TestResources, path);
    }

    pub fn add_site_resource(&mut self, path: &str) {
        self.add(Role::SiteResources, path);
    }

    /// Ordered paths of `role`.
    pub fn paths(&self, role: Role) -> Vec<&str> {
        self.entries[role.index()].keys().map(String::as_str).collect()
    }

    pub fn sources(&self) -> Vec<&str> {
        self.paths(Role::Sources)
    }

    pub fn test_sources(&self) -> Vec<&str> {
        self.paths(Role::TestSources)
    }

    pub fn resources(&self) -> Vec<&str> {
        self.paths(Role::Resources)
    }

    pub fn test_resources(&self) -> Vec<&str> {
        self.paths(Role::TestResources)
    }

    pub fn site_resources(&self) -> Vec<&str> {
        self.paths(Role::SiteResources)
    }

    /// Descriptor of `path` in `role`, or `None` if the path is unclassified there.
    pub fn template(&self, role: Role, path: &str) -> Option<&TemplateDescriptor> {
        self.entries[role.index()].get(&normalize_path(path))
    }

    /// Ordered `(path, descriptor)` pairs of `role`.
    pub fn entries(&self, role: Role) -> impl Iterator<Item = (&str, &TemplateDescriptor)> {
        self.entries[role.index()].iter().map(|(path, template)| (path.as_str(), template))
    }

    /// Every entry, roles in precedence order.
    pub fn all_entries(&self) -> impl Iterator<Item = (Role, &str, &TemplateDescriptor)> {
        Role::PRECEDENCE
            .into_iter()
            .flat_map(move |role| self.entries(role).map(move |(path, t)| (role, path, t)))
    }

    /// Role the path is listed under, if any.
    pub fn role_of(&self, path: &str) -> Option<Role> {
        let path = normalize_path(path);
        Role::PRECEDENCE.into_iter().find(|role| self.entries[role.index()].contains_key(&path))
    }

    pub fn required_properties(&self) -> &[RequiredProperty] {
        &self.required_properties
    }

    /// Declares a required property, replacing a previous declaration of the same key.
    pub fn add_required_property(&mut self, property: RequiredProperty) {
        match self.required_properties.iter_mut().find(|p| p.key == property.key) {
            Some(existing) => *existing = property,
            None => self.required_properties.push(property),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(IndexMap::is_empty)
    }
}
