//! Archetype creation from an existing project.
//!
//! The project tree is scanned once and classified into the five roles in
//! precedence order. Every claimed file is copied below
//! `archetype-resources`; files of packaged filesets get their package
//! directories collapsed into `__packageInPathFormat__`, and filtered text
//! files get property values replaced by `${key}` placeholders.

use crate::constants::{DESCRIPTOR_FILE, PACKAGE_IN_PATH_FORMAT, PROJECT_FILE, RESOURCES_DIR};
use crate::descriptor::{xml, ArchetypeDescriptor, RequiredProperty, Role, TemplateDescriptor};
use crate::encoding::Charset;
use crate::error::{Error, Result};
use crate::fileset::{CandidatePaths, ClassifiedPath, Filesets};
use crate::path::collapse_package;
use crate::properties::PropertyBag;
use crate::renderer::templatize;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Properties every generated project needs.
const WELL_KNOWN_PROPERTIES: [&str; 4] = ["groupId", "artifactId", "version", "package"];

/// Settings of one creation run.
#[derive(Debug, Clone)]
pub struct CreateOptions {
    pub id: String,
    pub encoding: Charset,
    pub allow_partial: bool,
    /// Write into a non-empty output directory
    pub force: bool,
}

/// A project file captured into the archetype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFile {
    pub role: Option<Role>,
    pub source_path: String,
    pub template_path: String,
    pub filtered: bool,
}

/// Ensures the archetype output directory is empty unless `force` is set.
///
/// # Errors
/// * `Error::OutputDirectoryExistsError` if the directory has content and `force` is false
pub fn ensure_empty_output_dir<P: AsRef<Path>>(output_dir: P, force: bool) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    let populated = output_dir.is_dir() && fs::read_dir(output_dir)?.next().is_some();
    if populated && !force {
        return Err(Error::OutputDirectoryExistsError {
            output_dir: output_dir.display().to_string(),
        });
    }
    Ok(output_dir.to_path_buf())
}

/// Required property declarations recorded in a new archetype.
///
/// The well-known coordinates are always declared: `version` defaults to
/// `1.0-SNAPSHOT` and `package` to `${groupId}`. Every other property of the
/// creation run becomes a required property defaulting to its current value.
pub fn required_properties(properties: &PropertyBag) -> Vec<RequiredProperty> {
    let mut required = vec![
        RequiredProperty::new("groupId"),
        RequiredProperty::new("artifactId"),
        RequiredProperty::new("version").with_default("1.0-SNAPSHOT"),
        RequiredProperty::new("package").with_default("${groupId}"),
    ];
    required.extend(
        properties
            .iter()
            .filter(|(key, _)| {
                !WELL_KNOWN_PROPERTIES.contains(key) && *key != PACKAGE_IN_PATH_FORMAT
            })
            .map(|(key, value)| RequiredProperty::new(key).with_default(value)),
    );
    required
}

/// Captures a project directory as an archetype directory.
pub struct Creator<'a> {
    project_dir: PathBuf,
    output_dir: PathBuf,
    filesets: &'a Filesets,
    properties: &'a PropertyBag,
}

impl<'a> Creator<'a> {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        project_dir: P,
        output_dir: Q,
        filesets: &'a Filesets,
        properties: &'a PropertyBag,
    ) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            filesets,
            properties,
        }
    }

    /// Scans the project, skipping the output directory when it lies inside it.
    pub fn candidates(&self) -> Result<CandidatePaths> {
        let mut candidates = CandidatePaths::scan(&self.project_dir)?;
        if let Ok(inner) = self.output_dir.strip_prefix(&self.project_dir) {
            let prefix = inner.to_string_lossy().replace('\\', "/");
            if !prefix.is_empty() {
                let nested: Vec<String> = candidates
                    .iter()
                    .filter(|path| path.starts_with(&format!("{prefix}/")))
                    .map(str::to_string)
                    .collect();
                candidates.remove_all(nested.iter().map(String::as_str));
            }
        }
        Ok(candidates)
    }

    /// Builds the descriptor for the classified files without touching the disk.
    pub fn describe(
        &self,
        classified: &[ClassifiedPath<'_>],
        options: &CreateOptions,
    ) -> ArchetypeDescriptor {
        let mut descriptor = ArchetypeDescriptor::new(&options.id, options.encoding.clone());
        descriptor.set_allow_partial(options.allow_partial);
        for property in required_properties(self.properties) {
            descriptor.add_required_property(property);
        }
        for file in classified {
            let template_path = self.template_path(file);
            let template =
                TemplateDescriptor::new(file.fileset.filtered(), file.fileset.encoding().clone());
            descriptor.insert(file.role, &template_path, template);
        }
        descriptor
    }

    fn template_path(&self, file: &ClassifiedPath<'_>) -> String {
        match (file.fileset.packaged(), self.properties.get("package")) {
            (true, Some(package)) => {
                collapse_package(&file.path, file.fileset.directory(), package)
            }
            (true, None) => {
                debug!("No package property, keeping '{}' as is", file.path);
                file.path.clone()
            }
            (false, _) => file.path.clone(),
        }
    }

    /// Copies one file into the archetype. Returns false when a filtered file
    /// turned out not to be text in its declared encoding and was copied verbatim.
    fn capture(
        &self,
        source_path: &str,
        template_path: &str,
        template: &TemplateDescriptor,
        fileset: &str,
        prefer: &str,
    ) -> Result<bool> {
        let source = self.project_dir.join(source_path);
        let target = self.output_dir.join(RESOURCES_DIR).join(template_path);
        let file_error = |action, path: &Path, e| Error::FileError {
            action,
            path: path.display().to_string(),
            fileset: fileset.to_string(),
            source: e,
        };

        let bytes = fs::read(&source).map_err(|e| file_error("read", &source, e))?;
        let mut filtered = template.filtered;
        let content = if filtered {
            let decoded = template.encoding.decode(&bytes).map(|text| text.into_owned());
            match decoded {
                Some(text) => {
                    let templated = templatize(
                        &text,
                        self.properties,
                        &[PACKAGE_IN_PATH_FORMAT],
                        Some(prefer),
                    )?;
                    template
                        .encoding
                        .encode(&templated)
                        .map(|encoded| encoded.into_owned())
                        .ok_or_else(|| Error::MalformedContentError {
                            encoding: template.encoding.label().to_string(),
                        })?
                }
                None => {
                    warn!(
                        "'{}' is not valid {}, capturing it unfiltered",
                        source_path,
                        template.encoding.label()
                    );
                    filtered = false;
                    bytes
                }
            }
        } else {
            bytes
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| file_error("create parent of", &target, e))?;
        }
        fs::write(&target, content).map_err(|e| file_error("write", &target, e))?;
        Ok(filtered)
    }

    /// Runs the creation.
    ///
    /// # Returns
    /// * `Result<(ArchetypeDescriptor, Vec<CapturedFile>)>` - The written manifest
    ///   and every captured file in the order it was captured
    pub fn create(
        &self,
        options: &CreateOptions,
    ) -> Result<(ArchetypeDescriptor, Vec<CapturedFile>)> {
        if !self.project_dir.is_dir() {
            return Err(Error::ConfigError(format!(
                "Project directory '{}' does not exist",
                self.project_dir.display()
            )));
        }
        ensure_empty_output_dir(&self.output_dir, options.force)?;

        let candidates = self.candidates()?;
        let classified = self.filesets.classify_all("", &candidates);
        debug!("Classified {} of {} candidate files", classified.len(), candidates.len());

        let mut descriptor = self.describe(&classified, options);
        let mut captured = Vec::new();

        if self.project_dir.join(PROJECT_FILE).is_file() {
            let template = descriptor.default_template();
            let filtered =
                self.capture(PROJECT_FILE, PROJECT_FILE, &template, "project", "groupId")?;
            captured.push(CapturedFile {
                role: None,
                source_path: PROJECT_FILE.to_string(),
                template_path: PROJECT_FILE.to_string(),
                filtered,
            });
        }

        for file in &classified {
            let template_path = self.template_path(file);
            let Some(template) = descriptor.template(file.role, &template_path).cloned() else {
                continue;
            };
            // Shared coordinates are read as the package inside packaged filesets.
            let prefer = if file.fileset.packaged() { "package" } else { "groupId" };
            let fileset = file.role.to_string();
            let filtered = self
                .capture(&file.path, &template_path, &template, &fileset, prefer)
                .map_err(|e| Error::EntryError {
                    path: file.path.clone(),
                    fileset: fileset.clone(),
                    source: Box::new(e),
                })?;
            if filtered != template.filtered {
                let unfiltered = TemplateDescriptor::new(filtered, template.encoding);
                descriptor.set_template(file.role, &template_path, unfiltered);
            }
            captured.push(CapturedFile {
                role: Some(file.role),
                source_path: file.path.clone(),
                template_path,
                filtered,
            });
        }

        xml::write(&descriptor, self.output_dir.join(DESCRIPTOR_FILE))?;
        Ok((descriptor, captured))
    }
}
