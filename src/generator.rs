//! Project generation from an archetype directory.
//!
//! Generation happens in two phases. [`Generator::plan`] renders every target
//! path and every filtered file into memory; [`Generator::write`] touches the
//! disk only after [`Generator::check_conflicts`] has accepted the plan. A
//! rejected plan therefore leaves the output directory exactly as it was.

use crate::constants::{DESCRIPTOR_FILE, PROJECT_FILE, RESOURCES_DIR};
use crate::descriptor::{xml, ArchetypeDescriptor, TemplateDescriptor};
use crate::encoding::Charset;
use crate::error::{Error, Result};
use crate::path::{is_rendered_path_valid, render_target_path};
use crate::properties::{resolve, PropertyBag};
use crate::renderer::{render_content, TemplateRenderer};
use log::{debug, warn};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Fileset label used for the root project descriptor.
const PROJECT_FILESET: &str = "project";

/// What to do with one planned file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperation {
    /// Copy the template byte for byte
    Copy { source: PathBuf },
    /// Write rendered content
    Write { content: Vec<u8> },
}

/// One file of a generation plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// Role list or `project` for the project descriptor
    pub fileset: String,
    /// Path relative to `archetype-resources`
    pub template_path: String,
    /// Rendered path relative to the output directory
    pub target_path: String,
    pub target: PathBuf,
    pub operation: FileOperation,
    /// True if the target already exists
    pub overwrite: bool,
}

impl PlannedFile {
    pub fn action(&self) -> Action {
        match (&self.operation, self.overwrite) {
            (FileOperation::Copy { .. }, false) => Action::Copied,
            (FileOperation::Write { .. }, false) => Action::Rendered,
            (_, true) => Action::Overwritten,
        }
    }
}

/// Reported outcome of a planned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Copied,
    Rendered,
    Overwritten,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Copied => write!(f, "Copied"),
            Action::Rendered => write!(f, "Rendered"),
            Action::Overwritten => write!(f, "Overwritten"),
        }
    }
}

/// Loads the manifest of an archetype directory.
pub fn load_descriptor<P: AsRef<Path>>(
    archetype_dir: P,
    fallback_encoding: &Charset,
) -> Result<ArchetypeDescriptor> {
    let archetype_dir = archetype_dir.as_ref();
    if !archetype_dir.is_dir() {
        return Err(Error::ConfigError(format!(
            "Archetype directory '{}' does not exist",
            archetype_dir.display()
        )));
    }
    xml::read(archetype_dir.join(DESCRIPTOR_FILE), fallback_encoding)
}

/// Checks that the output directory may receive generated files.
///
/// # Arguments
/// * `output_dir` - Target directory path for generated output
/// * `allow_partial` - Whether the archetype may be applied onto existing content
///
/// # Errors
/// * `Error::OverwriteConflictError` if the directory has content and partial
///   generation is not allowed
/// * `Error::ConfigError` if the path exists but is not a directory
pub fn ensure_output_dir<P: AsRef<Path>>(output_dir: P, allow_partial: bool) -> Result<()> {
    let output_dir = output_dir.as_ref();
    if !output_dir.exists() {
        return Ok(());
    }
    if !output_dir.is_dir() {
        return Err(Error::ConfigError(format!(
            "Output path '{}' is not a directory",
            output_dir.display()
        )));
    }
    if allow_partial {
        return Ok(());
    }

    let existing: Vec<String> = fs::read_dir(output_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    if existing.is_empty() {
        Ok(())
    } else {
        Err(Error::OverwriteConflictError {
            output_dir: output_dir.display().to_string(),
            existing,
        })
    }
}

fn write_file(content: &[u8], dest_path: &Path, fileset: &str) -> Result<()> {
    let file_error = |action, source| Error::FileError {
        action,
        path: dest_path.display().to_string(),
        fileset: fileset.to_string(),
        source,
    };
    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent).map_err(|e| file_error("create parent of", e))?;
    }
    fs::write(dest_path, content).map_err(|e| file_error("write", e))
}

fn copy_file(source_path: &Path, dest_path: &Path, fileset: &str) -> Result<()> {
    let file_error = |action, path: &Path, source| Error::FileError {
        action,
        path: path.display().to_string(),
        fileset: fileset.to_string(),
        source,
    };
    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent).map_err(|e| file_error("create parent of", dest_path, e))?;
    }
    fs::copy(source_path, dest_path)
        .map(|_| ())
        .map_err(|e| file_error("copy", source_path, e))
}

/// Applies an archetype to an output directory.
pub struct Generator<'a> {
    renderer: &'a dyn TemplateRenderer,
    archetype_dir: PathBuf,
    output_dir: PathBuf,
}

impl<'a> Generator<'a> {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        renderer: &'a dyn TemplateRenderer,
        archetype_dir: P,
        output_dir: Q,
    ) -> Self {
        Self {
            renderer,
            archetype_dir: archetype_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    fn resources_dir(&self) -> PathBuf {
        self.archetype_dir.join(RESOURCES_DIR)
    }

    fn plan_file(
        &self,
        fileset: &str,
        template_path: &str,
        template: &TemplateDescriptor,
        properties: &PropertyBag,
    ) -> Result<PlannedFile> {
        if !is_rendered_path_valid(template_path) {
            return Err(Error::DescriptorError(format!(
                "template path '{template_path}' points outside {RESOURCES_DIR}"
            )));
        }
        let source = self.resources_dir().join(template_path);
        let target_path = render_target_path(template_path, properties)?;
        let target = self.output_dir.join(&target_path);

        let operation = if template.filtered {
            let bytes = fs::read(&source).map_err(|e| Error::FileError {
                action: "read",
                path: source.display().to_string(),
                fileset: fileset.to_string(),
                source: e,
            })?;
            let content = render_content(&bytes, &template.encoding, properties, self.renderer)?;
            FileOperation::Write { content }
        } else {
            if !source.is_file() {
                return Err(Error::FileError {
                    action: "read",
                    path: source.display().to_string(),
                    fileset: fileset.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "template not found"),
                });
            }
            FileOperation::Copy { source }
        };

        debug!("Planned '{}' -> '{}'", template_path, target_path);
        Ok(PlannedFile {
            fileset: fileset.to_string(),
            template_path: template_path.to_string(),
            overwrite: target.exists(),
            target_path,
            target,
            operation,
        })
    }

    /// Renders every target path and filtered file of the archetype.
    ///
    /// The project descriptor comes first, followed by the entries of every role
    /// in precedence order. Nothing is written.
    ///
    /// # Errors
    /// * `Error::EntryError` wrapping the failure of a single template
    /// * `Error::TemplateError` if two templates render to the same target
    pub fn plan(
        &self,
        descriptor: &ArchetypeDescriptor,
        properties: &PropertyBag,
    ) -> Result<Vec<PlannedFile>> {
        let mut plan = Vec::new();
        let wrap = |fileset: &str, path: &str| {
            let fileset = fileset.to_string();
            let path = path.to_string();
            move |e: Error| Error::EntryError { path, fileset, source: Box::new(e) }
        };

        if self.resources_dir().join(PROJECT_FILE).is_file() {
            let template = descriptor.default_template();
            let file = self
                .plan_file(PROJECT_FILESET, PROJECT_FILE, &template, properties)
                .map_err(wrap(PROJECT_FILESET, PROJECT_FILE))?;
            plan.push(file);
        }

        for (role, path, template) in descriptor.all_entries() {
            let fileset = role.to_string();
            let file = self
                .plan_file(&fileset, path, template, properties)
                .map_err(wrap(&fileset, path))?;
            plan.push(file);
        }

        let mut targets = HashSet::new();
        for file in &plan {
            if !targets.insert(file.target_path.as_str()) {
                return Err(Error::TemplateError(format!(
                    "more than one template renders to '{}'",
                    file.target_path
                )));
            }
        }
        Ok(plan)
    }

    /// Rejects a plan that would write into a populated directory, or replace
    /// any existing file, unless the archetype allows partial generation.
    pub fn check_conflicts(
        &self,
        descriptor: &ArchetypeDescriptor,
        plan: &[PlannedFile],
    ) -> Result<()> {
        let clashing: Vec<String> = plan
            .iter()
            .filter(|file| file.overwrite)
            .map(|file| file.target_path.clone())
            .collect();
        match ensure_output_dir(&self.output_dir, descriptor.allow_partial()) {
            Err(Error::OverwriteConflictError { output_dir, existing }) => {
                Err(Error::OverwriteConflictError {
                    output_dir,
                    existing: if clashing.is_empty() { existing } else { clashing },
                })
            }
            Ok(()) if !descriptor.allow_partial() && !clashing.is_empty() => {
                Err(Error::OverwriteConflictError {
                    output_dir: self.output_dir.display().to_string(),
                    existing: clashing,
                })
            }
            other => other,
        }
    }

    /// Writes a plan to disk.
    pub fn write(&self, plan: &[PlannedFile]) -> Result<()> {
        for file in plan {
            if file.overwrite {
                warn!("Overwriting existing file '{}'", file.target.display());
            }
            match &file.operation {
                FileOperation::Copy { source } => {
                    copy_file(source, &file.target, &file.fileset)?
                }
                FileOperation::Write { content } => {
                    write_file(content, &file.target, &file.fileset)?
                }
            }
        }
        Ok(())
    }

    /// Resolves properties, plans, checks and writes.
    ///
    /// # Returns
    /// * `Result<Vec<PlannedFile>>` - The files that were written
    pub fn generate(
        &self,
        descriptor: &ArchetypeDescriptor,
        properties: &PropertyBag,
    ) -> Result<Vec<PlannedFile>> {
        let properties = resolve(properties, descriptor.required_properties(), self.renderer)?;
        debug!("Generating archetype '{}' with {} properties", descriptor.id(), properties.len());

        let plan = self.plan(descriptor, &properties)?;
        self.check_conflicts(descriptor, &plan)?;
        self.write(&plan)?;
        Ok(plan)
    }
}
