//! Error handling for the archetyper application.
//! Defines custom error types and results used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for archetype operations.
///
/// Configuration problems (patterns, encodings, descriptors, properties) are reported
/// when the offending value is constructed. Overwrite conflicts have their own variant
/// so callers can tell them apart from I/O failures.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// File system error tied to a specific file of a fileset
    #[error("Failed to {action} '{path}' ({fileset}): {source}.")]
    FileError {
        action: &'static str,
        path: String,
        fileset: String,
        #[source]
        source: io::Error,
    },

    /// Represents errors raised while walking a directory tree
    #[error("Directory walk error: {0}.")]
    WalkError(#[from] walkdir::Error),

    /// A glob pattern could not be compiled
    #[error("Invalid pattern '{pattern}': {source}.")]
    PatternError {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The encoding label is not a recognized character set
    #[error("Unsupported encoding: '{0}'.")]
    UnsupportedEncodingError(String),

    /// Content could not be decoded or encoded with the declared character set
    #[error("Content cannot be represented as {encoding}")]
    MalformedContentError { encoding: String },

    /// Processing of a single template file failed
    #[error("Failed to process '{path}' ({fileset}): {source}")]
    EntryError {
        path: String,
        fileset: String,
        #[source]
        source: Box<Error>,
    },

    /// Represents errors in the archetype manifest
    #[error("Descriptor error: {0}.")]
    DescriptorError(String),

    /// Represents errors raised by the XML reader or writer
    #[error("XML error: {0}.")]
    XmlError(#[from] quick_xml::Error),

    /// Represents errors that occur during configuration parsing or processing
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// A required property has neither an explicit value nor a default
    #[error("Missing required property '{key}'.")]
    MissingPropertyError { key: String },

    /// A property value does not satisfy its validation pattern
    #[error("Property '{key}' value '{value}' does not match '{pattern}'.")]
    ValidationError { key: String, value: String, pattern: String },

    /// Represents errors that occur during template processing
    #[error("Template error: {0}.")]
    TemplateError(String),

    /// Generation would overwrite files in a populated directory
    #[error(
        "Output directory '{output_dir}' is not empty and the archetype does not allow partial generation."
    )]
    OverwriteConflictError { output_dir: String, existing: Vec<String> },

    /// The archetype output directory already has content
    #[error("Output directory '{output_dir}' already exists and is not empty. Use --force to overwrite.")]
    OutputDirectoryExistsError { output_dir: String },
}

impl Error {
    /// Returns true for conditions the user can resolve by changing the target
    /// directory or the archetype's partial flag, as opposed to I/O failures.
    pub fn is_overwrite_conflict(&self) -> bool {
        matches!(
            self,
            Error::OverwriteConflictError { .. } | Error::OutputDirectoryExistsError { .. }
        )
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error chain and exits the program.
///
/// # Arguments
/// * `err` - The error to handle, possibly wrapped with context
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 2 for
/// overwrite conflicts and 1 for everything else
pub fn default_error_handler(err: anyhow::Error) {
    eprintln!("{err:#}");
    match err.downcast_ref::<Error>() {
        Some(Error::OverwriteConflictError { existing, .. }) => {
            for path in existing.iter().take(10) {
                eprintln!("  {path}");
            }
            std::process::exit(2);
        }
        Some(e) if e.is_overwrite_conflict() => std::process::exit(2),
        _ => std::process::exit(1),
    }
}
