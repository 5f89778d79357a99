//! archetyper generates projects from archetypes and captures existing
//! projects as archetypes. It classifies project files into filesets,
//! describes them in an archetype manifest and renders `${name}` placeholders
//! and package paths on generation.

/// Command-line interface module for the archetyper application
pub mod cli;

/// Common constants: manifest location, default excludes, path tokens
pub mod constants;

/// Creation of an archetype from an existing project
pub mod creator;

/// Archetype manifest model and its XML form
pub mod descriptor;

/// Strict character set handling
pub mod encoding;

/// Error types and handling for the archetyper application
pub mod error;

/// Fileset specifications and classification of candidate files
pub mod fileset;

/// Project generation from an archetype
pub mod generator;

/// Logger setup for the binary
pub mod logger;

/// Template path rendering and package collapsing
pub mod path;

/// Include/exclude glob matching
pub mod pattern;

/// Property bag, property files and required property resolution
pub mod properties;

/// Placeholder substitution in file content
pub mod renderer;
