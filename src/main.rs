//! archetyper's main application entry point and orchestration logic.
//! Handles command-line argument parsing and dispatches to archetype
//! generation or creation.

use anyhow::Context;
use archetyper::{
    cli::{get_args, Args, Command, CreateArgs, GenerateArgs},
    creator::{CreateOptions, Creator},
    encoding::Charset,
    error::default_error_handler,
    fileset::Filesets,
    generator::{load_descriptor, Generator},
    logger::init_logger,
    properties::PropertyBag,
    renderer::PlaceholderRenderer,
};
use std::path::PathBuf;

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Command::Generate(args) => generate(args),
        Command::Create(args) => create(args),
    }
}

/// Merges a property file with `-D` definitions; definitions win.
fn load_properties(
    file: Option<&PathBuf>,
    defines: Vec<(String, String)>,
) -> anyhow::Result<PropertyBag> {
    let mut properties = match file {
        Some(path) => PropertyBag::from_file(path)
            .with_context(|| format!("Failed to load properties from '{}'", path.display()))?,
        None => PropertyBag::new(),
    };
    properties.merge(defines.into_iter().collect());
    Ok(properties)
}

/// Generates a project.
///
/// # Flow
/// 1. Resolves the default encoding and reads the archetype manifest
/// 2. Loads properties from file and `-D` definitions
/// 3. Plans every file, rejects populated targets unless the archetype is partial
/// 4. Writes the planned files
fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let encoding = Charset::for_label(&args.encoding)?;
    let descriptor = load_descriptor(&args.archetype_dir, &encoding).with_context(|| {
        format!("Failed to load archetype from '{}'", args.archetype_dir.display())
    })?;
    let properties = load_properties(args.properties.as_ref(), args.defines)?;

    println!("Using archetype '{}' from '{}'", descriptor.id(), args.archetype_dir.display());

    let renderer = PlaceholderRenderer::new();
    let generator = Generator::new(&renderer, &args.archetype_dir, &args.output_dir);
    let written = generator.generate(&descriptor, &properties)?;

    for file in &written {
        println!("{}: '{}'", file.action(), file.target.display());
    }
    println!("Project generation completed successfully in {}.", args.output_dir.display());
    Ok(())
}

/// Captures a project as an archetype.
fn create(args: CreateArgs) -> anyhow::Result<()> {
    let encoding = Charset::for_label(&args.encoding)?;
    let filesets = match &args.filesets {
        Some(path) => Filesets::from_file(path, &encoding)
            .with_context(|| format!("Failed to load filesets from '{}'", path.display()))?,
        None => Filesets::maven_defaults(&encoding)?,
    };
    let properties = load_properties(args.properties.as_ref(), args.defines)?;

    let options = CreateOptions {
        id: args.id,
        encoding,
        allow_partial: args.allow_partial,
        force: args.force,
    };
    let creator = Creator::new(&args.project_dir, &args.output_dir, &filesets, &properties);
    let (_, captured) = creator.create(&options)?;

    for file in &captured {
        let fileset = file.role.map(|role| role.to_string()).unwrap_or_else(|| "project".into());
        println!("Captured {fileset}: '{}' as '{}'", file.source_path, file.template_path);
    }
    println!("Archetype creation completed successfully in {}.", args.output_dir.display());
    Ok(())
}
