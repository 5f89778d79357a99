//! Command-line interface implementation for archetyper.
//! Provides argument parsing and help text formatting using clap.

use crate::constants::DEFAULT_ENCODING;
use crate::properties::parse_define;
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for archetyper.
#[derive(Parser, Debug)]
#[command(author, version, about = "archetyper: archetype-based project scaffolding tool", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a new project from an archetype directory
    Generate(GenerateArgs),
    /// Capture an existing project as an archetype directory
    Create(CreateArgs),
}

/// Arguments of the `generate` subcommand.
#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Path to the archetype directory (containing META-INF/maven/archetype.xml)
    #[arg(value_name = "ARCHETYPE_DIR")]
    pub archetype_dir: PathBuf,

    /// Directory where the generated project will be created
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Property definition, may be repeated
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = parse_define)]
    pub defines: Vec<(String, String)>,

    /// JSON or YAML file with property values
    #[arg(short, long, value_name = "FILE")]
    pub properties: Option<PathBuf>,

    /// Encoding of templates that do not declare one
    #[arg(short, long, default_value = DEFAULT_ENCODING)]
    pub encoding: String,
}

/// Arguments of the `create` subcommand.
#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Path to the existing project
    #[arg(value_name = "PROJECT_DIR")]
    pub project_dir: PathBuf,

    /// Directory where the archetype will be written
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Identifier recorded in the archetype manifest
    #[arg(long)]
    pub id: String,

    /// JSON or YAML file with fileset definitions keyed by role
    #[arg(long, value_name = "FILE")]
    pub filesets: Option<PathBuf>,

    /// Property definition, may be repeated
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = parse_define)]
    pub defines: Vec<(String, String)>,

    /// JSON or YAML file with property values
    #[arg(short, long, value_name = "FILE")]
    pub properties: Option<PathBuf>,

    /// Default encoding of the captured files
    #[arg(short, long, default_value = DEFAULT_ENCODING)]
    pub encoding: String,

    /// Mark the archetype as applicable onto existing projects
    #[arg(long)]
    pub allow_partial: bool,

    /// Write into a non-empty output directory
    #[arg(short, long)]
    pub force: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Returns
/// * `Args` - Parsed command line arguments
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if matches!(
                e.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::MissingSubcommand
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
