use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "plugql")]
#[command(about = "plugql: inspect and compile plugin-driven GraphQL schemas")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Plugin manifest (TOML) with field, type and mutation definitions
    #[arg(short, long, global = true, env = "PLUGQL_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Schema configuration file (TOML)
    #[arg(short, long, global = true, env = "PLUGQL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set (overrides the config file)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Leave out the built-in scalars and entity fields
    #[arg(long, global = true)]
    pub no_builtins: bool,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the compiled schema as SDL
    Sdl(SdlArgs),
    /// List the winning type for every public name
    Types,
    /// List the fields attached to a parent type
    Fields(FieldsArgs),
    /// List the winning mutations
    Mutations,
    /// Resolve a type name, following references and qualifiers
    Resolve(ResolveArgs),
    /// Show every name collision and how it was decided
    Collisions,
    /// Compile the schema and run an introspection query against it
    Check,
}

#[derive(clap::Args)]
pub struct SdlArgs {
    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct FieldsArgs {
    /// Parent type name (defaults to the root)
    #[arg(default_value = "Root")]
    pub parent: String,
}

#[derive(clap::Args)]
pub struct ResolveArgs {
    /// Type name, e.g. `Node:page`
    pub name: String,
}
