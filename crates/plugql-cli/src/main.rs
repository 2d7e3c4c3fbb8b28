mod cli;
mod commands;
mod observability;
mod output;
mod registry;

use anyhow::{Context, Result};
use clap::Parser;
use plugql_graphql::SchemaConfig;

use cli::{Cli, Commands};
use output::print_error;
use registry::Sources;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    let config = match &cli.config {
        Some(path) => SchemaConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SchemaConfig::default(),
    };

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    observability::init_tracing_with_level(level);

    let sources = Sources::load(cli.manifest.as_deref(), !cli.no_builtins)?;
    let builder = sources.builder();

    match &cli.command {
        Commands::Sdl(args) => {
            commands::schema::sdl(&builder, &config, args.output.as_deref())?;
        }
        Commands::Types => {
            commands::inspect::types(&builder, format)?;
        }
        Commands::Fields(args) => {
            commands::inspect::fields(&builder, &args.parent, format)?;
        }
        Commands::Mutations => {
            commands::inspect::mutations(&builder, format)?;
        }
        Commands::Resolve(args) => {
            commands::inspect::resolve(&builder, &args.name, format)?;
        }
        Commands::Collisions => {
            commands::inspect::collisions(&builder, format)?;
        }
        Commands::Check => {
            commands::schema::check(&builder, &config).await?;
        }
    }

    Ok(())
}
