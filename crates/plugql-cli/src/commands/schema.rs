use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use plugql_graphql::{SchemaBuilder, SchemaConfig};

use crate::output::{print_success, print_warning};

const INTROSPECTION_QUERY: &str = "{ __schema { types { name } } }";

pub fn sdl(builder: &SchemaBuilder, config: &SchemaConfig, output: Option<&Path>) -> Result<()> {
    let schema = builder.compile(config)?;
    let sdl = schema.sdl();

    match output {
        Some(path) => {
            std::fs::write(path, &sdl)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print_success(&format!("Schema written to {}", path.display()));
        }
        None => print!("{sdl}"),
    }
    Ok(())
}

pub async fn check(builder: &SchemaBuilder, config: &SchemaConfig) -> Result<()> {
    let collisions = builder.collisions()?;
    let schema = builder.compile(config)?;

    for collision in &collisions {
        print_warning(&collision.to_string());
    }

    if !config.introspection {
        print_success("Schema compiled (introspection disabled, skipping query check)");
        return Ok(());
    }

    let response = schema.execute(INTROSPECTION_QUERY).await;
    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.iter().map(|e| e.message.clone()).collect();
        bail!("Introspection failed: {}", messages.join("; "));
    }

    let types = response
        .data
        .into_json()?
        .pointer("/__schema/types")
        .and_then(|types| types.as_array())
        .map_or(0, Vec::len);

    print_success(&format!(
        "Schema compiled: {} types, {} collisions",
        types.to_string().cyan(),
        collisions.len().to_string().cyan()
    ));
    Ok(())
}
