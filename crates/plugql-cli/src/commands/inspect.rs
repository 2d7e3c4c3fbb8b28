use anyhow::Result;
use plugql_graphql::SchemaBuilder;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::output::{print_field, print_json, print_rows};

pub fn types(builder: &SchemaBuilder, format: OutputFormat) -> Result<()> {
    let rows = builder
        .type_map()?
        .values()
        .map(|entry| {
            vec![
                entry.name.clone(),
                entry.category.to_string(),
                entry.id.clone(),
                entry.class.clone(),
                entry.weight.to_string(),
                entry
                    .reference
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();

    print_rows(
        &["Name", "Category", "Id", "Class", "Weight", "Reference"],
        rows,
        format,
    )
}

pub fn fields(builder: &SchemaBuilder, parent: &str, format: OutputFormat) -> Result<()> {
    let mut rows = Vec::new();
    for (name, field) in builder.get_fields(parent)? {
        let definition = field.definition();
        rows.push(vec![
            name,
            field.id().to_string(),
            definition.class.clone(),
            field.type_ref(builder)?.to_string(),
            definition.weight.to_string(),
        ]);
    }

    print_rows(&["Name", "Id", "Class", "Type", "Weight"], rows, format)
}

pub fn mutations(builder: &SchemaBuilder, format: OutputFormat) -> Result<()> {
    let mut rows = Vec::new();
    for (name, mutation) in builder.get_mutations()? {
        rows.push(vec![
            name,
            mutation.id().to_string(),
            mutation.definition().class.clone(),
            mutation.type_ref(builder)?.to_string(),
            mutation.definition().weight.to_string(),
        ]);
    }

    print_rows(&["Name", "Id", "Class", "Type", "Weight"], rows, format)
}

pub fn resolve(builder: &SchemaBuilder, name: &str, format: OutputFormat) -> Result<()> {
    let entry = builder.resolve_type_name(name)?;

    match format {
        OutputFormat::Json => print_json(&json!({
            "requested": name,
            "name": entry.name,
            "category": entry.category.as_str(),
            "id": entry.id,
            "class": entry.class,
            "weight": entry.weight,
        })),
        OutputFormat::Table => {
            print_field("Requested", name);
            print_field("Resolved", &entry.name);
            print_field("Category", entry.category.as_str());
            print_field("Plugin", &format!("{} ({})", entry.id, entry.class));
            print_field("Weight", &entry.weight.to_string());
            Ok(())
        }
    }
}

pub fn collisions(builder: &SchemaBuilder, format: OutputFormat) -> Result<()> {
    let rows = builder
        .collisions()?
        .into_iter()
        .map(|collision| {
            vec![
                collision.namespace.to_string(),
                collision.key,
                collision.existing_id,
                collision.new_id,
                collision.winner_id,
            ]
        })
        .collect();

    print_rows(
        &["Namespace", "Name", "Existing", "Candidate", "Winner"],
        rows,
        format,
    )
}
