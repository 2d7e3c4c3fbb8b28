use anyhow::Result;
use colored::Colorize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

/// Prints rows as a table, or as a JSON array of objects keyed by header.
pub fn print_rows(headers: &[&str], rows: Vec<Vec<String>>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let objects: Vec<Value> = rows
                .into_iter()
                .map(|row| {
                    let object = headers
                        .iter()
                        .zip(row)
                        .map(|(header, cell)| (header.to_lowercase(), Value::String(cell)))
                        .collect();
                    Value::Object(object)
                })
                .collect();
            print_json(&Value::Array(objects))
        }
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No entries found.");
                return Ok(());
            }
            let total = rows.len();
            let mut builder = Builder::default();
            builder.push_record(headers.iter().copied());
            for row in rows {
                builder.push_record(row);
            }
            println!("{}", builder.build().with(Style::rounded()));
            println!("Total: {total}");
            Ok(())
        }
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_field(label: &str, value: &str) {
    println!("{}: {}", label.cyan(), value);
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}
