use colored::Colorize;
use serde::Serialize;
use std::io::IsTerminal;
use tabled::{Table, Tabled};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Human,
    Json,
}

/// Determine the output format based on the user's choice and terminal detection.
pub fn resolve_format(format: Option<Format>) -> Format {
    match format {
        Some(f) => f,
        None => {
            if std::io::stdout().is_terminal() {
                Format::Human
            } else {
                Format::Json
            }
        }
    }
}

/// Print rows as a table (human) or a JSON array (json).
pub fn print_table<T: Serialize + Tabled>(items: &[T], format: Format) -> anyhow::Result<()> {
    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(items)?);
        }
        Format::Human => {
            if items.is_empty() {
                println!("No results.");
                return Ok(());
            }
            println!("{}", Table::new(items));
        }
    }
    Ok(())
}

/// Print a single item. Pretty JSON reads best for nested records in both modes.
pub fn print_one<T: Serialize>(item: &T, _format: Format) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(item)?);
    Ok(())
}

/// Section heading for human output.
pub fn heading(title: &str) {
    println!("{}", title.bold());
}
