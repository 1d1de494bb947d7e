use anyhow::Context;
use pbselect_sdk::{Schema, SelectionNode};
use std::io::Read;

/// Read a selection tree from a file path, `-` for stdin, or inline JSON.
pub fn read_selection(source: &str) -> anyhow::Result<SelectionNode> {
    let json = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read selection from stdin")?;
        buf
    } else if source.trim_start().starts_with('{') {
        source.to_string()
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read selection file '{}'", source))?
    };
    SelectionNode::from_json(&json).map_err(|e| anyhow::anyhow!("Invalid selection: {}", e))
}

/// Load the schema document at `path`.
pub fn read_schema(path: &str) -> anyhow::Result<Schema> {
    Schema::from_file(path).map_err(|e| anyhow::anyhow!("{}", e))
}
