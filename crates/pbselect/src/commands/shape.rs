use clap::Args;

use super::helpers::{read_schema, read_selection};
use crate::output::{self, Format};

/// Print the response shape a selection produces.
///
/// Examples:
///   pbselect shape selection.json --schema schema.json
#[derive(Debug, Args)]
pub struct ShapeCmd {
    /// Selection JSON: a file path, `-` for stdin, or inline JSON.
    pub selection: String,
    /// Schema document describing entities and relations.
    #[arg(long, short = 's')]
    pub schema: String,
}

pub fn run(cmd: ShapeCmd, format: Format) -> anyhow::Result<()> {
    let selection = read_selection(&cmd.selection)?;
    let schema = read_schema(&cmd.schema)?;
    let shape = schema
        .derive_shape(&selection)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    match format {
        Format::Json => output::print_one(&shape, format),
        Format::Human => {
            println!("{}", shape);
            Ok(())
        }
    }
}
