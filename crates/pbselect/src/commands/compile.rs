use clap::Args;
use pbselect_sdk::{compile, QueryParameters};
use serde::Serialize;
use tabled::Tabled;

use super::helpers::{read_schema, read_selection};
use crate::output::{self, Format};

/// Compile a selection tree into query parameters.
///
/// Examples:
///   pbselect compile selection.json
///   pbselect compile selection.json --schema schema.json
///   cat selection.json | pbselect compile -
#[derive(Debug, Args)]
pub struct CompileCmd {
    /// Selection JSON: a file path, `-` for stdin, or inline JSON.
    pub selection: String,
    /// Schema document; validates the selection and prints the derived shape.
    #[arg(long, short = 's')]
    pub schema: Option<String>,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ParamRow {
    pub param: String,
    pub value: String,
}

/// URL parameters plus the client-side `requestKey`.
fn param_rows(params: &QueryParameters) -> Vec<ParamRow> {
    let request_key = params.request_key.as_deref().map(|key| ("requestKey", key));
    params
        .to_query_pairs()
        .into_iter()
        .chain(request_key)
        .map(|(param, value)| ParamRow {
            param: param.to_string(),
            value: value.to_string(),
        })
        .collect()
}

pub fn run(cmd: CompileCmd, format: Format) -> anyhow::Result<()> {
    let selection = read_selection(&cmd.selection)?;

    let Some(schema_path) = cmd.schema else {
        let params = compile(&selection);
        return match format {
            Format::Json => output::print_one(&params, format),
            Format::Human => output::print_table(&param_rows(&params), format),
        };
    };

    let schema = read_schema(&schema_path)?;
    let compiled = schema
        .compile(&selection)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    match format {
        Format::Json => output::print_one(&compiled, format),
        Format::Human => {
            output::heading("Parameters");
            output::print_table(&param_rows(&compiled.params), format)?;
            println!();
            output::heading("Shape");
            println!("{}", compiled.shape);
            Ok(())
        }
    }
}
