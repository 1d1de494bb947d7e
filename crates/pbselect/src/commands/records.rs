use clap::Args;
use pbselect_sdk::{Client, ListResult};
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use super::helpers::read_selection;
use crate::output::{self, Format};

/// List the records a selection matches.
///
/// Examples:
///   pbselect list selection.json
///   pbselect list selection.json --page 2 --per-page 50
///   pbselect list selection.json --all
#[derive(Debug, Args)]
pub struct ListCmd {
    /// Selection JSON: a file path, `-` for stdin, or inline JSON.
    pub selection: String,
    /// Page number (1-based).
    #[arg(long, default_value = "1")]
    pub page: u32,
    /// Records per page.
    #[arg(long, short = 'n', default_value = "30")]
    pub per_page: u32,
    /// Fetch every page.
    #[arg(long, conflicts_with_all = ["page", "per_page"])]
    pub all: bool,
}

/// Fetch one record by id.
///
/// Examples:
///   pbselect view selection.json RECORD_ID
#[derive(Debug, Args)]
pub struct ViewCmd {
    /// Selection JSON: a file path, `-` for stdin, or inline JSON.
    pub selection: String,
    /// Record id.
    pub id: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct RecordRow {
    pub id: String,
    pub data: String,
}

/// Longest `data` column rendered in a table cell.
const DATA_PREVIEW: usize = 80;

impl From<&Value> for RecordRow {
    fn from(record: &Value) -> Self {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let rest: serde_json::Map<String, Value> = record
            .as_object()
            .map(|obj| {
                obj.iter()
                    .filter(|(k, _)| k.as_str() != "id")
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        let mut data = Value::Object(rest).to_string();
        if data.chars().count() > DATA_PREVIEW {
            data = data.chars().take(DATA_PREVIEW - 1).collect::<String>() + "…";
        }
        RecordRow { id, data }
    }
}

pub async fn list(cmd: ListCmd, client: &Client, format: Format) -> anyhow::Result<()> {
    let selection = read_selection(&cmd.selection)?;
    let query = client.select::<Value>(selection);

    if cmd.all {
        let items = query.all().await.map_err(|e| anyhow::anyhow!("{}", e))?;
        return print_records(&items, format);
    }

    let list: ListResult<Value> = query
        .page(cmd.page)
        .per_page(cmd.per_page)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    match format {
        Format::Json => output::print_one(&list, format),
        Format::Human => {
            print_records(&list.items, format)?;
            if list.total_items >= 0 {
                println!(
                    "Page {} of {} ({} records)",
                    list.page, list.total_pages, list.total_items
                );
            }
            Ok(())
        }
    }
}

pub async fn view(cmd: ViewCmd, client: &Client, format: Format) -> anyhow::Result<()> {
    let selection = read_selection(&cmd.selection)?;
    let record = client
        .select::<Value>(selection)
        .view(&cmd.id)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    output::print_one(&record, format)
}

fn print_records(items: &[Value], format: Format) -> anyhow::Result<()> {
    match format {
        Format::Json => output::print_one(&items, format),
        Format::Human => {
            let rows: Vec<RecordRow> = items.iter().map(RecordRow::from).collect();
            output::print_table(&rows, format)
        }
    }
}
