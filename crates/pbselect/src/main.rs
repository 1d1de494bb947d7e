mod commands;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use pbselect_sdk::Client;

/// pbselect — compile and run PocketBase selection trees
#[derive(Debug, Parser)]
#[command(name = "pbselect", version, about)]
struct Cli {
    /// Server URL (overrides $POCKETBASE_URL).
    #[arg(long, global = true)]
    url: Option<String>,

    /// Auth token (overrides $POCKETBASE_TOKEN and ~/.pocketbase_token).
    #[arg(long, global = true)]
    token: Option<String>,

    /// Output format. Auto-detected if not specified (human for terminal, json for pipe).
    #[arg(long, global = true)]
    format: Option<output::Format>,

    /// Log requests and compiled parameters to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a selection into query parameters.
    Compile(commands::compile::CompileCmd),
    /// Print the response shape of a selection.
    Shape(commands::shape::ShapeCmd),
    /// List records matching a selection.
    List(commands::records::ListCmd),
    /// Fetch one record by id.
    View(commands::records::ViewCmd),
    /// Print a compact LLM-friendly command reference.
    Usage,
}

fn build_client(url: Option<String>, token: Option<String>) -> anyhow::Result<Client> {
    let url = url.unwrap_or_else(pbselect_sdk::auth::url_from_env);
    let client = Client::new(url).map_err(|e| anyhow::anyhow!("{}", e))?;
    Ok(match token.or_else(pbselect_sdk::auth::auto_token) {
        Some(token) => client.with_token(token),
        None => client,
    })
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = output::resolve_format(cli.format);

    // Offline commands never touch the network.
    match cli.command {
        Command::Usage => {
            commands::usage::run();
            Ok(())
        }
        Command::Compile(cmd) => commands::compile::run(cmd, format),
        Command::Shape(cmd) => commands::shape::run(cmd, format),
        Command::List(cmd) => {
            let client = build_client(cli.url, cli.token)?;
            commands::records::list(cmd, &client, format).await
        }
        Command::View(cmd) => {
            let client = build_client(cli.url, cli.token)?;
            commands::records::view(cmd, &client, format).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
