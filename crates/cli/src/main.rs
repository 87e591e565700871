use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_app::{books, ping::PingResponse};
use shelf_kernel::settings::Settings;
use shelf_notion::{CredentialSource, EnvCredentials, NotionClient};

/// Lending-shelf catalog tools
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch the whole catalog from Notion and print it as JSON
    Books {
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Report whether NOTION_SECRET and NOTION_DATABASE_ID are set
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load shelf settings")?;
    shelf_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Books { pretty } => print_books(&settings, pretty).await,
        Command::Ping => print_json(&PingResponse::from_source(&EnvCredentials), false),
    }
}

async fn print_books(settings: &Settings, pretty: bool) -> anyhow::Result<()> {
    let credentials = EnvCredentials.load().require()?;
    let client = NotionClient::new(&settings.notion).context("failed to build Notion client")?;

    let catalog = books::fetch_catalog(&client, &credentials)
        .await
        .context("failed to fetch catalog")?;

    tracing::info!(books = catalog.len(), "catalog fetched");
    print_json(&catalog, pretty)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
