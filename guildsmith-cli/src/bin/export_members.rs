//! export-members: dump a guild's member roster to CSV.
//!
//! Unattended tool — requires a config file, no interactive prompts.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use guildsmith_cli::config::Config;
use guildsmith_cli::export;
use guildsmith_cli::session::Session;

#[derive(Parser)]
#[command(
    name = "export-members",
    about = "Export a guild's member roster to CSV"
)]
struct Args {
    /// Path to the configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guildsmith_core=info,guildsmith_cli=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = Config::load_required(&args.config)?;
    println!("Using configuration from {}", args.config.display());

    let session = Session::connect(&config.bot_token).await?;
    println!("\nBot connected as {}", session.bot_name());

    let result = export::run(&session, &config).await;
    session.close().await;

    let (path, count) = result?;
    if count == 0 {
        println!("\nNo members to export.");
    } else {
        println!("\nExported {count} members to {}", path.display());
    }
    Ok(())
}
