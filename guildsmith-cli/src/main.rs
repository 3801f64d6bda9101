//! guildsmith: bulk private-channel provisioning for a Discord guild.
//!
//! Reads a CSV of desired channels (column 1 = name, columns 2..N = user
//! identifiers to invite), reconciles it against a category's existing
//! channels, and creates only the missing ones as private text channels.
//! Re-running with the same input is a no-op.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use guildsmith_core::engine::Reconciler;
use guildsmith_core::input;
use guildsmith_core::pace::{Pacer, DEFAULT_CREATE_DELAY};
use guildsmith_core::types::{AccountId, DesiredChannel, ReconcileOutcome};

use guildsmith_cli::config::Config;
use guildsmith_cli::guild::{self, CategoryCreator};
use guildsmith_cli::session::Session;

#[derive(Parser)]
#[command(
    name = "guildsmith",
    about = "Bulk private-channel provisioning for Discord guilds"
)]
struct Args {
    /// Path to the configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Delay between channel creation calls (ms)
    #[arg(long, default_value_t = DEFAULT_CREATE_DELAY.as_millis() as u64)]
    delay_ms: u64,
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
    let config = Config::load_or_prompt(&args.config)?;

    // Fail fast: no point connecting if the desired set can't be read.
    let desired = input::read_desired_channels(&config.csv_file)?;

    let session = Session::connect(&config.bot_token).await?;
    println!("\nBot connected as {}", session.bot_name());

    let result = provision(&session, &config, &desired, args.delay_ms).await;
    session.close().await;
    let outcome = result?;

    println!(
        "\nComplete! Created {} channels, skipped {} existing channels.",
        outcome.created, outcome.skipped
    );
    if outcome.failed > 0 {
        println!(
            "{} channels could not be created — see the log above.",
            outcome.failed
        );
    }
    if !outcome.warnings.is_empty() {
        println!("\nWarnings:");
        for (i, warning) in outcome.warnings.iter().enumerate() {
            println!("  {}. {warning}", i + 1);
        }
    }
    Ok(())
}

async fn provision(
    session: &Session,
    config: &Config,
    desired: &[DesiredChannel],
    delay_ms: u64,
) -> Result<ReconcileOutcome> {
    let http = session.http();
    let target = guild::fetch_guild(http, config.guild_id).await?;
    println!("Connected to server: {}", target.name);

    let channels = guild::fetch_channels(http, target.id).await?;
    let category =
        guild::ensure_category(http, target.id, &channels, &config.category_name).await?;
    let existing = guild::channel_names_in(&channels, category);

    let members = guild::fetch_members(http, target.id).await?;
    let roster = guild::roster_of(&members);

    println!("\nCreating {} private channels...", desired.len());

    let creator = CategoryCreator::new(http.clone(), target.id, category);
    let reconciler = Reconciler::new(
        creator,
        AccountId(session.bot_user_id().get()),
        Pacer::new(Duration::from_millis(delay_ms)),
    );
    Ok(reconciler.reconcile(desired, existing, &roster).await)
}
