//! Configuration — config.json loader with an interactive fallback.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::setup;

/// Flat configuration record consumed by both binaries.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bot_token: String,
    pub guild_id: u64,
    /// Category the channels are created under.
    pub category_name: String,
    /// Input file: one row per channel, optional invite columns.
    pub csv_file: PathBuf,
    /// Export file name override (defaults to a timestamped name).
    #[serde(default)]
    pub output_file: Option<String>,
    /// Skip bot accounts in the member export.
    #[serde(default = "default_skip_bots")]
    pub skip_bots: bool,
}

fn default_skip_bots() -> bool {
    true
}

impl Config {
    /// Load from `path`. Returns `None` when the file does not exist; a
    /// present-but-malformed file is fatal.
    pub fn load(path: &Path) -> Result<Option<Config>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("malformed config in {}", path.display()))?;
        Ok(Some(config))
    }

    /// Load from `path`, or walk the user through the bot setup
    /// instructions and prompt for the required fields on the console.
    pub fn load_or_prompt(path: &Path) -> Result<Config> {
        if let Some(config) = Self::load(path)? {
            println!("Using configuration from {}", path.display());
            return Ok(config);
        }
        setup::print_instructions();
        Self::prompt()
    }

    /// Load from `path`, failing when the file is absent. Used by tools
    /// that must run unattended.
    pub fn load_required(path: &Path) -> Result<Config> {
        Self::load(path)?.with_context(|| {
            format!(
                "no {} found — create one from config.example.json",
                path.display()
            )
        })
    }

    fn prompt() -> Result<Config> {
        let bot_token = prompt_line("Enter your bot token: ")?;
        let guild_id = prompt_line("Enter your server (guild) ID: ")?
            .parse::<u64>()
            .context("guild ID must be a number")?;
        let category_name =
            prompt_line("Enter the category name where channels will be created: ")?;
        let csv_file = PathBuf::from(prompt_line("Enter the path to your CSV file: ")?);
        Ok(Config {
            bot_token,
            guild_id,
            category_name,
            csv_file,
            output_file: None,
            skip_bots: true,
        })
    }
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read console input")?;
    Ok(line.trim().to_string())
}
