//! Member export — dumps the guild roster to a timestamped CSV.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::Local;
use serenity::all::{Member, Role, RoleId};
use tracing::info;

use crate::config::Config;
use crate::guild;
use crate::session::Session;

/// Column order of the export file.
const HEADER: &[&str] = &[
    "id",
    "username",
    "display_name",
    "discriminator",
    "nickname",
    "joined_at",
    "created_at",
    "is_bot",
    "top_role",
];

/// Run the export against a connected session. Returns the output path and
/// the number of members written.
pub async fn run(session: &Session, config: &Config) -> Result<(PathBuf, usize)> {
    let http = session.http();
    let target = guild::fetch_guild(http, config.guild_id).await?;
    println!("Connected to server: {}", target.name);

    let members = guild::fetch_members(http, target.id).await?;
    println!("Total members: {}", members.len());

    let roles = target
        .id
        .roles(http)
        .await
        .context("failed to list guild roles")?;

    let out_dir = Path::new("output");
    std::fs::create_dir_all(out_dir).context("failed to create output directory")?;
    let file_name = config
        .output_file
        .clone()
        .unwrap_or_else(|| format!("members_{}.csv", Local::now().format("%Y%m%d_%H%M%S")));
    let out_path = out_dir.join(file_name);

    let mut writer = csv::Writer::from_path(&out_path)
        .with_context(|| format!("failed to open {}", out_path.display()))?;
    writer.write_record(HEADER)?;

    let mut written = 0usize;
    for member in &members {
        if config.skip_bots && member.user.bot {
            continue;
        }
        writer.write_record(member_record(member, &roles))?;
        written += 1;
    }
    writer.flush().context("failed to write export file")?;

    info!(members = written, path = %out_path.display(), "export complete");
    Ok((out_path, written))
}

fn member_record(member: &Member, roles: &HashMap<RoleId, Role>) -> Vec<String> {
    vec![
        member.user.id.get().to_string(),
        member.user.name.to_string(),
        member.display_name().to_string(),
        member
            .user
            .discriminator
            .map(|d| format!("{:04}", d.get()))
            .unwrap_or_default(),
        member.nick.as_deref().unwrap_or_default().to_string(),
        member
            .joined_at
            .map(|t| t.to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
        member.user.created_at().to_string(),
        member.user.bot.to_string(),
        top_role_name(member, roles),
    ]
}

/// Highest-positioned role, or the implicit everyone role.
fn top_role_name(member: &Member, roles: &HashMap<RoleId, Role>) -> String {
    member
        .roles
        .iter()
        .filter_map(|id| roles.get(id))
        .max_by_key(|role| role.position)
        .map(|role| role.name.to_string())
        .unwrap_or_else(|| "@everyone".to_string())
}
