//! Guild state snapshots and the category-scoped channel creator.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serenity::all::{
    ChannelId, ChannelType, CreateChannel, GuildChannel, GuildId, Http, Member, PartialGuild,
    PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId, UserId,
};
use tracing::{debug, info};

use guildsmith_core::engine::{ChannelCreator, CreateError};
use guildsmith_core::types::{AccessGrant, AccountId, GrantSubject, RosterMember};

/// Page size for the paginated member listing.
const MEMBER_PAGE: u64 = 1000;

/// Fetch the target guild; an unknown id or an unreachable guild is fatal.
pub async fn fetch_guild(http: &Arc<Http>, guild_id: u64) -> Result<PartialGuild> {
    anyhow::ensure!(guild_id != 0, "guild ID must be nonzero");
    http.get_guild(GuildId::new(guild_id))
        .await
        .with_context(|| format!("could not find guild with ID {guild_id}"))
}

/// All channels in the guild, keyed by id. One snapshot serves both the
/// category lookup and the existing-names check.
pub async fn fetch_channels(
    http: &Arc<Http>,
    guild: GuildId,
) -> Result<HashMap<ChannelId, GuildChannel>> {
    guild
        .channels(http)
        .await
        .context("failed to list guild channels")
}

/// Find the category by exact name, creating it when missing.
pub async fn ensure_category(
    http: &Arc<Http>,
    guild: GuildId,
    channels: &HashMap<ChannelId, GuildChannel>,
    name: &str,
) -> Result<ChannelId> {
    if let Some(existing) = channels
        .values()
        .find(|c| c.kind == ChannelType::Category && c.name == name)
    {
        info!(category = %name, "found existing category");
        return Ok(existing.id);
    }
    info!(category = %name, "creating category");
    let created = guild
        .create_channel(http, CreateChannel::new(name).kind(ChannelType::Category))
        .await
        .with_context(|| format!("failed to create category '{name}'"))?;
    Ok(created.id)
}

/// Names of the channels currently inside `category`.
pub fn channel_names_in(
    channels: &HashMap<ChannelId, GuildChannel>,
    category: ChannelId,
) -> Vec<String> {
    channels
        .values()
        .filter(|c| c.parent_id == Some(category))
        .map(|c| c.name.to_string())
        .collect()
}

/// Full member roster via the paginated REST listing.
pub async fn fetch_members(http: &Arc<Http>, guild: GuildId) -> Result<Vec<Member>> {
    let mut members = Vec::new();
    let mut after: Option<UserId> = None;
    loop {
        let page = guild
            .members(http, Some(MEMBER_PAGE), after)
            .await
            .context("failed to list guild members")?;
        debug!(page = page.len(), total = members.len(), "fetched member page");
        let full_page = page.len() as u64 == MEMBER_PAGE;
        after = page.last().map(|m| m.user.id);
        members.extend(page);
        if !full_page {
            break;
        }
    }
    Ok(members)
}

/// Project the platform member list into the resolver's roster snapshot.
pub fn roster_of(members: &[Member]) -> Vec<RosterMember> {
    members
        .iter()
        .map(|m| RosterMember {
            id: AccountId(m.user.id.get()),
            name: m.user.name.to_string(),
            display_name: m
                .nick
                .as_deref()
                .or(m.user.global_name.as_deref())
                .map(str::to_string),
            discriminator: m.user.discriminator.map(|d| d.get()),
            bot: m.user.bot,
        })
        .collect()
}

/// Creates private text channels inside one category.
pub struct CategoryCreator {
    http: Arc<Http>,
    guild: GuildId,
    category: ChannelId,
}

impl CategoryCreator {
    pub fn new(http: Arc<Http>, guild: GuildId, category: ChannelId) -> Self {
        Self {
            http,
            guild,
            category,
        }
    }

    fn overwrite(&self, grant: &AccessGrant) -> PermissionOverwrite {
        let mut allow = Permissions::empty();
        let mut deny = Permissions::empty();
        // read=false is an explicit view deny — that is what makes the
        // channel private. send only ever widens.
        if grant.read {
            allow |= Permissions::VIEW_CHANNEL;
        } else {
            deny |= Permissions::VIEW_CHANNEL;
        }
        if grant.send {
            allow |= Permissions::SEND_MESSAGES;
        }
        let kind = match grant.subject {
            GrantSubject::Everyone => {
                // The everyone role shares the guild's id.
                PermissionOverwriteType::Role(RoleId::new(self.guild.get()))
            }
            GrantSubject::Account(AccountId(id)) => {
                PermissionOverwriteType::Member(UserId::new(id))
            }
        };
        PermissionOverwrite { allow, deny, kind }
    }
}

#[async_trait]
impl ChannelCreator for CategoryCreator {
    async fn create_channel(
        &self,
        name: &str,
        grants: &[AccessGrant],
    ) -> Result<(), CreateError> {
        let overwrites: Vec<PermissionOverwrite> =
            grants.iter().map(|g| self.overwrite(g)).collect();
        let builder = CreateChannel::new(name)
            .kind(ChannelType::Text)
            .category(self.category)
            .permissions(overwrites);
        self.guild
            .create_channel(&self.http, builder)
            .await
            .map(|_| ())
            .map_err(map_create_error)
    }
}

fn map_create_error(err: serenity::Error) -> CreateError {
    match err {
        serenity::Error::Http(http_err) => {
            if let serenity::http::HttpError::UnsuccessfulRequest(ref resp) = http_err {
                if resp.status_code.as_u16() == 403 {
                    return CreateError::Forbidden;
                }
            }
            CreateError::Http {
                message: http_err.to_string(),
            }
        }
        other => CreateError::Other {
            message: other.to_string(),
        },
    }
}
