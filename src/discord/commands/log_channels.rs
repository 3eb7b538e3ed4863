// Slash commands that configure where join and invite notices go.
//
// Same shape as every command here: pull primitive ids out of the Discord
// types, call the core service, reply with the outcome. Replies are
// ephemeral so only the admin who ran the command sees them.

use crate::core::guild_config::{ChannelRemoval, GuildConfigService, LogSlot};
use crate::core::invites::InviteTracker;
use crate::infra::guild_config::InMemoryGuildConfigStore;
use crate::infra::invites::InMemoryInviteStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub struct Data {
    pub guild_config: Arc<GuildConfigService<InMemoryGuildConfigStore>>,
    pub invites: Arc<InviteTracker<InMemoryInviteStore>>,
}

/// Set the channel for join logs.
#[poise::command(slash_command, guild_only, rename = "set-log-channel")]
pub async fn set_log_channel(
    ctx: Context<'_>,
    #[description = "Channel where join messages will be sent"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();

    ctx.data()
        .guild_config
        .set_log_channel(guild_id, channel.id.get())
        .await?;
    reply_private(ctx, set_message(LogSlot::Join, channel.id.get())).await
}

/// Remove the join log channel.
#[poise::command(slash_command, guild_only, rename = "remove-log-channel")]
pub async fn remove_log_channel(
    ctx: Context<'_>,
    #[description = "Channel to remove"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();

    let outcome = ctx
        .data()
        .guild_config
        .remove_log_channel(guild_id, channel.id.get())
        .await?;
    reply_private(ctx, removal_message(LogSlot::Join, outcome, channel.id.get())).await
}

/// Set the channel for invite logs.
#[poise::command(slash_command, guild_only, rename = "set-invite-channel")]
pub async fn set_invite_channel(
    ctx: Context<'_>,
    #[description = "Channel where invite info will be sent"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();

    ctx.data()
        .guild_config
        .set_invite_channel(guild_id, channel.id.get())
        .await?;
    reply_private(ctx, set_message(LogSlot::Invite, channel.id.get())).await
}

/// Remove the invite log channel.
#[poise::command(slash_command, guild_only, rename = "remove-invite-channel")]
pub async fn remove_invite_channel(
    ctx: Context<'_>,
    #[description = "Channel to remove"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();

    let outcome = ctx
        .data()
        .guild_config
        .remove_invite_channel(guild_id, channel.id.get())
        .await?;
    reply_private(ctx, removal_message(LogSlot::Invite, outcome, channel.id.get())).await
}

/// Show the channels currently receiving join and invite logs.
#[poise::command(slash_command, guild_only, rename = "log-channels")]
pub async fn log_channels(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    let config = ctx.data().guild_config.get_config(guild_id).await?;

    let describe = |slot: LogSlot| {
        config
            .channel(slot)
            .map(|id| format!("<#{}>", id))
            .unwrap_or_else(|| "Not set".to_string())
    };

    let mut embed = serenity::CreateEmbed::default()
        .title("Join Logging Configuration")
        .color(serenity::Color::BLURPLE)
        .field("Join Log Channel", describe(LogSlot::Join), false)
        .field("Invite Log Channel", describe(LogSlot::Invite), false)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Guild ID: {}",
            guild_id
        )));
    if config.is_empty() {
        embed = embed.description(
            "Nothing configured yet. Use `/set-log-channel` or `/set-invite-channel`.",
        );
    }

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

async fn reply_private(ctx: Context<'_>, content: String) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().content(content).ephemeral(true))
        .await?;
    Ok(())
}

fn slot_title(slot: LogSlot) -> &'static str {
    match slot {
        LogSlot::Join => "Join",
        LogSlot::Invite => "Invite",
    }
}

fn set_message(slot: LogSlot, channel_id: u64) -> String {
    format!("✅ {} logs set to <#{}>", slot_title(slot), channel_id)
}

fn removal_message(slot: LogSlot, outcome: ChannelRemoval, channel_id: u64) -> String {
    match outcome {
        ChannelRemoval::Removed => {
            format!("🗑️ Removed {} channel <#{}>", slot.label(), channel_id)
        }
        ChannelRemoval::NotCurrent => {
            format!("❌ That channel is not the current {} channel.", slot.label())
        }
    }
}
