use crate::core::invites::{AttributionStatus, JoinAttribution};
use crate::discord::invites::formatter::{invite_notice, join_notice};
use crate::discord::Data;
use crate::infra::invites::DiscordInviteSource;
use anyhow::Result;
use poise::serenity_prelude::{self as serenity, Context, Mentionable};
use std::sync::Arc;

/// Record the baseline invite snapshot of every listed guild.
///
/// Best effort: a guild whose invites cannot be listed gets an empty
/// snapshot and the rest carry on.
pub async fn prime_guilds(
    http: Arc<serenity::Http>,
    data: &Data,
    guild_ids: impl IntoIterator<Item = serenity::GuildId>,
) {
    let source = DiscordInviteSource::new(http);
    let mut unavailable = 0usize;

    for guild_id in guild_ids {
        match data.invites.prime_snapshot(&source, guild_id.get()).await {
            Ok(listing) if !listing.is_available() => unavailable += 1,
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Failed to store invite snapshot for guild {}: {}", guild_id, e);
            }
        }
    }

    if unavailable > 0 {
        tracing::warn!(
            unavailable,
            "Some guilds do not allow listing invites; joins there cannot be attributed"
        );
    }
}

/// Newly joined guilds need a baseline before their first member join.
pub async fn handle_guild_create(
    ctx: &Context,
    data: &Data,
    guild: &serenity::Guild,
    is_new: Option<bool>,
) -> Result<()> {
    if is_new != Some(true) {
        return Ok(());
    }

    tracing::info!(guild_id = guild.id.get(), "Joined new guild");
    prime_guilds(ctx.http.clone(), data, [guild.id]).await;
    Ok(())
}

/// Invites created or deleted after startup would otherwise be missing from
/// the baseline, so the snapshot is refreshed on either event.
///
/// The refresh takes the same per-guild lock as a join. If it wins the lock
/// against a join that happened at nearly the same time, the new baseline
/// already contains that join's use-count bump and the join goes unattributed.
pub async fn handle_invite_change(
    ctx: &Context,
    data: &Data,
    guild_id: Option<serenity::GuildId>,
) -> Result<()> {
    let guild_id = match guild_id {
        Some(id) => id,
        None => return Ok(()),
    };

    let source = DiscordInviteSource::new(ctx.http.clone());
    data.invites.prime_snapshot(&source, guild_id.get()).await?;
    Ok(())
}

pub async fn handle_member_join(
    ctx: &Context,
    data: &Data,
    member: &serenity::Member,
) -> Result<()> {
    let guild_id = member.guild_id.get();
    let user_id = member.user.id.get();

    let source = DiscordInviteSource::new(ctx.http.clone());
    let attribution = match data.invites.attribute_join(&source, guild_id, user_id).await {
        Ok(attribution) => attribution,
        Err(e) => {
            // Join logging still goes out, just without an inviter.
            tracing::error!(guild_id, user_id, "Invite attribution failed: {}", e);
            JoinAttribution::unattributed(AttributionStatus::NoMatch)
        }
    };

    let config = data.guild_config.get_config(guild_id).await?;
    let mention = member.mention().to_string();

    if let Some(channel_id) = config.join_channel_id {
        post_notice(ctx, member.guild_id, channel_id, join_notice(&mention)).await;
    }

    if let Some(channel_id) = config.invite_channel_id {
        post_notice(
            ctx,
            member.guild_id,
            channel_id,
            invite_notice(&mention, &attribution),
        )
        .await;
    }

    Ok(())
}

/// Send `content` if the channel still exists in the guild. Unresolvable
/// channels and failed sends are dropped without telling anyone.
async fn post_notice(ctx: &Context, guild_id: serenity::GuildId, channel_id: u64, content: String) {
    let channel = serenity::ChannelId::new(channel_id);

    let resolvable = ctx
        .cache
        .guild(guild_id)
        .is_some_and(|guild| guild.channels.contains_key(&channel));
    if !resolvable {
        tracing::debug!(
            guild_id = guild_id.get(),
            channel_id,
            "Log channel not found, skipping notice"
        );
        return;
    }

    if let Err(e) = channel.say(&ctx.http, content).await {
        tracing::debug!(
            guild_id = guild_id.get(),
            channel_id,
            "Failed to post notice: {}",
            e
        );
    }
}
