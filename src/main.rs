// This is the entry point of the Discord bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (in-memory stores, Discord API)
// - `discord/` = Discord-specific adapters (commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::guild_config::GuildConfigService;
use crate::core::invites::InviteTracker;
use crate::discord::commands::presence;
use crate::discord::invites::events as invite_events;
use crate::discord::{Data, Error};
use crate::infra::guild_config::InMemoryGuildConfigStore;
use crate::infra::invites::InMemoryInviteStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Event handler for non-command Discord events.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            if let Err(e) = invite_events::handle_member_join(ctx, data, new_member).await {
                tracing::error!("Error handling member join: {}", e);
            }
        }
        serenity::FullEvent::GuildCreate { guild, is_new } => {
            if let Err(e) = invite_events::handle_guild_create(ctx, data, guild, *is_new).await {
                tracing::error!("Error handling guild create: {}", e);
            }
        }
        serenity::FullEvent::InviteCreate { data: invite } => {
            if let Err(e) = invite_events::handle_invite_change(ctx, data, invite.guild_id).await
            {
                tracing::error!("Error refreshing invites after create: {}", e);
            }
        }
        serenity::FullEvent::InviteDelete { data: invite } => {
            if let Err(e) = invite_events::handle_invite_change(ctx, data, invite.guild_id).await
            {
                tracing::error!("Error refreshing invites after delete: {}", e);
            }
        }

        _ => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Get Discord bot token from environment
    let token = std::env::var("DISCORD_TOKEN").expect(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    );

    // Optional: register commands in one server only, which takes effect
    // immediately instead of waiting for global propagation.
    let dev_guild_id = std::env::var("DEV_GUILD_ID")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(serenity::GuildId::new);

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // All state is in memory and lives as long as the process.

    let guild_config_service = Arc::new(GuildConfigService::new(InMemoryGuildConfigStore::new()));
    let invite_tracker = Arc::new(InviteTracker::new(InMemoryInviteStore::new()));

    let data = Data {
        guild_config: Arc::clone(&guild_config_service),
        invites: Arc::clone(&invite_tracker),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    // GUILD_INVITES is needed for invite create/delete events; listing
    // invites additionally needs the Manage Server permission in each guild.
    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_INVITES;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                discord::commands::log_channels::set_log_channel(),
                discord::commands::log_channels::remove_log_channel(),
                discord::commands::log_channels::set_invite_channel(),
                discord::commands::log_channels::remove_invite_channel(),
                discord::commands::log_channels::log_channels(),
                discord::commands::invites::invites(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                println!("✅ Logged in as {}", ready.user.name);

                // Baseline snapshots first so the first join can be attributed.
                let guild_ids: Vec<serenity::GuildId> = ready.guilds.iter().map(|g| g.id).collect();
                invite_events::prime_guilds(ctx.http.clone(), &data, guild_ids).await;
                tracing::info!(guilds = ready.guilds.len(), "Invite snapshots primed");

                match dev_guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            guild_id,
                        )
                        .await?
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?
                    }
                }

                println!("✅ Slash commands synced");
                presence::on_ready(ctx);

                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .expect("Error creating client");

    client.start().await.expect("Error running bot");
}
