use super::guild_config_models::{ChannelRemoval, GuildLogConfig, LogSlot};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

#[async_trait]
pub trait GuildConfigStore: Send + Sync {
    async fn get_config(&self, guild_id: u64) -> Result<Option<GuildLogConfig>>;
    async fn save_config(&self, config: GuildLogConfig) -> Result<()>;
}

/// Owns the log-channel settings of every server.
///
/// Commands for the same server may arrive concurrently, so every
/// read-modify-write goes through `write_lock`. Contention is expected to be
/// negligible (admins rarely reconfigure), so one coarse lock is enough.
pub struct GuildConfigService<S: GuildConfigStore> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: GuildConfigStore> GuildConfigService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Current configuration, or an empty one for servers never configured.
    pub async fn get_config(&self, guild_id: u64) -> Result<GuildLogConfig> {
        Ok(self
            .store
            .get_config(guild_id)
            .await?
            .unwrap_or_else(|| GuildLogConfig::empty(guild_id)))
    }

    pub async fn set_log_channel(&self, guild_id: u64, channel_id: u64) -> Result<()> {
        self.set_channel(guild_id, LogSlot::Join, channel_id).await
    }

    pub async fn remove_log_channel(&self, guild_id: u64, channel_id: u64) -> Result<ChannelRemoval> {
        self.remove_channel(guild_id, LogSlot::Join, channel_id).await
    }

    pub async fn set_invite_channel(&self, guild_id: u64, channel_id: u64) -> Result<()> {
        self.set_channel(guild_id, LogSlot::Invite, channel_id).await
    }

    pub async fn remove_invite_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<ChannelRemoval> {
        self.remove_channel(guild_id, LogSlot::Invite, channel_id).await
    }

    /// Last write wins; creates the server entry on first use.
    pub async fn set_channel(&self, guild_id: u64, slot: LogSlot, channel_id: u64) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut config = self.get_config(guild_id).await?;
        *config.channel_mut(slot) = Some(channel_id);
        self.store.save_config(config).await?;

        tracing::info!(guild_id, channel_id, slot = slot.label(), "Log channel set");
        Ok(())
    }

    pub async fn remove_channel(
        &self,
        guild_id: u64,
        slot: LogSlot,
        channel_id: u64,
    ) -> Result<ChannelRemoval> {
        let _guard = self.write_lock.lock().await;

        let mut config = self.get_config(guild_id).await?;
        if config.channel(slot) != Some(channel_id) {
            return Ok(ChannelRemoval::NotCurrent);
        }

        *config.channel_mut(slot) = None;
        self.store.save_config(config).await?;

        tracing::info!(guild_id, channel_id, slot = slot.label(), "Log channel removed");
        Ok(ChannelRemoval::Removed)
    }
}
