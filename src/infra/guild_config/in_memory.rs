// Volatile store: configuration lives as long as the process does.
// A database-backed store only has to implement the same trait.

use crate::core::guild_config::{GuildConfigStore, GuildLogConfig};
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

pub struct InMemoryGuildConfigStore {
    /// Guild ID -> configured log channels
    configs: DashMap<u64, GuildLogConfig>,
}

impl InMemoryGuildConfigStore {
    pub fn new() -> Self {
        Self {
            configs: DashMap::new(),
        }
    }
}

impl Default for InMemoryGuildConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GuildConfigStore for InMemoryGuildConfigStore {
    async fn get_config(&self, guild_id: u64) -> Result<Option<GuildLogConfig>> {
        Ok(self.configs.get(&guild_id).map(|entry| entry.clone()))
    }

    async fn save_config(&self, config: GuildLogConfig) -> Result<()> {
        self.configs.insert(config.guild_id, config);
        Ok(())
    }
}
