use crate::core::invites::{InviteRecord, InviteStateStore};
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

/// In-memory snapshots and inviter counters.
///
/// Counters are keyed by user only, so joins credited in different servers
/// add up to one total. Everything is lost on restart.
pub struct InMemoryInviteStore {
    /// Guild ID -> last observed invites, in platform order
    snapshots: DashMap<u64, Vec<InviteRecord>>,
    /// Inviter user ID -> joins credited
    counters: DashMap<u64, u64>,
}

impl InMemoryInviteStore {
    pub fn new() -> Self {
        Self {
            snapshots: DashMap::new(),
            counters: DashMap::new(),
        }
    }
}

impl Default for InMemoryInviteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InviteStateStore for InMemoryInviteStore {
    async fn get_snapshot(&self, guild_id: u64) -> Result<Vec<InviteRecord>> {
        Ok(self
            .snapshots
            .get(&guild_id)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }

    async fn replace_snapshot(&self, guild_id: u64, invites: Vec<InviteRecord>) -> Result<()> {
        self.snapshots.insert(guild_id, invites);
        Ok(())
    }

    async fn increment_inviter(&self, inviter_id: u64) -> Result<u64> {
        // entry() holds the shard lock, so the increment is atomic
        let mut count = self.counters.entry(inviter_id).or_insert(0);
        *count = count.saturating_add(1);
        Ok(*count)
    }

    async fn inviter_total(&self, inviter_id: u64) -> Result<u64> {
        Ok(self.counters.get(&inviter_id).map(|c| *c).unwrap_or(0))
    }
}
