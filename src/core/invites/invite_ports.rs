use super::invite_models::InviteRecord;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InviteFetchError {
    #[error("Missing permission to list invites")]
    MissingPermissions,

    #[error("Invite request failed: {0}")]
    Request(String),
}

/// Where invite listings come from (the chat platform in production).
#[async_trait]
pub trait InviteSource: Send + Sync {
    async fn list_invites(&self, guild_id: u64) -> Result<Vec<InviteRecord>, InviteFetchError>;
}

/// Holds the last snapshot per server and the per-inviter join counters.
///
/// Callers serialize writes for the same server; implementations only need
/// each individual call to be atomic.
#[async_trait]
pub trait InviteStateStore: Send + Sync {
    /// Last stored snapshot, empty if none was ever stored.
    async fn get_snapshot(&self, guild_id: u64) -> Result<Vec<InviteRecord>>;

    async fn replace_snapshot(&self, guild_id: u64, invites: Vec<InviteRecord>) -> Result<()>;

    /// Adds one to the inviter's counter and returns the new total.
    async fn increment_inviter(&self, inviter_id: u64) -> Result<u64>;

    async fn inviter_total(&self, inviter_id: u64) -> Result<u64>;
}
