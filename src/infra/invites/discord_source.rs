use crate::core::invites::{InviteFetchError, InviteRecord, InviteSource};
use async_trait::async_trait;
use serenity::all::{GuildId, Http, RichInvite};
use std::sync::Arc;

const FORBIDDEN: u16 = 403;

/// Lists a guild's invites through the Discord REST API.
///
/// Needs the Manage Server permission; without it Discord answers 403, which
/// is reported as `MissingPermissions` rather than a request failure.
pub struct DiscordInviteSource {
    http: Arc<Http>,
}

impl DiscordInviteSource {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl InviteSource for DiscordInviteSource {
    async fn list_invites(&self, guild_id: u64) -> Result<Vec<InviteRecord>, InviteFetchError> {
        let invites = GuildId::new(guild_id)
            .invites(&self.http)
            .await
            .map_err(classify_error)?;

        Ok(invites.iter().map(to_record).collect())
    }
}

fn to_record(invite: &RichInvite) -> InviteRecord {
    InviteRecord::new(
        invite.code.clone(),
        invite.uses,
        invite.inviter.as_ref().map(|user| user.id.get()),
    )
}

fn classify_error(err: serenity::Error) -> InviteFetchError {
    if let serenity::Error::Http(http_err) = &err {
        if http_err
            .status_code()
            .is_some_and(|status| status.as_u16() == FORBIDDEN)
        {
            return InviteFetchError::MissingPermissions;
        }
    }

    InviteFetchError::Request(err.to_string())
}
