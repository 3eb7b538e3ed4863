use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Show how many joins have been credited to a member's invites.
#[poise::command(slash_command, guild_only)]
pub async fn invites(
    ctx: Context<'_>,
    #[description = "User to check (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let target = user.as_ref().unwrap_or_else(|| ctx.author());
    let total = ctx.data().invites.inviter_total(target.id.get()).await?;

    ctx.send(
        poise::CreateReply::default()
            .content(format!("🔢 <@{}> has **{}** invites.", target.id, total))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
