// Bot presence. Discord-layer glue only.

use poise::serenity_prelude as serenity;

/// Called once the bot is ready so members can see what it is doing.
pub fn on_ready(ctx: &serenity::Context) {
    let activity = serenity::ActivityData::watching("for new members");
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}
