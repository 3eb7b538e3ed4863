// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "guild_config/guild_config_store.rs"]
pub mod guild_config;

#[path = "invites/invite_store.rs"]
pub mod invites;
