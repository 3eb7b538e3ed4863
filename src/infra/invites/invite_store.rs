// Implementations of the invite tracking ports.

pub mod discord_source;
pub mod in_memory;

pub use discord_source::DiscordInviteSource;
pub use in_memory::InMemoryInviteStore;
