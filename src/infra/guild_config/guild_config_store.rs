// Implementations of the guild configuration store.

pub mod in_memory;

pub use in_memory::InMemoryGuildConfigStore;
