// Discord commands module.
// Each feature gets its own command file.

pub mod log_channels;

pub mod invites;

pub mod presence;
