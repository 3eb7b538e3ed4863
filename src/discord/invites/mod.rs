// Discord side of invite tracking: gateway event handlers and the notices
// posted to the configured log channels.

pub mod events;
pub mod formatter;
