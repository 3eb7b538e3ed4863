// Invite attribution: which invite link (and so which inviter) brought a
// member in, worked out by diffing use-counts between two invite snapshots.

pub mod invite_models;
pub mod invite_ports;
pub mod invite_tracker;

pub use invite_models::{AttributionStatus, InviteRecord, JoinAttribution};
pub use invite_ports::{InviteFetchError, InviteSource, InviteStateStore};
pub use invite_tracker::InviteTracker;
