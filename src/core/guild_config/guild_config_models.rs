/// Per-server destinations for join and invite notices.
///
/// A `None` slot means the notice is not posted for that server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuildLogConfig {
    pub guild_id: u64,
    pub join_channel_id: Option<u64>,
    pub invite_channel_id: Option<u64>,
}

impl GuildLogConfig {
    pub fn empty(guild_id: u64) -> Self {
        Self {
            guild_id,
            ..Default::default()
        }
    }

    pub fn channel(&self, slot: LogSlot) -> Option<u64> {
        match slot {
            LogSlot::Join => self.join_channel_id,
            LogSlot::Invite => self.invite_channel_id,
        }
    }

    pub fn channel_mut(&mut self, slot: LogSlot) -> &mut Option<u64> {
        match slot {
            LogSlot::Join => &mut self.join_channel_id,
            LogSlot::Invite => &mut self.invite_channel_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.join_channel_id.is_none() && self.invite_channel_id.is_none()
    }
}

/// Which of the two configurable channels a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSlot {
    Join,
    Invite,
}

impl LogSlot {
    pub fn label(&self) -> &'static str {
        match self {
            LogSlot::Join => "join log",
            LogSlot::Invite => "invite log",
        }
    }
}

/// Outcome of a remove request. Removal only happens when the supplied
/// channel is the one currently configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRemoval {
    Removed,
    NotCurrent,
}
