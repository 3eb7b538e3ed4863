use super::invite_ports::InviteFetchError;

/// One active invite as observed at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteRecord {
    pub code: String,
    pub uses: u64,
    /// `None` for vanity links and invites whose creator is unknown.
    pub inviter_id: Option<u64>,
}

impl InviteRecord {
    pub fn new(code: impl Into<String>, uses: u64, inviter_id: Option<u64>) -> Self {
        Self {
            code: code.into(),
            uses,
            inviter_id,
        }
    }
}

/// Result of asking the platform for a server's invites.
///
/// Keeps "the server has no invites" (`Available(vec![])`) apart from
/// "we could not look" (`Unavailable`), even though both end up stored as an
/// empty snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteListing {
    Available(Vec<InviteRecord>),
    Unavailable(InviteFetchError),
}

impl InviteListing {
    pub fn from_fetch(result: Result<Vec<InviteRecord>, InviteFetchError>) -> Self {
        match result {
            Ok(records) => InviteListing::Available(records),
            Err(err) => InviteListing::Unavailable(err),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, InviteListing::Available(_))
    }

    /// Fail-open view: a failed fetch counts as an empty list.
    pub fn records(&self) -> &[InviteRecord] {
        match self {
            InviteListing::Available(records) => records,
            InviteListing::Unavailable(_) => &[],
        }
    }

    pub fn into_records(self) -> Vec<InviteRecord> {
        match self {
            InviteListing::Available(records) => records,
            InviteListing::Unavailable(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributionStatus {
    /// An invite's use-count went up and its creator was credited.
    Found,
    /// An invite's use-count went up but it has no known creator (vanity link).
    AnonymousInvite,
    /// The listing was fetched but no invite's use-count went up.
    NoMatch,
    /// The listing could not be fetched; nothing could be detected.
    ListingUnavailable(InviteFetchError),
}

/// What the tracker concluded about a single join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinAttribution {
    pub inviter_id: Option<u64>,
    pub invite_code: Option<String>,
    /// Running total for `inviter_id` after this join, 0 when no inviter.
    pub total_invites: u64,
    pub status: AttributionStatus,
}

impl JoinAttribution {
    pub fn unattributed(status: AttributionStatus) -> Self {
        Self {
            inviter_id: None,
            invite_code: None,
            total_invites: 0,
            status,
        }
    }
}
