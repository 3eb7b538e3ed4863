use super::invite_models::{AttributionStatus, InviteListing, InviteRecord, JoinAttribution};
use super::invite_ports::{InviteSource, InviteStateStore};
use anyhow::Result;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Find the invite whose use-count went up between two snapshots.
///
/// Only codes present in both lists are compared. The first record of
/// `current` (in platform order) with a strictly higher count wins; if several
/// went up at once the pick depends on that order. Codes that vanished from
/// `current` (a single-use invite that got consumed) cannot be detected.
pub fn find_used_invite<'a>(
    previous: &[InviteRecord],
    current: &'a [InviteRecord],
) -> Option<&'a InviteRecord> {
    let previous_uses: HashMap<&str, u64> = previous
        .iter()
        .map(|invite| (invite.code.as_str(), invite.uses))
        .collect();

    current.iter().find(|invite| {
        previous_uses
            .get(invite.code.as_str())
            .is_some_and(|&old_uses| invite.uses > old_uses)
    })
}

/// Tracks invite snapshots per server and credits inviters on joins.
///
/// Fetch, diff, snapshot replacement and counter update for one server form a
/// single critical section, so two joins to the same server are handled one
/// after the other. Different servers never wait on each other.
pub struct InviteTracker<S: InviteStateStore> {
    store: S,
    // Guild ID -> lock serializing snapshot read-modify-write
    guild_locks: DashMap<u64, Arc<Mutex<()>>>,
}

impl<S: InviteStateStore> InviteTracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            guild_locks: DashMap::new(),
        }
    }

    fn guild_lock(&self, guild_id: u64) -> Arc<Mutex<()>> {
        self.guild_locks.entry(guild_id).or_default().clone()
    }

    /// Store the server's current invites as the baseline for the next join.
    ///
    /// A failed fetch stores an empty snapshot; the returned listing says
    /// which of the two happened.
    pub async fn prime_snapshot(
        &self,
        source: &impl InviteSource,
        guild_id: u64,
    ) -> Result<InviteListing> {
        let lock = self.guild_lock(guild_id);
        let _guard = lock.lock().await;

        let listing = InviteListing::from_fetch(source.list_invites(guild_id).await);
        self.store
            .replace_snapshot(guild_id, listing.records().to_vec())
            .await?;

        match &listing {
            InviteListing::Available(records) => {
                tracing::debug!(guild_id, invites = records.len(), "Invite snapshot primed")
            }
            InviteListing::Unavailable(err) => {
                tracing::warn!(guild_id, "Invite snapshot unavailable: {}", err)
            }
        }

        Ok(listing)
    }

    /// Work out who invited `user_id` into `guild_id`.
    ///
    /// The stored snapshot is always replaced by the freshly fetched listing
    /// (empty if the fetch failed), whether or not an inviter was found.
    pub async fn attribute_join(
        &self,
        source: &impl InviteSource,
        guild_id: u64,
        user_id: u64,
    ) -> Result<JoinAttribution> {
        let lock = self.guild_lock(guild_id);
        let _guard = lock.lock().await;

        let listing = InviteListing::from_fetch(source.list_invites(guild_id).await);
        let previous = self.store.get_snapshot(guild_id).await?;
        let used = find_used_invite(&previous, listing.records()).cloned();

        let unavailable = match &listing {
            InviteListing::Unavailable(err) => Some(err.clone()),
            InviteListing::Available(_) => None,
        };
        // Fail-open: a failed fetch stores an empty baseline rather than keeping
        // the previous one, so the next join in this guild cannot be attributed
        // either. The join after that diffs against a fresh listing again.
        self.store
            .replace_snapshot(guild_id, listing.into_records())
            .await?;

        let attribution = match used {
            Some(InviteRecord {
                code,
                inviter_id: Some(inviter_id),
                ..
            }) => {
                let total = self.store.increment_inviter(inviter_id).await?;
                JoinAttribution {
                    inviter_id: Some(inviter_id),
                    invite_code: Some(code),
                    total_invites: total,
                    status: AttributionStatus::Found,
                }
            }
            Some(InviteRecord {
                code,
                inviter_id: None,
                ..
            }) => JoinAttribution {
                invite_code: Some(code),
                ..JoinAttribution::unattributed(AttributionStatus::AnonymousInvite)
            },
            None => match unavailable {
                Some(err) => JoinAttribution::unattributed(AttributionStatus::ListingUnavailable(err)),
                None => JoinAttribution::unattributed(AttributionStatus::NoMatch),
            },
        };

        tracing::info!(
            guild_id,
            user_id,
            inviter_id = ?attribution.inviter_id,
            invite_code = ?attribution.invite_code,
            total_invites = attribution.total_invites,
            status = ?attribution.status,
            "Join attributed"
        );

        Ok(attribution)
    }

    /// Joins credited to `inviter_id` so far (0 if none).
    pub async fn inviter_total(&self, inviter_id: u64) -> Result<u64> {
        self.store.inviter_total(inviter_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::invites::InviteFetchError;
    use async_trait::async_trait;
    use std::collections::VecDeque;

    const GUILD: u64 = 1000;
    const U1: u64 = 11;
    const U2: u64 = 22;

    /// Store kept local to the tests so the core does not depend on infra.
    #[derive(Default)]
    struct MapStore {
        snapshots: DashMap<u64, Vec<InviteRecord>>,
        counters: DashMap<u64, u64>,
    }

    #[async_trait]
    impl InviteStateStore for MapStore {
        async fn get_snapshot(&self, guild_id: u64) -> Result<Vec<InviteRecord>> {
            let snapshot = self
                .snapshots
                .get(&guild_id)
                .map(|s| s.clone())
                .unwrap_or_default();
            // Give other tasks a turn between read and write, like a real backend would.
            tokio::task::yield_now().await;
            Ok(snapshot)
        }

        async fn replace_snapshot(&self, guild_id: u64, invites: Vec<InviteRecord>) -> Result<()> {
            self.snapshots.insert(guild_id, invites);
            Ok(())
        }

        async fn increment_inviter(&self, inviter_id: u64) -> Result<u64> {
            let mut count = self.counters.entry(inviter_id).or_insert(0);
            *count += 1;
            Ok(*count)
        }

        async fn inviter_total(&self, inviter_id: u64) -> Result<u64> {
            Ok(self.counters.get(&inviter_id).map(|c| *c).unwrap_or(0))
        }
    }

    /// Hands out one prepared listing per call, in order.
    struct ScriptedSource {
        responses: std::sync::Mutex<VecDeque<Result<Vec<InviteRecord>, InviteFetchError>>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Vec<InviteRecord>, InviteFetchError>>) -> Self {
            Self {
                responses: std::sync::Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait]
    impl InviteSource for ScriptedSource {
        async fn list_invites(&self, _: u64) -> Result<Vec<InviteRecord>, InviteFetchError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("ScriptedSource ran out of responses")
        }
    }

    fn invite(code: &str, uses: u64, inviter: Option<u64>) -> InviteRecord {
        InviteRecord::new(code, uses, inviter)
    }

    fn make_tracker() -> InviteTracker<MapStore> {
        InviteTracker::new(MapStore::default())
    }

    #[test]
    fn test_find_used_invite_picks_increased_count() {
        let previous = vec![invite("abc", 3, Some(U1)), invite("def", 1, Some(U2))];
        let current = vec![invite("abc", 3, Some(U1)), invite("def", 2, Some(U2))];

        let used = find_used_invite(&previous, &current).unwrap();
        assert_eq!(used.code, "def");
        assert_eq!(used.inviter_id, Some(U2));
    }

    #[test]
    fn test_find_used_invite_takes_first_in_current_order() {
        let previous = vec![invite("abc", 1, Some(U1)), invite("def", 1, Some(U2))];
        let current = vec![invite("def", 2, Some(U2)), invite("abc", 2, Some(U1))];

        assert_eq!(find_used_invite(&previous, &current).unwrap().code, "def");
    }

    #[test]
    fn test_find_used_invite_ignores_new_and_vanished_codes() {
        let previous = vec![invite("gone", 0, Some(U1))];
        let current = vec![invite("fresh", 1, Some(U2))];

        assert!(find_used_invite(&previous, &current).is_none());
    }

    #[test]
    fn test_find_used_invite_ignores_decreased_counts() {
        let previous = vec![invite("abc", 5, Some(U1))];
        let current = vec![invite("abc", 4, Some(U1))];

        assert!(find_used_invite(&previous, &current).is_none());
    }

    #[tokio::test]
    async fn test_increased_use_count_credits_inviter() {
        let tracker = make_tracker();
        let source = ScriptedSource::new(vec![
            Ok(vec![invite("abc", 3, Some(U1))]),
            Ok(vec![invite("abc", 4, Some(U1))]),
        ]);

        tracker.prime_snapshot(&source, GUILD).await.unwrap();
        let attribution = tracker.attribute_join(&source, GUILD, 99).await.unwrap();

        assert_eq!(attribution.status, AttributionStatus::Found);
        assert_eq!(attribution.inviter_id, Some(U1));
        assert_eq!(attribution.invite_code.as_deref(), Some("abc"));
        assert_eq!(attribution.total_invites, 1);
        assert_eq!(tracker.inviter_total(U1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_counts_credit_nobody() {
        let tracker = make_tracker();
        let source = ScriptedSource::new(vec![
            Ok(vec![invite("abc", 3, Some(U1))]),
            Ok(vec![invite("abc", 3, Some(U1))]),
        ]);

        tracker.prime_snapshot(&source, GUILD).await.unwrap();
        let attribution = tracker.attribute_join(&source, GUILD, 99).await.unwrap();

        assert_eq!(attribution, JoinAttribution::unattributed(AttributionStatus::NoMatch));
        assert_eq!(tracker.inviter_total(U1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_consumed_single_use_invite_is_not_detected() {
        let tracker = make_tracker();
        let source = ScriptedSource::new(vec![
            Ok(vec![invite("once", 0, Some(U1)), invite("abc", 3, Some(U2))]),
            Ok(vec![invite("abc", 3, Some(U2))]),
        ]);

        tracker.prime_snapshot(&source, GUILD).await.unwrap();
        let attribution = tracker.attribute_join(&source, GUILD, 99).await.unwrap();

        assert_eq!(attribution.inviter_id, None);
        assert_eq!(attribution.status, AttributionStatus::NoMatch);
    }

    #[tokio::test]
    async fn test_snapshot_is_replaced_even_without_attribution() {
        let tracker = make_tracker();
        let latest = vec![invite("abc", 3, Some(U1)), invite("new", 0, Some(U2))];
        let source = ScriptedSource::new(vec![
            Ok(vec![invite("abc", 3, Some(U1))]),
            Ok(latest.clone()),
        ]);

        tracker.prime_snapshot(&source, GUILD).await.unwrap();
        tracker.attribute_join(&source, GUILD, 99).await.unwrap();

        assert_eq!(tracker.store.get_snapshot(GUILD).await.unwrap(), latest);
    }

    #[tokio::test]
    async fn test_different_inviters_keep_independent_counters() {
        let tracker = make_tracker();
        let source = ScriptedSource::new(vec![
            Ok(vec![invite("a", 0, Some(U1)), invite("b", 0, Some(U2))]),
            Ok(vec![invite("a", 1, Some(U1)), invite("b", 0, Some(U2))]),
            Ok(vec![invite("a", 1, Some(U1)), invite("b", 1, Some(U2))]),
        ]);

        tracker.prime_snapshot(&source, GUILD).await.unwrap();
        let first = tracker.attribute_join(&source, GUILD, 101).await.unwrap();
        let second = tracker.attribute_join(&source, GUILD, 102).await.unwrap();

        assert_eq!((first.inviter_id, first.total_invites), (Some(U1), 1));
        assert_eq!((second.inviter_id, second.total_invites), (Some(U2), 1));
    }

    #[tokio::test]
    async fn test_repeated_joins_accumulate_for_same_inviter() {
        let tracker = make_tracker();
        let source = ScriptedSource::new(vec![
            Ok(vec![invite("a", 0, Some(U1))]),
            Ok(vec![invite("a", 1, Some(U1))]),
            Ok(vec![invite("a", 2, Some(U1))]),
        ]);

        tracker.prime_snapshot(&source, GUILD).await.unwrap();
        tracker.attribute_join(&source, GUILD, 101).await.unwrap();
        let second = tracker.attribute_join(&source, GUILD, 102).await.unwrap();

        assert_eq!(second.total_invites, 2);
    }

    #[tokio::test]
    async fn test_failed_prime_stores_empty_snapshot() {
        let tracker = make_tracker();
        let source = ScriptedSource::new(vec![Err(InviteFetchError::MissingPermissions)]);

        let listing = tracker.prime_snapshot(&source, GUILD).await.unwrap();

        assert_eq!(
            listing,
            InviteListing::Unavailable(InviteFetchError::MissingPermissions)
        );
        assert!(tracker.store.get_snapshot(GUILD).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_listing_is_distinguished_from_failure() {
        let tracker = make_tracker();
        let source = ScriptedSource::new(vec![Ok(Vec::new())]);

        let listing = tracker.prime_snapshot(&source, GUILD).await.unwrap();

        assert!(listing.is_available());
        assert!(listing.records().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_during_join_reports_unavailable() {
        let tracker = make_tracker();
        let source = ScriptedSource::new(vec![
            Ok(vec![invite("abc", 3, Some(U1))]),
            Err(InviteFetchError::Request("timeout".into())),
        ]);

        tracker.prime_snapshot(&source, GUILD).await.unwrap();
        let attribution = tracker.attribute_join(&source, GUILD, 99).await.unwrap();

        assert_eq!(
            attribution.status,
            AttributionStatus::ListingUnavailable(InviteFetchError::Request("timeout".into()))
        );
        assert_eq!(attribution.inviter_id, None);
        assert!(tracker.store.get_snapshot(GUILD).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_vanity_invite_has_no_inviter() {
        let tracker = make_tracker();
        let source = ScriptedSource::new(vec![
            Ok(vec![invite("vanity", 10, None)]),
            Ok(vec![invite("vanity", 11, None)]),
        ]);

        tracker.prime_snapshot(&source, GUILD).await.unwrap();
        let attribution = tracker.attribute_join(&source, GUILD, 99).await.unwrap();

        assert_eq!(attribution.status, AttributionStatus::AnonymousInvite);
        assert_eq!(attribution.invite_code.as_deref(), Some("vanity"));
        assert_eq!(attribution.inviter_id, None);
        assert_eq!(attribution.total_invites, 0);
    }

    #[tokio::test]
    async fn test_join_without_primed_snapshot_credits_nobody() {
        let tracker = make_tracker();
        let source = ScriptedSource::new(vec![Ok(vec![invite("abc", 4, Some(U1))])]);

        let attribution = tracker.attribute_join(&source, GUILD, 99).await.unwrap();

        assert_eq!(attribution.status, AttributionStatus::NoMatch);
        assert_eq!(tracker.store.get_snapshot(GUILD).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_joins_in_one_guild_are_serialized() {
        let tracker = make_tracker();
        // One member joins through "a", the next through "b". Each diff has to
        // see the snapshot left by the previous join, otherwise the second
        // join is compared against the primed baseline and "a" is credited twice.
        let source = ScriptedSource::new(vec![
            Ok(vec![invite("a", 0, Some(U1)), invite("b", 0, Some(U2))]),
            Ok(vec![invite("a", 1, Some(U1)), invite("b", 0, Some(U2))]),
            Ok(vec![invite("a", 1, Some(U1)), invite("b", 1, Some(U2))]),
        ]);

        tracker.prime_snapshot(&source, GUILD).await.unwrap();
        let (first, second) = tokio::join!(
            tracker.attribute_join(&source, GUILD, 101),
            tracker.attribute_join(&source, GUILD, 102),
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(tracker.inviter_total(U1).await.unwrap(), 1);
        assert_eq!(tracker.inviter_total(U2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_resets_baseline_for_next_join() {
        let tracker = make_tracker();
        let source = ScriptedSource::new(vec![
            Ok(vec![invite("abc", 3, Some(U1))]),
            Err(InviteFetchError::MissingPermissions),
            Ok(vec![invite("abc", 5, Some(U1))]),
            Ok(vec![invite("abc", 6, Some(U1))]),
        ]);

        tracker.prime_snapshot(&source, GUILD).await.unwrap();
        tracker.attribute_join(&source, GUILD, 101).await.unwrap();
        let after_failure = tracker.attribute_join(&source, GUILD, 102).await.unwrap();
        let recovered = tracker.attribute_join(&source, GUILD, 103).await.unwrap();

        // The join right after a failed fetch diffs against an empty baseline.
        assert_eq!(after_failure.status, AttributionStatus::NoMatch);
        assert_eq!(recovered.inviter_id, Some(U1));
        assert_eq!(recovered.total_invites, 1);
    }
}
