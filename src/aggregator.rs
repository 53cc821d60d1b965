//! Fetch orchestration: fan-out, merge, and stale-result suppression.
//!
//! One [`ChallengeAggregator`] owns the HTTP client, the vocabulary
//! registry, and the fetch sequence counter. Every fetch runs under a
//! [`FetchToken`]; a result may only be committed while its token is
//! still the latest one issued, so a superseded fetch that resolves late
//! is discarded instead of overwriting newer state. There is no
//! cancellation, only compare-and-discard at commit time.

use crate::api::{ApiError, EndpointSet, ListingClient};
use crate::models::Challenge;
use crate::pipeline::normalize::to_upper_snake;
use crate::pipeline::{normalize_record, ChallengeSet};
use crate::vocabulary::VocabularyRegistry;
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Monotonic token identifying one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken(u64);

/// Result of a committed fetch.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Merged, deduplicated challenges sorted by submission end
    /// descending.
    pub challenges: Vec<Challenge>,
    /// True when the fetch grew the vocabulary registry; callers decide
    /// whether dependent views need a refresh.
    pub vocabulary_changed: bool,
}

/// Aggregates challenge listings across all upstream endpoints.
pub struct ChallengeAggregator {
    client: ListingClient,
    endpoints: EndpointSet,
    vocabulary: VocabularyRegistry,
    seq: AtomicU64,
    committed: Vec<Challenge>,
}

impl ChallengeAggregator {
    /// Create an aggregator with an empty vocabulary registry.
    pub fn new(client: ListingClient, endpoints: EndpointSet) -> Self {
        Self::with_vocabulary(client, endpoints, VocabularyRegistry::new())
    }

    /// Create an aggregator around an existing vocabulary registry.
    pub fn with_vocabulary(
        client: ListingClient,
        endpoints: EndpointSet,
        vocabulary: VocabularyRegistry,
    ) -> Self {
        Self {
            client,
            endpoints,
            vocabulary,
            seq: AtomicU64::new(0),
            committed: Vec::new(),
        }
    }

    /// The vocabulary registry grown so far.
    pub fn vocabulary(&self) -> &VocabularyRegistry {
        &self.vocabulary
    }

    /// The endpoint set this aggregator queries.
    pub fn endpoints(&self) -> &EndpointSet {
        &self.endpoints
    }

    /// The last committed listing.
    #[allow(dead_code)] // Utility accessor, exercised by tests
    pub fn committed(&self) -> &[Challenge] {
        &self.committed
    }

    /// Issue a new fetch token, superseding every earlier one.
    pub fn begin_fetch(&self) -> FetchToken {
        FetchToken(self.seq.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn is_current(&self, token: &FetchToken) -> bool {
        self.seq.load(Ordering::SeqCst) == token.0
    }

    /// Commit a finished fetch. Returns `None` when the token has been
    /// superseded, leaving the previously committed listing untouched.
    fn commit(
        &mut self,
        token: &FetchToken,
        set: ChallengeSet,
        vocabulary_changed: bool,
    ) -> Option<FetchOutcome> {
        if !self.is_current(token) {
            debug!(
                "discarding stale fetch {} (latest is {})",
                token.0,
                self.seq.load(Ordering::SeqCst)
            );
            return None;
        }

        let challenges = set.into_sorted();
        self.committed = challenges.clone();

        Some(FetchOutcome {
            challenges,
            vocabulary_changed,
        })
    }

    /// Run one aggregated fetch under the given token.
    ///
    /// All listing endpoints are queried concurrently; completions are
    /// merged into a fetch-local accumulator as they arrive, in whatever
    /// order the endpoints answer. The fetch is all-or-nothing: the
    /// first endpoint failure fails the whole fetch and nothing is
    /// committed. `Ok(None)` means the fetch finished but had been
    /// superseded by a newer token.
    pub async fn fetch(
        &mut self,
        token: FetchToken,
    ) -> Result<Option<FetchOutcome>, ApiError> {
        let now = Utc::now();
        let mut set = ChallengeSet::new();
        let mut vocabulary_changed = false;

        {
            let client = &self.client;
            let vocabulary = &mut self.vocabulary;

            let mut in_flight: FuturesUnordered<_> = self
                .endpoints
                .listings
                .iter()
                .map(|endpoint| async move {
                    (endpoint, client.fetch_listing(endpoint).await)
                })
                .collect();

            while let Some((endpoint, result)) = in_flight.next().await {
                let records = result?;
                debug!(
                    "merging {} records from {}",
                    records.len(),
                    endpoint.url
                );

                for raw in records {
                    let Some(challenge) = normalize_record(raw, endpoint.track, now) else {
                        continue;
                    };

                    let subtrack = challenge.sub_track.clone();
                    let tags: Vec<String> = challenge
                        .platforms
                        .iter()
                        .chain(challenge.technologies.iter())
                        .cloned()
                        .collect();

                    if set.merge(challenge) {
                        vocabulary_changed |= vocabulary.observe_subtrack(&subtrack);
                        for tag in &tags {
                            vocabulary_changed |= vocabulary.observe_keyword(tag);
                        }
                    }
                }
            }
        }

        info!("fetch {} merged {} distinct challenges", token.0, set.len());
        Ok(self.commit(&token, set, vocabulary_changed))
    }

    /// Issue a fresh token and fetch under it, superseding any fetch
    /// still in flight.
    pub async fn refresh(&mut self) -> Result<Option<FetchOutcome>, ApiError> {
        let token = self.begin_fetch();
        self.fetch(token).await
    }

    /// Pre-populate the vocabulary registry from the challenge-type and
    /// technology endpoints. Failures are logged and skipped; seeding
    /// never fails a listing fetch. Returns the number of new labels.
    pub async fn seed_vocabulary(&mut self) -> usize {
        let mut added = 0;

        for url in self.endpoints.subtrack_sources.clone() {
            match self.client.fetch_challenge_types(&url).await {
                Ok(names) => {
                    for name in names {
                        if self.vocabulary.observe_subtrack(&to_upper_snake(&name)) {
                            added += 1;
                        }
                    }
                }
                Err(e) => warn!("vocabulary seeding from {} failed: {}", url, e),
            }
        }

        let keyword_source = self.endpoints.keyword_source.clone();
        match self.client.fetch_technologies(&keyword_source).await {
            Ok(names) => {
                for name in names {
                    if self.vocabulary.observe_keyword(&name) {
                        added += 1;
                    }
                }
            }
            Err(e) => warn!(
                "vocabulary seeding from {} failed: {}",
                keyword_source, e
            ),
        }

        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RegistrationOpen, Status, Track};
    use chrono::TimeZone;
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn make_aggregator() -> ChallengeAggregator {
        let client = ListingClient::new(Duration::from_secs(5)).unwrap();
        let endpoints = EndpointSet::for_base("http://api/v2", "http://api/v3", 100);
        ChallengeAggregator::new(client, endpoints)
    }

    fn make_challenge(id: u64, end_day: u32) -> Challenge {
        Challenge {
            id,
            name: format!("Challenge {}", id),
            track: Track::Develop,
            sub_track: "CODE".to_string(),
            status: Status::Active,
            registration_open: RegistrationOpen::Yes,
            submission_end: Utc.with_ymd_and_hms(2017, 3, end_day, 12, 0, 0).unwrap(),
            registration_start: None,
            current_phase: None,
            communities: BTreeSet::from([Track::Develop]),
            platforms: vec![],
            technologies: vec![],
            num_registrants: None,
            num_submissions: None,
            total_prize: None,
            my_challenge: false,
        }
    }

    fn set_of(challenges: Vec<Challenge>) -> ChallengeSet {
        let mut set = ChallengeSet::new();
        for challenge in challenges {
            set.merge(challenge);
        }
        set
    }

    #[test]
    fn test_tokens_are_monotonic() {
        let aggregator = make_aggregator();
        let first = aggregator.begin_fetch();
        let second = aggregator.begin_fetch();
        assert_ne!(first, second);
        assert!(!aggregator.is_current(&first));
        assert!(aggregator.is_current(&second));
    }

    #[test]
    fn test_stale_result_cannot_overwrite_newer_commit() {
        let mut aggregator = make_aggregator();

        let stale = aggregator.begin_fetch();
        let latest = aggregator.begin_fetch();

        // The newer fetch commits first.
        let outcome = aggregator.commit(&latest, set_of(vec![make_challenge(2, 20)]), false);
        assert!(outcome.is_some());
        assert_eq!(aggregator.committed().len(), 1);
        assert_eq!(aggregator.committed()[0].id, 2);

        // The superseded fetch resolves afterwards and is discarded.
        let outcome = aggregator.commit(&stale, set_of(vec![make_challenge(1, 10)]), false);
        assert!(outcome.is_none());
        assert_eq!(aggregator.committed()[0].id, 2);
    }

    #[test]
    fn test_commit_sorts_and_reports_vocabulary_growth() {
        let mut aggregator = make_aggregator();
        let token = aggregator.begin_fetch();

        let outcome = aggregator
            .commit(
                &token,
                set_of(vec![make_challenge(1, 5), make_challenge(2, 25)]),
                true,
            )
            .unwrap();

        assert!(outcome.vocabulary_changed);
        assert_eq!(
            outcome.challenges.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![2, 1]
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_propagates_and_commits_nothing() {
        // Nothing listens on port 1, so every endpoint fails to connect
        // and the all-or-nothing fetch must surface the error without
        // committing anything.
        let client = ListingClient::new(Duration::from_secs(2)).unwrap();
        let endpoints =
            EndpointSet::for_base("http://127.0.0.1:1/v2", "http://127.0.0.1:1/v3", 10);
        let mut aggregator = ChallengeAggregator::new(client, endpoints);

        let result = aggregator.refresh().await;
        assert!(result.is_err());
        assert!(aggregator.committed().is_empty());
    }

    #[test]
    fn test_uncommitted_failure_leaves_state_untouched() {
        let mut aggregator = make_aggregator();

        let token = aggregator.begin_fetch();
        aggregator.commit(&token, set_of(vec![make_challenge(9, 9)]), false);

        // A later fetch fails before commit; the committed listing must
        // still be the earlier one.
        let _failed = aggregator.begin_fetch();
        assert_eq!(aggregator.committed().len(), 1);
        assert_eq!(aggregator.committed()[0].id, 9);
    }
}
