//! Identifier-keyed merging of normalized challenges.
//!
//! A [`ChallengeSet`] is the single-owner accumulator one aggregated
//! fetch merges into. Endpoint completions arrive in no particular
//! order, so merging is commutative and idempotent with respect to the
//! `communities` union, and first-seen-wins for every other field.

use crate::models::Challenge;
use std::collections::HashMap;

/// Merge accumulator keyed by challenge id.
#[derive(Debug, Default)]
pub struct ChallengeSet {
    by_id: HashMap<u64, Challenge>,
    /// Insertion order, so equal sort keys keep a deterministic order.
    order: Vec<u64>,
}

impl ChallengeSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a challenge into the set.
    ///
    /// If the id is already present, the incoming record only
    /// contributes its `communities` tags; nothing else is overwritten.
    /// Returns `true` when the challenge was newly inserted.
    pub fn merge(&mut self, challenge: Challenge) -> bool {
        match self.by_id.get_mut(&challenge.id) {
            Some(existing) => {
                existing.communities.extend(challenge.communities);
                false
            }
            None => {
                self.order.push(challenge.id);
                self.by_id.insert(challenge.id, challenge);
                true
            }
        }
    }

    /// Look up a merged challenge by id.
    #[allow(dead_code)] // Utility accessor, exercised by tests
    pub fn get(&self, id: u64) -> Option<&Challenge> {
        self.by_id.get(&id)
    }

    /// Number of distinct challenges in the set.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True if no challenge has been merged yet.
    #[allow(dead_code)] // Companion to len()
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Flatten to a list sorted by submission end descending.
    ///
    /// The sort is stable over insertion order, so challenges ending at
    /// the same instant keep the order in which they were first seen.
    pub fn into_sorted(mut self) -> Vec<Challenge> {
        let by_id = &mut self.by_id;
        let mut challenges: Vec<Challenge> = self
            .order
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();

        challenges.sort_by_key(|c| std::cmp::Reverse(c.submission_end_timestamp()));
        challenges
    }
}

/// Order-preserving first-occurrence dedup by challenge id.
///
/// The merged output is already unique by construction, but the
/// presentation layer concatenates incrementally loaded pages and
/// re-deduplicates the result; this keeps that property cheap to
/// restore.
pub fn dedup_by_id<I>(challenges: I) -> Vec<Challenge>
where
    I: IntoIterator<Item = Challenge>,
{
    let mut seen = std::collections::HashSet::new();
    challenges
        .into_iter()
        .filter(|c| seen.insert(c.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RegistrationOpen, Status, Track};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    fn make_challenge(id: u64, track: Track, end_day: u32) -> Challenge {
        Challenge {
            id,
            name: format!("Challenge {}", id),
            track,
            sub_track: "CODE".to_string(),
            status: Status::Active,
            registration_open: RegistrationOpen::Yes,
            submission_end: Utc.with_ymd_and_hms(2017, 3, end_day, 12, 0, 0).unwrap(),
            registration_start: None,
            current_phase: None,
            communities: BTreeSet::from([track]),
            platforms: vec![],
            technologies: vec![],
            num_registrants: None,
            num_submissions: None,
            total_prize: None,
            my_challenge: false,
        }
    }

    #[test]
    fn test_cross_track_merge_unions_communities() {
        let mut set = ChallengeSet::new();

        assert!(set.merge(make_challenge(42, Track::Design, 10)));
        assert!(!set.merge(make_challenge(42, Track::Develop, 20)));

        assert_eq!(set.len(), 1);
        let merged = set.get(42).unwrap();
        assert_eq!(
            merged.communities,
            BTreeSet::from([Track::Design, Track::Develop])
        );
        // First-seen-wins for everything but communities.
        assert_eq!(merged.track, Track::Design);
        assert_eq!(
            merged.submission_end,
            make_challenge(42, Track::Design, 10).submission_end
        );
    }

    #[test]
    fn test_merge_commutative_over_arrival_order() {
        let mut forward = ChallengeSet::new();
        forward.merge(make_challenge(42, Track::Design, 10));
        forward.merge(make_challenge(42, Track::Develop, 10));

        let mut reverse = ChallengeSet::new();
        reverse.merge(make_challenge(42, Track::Develop, 10));
        reverse.merge(make_challenge(42, Track::Design, 10));

        assert_eq!(
            forward.get(42).unwrap().communities,
            reverse.get(42).unwrap().communities
        );
    }

    #[test]
    fn test_merge_idempotent() {
        let mut set = ChallengeSet::new();
        set.merge(make_challenge(1, Track::Develop, 5));
        set.merge(make_challenge(1, Track::Develop, 5));
        set.merge(make_challenge(1, Track::Develop, 5));

        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get(1).unwrap().communities,
            BTreeSet::from([Track::Develop])
        );
    }

    #[test]
    fn test_into_sorted_descending() {
        let mut set = ChallengeSet::new();
        set.merge(make_challenge(1, Track::Develop, 5));
        set.merge(make_challenge(2, Track::Develop, 25));
        set.merge(make_challenge(3, Track::Develop, 15));

        let sorted = set.into_sorted();
        let ends: Vec<_> = sorted.iter().map(|c| c.submission_end).collect();

        assert_eq!(sorted.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 3, 1]);
        assert!(ends.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_into_sorted_ties_keep_insertion_order() {
        let mut set = ChallengeSet::new();
        set.merge(make_challenge(10, Track::Design, 5));
        set.merge(make_challenge(11, Track::Develop, 5));
        set.merge(make_challenge(12, Track::DataScience, 5));

        let sorted = set.into_sorted();
        assert_eq!(
            sorted.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![10, 11, 12]
        );
    }

    #[test]
    fn test_dedup_concat_is_idempotent() {
        let mut set = ChallengeSet::new();
        set.merge(make_challenge(1, Track::Develop, 5));
        set.merge(make_challenge(2, Track::Design, 10));
        set.merge(make_challenge(3, Track::DataScience, 15));
        let listing = set.into_sorted();

        let mut doubled = listing.clone();
        doubled.extend(listing.clone());
        let deduped = dedup_by_id(doubled);

        assert_eq!(deduped.len(), listing.len());
        assert_eq!(
            deduped.iter().map(|c| c.id).collect::<Vec<_>>(),
            listing.iter().map(|c| c.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let mut newer = make_challenge(1, Track::Develop, 5);
        newer.name = "first".to_string();
        let mut older = make_challenge(1, Track::Develop, 5);
        older.name = "second".to_string();

        let deduped = dedup_by_id(vec![newer, older]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].name, "first");
    }
}
