//! Normalization of raw listing records.
//!
//! Every endpoint returns a slightly different shape; this module maps
//! them all onto [`Challenge`]. Marathon matches (recognized by a round
//! id in place of a challenge id) get the full defaulting treatment,
//! real-time matches are dropped, and everything else follows the
//! standard mapping with computed defaults for the fields data-science
//! responses tend to omit.

use crate::api::RawRecord;
use crate::models::{Challenge, RegistrationOpen, Status, Track};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeSet;
use tracing::debug;

/// Challenge type marker for real-time matches, which the listing does
/// not support.
const REAL_TIME_MATCH_TYPE: &str = "SRM";

/// Parse one of the date spellings the legacy API uses.
///
/// RFC 3339 with or without milliseconds, a naive datetime, or a bare
/// date; naive values are taken as UTC.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| n.and_utc());
    }

    None
}

/// Upper-snake normalization of a challenge type (`"Code Sprint"` →
/// `"CODE_SPRINT"`).
pub fn to_upper_snake(s: &str) -> String {
    s.to_uppercase().split_whitespace().collect::<Vec<_>>().join("_")
}

/// Map a raw record onto a normalized [`Challenge`].
///
/// `community` is the track tag of the endpoint that returned the record;
/// `now` is the observation instant used to derive status and
/// registration state. Returns `None` for real-time matches and for
/// records missing a usable identifier or end date.
pub fn normalize_record(
    raw: RawRecord,
    community: Track,
    now: DateTime<Utc>,
) -> Option<Challenge> {
    if raw.challenge_type.as_deref() == Some(REAL_TIME_MATCH_TYPE) {
        return None;
    }

    if raw.round_id.is_some() {
        normalize_marathon(raw, community, now)
    } else {
        normalize_standard(raw, community, now)
    }
}

/// Marathon matches carry round ids and start/end dates instead of the
/// standard challenge fields; everything else is backfilled.
fn normalize_marathon(
    raw: RawRecord,
    community: Track,
    now: DateTime<Utc>,
) -> Option<Challenge> {
    let id = match raw.round_id.as_ref().and_then(|id| id.as_u64()) {
        Some(id) => id,
        None => {
            debug!("skipping marathon record without a numeric round id");
            return None;
        }
    };

    let end = match raw.end_date.as_deref().and_then(parse_instant) {
        Some(end) => end,
        None => {
            debug!("skipping marathon round {} without an end date", id);
            return None;
        }
    };

    let open = end > now;

    Some(Challenge {
        id,
        name: raw
            .full_name
            .or(raw.challenge_name)
            .unwrap_or_default(),
        track: Track::DataScience,
        sub_track: "MARATHON_MATCH".to_string(),
        status: if open { Status::Active } else { Status::Completed },
        registration_open: if open {
            RegistrationOpen::Yes
        } else {
            RegistrationOpen::No
        },
        submission_end: end,
        registration_start: raw.start_date.as_deref().and_then(parse_instant),
        current_phase: open.then(|| "Registration".to_string()),
        communities: BTreeSet::from([community]),
        platforms: Vec::new(),
        technologies: Vec::new(),
        num_registrants: raw.number_of_registrants,
        num_submissions: raw.number_of_submissions,
        total_prize: raw.total_prize.or(Some(0.0)),
        my_challenge: false,
    })
}

/// Challenges from the non-marathon endpoints share one format; only the
/// optional fields need defaults.
fn normalize_standard(
    raw: RawRecord,
    community: Track,
    now: DateTime<Utc>,
) -> Option<Challenge> {
    let id = match raw.challenge_id.as_ref().and_then(|id| id.as_u64()) {
        Some(id) => id,
        None => {
            debug!("skipping record without a numeric challenge id");
            return None;
        }
    };

    let end = match raw.submission_end_date.as_deref().and_then(parse_instant) {
        Some(end) => end,
        None => {
            debug!("skipping challenge {} without a submission end date", id);
            return None;
        }
    };

    let open = end > now;
    let track = raw
        .challenge_community
        .as_deref()
        .and_then(Track::from_community)
        .unwrap_or(community);

    Some(Challenge {
        id,
        name: raw.challenge_name.unwrap_or_default(),
        track,
        sub_track: raw
            .challenge_type
            .as_deref()
            .map(to_upper_snake)
            .unwrap_or_default(),
        status: if open { Status::Active } else { Status::Completed },
        registration_open: if open {
            RegistrationOpen::Yes
        } else {
            RegistrationOpen::No
        },
        submission_end: end,
        registration_start: raw
            .registration_start_date
            .as_deref()
            .and_then(parse_instant),
        current_phase: raw.current_phase_name.filter(|p| !p.is_empty()),
        communities: BTreeSet::from([community]),
        platforms: raw.platforms.unwrap_or_default(),
        technologies: raw.technologies.unwrap_or_default(),
        num_registrants: raw.num_registrants.or(raw.number_of_registrants),
        num_submissions: raw.num_submissions.or(raw.number_of_submissions),
        total_prize: raw.total_prize,
        my_challenge: false,
    })
}
