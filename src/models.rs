//! Data models for the challenge aggregator.
//!
//! This module contains the normalized challenge record produced by the
//! pipeline, along with the listing/summary structures consumed by the
//! report generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Competition track a challenge belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Track {
    /// Design challenges (studio).
    Design,
    /// Software development challenges.
    Develop,
    /// Data science and marathon matches.
    DataScience,
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Design => write!(f, "Design"),
            Track::Develop => write!(f, "Develop"),
            Track::DataScience => write!(f, "Data Science"),
        }
    }
}

impl Track {
    /// Parse a track from the community string carried by the raw payloads.
    ///
    /// The legacy API spells communities inconsistently (`"design"`,
    /// `"Develop"`, `"data_science"`, `"dataScience"`), so matching is
    /// case-insensitive and separator-tolerant.
    pub fn from_community(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "design" => Some(Track::Design),
            "develop" | "development" => Some(Track::Develop),
            "datascience" | "data" => Some(Track::DataScience),
            _ => None,
        }
    }

    /// Query-string value used by the listing endpoints.
    pub fn api_type(&self) -> &'static str {
        match self {
            Track::Design => "design",
            Track::Develop => "develop",
            Track::DataScience => "dataScience",
        }
    }
}

/// Lifecycle status of a challenge, derived from its submission end
/// instant at normalization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Active,
    Completed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Active => write!(f, "Active"),
            Status::Completed => write!(f, "Completed"),
        }
    }
}

/// Whether registration is still open. The legacy API models this as a
/// literal `"Yes"`/`"No"` string, preserved here as an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationOpen {
    Yes,
    No,
}

impl fmt::Display for RegistrationOpen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationOpen::Yes => write!(f, "Yes"),
            RegistrationOpen::No => write!(f, "No"),
        }
    }
}

/// A normalized challenge record: the unit of display.
///
/// One `Challenge` exists per distinct `id` in any merged output.
/// `communities` collects the track tag of every endpoint that returned
/// the record; all other fields are first-seen-wins under merging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    /// Unique identifier and merge key. Marathon matches use their round
    /// id here since the raw payload has no challenge id.
    pub id: u64,
    /// Challenge name.
    pub name: String,
    /// Primary competition track.
    pub track: Track,
    /// Challenge type in upper-snake form (e.g. `CODE_SPRINT`).
    pub sub_track: String,
    /// Active or completed.
    pub status: Status,
    /// Whether registration is still open.
    pub registration_open: RegistrationOpen,
    /// Submission phase end. Sort key for listings (descending).
    pub submission_end: DateTime<Utc>,
    /// Registration phase start, when the payload carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_start: Option<DateTime<Utc>>,
    /// Name of the current phase, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<String>,
    /// Every track under which some endpoint returned this record.
    pub communities: BTreeSet<Track>,
    /// Platform tags. Feed the keyword filter vocabulary.
    pub platforms: Vec<String>,
    /// Technology tags. Feed the keyword filter vocabulary.
    pub technologies: Vec<String>,
    /// Registrant count, when the payload carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_registrants: Option<u64>,
    /// Submission count, when the payload carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_submissions: Option<u64>,
    /// Total prize purse, when the payload carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_prize: Option<f64>,
    /// Marked by the presentation layer for the authenticated member's
    /// own challenges. The pipeline never sets this.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub my_challenge: bool,
}

impl Challenge {
    /// Submission end as epoch milliseconds.
    pub fn submission_end_timestamp(&self) -> i64 {
        self.submission_end.timestamp_millis()
    }

    /// True if any of the challenge's name, platform tags, or technology
    /// tags contains `needle` as a case-insensitive substring.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self
                .platforms
                .iter()
                .any(|p| p.to_lowercase().contains(&needle))
            || self
                .technologies
                .iter()
                .any(|t| t.to_lowercase().contains(&needle))
    }
}

/// Summary statistics over a challenge listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChallengeSummary {
    /// Total number of challenges.
    pub total: usize,
    /// Number of design challenges.
    pub design: usize,
    /// Number of development challenges.
    pub develop: usize,
    /// Number of data science challenges.
    pub data_science: usize,
    /// Number of active challenges.
    pub active: usize,
    /// Number of completed challenges.
    pub completed: usize,
    /// Number of challenges currently open for registration.
    pub open_for_registration: usize,
}

impl ChallengeSummary {
    /// Creates a summary from a list of challenges.
    pub fn from_challenges(challenges: &[Challenge]) -> Self {
        let mut summary = Self::default();
        summary.total = challenges.len();

        for challenge in challenges {
            match challenge.track {
                Track::Design => summary.design += 1,
                Track::Develop => summary.develop += 1,
                Track::DataScience => summary.data_science += 1,
            }

            match challenge.status {
                Status::Active => summary.active += 1,
                Status::Completed => summary.completed += 1,
            }

            if challenge.registration_open == RegistrationOpen::Yes {
                summary.open_for_registration += 1;
            }
        }

        summary
    }
}

/// Metadata about a listing fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingMetadata {
    /// Base URL of the listing API.
    pub api_base: String,
    /// Date and time of the fetch.
    pub fetch_date: DateTime<Utc>,
    /// Number of endpoints queried.
    pub endpoints_queried: usize,
    /// Duration of the fetch in seconds.
    pub duration_seconds: f64,
    /// Encoded filter applied to the listing, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// The complete challenge listing handed to the report generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Metadata about the fetch.
    pub metadata: ListingMetadata,
    /// Challenges, sorted by submission end descending.
    pub challenges: Vec<Challenge>,
    /// Summary statistics.
    pub summary: ChallengeSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_challenge(id: u64, track: Track, status: Status) -> Challenge {
        Challenge {
            id,
            name: format!("Challenge {}", id),
            track,
            sub_track: "CODE".to_string(),
            status,
            registration_open: match status {
                Status::Active => RegistrationOpen::Yes,
                Status::Completed => RegistrationOpen::No,
            },
            submission_end: Utc.with_ymd_and_hms(2017, 3, 15, 12, 0, 0).unwrap(),
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
    fn test_track_from_community() {
        assert_eq!(Track::from_community("design"), Some(Track::Design));
        assert_eq!(Track::from_community("DESIGN"), Some(Track::Design));
        assert_eq!(Track::from_community("Develop"), Some(Track::Develop));
        assert_eq!(
            Track::from_community("data_science"),
            Some(Track::DataScience)
        );
        assert_eq!(
            Track::from_community("dataScience"),
            Some(Track::DataScience)
        );
        assert_eq!(Track::from_community("unknown"), None);
    }

    #[test]
    fn test_track_api_type() {
        assert_eq!(Track::Design.api_type(), "design");
        assert_eq!(Track::Develop.api_type(), "develop");
        assert_eq!(Track::DataScience.api_type(), "dataScience");
    }

    #[test]
    fn test_matches_text_case_insensitive() {
        let mut challenge = make_challenge(1, Track::Develop, Status::Active);
        challenge.technologies = vec!["Java".to_string(), "Spring".to_string()];

        assert!(challenge.matches_text("java"));
        assert!(challenge.matches_text("SPRING"));
        assert!(!challenge.matches_text("python"));
    }

    #[test]
    fn test_matches_text_name_and_platforms() {
        let mut challenge = make_challenge(2, Track::Design, Status::Active);
        challenge.name = "Responsive Landing Page".to_string();
        challenge.platforms = vec!["Heroku".to_string()];

        assert!(challenge.matches_text("landing"));
        assert!(challenge.matches_text("heroku"));
        assert!(challenge.matches_text(""));
    }

    #[test]
    fn test_summary_from_challenges() {
        let challenges = vec![
            make_challenge(1, Track::Design, Status::Active),
            make_challenge(2, Track::Develop, Status::Active),
            make_challenge(3, Track::Develop, Status::Completed),
            make_challenge(4, Track::DataScience, Status::Completed),
        ];

        let summary = ChallengeSummary::from_challenges(&challenges);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.design, 1);
        assert_eq!(summary.develop, 2);
        assert_eq!(summary.data_science, 1);
        assert_eq!(summary.active, 2);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.open_for_registration, 2);
    }
}
