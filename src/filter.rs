//! Challenge filter model, predicate composition, and the shareable
//! string codec.
//!
//! A [`ChallengeFilter`] captures one user's selection: a named preset
//! (or a custom filter), selected tracks/subtracks/keywords, and a
//! free-text query. Filters merge partial updates, compile down to plain
//! `Fn(&Challenge) -> bool` predicates, and round-trip through a
//! URL-fragment-safe encoding so the selection can be shared and
//! restored.

use crate::models::{Challenge, RegistrationOpen, Status, Track};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::form_urlencoded;

/// Named sidebar presets with baked-in semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterPreset {
    AllChallenges,
    MyChallenges,
    OpenForRegistration,
    OngoingChallenges,
    PastChallenges,
}

impl FilterPreset {
    /// Every preset, in sidebar display order.
    pub fn all() -> [FilterPreset; 5] {
        [
            FilterPreset::AllChallenges,
            FilterPreset::MyChallenges,
            FilterPreset::OpenForRegistration,
            FilterPreset::OngoingChallenges,
            FilterPreset::PastChallenges,
        ]
    }

    /// Display name, also used in the encoded filter string.
    pub fn name(&self) -> &'static str {
        match self {
            FilterPreset::AllChallenges => "All Challenges",
            FilterPreset::MyChallenges => "My Challenges",
            FilterPreset::OpenForRegistration => "Open for registration",
            FilterPreset::OngoingChallenges => "Ongoing challenges",
            FilterPreset::PastChallenges => "Past challenges",
        }
    }

    /// Look a preset up by its display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|p| p.name() == name)
    }

    /// Preset semantics.
    pub fn matches(&self, challenge: &Challenge) -> bool {
        match self {
            FilterPreset::AllChallenges => true,
            FilterPreset::MyChallenges => challenge.my_challenge,
            FilterPreset::OpenForRegistration => {
                challenge.registration_open == RegistrationOpen::Yes
            }
            FilterPreset::OngoingChallenges => {
                challenge.status == Status::Active
                    && challenge.registration_open == RegistrationOpen::No
            }
            FilterPreset::PastChallenges => challenge.status == Status::Completed,
        }
    }
}

/// A user's filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeFilter {
    /// Preset name, or the label of a saved custom filter.
    pub name: String,
    /// True when this is not one of the named presets. Custom filters
    /// rely purely on their structured fields; the name is just a label.
    pub custom: bool,
    /// Selected tracks. Empty means all tracks.
    pub tracks: BTreeSet<Track>,
    /// Selected subtracks (upper-snake). Empty means all subtracks.
    pub subtracks: BTreeSet<String>,
    /// Selected keyword tags. Empty means all keywords.
    pub keywords: BTreeSet<String>,
    /// Free-text search query. Empty means no text filtering.
    pub query: String,
}

impl Default for ChallengeFilter {
    fn default() -> Self {
        Self {
            name: FilterPreset::AllChallenges.name().to_string(),
            custom: false,
            tracks: BTreeSet::new(),
            subtracks: BTreeSet::new(),
            keywords: BTreeSet::new(),
            query: String::new(),
        }
    }
}

/// Partial update merged into an existing filter.
#[derive(Debug, Clone, Default)]
pub struct FilterUpdate {
    pub name: Option<String>,
    pub tracks: Option<BTreeSet<Track>>,
    pub subtracks: Option<BTreeSet<String>>,
    pub keywords: Option<BTreeSet<String>>,
    pub query: Option<String>,
}

impl FilterUpdate {
    /// True when the update carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.tracks.is_none()
            && self.subtracks.is_none()
            && self.keywords.is_none()
            && self.query.is_none()
    }
}

/// A boxed challenge predicate.
pub type ChallengePredicate = Box<dyn Fn(&Challenge) -> bool>;

impl ChallengeFilter {
    /// Construct a preset filter.
    #[allow(dead_code)] // Constructor for sidebar-style consumers
    pub fn preset(preset: FilterPreset) -> Self {
        Self {
            name: preset.name().to_string(),
            ..Self::default()
        }
    }

    /// The preset this filter names, unless it is custom.
    pub fn as_preset(&self) -> Option<FilterPreset> {
        if self.custom {
            None
        } else {
            FilterPreset::from_name(&self.name)
        }
    }

    /// True when the filter is indistinguishable from the default and
    /// matches everything.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Merge a partial update into this filter.
    ///
    /// Updates coming from anywhere but the sidebar switch the filter to
    /// custom mode, mirroring how ad-hoc selections stop being a named
    /// preset the moment they diverge from it.
    pub fn apply(&mut self, update: FilterUpdate, sidebar: bool) {
        if let Some(name) = update.name {
            self.custom = FilterPreset::from_name(&name).is_none();
            self.name = name;
        }
        if let Some(tracks) = update.tracks {
            self.tracks = tracks;
        }
        if let Some(subtracks) = update.subtracks {
            self.subtracks = subtracks;
        }
        if let Some(keywords) = update.keywords {
            self.keywords = keywords;
        }
        if let Some(query) = update.query {
            self.query = query;
        }
        if !sidebar {
            self.custom = true;
        }
    }

    /// Evaluate the filter against one challenge.
    pub fn matches(&self, challenge: &Challenge) -> bool {
        if let Some(preset) = self.as_preset() {
            if !preset.matches(challenge) {
                return false;
            }
        }

        if !self.tracks.is_empty() {
            let in_track = self.tracks.contains(&challenge.track)
                || challenge
                    .communities
                    .iter()
                    .any(|t| self.tracks.contains(t));
            if !in_track {
                return false;
            }
        }

        if !self.subtracks.is_empty() && !self.subtracks.contains(&challenge.sub_track) {
            return false;
        }

        if !self.keywords.is_empty() {
            let tag_matches = self.keywords.iter().any(|keyword| {
                challenge
                    .platforms
                    .iter()
                    .chain(challenge.technologies.iter())
                    .any(|tag| tag.eq_ignore_ascii_case(keyword))
            });
            if !tag_matches {
                return false;
            }
        }

        if !self.query.is_empty() && !challenge.matches_text(&self.query) {
            return false;
        }

        true
    }

    /// Compile the filter into an owning predicate.
    pub fn predicate(&self) -> ChallengePredicate {
        let filter = self.clone();
        Box::new(move |challenge| filter.matches(challenge))
    }
}

/// Free-text search predicate over name, platform tags, and technology
/// tags (case-insensitive substring).
#[allow(dead_code)] // For consumers composing search separately from the filter
pub fn search_predicate(query: &str) -> ChallengePredicate {
    let query = query.to_string();
    Box::new(move |challenge| challenge.matches_text(&query))
}

/// AND-compose an arbitrary number of predicates. No predicates means
/// match-all.
pub fn compose(predicates: Vec<ChallengePredicate>) -> ChallengePredicate {
    Box::new(move |challenge| predicates.iter().all(|p| p(challenge)))
}

/// Compose the full view predicate: master gate, top filter, and the
/// sidebar filter. A custom top filter takes precedence and bypasses the
/// sidebar's own predicate.
pub fn compose_view(
    top: &ChallengeFilter,
    sidebar: Option<&ChallengeFilter>,
    master: Option<ChallengePredicate>,
) -> ChallengePredicate {
    let mut predicates = Vec::new();

    if let Some(master) = master {
        predicates.push(master);
    }

    predicates.push(top.predicate());

    if !top.custom {
        if let Some(sidebar) = sidebar {
            predicates.push(sidebar.predicate());
        }
    }

    compose(predicates)
}

/// Shareable filter string codec.
pub mod codec {
    use super::*;

    /// Encode a filter as a URL-fragment-safe string.
    pub fn encode(filter: &ChallengeFilter) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        serializer.append_pair("name", &filter.name);
        if filter.custom {
            serializer.append_pair("mode", "custom");
        }
        if !filter.tracks.is_empty() {
            let tracks: Vec<&str> = filter.tracks.iter().map(Track::api_type).collect();
            serializer.append_pair("tracks", &tracks.join(","));
        }
        if !filter.subtracks.is_empty() {
            let subtracks: Vec<&str> =
                filter.subtracks.iter().map(String::as_str).collect();
            serializer.append_pair("subtracks", &subtracks.join(","));
        }
        if !filter.keywords.is_empty() {
            let keywords: Vec<&str> = filter.keywords.iter().map(String::as_str).collect();
            serializer.append_pair("keywords", &keywords.join(","));
        }
        if !filter.query.is_empty() {
            serializer.append_pair("query", &filter.query);
        }

        serializer.finish()
    }

    /// Decode a filter string.
    ///
    /// Never fails: unknown keys are ignored, a preset name that is not
    /// recognized tags the result as a custom filter, and completely
    /// malformed input degrades to a custom-tagged default.
    pub fn decode(encoded: &str) -> ChallengeFilter {
        let mut filter = ChallengeFilter::default();
        let mut saw_name = false;

        for (key, value) in form_urlencoded::parse(encoded.as_bytes()) {
            match key.as_ref() {
                "name" => {
                    filter.name = value.into_owned();
                    saw_name = true;
                }
                "mode" => {
                    if value == "custom" {
                        filter.custom = true;
                    }
                }
                "tracks" => {
                    filter.tracks = value
                        .split(',')
                        .filter_map(Track::from_community)
                        .collect();
                }
                "subtracks" => {
                    filter.subtracks = value
                        .split(',')
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "keywords" => {
                    filter.keywords = value
                        .split(',')
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "query" => {
                    filter.query = value.into_owned();
                }
                _ => {}
            }
        }

        // Foreign preset names are treated as saved custom filters, not
        // rejected. A non-empty string that names no filter at all is
        // custom too; only the empty string decodes to the default.
        if FilterPreset::from_name(&filter.name).is_none() {
            filter.custom = true;
        }
        if !saw_name && !encoded.trim().is_empty() {
            filter.custom = true;
        }

        filter
    }
}
