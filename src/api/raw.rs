//! Raw wire shapes returned by the legacy listing endpoints.
//!
//! The upstream API is loosely typed: identifiers arrive as numbers or
//! strings, most fields are optional, and different endpoints wrap their
//! record arrays differently. Everything here is `Option`-heavy on
//! purpose; the pipeline backfills defaults during normalization.

use serde::Deserialize;

/// An identifier that may arrive as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    Num(u64),
    Text(String),
}

impl LooseId {
    /// Numeric value of the identifier, if it has one.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            LooseId::Num(n) => Some(*n),
            LooseId::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// One record from any listing endpoint.
///
/// Standard challenges carry `challengeId`/`challengeName`; marathon
/// matches from the marathon endpoint carry `roundId`/`fullName` and
/// date fields instead. A single shape covers both.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRecord {
    pub challenge_id: Option<LooseId>,
    pub round_id: Option<LooseId>,
    pub challenge_name: Option<String>,
    pub full_name: Option<String>,
    pub challenge_type: Option<String>,
    pub challenge_community: Option<String>,
    pub submission_end_date: Option<String>,
    pub registration_start_date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current_phase_name: Option<String>,
    pub platforms: Option<Vec<String>>,
    pub technologies: Option<Vec<String>>,
    pub num_registrants: Option<u64>,
    pub num_submissions: Option<u64>,
    pub number_of_registrants: Option<u64>,
    pub number_of_submissions: Option<u64>,
    pub total_prize: Option<f64>,
}

/// Listing response envelope.
///
/// The v2 endpoints answer `{"data": [...]}`, while v3-style endpoints
/// answer `{"result": {"content": [...]}}`. Both decode to the same
/// record list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListingEnvelope {
    Data { data: Vec<RawRecord> },
    Wrapped { result: WrappedContent },
}

#[derive(Debug, Deserialize)]
pub struct WrappedContent {
    pub content: Vec<RawRecord>,
}

impl ListingEnvelope {
    /// Unwrap the record list regardless of envelope shape.
    pub fn into_records(self) -> Vec<RawRecord> {
        match self {
            ListingEnvelope::Data { data } => data,
            ListingEnvelope::Wrapped { result } => result.content,
        }
    }
}

/// A named entry from the vocabulary endpoints (`challengetypes`,
/// `technologies`).
#[derive(Debug, Clone, Deserialize)]
pub struct NamedItem {
    pub name: String,
}

/// Envelope for the v3 `technologies` endpoint.
#[derive(Debug, Deserialize)]
pub struct NamedEnvelope {
    pub result: NamedContent,
}

#[derive(Debug, Deserialize)]
pub struct NamedContent {
    pub content: Vec<NamedItem>,
}
