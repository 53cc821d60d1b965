//! Normalization and merging pipeline.
//!
//! Raw endpoint records go through [`normalize::normalize_record`] and
//! accumulate in a [`merge::ChallengeSet`]; the sorted flatten of that
//! set is the listing handed to the presentation layer.

pub mod merge;
pub mod normalize;

pub use merge::{dedup_by_id, ChallengeSet};
pub use normalize::normalize_record;
