//! Markdown and JSON rendering of a challenge listing.
//!
//! The listing handed in is already filtered and sorted; rendering is
//! purely presentational.

use crate::models::{Challenge, ChallengeSummary, Listing, ListingMetadata};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown listing.
pub fn generate_markdown_report(listing: &Listing) -> String {
    let mut output = String::new();

    output.push_str("# Challenge Listing\n\n");
    output.push_str(&generate_metadata_section(&listing.metadata));
    output.push_str(&generate_summary_section(&listing.summary));
    output.push_str(&generate_challenges_section(&listing.challenges));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ListingMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **API:** {}\n", metadata.api_base));
    section.push_str(&format!(
        "- **Fetched:** {}\n",
        metadata.fetch_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Endpoints Queried:** {}\n",
        metadata.endpoints_queried
    ));
    section.push_str(&format!(
        "- **Fetch Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    if let Some(ref filter) = metadata.filter {
        section.push_str(&format!("- **Filter:** `{}`\n", filter));
    }
    section.push_str("\n");

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &ChallengeSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str(&format!("- **Total Challenges:** {}\n", summary.total));
    section.push_str(&format!(
        "- **By Track:** Design {} | Develop {} | Data Science {}\n",
        summary.design, summary.develop, summary.data_science
    ));
    section.push_str(&format!(
        "- **By Status:** Active {} | Completed {}\n",
        summary.active, summary.completed
    ));
    section.push_str(&format!(
        "- **Open for Registration:** {}\n",
        summary.open_for_registration
    ));
    section.push_str("\n");

    section
}

/// Generate the challenge table.
fn generate_challenges_section(challenges: &[Challenge]) -> String {
    let mut section = String::new();

    section.push_str("## Challenges\n\n");

    if challenges.is_empty() {
        section.push_str("No challenges matched.\n\n");
        return section;
    }

    section.push_str(
        "| Name | Track | Subtrack | Status | Registration | Submission End | Tags |\n",
    );
    section.push_str("|---|---|---|---|---|---|---|\n");

    for challenge in challenges {
        let mut tags: Vec<&str> = challenge
            .platforms
            .iter()
            .chain(challenge.technologies.iter())
            .map(String::as_str)
            .collect();
        tags.dedup();

        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            escape_cell(&challenge.name),
            challenge.track,
            challenge.sub_track,
            challenge.status,
            challenge.registration_open,
            challenge.submission_end.format("%Y-%m-%d %H:%M"),
            escape_cell(&tags.join(", ")),
        ));
    }

    section.push_str("\n");
    section
}

/// Pipes inside a table cell would break the row.
fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Listing generated by challboard*\n".to_string()
}

/// Generate a JSON listing.
pub fn generate_json_report(listing: &Listing) -> Result<String> {
    serde_json::to_string_pretty(listing).map_err(Into::into)
}

/// Write a Markdown listing to a file.
#[allow(dead_code)] // Alternative to writing stdout
pub fn write_report(listing: &Listing, path: &Path) -> Result<()> {
    let content = generate_markdown_report(listing);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RegistrationOpen, Status, Track};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    fn make_listing() -> Listing {
        let challenge = Challenge {
            id: 42,
            name: "Pipe | Name".to_string(),
            track: Track::Develop,
            sub_track: "CODE".to_string(),
            status: Status::Active,
            registration_open: RegistrationOpen::Yes,
            submission_end: Utc.with_ymd_and_hms(2017, 3, 15, 12, 0, 0).unwrap(),
            registration_start: None,
            current_phase: None,
            communities: BTreeSet::from([Track::Develop]),
            platforms: vec!["AWS".to_string()],
            technologies: vec!["Java".to_string()],
            num_registrants: Some(10),
            num_submissions: None,
            total_prize: Some(1500.0),
            my_challenge: false,
        };

        Listing {
            metadata: ListingMetadata {
                api_base: "http://api/v2".to_string(),
                fetch_date: Utc.with_ymd_and_hms(2017, 6, 1, 0, 0, 0).unwrap(),
                endpoints_queried: 11,
                duration_seconds: 1.5,
                filter: Some("name=All+Challenges".to_string()),
            },
            challenges: vec![challenge.clone()],
            summary: ChallengeSummary::from_challenges(&[challenge]),
        }
    }

    #[test]
    fn test_markdown_report_sections() {
        let report = generate_markdown_report(&make_listing());

        assert!(report.contains("# Challenge Listing"));
        assert!(report.contains("## Metadata"));
        assert!(report.contains("## Summary"));
        assert!(report.contains("## Challenges"));
        assert!(report.contains("**Endpoints Queried:** 11"));
        assert!(report.contains("**Filter:** `name=All+Challenges`"));
        assert!(report.contains("| Pipe \\| Name |"));
        assert!(report.contains("AWS, Java"));
    }

    #[test]
    fn test_markdown_report_empty_listing() {
        let mut listing = make_listing();
        listing.challenges.clear();
        listing.summary = ChallengeSummary::default();

        let report = generate_markdown_report(&listing);
        assert!(report.contains("No challenges matched."));
    }

    #[test]
    fn test_json_report_round_trips() {
        let listing = make_listing();
        let json = generate_json_report(&listing).unwrap();

        let parsed: Listing = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.challenges.len(), 1);
        assert_eq!(parsed.challenges[0].id, 42);
        assert_eq!(parsed.summary.total, 1);
    }
}
