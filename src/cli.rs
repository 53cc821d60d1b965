//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation, default values, and turning the flags into a
//! challenge filter.

use crate::filter::{codec, ChallengeFilter, FilterPreset, FilterUpdate};
use crate::models::Track;
use clap::Parser;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Challboard - multi-track challenge listing aggregator
///
/// Fetch every challenge listing from the legacy contest API, merge the
/// tracks into one deduplicated list, and filter it client-side.
///
/// Examples:
///   challboard
///   challboard --search java --track develop
///   challboard --preset "Open for registration" --format json
///   challboard --filter "name=All+Challenges&keywords=Java" --output listing.md
///   challboard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Free-text search over challenge names and tags
    #[arg(short, long, value_name = "QUERY")]
    pub search: Option<String>,

    /// Tracks to keep (comma-separated)
    ///
    /// Example: --track design,develop
    #[arg(long, value_name = "TRACKS", value_delimiter = ',')]
    pub track: Option<Vec<String>>,

    /// Subtracks to keep, in upper-snake form (comma-separated)
    ///
    /// Example: --subtrack CODE,FIRST2FINISH
    #[arg(long, value_name = "SUBTRACKS", value_delimiter = ',')]
    pub subtrack: Option<Vec<String>>,

    /// Keyword tags to keep (comma-separated)
    ///
    /// Example: --keyword Java,Node.js
    #[arg(long, value_name = "KEYWORDS", value_delimiter = ',')]
    pub keyword: Option<Vec<String>>,

    /// Named sidebar preset to apply
    ///
    /// One of: "All Challenges", "My Challenges", "Open for registration",
    /// "Ongoing challenges", "Past challenges"
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Encoded filter string to restore (as printed by --print-filter)
    #[arg(short, long, value_name = "FILTER")]
    pub filter: Option<String>,

    /// Print the encoded filter string and exit without fetching
    #[arg(long)]
    pub print_filter: bool,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file path (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Base URL of the v2 listing API
    #[arg(
        long,
        default_value = "https://api.topcoder.com/v2",
        env = "CHALLBOARD_API_V2"
    )]
    pub api_v2: String,

    /// Base URL of the v3 API (technologies vocabulary)
    #[arg(
        long,
        default_value = "https://api.topcoder.com/v3",
        env = "CHALLBOARD_API_V3"
    )]
    pub api_v3: String,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Page size for the past/upcoming listings
    #[arg(long, value_name = "COUNT")]
    pub page_size: Option<u32>,

    /// Skip vocabulary seeding from the challengetypes/technologies endpoints
    #[arg(long)]
    pub no_seed_vocabulary: bool,

    /// Challenge ids to hide from the listing (comma-separated)
    #[arg(long, value_name = "IDS", value_delimiter = ',')]
    pub hide: Option<Vec<u64>>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .challboard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the endpoint set without fetching
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .challboard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate API URL formats
        for url in [&self.api_v2, &self.api_v3] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!(
                    "API URL must start with 'http://' or 'https://': {}",
                    url
                ));
            }
        }

        // Validate track names
        if let Some(ref tracks) = self.track {
            for track in tracks {
                if Track::from_community(track).is_none() {
                    return Err(format!(
                        "Unknown track '{}'. Expected design, develop, or dataScience",
                        track
                    ));
                }
            }
        }

        // Validate preset name
        if let Some(ref preset) = self.preset {
            if FilterPreset::from_name(preset).is_none() {
                let names: Vec<&str> =
                    FilterPreset::all().iter().map(|p| p.name()).collect();
                return Err(format!(
                    "Unknown preset '{}'. Expected one of: {}",
                    preset,
                    names.join(", ")
                ));
            }
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Validate page size if provided
        if let Some(page_size) = self.page_size {
            if page_size == 0 {
                return Err("Page size must be at least 1".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// True when any flag narrows the listing.
    pub fn has_filtering(&self) -> bool {
        self.search.is_some()
            || self.track.is_some()
            || self.subtrack.is_some()
            || self.keyword.is_some()
            || self.preset.is_some()
            || self.filter.is_some()
    }

    /// Build the effective challenge filter from the arguments.
    ///
    /// `--filter` restores a shared filter first; `--preset` applies as
    /// a sidebar selection; the structured flags and `--search` apply as
    /// a top-filter update, which switches the filter to custom mode.
    pub fn to_filter(&self) -> ChallengeFilter {
        let mut filter = match self.filter {
            Some(ref encoded) => codec::decode(encoded),
            None => ChallengeFilter::default(),
        };

        if let Some(ref preset) = self.preset {
            filter.apply(
                FilterUpdate {
                    name: Some(preset.clone()),
                    ..Default::default()
                },
                true,
            );
        }

        let update = FilterUpdate {
            name: None,
            tracks: self.track.as_ref().map(|tracks| {
                tracks
                    .iter()
                    .filter_map(|t| Track::from_community(t))
                    .collect::<BTreeSet<_>>()
            }),
            subtracks: self
                .subtrack
                .as_ref()
                .map(|s| s.iter().cloned().collect()),
            keywords: self.keyword.as_ref().map(|k| k.iter().cloned().collect()),
            query: self.search.clone(),
        };

        if !update.is_empty() {
            filter.apply(update, false);
        }

        filter
    }
}
