//! Challboard - Multi-Track Challenge Listing Aggregator
//!
//! A CLI tool that fetches challenge listings from the legacy contest
//! API across all competition tracks, merges them into one deduplicated
//! list, and renders it with client-side filtering.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, decode failure, etc.)
//!   2 - A filter was applied and no challenge matched it

mod aggregator;
mod api;
mod cli;
mod config;
mod filter;
mod models;
mod pipeline;
mod report;
mod vocabulary;

use aggregator::ChallengeAggregator;
use anyhow::{Context, Result};
use api::{EndpointSet, ListingClient};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use filter::{codec, compose_view, ChallengePredicate};
use indicatif::{ProgressBar, ProgressStyle};
use models::{Challenge, ChallengeSummary, Listing, ListingMetadata};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Challboard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the listing workflow
    match run_listing(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Listing failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .challboard.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".challboard.toml");

    if path.exists() {
        eprintln!("⚠️  .challboard.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .challboard.toml")?;

    println!("✅ Created .challboard.toml with default settings.");
    println!("   Edit it to customize API bases, timeout, and page size.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete listing workflow. Returns exit code (0 or 2).
async fn run_listing(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Build the effective filter from the arguments
    let challenge_filter = args.to_filter();

    // Handle --print-filter: emit the shareable string and exit
    if args.print_filter {
        println!("{}", codec::encode(&challenge_filter));
        return Ok(0);
    }

    let endpoints = EndpointSet::for_base(
        &config.api.base_v2,
        &config.api.base_v3,
        config.fetch.page_size,
    );

    // Handle --dry-run: print the endpoint set and exit
    if args.dry_run {
        return handle_dry_run(&endpoints);
    }

    // Step 1: Build the client and aggregator
    let client = ListingClient::new(Duration::from_secs(config.fetch.timeout_seconds))
        .context("Failed to build the HTTP client")?;
    let mut aggregator = ChallengeAggregator::new(client, endpoints);

    println!("📡 Fetching challenge listings...");
    println!("   API: {}", config.api.base_v2);
    println!(
        "   Endpoints: {} | Timeout: {}s",
        aggregator.endpoints().listings.len(),
        config.fetch.timeout_seconds
    );

    let spinner = make_spinner();

    // Step 2: Seed the filter vocabulary (best effort)
    if config.fetch.seed_vocabulary {
        spinner.set_message("seeding filter vocabulary...");
        let added = aggregator.seed_vocabulary().await;
        debug!("vocabulary seeding added {} labels", added);
    }

    // Step 3: Aggregated fetch under a fresh token
    spinner.set_message("fetching listings...");
    let outcome = aggregator
        .refresh()
        .await
        .context("Aggregated fetch failed")?;
    spinner.finish_and_clear();

    let Some(outcome) = outcome else {
        // Only possible when another fetch superseded this one.
        warn!("fetch was superseded before it could commit");
        return Ok(0);
    };

    if outcome.vocabulary_changed {
        info!(
            "filter vocabulary grew to {} keywords, {} subtracks",
            aggregator.vocabulary().keyword_count(),
            aggregator.vocabulary().subtrack_count()
        );
        debug!("known keywords: {:?}", aggregator.vocabulary().keywords());
        debug!("known subtracks: {:?}", aggregator.vocabulary().subtracks());
    }

    info!("fetched {} distinct challenges", outcome.challenges.len());

    // Step 4: Compose and apply the view predicate. The listing is
    // re-deduplicated here the way any page-concatenating consumer
    // would, so the unique-id property holds at the display boundary
    // too.
    let view = compose_view(&challenge_filter, None, hidden_gate(&config));
    let challenges: Vec<Challenge> =
        pipeline::dedup_by_id(outcome.challenges.into_iter().filter(|c| view(c)));

    // Step 5: Build and render the listing
    println!("\n📝 Generating listing...");

    let duration = start_time.elapsed().as_secs_f64();
    let summary = ChallengeSummary::from_challenges(&challenges);

    let metadata = ListingMetadata {
        api_base: config.api.base_v2.clone(),
        fetch_date: Utc::now(),
        endpoints_queried: aggregator.endpoints().listings.len(),
        duration_seconds: duration,
        filter: (!challenge_filter.is_default()).then(|| codec::encode(&challenge_filter)),
    };

    let listing = Listing {
        metadata,
        challenges,
        summary: summary.clone(),
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&listing)?,
        OutputFormat::Markdown => report::generate_markdown_report(&listing),
    };

    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write listing to {}", path))?;
            println!("✅ Listing saved to: {}", path);
        }
        None => {
            println!("{}", output);
        }
    }

    // Print summary
    println!("📊 Listing Summary:");
    println!("   Challenges: {}", summary.total);
    println!(
        "   - Design: {} | Develop: {} | Data Science: {}",
        summary.design, summary.develop, summary.data_science
    );
    println!(
        "   - Active: {} | Completed: {} | Open for registration: {}",
        summary.active, summary.completed, summary.open_for_registration
    );
    println!("   Duration: {:.1}s", duration);

    // A filter that matched nothing is a CI-friendly failure
    if args.has_filtering() && summary.total == 0 {
        eprintln!("\n⛔ No challenges matched the filter (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

/// Handle --dry-run: print the endpoints that would be queried, exit.
fn handle_dry_run(endpoints: &EndpointSet) -> Result<i32> {
    println!("\n🔍 Dry run: endpoints that would be queried (no fetch)...\n");

    for endpoint in &endpoints.listings {
        println!(
            "     📄 [{} {:?}] {}",
            endpoint.track, endpoint.kind, endpoint.url
        );
    }
    println!("\n   Vocabulary sources:");
    for url in &endpoints.subtrack_sources {
        println!("     📄 {}", url);
    }
    println!("     📄 {}", endpoints.keyword_source);

    println!(
        "\n✅ Dry run complete. {} listing endpoints.",
        endpoints.listings.len()
    );
    Ok(0)
}

/// Moderation gate from the configured hidden challenge ids.
fn hidden_gate(config: &Config) -> Option<ChallengePredicate> {
    if config.general.hidden_challenges.is_empty() {
        return None;
    }

    let hidden = config.general.hidden_challenges.clone();
    Some(Box::new(move |challenge| !hidden.contains(&challenge.id)))
}

/// Spinner shown while the fan-out fetch is in flight.
fn make_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .challboard.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
