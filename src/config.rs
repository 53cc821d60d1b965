//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.challboard.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Upstream API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path. Empty means stdout.
    #[serde(default)]
    pub output: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Challenge ids hidden from every listing (moderation gate applied
    /// before any user filter).
    #[serde(default)]
    pub hidden_challenges: Vec<u64>,
}

/// Upstream API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the v2 listing API.
    #[serde(default = "default_base_v2")]
    pub base_v2: String,

    /// Base URL of the v3 API (technologies vocabulary).
    #[serde(default = "default_base_v3")]
    pub base_v3: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_v2: default_base_v2(),
            base_v3: default_base_v3(),
        }
    }
}

fn default_base_v2() -> String {
    "https://api.topcoder.com/v2".to_string()
}

fn default_base_v3() -> String {
    "https://api.topcoder.com/v3".to_string()
}

/// Fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Page size for the past/upcoming listings.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Seed the filter vocabulary from the challenge-type and
    /// technology endpoints before fetching listings.
    #[serde(default = "default_true")]
    pub seed_vocabulary: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            page_size: default_page_size(),
            seed_vocabulary: true,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".challboard.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // API bases - always override since they have defaults in CLI
        self.api.base_v2 = args.api_v2.clone();
        self.api.base_v3 = args.api_v3.clone();

        // Timeout and page size - only override if explicitly provided
        if let Some(timeout) = args.timeout {
            self.fetch.timeout_seconds = timeout;
        }
        if let Some(page_size) = args.page_size {
            self.fetch.page_size = page_size;
        }

        if args.no_seed_vocabulary {
            self.fetch.seed_vocabulary = false;
        }

        // Output path - only override if provided
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }

        // Hidden ids from CLI extend the configured set
        if let Some(ref hidden) = args.hide {
            self.general.hidden_challenges.extend(hidden.iter().copied());
            self.general.hidden_challenges.sort_unstable();
            self.general.hidden_challenges.dedup();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_v2, "https://api.topcoder.com/v2");
        assert_eq!(config.fetch.timeout_seconds, 30);
        assert_eq!(config.fetch.page_size, 100);
        assert!(config.fetch.seed_vocabulary);
        assert!(config.general.hidden_challenges.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true
hidden_challenges = [30055555]

[api]
base_v2 = "http://localhost:8080/v2"

[fetch]
timeout_seconds = 10
page_size = 25
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.general.hidden_challenges, vec![30055555]);
        assert_eq!(config.api.base_v2, "http://localhost:8080/v2");
        assert_eq!(config.api.base_v3, "https://api.topcoder.com/v3");
        assert_eq!(config.fetch.timeout_seconds, 10);
        assert_eq!(config.fetch.page_size, 25);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[fetch]"));
    }
}
