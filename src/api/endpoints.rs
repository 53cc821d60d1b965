//! Construction of the fixed upstream endpoint set.
//!
//! There is no single upstream endpoint that can list and filter
//! challenges across tracks, so every fetch queries the full cross
//! product of listing kind and track, plus the marathon-specific
//! listings, and filters client-side afterwards.

use crate::models::Track;

/// Which slice of the challenge lifecycle an endpoint lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Active,
    Past,
    Upcoming,
}

/// One upstream listing endpoint, tagged with its originating track.
#[derive(Debug, Clone)]
pub struct ListingEndpoint {
    /// Full request URL.
    pub url: String,
    /// Track tag attached to every record this endpoint returns.
    pub track: Track,
    /// Lifecycle slice the endpoint lists.
    pub kind: ListingKind,
}

/// The complete set of endpoints one aggregated fetch touches.
#[derive(Debug, Clone)]
pub struct EndpointSet {
    /// Listing endpoints, queried concurrently on every fetch.
    pub listings: Vec<ListingEndpoint>,
    /// Subtrack vocabulary endpoints (v2 `challengetypes`).
    pub subtrack_sources: Vec<String>,
    /// Keyword vocabulary endpoint (v3 `technologies`).
    pub keyword_source: String,
}

impl EndpointSet {
    /// Build the endpoint set for the given API bases.
    ///
    /// Past and upcoming listings are capped at `page_size` records per
    /// endpoint; active listings are fetched in full.
    pub fn for_base(base_v2: &str, base_v3: &str, page_size: u32) -> Self {
        let v2 = base_v2.trim_end_matches('/');
        let v3 = base_v3.trim_end_matches('/');

        let listings = vec![
            // Active challenges
            ListingEndpoint {
                url: format!("{}/challenges/active?type=design", v2),
                track: Track::Design,
                kind: ListingKind::Active,
            },
            ListingEndpoint {
                url: format!("{}/challenges/active?type=develop", v2),
                track: Track::Develop,
                kind: ListingKind::Active,
            },
            ListingEndpoint {
                url: format!("{}/dataScience/challenges/active", v2),
                track: Track::DataScience,
                kind: ListingKind::Active,
            },
            ListingEndpoint {
                url: format!("{}/data/marathon/challenges/?listType=active", v2),
                track: Track::DataScience,
                kind: ListingKind::Active,
            },
            // Some past challenges
            ListingEndpoint {
                url: format!("{}/challenges/past?type=design&pageSize={}", v2, page_size),
                track: Track::Design,
                kind: ListingKind::Past,
            },
            ListingEndpoint {
                url: format!(
                    "{}/challenges/past?type=develop&pageSize={}",
                    v2, page_size
                ),
                track: Track::Develop,
                kind: ListingKind::Past,
            },
            ListingEndpoint {
                url: format!(
                    "{}/dataScience/challenges/past?pageSize={}",
                    v2, page_size
                ),
                track: Track::DataScience,
                kind: ListingKind::Past,
            },
            ListingEndpoint {
                url: format!(
                    "{}/data/marathon/challenges/?listType=past&pageSize={}",
                    v2, page_size
                ),
                track: Track::DataScience,
                kind: ListingKind::Past,
            },
            // Upcoming challenges
            ListingEndpoint {
                url: format!(
                    "{}/challenges/upcoming?type=design&pageSize={}",
                    v2, page_size
                ),
                track: Track::Design,
                kind: ListingKind::Upcoming,
            },
            ListingEndpoint {
                url: format!(
                    "{}/challenges/upcoming?type=develop&pageSize={}",
                    v2, page_size
                ),
                track: Track::Develop,
                kind: ListingKind::Upcoming,
            },
            ListingEndpoint {
                url: format!(
                    "{}/dataScience/challenges/upcoming?pageSize={}",
                    v2, page_size
                ),
                track: Track::DataScience,
                kind: ListingKind::Upcoming,
            },
        ];

        let subtrack_sources = vec![
            format!("{}/design/challengetypes", v2),
            format!("{}/develop/challengetypes", v2),
        ];

        let keyword_source = format!("{}/technologies/", v3);

        Self {
            listings,
            subtrack_sources,
            keyword_source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_count_and_tracks() {
        let set = EndpointSet::for_base(
            "https://api.example.com/v2",
            "https://api.example.com/v3",
            100,
        );

        assert_eq!(set.listings.len(), 11);

        let design = set
            .listings
            .iter()
            .filter(|e| e.track == Track::Design)
            .count();
        let develop = set
            .listings
            .iter()
            .filter(|e| e.track == Track::Develop)
            .count();
        let data_science = set
            .listings
            .iter()
            .filter(|e| e.track == Track::DataScience)
            .count();

        assert_eq!(design, 3);
        assert_eq!(develop, 3);
        // Three dataScience listings plus two marathon listings.
        assert_eq!(data_science, 5);
    }

    #[test]
    fn test_page_size_applied_to_past_and_upcoming() {
        let set = EndpointSet::for_base("http://api/v2", "http://api/v3", 50);

        for endpoint in &set.listings {
            match endpoint.kind {
                ListingKind::Active => assert!(!endpoint.url.contains("pageSize")),
                _ => assert!(
                    endpoint.url.contains("pageSize=50"),
                    "missing page size: {}",
                    endpoint.url
                ),
            }
        }
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let set = EndpointSet::for_base("http://api/v2/", "http://api/v3/", 100);
        assert!(set.listings[0].url.starts_with("http://api/v2/challenges"));
        assert_eq!(set.keyword_source, "http://api/v3/technologies/");
    }

    #[test]
    fn test_vocabulary_sources() {
        let set = EndpointSet::for_base("http://api/v2", "http://api/v3", 100);
        assert_eq!(set.subtrack_sources.len(), 2);
        assert!(set.subtrack_sources[0].ends_with("/design/challengetypes"));
        assert!(set.subtrack_sources[1].ends_with("/develop/challengetypes"));
    }
}
