//! Ordered-fallback data source
//!
//! The one retrieval order this tool commits to: subprocess MCP bridge when
//! credentials are configured, direct REST second, empty results last. The
//! first path producing a non-error response wins; nothing is merged across
//! paths. No method here ever returns an error - a total failure is an empty
//! result set, never fabricated rows.

use tracing::{debug, warn};

use seoscout_core::{
    prepare_keyword, CompetitorRow, KeywordRow, OnPageReport, Query, RankedKeywordRow, SerpRow,
    TrendsReport, VolumeRow,
};

use crate::{BridgeConfig, DataError, McpBridge, RestClient, RestConfig};

/// Keywords longer than this get a too-specific hint when volume comes back zero
const SPECIFIC_KEYWORD_CHARS: usize = 30;

/// Multi-path DataForSEO data source
pub struct DataSource {
    bridge: McpBridge,
    rest: RestClient,
}

/// Resolve the fallback chain for one fetch: first non-error path wins
fn resolve<T>(
    what: &str,
    bridge: Option<Result<T, DataError>>,
    rest: Option<Result<T, DataError>>,
    empty: T,
) -> T {
    match bridge {
        Some(Ok(value)) => {
            debug!("bridge served {}", what);
            return value;
        }
        Some(Err(e)) => warn!("MCP bridge {} failed: {}", what, e),
        None => {}
    }
    match rest {
        Some(Ok(value)) => {
            debug!("REST served {}", what);
            return value;
        }
        Some(Err(e)) => warn!("REST {} failed: {}", what, e),
        None => {}
    }
    warn!("all retrieval paths failed for {}; returning empty results", what);
    empty
}

impl DataSource {
    pub fn new(bridge: McpBridge, rest: RestClient) -> Self {
        Self { bridge, rest }
    }

    /// Build both paths from environment configuration
    pub fn from_env() -> Self {
        Self::new(
            McpBridge::new(BridgeConfig::default()),
            RestClient::new(RestConfig::default()),
        )
    }

    /// Whether at least one retrieval path has credentials
    pub fn is_configured(&self) -> bool {
        self.bridge.is_configured() || self.rest.is_configured()
    }

    pub async fn keyword_ideas(&self, query: &Query) -> Vec<KeywordRow> {
        let bridge = if self.bridge.is_configured() {
            Some(self.bridge.keyword_ideas(query).await)
        } else {
            None
        };
        // Only the losing path's successor runs; a bridge success skips REST
        let rest = match &bridge {
            Some(Ok(_)) => None,
            _ if self.rest.is_configured() => Some(self.rest.keyword_ideas(query).await),
            _ => None,
        };
        resolve("keyword ideas", bridge, rest, Vec::new())
    }

    pub async fn serp(&self, query: &Query) -> Vec<SerpRow> {
        let bridge = if self.bridge.is_configured() {
            Some(self.bridge.serp(query).await)
        } else {
            None
        };
        let rest = match &bridge {
            Some(Ok(_)) => None,
            _ if self.rest.is_configured() => Some(self.rest.serp(query).await),
            _ => None,
        };
        resolve("SERP analysis", bridge, rest, Vec::new())
    }

    pub async fn search_volume(&self, keywords: &[String], query: &Query) -> Vec<VolumeRow> {
        let bridge = if self.bridge.is_configured() {
            Some(self.bridge.search_volume(keywords, query).await)
        } else {
            None
        };
        let rest = match &bridge {
            Some(Ok(_)) => None,
            _ if self.rest.is_configured() => {
                Some(self.rest.search_volume(keywords, query).await)
            }
            _ => None,
        };
        let mut rows = resolve("search volume", bridge, rest, Vec::new());

        for (i, row) in rows.iter_mut().enumerate() {
            if row.search_volume == 0 {
                if let Some(original) = keywords.get(i) {
                    if original.len() > SPECIFIC_KEYWORD_CHARS {
                        row.note = Some("Query too specific - try shorter keywords".to_string());
                    }
                }
            }
        }
        rows
    }

    pub async fn competitor_domains(&self, query: &Query) -> Vec<CompetitorRow> {
        let bridge = if self.bridge.is_configured() {
            Some(self.bridge.competitor_domains(query).await)
        } else {
            None
        };
        let rest = match &bridge {
            Some(Ok(_)) => None,
            _ if self.rest.is_configured() => Some(self.rest.competitor_domains(query).await),
            _ => None,
        };
        resolve("competitor domains", bridge, rest, Vec::new())
    }

    pub async fn ranked_keywords(&self, query: &Query) -> Vec<RankedKeywordRow> {
        let bridge = if self.bridge.is_configured() {
            Some(self.bridge.ranked_keywords(query).await)
        } else {
            None
        };
        let rest = match &bridge {
            Some(Ok(_)) => None,
            _ if self.rest.is_configured() => Some(self.rest.ranked_keywords(query).await),
            _ => None,
        };
        resolve("ranked keywords", bridge, rest, Vec::new())
    }

    pub async fn trends(
        &self,
        keywords: &[String],
        time_range: &str,
        query: &Query,
    ) -> TrendsReport {
        let bridge = if self.bridge.is_configured() {
            Some(self.bridge.trends(keywords, time_range, query).await)
        } else {
            None
        };
        let rest = match &bridge {
            Some(Ok(_)) => None,
            _ if self.rest.is_configured() => {
                Some(self.rest.trends(keywords, time_range, query).await)
            }
            _ => None,
        };
        let empty = TrendsReport {
            keywords: keywords.to_vec(),
            ..Default::default()
        };
        let mut report = resolve("trends", bridge, rest, empty);

        let prepared: Vec<String> = keywords.iter().map(|k| prepare_keyword(k)).collect();
        if prepared != keywords {
            report.note = Some(format!(
                "Showing trends for simplified query: {}",
                prepared.join(", ")
            ));
        }
        report
    }

    pub async fn onpage(&self, url: &str) -> OnPageReport {
        let bridge = if self.bridge.is_configured() {
            Some(self.bridge.onpage(url).await)
        } else {
            None
        };
        let rest = match &bridge {
            Some(Ok(_)) => None,
            _ if self.rest.is_configured() => Some(self.rest.onpage(url).await),
            _ => None,
        };
        let empty = OnPageReport {
            url: url.to_string(),
            ..Default::default()
        };
        resolve("on-page analysis", bridge, rest, empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A source with no credentials anywhere: both paths skipped
    fn unconfigured_source() -> DataSource {
        DataSource::new(
            McpBridge::new(BridgeConfig {
                command: None,
                username: None,
                password: None,
                timeout_secs: 1,
            }),
            RestClient::new(RestConfig {
                username: None,
                password: None,
                base_url: "https://api.dataforseo.com/v3".to_string(),
                timeout_secs: 1,
            }),
        )
    }

    #[tokio::test]
    async fn test_total_failure_returns_empty_rows() {
        let source = unconfigured_source();
        let query = Query::new("running shoes");

        assert!(source.keyword_ideas(&query).await.is_empty());
        assert!(source.serp(&query).await.is_empty());
        assert!(source.competitor_domains(&query).await.is_empty());
        assert!(source.ranked_keywords(&query).await.is_empty());
        assert!(!source.is_configured());
    }

    #[tokio::test]
    async fn test_total_failure_trends_and_onpage_empty() {
        let source = unconfigured_source();
        let query = Query::new("running shoes");

        let trends = source
            .trends(&["running shoes".to_string()], "past_12_months", &query)
            .await;
        assert!(trends.points.is_empty());
        assert_eq!(trends.keywords, vec!["running shoes"]);

        let onpage = source.onpage("example.com").await;
        assert_eq!(onpage.status_code, 0);
    }

    #[tokio::test]
    async fn test_trends_note_for_simplified_keywords() {
        let source = unconfigured_source();
        let query = Query::new("seed");
        let long = vec!["best trail running shoes for wide feet".to_string()];

        let report = source.trends(&long, "past_12_months", &query).await;
        let note = report.note.expect("simplification note");
        // First four words only
        assert!(note.contains("best trail running shoes"));
        assert!(!note.contains("wide feet"));
    }

    #[test]
    fn test_resolve_prefers_first_ok() {
        let value = resolve(
            "test",
            Some(Ok(vec![1])),
            Some(Ok(vec![2])),
            Vec::new(),
        );
        assert_eq!(value, vec![1]);
    }

    #[test]
    fn test_resolve_falls_through_errors() {
        let value = resolve(
            "test",
            Some(Err(DataError::NotConfigured)),
            Some(Ok(vec![2])),
            Vec::new(),
        );
        assert_eq!(value, vec![2]);

        let empty: Vec<i32> = resolve(
            "test",
            Some(Err(DataError::NotConfigured)),
            Some(Err(DataError::NotConfigured)),
            Vec::new(),
        );
        assert!(empty.is_empty());
    }
}
