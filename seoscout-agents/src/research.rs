//! Research agent
//!
//! Composes the data source with the LLM gateway: fetch provider rows first,
//! then ask for commentary built from a bounded slice of those rows. A failed
//! LLM call drops the commentary and keeps the rows - partial success is
//! allowed, total failure is never dressed up as content.

use tracing::{info, warn};

use seoscout_core::{
    CompetitorRow, DomainReport, KeywordRow, OnPageReport, Query, RankedKeywordRow, SerpRow,
    TrendsReport, VolumeRow,
};
use seoscout_data::DataSource;

use crate::SharedBackend;

/// Token budget for full insight generation
pub const INSIGHT_TOKENS: u16 = 1500;

/// Token budget for short per-result suggestions
pub const SUGGESTION_TOKENS: u16 = 800;

/// Token budget for domain recommendations
pub const DOMAIN_INSIGHT_TOKENS: u16 = 1000;

/// Token budget for content briefs
pub const BRIEF_TOKENS: u16 = 1200;

/// Keyword research outcome: rows plus optional narrative
#[derive(Debug, Clone)]
pub struct KeywordResearch {
    pub rows: Vec<KeywordRow>,
    /// LLM commentary; absent when the gateway is unavailable
    pub analysis: Option<String>,
}

/// Keywords grouped by likely search intent
#[derive(Debug, Clone, Default)]
pub struct KeywordClusters {
    pub informational: Vec<String>,
    pub commercial: Vec<String>,
    pub navigational: Vec<String>,
    pub other: Vec<String>,
}

/// Fresh provider data woven into a content-generation prompt
#[derive(Debug, Clone, Default)]
pub struct ContentResearch {
    /// Titles of the current top-ranking pages
    pub competitor_titles: Vec<String>,
    /// Related keywords worth working into the draft
    pub related_terms: Vec<String>,
    /// "up" or "stable", from recent trend direction
    pub trending: Option<String>,
}

impl ContentResearch {
    pub fn is_empty(&self) -> bool {
        self.competitor_titles.is_empty() && self.related_terms.is_empty() && self.trending.is_none()
    }
}

/// Research agent over the data source and LLM backend
pub struct ResearchAgent {
    source: DataSource,
    backend: Option<SharedBackend>,
}

impl ResearchAgent {
    pub fn new(source: DataSource, backend: Option<SharedBackend>) -> Self {
        Self { source, backend }
    }

    /// Fire an LLM prompt, degrading to `None` on any failure
    async fn narrative(&self, prompt: &str, max_tokens: u16, temperature: f32) -> Option<String> {
        let backend = self.backend.as_ref()?;
        match backend.generate(prompt, max_tokens, temperature).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("LLM commentary unavailable: {}", e);
                None
            }
        }
    }

    /// Keyword suggestions for a seed, filtered and optionally annotated
    pub async fn research_keywords(&self, query: &Query, with_insights: bool) -> KeywordResearch {
        info!("researching keywords for '{}'", query.seed);
        let fetched = self.source.keyword_ideas(query).await;
        let rows = apply_filters(fetched, query);
        info!("{} keywords passed filters", rows.len());

        let analysis = if !with_insights || rows.is_empty() {
            None
        } else {
            self.narrative(&keyword_prompt(&rows, &query.seed), INSIGHT_TOKENS, 0.3)
                .await
        };

        KeywordResearch { rows, analysis }
    }

    /// SERP entries with optional per-result content-gap notes
    pub async fn analyze_serp(&self, query: &Query, with_insights: bool) -> Vec<SerpRow> {
        info!("analyzing SERP for '{}'", query.seed);
        let mut rows = self.source.serp(query).await;

        if with_insights {
            for row in rows.iter_mut() {
                row.insight = self
                    .narrative(&content_gap_prompt(row, &query.seed), SUGGESTION_TOKENS, 0.7)
                    .await;
            }
        }

        rows
    }

    /// Search-volume metrics for a batch of keywords
    pub async fn search_volume(&self, keywords: &[String], query: &Query) -> Vec<VolumeRow> {
        self.source.search_volume(keywords, query).await
    }

    /// Google Trends interest data
    pub async fn trends(
        &self,
        keywords: &[String],
        time_range: &str,
        query: &Query,
    ) -> TrendsReport {
        self.source.trends(keywords, time_range, query).await
    }

    /// Competing domains for a target domain
    pub async fn competitor_domains(&self, query: &Query) -> Vec<CompetitorRow> {
        self.source.competitor_domains(query).await
    }

    /// Keywords a competitor domain ranks for
    pub async fn ranked_keywords(&self, query: &Query) -> Vec<RankedKeywordRow> {
        self.source.ranked_keywords(query).await
    }

    /// On-page analysis with optimization commentary
    pub async fn analyze_content(&self, url: &str) -> OnPageReport {
        let mut report = self.source.onpage(url).await;
        if report.status_code != 0 {
            report.insights = self
                .narrative(&onpage_prompt(&report), INSIGHT_TOKENS, 0.3)
                .await;
        }
        report
    }

    /// Full domain-rankings report with AI recommendations when available
    pub async fn domain_report(&self, query: &Query) -> DomainReport {
        let keywords = self.source.ranked_keywords(query).await;
        let mut report = DomainReport::build(&seoscout_core::clean_domain(&query.seed), &keywords);

        if report.total_keywords > 0 {
            report.insights.ai_recommendations = self
                .narrative(&domain_prompt(&report), DOMAIN_INSIGHT_TOKENS, 0.3)
                .await;
        }
        report
    }

    /// Content brief built from the current SERP
    pub async fn content_brief(
        &self,
        keyword: &str,
        serp: &[SerpRow],
        audience: &str,
    ) -> Option<String> {
        self.narrative(&brief_prompt(keyword, serp, audience), BRIEF_TOKENS, 0.5)
            .await
    }

    /// Gather fresh provider data for a content draft
    pub async fn content_context(&self, keyword: &str, query: &Query) -> ContentResearch {
        let mut research = ContentResearch::default();

        let serp = self.source.serp(query).await;
        research.competitor_titles = serp.iter().take(3).map(|r| r.title.clone()).collect();

        let related = self.source.keyword_ideas(query).await;
        research.related_terms = related.iter().take(5).map(|r| r.keyword.clone()).collect();

        let trends = self
            .source
            .trends(&[keyword.to_string()], "past_12_months", query)
            .await;
        if trends.points.len() > 2 {
            let last = trends.points[trends.points.len() - 1].values.first().copied().unwrap_or(0);
            let prior = trends.points[trends.points.len() - 3].values.first().copied().unwrap_or(0);
            research.trending = Some(if last > prior { "up" } else { "stable" }.to_string());
        }

        research
    }
}

/// Apply volume/difficulty filters client-side
pub fn apply_filters(rows: Vec<KeywordRow>, query: &Query) -> Vec<KeywordRow> {
    rows.into_iter()
        .filter(|row| query.filters.passes(row.search_volume, row.difficulty))
        .collect()
}

/// Group keywords by likely search intent
pub fn cluster_keywords(rows: &[KeywordRow]) -> KeywordClusters {
    const INFORMATIONAL: &[&str] = &["what", "how", "why", "guide", "tutorial"];
    const COMMERCIAL: &[&str] = &["buy", "price", "cost", "cheap", "best", "review"];
    const NAVIGATIONAL: &[&str] = &["login", "download", "site:", "brand"];

    let mut clusters = KeywordClusters::default();
    for row in rows {
        let text = row.keyword.to_lowercase();
        if INFORMATIONAL.iter().any(|w| text.contains(w)) {
            clusters.informational.push(row.keyword.clone());
        } else if COMMERCIAL.iter().any(|w| text.contains(w)) {
            clusters.commercial.push(row.keyword.clone());
        } else if NAVIGATIONAL.iter().any(|w| text.contains(w)) {
            clusters.navigational.push(row.keyword.clone());
        } else {
            clusters.other.push(row.keyword.clone());
        }
    }
    clusters
}

fn keyword_prompt(rows: &[KeywordRow], seed: &str) -> String {
    let keywords_text: String = rows
        .iter()
        .take(20)
        .map(|kw| {
            format!(
                "- {} (Volume: {}, Difficulty: {})",
                kw.keyword, kw.search_volume, kw.difficulty
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an SEO expert analyzing keywords for "{seed}".

Keywords to analyze:
{keywords_text}

Please provide:
1. Top 3 keyword opportunities (highest potential with reasonable difficulty)
2. Content gap analysis
3. Keyword clustering by intent (informational, commercial, navigational)
4. Recommendations for content strategy

Format your response as clear, actionable insights."#
    )
}

fn content_gap_prompt(row: &SerpRow, keyword: &str) -> String {
    format!(
        r#"Analyze this SERP result for keyword "{}":

Title: {}
Description: {}
URL: {}

Provide a brief content gap analysis in one sentence."#,
        keyword, row.title, row.description, row.url
    )
}

fn onpage_prompt(report: &OnPageReport) -> String {
    format!(
        r#"Analyze this website content data and provide SEO optimization insights:

**Page Details:**
- Title: {}
- Meta Description: {}
- URL: {}
- OnPage Score: {:.0}/100

**Content Metrics:**
- Word Count: {}
- Internal Links: {}
- External Links: {}
- Images: {}

**Technical SEO:**
- Page Load Time: {:.0}ms
- HTTPS: {}

Please provide:
1. **Analysis Summary** - Overall assessment of the page's SEO health
2. **Critical Issues** - High-priority problems that need immediate attention
3. **Optimization Recommendations** - 5-7 specific, actionable improvements
4. **Content Strategy** - Suggestions for content enhancement
5. **Technical Improvements** - Performance and technical SEO recommendations

Format your response with clear headers and bullet points for readability."#,
        report.title.as_deref().unwrap_or("N/A"),
        report.meta_description.as_deref().unwrap_or("N/A"),
        report.url,
        report.onpage_score,
        report.word_count,
        report.internal_links,
        report.external_links,
        report.images,
        report.load_time_ms,
        if report.url.starts_with("https://") { "Yes" } else { "No" },
    )
}

fn domain_prompt(report: &DomainReport) -> String {
    format!(
        r#"Analyze this domain's SEO performance:
- Total Keywords: {}
- Estimated Traffic: {:.0} visits/month
- Average Position: {:.1}
- Top 3 positions: {} keywords
- Positions 11-20: {} keywords

Provide 3 concise, actionable recommendations to improve traffic. Keep each recommendation under 100 words."#,
        report.total_keywords,
        report.total_traffic,
        report.avg_position,
        report.distribution.top_3,
        report.distribution.positions_11_20,
    )
}

fn brief_prompt(keyword: &str, serp: &[SerpRow], audience: &str) -> String {
    let serp_text: String = serp
        .iter()
        .take(5)
        .map(|r| format!("- {} ({})", r.title, r.url))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Create a content brief for the keyword "{keyword}" targeting {audience} audience.

Current top-ranking pages:
{serp_text}

Please provide:
1. Content title suggestions (3 options)
2. Key topics to cover
3. Content structure outline
4. Word count recommendation
5. Content angle to differentiate from competitors
6. Call-to-action suggestions

Make the brief practical and actionable for content creators."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LlmBackend, LlmError};
    use async_trait::async_trait;
    use seoscout_core::{Filters, KeywordKind};
    use seoscout_data::{BridgeConfig, McpBridge, RestClient, RestConfig};
    use std::sync::Arc;

    struct MockBackend;

    #[async_trait]
    impl LlmBackend for MockBackend {
        async fn generate(
            &self,
            prompt: &str,
            _max_tokens: u16,
            _temperature: f32,
        ) -> Result<String, LlmError> {
            Ok(format!("analysis of: {}", prompt.len()))
        }

        fn model_name(&self) -> &str {
            "mock"
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl LlmBackend for FailingBackend {
        async fn generate(
            &self,
            _prompt: &str,
            _max_tokens: u16,
            _temperature: f32,
        ) -> Result<String, LlmError> {
            Err(LlmError::Api("gateway down".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    fn offline_source() -> DataSource {
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

    fn row(keyword: &str, volume: u64, difficulty: u32) -> KeywordRow {
        KeywordRow {
            keyword: keyword.to_string(),
            search_volume: volume,
            difficulty,
            cpc: 1.0,
            competition: difficulty as f64 / 100.0,
            kind: KeywordKind::Generic,
        }
    }

    #[test]
    fn test_apply_filters() {
        let query = Query::new("seo").with_filters(Filters {
            min_volume: 100,
            max_difficulty: 70,
        });
        let rows = vec![
            row("keeper", 100, 70),
            row("too quiet", 99, 10),
            row("too hard", 9000, 71),
        ];
        let kept = apply_filters(rows, &query);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].keyword, "keeper");
    }

    #[test]
    fn test_cluster_keywords() {
        let rows = vec![
            row("how to garden", 0, 0),
            row("buy garden tools", 0, 0),
            row("gardenco login", 0, 0),
            row("roses", 0, 0),
        ];
        let clusters = cluster_keywords(&rows);
        assert_eq!(clusters.informational, vec!["how to garden"]);
        assert_eq!(clusters.commercial, vec!["buy garden tools"]);
        assert_eq!(clusters.navigational, vec!["gardenco login"]);
        assert_eq!(clusters.other, vec!["roses"]);
    }

    #[test]
    fn test_keyword_prompt_caps_at_twenty() {
        let rows: Vec<KeywordRow> = (0..30).map(|i| row(&format!("kw{}", i), 100, 10)).collect();
        let prompt = keyword_prompt(&rows, "seed");
        assert!(prompt.contains("kw19"));
        assert!(!prompt.contains("kw25"));
    }

    #[tokio::test]
    async fn test_no_rows_means_no_analysis() {
        // Offline source yields no rows; there is nothing to analyze and the
        // backend must not be asked to invent commentary
        let agent = ResearchAgent::new(offline_source(), Some(Arc::new(MockBackend)));
        let outcome = agent.research_keywords(&Query::new("anything"), true).await;
        assert!(outcome.rows.is_empty());
        assert!(outcome.analysis.is_none());
    }

    #[tokio::test]
    async fn test_llm_failure_degrades_to_none() {
        let agent = ResearchAgent::new(offline_source(), Some(Arc::new(FailingBackend)));
        let brief = agent.content_brief("seo", &[], "general").await;
        assert!(brief.is_none());
    }

    #[tokio::test]
    async fn test_brief_with_working_backend() {
        let agent = ResearchAgent::new(offline_source(), Some(Arc::new(MockBackend)));
        let brief = agent.content_brief("seo", &[], "general").await;
        assert!(brief.is_some());
    }

    #[tokio::test]
    async fn test_no_backend_means_no_narrative() {
        let agent = ResearchAgent::new(offline_source(), None);
        let brief = agent.content_brief("seo", &[], "general").await;
        assert!(brief.is_none());
    }
}
