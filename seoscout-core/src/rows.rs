//! Result rows for each analysis category
//!
//! Fields mirror what the provider returns and may be partially populated
//! when an upstream response degrades.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::export::Table;

/// Analysis categories a session can hold results for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    KeywordIdeas,
    SerpResults,
    SearchVolume,
    CompetitorDomains,
    RankedKeywords,
    Trends,
    OnPage,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::KeywordIdeas => "keyword ideas",
            Category::SerpResults => "SERP results",
            Category::SearchVolume => "search volume",
            Category::CompetitorDomains => "competitor domains",
            Category::RankedKeywords => "ranked keywords",
            Category::Trends => "trends",
            Category::OnPage => "on-page analysis",
        }
    }
}

/// Structural classification of a keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordKind {
    Question,
    Comparison,
    LongTail,
    Related,
    Generic,
}

impl KeywordKind {
    /// Classify a keyword relative to the seed it was suggested for
    pub fn classify(keyword: &str, seed: &str) -> Self {
        let keyword_lower = keyword.to_lowercase();
        let seed_lower = seed.to_lowercase();

        const QUESTION_WORDS: &[&str] = &["what", "how", "why", "when", "where", "which", "who"];
        const COMPARISON_WORDS: &[&str] = &["vs", "versus", "compare", "best", "top"];

        if QUESTION_WORDS.iter().any(|q| keyword_lower.contains(q)) {
            return KeywordKind::Question;
        }
        if COMPARISON_WORDS.iter().any(|c| keyword_lower.contains(c)) {
            return KeywordKind::Comparison;
        }
        if keyword.split_whitespace().count() >= 4 {
            return KeywordKind::LongTail;
        }
        if !seed_lower.is_empty()
            && keyword_lower.contains(&seed_lower)
            && keyword_lower != seed_lower
        {
            return KeywordKind::Related;
        }
        KeywordKind::Generic
    }

    pub fn label(&self) -> &'static str {
        match self {
            KeywordKind::Question => "Question",
            KeywordKind::Comparison => "Comparison",
            KeywordKind::LongTail => "Long-tail",
            KeywordKind::Related => "Related",
            KeywordKind::Generic => "Generic",
        }
    }
}

/// One suggested keyword with provider metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRow {
    pub keyword: String,
    pub search_volume: u64,
    /// Difficulty score 0-100
    pub difficulty: u32,
    pub cpc: f64,
    pub competition: f64,
    pub kind: KeywordKind,
}

/// One organic SERP entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpRow {
    pub position: u32,
    pub title: String,
    pub url: String,
    pub description: String,
    pub domain: String,
    /// Content-gap note added by the research agent, when available
    pub insight: Option<String>,
}

/// Monthly search volume data point
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MonthlyVolume {
    pub year: i32,
    pub month: u32,
    pub search_volume: u64,
}

/// Search-volume metrics for one keyword
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeRow {
    pub keyword: String,
    pub search_volume: u64,
    pub competition: f64,
    pub cpc: f64,
    /// Raw monthly history, most recent first
    pub monthly: Vec<MonthlyVolume>,
    /// Provider hint, e.g. when a query was too specific for volume data
    pub note: Option<String>,
}

impl VolumeRow {
    /// Human-readable summary of the three most recent months
    pub fn monthly_summary(&self) -> String {
        if self.monthly.is_empty() {
            return "No data".to_string();
        }
        self.monthly
            .iter()
            .take(3)
            .map(|m| format!("{}-{:02}: {}", m.year, m.month, m.search_volume))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One competing domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorRow {
    pub domain: String,
    pub avg_position: f64,
    pub sum_position: u64,
    /// Keywords shared with the target domain
    pub intersections: u64,
    pub relevant_serp_items: u64,
    /// Estimated traffic value of the domain's organic positions
    pub etv: f64,
}

/// One keyword a domain ranks for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedKeywordRow {
    pub keyword: String,
    pub position: u32,
    pub search_volume: u64,
    pub url: String,
    pub etv: f64,
}

/// One point on the interest-over-time curve, values aligned with
/// [`TrendsReport::keywords`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub values: Vec<u64>,
}

/// Google Trends interest data for up to five keywords
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendsReport {
    pub keywords: Vec<String>,
    pub points: Vec<TrendPoint>,
    pub related_queries: Vec<String>,
    /// Set when the submitted keywords were simplified first
    pub note: Option<String>,
}

/// On-page analysis of a single URL
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnPageReport {
    pub url: String,
    pub status_code: u32,
    pub onpage_score: f64,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub word_count: u64,
    pub internal_links: u64,
    pub external_links: u64,
    pub images: u64,
    pub load_time_ms: f64,
    pub readability: f64,
    /// Pass/fail SEO checks as reported by the provider
    pub checks: BTreeMap<String, bool>,
    /// Optimization commentary from the research agent, when available
    pub insights: Option<String>,
}

/// The latest result set for one analysis category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "category", content = "results", rename_all = "snake_case")]
pub enum ResultSet {
    Keywords(Vec<KeywordRow>),
    Serp(Vec<SerpRow>),
    Volume(Vec<VolumeRow>),
    Competitors(Vec<CompetitorRow>),
    Ranked(Vec<RankedKeywordRow>),
    Trends(TrendsReport),
    OnPage(OnPageReport),
}

impl ResultSet {
    pub fn category(&self) -> Category {
        match self {
            ResultSet::Keywords(_) => Category::KeywordIdeas,
            ResultSet::Serp(_) => Category::SerpResults,
            ResultSet::Volume(_) => Category::SearchVolume,
            ResultSet::Competitors(_) => Category::CompetitorDomains,
            ResultSet::Ranked(_) => Category::RankedKeywords,
            ResultSet::Trends(_) => Category::Trends,
            ResultSet::OnPage(_) => Category::OnPage,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ResultSet::Keywords(rows) => rows.len(),
            ResultSet::Serp(rows) => rows.len(),
            ResultSet::Volume(rows) => rows.len(),
            ResultSet::Competitors(rows) => rows.len(),
            ResultSet::Ranked(rows) => rows.len(),
            ResultSet::Trends(report) => report.points.len(),
            ResultSet::OnPage(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into a displayable/exportable table
    pub fn to_table(&self) -> Table {
        match self {
            ResultSet::Keywords(rows) => Table::new(
                &["Keyword", "Search Volume", "Difficulty", "CPC", "Competition", "Type"],
                rows.iter()
                    .map(|r| {
                        vec![
                            r.keyword.clone(),
                            r.search_volume.to_string(),
                            r.difficulty.to_string(),
                            format!("{:.2}", r.cpc),
                            format!("{:.3}", r.competition),
                            r.kind.label().to_string(),
                        ]
                    })
                    .collect(),
            ),
            ResultSet::Serp(rows) => Table::new(
                &["Position", "Title", "URL", "Domain", "Description"],
                rows.iter()
                    .map(|r| {
                        vec![
                            r.position.to_string(),
                            r.title.clone(),
                            r.url.clone(),
                            r.domain.clone(),
                            r.description.clone(),
                        ]
                    })
                    .collect(),
            ),
            ResultSet::Volume(rows) => Table::new(
                &["Keyword", "Search Volume", "Competition", "CPC", "Monthly Searches"],
                rows.iter()
                    .map(|r| {
                        vec![
                            r.keyword.clone(),
                            r.search_volume.to_string(),
                            format!("{:.3}", r.competition),
                            format!("{:.2}", r.cpc),
                            r.monthly_summary(),
                        ]
                    })
                    .collect(),
            ),
            ResultSet::Competitors(rows) => Table::new(
                &["Domain", "Avg Position", "Intersections", "SERP Items", "ETV"],
                rows.iter()
                    .map(|r| {
                        vec![
                            r.domain.clone(),
                            format!("{:.1}", r.avg_position),
                            r.intersections.to_string(),
                            r.relevant_serp_items.to_string(),
                            format!("{:.2}", r.etv),
                        ]
                    })
                    .collect(),
            ),
            ResultSet::Ranked(rows) => Table::new(
                &["Keyword", "Position", "Search Volume", "ETV", "URL"],
                rows.iter()
                    .map(|r| {
                        vec![
                            r.keyword.clone(),
                            r.position.to_string(),
                            r.search_volume.to_string(),
                            format!("{:.2}", r.etv),
                            r.url.clone(),
                        ]
                    })
                    .collect(),
            ),
            ResultSet::Trends(report) => {
                let mut headers = vec!["Date".to_string()];
                headers.extend(report.keywords.iter().cloned());
                Table::with_headers(
                    headers,
                    report
                        .points
                        .iter()
                        .map(|p| {
                            let mut row = vec![p.date.clone()];
                            row.extend(p.values.iter().map(|v| v.to_string()));
                            row
                        })
                        .collect(),
                )
            }
            ResultSet::OnPage(report) => Table::new(
                &[
                    "URL",
                    "Status",
                    "OnPage Score",
                    "Word Count",
                    "Internal Links",
                    "External Links",
                    "Images",
                    "Load Time (ms)",
                ],
                vec![vec![
                    report.url.clone(),
                    report.status_code.to_string(),
                    format!("{:.1}", report.onpage_score),
                    report.word_count.to_string(),
                    report.internal_links.to_string(),
                    report.external_links.to_string(),
                    report.images.to_string(),
                    format!("{:.0}", report.load_time_ms),
                ]],
            ),
        }
    }
}
