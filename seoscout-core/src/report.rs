//! Domain-rankings report
//!
//! Aggregates a domain's ranked keywords into position buckets, traffic
//! totals, quick-win candidates, and heuristic insights. All computation is
//! local; the AI recommendation slot is filled by the research agent when the
//! LLM call succeeds.

use serde::{Deserialize, Serialize};

use crate::RankedKeywordRow;

/// Quick wins must clear this monthly volume
pub const QUICK_WIN_MIN_VOLUME: u64 = 100;

/// How many ranked keywords fall in each position bucket
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PositionDistribution {
    pub top_3: usize,
    pub top_10: usize,
    pub positions_11_20: usize,
    pub positions_21_50: usize,
    pub beyond_50: usize,
}

/// Heuristic commentary on a domain's rankings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainInsights {
    pub summary: String,
    pub strengths: Vec<String>,
    pub opportunities: Vec<String>,
    pub recommendations: Vec<String>,
    /// LLM-generated recommendations, absent when the gateway is unavailable
    pub ai_recommendations: Option<String>,
}

/// Aggregated rankings report for one domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainReport {
    pub domain: String,
    pub total_keywords: usize,
    /// Sum of estimated traffic values across ranked keywords
    pub total_traffic: f64,
    pub total_search_volume: u64,
    pub avg_position: f64,
    pub distribution: PositionDistribution,
    /// Ranked keywords sorted by traffic value, top ten
    pub top_traffic: Vec<RankedKeywordRow>,
    /// Positions 11-20 with meaningful volume, best candidates for page one
    pub quick_wins: Vec<RankedKeywordRow>,
    pub insights: DomainInsights,
}

impl DomainReport {
    /// Build a report from a domain's ranked keywords
    pub fn build(domain: &str, keywords: &[RankedKeywordRow]) -> Self {
        if keywords.is_empty() {
            return Self {
                domain: domain.to_string(),
                total_keywords: 0,
                total_traffic: 0.0,
                total_search_volume: 0,
                avg_position: 0.0,
                distribution: PositionDistribution::default(),
                top_traffic: Vec::new(),
                quick_wins: Vec::new(),
                insights: DomainInsights {
                    summary: format!("No ranked keywords found for {}", domain),
                    ..Default::default()
                },
            };
        }

        let total_traffic: f64 = keywords.iter().map(|k| k.etv).sum();
        let total_search_volume: u64 = keywords.iter().map(|k| k.search_volume).sum();
        let avg_position =
            keywords.iter().map(|k| k.position as f64).sum::<f64>() / keywords.len() as f64;

        let mut distribution = PositionDistribution::default();
        for kw in keywords {
            match kw.position {
                0..=3 => distribution.top_3 += 1,
                4..=10 => distribution.top_10 += 1,
                11..=20 => distribution.positions_11_20 += 1,
                21..=50 => distribution.positions_21_50 += 1,
                _ => distribution.beyond_50 += 1,
            }
        }

        let mut top_traffic: Vec<RankedKeywordRow> = keywords.to_vec();
        top_traffic.sort_by(|a, b| b.etv.partial_cmp(&a.etv).unwrap_or(std::cmp::Ordering::Equal));
        top_traffic.truncate(10);

        let mut quick_wins: Vec<RankedKeywordRow> = keywords
            .iter()
            .filter(|k| (11..=20).contains(&k.position) && k.search_volume > QUICK_WIN_MIN_VOLUME)
            .cloned()
            .collect();
        quick_wins.sort_by(|a, b| b.search_volume.cmp(&a.search_volume));
        quick_wins.truncate(10);

        let insights = Self::heuristic_insights(
            domain,
            keywords.len(),
            total_traffic,
            avg_position,
            &distribution,
        );

        Self {
            domain: domain.to_string(),
            total_keywords: keywords.len(),
            total_traffic: (total_traffic * 100.0).round() / 100.0,
            total_search_volume,
            avg_position: (avg_position * 10.0).round() / 10.0,
            distribution,
            top_traffic,
            quick_wins,
            insights,
        }
    }

    fn heuristic_insights(
        domain: &str,
        keyword_count: usize,
        total_traffic: f64,
        avg_position: f64,
        distribution: &PositionDistribution,
    ) -> DomainInsights {
        let mut insights = DomainInsights {
            summary: format!(
                "{} ranks for {} keywords with estimated traffic of {:.0} visits/month",
                domain, keyword_count, total_traffic
            ),
            ..Default::default()
        };

        if distribution.top_3 > 5 {
            insights.strengths.push(format!(
                "Strong presence with {} keywords in top 3 positions",
                distribution.top_3
            ));
        }
        if total_traffic > 1000.0 {
            insights.strengths.push(format!(
                "Healthy traffic flow with {:.0} estimated monthly visits",
                total_traffic
            ));
        }

        if distribution.positions_11_20 > 0 {
            insights.opportunities.push(format!(
                "{} keywords ranking 11-20 can be pushed to page 1",
                distribution.positions_11_20
            ));
        }
        if avg_position > 20.0 {
            insights
                .opportunities
                .push("Average position is low - focus on optimization".to_string());
        }

        if distribution.top_3 < 3 {
            insights
                .recommendations
                .push("Focus on moving top 10 keywords to top 3 positions".to_string());
        }
        if distribution.positions_11_20 > 5 {
            insights
                .recommendations
                .push("Prioritize content optimization for position 11-20 keywords".to_string());
        }

        insights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(keyword: &str, position: u32, search_volume: u64, etv: f64) -> RankedKeywordRow {
        RankedKeywordRow {
            keyword: keyword.to_string(),
            position,
            search_volume,
            url: format!("https://example.com/{}", keyword.replace(' ', "-")),
            etv,
        }
    }

    #[test]
    fn test_empty_report() {
        let report = DomainReport::build("example.com", &[]);
        assert_eq!(report.total_keywords, 0);
        assert_eq!(report.total_traffic, 0.0);
        assert!(report.quick_wins.is_empty());
        assert!(report.insights.summary.contains("example.com"));
    }

    #[test]
    fn test_distribution_buckets() {
        let keywords = vec![
            row("a", 1, 500, 100.0),
            row("b", 3, 400, 80.0),
            row("c", 7, 300, 40.0),
            row("d", 15, 2000, 10.0),
            row("e", 35, 100, 5.0),
            row("f", 80, 50, 1.0),
        ];
        let report = DomainReport::build("example.com", &keywords);
        assert_eq!(report.distribution.top_3, 2);
        assert_eq!(report.distribution.top_10, 1);
        assert_eq!(report.distribution.positions_11_20, 1);
        assert_eq!(report.distribution.positions_21_50, 1);
        assert_eq!(report.distribution.beyond_50, 1);
        assert_eq!(report.total_keywords, 6);
    }

    #[test]
    fn test_quick_wins_filter_and_order() {
        let keywords = vec![
            row("low volume", 12, 50, 1.0),
            row("good candidate", 15, 2000, 10.0),
            row("better candidate", 18, 5000, 12.0),
            row("top ranked", 2, 9000, 300.0),
        ];
        let report = DomainReport::build("example.com", &keywords);
        // Position 11-20 and volume > 100 only, sorted by volume
        assert_eq!(report.quick_wins.len(), 2);
        assert_eq!(report.quick_wins[0].keyword, "better candidate");
        assert_eq!(report.quick_wins[1].keyword, "good candidate");
    }

    #[test]
    fn test_top_traffic_sorted() {
        let keywords = vec![
            row("small", 5, 100, 2.0),
            row("big", 9, 100, 50.0),
            row("medium", 4, 100, 10.0),
        ];
        let report = DomainReport::build("example.com", &keywords);
        assert_eq!(report.top_traffic[0].keyword, "big");
        assert_eq!(report.top_traffic[2].keyword, "small");
    }

    #[test]
    fn test_heuristic_insights() {
        let keywords: Vec<RankedKeywordRow> = (0..8)
            .map(|i| row(&format!("kw{}", i), 15, 1500, 300.0))
            .collect();
        let report = DomainReport::build("example.com", &keywords);
        assert!(!report.insights.opportunities.is_empty());
        assert!(report
            .insights
            .recommendations
            .iter()
            .any(|r| r.contains("11-20")));
        assert!(report.insights.ai_recommendations.is_none());
    }
}
