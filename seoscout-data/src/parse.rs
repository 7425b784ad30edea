//! Provider response mapping
//!
//! Both retrieval paths (MCP bridge and REST) hand back the same item JSON;
//! everything here turns those items into typed rows. Missing fields default
//! rather than fail - a degraded upstream yields partially populated rows,
//! never an error.

use std::collections::BTreeMap;

use serde_json::Value;

use seoscout_core::{
    CompetitorRow, KeywordKind, KeywordRow, MonthlyVolume, OnPageReport, RankedKeywordRow,
    SerpRow, TrendPoint, TrendsReport, VolumeRow, SERP_DEPTH,
};

fn str_of(value: &Value, key: &str) -> String {
    value.get(key).and_then(Value::as_str).unwrap_or("").to_string()
}

fn u64_of(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn f64_of(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Keyword ideas from a DataForSEO Labs response
pub fn keyword_items(items: &[Value], seed: &str) -> Vec<KeywordRow> {
    items
        .iter()
        .filter_map(|item| {
            let keyword = str_of(item, "keyword");
            if keyword.is_empty() {
                return None;
            }
            let info = item.get("keyword_info")?;
            let competition = f64_of(info, "competition");
            // Labs items carry an explicit difficulty; older shapes only have
            // competition, which scales to the same 0-100 range
            let difficulty = item
                .get("keyword_properties")
                .and_then(|p| p.get("keyword_difficulty"))
                .and_then(Value::as_u64)
                .unwrap_or_else(|| (competition * 100.0).round() as u64)
                as u32;

            Some(KeywordRow {
                kind: KeywordKind::classify(&keyword, seed),
                keyword,
                search_volume: u64_of(info, "search_volume"),
                difficulty,
                cpc: f64_of(info, "cpc"),
                competition,
            })
        })
        .collect()
}

/// Organic SERP entries (featured snippets surface at position 0)
pub fn serp_items(items: &[Value]) -> Vec<SerpRow> {
    let mut rows: Vec<SerpRow> = items
        .iter()
        .filter_map(|item| {
            let position = match item.get("type").and_then(Value::as_str) {
                Some("organic") => item
                    .get("rank_group")
                    .or_else(|| item.get("rank_absolute"))
                    .and_then(Value::as_u64)
                    .unwrap_or(0) as u32,
                Some("featured_snippet") => 0,
                _ => return None,
            };
            Some(SerpRow {
                position,
                title: str_of(item, "title"),
                url: str_of(item, "url"),
                description: str_of(item, "description"),
                domain: str_of(item, "domain"),
                insight: None,
            })
        })
        .collect();

    rows.sort_by_key(|r| r.position);
    rows.truncate(SERP_DEPTH);
    rows
}

/// Search-volume rows with monthly history
pub fn volume_items(items: &[Value]) -> Vec<VolumeRow> {
    items
        .iter()
        .filter_map(|item| {
            let keyword = str_of(item, "keyword");
            if keyword.is_empty() {
                return None;
            }
            let monthly = item
                .get("monthly_searches")
                .and_then(Value::as_array)
                .map(|months| {
                    months
                        .iter()
                        .map(|m| MonthlyVolume {
                            year: m.get("year").and_then(Value::as_i64).unwrap_or(0) as i32,
                            month: u64_of(m, "month") as u32,
                            search_volume: u64_of(m, "search_volume"),
                        })
                        .collect()
                })
                .unwrap_or_default();

            Some(VolumeRow {
                keyword,
                search_volume: u64_of(item, "search_volume"),
                competition: f64_of(item, "competition"),
                cpc: f64_of(item, "cpc"),
                monthly,
                note: None,
            })
        })
        .collect()
}

/// Competitor domains; the provider lists the target domain first, so the
/// leading item is skipped
pub fn competitor_items(items: &[Value]) -> Vec<CompetitorRow> {
    items
        .iter()
        .skip(1)
        .filter_map(|item| {
            let domain = str_of(item, "domain");
            if domain.is_empty() {
                return None;
            }
            let etv = item
                .get("metrics")
                .and_then(|m| m.get("organic"))
                .map(|o| f64_of(o, "etv"))
                .unwrap_or(0.0);
            Some(CompetitorRow {
                domain,
                avg_position: f64_of(item, "avg_position"),
                sum_position: u64_of(item, "sum_position"),
                intersections: u64_of(item, "intersections"),
                relevant_serp_items: u64_of(item, "relevant_serp_items"),
                etv,
            })
        })
        .collect()
}

/// Keywords a domain ranks for
pub fn ranked_items(items: &[Value]) -> Vec<RankedKeywordRow> {
    items
        .iter()
        .filter_map(|item| {
            let keyword_data = item.get("keyword_data")?;
            let keyword = str_of(keyword_data, "keyword");
            if keyword.is_empty() {
                return None;
            }
            let serp_item = item
                .get("ranked_serp_element")
                .and_then(|e| e.get("serp_item"));
            let search_volume = keyword_data
                .get("keyword_info")
                .map(|i| u64_of(i, "search_volume"))
                .unwrap_or(0);

            Some(RankedKeywordRow {
                keyword,
                position: serp_item.map(|s| u64_of(s, "rank_group")).unwrap_or(0) as u32,
                search_volume,
                url: serp_item.map(|s| str_of(s, "url")).unwrap_or_default(),
                etv: serp_item.map(|s| f64_of(s, "etv")).unwrap_or(0.0),
            })
        })
        .collect()
}

/// Google Trends interest-over-time data for the submitted keywords
pub fn trends_result(items: &[Value], keywords: &[String]) -> TrendsReport {
    let mut report = TrendsReport {
        keywords: keywords.to_vec(),
        ..Default::default()
    };

    let Some(data) = items.first().and_then(|i| i.get("data")) else {
        return report;
    };

    if let Some(timeline) = data
        .get("interest_over_time")
        .and_then(|t| t.get("timeline_data"))
        .and_then(Value::as_array)
    {
        for point in timeline {
            let values = point
                .get("values")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            // Skip points the provider flags as missing
            let missing = values
                .first()
                .and_then(|v| v.get("missing_data"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if missing {
                continue;
            }
            report.points.push(TrendPoint {
                date: str_of(point, "date_from"),
                values: values.iter().map(|v| u64_of(v, "value")).collect(),
            });
        }
    }

    if let Some(related) = data.get("related_queries").and_then(Value::as_object) {
        for list in related.values() {
            if let Some(entries) = list.as_array() {
                for entry in entries {
                    let query = entry
                        .as_str()
                        .map(str::to_string)
                        .or_else(|| entry.get("query").and_then(Value::as_str).map(str::to_string));
                    if let Some(query) = query {
                        report.related_queries.push(query);
                    }
                }
            }
        }
    }

    report
}

/// On-page analysis of a single URL
pub fn onpage_result(items: &[Value], url: &str) -> OnPageReport {
    let mut report = OnPageReport {
        url: url.to_string(),
        ..Default::default()
    };

    let Some(page) = items.first() else {
        return report;
    };

    report.status_code = u64_of(page, "status_code") as u32;

    let result = page.get("onpage_result").unwrap_or(page);
    report.onpage_score = f64_of(result, "onpage_score");
    report.word_count = u64_of(result, "word_count");
    report.images = u64_of(result, "images_count");
    report.internal_links = u64_of(result, "internal_links_count");
    report.external_links = u64_of(result, "external_links_count");
    report.readability = f64_of(result, "flesch_kincaid_readability");

    if let Some(meta) = result.get("meta") {
        report.title = meta.get("title").and_then(Value::as_str).map(str::to_string);
        report.meta_description = meta
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);
    }
    if let Some(timing) = result.get("page_timing") {
        report.load_time_ms = f64_of(timing, "duration_time");
    }
    if let Some(checks) = result.get("checks").and_then(Value::as_object) {
        report.checks = checks
            .iter()
            .filter_map(|(k, v)| v.as_bool().map(|b| (k.clone(), b)))
            .collect::<BTreeMap<_, _>>();
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyword_items_with_labs_difficulty() {
        let items = vec![json!({
            "keyword": "seo audit",
            "keyword_info": {"search_volume": 2400, "competition": 0.45, "cpc": 4.2},
            "keyword_properties": {"keyword_difficulty": 38}
        })];
        let rows = keyword_items(&items, "seo");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].difficulty, 38);
        assert_eq!(rows[0].search_volume, 2400);
        assert_eq!(rows[0].kind, KeywordKind::Related);
    }

    #[test]
    fn test_keyword_items_difficulty_from_competition() {
        let items = vec![json!({
            "keyword": "cheap flights",
            "keyword_info": {"search_volume": 100000, "competition": 0.87, "cpc": 1.5}
        })];
        let rows = keyword_items(&items, "flights");
        assert_eq!(rows[0].difficulty, 87);
    }

    #[test]
    fn test_keyword_items_skips_incomplete() {
        let items = vec![
            json!({"keyword": "no info"}),
            json!({"keyword_info": {"search_volume": 10}}),
        ];
        assert!(keyword_items(&items, "seed").is_empty());
    }

    #[test]
    fn test_serp_items_organic_only_sorted_capped() {
        let mut items: Vec<Value> = (1..=12)
            .rev()
            .map(|i| {
                json!({
                    "type": "organic",
                    "rank_group": i,
                    "title": format!("Result {}", i),
                    "url": format!("https://example.com/{}", i),
                    "description": "",
                    "domain": "example.com"
                })
            })
            .collect();
        items.push(json!({"type": "paid", "rank_group": 1, "title": "Ad"}));
        items.push(json!({
            "type": "featured_snippet",
            "title": "Snippet",
            "url": "https://snippet.example.com",
            "domain": "snippet.example.com"
        }));

        let rows = serp_items(&items);
        assert_eq!(rows.len(), SERP_DEPTH);
        assert_eq!(rows[0].position, 0);
        assert_eq!(rows[0].title, "Snippet");
        assert_eq!(rows[1].position, 1);
        assert!(rows.iter().all(|r| r.title != "Ad"));
    }

    #[test]
    fn test_volume_items_monthly() {
        let items = vec![json!({
            "keyword": "running shoes",
            "search_volume": 60500,
            "competition": 0.9,
            "cpc": 1.1,
            "monthly_searches": [
                {"year": 2024, "month": 4, "search_volume": 74000},
                {"year": 2024, "month": 3, "search_volume": 60500}
            ]
        })];
        let rows = volume_items(&items);
        assert_eq!(rows[0].monthly.len(), 2);
        assert_eq!(rows[0].monthly[0].search_volume, 74000);
    }

    #[test]
    fn test_competitor_items_skips_target() {
        let items = vec![
            json!({"domain": "target.com", "avg_position": 1.0}),
            json!({
                "domain": "rival.com",
                "avg_position": 12.4,
                "sum_position": 620,
                "intersections": 48,
                "relevant_serp_items": 95,
                "metrics": {"organic": {"etv": 15230.5}}
            }),
        ];
        let rows = competitor_items(&items);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].domain, "rival.com");
        assert!((rows[0].etv - 15230.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ranked_items() {
        let items = vec![json!({
            "keyword_data": {
                "keyword": "trail shoes",
                "keyword_info": {"search_volume": 8100}
            },
            "ranked_serp_element": {
                "serp_item": {"rank_group": 4, "url": "https://example.com/trail", "etv": 412.7}
            }
        })];
        let rows = ranked_items(&items);
        assert_eq!(rows[0].position, 4);
        assert_eq!(rows[0].search_volume, 8100);
        assert_eq!(rows[0].url, "https://example.com/trail");
    }

    #[test]
    fn test_trends_result_skips_missing_points() {
        let keywords = vec!["seo".to_string(), "sem".to_string()];
        let items = vec![json!({
            "data": {
                "interest_over_time": {
                    "timeline_data": [
                        {"date_from": "2024-01-01", "values": [{"value": 60}, {"value": 40}]},
                        {"date_from": "2024-01-08", "values": [{"value": 0, "missing_data": true}]},
                        {"date_from": "2024-01-15", "values": [{"value": 72}, {"value": 35}]}
                    ]
                },
                "related_queries": {
                    "top": [{"query": "seo tools"}, {"query": "seo checker"}]
                }
            }
        })];
        let report = trends_result(&items, &keywords);
        assert_eq!(report.points.len(), 2);
        assert_eq!(report.points[0].values, vec![60, 40]);
        assert_eq!(report.related_queries, vec!["seo tools", "seo checker"]);
    }

    #[test]
    fn test_trends_result_empty() {
        let report = trends_result(&[], &["seo".to_string()]);
        assert!(report.points.is_empty());
        assert_eq!(report.keywords, vec!["seo"]);
    }

    #[test]
    fn test_onpage_result() {
        let items = vec![json!({
            "status_code": 200,
            "onpage_result": {
                "onpage_score": 84.3,
                "word_count": 1840,
                "images_count": 12,
                "internal_links_count": 30,
                "external_links_count": 8,
                "flesch_kincaid_readability": 61.2,
                "meta": {"title": "Example Page", "description": "A page"},
                "page_timing": {"duration_time": 742.0},
                "checks": {"has_https": true, "no_title": false}
            }
        })];
        let report = onpage_result(&items, "https://example.com");
        assert_eq!(report.status_code, 200);
        assert_eq!(report.word_count, 1840);
        assert_eq!(report.title.as_deref(), Some("Example Page"));
        assert_eq!(report.checks.get("has_https"), Some(&true));
        assert!((report.load_time_ms - 742.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_onpage_result_empty_items() {
        let report = onpage_result(&[], "https://example.com");
        assert_eq!(report.url, "https://example.com");
        assert_eq!(report.status_code, 0);
    }
}
