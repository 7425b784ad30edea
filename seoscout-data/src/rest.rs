//! DataForSEO REST client
//!
//! Direct calls against `api.dataforseo.com/v3`. Every endpoint takes an
//! array of tasks; we always submit exactly one and unwrap exactly one.
//! A `status_code` other than 20000 at either the envelope or the task level
//! is upstream-unavailable.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use seoscout_core::{
    clean_domain, normalize_url, prepare_keyword, CompetitorRow, KeywordRow, OnPageReport, Query,
    RankedKeywordRow, SerpRow, TrendsReport, VolumeRow, SERP_DEPTH, TRENDS_MAX_KEYWORDS,
};

use crate::{parse, DataError, PROVIDER_TIMEOUT_SECS, STATUS_OK};

/// REST client configuration
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// DataForSEO account login (DATAFORSEO_USERNAME)
    pub username: Option<String>,
    /// DataForSEO account password (DATAFORSEO_PASSWORD)
    pub password: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            username: std::env::var("DATAFORSEO_USERNAME").ok(),
            password: std::env::var("DATAFORSEO_PASSWORD").ok(),
            base_url: "https://api.dataforseo.com/v3".to_string(),
            timeout_secs: PROVIDER_TIMEOUT_SECS,
        }
    }
}

/// Direct DataForSEO REST API client
pub struct RestClient {
    client: Client,
    config: RestConfig,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status_code: u32,
    #[serde(default)]
    status_message: Option<String>,
    #[serde(default)]
    tasks: Vec<TaskEnvelope>,
}

#[derive(Debug, Deserialize)]
struct TaskEnvelope {
    status_code: u32,
    #[serde(default)]
    status_message: Option<String>,
    #[serde(default)]
    result: Option<Vec<Value>>,
}

/// Unwrap a response body down to its task result array
fn unwrap_envelope(body: Value) -> Result<Vec<Value>, DataError> {
    let envelope: Envelope = serde_json::from_value(body)
        .map_err(|e| DataError::Malformed(format!("response envelope: {}", e)))?;

    if envelope.status_code != STATUS_OK {
        return Err(DataError::Status {
            code: envelope.status_code,
            message: envelope.status_message.unwrap_or_default(),
        });
    }

    let task = envelope
        .tasks
        .into_iter()
        .next()
        .ok_or_else(|| DataError::Malformed("no tasks returned".to_string()))?;

    if task.status_code != STATUS_OK {
        return Err(DataError::Status {
            code: task.status_code,
            message: task.status_message.unwrap_or_default(),
        });
    }

    Ok(task.result.unwrap_or_default())
}

/// Items of the first result entry (the shape most endpoints use)
fn first_result_items(result: &[Value]) -> Vec<Value> {
    result
        .first()
        .and_then(|r| r.get("items"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

impl RestClient {
    pub fn new(config: RestConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Whether account credentials are available
    pub fn is_configured(&self) -> bool {
        self.config.username.is_some() && self.config.password.is_some()
    }

    async fn post_task(&self, endpoint: &str, task: Value) -> Result<Vec<Value>, DataError> {
        let (Some(username), Some(password)) = (&self.config.username, &self.config.password)
        else {
            return Err(DataError::NotConfigured);
        };

        let url = format!("{}/{}", self.config.base_url, endpoint);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .basic_auth(username, Some(password))
            .json(&json!([task]))
            .send()
            .await?;

        if !response.status().is_success() {
            let code = response.status().as_u16() as u32;
            let message: String = response.text().await.unwrap_or_default().chars().take(200).collect();
            return Err(DataError::Status { code, message });
        }

        let body: Value = response.json().await?;
        unwrap_envelope(body)
    }

    /// Keyword suggestions for a seed keyword
    pub async fn keyword_ideas(&self, query: &Query) -> Result<Vec<KeywordRow>, DataError> {
        let prepared = prepare_keyword(&query.seed);
        if prepared != query.seed {
            debug!("simplified keyword query '{}' -> '{}'", query.seed, prepared);
        }

        let task = json!({
            "keywords": [prepared],
            "location_name": query.location_name(),
            "language_name": query.language_name(),
            "limit": query.limit,
            "include_seed_keyword": true,
            "include_serp_info": false,
        });

        let result = self
            .post_task("dataforseo_labs/google/keyword_ideas/live", task)
            .await?;
        Ok(parse::keyword_items(&first_result_items(&result), &query.seed))
    }

    /// Organic SERP for a keyword
    pub async fn serp(&self, query: &Query) -> Result<Vec<SerpRow>, DataError> {
        let prepared = prepare_keyword(&query.seed);
        if prepared != query.seed {
            debug!("simplified SERP query '{}' -> '{}'", query.seed, prepared);
        }

        let task = json!({
            "keyword": prepared,
            "location_name": query.location_name(),
            "language_name": query.language_name(),
            "depth": SERP_DEPTH,
        });

        let result = self
            .post_task("serp/google/organic/live/regular", task)
            .await?;
        Ok(parse::serp_items(&first_result_items(&result)))
    }

    /// Search-volume metrics for a batch of keywords
    pub async fn search_volume(
        &self,
        keywords: &[String],
        query: &Query,
    ) -> Result<Vec<VolumeRow>, DataError> {
        let prepared: Vec<String> = keywords.iter().map(|k| prepare_keyword(k)).collect();

        let task = json!({
            "keywords": prepared,
            "location_name": query.location_name(),
            "language_name": query.language_name(),
            "sort_by": "search_volume",
        });

        let result = self
            .post_task("keywords_data/google_ads/search_volume/live", task)
            .await?;
        // This endpoint returns rows directly in the result array
        Ok(parse::volume_items(&result))
    }

    /// Competing domains for a target domain
    pub async fn competitor_domains(&self, query: &Query) -> Result<Vec<CompetitorRow>, DataError> {
        let task = json!({
            "target": clean_domain(&query.seed),
            "location_name": query.location_name(),
            "language_name": query.language_name(),
            "item_types": ["organic"],
            "limit": query.limit,
        });

        let result = self
            .post_task("dataforseo_labs/google/competitors_domain/live", task)
            .await?;
        Ok(parse::competitor_items(&first_result_items(&result)))
    }

    /// Keywords a domain ranks for, ordered by volume
    pub async fn ranked_keywords(&self, query: &Query) -> Result<Vec<RankedKeywordRow>, DataError> {
        let task = json!({
            "target": clean_domain(&query.seed),
            "location_name": query.location_name(),
            "language_name": query.language_name(),
            "limit": query.limit,
            "order_by": ["keyword_data.keyword_info.search_volume,desc"],
        });

        let result = self
            .post_task("dataforseo_labs/google/ranked_keywords/live", task)
            .await?;
        Ok(parse::ranked_items(&first_result_items(&result)))
    }

    /// Google Trends interest data (at most five keywords)
    pub async fn trends(
        &self,
        keywords: &[String],
        time_range: &str,
        query: &Query,
    ) -> Result<TrendsReport, DataError> {
        let prepared: Vec<String> = keywords
            .iter()
            .take(TRENDS_MAX_KEYWORDS)
            .map(|k| prepare_keyword(k))
            .collect();

        let task = json!({
            "keywords": prepared,
            "location_name": query.location_name(),
            "language_name": query.language_name(),
            "time_range": time_range,
        });

        let result = self
            .post_task("keywords_data/google_trends/explore/live", task)
            .await?;
        Ok(parse::trends_result(&first_result_items(&result), &prepared))
    }

    /// On-page analysis of a single URL with browser rendering
    pub async fn onpage(&self, url: &str) -> Result<OnPageReport, DataError> {
        let normalized = normalize_url(url);

        let task = json!({
            "url": normalized,
            "enable_javascript": true,
            "load_resources": true,
            "enable_browser_rendering": true,
        });

        let result = self.post_task("on_page/instant_pages", task).await?;
        Ok(parse::onpage_result(&first_result_items(&result), &normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_envelope_ok() {
        let body = json!({
            "status_code": 20000,
            "tasks": [{
                "status_code": 20000,
                "result": [{"items": [{"keyword": "seo"}]}]
            }]
        });
        let result = unwrap_envelope(body).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(first_result_items(&result).len(), 1);
    }

    #[test]
    fn test_unwrap_envelope_rejected() {
        let body = json!({"status_code": 40101, "status_message": "Auth failed"});
        match unwrap_envelope(body) {
            Err(DataError::Status { code, message }) => {
                assert_eq!(code, 40101);
                assert_eq!(message, "Auth failed");
            }
            other => panic!("expected status error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unwrap_envelope_task_error() {
        let body = json!({
            "status_code": 20000,
            "tasks": [{"status_code": 40501, "status_message": "Invalid field"}]
        });
        assert!(matches!(
            unwrap_envelope(body),
            Err(DataError::Status { code: 40501, .. })
        ));
    }

    #[test]
    fn test_unwrap_envelope_no_tasks() {
        let body = json!({"status_code": 20000, "tasks": []});
        assert!(matches!(unwrap_envelope(body), Err(DataError::Malformed(_))));
    }

    #[test]
    fn test_unconfigured_client() {
        let client = RestClient::new(RestConfig {
            username: None,
            password: None,
            base_url: "https://api.dataforseo.com/v3".to_string(),
            timeout_secs: 1,
        });
        assert!(!client.is_configured());
    }
}
