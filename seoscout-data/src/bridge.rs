//! Subprocess MCP bridge
//!
//! Drives the official `dataforseo-mcp-server` binary over JSON-RPC stdio:
//! spawn per call, write one `tools/call` request, scan stdout for the last
//! JSON-RPC line, unwrap the tool result. Credentials travel in the child's
//! environment, never on the command line.

use std::process::Stdio;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use seoscout_core::{
    clean_domain, normalize_url, prepare_keyword, CompetitorRow, KeywordRow, OnPageReport, Query,
    RankedKeywordRow, SerpRow, TrendsReport, VolumeRow, SERP_DEPTH, TRENDS_MAX_KEYWORDS,
};

use crate::{parse, DataError, PROVIDER_TIMEOUT_SECS};

/// Bridge configuration
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Override command line, e.g. "npx dataforseo-mcp-server"
    /// (DATAFORSEO_MCP_COMMAND)
    pub command: Option<String>,
    /// DataForSEO account login, passed to the child (DATAFORSEO_USERNAME)
    pub username: Option<String>,
    /// DataForSEO account password, passed to the child (DATAFORSEO_PASSWORD)
    pub password: Option<String>,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            command: std::env::var("DATAFORSEO_MCP_COMMAND").ok(),
            username: std::env::var("DATAFORSEO_USERNAME").ok(),
            password: std::env::var("DATAFORSEO_PASSWORD").ok(),
            timeout_secs: PROVIDER_TIMEOUT_SECS,
        }
    }
}

/// Subprocess bridge to the DataForSEO MCP server
pub struct McpBridge {
    config: BridgeConfig,
}

impl McpBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    /// Whether credentials for the bridged server are available
    pub fn is_configured(&self) -> bool {
        self.config.username.is_some() && self.config.password.is_some()
    }

    /// Command lines to try, in order
    fn candidates(&self) -> Vec<Vec<String>> {
        match &self.config.command {
            Some(command) => {
                vec![command.split_whitespace().map(str::to_string).collect()]
            }
            None => vec![
                vec!["dataforseo-mcp-server".to_string()],
                vec!["npx".to_string(), "dataforseo-mcp-server".to_string()],
            ],
        }
    }

    /// Call one tool on the bridged server and return its unwrapped result
    pub async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, DataError> {
        if !self.is_configured() {
            return Err(DataError::NotConfigured);
        }

        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": tool, "arguments": arguments},
        })
        .to_string()
            + "\n";

        let mut last_spawn_error =
            DataError::Bridge("no bridge command configured".to_string());

        for candidate in self.candidates() {
            let (program, args) = candidate
                .split_first()
                .ok_or_else(|| DataError::Bridge("empty bridge command".to_string()))?;

            let mut command = Command::new(program);
            command
                .args(args)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);
            if let Some(username) = &self.config.username {
                command.env("DATAFORSEO_USERNAME", username);
            }
            if let Some(password) = &self.config.password {
                command.env("DATAFORSEO_PASSWORD", password);
            }

            let mut child = match command.spawn() {
                Ok(child) => child,
                Err(e) => {
                    // Binary not installed under this name; try the next form
                    last_spawn_error =
                        DataError::Bridge(format!("failed to spawn '{}': {}", program, e));
                    continue;
                }
            };

            debug!("bridge call {} via '{}'", tool, program);

            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(request.as_bytes())
                    .await
                    .map_err(|e| DataError::Bridge(format!("stdin write failed: {}", e)))?;
                // Closing stdin lets the server finish the exchange
            }

            let output = match timeout(
                Duration::from_secs(self.config.timeout_secs),
                child.wait_with_output(),
            )
            .await
            {
                Ok(result) => {
                    result.map_err(|e| DataError::Bridge(format!("wait failed: {}", e)))?
                }
                Err(_) => return Err(DataError::BridgeTimeout(self.config.timeout_secs)),
            };

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(DataError::Bridge(format!(
                    "server exited with {}: {}",
                    output.status,
                    stderr.chars().take(200).collect::<String>()
                )));
            }

            let stdout = String::from_utf8_lossy(&output.stdout);
            return parse_rpc_response(&stdout);
        }

        Err(last_spawn_error)
    }

    async fn call_items(&self, tool: &str, arguments: Value) -> Result<Vec<Value>, DataError> {
        let result = self.call_tool(tool, arguments).await?;
        unwrap_tool_items(&result)
    }

    /// Keyword suggestions for a seed keyword
    pub async fn keyword_ideas(&self, query: &Query) -> Result<Vec<KeywordRow>, DataError> {
        let prepared = prepare_keyword(&query.seed);
        if prepared != query.seed {
            debug!("simplified keyword query '{}' -> '{}'", query.seed, prepared);
        }

        let items = self
            .call_items(
                "dataforseo_labs_google_keyword_ideas",
                json!({
                    "keywords": [prepared],
                    "location_name": query.location_name(),
                    "language_code": query.language,
                    "limit": query.limit,
                }),
            )
            .await?;
        Ok(parse::keyword_items(&items, &query.seed))
    }

    /// Organic SERP for a keyword
    pub async fn serp(&self, query: &Query) -> Result<Vec<SerpRow>, DataError> {
        let prepared = prepare_keyword(&query.seed);
        if prepared != query.seed {
            debug!("simplified SERP query '{}' -> '{}'", query.seed, prepared);
        }

        let items = self
            .call_items(
                "serp_organic_live_advanced",
                json!({
                    "keyword": prepared,
                    "location_name": query.location_name(),
                    "language_code": query.language,
                    "depth": SERP_DEPTH,
                }),
            )
            .await?;
        Ok(parse::serp_items(&items))
    }

    /// Search-volume metrics for a batch of keywords
    pub async fn search_volume(
        &self,
        keywords: &[String],
        query: &Query,
    ) -> Result<Vec<VolumeRow>, DataError> {
        let prepared: Vec<String> = keywords.iter().map(|k| prepare_keyword(k)).collect();

        let items = self
            .call_items(
                "keywords_data_google_ads_search_volume",
                json!({
                    "keywords": prepared,
                    "location_name": query.location_name(),
                    "language_code": query.language,
                }),
            )
            .await?;
        Ok(parse::volume_items(&items))
    }

    /// Competing domains for a target domain
    pub async fn competitor_domains(&self, query: &Query) -> Result<Vec<CompetitorRow>, DataError> {
        let items = self
            .call_items(
                "dataforseo_labs_google_competitors_domain",
                json!({
                    "target": clean_domain(&query.seed),
                    "location_name": query.location_name(),
                    "language_code": query.language,
                    "limit": query.limit,
                }),
            )
            .await?;
        Ok(parse::competitor_items(&items))
    }

    /// Keywords a domain ranks for
    pub async fn ranked_keywords(&self, query: &Query) -> Result<Vec<RankedKeywordRow>, DataError> {
        let items = self
            .call_items(
                "dataforseo_labs_google_ranked_keywords",
                json!({
                    "target": clean_domain(&query.seed),
                    "location_name": query.location_name(),
                    "language_code": query.language,
                    "limit": query.limit,
                }),
            )
            .await?;
        Ok(parse::ranked_items(&items))
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

        let items = self
            .call_items(
                "keywords_data_google_trends_explore",
                json!({
                    "keywords": prepared,
                    "location_name": query.location_name(),
                    "time_range": time_range,
                    "type": "web",
                }),
            )
            .await?;
        Ok(parse::trends_result(&items, &prepared))
    }

    /// On-page analysis of a single URL
    pub async fn onpage(&self, url: &str) -> Result<OnPageReport, DataError> {
        let normalized = normalize_url(url);

        let items = self
            .call_items(
                "on_page_instant_pages",
                json!({"url": normalized, "enable_javascript": true}),
            )
            .await?;
        Ok(parse::onpage_result(&items, &normalized))
    }
}

/// Find the JSON-RPC response among whatever the server printed and return
/// its `result`
fn parse_rpc_response(stdout: &str) -> Result<Value, DataError> {
    let line = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with('{') && line.contains("\"jsonrpc\""))
        .ok_or_else(|| DataError::Malformed("no JSON-RPC response on stdout".to_string()))?;

    let response: Value = serde_json::from_str(line)
        .map_err(|e| DataError::Malformed(format!("JSON-RPC response: {}", e)))?;

    if let Some(error) = response.get("error") {
        return Err(DataError::Bridge(format!("tool error: {}", error)));
    }

    response
        .get("result")
        .cloned()
        .ok_or_else(|| DataError::Malformed("JSON-RPC response has no result".to_string()))
}

/// MCP tool results wrap their payload as JSON text in `content[0].text`
fn unwrap_tool_items(result: &Value) -> Result<Vec<Value>, DataError> {
    let text = result
        .get("content")
        .and_then(Value::as_array)
        .and_then(|content| content.first())
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .ok_or_else(|| DataError::Malformed("tool result has no text content".to_string()))?;

    let payload: Value = serde_json::from_str(text)
        .map_err(|e| DataError::Malformed(format!("tool content: {}", e)))?;

    Ok(payload
        .get("items")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rpc_response_last_json_line() {
        let stdout = "server starting...\nsome log line\n\
            {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"content\":[{\"text\":\"{}\"}]}}\n";
        let result = parse_rpc_response(stdout).unwrap();
        assert!(result.get("content").is_some());
    }

    #[test]
    fn test_parse_rpc_response_error_field() {
        let stdout = "{\"jsonrpc\":\"2.0\",\"id\":1,\"error\":{\"code\":-32602,\"message\":\"bad params\"}}";
        assert!(matches!(
            parse_rpc_response(stdout),
            Err(DataError::Bridge(_))
        ));
    }

    #[test]
    fn test_parse_rpc_response_no_json() {
        assert!(matches!(
            parse_rpc_response("nothing useful here\n"),
            Err(DataError::Malformed(_))
        ));
    }

    #[test]
    fn test_unwrap_tool_items() {
        let result = json!({
            "content": [{"type": "text", "text": "{\"items\": [{\"keyword\": \"seo\"}]}"}]
        });
        let items = unwrap_tool_items(&result).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["keyword"], "seo");
    }

    #[test]
    fn test_unwrap_tool_items_malformed() {
        let result = json!({"content": [{"type": "text", "text": "not json"}]});
        assert!(matches!(
            unwrap_tool_items(&result),
            Err(DataError::Malformed(_))
        ));
    }

    #[test]
    fn test_candidates_with_override() {
        let bridge = McpBridge::new(BridgeConfig {
            command: Some("npx dataforseo-mcp-server".to_string()),
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            timeout_secs: 30,
        });
        let candidates = bridge.candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0], vec!["npx", "dataforseo-mcp-server"]);
    }

    #[test]
    fn test_unconfigured_bridge() {
        let bridge = McpBridge::new(BridgeConfig {
            command: None,
            username: None,
            password: None,
            timeout_secs: 30,
        });
        assert!(!bridge.is_configured());
        assert_eq!(bridge.candidates().len(), 2);
    }
}
