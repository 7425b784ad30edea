//! Humanization pass
//!
//! Sends a draft through an external rewriting API to soften mechanical
//! LLM phrasing. The document is split at markdown headings; headings are
//! never submitted and are reassembled verbatim. Body text travels in
//! fixed-size word chunks, and a chunk whose rewrite fails keeps its
//! original text. If the rewritten document lands below the acceptable
//! band of the target length, one LLM expansion pass makes up the
//! shortfall.

use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use tracing::{info, warn};

use crate::{AgentError, SharedBackend, GENERATION_TOKEN_CEILING};

/// Words per rewriting chunk
pub const CHUNK_WORDS: usize = 1000;

/// Final length must reach this fraction of the target
pub const ACCURACY_BAND: f64 = 0.9;

/// Humanizer configuration
#[derive(Debug, Clone)]
pub struct HumanizerConfig {
    /// Rewriting API endpoint
    pub endpoint: String,
    /// Account email (HUMANIZER_EMAIL)
    pub email: Option<String>,
    /// Account password (HUMANIZER_PW)
    pub pw: Option<String>,
    /// Words per chunk sent to the API
    pub chunk_words: usize,
    /// Acceptable fraction of the target length
    pub accuracy_band: f64,
    /// Per-chunk request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HumanizerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://ai-text-humanizer.com/api.php".to_string(),
            email: std::env::var("HUMANIZER_EMAIL").ok(),
            pw: std::env::var("HUMANIZER_PW").ok(),
            chunk_words: CHUNK_WORDS,
            accuracy_band: ACCURACY_BAND,
            timeout_secs: 60,
        }
    }
}

/// A humanized draft plus its bookkeeping
#[derive(Debug, Clone)]
pub struct HumanizeOutcome {
    pub content: String,
    pub original_words: usize,
    pub final_words: usize,
    /// Final length as a percentage of the target
    pub accuracy_percentage: f64,
    pub sections_processed: usize,
    pub chunks_processed: usize,
    pub structure_preserved: bool,
    /// Whether an LLM expansion pass ran to reach the band
    pub expanded: bool,
}

/// One heading-delimited slice of the document
#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    heading: Option<String>,
    body: String,
}

/// Heading-preserving chunked humanizer
pub struct Humanizer {
    config: HumanizerConfig,
    client: Client,
}

impl Humanizer {
    pub fn new(config: HumanizerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    /// Whether rewriting credentials are available
    pub fn is_configured(&self) -> bool {
        self.config.email.is_some() && self.config.pw.is_some()
    }

    /// Humanize a draft toward a target word count
    ///
    /// `backend` powers the optional expansion pass; without one, a short
    /// result is returned as-is with its accuracy reported.
    pub async fn humanize(
        &self,
        content: &str,
        target_words: usize,
        backend: Option<&SharedBackend>,
    ) -> Result<HumanizeOutcome, AgentError> {
        if !self.is_configured() {
            return Err(AgentError::Humanizer(
                "rewriting credentials not configured".to_string(),
            ));
        }

        let original_words = count_words(content);
        let target = if target_words == 0 { original_words } else { target_words };
        let sections = split_sections(content);
        let mut chunks_processed = 0usize;

        let mut rewritten: Vec<Section> = Vec::with_capacity(sections.len());
        for section in &sections {
            let mut new_body_parts: Vec<String> = Vec::new();
            for chunk in chunk_words(&section.body, self.config.chunk_words) {
                chunks_processed += 1;
                match self.rewrite_chunk(&chunk).await {
                    Some(humanized) => new_body_parts.push(humanized),
                    None => {
                        // Keep the original text rather than lose the chunk
                        new_body_parts.push(chunk);
                    }
                }
            }
            rewritten.push(Section {
                heading: section.heading.clone(),
                body: new_body_parts.join("\n\n"),
            });
        }

        let mut content_out = reassemble(&rewritten);
        let mut expanded = false;

        let mut final_words = count_words(&content_out);
        if needs_expansion(final_words, target, self.config.accuracy_band) {
            if let Some(backend) = backend {
                let shortfall = target.saturating_sub(final_words);
                info!("humanized text {} words short of target; expanding", shortfall);
                if let Some(extra) = self.expand(&content_out, shortfall, backend).await {
                    content_out.push_str("\n\n");
                    content_out.push_str(&extra);
                    expanded = true;
                    final_words = count_words(&content_out);
                }
            }
        }

        let structure_preserved = headings_of(content) == headings_of(&content_out);
        let accuracy_percentage = if target == 0 {
            100.0
        } else {
            (final_words as f64 / target as f64 * 1000.0).round() / 10.0
        };

        Ok(HumanizeOutcome {
            content: content_out,
            original_words,
            final_words,
            accuracy_percentage,
            sections_processed: sections.len(),
            chunks_processed,
            structure_preserved,
            expanded,
        })
    }

    /// One chunk through the rewriting API; `None` on any failure
    async fn rewrite_chunk(&self, text: &str) -> Option<String> {
        let email = self.config.email.as_deref()?;
        let pw = self.config.pw.as_deref()?;

        let form = [("email", email), ("pw", pw), ("text", text)];
        let response = match self.client.post(&self.config.endpoint).form(&form).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("humanizer request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("humanizer returned status {}", response.status());
            return None;
        }

        match response.text().await {
            Ok(body) if !body.trim().is_empty() => Some(body.trim().to_string()),
            Ok(_) => {
                warn!("humanizer returned an empty body");
                None
            }
            Err(e) => {
                warn!("humanizer response unreadable: {}", e);
                None
            }
        }
    }

    /// Ask the LLM to continue the document by roughly the shortfall
    async fn expand(
        &self,
        content: &str,
        shortfall: usize,
        backend: &SharedBackend,
    ) -> Option<String> {
        let tail: String = content
            .split_whitespace()
            .rev()
            .take(50)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join(" ");

        let prompt = format!(
            r#"Continue writing this document naturally from where it left off.

Previous content ended with: ...{tail}

Add new sections, examples, and insights in the same voice and formatting.
Target length: {shortfall} words."#
        );

        let budget = (shortfall * 2).min(GENERATION_TOKEN_CEILING as usize) as u16;

        match backend.generate(&prompt, budget, 0.7).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("expansion pass failed: {}", e);
                None
            }
        }
    }
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Markdown heading lines, in order
fn headings_of(content: &str) -> Vec<String> {
    let heading = heading_regex();
    content
        .lines()
        .filter(|line| heading.is_match(line))
        .map(str::to_string)
        .collect()
}

fn heading_regex() -> Regex {
    Regex::new(r"^#{1,6}\s").expect("static heading pattern")
}

/// Split a document at markdown headings; text before the first heading
/// becomes a headingless leading section
fn split_sections(content: &str) -> Vec<Section> {
    let heading = heading_regex();
    let mut sections: Vec<Section> = Vec::new();
    let mut current = Section {
        heading: None,
        body: String::new(),
    };
    let mut has_content = false;

    for line in content.lines() {
        if heading.is_match(line) {
            if has_content || current.heading.is_some() {
                current.body = current.body.trim().to_string();
                sections.push(current);
            }
            current = Section {
                heading: Some(line.to_string()),
                body: String::new(),
            };
            has_content = true;
        } else {
            if !current.body.is_empty() {
                current.body.push('\n');
            }
            current.body.push_str(line);
            if !line.trim().is_empty() {
                has_content = true;
            }
        }
    }
    current.body = current.body.trim().to_string();
    if has_content || current.heading.is_some() {
        sections.push(current);
    }

    sections
}

/// Fixed-size word chunks; empty bodies produce no chunks
fn chunk_words(text: &str, size: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }
    words.chunks(size.max(1)).map(|chunk| chunk.join(" ")).collect()
}

/// Stitch sections back together, headings verbatim
fn reassemble(sections: &[Section]) -> String {
    let mut parts: Vec<String> = Vec::new();
    for section in sections {
        match (&section.heading, section.body.is_empty()) {
            (Some(heading), true) => parts.push(heading.clone()),
            (Some(heading), false) => parts.push(format!("{}\n\n{}", heading, section.body)),
            (None, false) => parts.push(section.body.clone()),
            (None, true) => {}
        }
    }
    parts.join("\n\n")
}

/// Below the band means the rewrite shrank the text too far
fn needs_expansion(final_words: usize, target: usize, band: f64) -> bool {
    target > 0 && (final_words as f64) < (target as f64 * band)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Guide\n\nintro text here\n\n## First Section\n\nbody one line\nbody two line\n\n## Second Section\n\nfinal body";

    #[test]
    fn test_split_sections_preserves_headings() {
        let sections = split_sections(DOC);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].heading.as_deref(), Some("# Guide"));
        assert_eq!(sections[0].body, "intro text here");
        assert_eq!(sections[1].heading.as_deref(), Some("## First Section"));
        assert_eq!(sections[2].body, "final body");
    }

    #[test]
    fn test_split_sections_leading_text_without_heading() {
        let sections = split_sections("plain intro\n\n# Heading\n\nbody");
        assert_eq!(sections.len(), 2);
        assert!(sections[0].heading.is_none());
        assert_eq!(sections[0].body, "plain intro");
    }

    #[test]
    fn test_reassemble_round_trip_structure() {
        let sections = split_sections(DOC);
        let rebuilt = reassemble(&sections);
        assert_eq!(headings_of(DOC), headings_of(&rebuilt));
    }

    #[test]
    fn test_chunk_words_sizes() {
        let text = (0..2500).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let chunks = chunk_words(&text, 1000);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].split_whitespace().count(), 1000);
        assert_eq!(chunks[2].split_whitespace().count(), 500);
    }

    #[test]
    fn test_chunk_words_empty() {
        assert!(chunk_words("   ", 1000).is_empty());
    }

    #[test]
    fn test_needs_expansion_band() {
        assert!(needs_expansion(899, 1000, 0.9));
        assert!(!needs_expansion(900, 1000, 0.9));
        assert!(!needs_expansion(1200, 1000, 0.9));
        assert!(!needs_expansion(0, 0, 0.9));
    }

    #[test]
    fn test_headings_never_look_like_body() {
        // A hash inside a sentence is not a heading
        let doc = "# Real Heading\n\nprice is #1 in class\n#hashtag line";
        let headings = headings_of(doc);
        assert_eq!(headings, vec!["# Real Heading"]);
    }

    #[tokio::test]
    async fn test_unconfigured_humanizer_errors() {
        let humanizer = Humanizer::new(HumanizerConfig {
            email: None,
            pw: None,
            ..Default::default()
        });
        assert!(!humanizer.is_configured());
        let result = humanizer.humanize("# T\n\nbody", 100, None).await;
        assert!(matches!(result, Err(AgentError::Humanizer(_))));
    }
}
