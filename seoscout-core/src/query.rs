//! Queries and input normalization
//!
//! Everything a user types passes through here before it reaches a provider:
//! long keywords are simplified, domains lose their scheme, URLs gain one.

use serde::{Deserialize, Serialize};

use crate::{MAX_KEYWORD_CHARS, MAX_QUERY_WORDS};

/// Numeric filters applied to keyword results client-side
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Filters {
    /// Minimum monthly search volume
    pub min_volume: u64,
    /// Maximum difficulty score (0-100)
    pub max_difficulty: u32,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            min_volume: 100,
            max_difficulty: 70,
        }
    }
}

impl Filters {
    /// Whether a keyword with the given metrics passes the filters
    pub fn passes(&self, search_volume: u64, difficulty: u32) -> bool {
        search_volume >= self.min_volume && difficulty <= self.max_difficulty
    }
}

/// One user request: a seed term plus targeting and filters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Seed keyword, domain, or URL depending on the analysis
    pub seed: String,
    /// Two-letter country code (e.g. "us")
    pub country: String,
    /// Two-letter language code (e.g. "en")
    pub language: String,
    /// Client-side result filters
    pub filters: Filters,
    /// Maximum rows to request from the provider
    pub limit: usize,
}

impl Query {
    pub fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            country: "us".to_string(),
            language: "en".to_string(),
            filters: Filters::default(),
            limit: crate::DEFAULT_RESULT_LIMIT,
        }
    }

    pub fn with_locale(mut self, country: &str, language: &str) -> Self {
        self.country = country.to_lowercase();
        self.language = language.to_lowercase();
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Full location name the provider expects for this country code
    pub fn location_name(&self) -> &'static str {
        location_name(&self.country)
    }

    /// Full language name the provider expects for this language code
    pub fn language_name(&self) -> &'static str {
        language_name(&self.language)
    }
}

/// Convert a country code to the location name the provider expects
pub fn location_name(country: &str) -> &'static str {
    match country.to_lowercase().as_str() {
        "us" => "United States",
        "uk" | "gb" => "United Kingdom",
        "ca" => "Canada",
        "au" => "Australia",
        "in" => "India",
        "de" => "Germany",
        "fr" => "France",
        "es" => "Spain",
        "br" => "Brazil",
        "jp" => "Japan",
        _ => "United States",
    }
}

/// Convert a language code to the language name the provider expects
pub fn language_name(language: &str) -> &'static str {
    match language.to_lowercase().as_str() {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "pt" => "Portuguese",
        "it" => "Italian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "hi" => "Hindi",
        _ => "English",
    }
}

/// Strip quotes, trim, and cap keyword length for provider-side match quality
pub fn clean_keyword(keyword: &str) -> String {
    let cleaned: String = keyword
        .trim()
        .chars()
        .filter(|c| *c != '"' && *c != '\'')
        .collect();
    cleaned.chars().take(MAX_KEYWORD_CHARS).collect()
}

/// Truncate queries over the word cap to their leading words
///
/// Providers return sparse or zero-volume data for very specific phrases, so
/// recall is traded for match quality.
pub fn simplify_keyword(keyword: &str) -> String {
    let words: Vec<&str> = keyword.split_whitespace().collect();
    if words.len() > MAX_QUERY_WORDS {
        words[..MAX_QUERY_WORDS].join(" ")
    } else {
        words.join(" ")
    }
}

/// Clean then simplify, logging-friendly single entry point for providers
pub fn prepare_keyword(keyword: &str) -> String {
    simplify_keyword(&clean_keyword(keyword))
}

/// Reduce a domain or URL to its bare host (no scheme, no `www.`)
pub fn clean_domain(target: &str) -> String {
    let trimmed = target.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_scheme);
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Prepend `https://` when the scheme is missing
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simplify_long_keyword() {
        let simplified = simplify_keyword("best running shoes for flat feet overpronation");
        assert_eq!(simplified, "best running shoes for");
        assert_eq!(simplified.split_whitespace().count(), MAX_QUERY_WORDS);
    }

    #[test]
    fn test_simplify_short_keyword_untouched() {
        assert_eq!(simplify_keyword("running shoes"), "running shoes");
        assert_eq!(simplify_keyword("one two three four"), "one two three four");
    }

    #[test]
    fn test_clean_keyword_strips_quotes_and_caps() {
        assert_eq!(clean_keyword("  \"running\" shoes  "), "running shoes");
        let long: String = "x".repeat(200);
        assert_eq!(clean_keyword(&long).len(), MAX_KEYWORD_CHARS);
    }

    #[test]
    fn test_clean_domain() {
        assert_eq!(clean_domain("https://www.example.com/path?q=1"), "example.com");
        assert_eq!(clean_domain("example.com"), "example.com");
        assert_eq!(clean_domain("http://example.com/"), "example.com");
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com/page"), "https://example.com/page");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
    }

    #[test]
    fn test_filters_passes() {
        let filters = Filters {
            min_volume: 100,
            max_difficulty: 70,
        };
        assert!(filters.passes(100, 70));
        assert!(!filters.passes(99, 10));
        assert!(!filters.passes(5000, 71));
    }

    #[test]
    fn test_locale_names_default() {
        assert_eq!(location_name("uk"), "United Kingdom");
        assert_eq!(location_name("zz"), "United States");
        assert_eq!(language_name("pt"), "Portuguese");
        assert_eq!(language_name("xx"), "English");
    }
}
