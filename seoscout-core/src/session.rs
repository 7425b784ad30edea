//! Per-run session state
//!
//! Holds the latest result set per analysis category plus the current content
//! draft. Nothing here is durable; a session lives exactly as long as the
//! process that created it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Category, ResultSet};

/// A generated content draft and its bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub title: String,
    pub content_type: String,
    pub audience: String,
    pub content: String,
    pub word_count: usize,
    pub humanized: bool,
    pub generated_at: DateTime<Utc>,
}

impl Draft {
    pub fn new(title: &str, content_type: &str, audience: &str, content: String) -> Self {
        let word_count = content.split_whitespace().count();
        Self {
            title: title.to_string(),
            content_type: content_type.to_string(),
            audience: audience.to_string(),
            content,
            word_count,
            humanized: false,
            generated_at: Utc::now(),
        }
    }

    /// Replace the draft body, recounting words
    pub fn replace_content(&mut self, content: String) {
        self.word_count = content.split_whitespace().count();
        self.content = content;
    }
}

/// In-memory state for one user session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    results: HashMap<Category, ResultSet>,
    pub draft: Option<Draft>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            results: HashMap::new(),
            draft: None,
        }
    }

    /// Store the latest result set for its category, replacing any previous one
    pub fn store(&mut self, results: ResultSet) {
        self.results.insert(results.category(), results);
    }

    /// Latest result set for a category, if any has been fetched
    pub fn latest(&self, category: Category) -> Option<&ResultSet> {
        self.results.get(&category)
    }

    /// Categories that currently hold results
    pub fn categories(&self) -> Vec<Category> {
        self.results.keys().copied().collect()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeywordKind, KeywordRow};

    fn keyword_set(keyword: &str) -> ResultSet {
        ResultSet::Keywords(vec![KeywordRow {
            keyword: keyword.to_string(),
            search_volume: 100,
            difficulty: 10,
            cpc: 0.5,
            competition: 0.1,
            kind: KeywordKind::Generic,
        }])
    }

    #[test]
    fn test_store_and_latest() {
        let mut session = Session::new();
        assert!(session.latest(Category::KeywordIdeas).is_none());

        session.store(keyword_set("first"));
        session.store(keyword_set("second"));

        // Latest write wins per category
        let latest = session.latest(Category::KeywordIdeas).unwrap();
        match latest {
            ResultSet::Keywords(rows) => assert_eq!(rows[0].keyword, "second"),
            other => panic!("unexpected result set: {:?}", other.category()),
        }
        assert_eq!(session.categories(), vec![Category::KeywordIdeas]);
    }

    #[test]
    fn test_draft_word_count() {
        let mut draft = Draft::new("Title", "Blog Post", "general", "one two three".to_string());
        assert_eq!(draft.word_count, 3);
        draft.replace_content("one two three four five".to_string());
        assert_eq!(draft.word_count, 5);
        assert!(!draft.humanized);
    }
}
