//! seoscout Core - query and result types for keyword research
//!
//! This crate provides the foundational primitives:
//! - Queries with input normalization (keyword simplification, domain/URL cleanup)
//! - Result rows for each analysis category
//! - Domain-rankings reports with position distribution
//! - Per-run session state
//! - CSV/XLSX/JSON export helpers

pub mod query;
pub mod rows;
pub mod report;
pub mod session;
pub mod export;

pub use query::*;
pub use rows::*;
pub use report::*;
pub use session::*;
pub use export::*;

/// Queries longer than this are truncated before submission
pub const MAX_QUERY_WORDS: usize = 4;

/// Keywords are capped at this many characters before submission
pub const MAX_KEYWORD_CHARS: usize = 80;

/// Default number of rows requested per analysis
pub const DEFAULT_RESULT_LIMIT: usize = 50;

/// SERP results are fetched and kept to this depth
pub const SERP_DEPTH: usize = 10;

/// Google Trends accepts at most this many keywords per request
pub const TRENDS_MAX_KEYWORDS: usize = 5;
