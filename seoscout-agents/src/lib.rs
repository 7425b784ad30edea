//! seoscout Agents
//!
//! Agents that compose the data source with the LLM gateway:
//! - **Backend**: OpenRouter access through an OpenAI-compatible client
//! - **Research**: fetch provider rows, then ask the LLM for commentary
//! - **Content**: draft, refine, and critique long-form content
//! - **Humanizer**: heading-preserving rewrite pass via an external API
//!
//! The research contract throughout: rows survive an LLM failure, and an
//! LLM failure is never papered over with fabricated commentary.

pub mod backend;
pub mod research;
pub mod content;
pub mod humanize;

pub use backend::*;
pub use research::*;
pub use content::*;
pub use humanize::*;

use thiserror::Error;

/// Errors from agent operations
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("humanizer error: {0}")]
    Humanizer(String),

    #[error("LLM backend not configured")]
    NoBackend,
}
