//! seoscout Data - DataForSEO retrieval layer
//!
//! Three retrieval paths, tried strictly in order:
//! 1. Subprocess MCP bridge (`dataforseo-mcp-server` over JSON-RPC stdio)
//! 2. Direct REST calls against `api.dataforseo.com/v3`
//! 3. Give up and return empty results
//!
//! The first path producing a non-error response wins; partial results are
//! never merged across paths, and failures never surface as fabricated data.

pub mod error;
pub mod parse;
pub mod rest;
pub mod bridge;
pub mod source;

pub use error::*;
pub use rest::*;
pub use bridge::*;
pub use source::*;

/// Request timeout for provider calls, in seconds
pub const PROVIDER_TIMEOUT_SECS: u64 = 30;

/// DataForSEO's "task ok" status code
pub const STATUS_OK: u32 = 20000;
