//! Tool collaborators - text query in, text content out
//!
//! Every tool the router can dispatch to implements [`Tool`]. The router
//! treats them uniformly; tools that talk to the network own their own
//! HTTP client and timeouts.

mod arxiv;
mod bible;
mod dice;
mod letters;
mod registry;
mod retrieval;
mod web_search;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{Result, RoutrError};

pub use arxiv::ArxivSearchTool;
pub use bible::BibleSearchTool;
pub use dice::{DiceRoll, RollDiceTool};
pub use letters::RCounterTool;
pub use registry::ToolRegistry;
pub use retrieval::{DocumentStore, RetrievalTool, ScoredChunk};
pub use web_search::WebSearchTool;

/// A tool the router (or the CLI) can invoke with a free-text query
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, unique within a registry
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Run the tool; failures surface as `RoutrError::Tool`
    async fn invoke(&self, query: &str) -> Result<String>;
}

/// Name and description of a registered tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
}

impl ToolDefinition {
    pub fn of(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
        }
    }
}

/// Build an HTTP client for a network-backed tool
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| RoutrError::Tool(format!("Failed to create HTTP client: {}", e)))
}

/// Truncate to at most `max_chars` characters, appending "..." when cut
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
