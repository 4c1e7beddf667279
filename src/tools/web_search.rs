//! web_search tool - Tavily search API

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use super::{Tool, http_client};
use crate::config::WebSearchConfig;
use crate::error::{Result, RoutrError};

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// Search the web for current information
pub struct WebSearchTool {
    client: reqwest::Client,
    max_results: usize,
    api_key_env: String,
}

impl WebSearchTool {
    pub fn new(config: &WebSearchConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            max_results: config.max_results,
            api_key_env: config.api_key_env.clone(),
        })
    }

    /// Read the API key at call time so a missing key only fails this tool
    fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .map_err(|_| RoutrError::Tool(format!("No search API configured: {} not set", self.api_key_env)))
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> &'static str {
        "Search the web for current information about the given query. Requires TAVILY_API_KEY."
    }

    async fn invoke(&self, query: &str) -> Result<String> {
        let api_key = self.api_key()?;
        debug!("web_search: query='{}' max_results={}", query, self.max_results);

        let body = serde_json::json!({
            "api_key": api_key,
            "query": query,
            "max_results": self.max_results,
            "search_depth": "basic"
        });

        let response = self
            .client
            .post(TAVILY_SEARCH_URL)
            .json(&body)
            .send()
            .await
            .map_err(|e| RoutrError::Tool(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RoutrError::Tool(format!("Tavily API error {}: {}", status, error_text)));
        }

        let result: Value = response
            .json()
            .await
            .map_err(|e| RoutrError::Tool(format!("Failed to parse response: {}", e)))?;

        Ok(format_results(&result))
    }
}

/// One `- title: content` line per result
fn format_results(result: &Value) -> String {
    let lines: Vec<String> = result["results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .map(|r| {
                    let title = r["title"].as_str().unwrap_or("No title");
                    let content = r["content"].as_str().unwrap_or("No content");
                    format!("- {}: {}", title, content)
                })
                .collect()
        })
        .unwrap_or_default();

    if lines.is_empty() {
        "No results found".to_string()
    } else {
        lines.join("\n")
    }
}
