//! bible_search tool - verse lookup via bible-api.com

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Url;
use serde_json::Value;

use super::{Tool, http_client};
use crate::config::BibleConfig;
use crate::error::{Result, RoutrError};

/// Fetch the text of a Bible verse reference such as "John 3:16"
pub struct BibleSearchTool {
    client: reqwest::Client,
    base_url: String,
}

impl BibleSearchTool {
    pub fn new(config: &BibleConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: config.base_url.clone(),
        })
    }

    /// Reference becomes a single percent-encoded path segment
    fn verse_url(&self, reference: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| RoutrError::Tool(format!("Invalid bible API URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| RoutrError::Tool(format!("Bible API URL cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .push(reference.trim());
        Ok(url)
    }
}

#[async_trait]
impl Tool for BibleSearchTool {
    fn name(&self) -> &'static str {
        "bible_search"
    }

    fn description(&self) -> &'static str {
        "Fetch the content of the specified Bible verse reference (e.g. 'John 3:16')"
    }

    async fn invoke(&self, query: &str) -> Result<String> {
        let url = self.verse_url(query)?;
        debug!("bible_search: GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RoutrError::Tool(format!("Bible API request failed: {}", e)))?;

        if !response.status().is_success() {
            return Ok("Error fetching verse.".to_string());
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| RoutrError::Tool(format!("Failed to parse bible API response: {}", e)))?;

        Ok(verse_text(&data))
    }
}

fn verse_text(data: &Value) -> String {
    data["text"]
        .as_str()
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| "Verse not found.".to_string())
}
