//! arxiv_search tool - arXiv export API (Atom feed)

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use regex::Regex;

use super::{Tool, http_client, truncate};
use crate::config::ArxivConfig;
use crate::error::{Result, RoutrError};

/// Cap on the rendered result, matching typical tool context budgets
const MAX_OUTPUT_CHARS: usize = 4000;

static ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<entry>(.*?)</entry>").expect("entry regex is valid"));
static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title[^>]*>(.*?)</title>").expect("title regex is valid"));
static SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<summary[^>]*>(.*?)</summary>").expect("summary regex is valid"));
static PUBLISHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<published>(.*?)</published>").expect("published regex is valid"));
static AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<author>\s*<name>(.*?)</name>").expect("author regex is valid"));

/// A single paper pulled from the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
    pub published: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
}

/// Search arXiv for academic papers
pub struct ArxivSearchTool {
    client: reqwest::Client,
    base_url: String,
    max_results: usize,
}

impl ArxivSearchTool {
    pub fn new(config: &ArxivConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: config.base_url.clone(),
            max_results: config.max_results,
        })
    }
}

#[async_trait]
impl Tool for ArxivSearchTool {
    fn name(&self) -> &'static str {
        "arxiv_search"
    }

    fn description(&self) -> &'static str {
        "Search arXiv for academic papers on physics, mathematics, computer science and related fields."
    }

    async fn invoke(&self, query: &str) -> Result<String> {
        debug!("arxiv_search: query='{}'", query);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("search_query", format!("all:{}", query)),
                ("start", "0".to_string()),
                ("max_results", self.max_results.to_string()),
            ])
            .send()
            .await
            .map_err(|e| RoutrError::Tool(format!("arXiv request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RoutrError::Tool(format!("arXiv API error {}", response.status())));
        }

        let feed = response
            .text()
            .await
            .map_err(|e| RoutrError::Tool(format!("Failed to read arXiv response: {}", e)))?;

        let papers = parse_feed(&feed);
        if papers.is_empty() {
            return Ok("No good arXiv result was found".to_string());
        }

        let rendered: Vec<String> = papers.iter().map(render_paper).collect();
        Ok(truncate(&rendered.join("\n\n"), MAX_OUTPUT_CHARS))
    }
}

/// Extract papers from an Atom feed
pub(crate) fn parse_feed(feed: &str) -> Vec<Paper> {
    ENTRY
        .captures_iter(feed)
        .filter_map(|entry| {
            let body = entry.get(1)?.as_str();
            let field = |re: &Regex| {
                re.captures(body)
                    .and_then(|c| c.get(1))
                    .map(|m| clean_text(m.as_str()))
                    .unwrap_or_default()
            };

            let title = field(&TITLE);
            if title.is_empty() {
                return None;
            }

            let published = field(&PUBLISHED);
            Some(Paper {
                published: published.split('T').next().unwrap_or_default().to_string(),
                title,
                authors: AUTHOR
                    .captures_iter(body)
                    .filter_map(|c| c.get(1).map(|m| clean_text(m.as_str())))
                    .collect(),
                summary: field(&SUMMARY),
            })
        })
        .collect()
}

fn render_paper(paper: &Paper) -> String {
    format!(
        "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
        paper.published,
        paper.title,
        paper.authors.join(", "),
        paper.summary
    )
}

/// Collapse whitespace and decode the XML entities arXiv emits
fn clean_text(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:transformers</title>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All
      You Need</title>
    <summary>  The dominant sequence transduction models are based on
  complex recurrent &amp; convolutional networks.
    </summary>
    <author>
      <name>Ashish Vaswani</name>
    </author>
    <author>
      <name>Noam Shazeer</name>
    </author>
  </entry>
  <entry>
    <published>2018-10-11T00:00:00Z</published>
    <title>BERT</title>
    <summary>Pre-training of deep bidirectional transformers.</summary>
    <author><name>Jacob Devlin</name></author>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed() {
        let papers = parse_feed(FEED);
        assert_eq!(papers.len(), 2);

        let first = &papers[0];
        assert_eq!(first.published, "2017-06-12");
        assert_eq!(first.title, "Attention Is All You Need");
        assert_eq!(first.authors, vec!["Ashish Vaswani", "Noam Shazeer"]);
        assert_eq!(
            first.summary,
            "The dominant sequence transduction models are based on complex recurrent & convolutional networks."
        );

        assert_eq!(papers[1].authors, vec!["Jacob Devlin"]);
    }

    #[test]
    fn test_feed_title_is_not_an_entry() {
        let papers = parse_feed(r#"<feed><title>ArXiv Query</title></feed>"#);
        assert!(papers.is_empty());
    }

    #[test]
    fn test_render_paper() {
        let paper = Paper {
            published: "2018-10-11".to_string(),
            title: "BERT".to_string(),
            authors: vec!["Jacob Devlin".to_string(), "Ming-Wei Chang".to_string()],
            summary: "Pre-training.".to_string(),
        };
        assert_eq!(
            render_paper(&paper),
            "Published: 2018-10-11\nTitle: BERT\nAuthors: Jacob Devlin, Ming-Wei Chang\nSummary: Pre-training."
        );
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  a\n  b &lt;c&gt; &amp;lt; "), "a b <c> &lt;");
    }
}
