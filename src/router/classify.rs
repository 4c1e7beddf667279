//! Keyword classification of a question into a tool category
//!
//! Three keyword sets are checked in a fixed priority order; the first set
//! with a match decides the category. Classification is a pure function of
//! the question text and the keyword sets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RouterConfig;
use crate::llm::{Message, Role};

/// Closed set of routing targets, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Retrieval,
    WebSearch,
    AcademicSearch,
    Direct,
}

impl Category {
    /// Categories that dispatch to a tool, highest priority first
    pub const TOOL_CATEGORIES: [Category; 3] = [Category::Retrieval, Category::WebSearch, Category::AcademicSearch];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Retrieval => "retrieval",
            Category::WebSearch => "web-search",
            Category::AcademicSearch => "academic-search",
            Category::Direct => "direct",
        }
    }

    /// Prefix used when wrapping tool output into the conversation
    pub fn label(&self) -> &'static str {
        match self {
            Category::Retrieval => "Retrieval",
            Category::WebSearch => "Web Search",
            Category::AcademicSearch => "Academic Search",
            Category::Direct => "Direct",
        }
    }

    /// Name of the standard tool bound to this category
    pub fn tool_name(&self) -> Option<&'static str> {
        match self {
            Category::Retrieval => Some("retrieve_information"),
            Category::WebSearch => Some("web_search"),
            Category::AcademicSearch => Some("arxiv_search"),
            Category::Direct => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingDecision {
    pub category: Category,
    pub question: String,
}

impl RoutingDecision {
    pub fn uses_tool(&self) -> bool {
        self.category != Category::Direct
    }
}

/// A keyword checked against lower-cased question text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword {
    /// Plain substring containment ("loan" matches "loans")
    Stem(String),
    /// Must start and end on word boundaries ("ai" does not match "aid")
    Exact(String),
}

impl Keyword {
    pub fn stem(text: &str) -> Self {
        Keyword::Stem(text.to_lowercase())
    }

    pub fn exact(text: &str) -> Self {
        Keyword::Exact(text.to_lowercase())
    }

    pub fn text(&self) -> &str {
        match self {
            Keyword::Stem(t) | Keyword::Exact(t) => t,
        }
    }

    /// `haystack` must already be lower-cased
    pub fn matches(&self, haystack: &str) -> bool {
        let needle = self.text();
        if needle.is_empty() {
            return false;
        }

        match self {
            Keyword::Stem(_) => haystack.contains(needle),
            Keyword::Exact(_) => {
                // Every start position, overlapping ones included
                let mut from = 0;
                while let Some(offset) = haystack[from..].find(needle) {
                    let start = from + offset;
                    let end = start + needle.len();
                    let starts_word = haystack[..start].chars().next_back().is_none_or(|c| !c.is_alphanumeric());
                    let ends_word = haystack[end..].chars().next().is_none_or(|c| !c.is_alphanumeric());
                    if starts_word && ends_word {
                        return true;
                    }
                    from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
                }
                false
            }
        }
    }
}

const RETRIEVAL_KEYWORDS: &[&str] = &[
    "student loan",
    "financial aid",
    "pell grant",
    "fafsa",
    "tuition",
    "scholarship",
    "education loan",
    "federal aid",
    "college funding",
    "direct loan",
    "subsidized",
    "unsubsidized",
    "plus loan",
    "loan forgiveness",
    "repayment",
    "interest rate",
];

const WEB_SEARCH_STEMS: &[&str] = &["current", "latest", "recent", "today", "news", "update", "this year"];
const WEB_SEARCH_EXACT: &[&str] = &["2024", "2025", "now"];

const ACADEMIC_STEMS: &[&str] = &[
    "research",
    "paper",
    "study",
    "academic",
    "publication",
    "machine learning",
    "artificial intelligence",
    "neural network",
    "algorithm",
    "computer science",
    "mathematics",
];
const ACADEMIC_EXACT: &[&str] = &["ai"];

/// The three keyword sets, checked retrieval → web search → academic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSets {
    pub retrieval: Vec<Keyword>,
    pub web_search: Vec<Keyword>,
    pub academic: Vec<Keyword>,
}

impl Default for KeywordSets {
    fn default() -> Self {
        let stems = |words: &[&str]| words.iter().map(|w| Keyword::stem(w)).collect::<Vec<_>>();
        let exact = |words: &[&str]| words.iter().map(|w| Keyword::exact(w)).collect::<Vec<_>>();

        Self {
            retrieval: stems(RETRIEVAL_KEYWORDS),
            web_search: [stems(WEB_SEARCH_STEMS), exact(WEB_SEARCH_EXACT)].concat(),
            academic: [stems(ACADEMIC_STEMS), exact(ACADEMIC_EXACT)].concat(),
        }
    }
}

impl KeywordSets {
    /// Built-in sets extended with configured extras
    pub fn from_config(config: &RouterConfig) -> Self {
        let mut sets = Self::default();
        let extend = |set: &mut Vec<Keyword>, extra: &[String]| {
            set.extend(extra.iter().filter(|w| !w.trim().is_empty()).map(|w| Keyword::stem(w.trim())));
        };
        extend(&mut sets.retrieval, &config.extra_retrieval_keywords);
        extend(&mut sets.web_search, &config.extra_web_search_keywords);
        extend(&mut sets.academic, &config.extra_academic_keywords);
        sets
    }

    fn keywords_for(&self, category: Category) -> &[Keyword] {
        match category {
            Category::Retrieval => &self.retrieval,
            Category::WebSearch => &self.web_search,
            Category::AcademicSearch => &self.academic,
            Category::Direct => &[],
        }
    }

    /// Classify a question; first matching category in priority order wins
    pub fn classify(&self, question: &str) -> RoutingDecision {
        let lowered = question.to_lowercase();
        let category = Category::TOOL_CATEGORIES
            .into_iter()
            .find(|category| self.keywords_for(*category).iter().any(|k| k.matches(&lowered)))
            .unwrap_or(Category::Direct);

        RoutingDecision {
            category,
            question: question.to_string(),
        }
    }
}

/// Content of the newest user message, or "" when there is none
pub fn extract_question(conversation: &[Message]) -> &str {
    conversation
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

/// Classify with the built-in keyword sets
pub fn classify(question: &str) -> RoutingDecision {
    KeywordSets::default().classify(question)
}
