//! Question router - classify, dispatch to one tool, generate a reply
//!
//! One pass over a conversation runs `start → classified → (dispatched →)
//! generated → done`. Tool failures are folded into the conversation as
//! informational messages; model failures propagate to the caller.

mod classify;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient, Message};
use crate::tools::{Tool, ToolRegistry, truncate};

pub use classify::{Category, Keyword, KeywordSets, RoutingDecision, classify, extract_question};

/// Instruction prepended to every generation call
pub const RESPONSE_INSTRUCTION: &str = "You are a helpful assistant. If tool results are provided in the conversation, \
use them to answer the user's question. If no tool results are available, answer based on your knowledge.";

const LOG_PREVIEW_CHARS: usize = 200;

/// Stages of a single routing pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStage {
    Start,
    Classified,
    Dispatched,
    Generated,
    Done,
}

impl fmt::Display for RouteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouteStage::Start => "start",
            RouteStage::Classified => "classified",
            RouteStage::Dispatched => "dispatched",
            RouteStage::Generated => "generated",
            RouteStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Output of a tool dispatch, success or failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub category: Category,
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(category: Category, output: &str) -> Self {
        Self {
            category,
            content: format!("{} Results: {}", category.label(), output),
            is_error: false,
        }
    }

    pub fn error(category: Category, error: impl fmt::Display) -> Self {
        Self {
            category,
            content: format!("{} error: {}", category.label(), error),
            is_error: true,
        }
    }

    /// Tool results enter the conversation as system messages
    pub fn to_message(&self) -> Message {
        Message::system(self.content.clone())
    }
}

/// Everything one routing pass produced
#[derive(Debug, Clone)]
pub struct RouteOutcome {
    pub decision: RoutingDecision,
    pub tool_result: Option<ToolResult>,
    pub conversation: Vec<Message>,
}

impl RouteOutcome {
    /// The model reply appended by this pass
    pub fn reply(&self) -> Option<&Message> {
        self.conversation.last()
    }
}

/// Routes questions to tool collaborators and the language model
pub struct Router {
    llm: Arc<dyn LlmClient>,
    tools: HashMap<Category, Arc<dyn Tool>>,
    keywords: KeywordSets,
}

impl Router {
    /// Router with built-in keywords and no tools bound
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            tools: HashMap::new(),
            keywords: KeywordSets::default(),
        }
    }

    /// Router with each tool category bound to its standard tool from `registry`
    pub fn from_registry(llm: Arc<dyn LlmClient>, registry: &ToolRegistry, keywords: KeywordSets) -> Self {
        let mut router = Self::new(llm).with_keywords(keywords);
        for category in Category::TOOL_CATEGORIES {
            match category.tool_name().and_then(|name| registry.get(name)) {
                Some(tool) => router = router.with_tool(category, tool),
                None => warn!("No tool registered for {} category", category),
            }
        }
        router
    }

    /// Bind a tool to a category, replacing any previous binding
    pub fn with_tool(mut self, category: Category, tool: Arc<dyn Tool>) -> Self {
        if category != Category::Direct {
            self.tools.insert(category, tool);
        }
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordSets) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn keywords(&self) -> &KeywordSets {
        &self.keywords
    }

    /// Classify the newest user question in `conversation`
    pub fn classify(&self, conversation: &[Message]) -> RoutingDecision {
        let question = extract_question(conversation);
        if question.is_empty() {
            debug!("No user message found");
        } else {
            debug!("Analyzing question: '{}'", question);
        }
        self.keywords.classify(question)
    }

    /// Invoke the tool bound to the decision's category; never fails
    pub async fn dispatch(&self, decision: &RoutingDecision) -> Option<ToolResult> {
        let category = decision.category;
        if category == Category::Direct {
            return None;
        }

        let Some(tool) = self.tools.get(&category) else {
            warn!("{} selected but no tool is configured", category);
            return Some(ToolResult::error(category, "no tool configured"));
        };

        debug!("Dispatching '{}' to {}", decision.question, tool.name());
        let result = match tool.invoke(&decision.question).await {
            Ok(output) => {
                debug!("{} returned: {}", tool.name(), truncate(&output, LOG_PREVIEW_CHARS));
                ToolResult::success(category, &output)
            }
            Err(e) => {
                warn!("{} failed: {}", tool.name(), e);
                ToolResult::error(category, e)
            }
        };
        Some(result)
    }

    /// Ask the model for a reply to the (possibly augmented) conversation
    pub async fn generate_response(&self, conversation: &[Message]) -> Result<Message> {
        let request = CompletionRequest::new(RESPONSE_INSTRUCTION).with_messages(conversation.to_vec());
        let response = self.llm.complete(request).await?;
        debug!(
            "Model {} replied ({} tokens, {:?})",
            self.llm.model(),
            response.usage.total(),
            response.stop_reason
        );
        Ok(response.into_message())
    }

    /// Full routing pass, exposing the decision and tool result
    pub async fn route(&self, conversation: &[Message]) -> Result<RouteOutcome> {
        let mut stage = RouteStage::Start;
        let mut advance = |next: RouteStage| {
            debug!("route: {} -> {}", stage, next);
            stage = next;
        };

        let decision = self.classify(conversation);
        advance(RouteStage::Classified);
        info!("Routing to {} for '{}'", decision.category, truncate(&decision.question, LOG_PREVIEW_CHARS));

        let mut extended = conversation.to_vec();
        let tool_result = self.dispatch(&decision).await;
        if let Some(result) = &tool_result {
            extended.push(result.to_message());
            advance(RouteStage::Dispatched);
        }

        let reply = self.generate_response(&extended).await?;
        extended.push(reply);
        advance(RouteStage::Generated);
        advance(RouteStage::Done);

        Ok(RouteOutcome {
            decision,
            tool_result,
            conversation: extended,
        })
    }

    /// Return `conversation` extended with an optional tool result and one reply
    pub async fn route_and_respond(&self, conversation: &[Message]) -> Result<Vec<Message>> {
        Ok(self.route(conversation).await?.conversation)
    }
}
