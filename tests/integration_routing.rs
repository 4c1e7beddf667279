//! End-to-end routing tests
//!
//! Drives full routing passes through the public API with a mock LLM
//! client and scripted tools. No network access.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use routr::config::{Config, RouterConfig};
use routr::error::{Result, RoutrError};
use routr::llm::{CompletionResponse, Message, MockLlmClient, Role};
use routr::router::{Category, KeywordSets, RESPONSE_INSTRUCTION, Router};
use routr::tools::{RetrievalTool, Tool, ToolRegistry};
use tempfile::TempDir;

/// Tool that records every query and answers with a fixed result
struct RecordingTool {
    name: &'static str,
    output: std::result::Result<String, String>,
    calls: Mutex<Vec<String>>,
}

impl RecordingTool {
    fn new(name: &'static str, output: &str) -> Arc<Self> {
        Arc::new(Self {
            name,
            output: Ok(output.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(name: &'static str, message: &str) -> Arc<Self> {
        Arc::new(Self {
            name,
            output: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "recording tool"
    }

    async fn invoke(&self, query: &str) -> Result<String> {
        self.calls.lock().unwrap().push(query.to_string());
        self.output.clone().map_err(RoutrError::Tool)
    }
}

struct Fixture {
    llm: Arc<MockLlmClient>,
    retrieval: Arc<RecordingTool>,
    web: Arc<RecordingTool>,
    academic: Arc<RecordingTool>,
    router: Router,
}

fn fixture_with(llm: MockLlmClient, web: Arc<RecordingTool>) -> Fixture {
    let llm = Arc::new(llm);
    let retrieval = RecordingTool::new("retrieve_information", "Direct Subsidized Loans are for undergraduates.");
    let academic = RecordingTool::new("arxiv_search", "Title: Attention Is All You Need");

    let mut registry = ToolRegistry::new();
    registry.add(retrieval.clone());
    registry.add(web.clone());
    registry.add(academic.clone());

    let router = Router::from_registry(llm.clone(), &registry, KeywordSets::default());

    Fixture {
        llm,
        retrieval,
        web,
        academic,
        router,
    }
}

fn fixture() -> Fixture {
    fixture_with(
        MockLlmClient::replying("Here is your answer."),
        RecordingTool::new("web_search", "- News: Something happened."),
    )
}

fn total_calls(f: &Fixture) -> usize {
    f.retrieval.calls().len() + f.web.calls().len() + f.academic.calls().len()
}

#[tokio::test]
async fn test_student_loan_question_uses_retrieval() -> Result<()> {
    let f = fixture();
    let question = "What type of student loans are available to freshmen?";

    let outcome = f.router.route(&[Message::user(question)]).await?;

    assert_eq!(outcome.decision.category, Category::Retrieval);
    assert_eq!(f.retrieval.calls(), vec![question.to_string()]);
    assert_eq!(total_calls(&f), 1);

    let appended = &outcome.conversation[1..];
    assert_eq!(appended.len(), 2);
    assert_eq!(appended[0].role, Role::System);
    assert_eq!(
        appended[0].content,
        "Retrieval Results: Direct Subsidized Loans are for undergraduates."
    );
    assert_eq!(appended[1], Message::assistant("Here is your answer."));
    Ok(())
}

#[tokio::test]
async fn test_recency_outranks_research() -> Result<()> {
    let f = fixture();

    let outcome = f
        .router
        .route(&[Message::user("What is the latest news on AI research?")])
        .await?;

    assert_eq!(outcome.decision.category, Category::WebSearch);
    assert_eq!(f.web.calls().len(), 1);
    assert!(f.academic.calls().is_empty());
    assert_eq!(outcome.conversation[1].content, "Web Search Results: - News: Something happened.");
    Ok(())
}

#[tokio::test]
async fn test_research_question_uses_academic_search() -> Result<()> {
    let f = fixture();

    let outcome = f
        .router
        .route(&[Message::user("Find papers about neural network pruning")])
        .await?;

    assert_eq!(outcome.decision.category, Category::AcademicSearch);
    assert_eq!(f.academic.calls().len(), 1);
    assert!(outcome.conversation[1].content.starts_with("Academic Search Results: "));
    Ok(())
}

#[tokio::test]
async fn test_greeting_goes_direct() -> Result<()> {
    let f = fixture();
    let conversation = vec![Message::user("Hello, how are you?")];

    let extended = f.router.route_and_respond(&conversation).await?;

    assert_eq!(total_calls(&f), 0);
    assert_eq!(extended.len(), 2);
    assert_eq!(extended[1].role, Role::Assistant);

    let requests = f.llm.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].system, RESPONSE_INSTRUCTION);
    assert_eq!(requests[0].messages, conversation);
    Ok(())
}

#[tokio::test]
async fn test_tool_failure_degrades_to_message() -> Result<()> {
    let f = fixture_with(
        MockLlmClient::replying("I could not search, but generally..."),
        RecordingTool::failing("web_search", "TAVILY_API_KEY not set"),
    );

    let extended = f
        .router
        .route_and_respond(&[Message::user("What happened today?")])
        .await?;

    assert_eq!(extended.len(), 3);
    assert_eq!(extended[1].role, Role::System);
    assert_eq!(extended[1].content, "Web Search error: Tool error: TAVILY_API_KEY not set");
    assert_eq!(extended[2].role, Role::Assistant);

    // The model still sees the error message as context
    let requests = f.llm.requests();
    assert_eq!(requests[0].messages.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_model_failure_propagates() {
    let f = fixture_with(
        MockLlmClient::failing("API error 500"),
        RecordingTool::new("web_search", "unused"),
    );

    let result = f
        .router
        .route_and_respond(&[Message::user("What is FAFSA?")])
        .await;

    assert!(matches!(result, Err(RoutrError::Llm(_))));
    // The tool still ran before generation failed
    assert_eq!(f.retrieval.calls().len(), 1);
}

#[tokio::test]
async fn test_no_user_message_routes_direct() -> Result<()> {
    let f = fixture();

    let outcome = f.router.route(&[Message::assistant("Welcome!")]).await?;

    assert_eq!(outcome.decision.category, Category::Direct);
    assert_eq!(outcome.decision.question, "");
    assert!(outcome.tool_result.is_none());
    assert_eq!(outcome.conversation.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_multi_turn_classifies_newest_question() -> Result<()> {
    let f = fixture_with(
        MockLlmClient::new(vec![
            CompletionResponse::text("FAFSA is the federal student aid form."),
            CompletionResponse::text("I'm doing well!"),
        ]),
        RecordingTool::new("web_search", "unused"),
    );

    let first = f.router.route_and_respond(&[Message::user("How do I apply for FAFSA?")]).await?;
    assert_eq!(first.len(), 3);

    let mut conversation = first;
    conversation.push(Message::user("Thanks! How are you?"));
    let second = f.router.route(&conversation).await?;

    assert_eq!(second.decision.category, Category::Direct);
    assert_eq!(second.decision.question, "Thanks! How are you?");
    assert_eq!(second.conversation.len(), 5);
    assert_eq!(second.reply(), Some(&Message::assistant("I'm doing well!")));
    assert_eq!(f.retrieval.calls().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_configured_keywords_route_through_router() -> Result<()> {
    let llm = Arc::new(MockLlmClient::replying("ok"));
    let retrieval = RecordingTool::new("retrieve_information", "Work-study pays hourly.");
    let mut registry = ToolRegistry::new();
    registry.add(retrieval.clone());

    let keywords = KeywordSets::from_config(&RouterConfig {
        extra_retrieval_keywords: vec!["work-study".to_string()],
        ..Default::default()
    });
    let router = Router::from_registry(llm, &registry, keywords);

    let outcome = router.route(&[Message::user("Is work-study worth it?")]).await?;
    assert_eq!(outcome.decision.category, Category::Retrieval);
    assert_eq!(retrieval.calls().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_retrieval_tool_over_documents() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(
        dir.path().join("loans.md"),
        "Freshmen may borrow Direct Subsidized Loans up to $3,500.\n\nParent PLUS loans require a credit check.",
    )?;

    let mut config = Config::default();
    config.tools.retrieval.docs_dir = dir.path().to_path_buf();
    config.tools.retrieval.top_k = 1;

    let llm = Arc::new(MockLlmClient::replying("Up to $3,500."));
    let mut registry = ToolRegistry::new();
    registry.add(Arc::new(RetrievalTool::new(
        config.tools.retrieval.docs_dir.clone(),
        config.tools.retrieval.top_k,
    )));
    let router = Router::from_registry(llm, &registry, KeywordSets::default());

    let outcome = router
        .route(&[Message::user("How much can freshmen borrow in subsidized loans?")])
        .await?;

    let result = outcome.tool_result.expect("retrieval should run");
    assert!(!result.is_error);
    assert_eq!(
        result.content,
        "Retrieval Results: [loans.md] Freshmen may borrow Direct Subsidized Loans up to $3,500."
    );
    Ok(())
}
