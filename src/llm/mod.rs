//! LLM client layer - the language-model collaborator
//!
//! This module provides:
//! - Message types for chat completions
//! - LlmClient trait for API abstraction
//! - OpenAiCompatClient for any `/chat/completions` endpoint
//! - MockLlmClient for tests

pub mod client;
pub mod openai;
pub mod types;

pub use client::{LlmClient, MockLlmClient};
pub use openai::{OpenAiCompatClient, OpenAiCompatConfig};
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, Usage};
