//! Routr - keyword-routed tool dispatch for LLM agents
//!
//! Routr takes a conversation, classifies the newest user question into a
//! tool category, pulls supplementary context from that tool, and asks a
//! language model for the final reply.

pub mod config;
pub mod error;
pub mod llm;
pub mod router;
pub mod tools;

pub use config::Config;
pub use error::{Result, RoutrError};
pub use router::{Category, RouteOutcome, Router, RoutingDecision};
