//! Tool registry - name lookup and direct invocation

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::{
    ArxivSearchTool, BibleSearchTool, RCounterTool, RetrievalTool, RollDiceTool, Tool, ToolDefinition, WebSearchTool,
};
use crate::config::Config;
use crate::error::{Result, RoutrError};

/// Registered tools keyed by name
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry (for custom tool sets)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in tool configured from `config`
    pub fn standard(config: &Config) -> Result<Self> {
        let timeout = Duration::from_millis(config.tools.timeout_ms);
        let mut registry = Self::new();

        // Router-bound tools
        registry.add(Arc::new(RetrievalTool::new(
            config.tools.retrieval.docs_dir.clone(),
            config.tools.retrieval.top_k,
        )));
        registry.add(Arc::new(WebSearchTool::new(&config.tools.web_search, timeout)?));
        registry.add(Arc::new(ArxivSearchTool::new(&config.tools.arxiv, timeout)?));

        // Standalone tools
        registry.add(Arc::new(BibleSearchTool::new(&config.tools.bible, timeout)?));
        registry.add(Arc::new(RollDiceTool));
        registry.add(Arc::new(RCounterTool));

        Ok(registry)
    }

    /// Add a tool, replacing any tool with the same name
    pub fn add(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Sorted tool names
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Definitions of every registered tool, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| ToolDefinition::of(t.as_ref())).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Invoke a tool by name
    pub async fn invoke(&self, name: &str, query: &str) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| RoutrError::Tool(format!("Unknown tool: {}", name)))?;
        tool.invoke(query).await
    }
}
