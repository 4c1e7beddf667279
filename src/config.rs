use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmConfig,
    pub router: RouterConfig,
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.together.xyz/v1".to_string(),
            model: "openai/gpt-oss-20b".to_string(),
            temperature: 0.0,
            max_tokens: None,
            timeout_ms: 300000,
            max_retries: 2,
            api_key_env: "TOGETHER_API_KEY".to_string(),
        }
    }
}

/// Keywords appended to the built-in sets; priority order is unaffected
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub extra_retrieval_keywords: Vec<String>,
    pub extra_web_search_keywords: Vec<String>,
    pub extra_academic_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub timeout_ms: u64,
    pub retrieval: RetrievalConfig,
    pub web_search: WebSearchConfig,
    pub arxiv: ArxivConfig,
    pub bible: BibleConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            retrieval: RetrievalConfig::default(),
            web_search: WebSearchConfig::default(),
            arxiv: ArxivConfig::default(),
            bible: BibleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub docs_dir: PathBuf,
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("data"),
            top_k: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    pub max_results: usize,
    pub api_key_env: String,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            max_results: 3,
            api_key_env: "TAVILY_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArxivConfig {
    pub base_url: String,
    pub max_results: usize,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            base_url: "https://export.arxiv.org/api/query".to_string(),
            max_results: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BibleConfig {
    pub base_url: String,
}

impl Default for BibleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://bible-api.com".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            llm: LlmConfig::default(),
            router: RouterConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.llm.model, "openai/gpt-oss-20b");
        assert_eq!(config.llm.max_retries, 2);
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.tools.web_search.max_results, 3);
        assert!(config.router.extra_retrieval_keywords.is_empty());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("routr.yml");
        fs::write(
            &path,
            r#"
llm:
  model: meta-llama/Llama-3-8b-chat-hf
router:
  extra_retrieval_keywords:
    - work-study
tools:
  retrieval:
    top_k: 2
"#,
        )?;

        let config = Config::load(Some(&path))?;
        assert_eq!(config.llm.model, "meta-llama/Llama-3-8b-chat-hf");
        assert_eq!(config.llm.base_url, "https://api.together.xyz/v1");
        assert_eq!(config.router.extra_retrieval_keywords, vec!["work-study".to_string()]);
        assert_eq!(config.tools.retrieval.top_k, 2);
        assert_eq!(config.tools.retrieval.docs_dir, PathBuf::from("data"));
        Ok(())
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = PathBuf::from("/nonexistent/routr.yml");
        assert!(Config::load(Some(&path)).is_err());
    }
}
