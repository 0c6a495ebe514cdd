use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::semantic::{
    DEFAULT_DIMENSIONS, DEFAULT_KEYWORD_CONFIDENCE, DEFAULT_MAX_KEYWORDS,
    DEFAULT_SIMILARITY_THRESHOLD,
};

/// Default maximum document size in characters
const DEFAULT_MAX_DOCUMENT_SIZE: usize = 10_000;
/// Default maximum question length in characters
const DEFAULT_MAX_QUESTION_LENGTH: usize = 500;
/// Advertised document capacity
const DEFAULT_MAX_DOCUMENTS: usize = 1000;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_ENVIRONMENT: &str = "development";

/// Environment variable overriding the listening port
pub const PORT_ENV: &str = "PORT";
/// Environment variable overriding the reported environment name
pub const ENVIRONMENT_ENV: &str = "DOCQA_ENV";
/// Environment variable pointing at a YAML config file
pub const CONFIG_ENV: &str = "DOCQA_CONFIG";

/// Configuration for embedding and retrieval
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Embedding length
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// A vector match must score strictly above this [0.0, 1.0]
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Number of leading tokens kept in a keyword signature
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,

    /// Confidence reported for keyword matches [0.0, 1.0]
    #[serde(default = "default_keyword_confidence")]
    pub keyword_confidence: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_keywords: DEFAULT_MAX_KEYWORDS,
            keyword_confidence: DEFAULT_KEYWORD_CONFIDENCE,
        }
    }
}

/// Size limits, in characters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Longer documents are rejected
    #[serde(default = "default_max_document_size")]
    pub max_document_size: usize,

    /// Longer questions are truncated
    #[serde(default = "default_max_question_length")]
    pub max_question_length: usize,

    /// Reported in status only, not enforced
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            max_question_length: DEFAULT_MAX_QUESTION_LENGTH,
            max_documents: DEFAULT_MAX_DOCUMENTS,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment name reported by the health check
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_dimensions() -> usize {
    DEFAULT_DIMENSIONS
}

fn default_similarity_threshold() -> f32 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_max_keywords() -> usize {
    DEFAULT_MAX_KEYWORDS
}

fn default_keyword_confidence() -> f32 {
    DEFAULT_KEYWORD_CONFIDENCE
}

fn default_max_document_size() -> usize {
    DEFAULT_MAX_DOCUMENT_SIZE
}

fn default_max_question_length() -> usize {
    DEFAULT_MAX_QUESTION_LENGTH
}

fn default_max_documents() -> usize {
    DEFAULT_MAX_DOCUMENTS
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        let retrieval = &self.retrieval;
        if retrieval.dimensions == 0 {
            bail!("retrieval.dimensions must be greater than 0");
        }

        if !(0.0..=1.0).contains(&retrieval.similarity_threshold) {
            bail!(
                "retrieval.similarity_threshold must be between 0.0 and 1.0, got {}",
                retrieval.similarity_threshold
            );
        }

        if retrieval.max_keywords == 0 {
            bail!("retrieval.max_keywords must be greater than 0");
        }

        if !(0.0..=1.0).contains(&retrieval.keyword_confidence) {
            bail!(
                "retrieval.keyword_confidence must be between 0.0 and 1.0, got {}",
                retrieval.keyword_confidence
            );
        }

        let limits = &self.limits;
        if limits.max_document_size == 0 {
            bail!("limits.max_document_size must be greater than 0");
        }
        if limits.max_question_length == 0 {
            bail!("limits.max_question_length must be greater than 0");
        }
        if limits.max_documents == 0 {
            bail!("limits.max_documents must be greater than 0");
        }

        Ok(())
    }

    /// Parse a YAML config. Missing keys take their defaults.
    pub fn from_yaml(config_str: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yml::from_str(config_str).context("config is malformed")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, else defaults; then apply env overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let config_str = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                Self::from_yaml(&config_str)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `PORT` and `DOCQA_ENV` using the given variable lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("{PORT_ENV} is not a valid port: {port:?}"))?;
        }

        if let Some(environment) = lookup(ENVIRONMENT_ENV).filter(|e| !e.trim().is_empty()) {
            self.server.environment = environment;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.retrieval.dimensions, 384);
        assert!((config.retrieval.similarity_threshold - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.retrieval.max_keywords, 10);
        assert!((config.retrieval.keyword_confidence - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.limits.max_document_size, 10_000);
        assert_eq!(config.limits.max_question_length, 500);
        assert_eq!(config.limits.max_documents, 1000);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.environment, "development");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = Config::from_yaml("retrieval:\n  dimensions: 64\nserver:\n  port: 8080\n").unwrap();

        assert_eq!(config.retrieval.dimensions, 64);
        assert_eq!(config.retrieval.max_keywords, 10);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.limits.max_question_length, 500);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_yaml("retrieval:\n  dimensions: 0\n").is_err());
        assert!(Config::from_yaml("retrieval:\n  similarity_threshold: 1.5\n").is_err());
        assert!(Config::from_yaml("retrieval:\n  keyword_confidence: -0.1\n").is_err());
        assert!(Config::from_yaml("limits:\n  max_document_size: 0\n").is_err());
        assert!(Config::from_yaml("retrieval: [1, 2]\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "limits:\n  max_document_size: 42\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.limits.max_document_size, 42);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        assert!(Config::load(Some(&tmp.path().join("missing.yaml"))).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [(PORT_ENV, "8081"), (ENVIRONMENT_ENV, "production")]
            .into_iter()
            .collect();

        let mut config = Config::default();
        config
            .apply_env_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.environment, "production");
    }

    #[test]
    fn test_env_invalid_port() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(|key| (key == PORT_ENV).then(|| "abc".to_string()));
        assert!(result.is_err());
    }
}
