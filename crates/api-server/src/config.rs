use anyhow::{bail, Context, Result};
use std::env;
use std::time::Duration;

/// Which `PropertyAnalyzer` implementation serves requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerMode {
    Rules,
    ScoutGpt,
}

impl std::str::FromStr for AnalyzerMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" | "rule" | "rule-based" => Ok(AnalyzerMode::Rules),
            "scoutgpt" | "ai" => Ok(AnalyzerMode::ScoutGpt),
            other => bail!("unknown ANALYZER_MODE '{other}' (expected 'rules' or 'scoutgpt')"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub analyzer_mode: AnalyzerMode,
    /// Zero disables the analysis cache
    pub cache_ttl: Duration,
    pub max_batch_size: usize,
    /// Comma-separated origins; empty means permissive CORS for local use
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            analyzer_mode: AnalyzerMode::Rules,
            cache_ttl: Duration::from_secs(300),
            max_batch_size: 500,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            analyzer_mode: env::var("ANALYZER_MODE")
                .unwrap_or_else(|_| "rules".to_string())
                .parse()?,
            cache_ttl: Duration::from_secs(
                env::var("ANALYSIS_CACHE_TTL_SECS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .context("ANALYSIS_CACHE_TTL_SECS must be a whole number of seconds")?,
            ),
            max_batch_size: env::var("MAX_BATCH_SIZE")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .context("MAX_BATCH_SIZE must be a positive integer")?,
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        };

        if config.max_batch_size == 0 {
            bail!("MAX_BATCH_SIZE must be greater than zero");
        }

        Ok(config)
    }

    pub fn cache_enabled(&self) -> bool {
        !self.cache_ttl.is_zero()
    }
}
