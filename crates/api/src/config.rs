use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
    pub json_mode: bool, // Ask Ollama for JSON-constrained output
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0:3000".to_string(),
            },
            llm: LlmConfig {
                base_url: "http://localhost:11434".to_string(),
                model: "llama3".to_string(),
                request_timeout_secs: 60,
                json_mode: true,
            },
        }
    }
}

impl LlmConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    /// Defaults overridden by `ENTITY_API_ADDR`, `OLLAMA_URL`, `OLLAMA_MODEL`,
    /// `OLLAMA_TIMEOUT_SECS` and `OLLAMA_JSON_MODE`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup("ENTITY_API_ADDR") {
            config.server.bind_addr = addr;
        }
        if let Some(url) = lookup("OLLAMA_URL") {
            config.llm.base_url = url;
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            config.llm.model = model;
        }
        if let Some(secs) = lookup("OLLAMA_TIMEOUT_SECS") {
            config.llm.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid OLLAMA_TIMEOUT_SECS: {}", secs))?;
        }
        if let Some(flag) = lookup("OLLAMA_JSON_MODE") {
            config.llm.json_mode = parse_flag(&flag)
                .with_context(|| format!("Invalid OLLAMA_JSON_MODE: {}", flag))?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
