//! OpenAI-compatible chat-completions client.

use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use askrag_core::config::Config;
use askrag_core::error::{Error, Result};
use askrag_core::traits::AnswerGenerator;

/// Connection settings for the hosted chat-completions endpoint. The
/// defaults target Groq's OpenAI-compatible API; the low temperature keeps
/// answers close to the retrieved context.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: std::env::var("GROQ_API_KEY").unwrap_or_default(),
            temperature: 0.2,
        }
    }
}

impl GeneratorConfig {
    /// Build from layered configuration, falling back to defaults per key
    /// (and to the `GROQ_API_KEY` environment variable for the key).
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            base_url: config.get("llm.base_url").unwrap_or(defaults.base_url),
            model: config.get("llm.model").unwrap_or(defaults.model),
            api_key: config.get("llm.api_key").unwrap_or(defaults.api_key),
            temperature: config.get("llm.temperature").unwrap_or(defaults.temperature),
        }
    }
}

pub struct ChatCompletionsGenerator {
    config: GeneratorConfig,
    client: Client,
}

impl ChatCompletionsGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            config: GeneratorConfig { base_url, ..config },
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl AnswerGenerator for ChatCompletionsGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let body = json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": self.config.temperature,
            "stream": false,
        });

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(Error::generation)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "chat completion failed ({status}): {text}"
            )));
        }

        let payload: Value = res.json().await.map_err(Error::generation)?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        if content.is_empty() {
            return Err(Error::Generation("empty completion".to_string()));
        }
        debug!("generated {} chars with {}", content.len(), self.config.model);
        Ok(content)
    }
}
