use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::LlmConfig;
use crate::report::ReportModel;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 6;
const SYSTEM_PROMPT: &str =
    "You analyse hotel management decisions. Answer in plain prose, at most three paragraphs.";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("hotel-sim/0.1")
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| Client::new())
});

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// OpenAI-compatible chat completions client.
#[derive(Debug, Clone)]
pub struct LlmClient {
    endpoint: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    timeout: Duration,
}

impl LlmClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config.resolved_api_key().with_context(|| {
            format!(
                "no API key configured (set llm.api_key or {})",
                config.api_key_env
            )
        })?;
        if config.endpoint.trim().is_empty() {
            bail!("llm.endpoint is empty");
        }
        Ok(Self {
            endpoint: config.endpoint.trim().to_string(),
            model: config.model.clone(),
            api_key,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        })
    }
}

#[async_trait]
impl ReportModel for LlmClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn analyze(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: 0.4,
        };
        let response = HTTP_CLIENT
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("failed POST request: {}", self.endpoint))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("failed reading response body: {}", self.endpoint))?;
        debug!("llm response from {}: status={status}", self.endpoint);
        if !status.is_success() {
            let preview: String = text.chars().take(180).collect();
            bail!("POST {} returned {status}: {preview}", self.endpoint);
        }
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON response: {}", self.endpoint))?;
        extract_content(&value)
    }
}

/// Pulls `choices[0].message.content`, rejecting a missing or blank answer.
pub fn extract_content(value: &Value) -> Result<String> {
    let content = value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if content.is_empty() {
        return Err(anyhow!("response has no choices[0].message.content"));
    }
    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::config::LlmConfig;
    use crate::report::llm::{extract_content, LlmClient};

    #[test]
    fn extracts_first_choice_content() {
        let value = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "  Strong finish.  "}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        });
        assert_eq!(extract_content(&value).expect("content"), "Strong finish.");
    }

    #[test]
    fn rejects_missing_or_blank_content() {
        assert!(extract_content(&json!({"choices": []})).is_err());
        assert!(extract_content(&json!({"choices": [{"message": {"content": " "}}]})).is_err());
        assert!(extract_content(&json!({"error": {"message": "quota"}})).is_err());
    }

    #[test]
    fn client_requires_api_key() {
        let config = LlmConfig {
            api_key_env: "HOTEL_SIM_TEST_MISSING_KEY".to_string(),
            ..LlmConfig::default()
        };
        assert!(LlmClient::from_config(&config).is_err());

        let config = LlmConfig {
            api_key: "sk-test".to_string(),
            ..LlmConfig::default()
        };
        let client = LlmClient::from_config(&config).expect("client");
        assert_eq!(client.max_tokens, 600);
    }
}
