//! OpenAI-compatible chat-completions client.
//!
//! `generation.endpoint` is the full URL of the chat-completions route (for a
//! local llama.cpp or vLLM server typically `http://host:port/v1/chat/completions`).
//! `OPENAI_API_KEY` is sent as a bearer token when set. There is no retry: a
//! failed call is reported once and the caller decides what to do.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use qadesk_core::config::GenerationSettings;
use qadesk_core::traits::AnswerGenerator;

const SYSTEM_PROMPT: &str = "You answer questions for a help desk. Use only the provided context. \
If the context does not contain the answer, say that you do not know.";

pub struct HttpAnswerGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    model_id: String,
    api_key: Option<String>,
}

impl HttpAnswerGenerator {
    pub fn new(settings: &GenerationSettings) -> Result<Self> {
        let endpoint = settings
            .endpoint
            .clone()
            .ok_or_else(|| anyhow!("generation.endpoint required for http provider"))?;
        let model = settings
            .model
            .clone()
            .ok_or_else(|| anyhow!("generation.model required for http provider"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            model_id: format!("http:{}", model),
            model,
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
        })
    }
}

#[async_trait]
impl AnswerGenerator for HttpAnswerGenerator {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate(&self, query: &str, context: &str) -> Result<String> {
        let body = chat_request_body(&self.model, query, context);
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("generation API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        let answer = parse_chat_response(&json)?;
        debug!(model = %self.model, chars = answer.len(), "generated answer");
        Ok(answer)
    }
}

pub fn chat_request_body(model: &str, query: &str, context: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "temperature": 0.0,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": format!("Context:\n{}\n\nQuestion: {}", context, query) },
        ],
    })
}

/// Extract `choices[0].message.content`, rejecting a missing or blank answer.
pub fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    let content = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| anyhow!("Invalid chat response: missing choices[0].message.content"))?;
    let content = content.trim();
    if content.is_empty() {
        bail!("generation API returned an empty answer");
    }
    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_context_and_question() {
        let body = chat_request_body("local", "When are the exams?", "Exams start in October.");
        assert_eq!(body["model"], "local");
        let user = body["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("Exams start in October."));
        assert!(user.ends_with("Question: When are the exams?"));
    }

    #[test]
    fn parses_first_choice() {
        let json = serde_json::json!({ "choices": [ { "message": { "role": "assistant", "content": "  In October. " } } ] });
        assert_eq!(parse_chat_response(&json).unwrap(), "In October.");
    }

    #[test]
    fn rejects_missing_or_blank_content() {
        assert!(parse_chat_response(&serde_json::json!({ "choices": [] })).is_err());
        let blank = serde_json::json!({ "choices": [ { "message": { "content": "   " } } ] });
        assert!(parse_chat_response(&blank).is_err());
    }

    #[test]
    fn new_requires_endpoint_and_model() {
        let settings = GenerationSettings::default();
        assert!(HttpAnswerGenerator::new(&settings).is_err());
    }
}
