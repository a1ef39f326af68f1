//! OpenAI-compatible adapter.
//!
//! Talks to any endpoint that follows the OpenAI chat completions contract
//! (OpenAI itself, Azure-style proxies with a rewritten base URL, Ollama,
//! vLLM, LM Studio).

use std::time::Duration;

use serde_json::Value;

use crate::traits::{ChatRequest, ChatResponse, LlmProvider, Usage};
use crate::util::from_reqwest;
use dc_domain::config::LlmConfig;
use dc_domain::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A chat-completion client for an OpenAI-compatible API endpoint.
pub struct OpenAiCompatProvider {
    id: String,
    base_url: String,
    api_key: String,
    default_model: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Build the adapter from the `[llm]` config section and a resolved key.
    ///
    /// The client carries `timeout_ms` as a whole-request deadline.
    pub fn from_config(cfg: &LlmConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            id: cfg.provider_id.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            default_model: cfg.model.clone(),
            client,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn effective_model(&self, req: &ChatRequest) -> String {
        req.model
            .clone()
            .unwrap_or_else(|| self.default_model.clone())
    }

    fn build_chat_body(&self, req: &ChatRequest) -> Value {
        let mut body = serde_json::json!({
            "model": self.effective_model(req),
            "messages": req.messages,
        });
        if let Some(temp) = req.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max) = req.max_tokens {
            body["max_tokens"] = serde_json::json!(max);
        }
        body
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn parse_chat_response(provider: &str, body: &Value) -> Result<ChatResponse> {
    let malformed = |message: &str| Error::Provider {
        provider: provider.to_string(),
        message: message.to_string(),
    };

    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| malformed("no choices in response"))?;

    let content = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| malformed("first choice has no text content"))?
        .to_string();

    let finish_reason = choice
        .get("finish_reason")
        .and_then(|v| v.as_str())
        .map(String::from);

    let model = body
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    let usage = body.get("usage").and_then(parse_openai_usage);

    Ok(ChatResponse {
        content,
        usage,
        model,
        finish_reason,
    })
}

fn parse_openai_usage(v: &Value) -> Option<Usage> {
    Some(Usage {
        prompt_tokens: v.get("prompt_tokens")?.as_u64()? as u32,
        completion_tokens: v.get("completion_tokens")?.as_u64()? as u32,
        total_tokens: v.get("total_tokens")?.as_u64()? as u32,
    })
}

/// Pull the human-readable message out of an OpenAI error body, falling back
/// to the raw text.
fn error_message(resp_text: &str) -> String {
    serde_json::from_str::<Value>(resp_text)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| resp_text.to_string())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let url = self.chat_url();
        let body = self.build_chat_body(req);

        tracing::debug!(
            provider = %self.id,
            url = %url,
            messages = req.messages.len(),
            "chat completion request"
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(Error::Provider {
                provider: self.id.clone(),
                message: format!("HTTP {} - {}", status.as_u16(), error_message(&resp_text)),
            });
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        parse_chat_response(&self.id, &resp_json)
    }

    fn provider_id(&self) -> &str {
        &self.id
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dc_domain::message::Message;

    fn provider() -> OpenAiCompatProvider {
        let cfg = LlmConfig {
            base_url: "https://api.example.com/v1/".into(),
            ..LlmConfig::default()
        };
        OpenAiCompatProvider::from_config(&cfg, "sk-test".into()).unwrap()
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(provider().chat_url(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn body_carries_fixed_parameters() {
        let req = ChatRequest {
            messages: vec![Message::system("sys"), Message::user("ahoj")],
            temperature: Some(0.5),
            max_tokens: Some(1024),
            model: None,
        };
        let body = provider().build_chat_body(&req);
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "ahoj");
    }

    #[test]
    fn body_omits_unset_parameters() {
        let req = ChatRequest {
            messages: vec![Message::user("hi")],
            model: Some("gpt-4o-mini".into()),
            ..Default::default()
        };
        let body = provider().build_chat_body(&req);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert!(body.get("temperature").is_none());
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn parses_first_choice() {
        let body = serde_json::json!({
            "model": "gpt-4o-2024-08-06",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Dobry den!"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
            ],
            "usage": {"prompt_tokens": 120, "completion_tokens": 8, "total_tokens": 128}
        });
        let resp = parse_chat_response("openai", &body).unwrap();
        assert_eq!(resp.content, "Dobry den!");
        assert_eq!(resp.model, "gpt-4o-2024-08-06");
        assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
        assert_eq!(resp.usage.unwrap().total_tokens, 128);
    }

    #[test]
    fn empty_choices_is_provider_error() {
        let body = serde_json::json!({"choices": []});
        let err = parse_chat_response("openai", &body).unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn null_content_is_provider_error() {
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        });
        assert!(matches!(
            parse_chat_response("openai", &body),
            Err(Error::Provider { .. })
        ));
    }

    #[test]
    fn error_body_message_is_extracted() {
        let raw = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(error_message(raw), "Incorrect API key provided");
        assert_eq!(error_message("upstream down"), "upstream down");
    }
}
