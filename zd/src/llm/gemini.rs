//! Google Gemini API client implementation
//!
//! Talks to `generateContent`. A requested [`ResponseSchema`](super::ResponseSchema)
//! is sent as `responseSchema` with `responseMimeType: application/json`, so
//! the reply text is the JSON document itself.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::retry::send_with_retry;
use super::types::Role;
use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, StopReason, TokenUsage};
use crate::config::ResolvedLlmConfig;

/// Gemini API client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    max_retries: u32,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new client from resolved configuration
    pub fn from_config(config: &ResolvedLlmConfig) -> Result<Self, LlmError> {
        debug!(%config.model, %config.base_url, "GeminiClient::from_config: called");
        let api_key = config.get_api_key()?;

        let timeout = Duration::from_millis(config.timeout_ms);

        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the request body for the Gemini API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "GeminiClient::build_request_body: called");
        let mut generation_config = serde_json::json!({
            "maxOutputTokens": request.max_tokens.min(self.max_tokens),
        });

        if let Some(schema) = &request.response_schema {
            debug!(%schema.name, "GeminiClient::build_request_body: adding responseSchema");
            generation_config["responseMimeType"] = serde_json::json!("application/json");
            generation_config["responseSchema"] = schema.to_gemini_schema();
        }

        let mut body = serde_json::json!({
            "contents": convert_messages(&request.messages),
            "generationConfig": generation_config,
        });

        if !request.system_prompt.is_empty() {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": request.system_prompt }]
            });
        }

        body
    }

    /// Parse the Gemini API response
    ///
    /// Text parts of the first candidate are concatenated.
    fn parse_response(&self, api_response: GeminiResponse) -> Result<CompletionResponse, LlmError> {
        debug!(candidates = api_response.candidates.len(), "GeminiClient::parse_response: called");
        let candidate = match api_response.candidates.into_iter().next() {
            Some(c) => c,
            None => {
                let reason = api_response
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "no candidates".to_string());
                return Err(LlmError::InvalidResponse(format!("Gemini returned no candidates: {}", reason)));
            }
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let usage = api_response.usage_metadata.unwrap_or_default();
        Ok(CompletionResponse {
            content: if text.is_empty() { None } else { Some(text) },
            tool_calls: vec![],
            stop_reason: candidate
                .finish_reason
                .as_deref()
                .map(StopReason::from_gemini)
                .unwrap_or(StopReason::EndTurn),
            usage: TokenUsage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            },
        })
    }
}

/// Gemini calls the assistant role `model`
fn convert_messages(messages: &[Message]) -> Vec<serde_json::Value> {
    messages
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "model",
            };
            serde_json::json!({
                "role": role,
                "parts": [{ "text": msg.content }],
            })
        })
        .collect()
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, %request.max_tokens, "GeminiClient::complete: called");
        let url = self.endpoint();
        let body = self.build_request_body(&request);

        let response = send_with_retry("gemini", self.max_retries, self.timeout, || {
            self.http
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(&body)
        })
        .await?;

        let api_response: GeminiResponse = response.json().await?;
        self.parse_response(api_response)
    }

    fn provider(&self) -> &'static str {
        "gemini"
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ResponseSchema;

    fn client() -> GeminiClient {
        GeminiClient {
            model: "gemini-3-flash-preview".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            http: Client::new(),
            max_tokens: 1024,
            max_retries: 0,
            timeout: Duration::from_secs(5),
        }
    }

    fn request(schema: Option<ResponseSchema>) -> CompletionRequest {
        CompletionRequest {
            system_prompt: String::new(),
            messages: vec![Message::user("Plan a trip")],
            response_schema: schema,
            max_tokens: 4096,
        }
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            client().endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[test]
    fn test_build_request_body_basic() {
        let body = client().build_request_body(&request(None));

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Plan a trip");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
        assert!(body["generationConfig"].get("responseSchema").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_build_request_body_with_schema() {
        let schema = ResponseSchema::new(
            "submit_subtasks",
            "List of actionable subtasks",
            serde_json::json!({
                "type": "object",
                "properties": {"subtasks": {"type": "array", "items": {"type": "string"}}},
                "required": ["subtasks"]
            }),
        );
        let mut req = request(Some(schema));
        req.system_prompt = "Be brief".to_string();
        let body = client().build_request_body(&req);

        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be brief");
    }

    #[test]
    fn test_assistant_role_maps_to_model() {
        let contents = convert_messages(&[Message::user("q"), Message::assistant("a")]);
        assert_eq!(contents[1]["role"], "model");
    }

    #[test]
    fn test_parse_response() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"subtasks\":"}, {"text": "[\"a\"]}"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 4}
        });
        let api_response: GeminiResponse = serde_json::from_value(raw).unwrap();
        let response = client().parse_response(api_response).unwrap();

        assert_eq!(response.content.as_deref(), Some("{\"subtasks\":[\"a\"]}"));
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.usage.input_tokens, 10);
        assert_eq!(response.usage.output_tokens, 4);
    }

    #[test]
    fn test_parse_blocked_prompt() {
        let raw = serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        });
        let api_response: GeminiResponse = serde_json::from_value(raw).unwrap();
        let err = client().parse_response(api_response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
