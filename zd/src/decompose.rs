//! Decomposer - LLM-driven breakdown of a task into subtasks
//!
//! Sends the task text to the configured provider with a
//! `{ "subtasks": string[] }` response schema and returns the suggestions.
//! The caller decides what to do with them; nothing here touches the store.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::llm::{self, CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, ResponseSchema};

/// Name of the schema / forced tool carrying the suggestions
pub const SUBTASKS_SCHEMA_NAME: &str = "submit_subtasks";

const SYSTEM_PROMPT: &str = "You help people break complex tasks into small, concrete steps. \
                             Each subtask is one short imperative sentence.";

/// Why a decomposition produced no usable suggestions
#[derive(Debug, Error)]
pub enum DecomposeError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Malformed decomposition payload: {0}")]
    Malformed(String),

    #[error("Decomposition payload is missing the '{0}' field")]
    MissingField(&'static str),
}

/// Outcome of one decomposition request
#[derive(Debug)]
pub enum DecomposeOutcome {
    /// Parsed suggestions, possibly empty
    Suggestions(Vec<String>),
    /// The request or the payload failed
    Failed(DecomposeError),
}

impl DecomposeOutcome {
    /// Collapse to the plain list contract: empty on any failure
    pub fn into_suggestions(self) -> Vec<String> {
        match self {
            Self::Suggestions(s) => s,
            Self::Failed(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SubtasksPayload {
    subtasks: Option<Vec<String>>,
}

/// Breaks task descriptions into actionable subtasks
pub struct Decomposer {
    llm: Arc<dyn LlmClient>,
    max_tokens: u32,
}

impl Decomposer {
    pub fn new(llm: Arc<dyn LlmClient>, max_tokens: u32) -> Self {
        debug!(provider = llm.provider(), max_tokens, "Decomposer::new: called");
        Self { llm, max_tokens }
    }

    /// Build a decomposer for the configured provider
    ///
    /// Fails when the provider's API key variable is not set.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(provider = %config.provider, "Decomposer::from_config: called");
        let client = llm::create_client(config)?;
        Ok(Self::new(client, config.max_tokens))
    }

    /// Decompose `text`, returning an empty list on any failure
    pub async fn decompose(&self, text: &str) -> Vec<String> {
        self.try_decompose(text).await.into_suggestions()
    }

    /// Decompose `text`, reporting why it failed
    pub async fn try_decompose(&self, text: &str) -> DecomposeOutcome {
        debug!(text_len = text.len(), "Decomposer::try_decompose: called");
        let text = text.trim();
        if text.is_empty() {
            debug!("Decomposer::try_decompose: blank text, nothing to do");
            return DecomposeOutcome::Suggestions(Vec::new());
        }

        let response = match self.llm.complete(self.build_request(text)).await {
            Ok(r) => r,
            Err(e) => {
                warn!(provider = self.llm.provider(), error = %e, "Decomposition request failed");
                return DecomposeOutcome::Failed(e.into());
            }
        };

        match parse_subtasks(&response) {
            Ok(subtasks) => {
                info!(count = subtasks.len(), "Task decomposed into {} subtasks", subtasks.len());
                DecomposeOutcome::Suggestions(subtasks)
            }
            Err(e) => {
                warn!(error = %e, "Decomposition reply could not be parsed");
                DecomposeOutcome::Failed(e)
            }
        }
    }

    fn build_request(&self, text: &str) -> CompletionRequest {
        CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            messages: vec![Message::user(build_prompt(text))],
            response_schema: Some(subtasks_schema()),
            max_tokens: self.max_tokens,
        }
    }
}

/// User prompt asking for 3-5 subtasks of `text`
pub fn build_prompt(text: &str) -> String {
    format!(
        "Decompose the following complex task into 3-5 clear, actionable subtasks: \"{}\"",
        text
    )
}

/// Schema every provider constrains the reply to
pub fn subtasks_schema() -> ResponseSchema {
    ResponseSchema::new(
        SUBTASKS_SCHEMA_NAME,
        "List of actionable subtasks",
        serde_json::json!({
            "type": "object",
            "properties": {
                "subtasks": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "List of actionable subtasks"
                }
            },
            "required": ["subtasks"],
            "additionalProperties": false
        }),
    )
}

/// Extract suggestions from a completion
///
/// A `submit_subtasks` tool call wins; otherwise the text content is parsed as
/// JSON, with Markdown code fences tolerated.
pub fn parse_subtasks(response: &CompletionResponse) -> Result<Vec<String>, DecomposeError> {
    debug!(tool_calls = response.tool_calls.len(), "parse_subtasks: called");
    let payload: SubtasksPayload = match response.tool_calls.iter().find(|c| c.name == SUBTASKS_SCHEMA_NAME) {
        Some(call) => {
            serde_json::from_value(call.input.clone()).map_err(|e| DecomposeError::Malformed(e.to_string()))?
        }
        None => {
            let content = response
                .content
                .as_deref()
                .ok_or_else(|| DecomposeError::Malformed("empty reply".to_string()))?;
            serde_json::from_str(strip_code_fences(content)).map_err(|e| DecomposeError::Malformed(e.to_string()))?
        }
    };

    payload.subtasks.ok_or(DecomposeError::MissingField("subtasks"))
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
