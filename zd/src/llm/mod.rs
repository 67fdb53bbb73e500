//! LLM client module for ZenDo
//!
//! Provides single-shot completion requests against Gemini, Anthropic or
//! OpenAI, with optional JSON-schema constrained replies.

use std::sync::Arc;

use tracing::debug;

mod anthropic;
pub mod client;
mod error;
mod gemini;
mod openai;
mod retry;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;
pub use types::{
    CompletionRequest, CompletionResponse, Message, ResponseSchema, Role, StopReason, TokenUsage, ToolCall,
};

use crate::config::{LlmConfig, LlmProvider, ResolvedLlmConfig};

/// Create an LLM client based on the provider specified in config
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    create_client_from_resolved(&config.resolve())
}

/// Create an LLM client from a resolved configuration
///
/// Fails with [`LlmError::MissingApiKey`] when the key variable is unset.
pub fn create_client_from_resolved(config: &ResolvedLlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client_from_resolved: called");
    match config.provider {
        LlmProvider::Gemini => Ok(Arc::new(GeminiClient::from_config(config)?)),
        LlmProvider::Anthropic => Ok(Arc::new(AnthropicClient::from_config(config)?)),
        LlmProvider::OpenAI => Ok(Arc::new(OpenAIClient::from_config(config)?)),
    }
}
