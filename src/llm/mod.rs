//! Text-generation boundary.
//!
//! Every stage delegates its interpretation to an external text-generation
//! capability behind the [`TextGenerator`] trait: instructions plus an input
//! payload in, raw completion text plus usage counters out. The core never
//! inspects how the capability reasons; it only validates what comes back.

pub mod openai;

pub use openai::OpenAiGenerator;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::LlmError;
use crate::input::WorkflowInput;

/// Token usage reported by the capability for one invocation.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// One generation request: stage instructions plus the stage's input payload.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub instructions: String,
    pub input: WorkflowInput,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(instructions: String, input: WorkflowInput) -> Self {
        Self {
            instructions,
            input,
            temperature: None,
            max_output_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }
}

/// Raw completion text plus usage counters.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub content: String,
    pub usage: Usage,
}

/// The opaque external text-generation capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier, for logs and progress events.
    fn model_name(&self) -> &str;

    /// Produce a completion for the request.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError>;
}

/// Configuration for the bundled OpenAI-compatible generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: secrecy::SecretString,
    pub model: String,
    /// Base URL of an OpenAI-compatible chat-completions endpoint.
    pub base_url: String,
}

impl GeneratorConfig {
    pub fn new(api_key: secrecy::SecretString, model: impl Into<String>) -> Self {
        Self {
            api_key,
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Create the default generator from configuration.
pub fn create_generator(config: GeneratorConfig) -> Arc<dyn TextGenerator> {
    tracing::info!(model = %config.model, "Using OpenAI-compatible generator");
    Arc::new(OpenAiGenerator::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_generator_reports_model_name() {
        let config = GeneratorConfig::new(secrecy::SecretString::from("sk-test"), "gpt-5-mini");
        let generator = create_generator(config);
        assert_eq!(generator.model_name(), "gpt-5-mini");
    }

    #[test]
    fn request_builders_set_fields() {
        let input = WorkflowInput::Text("hello".into());
        let request = GenerationRequest::new("instr".into(), input)
            .with_temperature(0.1)
            .with_max_output_tokens(512);
        assert_eq!(request.temperature, Some(0.1));
        assert_eq!(request.max_output_tokens, Some(512));
    }
}
