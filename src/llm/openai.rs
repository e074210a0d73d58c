//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use secrecy::ExposeSecret as _;
use serde::Deserialize;
use serde_json::json;

use crate::error::LlmError;
use crate::input::{ContentPart, WorkflowInput};

use super::{GenerationRequest, GenerationResponse, GeneratorConfig, TextGenerator, Usage};

const PROVIDER: &str = "openai";

/// Chat-completions client over `reqwest`. Works against any endpoint that
/// speaks the OpenAI wire format.
pub struct OpenAiGenerator {
    http: reqwest::Client,
    config: GeneratorConfig,
}

impl OpenAiGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn build_body(&self, request: &GenerationRequest) -> serde_json::Value {
        let user_content = match &request.input {
            WorkflowInput::Text(text) => json!(text),
            WorkflowInput::Parts(parts) => {
                let items: Vec<serde_json::Value> = parts.iter().map(content_part).collect();
                json!(items)
            }
        };

        let mut body = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": request.instructions},
                {"role": "user", "content": user_content},
            ],
        });
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max) = request.max_output_tokens {
            body["max_completion_tokens"] = json!(max);
        }
        body
    }
}

fn content_part(part: &ContentPart) -> serde_json::Value {
    match part {
        ContentPart::Text { text } => json!({"type": "text", "text": text}),
        ContentPart::Image {
            media_type,
            data_base64,
        } => json!({
            "type": "image_url",
            "image_url": {"url": format!("data:{media_type};base64,{data_base64}")},
        }),
        ContentPart::File {
            filename,
            media_type,
            data_base64,
        } => json!({
            "type": "file",
            "file": {
                "filename": filename,
                "file_data": format!("data:{media_type};base64,{data_base64}"),
            },
        }),
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = self.build_body(&request);

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::BadStatus {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: format!("malformed completion body: {e}"),
        })?;

        let content = parsed
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: "no completion content".to_string(),
            })?;

        let usage = parsed
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(GenerationResponse { content, usage })
    }
}
