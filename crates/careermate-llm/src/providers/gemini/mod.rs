//! Google Gemini gateway implementation.

mod chat;
mod stream;

pub use chat::GeminiChatSession;
pub use stream::parse_gemini_sse_event;

use async_trait::async_trait;
use careermate_core::config::{DEFAULT_API_BASE, DEFAULT_MODEL};
use careermate_core::prompts::{EMPTY_MODEL_REPLY, SYSTEM_INSTRUCTION};
use careermate_core::{Config, ConfigError, Coordinates};
use reqwest::{Client, Response};
use serde::Serialize;

use crate::gateway::{AiGateway, ChatSession, GroundedResponse, LLMError, Result};
use crate::protocol::{GenerateContentRequest, GenerateContentResponse};

/// Connection details shared by the gateway and the sessions it opens.
#[derive(Clone)]
pub(crate) struct GeminiEndpoint {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiEndpoint {
    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.base_url.trim_end_matches('/'),
            self.model,
            method
        )
    }

    /// POST `body` to `models/{model}:{method}`. Non-success statuses become errors.
    pub(crate) async fn post<B: Serialize + ?Sized>(
        &self,
        method: &str,
        sse: bool,
        body: &B,
    ) -> Result<Response> {
        let url = self.method_url(method);
        log::debug!("Gemini POST {}", url);

        let mut request = self.client.post(&url).query(&[("key", self.api_key.as_str())]);
        if sse {
            request = request.query(&[("alt", "sse")]);
        }

        let response = request
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(LLMError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.map_err(LLMError::Http)?;

            if status == 401 || status == 403 {
                return Err(LLMError::Auth(format!(
                    "Gemini authentication failed: {}. Please check your API key.",
                    text
                )));
            }

            return Err(LLMError::Api(format!(
                "Gemini API error: HTTP {}: {}",
                status, text
            )));
        }

        Ok(response)
    }
}

/// Google Gemini API gateway.
pub struct GeminiGateway {
    endpoint: GeminiEndpoint,
    system_instruction: String,
}

impl GeminiGateway {
    /// Create a new Gemini gateway with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: GeminiEndpoint {
                client: Client::new(),
                api_key: api_key.into(),
                base_url: DEFAULT_API_BASE.to_string(),
                model: DEFAULT_MODEL.to_string(),
            },
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
        }
    }

    /// Build from startup configuration. Fails when no API key is set.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ConfigError> {
        let api_key = config.require_api_key()?;
        Ok(Self::new(api_key)
            .with_base_url(config.api_base())
            .with_model(config.model()))
    }

    /// Set a custom base URL (e.g., for proxies or alternative endpoints).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint.base_url = url.into();
        self
    }

    /// Set the model name (e.g., "gemini-2.5-flash").
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.endpoint.model = model.into();
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.endpoint.model
    }
}

#[async_trait]
impl AiGateway for GeminiGateway {
    fn start_chat(&self) -> Box<dyn ChatSession> {
        log::debug!("Starting Gemini chat session with model '{}'", self.endpoint.model);
        Box::new(GeminiChatSession::new(
            self.endpoint.clone(),
            self.system_instruction.clone(),
        ))
    }

    async fn maps_grounded_response(
        &self,
        prompt: &str,
        location: Coordinates,
    ) -> Result<GroundedResponse> {
        let request = GenerateContentRequest::maps_grounded(prompt, location);
        log::debug!(
            "Gemini grounded request: {}",
            serde_json::to_string(&request).unwrap_or_default()
        );

        let response: GenerateContentResponse = self
            .endpoint
            .post("generateContent", false, &request)
            .await?
            .json()
            .await
            .map_err(LLMError::Http)?;

        if let Some(reason) = response.block_reason() {
            return Err(LLMError::Api(format!("Prompt blocked by Gemini: {}", reason)));
        }

        let text = response.text();
        let sources = response.maps_citations();
        log::debug!(
            "Gemini grounded response: {} chars, {} sources",
            text.len(),
            sources.len()
        );

        Ok(GroundedResponse {
            text: if text.is_empty() {
                EMPTY_MODEL_REPLY.to_string()
            } else {
                text
            },
            sources,
        })
    }
}
