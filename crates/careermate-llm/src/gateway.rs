use async_trait::async_trait;
use careermate_core::{Citation, Coordinates};
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication error: {0}")]
    Auth(String),
}

pub type Result<T> = std::result::Result<T, LLMError>;

/// Ordered text fragments of one model reply. Finite and not restartable.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Final text of a grounded call plus the places it cited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundedResponse {
    pub text: String,
    pub sources: Vec<Citation>,
}

/// A stateful exchange pinned to the assistant's system instruction.
#[async_trait]
pub trait ChatSession: Send {
    /// Send one user turn and stream back the reply.
    ///
    /// The turn is only added to the session history once the returned
    /// stream has been drained without error.
    async fn send_message_stream(&mut self, text: &str) -> Result<TextStream>;
}

#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Open a new conversational session.
    fn start_chat(&self) -> Box<dyn ChatSession>;

    /// Single-shot generation with maps retrieval anchored at `location`.
    ///
    /// Citations missing either a title or a URI are dropped.
    async fn maps_grounded_response(
        &self,
        prompt: &str,
        location: Coordinates,
    ) -> Result<GroundedResponse>;
}
