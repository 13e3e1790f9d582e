//! Stateful chat over the stateless `streamGenerateContent` endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::Mutex;

use super::stream::gemini_text_stream;
use super::GeminiEndpoint;
use crate::gateway::{ChatSession, Result, TextStream};
use crate::protocol::{Content, GenerateContentRequest};

/// Chat session that resends the accumulated history on every turn.
pub struct GeminiChatSession {
    endpoint: GeminiEndpoint,
    system_instruction: String,
    history: Arc<Mutex<Vec<Content>>>,
}

impl GeminiChatSession {
    pub(crate) fn new(endpoint: GeminiEndpoint, system_instruction: String) -> Self {
        Self {
            endpoint,
            system_instruction,
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    async fn send_message_stream(&mut self, text: &str) -> Result<TextStream> {
        let user_turn = Content::user(text);

        let mut contents = self.history.lock().await.clone();
        contents.push(user_turn.clone());
        let turn_count = contents.len();

        let request = GenerateContentRequest::chat(contents, &self.system_instruction);
        let response = self
            .endpoint
            .post("streamGenerateContent", true, &request)
            .await?;

        log::debug!("Gemini stream started ({} turns in context)", turn_count);

        let mut fragments = gemini_text_stream(response);
        let history = Arc::clone(&self.history);

        let stream = async_stream::stream! {
            let mut reply = String::new();

            while let Some(item) = fragments.next().await {
                match item {
                    Ok(fragment) => {
                        reply.push_str(&fragment);
                        yield Ok(fragment);
                    }
                    Err(err) => {
                        log::warn!("Gemini stream failed after {} chars: {}", reply.len(), err);
                        yield Err(err);
                        return;
                    }
                }
            }

            let mut history = history.lock().await;
            history.push(user_turn);
            history.push(Content::model(reply));
        };

        Ok(Box::pin(stream))
    }
}
