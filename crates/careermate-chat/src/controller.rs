//! Turn dispatch: route each user message to the maps-grounded call or the
//! streaming chat session and record the outcome in the conversation.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tokio::sync::mpsc;

use careermate_core::prompts::{location_required_reply, CONNECTION_ERROR_REPLY, MAPS_ERROR_REPLY};
use careermate_core::{is_maps_query, Coordinates, Message};
use careermate_llm::{AiGateway, ChatSession, GroundedResponse, LLMError};

use crate::conversation::{Conversation, ConversationEvent};
use crate::location::LocationState;
use crate::stream::consume_text_stream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Answered by the maps-grounded call.
    Grounded,
    /// Maps query without coordinates; answered locally.
    LocationRequired,
    /// Answered by the chat session stream.
    Streamed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input: nothing was appended and the gateway was not called.
    Rejected,
    Completed(Route),
    /// The gateway failed and an apology was recorded instead.
    Failed(Route),
}

pub struct ChatController {
    gateway: Arc<dyn AiGateway>,
    session: Option<Box<dyn ChatSession>>,
    location: LocationState,
    conversation: Conversation,
}

impl ChatController {
    /// Open a chat session and greet the user.
    pub fn new(gateway: Arc<dyn AiGateway>, location: LocationState) -> Self {
        let session = Some(gateway.start_chat());
        Self {
            gateway,
            session,
            location,
            conversation: Conversation::with_greeting(),
        }
    }

    /// Controller with an empty log and no open session.
    pub fn bare(gateway: Arc<dyn AiGateway>, location: LocationState) -> Self {
        Self {
            gateway,
            session: None,
            location,
            conversation: Conversation::new(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn location(&self) -> &LocationState {
        &self.location
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Run one user turn.
    ///
    /// Gateway failures never escape: they are recorded as bot replies. The
    /// loading flag is set for the duration of the turn and cleared even if
    /// this future is dropped before completion.
    ///
    /// Events are sent with backpressure, so `event_tx`'s receiver must be
    /// drained concurrently (for example joined with this future) unless its
    /// capacity covers every event of the turn.
    pub async fn send_message(
        &mut self,
        text: &str,
        event_tx: &mpsc::Sender<ConversationEvent>,
    ) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Rejected;
        }

        self.conversation.append(Message::user(text), event_tx).await;

        let mut turn = LoadingGuard::new(self, event_tx);
        turn.conversation.set_loading(true, event_tx).await;

        let outcome = if is_maps_query(text) {
            let coordinates = turn.location.coordinates;
            match coordinates {
                Some(coordinates) => turn.dispatch_grounded(text, coordinates, event_tx).await,
                None => turn.dispatch_location_required(event_tx).await,
            }
        } else {
            turn.dispatch_streamed(text, event_tx).await
        };

        turn.finish().await;
        log::debug!("Turn finished: {:?}", outcome);
        outcome
    }

    async fn dispatch_grounded(
        &mut self,
        text: &str,
        coordinates: Coordinates,
        event_tx: &mpsc::Sender<ConversationEvent>,
    ) -> SendOutcome {
        match self.gateway.maps_grounded_response(text, coordinates).await {
            Ok(GroundedResponse { text, sources }) => {
                self.conversation
                    .append(Message::bot_with_sources(text, sources), event_tx)
                    .await;
                SendOutcome::Completed(Route::Grounded)
            }
            Err(err) => {
                log::error!("Error getting maps grounded response: {}", err);
                self.conversation
                    .append(Message::bot(MAPS_ERROR_REPLY), event_tx)
                    .await;
                SendOutcome::Failed(Route::Grounded)
            }
        }
    }

    async fn dispatch_location_required(
        &mut self,
        event_tx: &mpsc::Sender<ConversationEvent>,
    ) -> SendOutcome {
        let reply = location_required_reply(self.location.error.as_deref());
        self.conversation.append(Message::bot(reply), event_tx).await;
        SendOutcome::Completed(Route::LocationRequired)
    }

    async fn dispatch_streamed(
        &mut self,
        text: &str,
        event_tx: &mpsc::Sender<ConversationEvent>,
    ) -> SendOutcome {
        let mut placeholder: Option<String> = None;

        match self.stream_reply(text, &mut placeholder, event_tx).await {
            Ok(()) => SendOutcome::Completed(Route::Streamed),
            Err(err) => {
                log::error!("Failed to send message: {}", err);
                self.record_connection_failure(placeholder.as_deref(), event_tx)
                    .await;
                SendOutcome::Failed(Route::Streamed)
            }
        }
    }

    async fn stream_reply(
        &mut self,
        text: &str,
        placeholder: &mut Option<String>,
        event_tx: &mpsc::Sender<ConversationEvent>,
    ) -> Result<(), LLMError> {
        let session = self.session.get_or_insert_with(|| {
            log::debug!("No chat session open, starting a new one");
            self.gateway.start_chat()
        });
        let stream = session.send_message_stream(text).await?;

        let id = self.conversation.append(Message::bot(""), event_tx).await;
        *placeholder = Some(id.clone());

        let output = consume_text_stream(stream, &mut self.conversation, &id, event_tx).await?;
        log::debug!(
            "Streamed reply complete: {} fragments, {} chars",
            output.fragment_count,
            output.content.len()
        );
        Ok(())
    }

    /// Record the connection apology, reusing the streaming placeholder if
    /// one was already appended for this turn.
    async fn record_connection_failure(
        &mut self,
        placeholder: Option<&str>,
        event_tx: &mpsc::Sender<ConversationEvent>,
    ) {
        let partial = placeholder.and_then(|id| {
            self.conversation
                .last()
                .filter(|message| message.id == id)
                .map(|message| message.content.clone())
        });

        match (placeholder, partial) {
            (Some(id), Some(partial)) => {
                let content = if partial.is_empty() {
                    CONNECTION_ERROR_REPLY.to_string()
                } else {
                    format!("{}\n\n{}", partial, CONNECTION_ERROR_REPLY)
                };
                self.conversation.update_content(id, &content, event_tx).await;
            }
            _ => {
                self.conversation
                    .append(Message::bot(CONNECTION_ERROR_REPLY), event_tx)
                    .await;
            }
        }
    }
}

/// Holds the controller for the duration of a turn and clears the loading
/// flag if the turn is dropped before [`LoadingGuard::finish`].
struct LoadingGuard<'a> {
    controller: &'a mut ChatController,
    event_tx: &'a mpsc::Sender<ConversationEvent>,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(controller: &'a mut ChatController, event_tx: &'a mpsc::Sender<ConversationEvent>) -> Self {
        Self {
            controller,
            event_tx,
            armed: true,
        }
    }

    async fn finish(mut self) {
        self.armed = false;
        self.controller
            .conversation
            .set_loading(false, self.event_tx)
            .await;
    }
}

impl Deref for LoadingGuard<'_> {
    type Target = ChatController;

    fn deref(&self) -> &ChatController {
        self.controller
    }
}

impl DerefMut for LoadingGuard<'_> {
    fn deref_mut(&mut self) -> &mut ChatController {
        self.controller
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            log::warn!("Turn abandoned before completion, clearing loading state");
            self.controller.conversation.reset_loading(self.event_tx);
        }
    }
}
