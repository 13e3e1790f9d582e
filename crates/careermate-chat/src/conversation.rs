//! In-memory conversation log and the events published when it changes.

use careermate_core::prompts::{suggestions_visible, GREETING};
use careermate_core::{Message, Sender};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// A change to the conversation, in the order it was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    MessageAppended { message: Message },

    /// Running content of the streaming bot message.
    MessageUpdated { id: String, content: String },

    LoadingChanged { loading: bool },
}

/// Ordered message log plus the in-flight flag.
///
/// Messages are only ever appended. The one exception is the content of the
/// latest bot message, which is overwritten while its reply streams in.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    loading: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conversation opened with the assistant's greeting.
    pub fn with_greeting() -> Self {
        Self {
            messages: vec![Message::bot(GREETING)],
            loading: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn suggestions_visible(&self) -> bool {
        suggestions_visible(self.messages.len())
    }

    pub(crate) async fn append(
        &mut self,
        message: Message,
        event_tx: &mpsc::Sender<ConversationEvent>,
    ) -> String {
        let id = message.id.clone();
        self.messages.push(message.clone());
        let _ = event_tx
            .send(ConversationEvent::MessageAppended { message })
            .await;
        id
    }

    /// Overwrite the content of the latest message if it is the bot message `id`.
    pub(crate) async fn update_content(
        &mut self,
        id: &str,
        content: &str,
        event_tx: &mpsc::Sender<ConversationEvent>,
    ) -> bool {
        let Some(last) = self.messages.last_mut() else {
            return false;
        };
        if last.id != id || last.sender != Sender::Bot {
            log::warn!("Ignoring content update for message {} (not the latest bot message)", id);
            return false;
        }

        last.content.clear();
        last.content.push_str(content);
        let _ = event_tx
            .send(ConversationEvent::MessageUpdated {
                id: id.to_string(),
                content: content.to_string(),
            })
            .await;
        true
    }

    pub(crate) async fn set_loading(
        &mut self,
        loading: bool,
        event_tx: &mpsc::Sender<ConversationEvent>,
    ) {
        self.loading = loading;
        let _ = event_tx
            .send(ConversationEvent::LoadingChanged { loading })
            .await;
    }

    /// Synchronous variant of `set_loading(false, ..)` for drop paths. The
    /// event is dropped if the channel is full or closed.
    pub(crate) fn reset_loading(&mut self, event_tx: &mpsc::Sender<ConversationEvent>) {
        self.loading = false;
        if let Err(e) = event_tx.try_send(ConversationEvent::LoadingChanged { loading: false }) {
            log::debug!("Loading reset event not delivered: {}", e);
        }
    }
}
