use futures::StreamExt;
use tokio::sync::mpsc;

use careermate_llm::{LLMError, TextStream};

use crate::conversation::{Conversation, ConversationEvent};

pub struct StreamHandlingOutput {
    pub content: String,
    pub fragment_count: usize,
}

/// Drain `stream` into the bot message `message_id`.
///
/// Fragments are appended to a running buffer in arrival order, and after
/// each one the message content is overwritten with the buffer.
pub async fn consume_text_stream(
    mut stream: TextStream,
    conversation: &mut Conversation,
    message_id: &str,
    event_tx: &mpsc::Sender<ConversationEvent>,
) -> Result<StreamHandlingOutput, LLMError> {
    let mut content = String::new();
    let mut fragment_count = 0usize;

    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        fragment_count += 1;
        content.push_str(&fragment);
        conversation
            .update_content(message_id, &content, event_tx)
            .await;
    }

    log::debug!(
        "[{}] Stream completed: {} fragments, {} chars",
        message_id,
        fragment_count,
        content.len()
    );

    Ok(StreamHandlingOutput {
        content,
        fragment_count,
    })
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use careermate_core::Message;

    use super::*;

    fn build_stream(items: Vec<careermate_llm::Result<String>>) -> TextStream {
        Box::pin(stream::iter(items))
    }

    #[tokio::test]
    async fn accumulates_fragments_and_publishes_running_content() {
        let (event_tx, mut event_rx) = mpsc::channel::<ConversationEvent>(16);
        let mut conversation = Conversation::new();
        let id = conversation.append(Message::bot(""), &event_tx).await;
        let _ = event_rx.recv().await;

        let output = consume_text_stream(
            build_stream(vec![Ok("Hel".to_string()), Ok("lo".to_string())]),
            &mut conversation,
            &id,
            &event_tx,
        )
        .await
        .expect("stream should succeed");

        assert_eq!(output.content, "Hello");
        assert_eq!(output.fragment_count, 2);
        assert_eq!(conversation.last().unwrap().content, "Hello");

        let mut seen = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            match event {
                ConversationEvent::MessageUpdated { id: updated, content } => {
                    assert_eq!(updated, id);
                    seen.push(content);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(seen, vec!["Hel".to_string(), "Hello".to_string()]);
    }

    #[tokio::test]
    async fn error_stops_consumption_and_keeps_partial_content() {
        let (event_tx, _event_rx) = mpsc::channel::<ConversationEvent>(16);
        let mut conversation = Conversation::new();
        let id = conversation.append(Message::bot(""), &event_tx).await;

        let result = consume_text_stream(
            build_stream(vec![
                Ok("partial".to_string()),
                Err(LLMError::Stream("connection reset".to_string())),
                Ok("never".to_string()),
            ]),
            &mut conversation,
            &id,
            &event_tx,
        )
        .await;

        assert!(matches!(result, Err(LLMError::Stream(_))));
        assert_eq!(conversation.last().unwrap().content, "partial");
    }

    #[tokio::test]
    async fn empty_stream_leaves_placeholder_empty() {
        let (event_tx, _event_rx) = mpsc::channel::<ConversationEvent>(4);
        let mut conversation = Conversation::new();
        let id = conversation.append(Message::bot(""), &event_tx).await;

        let output = consume_text_stream(build_stream(vec![]), &mut conversation, &id, &event_tx)
            .await
            .unwrap();

        assert_eq!(output.fragment_count, 0);
        assert_eq!(conversation.last().unwrap().content, "");
    }
}
