//! Gemini SSE stream parser.
//!
//! With `alt=sse`, every event is one `GenerateContentResponse` object:
//! ```text
//! data: {"candidates":[{"content":{"parts":[{"text":"Hel"}],"role":"model"}}]}
//!
//! data: {"candidates":[{"content":{"parts":[{"text":"lo"}],"role":"model"},"finishReason":"STOP"}]}
//! ```

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::Response;
use serde_json::Value;

use crate::gateway::{LLMError, Result, TextStream};
use crate::protocol::GenerateContentResponse;

/// Text fragments of one `streamGenerateContent?alt=sse` response.
///
/// Events without answer text are skipped. The stream ends after the first
/// error, whether from the transport or from the event payload; nothing
/// after it is read.
pub(crate) fn gemini_text_stream(response: Response) -> TextStream {
    Box::pin(async_stream::stream! {
        let mut events = std::pin::pin!(response.bytes_stream().eventsource());
        let mut received = 0usize;

        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    yield Err(LLMError::Stream(format!(
                        "Gemini SSE transport failed after {} events: {}",
                        received, e
                    )));
                    return;
                }
            };
            received += 1;

            match parse_gemini_sse_event(&event.data) {
                Ok(Some(text)) => yield Ok(text),
                Ok(None) => {}
                Err(err) => {
                    yield Err(err);
                    return;
                }
            }
        }

        log::debug!("Gemini SSE stream closed after {} events", received);
    })
}

/// Parse a single Gemini SSE event into an optional text fragment.
///
/// Returns:
/// - `Ok(Some(text))` for events carrying answer text
/// - `Ok(None)` for events without text (empty data, usage-only, finish markers)
/// - `Err(_)` for malformed JSON, API errors and blocked prompts
///
/// # Example
///
/// ```
/// use careermate_llm::providers::gemini::parse_gemini_sse_event;
///
/// let data = r#"{"candidates":[{"content":{"parts":[{"text":"Hello"}],"role":"model"}}]}"#;
/// let fragment = parse_gemini_sse_event(data).unwrap();
/// assert_eq!(fragment.as_deref(), Some("Hello"));
/// ```
pub fn parse_gemini_sse_event(data: &str) -> Result<Option<String>> {
    let data = data.trim();

    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(data)
        .map_err(|e| LLMError::Stream(format!("Failed to parse Gemini SSE data: {}: {}", e, data)))?;

    if let Some(error) = value.get("error") {
        let error_msg = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown Gemini API error");
        return Err(LLMError::Api(error_msg.to_string()));
    }

    let response: GenerateContentResponse = serde_json::from_value(value)
        .map_err(|e| LLMError::Stream(format!("Unexpected Gemini response shape: {}: {}", e, data)))?;

    if let Some(reason) = response.block_reason() {
        return Err(LLMError::Api(format!("Prompt blocked by Gemini: {}", reason)));
    }

    if let Some(finish_reason) = response
        .candidates
        .first()
        .and_then(|candidate| candidate.finish_reason.as_deref())
    {
        log::debug!("Gemini stream finish reason: {}", finish_reason);
    }

    let text = response.text();
    if text.is_empty() {
        return Ok(None);
    }

    Ok(Some(text))
}
