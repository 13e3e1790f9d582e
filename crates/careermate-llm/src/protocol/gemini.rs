//! Google Gemini `generateContent` request and response types.
//!
//! Gemini has its own shape:
//! - Messages are called "contents"
//! - Role is "user" or "model" (not "assistant")
//! - Content is an array of "parts"
//! - System instructions are separate from messages
//!
//! # Example maps-grounded request
//! ```json
//! {
//!   "contents": [{"role": "user", "parts": [{"text": "coffee nearby"}]}],
//!   "tools": [{"googleMaps": {}}],
//!   "toolConfig": {
//!     "retrievalConfig": {"latLng": {"latitude": 40.0, "longitude": -74.0}}
//!   }
//! }
//! ```

use careermate_core::{Citation, Coordinates};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
}

impl GenerateContentRequest {
    /// Conversation turn: full history plus the pinned system instruction.
    pub fn chat(contents: Vec<Content>, system_instruction: &str) -> Self {
        Self {
            contents,
            system_instruction: (!system_instruction.trim().is_empty())
                .then(|| Content::system(system_instruction)),
            ..Self::default()
        }
    }

    /// One-shot prompt with the maps retrieval tool anchored at `location`.
    pub fn maps_grounded(prompt: &str, location: Coordinates) -> Self {
        Self {
            contents: vec![Content::user(prompt)],
            system_instruction: None,
            tools: vec![Tool::google_maps()],
            tool_config: Some(ToolConfig::lat_lng(location)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// "user" or "model"; absent on system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Some("model".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated text of all non-thought parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Set on reasoning summaries, which are not part of the answer.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub thought: bool,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            thought: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_maps: Option<GoogleMaps>,
}

impl Tool {
    pub fn google_maps() -> Self {
        Self {
            google_maps: Some(GoogleMaps {}),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GoogleMaps {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub retrieval_config: RetrievalConfig,
}

impl ToolConfig {
    pub fn lat_lng(location: Coordinates) -> Self {
        Self {
            retrieval_config: RetrievalConfig {
                lat_lng: LatLng {
                    latitude: location.latitude,
                    longitude: location.longitude,
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    pub lat_lng: LatLng,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

// ============================================================================
// Response
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, empty if there is none.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(Content::text)
            .unwrap_or_default()
    }

    /// Maps citations of the first candidate with both a title and a URI.
    pub fn maps_citations(&self) -> Vec<Citation> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.grounding_metadata.as_ref())
            .map(|metadata| {
                metadata
                    .grounding_chunks
                    .iter()
                    .filter_map(GroundingChunk::maps_citation)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps: Option<GroundingSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<GroundingSource>,
}

impl GroundingChunk {
    fn maps_citation(&self) -> Option<Citation> {
        let maps = self.maps.as_ref()?;
        let uri = maps.uri.as_deref().filter(|s| !s.is_empty())?;
        let title = maps.title.as_deref().filter(|s| !s.is_empty())?;
        Some(Citation::new(title, uri))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroundingSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_request_shape() {
        let request =
            GenerateContentRequest::maps_grounded("coffee nearby", Coordinates::new(40.0, -74.0));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "coffee nearby"}]}],
                "tools": [{"googleMaps": {}}],
                "toolConfig": {
                    "retrievalConfig": {"latLng": {"latitude": 40.0, "longitude": -74.0}}
                }
            })
        );
    }

    #[test]
    fn chat_request_carries_system_instruction() {
        let request = GenerateContentRequest::chat(
            vec![Content::user("hi"), Content::model("hello"), Content::user("help")],
            "You are CareerMate.",
        );
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "You are CareerMate.");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["contents"].as_array().unwrap().len(), 3);
        assert_eq!(value["contents"][1]["role"], "model");
        assert!(value.get("tools").is_none());
        assert!(value.get("toolConfig").is_none());
    }

    #[test]
    fn blank_system_instruction_is_omitted() {
        let request = GenerateContentRequest::chat(vec![Content::user("hi")], "  ");
        assert!(request.system_instruction.is_none());
    }

    #[test]
    fn response_text_joins_parts_and_skips_thoughts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "thinking...", "thought": true},
                        {"text": "Try "},
                        {"text": "Joe's Café"}
                    ]
                }
            }]
        }))
        .unwrap();

        assert_eq!(response.text(), "Try Joe's Café");
    }

    #[test]
    fn response_without_candidates_has_empty_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.text(), "");
        assert!(response.maps_citations().is_empty());
    }

    #[test]
    fn citations_require_title_and_uri() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "ok"}]},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"maps": {"uri": "https://example.com", "title": "Joe's Café"}},
                        {"maps": {"uri": "https://no-title.example"}},
                        {"maps": {"title": "No URI"}},
                        {"maps": {"uri": "", "title": "Empty URI"}},
                        {"web": {"uri": "https://web.example", "title": "Web"}},
                        {"maps": {"uri": "https://b.example", "title": "Bean There", "placeId": "p1"}}
                    ]
                }
            }]
        }))
        .unwrap();

        assert_eq!(
            response.maps_citations(),
            vec![
                Citation::new("Joe's Café", "https://example.com"),
                Citation::new("Bean There", "https://b.example"),
            ]
        );
    }

    #[test]
    fn block_reason_is_exposed() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert_eq!(response.block_reason(), Some("SAFETY"));
    }
}
