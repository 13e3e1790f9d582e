//! Wire formats for the generative-language REST API.

pub mod gemini;

pub use gemini::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GroundingChunk,
    GroundingMetadata, Part, Tool, ToolConfig,
};
