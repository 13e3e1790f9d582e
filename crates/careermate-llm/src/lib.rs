pub mod gateway;
pub mod protocol;
pub mod providers;

pub use gateway::{AiGateway, ChatSession, GroundedResponse, LLMError, Result, TextStream};
pub use providers::GeminiGateway;
