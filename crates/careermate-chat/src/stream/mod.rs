pub mod handler;

pub use handler::{consume_text_stream, StreamHandlingOutput};
