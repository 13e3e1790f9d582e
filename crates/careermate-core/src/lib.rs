pub mod classifier;
pub mod config;
pub mod markdown;
pub mod message;
pub mod prompts;

pub use classifier::{is_maps_query, MAPS_KEYWORDS};
pub use config::{Config, ConfigError};
pub use markdown::{parse_markdown, Block, Inline, Line};
pub use message::{Citation, Coordinates, Message, Sender};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
