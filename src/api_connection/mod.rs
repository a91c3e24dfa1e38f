pub mod connection;
pub mod endpoints;

pub use connection::{extract_json_content, strip_code_fences, ApiConnectionError};
pub use endpoints::{ChatCompletionRequest, ChatMessage, Provider};
