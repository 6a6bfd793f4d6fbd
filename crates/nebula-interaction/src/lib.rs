//! Everything that talks to the model: prompt rendering, the Gemini client,
//! error classification, retrying transport and response decoding.

pub mod classify;
pub mod decoder;
pub mod gemini_api_agent;
pub mod prompts;
pub mod transport;

pub use classify::{ErrorClass, classify};
pub use decoder::{decode, decode_batch, decode_item, decode_list, strip_code_fences};
pub use gemini_api_agent::GeminiApiAgent;
pub use prompts::PromptBuilder;
pub use transport::{RetryPolicy, RetryingTransport, Transport};
