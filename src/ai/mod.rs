pub mod chat_client;
pub mod prompt;
pub mod response;

pub use chat_client::{ChatMessage, ChatRequest, OpenAiChatClient};
pub use prompt::{PromptArguments, PromptTemplate};
pub use response::{ChatCompletion, ResponseParser};
