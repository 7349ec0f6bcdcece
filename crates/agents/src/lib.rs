pub mod backend;
pub mod interpreter;
pub mod openai;
pub mod sse;
pub mod summarizer;

pub use backend::{
    AssistantMessage, ChatMessage, ChatRequest, CompletionBackend, FragmentStream,
};
pub use interpreter::QueryInterpreter;
pub use openai::{OpenAiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use summarizer::ResponseSummarizer;
