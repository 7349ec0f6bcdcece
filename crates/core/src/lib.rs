pub mod error;
pub mod functions;
pub mod models;
pub mod prompts;

pub use error::{CompletionError, InterpretError};
pub use functions::{function_definitions, FunctionCall, FunctionName};
pub use models::*;
pub use prompts::{summarizer_user_prompt, INTERPRETER_SYSTEM_PROMPT, SUMMARIZER_SYSTEM_PROMPT};
