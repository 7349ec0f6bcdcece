use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterpretError {
    #[error("model selected unknown function `{0}`")]
    UnknownFunction(String),
    #[error("arguments for `{function}` do not match its schema: {source}")]
    MalformedArguments {
        function: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalidFunction was called with valid=true")]
    ValidFlagSet,
}

/// Failures talking to the completion API.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Transport(String),
    #[error("completion API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion payload could not be decoded: {0}")]
    Decode(String),
    #[error("completion response contained no choices")]
    MissingChoice,
    #[error("completion response did not select a function")]
    MissingFunctionCall,
    #[error(transparent)]
    Interpretation(#[from] InterpretError),
}

impl CompletionError {
    /// The model answered, but not through one of the offered functions.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::MissingFunctionCall)
    }
}
