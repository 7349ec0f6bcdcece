//! Server-sent events framing for streamed chat completions.
//!
//! The upstream sends `data: {json}` frames separated by blank lines and
//! terminates with `data: [DONE]`. Network chunks do not respect frame (or
//! UTF-8) boundaries, so bytes are buffered until a whole frame is available.

use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;

use futures::stream::{self, Stream, StreamExt};
use routewise_core::CompletionError;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::FragmentStream;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    Data(String),
    Done,
}

#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers `chunk` and returns every frame it completed, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();

        while let Some((end, separator_len)) = find_frame_boundary(&self.buffer) {
            let raw: Vec<u8> = self.buffer.drain(..end + separator_len).collect();
            if let Some(frame) = parse_frame(&String::from_utf8_lossy(&raw[..end])) {
                frames.push(frame);
            }
        }

        frames
    }

    /// Flushes a trailing frame the upstream closed without a blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        let raw = std::mem::take(&mut self.buffer);
        parse_frame(&String::from_utf8_lossy(&raw))
    }
}

fn find_frame_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = find(buffer, b"\n\n").map(|position| (position, 2));
    let crlf = find(buffer, b"\r\n\r\n").map(|position| (position, 4));

    match (lf, crlf) {
        (Some(lf), Some(crlf)) => Some(if lf.0 <= crlf.0 { lf } else { crlf }),
        (lf, crlf) => lf.or(crlf),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn parse_frame(text: &str) -> Option<SseFrame> {
    let data_lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with(':'))
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .filter(|data| !data.is_empty())
        .collect();

    if data_lines.is_empty() {
        return None;
    }

    let data = data_lines.join("\n");
    if data == "[DONE]" {
        return Some(SseFrame::Done);
    }
    Some(SseFrame::Data(data))
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

enum ChunkContent {
    Text(String),
    Empty,
    Failed(String),
}

fn chunk_content(data: &str) -> ChunkContent {
    let chunk: StreamChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(error) => {
            warn!(error = %error, "skipping undecodable completion frame");
            return ChunkContent::Empty;
        }
    };

    if let Some(error) = chunk.error {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .unwrap_or_else(|| error.to_string());
        return ChunkContent::Failed(message);
    }

    match chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
    {
        Some(text) if !text.is_empty() => ChunkContent::Text(text),
        _ => ChunkContent::Empty,
    }
}

struct RelayState<S> {
    bytes: Pin<Box<S>>,
    parser: SseParser,
    pending: VecDeque<Result<String, CompletionError>>,
    finished: bool,
}

impl<S> RelayState<S> {
    /// Queues the content of `frames`; returns true once the stream is over.
    fn absorb(&mut self, frames: impl IntoIterator<Item = SseFrame>) -> bool {
        for frame in frames {
            match frame {
                SseFrame::Done => return true,
                SseFrame::Data(data) => match chunk_content(&data) {
                    ChunkContent::Text(text) => self.pending.push_back(Ok(text)),
                    ChunkContent::Empty => {}
                    ChunkContent::Failed(message) => {
                        self.pending
                            .push_back(Err(CompletionError::Transport(message)));
                        return true;
                    }
                },
            }
        }
        false
    }
}

/// Turns the raw body of a streamed completion into its content fragments.
///
/// Fragments are yielded in arrival order, one per upstream delta, with no
/// batching. A transport error is yielded once and ends the stream.
pub fn content_fragments<S, C, E>(bytes: S) -> FragmentStream
where
    S: Stream<Item = Result<C, E>> + Send + 'static,
    C: AsRef<[u8]> + Send,
    E: fmt::Display + Send,
{
    let state = RelayState {
        bytes: Box::pin(bytes),
        parser: SseParser::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let frames = state.parser.feed(chunk.as_ref());
                    state.finished = state.absorb(frames);
                }
                Some(Err(error)) => {
                    state.finished = true;
                    state
                        .pending
                        .push_back(Err(CompletionError::Transport(error.to_string())));
                }
                None => {
                    debug!("completion stream closed by upstream");
                    let trailing = state.parser.finish();
                    state.absorb(trailing);
                    state.finished = true;
                }
            }
        }
    })
    .boxed()
}
