//! Server-sent-event decoding into content chunks.

use std::fmt::Display;

use futures::{Stream, StreamExt};
use regex::Regex;
use serde_json::Value;

use kiln_core::content::ContentChunk;
use kiln_core::error::{KilnError, Result};
use kiln_core::model::ContentCallback;

/// Payload that marks the end of a stream.
pub const DONE_SENTINEL: &str = "[DONE]";

const DATA_PREFIX: &str = "data:";

/// Split a byte stream into newline-delimited lines.
///
/// Bytes are buffered until a full line is available, so multi-byte
/// characters split across network chunks decode intact. A trailing line
/// without a newline is still yielded. Transport errors are forwarded as
/// `Err` items and end the stream.
pub fn line_stream<S, B, E>(bytes: S) -> impl Stream<Item = Result<String>> + Send
where
    S: Stream<Item = std::result::Result<B, E>> + Send,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
{
    async_stream::stream! {
        let mut buffer: Vec<u8> = Vec::new();
        let mut byte_stream = Box::pin(bytes);

        while let Some(result) = byte_stream.next().await {
            let chunk = match result {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(KilnError::Transport(format!("stream interrupted: {e}")));
                    return;
                }
            };
            buffer.extend_from_slice(chunk.as_ref());

            while let Some(newline_pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline_pos).collect();
                let line = String::from_utf8_lossy(&line);
                yield Ok(line.trim_end_matches(['\n', '\r']).to_string());
            }
        }

        if !buffer.is_empty() {
            let line = String::from_utf8_lossy(&buffer);
            yield Ok(line.trim_end_matches('\r').to_string());
        }
    }
}

/// Lines of a `reqwest` response body.
pub fn sse_line_stream(response: reqwest::Response) -> impl Stream<Item = Result<String>> + Send {
    line_stream(response.bytes_stream())
}

/// Classification of a single stream line.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Not a data line, or a data line without usable content.
    Skip,
    /// The end-of-stream sentinel.
    Done,
    Chunk(ContentChunk),
    /// Data line whose payload could not be parsed.
    Malformed(String),
    /// The vendor reported an error inside the stream.
    VendorError(String),
}

/// Turns chat-completion delta frames into text and image chunks.
#[derive(Debug, Clone)]
pub struct StreamDecoder {
    media_pattern: Regex,
}

impl StreamDecoder {
    /// `media_pattern` is searched for inside every delta; a match makes the
    /// chunk an image whose content is the matched URL.
    pub fn new(media_pattern: Regex) -> Self {
        Self { media_pattern }
    }

    pub fn decode_frame(&self, line: &str) -> Frame {
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return Frame::Skip;
        };
        let payload = payload.trim();
        if payload == DONE_SENTINEL {
            return Frame::Done;
        }

        let json: Value = match serde_json::from_str(payload) {
            Ok(v) => v,
            Err(e) => return Frame::Malformed(e.to_string()),
        };

        if let Some(message) = vendor_error_message(&json) {
            return Frame::VendorError(message);
        }

        match json["choices"][0]["delta"]["content"].as_str() {
            Some(text) if !text.is_empty() => Frame::Chunk(self.classify(text)),
            _ => Frame::Skip,
        }
    }

    fn classify(&self, delta: &str) -> ContentChunk {
        match self.media_pattern.find(delta) {
            Some(m) => ContentChunk::image(m.as_str()),
            None => ContentChunk::text(delta),
        }
    }

    /// Consume `lines`, delivering each chunk to `callback` before the next
    /// line is pulled.
    ///
    /// Returns every emitted chunk in order once the sentinel is seen or the
    /// body ends. Malformed frames are logged and skipped; transport errors
    /// and in-stream vendor errors abort decoding.
    pub async fn decode<S>(
        &self,
        lines: S,
        callback: &dyn ContentCallback,
    ) -> Result<Vec<ContentChunk>>
    where
        S: Stream<Item = Result<String>>,
    {
        let mut lines = std::pin::pin!(lines);
        let mut chunks = Vec::new();

        while let Some(line) = lines.next().await {
            let line = line?;
            match self.decode_frame(&line) {
                Frame::Skip => continue,
                Frame::Done => {
                    tracing::debug!(chunks = chunks.len(), "stream complete");
                    break;
                }
                Frame::Malformed(reason) => {
                    tracing::warn!(
                        error = %KilnError::MalformedFrame(reason),
                        "skipping stream frame"
                    );
                }
                Frame::VendorError(message) => {
                    return Err(KilnError::Vendor(message));
                }
                Frame::Chunk(chunk) => {
                    callback.on_chunk(&chunk).await;
                    chunks.push(chunk);
                }
            }
        }

        Ok(chunks)
    }
}

/// Extract a vendor error message from a decoded body, if it carries one.
///
/// Accepts `{"error": "msg"}`, `{"error": {"message": "msg"}}` and any
/// other non-empty `error` value (rendered as JSON).
pub fn vendor_error_message(json: &Value) -> Option<String> {
    match json.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => Some(
            obj.get("message")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| Value::Object(obj.clone()).to_string()),
        ),
        other => Some(other.to_string()),
    }
}

/// Best-effort vendor message from a non-2xx response body: a top-level
/// `message`, then an `error` field. `None` for empty or non-JSON bodies.
pub fn error_body_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .or_else(|| vendor_error_message(&json))
}
