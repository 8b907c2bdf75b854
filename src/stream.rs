//! Streaming variant: the same completion request with the stream flag set,
//! decoded incrementally from `data:` frames into text fragments.

use std::pin::Pin;

use async_stream::try_stream;
use futures::StreamExt;
use serde_json::Value;
use tracing::warn;

use crate::client::{SummaryClient, completion_payload, compose_status_error, translate_transport_error};
use crate::endpoint::chat_completions_url;
use crate::error::SummarizerError;
use crate::types::ResultRecord;

/// Lazy, finite, non-restartable sequence of summary text fragments.
/// Consumption may begin before the full answer has arrived; a mid-stream
/// failure surfaces as an `Err` item at the point it is detected.
pub type SummaryStream =
    Pin<Box<dyn futures::Stream<Item = Result<String, SummarizerError>> + Send>>;

const SSE_DATA_PREFIX: &str = "data:";
const SSE_DONE_MARKER: &str = "[DONE]";

/// One decoded line of the event stream.
enum Frame {
    /// An incremental text fragment to hand to the consumer.
    Delta(String),
    /// The terminal `[DONE]` marker.
    Done,
    /// Blank lines, comments, keep-alives, frames without content, and
    /// malformed payloads (logged, never fatal).
    Skip,
}

impl SummaryClient {
    /// Stream a summary of the given results.
    ///
    /// Opening the stream performs the request handshake, so status and
    /// connect errors surface here; everything after the headers surfaces
    /// through the stream items.
    pub async fn stream_summary<R: ResultRecord>(
        &self,
        results: &[R],
        query: &str,
    ) -> Result<SummaryStream, SummarizerError> {
        let url = chat_completions_url(&self.options.endpoint);
        let payload = completion_payload(&self.options, results, query, true);
        let timeout_secs = self.options.timeout_secs();

        let response = self
            .authorize(self.http.post(&url))
            .timeout(self.options.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|err| translate_transport_error(&err, timeout_secs))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = compose_status_error(status.as_u16(), &body);
            warn!(status = %status, "{}", message);
            return Err(SummarizerError::Api(message));
        }

        let stream = try_stream! {
            let mut body_stream = response.bytes_stream();
            // Raw bytes, not a String: a multi-byte scalar can arrive split
            // across network chunks and must only be decoded once the full
            // line is in hand.
            let mut buffer: Vec<u8> = Vec::new();
            let mut done = false;

            while let Some(chunk_result) = body_stream.next().await {
                let chunk =
                    chunk_result.map_err(|err| translate_transport_error(&err, timeout_secs))?;
                buffer.extend_from_slice(&chunk);

                while let Some(line) = drain_line(&mut buffer) {
                    match decode_frame(&line) {
                        Frame::Delta(text) => yield text,
                        Frame::Done => {
                            done = true;
                            break;
                        }
                        Frame::Skip => {}
                    }
                }

                if done {
                    break;
                }
            }

            // A final frame without a trailing newline still counts.
            if !done && !buffer.is_empty() {
                let tail = String::from_utf8_lossy(&buffer);
                if let Frame::Delta(text) = decode_frame(tail.trim_end_matches('\r')) {
                    yield text;
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Pop the next complete line off the buffer, if one has arrived.
///
/// Line boundaries are found on the raw bytes so that a partially received
/// UTF-8 sequence stays in the buffer until the rest of it arrives.
fn drain_line(buffer: &mut Vec<u8>) -> Option<String> {
    let newline = buffer.iter().position(|&byte| byte == b'\n')?;
    let mut end = newline;
    if end > 0 && buffer[end - 1] == b'\r' {
        end -= 1;
    }
    let line = String::from_utf8_lossy(&buffer[..end]).into_owned();
    buffer.drain(..=newline);
    Some(line)
}

fn decode_frame(line: &str) -> Frame {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return Frame::Skip;
    }

    let Some(data) = line.strip_prefix(SSE_DATA_PREFIX) else {
        return Frame::Skip;
    };
    let data = data.trim_start();

    if data == SSE_DONE_MARKER {
        return Frame::Done;
    }

    let payload: Value = match serde_json::from_str(data) {
        Ok(payload) => payload,
        Err(_) => {
            warn!("Failed to parse streaming chunk: {}", data);
            return Frame::Skip;
        }
    };

    let delta = payload
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(|content| content.as_str())
        .unwrap_or("");

    if delta.is_empty() {
        Frame::Skip
    } else {
        Frame::Delta(delta.to_string())
    }
}
