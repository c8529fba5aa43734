//! Server-Sent Events (SSE) frame parsing for chat-completion streams.
//!
//! The stream is split into lines and each line decoded as UTF-8, with
//! invalid bytes replaced by U+FFFD. Only lines carrying
//! the `data: ` marker are frames; a `[DONE]` frame ends the stream. Lines
//! split across network reads are reassembled by the buffered reader.

use futures_util::StreamExt;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

use crate::{ChatError, ChunkCallback};

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct StreamFrame {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// Wrap a reqwest response body as a buffered async reader.
pub fn response_reader(response: reqwest::Response) -> impl AsyncBufRead + Send + Unpin {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(std::io::Error::other));
    tokio::io::BufReader::new(StreamReader::new(byte_stream))
}

/// Call `on_frame` with the payload of every data frame, in order, until the
/// input is exhausted or the terminator frame arrives.
pub async fn read_data_frames<R>(
    mut reader: R,
    mut on_frame: impl FnMut(&str) + Send,
) -> Result<(), ChatError>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        let Some(data) = line.strip_prefix(DATA_PREFIX) else {
            continue;
        };
        if data.trim() == DONE_SENTINEL {
            debug!("stream terminator received");
            break;
        }
        on_frame(data);
    }

    Ok(())
}

/// Extract `choices[0].delta.content` from one frame payload.
pub fn delta_content(data: &str) -> Result<Option<String>, serde_json::Error> {
    let frame: StreamFrame = serde_json::from_str(data)?;
    Ok(frame
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content))
}

/// Read a completion stream, reporting each non-empty delta together with
/// the text accumulated so far. Malformed frames are logged and skipped.
pub async fn accumulate_stream<R>(
    reader: R,
    on_chunk: &mut ChunkCallback<'_>,
) -> Result<String, ChatError>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut full_content = String::new();

    read_data_frames(reader, |data| match delta_content(data) {
        Ok(Some(delta)) if !delta.is_empty() => {
            full_content.push_str(&delta);
            on_chunk(&delta, &full_content);
        }
        Ok(_) => {}
        Err(e) => warn!("skipping malformed stream frame: {e}"),
    })
    .await?;

    Ok(full_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    async fn collect(body: &str) -> (String, Vec<(String, String)>) {
        let mut seen = Vec::new();
        let mut on_chunk = |delta: &str, full: &str| seen.push((delta.to_string(), full.to_string()));
        let full = accumulate_stream(body.as_bytes(), &mut on_chunk).await.unwrap();
        (full, seen)
    }

    #[tokio::test]
    async fn accumulates_chunks_in_order() {
        let body = format!("{}{}data: [DONE]\n\n", frame("Hello"), frame(" world"));
        let (full, seen) = collect(&body).await;

        assert_eq!(full, "Hello world");
        assert_eq!(
            seen,
            vec![
                ("Hello".to_string(), "Hello".to_string()),
                (" world".to_string(), "Hello world".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn terminator_ends_stream_early() {
        let body = format!("{}data: [DONE]\n\n{}", frame("kept"), frame("ignored"));
        let (full, seen) = collect(&body).await;

        assert_eq!(full, "kept");
        assert_eq!(seen.len(), 1);
    }

    #[tokio::test]
    async fn malformed_frame_is_skipped() {
        let body = format!("{}data: {{not json\n\n{}", frame("a"), frame("b"));
        let (full, seen) = collect(&body).await;

        assert_eq!(full, "ab");
        assert_eq!(seen.len(), 2);
    }

    #[tokio::test]
    async fn non_data_lines_and_empty_deltas_are_ignored() {
        let body = format!(
            ": keep-alive\nevent: ping\nid: 7\n{}{}{}",
            frame(""),
            r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#.to_string() + "\n",
            frame("x")
        );
        let (full, seen) = collect(&body).await;

        assert_eq!(full, "x");
        assert_eq!(seen, vec![("x".to_string(), "x".to_string())]);
    }

    #[tokio::test]
    async fn crlf_line_endings_are_accepted() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\r\n\r\ndata: [DONE]\r\n";
        let (full, _) = collect(body).await;
        assert_eq!(full, "hi");
    }

    #[tokio::test]
    async fn stream_without_terminator_completes_normally() {
        let (full, _) = collect(&frame("tail")).await;
        assert_eq!(full, "tail");
    }

    #[tokio::test]
    async fn frames_are_reported_verbatim() {
        let mut frames = Vec::new();
        read_data_frames("data: one\ndata: two\n".as_bytes(), |d| frames.push(d.to_string()))
            .await
            .unwrap();
        assert_eq!(frames, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced_not_fatal() {
        let mut body = frame("前").into_bytes();
        body.extend_from_slice(b"data: {\"choices\":[{\"delta\":{\"content\":\"a\xffb\"}}]}\n");
        body.extend_from_slice(frame("后").as_bytes());

        let mut seen = Vec::new();
        let mut on_chunk = |delta: &str, _: &str| seen.push(delta.to_string());
        let full = accumulate_stream(body.as_slice(), &mut on_chunk).await.unwrap();

        assert_eq!(full, "前a\u{fffd}b后");
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn delta_content_handles_missing_choices() {
        assert_eq!(delta_content(r#"{"choices":[]}"#).unwrap(), None);
        assert_eq!(delta_content(r#"{}"#).unwrap(), None);
        assert_eq!(
            delta_content(r#"{"choices":[{"delta":{"content":"展馆"}}]}"#).unwrap(),
            Some("展馆".to_string())
        );
        assert!(delta_content("nope").is_err());
    }
}
