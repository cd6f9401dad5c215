//! Opens an SSE connection to the Chat Completions endpoint and maps the
//! chunk stream to the aria-llm `StreamEvent` type.

use crate::BackendState;
use crate::types::{ChatRequest, StreamChunk, ToolCallFragment};
use aria_llm::error::Error;
use aria_llm::request::ToolCallPart;
use aria_llm::stream::{FinishReason, StreamEvent, Usage};
use eventsource_stream::Eventsource;
use futures::Stream;
use std::sync::Arc;
use tokio_stream::StreamExt;

pub fn open(
    state: Arc<BackendState>,
    body: ChatRequest,
) -> impl Stream<Item = Result<StreamEvent, Error>> + Send {
    async_stream::try_stream! {
        let url = format!("{}/chat/completions", state.config.base_url);
        let resp = state
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", state.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Http(Box::new(e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp.text().await.unwrap_or_default();
            Err(Error::Api {
                code: status.as_str().to_string(),
                message: body_text,
            })?;
            unreachable!();
        }

        let mut sse = resp.bytes_stream().eventsource();
        let mut mapper = ChunkMapper::new();

        while let Some(event) = sse.next().await {
            match event {
                Ok(event) => {
                    if event.data.trim() == "[DONE]" {
                        break;
                    }
                    let chunk: StreamChunk = serde_json::from_str(&event.data)?;
                    for stream_event in mapper.map_chunk(chunk) {
                        yield stream_event;
                    }
                }
                Err(e) => {
                    Err(Error::Sse(e.to_string()))?;
                }
            }
        }

        for stream_event in mapper.finish() {
            yield stream_event;
        }
    }
}

// ---------------------------------------------------------------------------
// Chunk mapper (stateful — assembles indexed tool call fragments)
// ---------------------------------------------------------------------------

/// Tool calls stream in pieces: the fragment that opens index `n` carries the
/// call id and function name, and every later fragment for `n` appends to the
/// arguments JSON. The mapper keeps the partial calls in index order and
/// releases the assembled [`ToolCallPart`]s once the choice finishes.
pub(crate) struct ChunkMapper {
    partial: Vec<PartialCall>,
    finish_reason: Option<FinishReason>,
    usage: Option<Usage>,
}

#[derive(Default)]
struct PartialCall {
    id: String,
    name: String,
    arguments: String,
}

impl ChunkMapper {
    pub(crate) fn new() -> Self {
        Self {
            partial: Vec::new(),
            finish_reason: None,
            usage: None,
        }
    }

    pub(crate) fn map_chunk(&mut self, chunk: StreamChunk) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        // The usage-only trailer chunk has an empty choices array.
        if let Some(u) = chunk.usage {
            self.usage = Some(Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            });
        }

        for choice in chunk.choices {
            if let Some(content) = choice.delta.content
                && !content.is_empty()
            {
                events.push(StreamEvent::TextDelta(content));
            }

            for fragment in choice.delta.tool_calls {
                self.map_fragment(fragment, &mut events);
            }

            if let Some(reason) = choice.finish_reason {
                self.finish_reason = Some(parse_finish_reason(&reason));
            }
        }

        events
    }

    fn map_fragment(&mut self, fragment: ToolCallFragment, events: &mut Vec<StreamEvent>) {
        let index = fragment.index;

        if index >= self.partial.len() {
            // Opening fragment for a new call. Indices normally arrive
            // contiguously; a stream that skips ahead gets empty backfill
            // slots instead of a panic.
            self.partial.resize_with(index + 1, PartialCall::default);
            let id = fragment.id.clone().unwrap_or_default();
            let name = fragment
                .function
                .as_ref()
                .and_then(|f| f.name.clone())
                .unwrap_or_default();
            let slot = &mut self.partial[index];
            slot.id = id.clone();
            slot.name = name.clone();
            events.push(StreamEvent::ToolCallBegin { index, id, name });
        }

        if let Some(function) = fragment.function
            && let Some(delta) = function.arguments
            && !delta.is_empty()
        {
            self.partial[index].arguments.push_str(&delta);
            events.push(StreamEvent::ToolCallDelta {
                index,
                arguments_delta: delta,
            });
        }
    }

    /// Release the assembled tool calls and the final `Finish` event. Called
    /// once, when the `[DONE]` sentinel arrives (or the stream ends).
    pub(crate) fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        for (index, call) in self.partial.drain(..).enumerate() {
            events.push(StreamEvent::ToolCallEnd {
                index,
                call: ToolCallPart {
                    id: call.id,
                    name: call.name,
                    arguments: call.arguments,
                },
            });
        }

        let reason = self.finish_reason.take().unwrap_or(FinishReason::Stop);
        events.push(StreamEvent::Finish {
            reason,
            usage: self.usage.take(),
        });

        events
    }
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "tool_calls" => FinishReason::ToolCalls,
        "length" => FinishReason::Length,
        "content_filter" => FinishReason::ContentFilter,
        other => FinishReason::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(json: &str) -> StreamChunk {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn maps_text_deltas() {
        let mut mapper = ChunkMapper::new();
        let events = mapper.map_chunk(chunk(
            r#"{"choices":[{"delta":{"content":"Hel"},"finish_reason":null}]}"#,
        ));
        assert!(matches!(&events[0], StreamEvent::TextDelta(t) if t == "Hel"));
    }

    #[test]
    fn assembles_tool_call_from_fragments() {
        let mut mapper = ChunkMapper::new();

        let begin = mapper.map_chunk(chunk(
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"c1","function":{"name":"get_weather","arguments":""}}]},"finish_reason":null}]}"#,
        ));
        assert!(matches!(
            &begin[0],
            StreamEvent::ToolCallBegin { id, name, .. } if id == "c1" && name == "get_weather"
        ));

        mapper.map_chunk(chunk(
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"city\":"}}]},"finish_reason":null}]}"#,
        ));
        mapper.map_chunk(chunk(
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"\"Paris\"}"}}]},"finish_reason":null}]}"#,
        ));
        mapper.map_chunk(chunk(r#"{"choices":[{"delta":{},"finish_reason":"tool_calls"}]}"#));

        let done = mapper.finish();
        assert_eq!(done.len(), 2);
        match &done[0] {
            StreamEvent::ToolCallEnd { call, .. } => {
                assert_eq!(call.id, "c1");
                assert_eq!(call.name, "get_weather");
                assert_eq!(call.arguments, r#"{"city":"Paris"}"#);
            }
            other => panic!("expected ToolCallEnd, got {other:?}"),
        }
        assert!(matches!(
            &done[1],
            StreamEvent::Finish { reason: FinishReason::ToolCalls, .. }
        ));
    }

    #[test]
    fn usage_trailer_is_attached_to_finish() {
        let mut mapper = ChunkMapper::new();
        mapper.map_chunk(chunk(
            r#"{"choices":[{"delta":{"content":"hi"},"finish_reason":"stop"}]}"#,
        ));
        mapper.map_chunk(chunk(
            r#"{"choices":[],"usage":{"prompt_tokens":12,"completion_tokens":3}}"#,
        ));

        let done = mapper.finish();
        match &done[0] {
            StreamEvent::Finish { reason, usage } => {
                assert_eq!(*reason, FinishReason::Stop);
                let usage = usage.expect("usage present");
                assert_eq!(usage.input_tokens, 12);
                assert_eq!(usage.output_tokens, 3);
            }
            other => panic!("expected Finish, got {other:?}"),
        }
    }

    #[test]
    fn fragment_index_skipping_ahead_does_not_panic() {
        let mut mapper = ChunkMapper::new();
        let events = mapper.map_chunk(chunk(
            r#"{"choices":[{"delta":{"tool_calls":[{"index":1,"id":"c2","function":{"name":"search_docs","arguments":"{}"}}]},"finish_reason":null}]}"#,
        ));
        assert!(matches!(
            &events[0],
            StreamEvent::ToolCallBegin { index: 1, id, .. } if id == "c2"
        ));

        // The skipped slot drains as an empty call; the real one is intact.
        let done = mapper.finish();
        match &done[1] {
            StreamEvent::ToolCallEnd { call, .. } => {
                assert_eq!(call.id, "c2");
                assert_eq!(call.name, "search_docs");
                assert_eq!(call.arguments, "{}");
            }
            other => panic!("expected ToolCallEnd, got {other:?}"),
        }
    }

    #[test]
    fn parallel_tool_calls_keep_their_indices() {
        let mut mapper = ChunkMapper::new();
        mapper.map_chunk(chunk(
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"c1","function":{"name":"get_weather","arguments":"{}"}}]},"finish_reason":null}]}"#,
        ));
        mapper.map_chunk(chunk(
            r#"{"choices":[{"delta":{"tool_calls":[{"index":1,"id":"c2","function":{"name":"search_docs","arguments":"{}"}}]},"finish_reason":null}]}"#,
        ));
        mapper.map_chunk(chunk(r#"{"choices":[{"delta":{},"finish_reason":"tool_calls"}]}"#));

        let done = mapper.finish();
        let ids: Vec<&str> = done
            .iter()
            .filter_map(|e| match e {
                StreamEvent::ToolCallEnd { call, .. } => Some(call.id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }
}
