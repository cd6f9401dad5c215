use crate::error::Error;
use crate::request::ToolCallPart;
use crate::stream::{FinishReason, StreamEvent, Usage};
use futures::Stream;
use std::pin::Pin;
use tokio_stream::StreamExt;

/// A live streaming response from a language model.
///
/// Consume it event-by-event via [`events()`](Response::events), or collect
/// the full result with [`into_result()`](Response::into_result).
pub struct Response {
    inner: Pin<Box<dyn Stream<Item = Result<StreamEvent, Error>> + Send>>,
}

impl Response {
    pub fn new(stream: impl Stream<Item = Result<StreamEvent, Error>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Consume the response as an async stream of events.
    pub fn events(self) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, Error>> + Send>> {
        self.inner
    }

    /// Collect the full streamed response into a single result.
    pub async fn into_result(self) -> Result<GenerateResult, Error> {
        let mut text = String::new();
        let mut tool_calls: Vec<ToolCallPart> = Vec::new();
        let mut finish_reason = None;
        let mut usage = None;

        let mut stream = self.inner;
        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::TextDelta(delta) => {
                    text.push_str(&delta);
                }
                StreamEvent::ToolCallEnd { call, .. } => {
                    tool_calls.push(call);
                }
                StreamEvent::Finish { reason, usage: u } => {
                    finish_reason = Some(reason);
                    usage = u;
                }
                StreamEvent::Error(message) => {
                    return Err(Error::Other(message));
                }
                // ToolCallBegin / ToolCallDelta are intermediate; we only
                // care about the fully-assembled ToolCallEnd.
                _ => {}
            }
        }

        Ok(GenerateResult {
            text,
            tool_calls,
            finish_reason: finish_reason.unwrap_or(FinishReason::Stop),
            usage: usage.unwrap_or_default(),
        })
    }
}

/// The collected result of a language model generation.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub text: String,
    pub tool_calls: Vec<ToolCallPart>,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[tokio::test]
    async fn into_result_collects_text_and_calls() {
        let events = vec![
            Ok(StreamEvent::TextDelta("Hel".into())),
            Ok(StreamEvent::TextDelta("lo".into())),
            Ok(StreamEvent::ToolCallEnd {
                index: 0,
                call: ToolCallPart {
                    id: "c1".into(),
                    name: "get_weather".into(),
                    arguments: r#"{"city":"Paris"}"#.into(),
                },
            }),
            Ok(StreamEvent::Finish {
                reason: FinishReason::ToolCalls,
                usage: Some(Usage {
                    input_tokens: 10,
                    output_tokens: 5,
                }),
            }),
        ];

        let result = Response::new(stream::iter(events))
            .into_result()
            .await
            .unwrap();

        assert_eq!(result.text, "Hello");
        assert_eq!(result.tool_calls.len(), 1);
        assert_eq!(result.tool_calls[0].id, "c1");
        assert_eq!(result.finish_reason, FinishReason::ToolCalls);
        assert_eq!(result.usage.input_tokens, 10);
    }

    #[tokio::test]
    async fn into_result_surfaces_stream_errors() {
        let events = vec![
            Ok(StreamEvent::TextDelta("partial".into())),
            Ok(StreamEvent::Error("boom".into())),
        ];

        let err = Response::new(stream::iter(events))
            .into_result()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
