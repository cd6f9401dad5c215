//! Reconstructs a turn from the agent's event stream: the final answer text,
//! plus a live trace of tool invocations with matched inputs and outputs.

use aria_llm::stream::Usage;
use aria_llm::{Error, Message};
use futures::Stream;
use tokio_stream::StreamExt;
use tracing::warn;

// ---------------------------------------------------------------------------
// Display records
// ---------------------------------------------------------------------------

/// One tool invocation as shown to the user.
///
/// Created when the model requests the call (output unknown), completed when
/// the matching result arrives. Steps live for the duration of one turn and
/// are never persisted to session history.
#[derive(Debug, Clone)]
pub struct ToolStep {
    /// The tool call id that correlates call → result.
    pub id: String,
    pub name: String,
    /// The call's arguments. Falls back to the raw string when the model
    /// produced arguments that don't parse as JSON.
    pub input: serde_json::Value,
    /// `None` until the matching result arrives.
    pub output: Option<String>,
}

impl ToolStep {
    pub fn is_complete(&self) -> bool {
        self.output.is_some()
    }
}

/// The outward display seam: whatever renders the conversation implements
/// this to receive incremental text and tool-step notifications as the turn
/// unfolds.
pub trait TurnDisplay {
    /// An incremental fragment of the assistant's answer.
    fn stream_token(&mut self, token: &str);

    /// A tool was invoked; `step.output` is still `None`.
    fn step_started(&mut self, step: &ToolStep);

    /// A previously started step received its output.
    fn step_updated(&mut self, step: &ToolStep);
}

/// The committed result of one aggregated turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// All text deltas of the turn, concatenated in arrival order.
    pub text: String,
    /// Tool steps in creation order.
    pub steps: Vec<ToolStep>,
    pub usage: Usage,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Consume a turn's event stream, forwarding to `display` as events arrive,
/// and return the reconstructed outcome once the stream is exhausted.
///
/// Invariants honored here:
/// - every text delta is forwarded before the next event is polled, so the
///   display can render partial output immediately;
/// - a step is created (and surfaced) when its call appears in a model
///   update, before the result is known;
/// - a result with no matching step is a protocol violation: logged and
///   discarded, never fatal;
/// - steps left incomplete at the end of the stream indicate a dropped or
///   malformed result: logged, the turn still succeeds.
///
/// An [`AgentEvent::Error`] fails the turn; text already forwarded to the
/// display stays visible, but nothing is committed.
pub async fn aggregate<S, D>(mut events: S, display: &mut D) -> Result<TurnOutcome, Error>
where
    S: Stream<Item = crate::AgentEvent> + Unpin,
    D: TurnDisplay + ?Sized,
{
    let mut text = String::new();
    let mut steps: Vec<ToolStep> = Vec::new();
    let mut usage = Usage::default();

    while let Some(event) = events.next().await {
        match event {
            crate::AgentEvent::TextDelta { delta } => {
                text.push_str(&delta);
                display.stream_token(&delta);
            }

            crate::AgentEvent::ModelUpdate { messages } => {
                let Some(Message::Assistant { tool_calls, .. }) = messages.last() else {
                    continue;
                };
                for call in tool_calls {
                    let input = serde_json::from_str(&call.arguments)
                        .unwrap_or_else(|_| serde_json::Value::String(call.arguments.clone()));
                    let step = ToolStep {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        input,
                        output: None,
                    };
                    display.step_started(&step);
                    steps.push(step);
                }
            }

            crate::AgentEvent::ToolsUpdate { messages } => {
                let Some(Message::Tool {
                    tool_call_id,
                    content,
                }) = messages.last()
                else {
                    continue;
                };
                match steps.iter_mut().find(|s| s.id == *tool_call_id) {
                    Some(step) => {
                        step.output = Some(content.clone());
                        display.step_updated(step);
                    }
                    None => {
                        warn!(
                            tool_call_id = tool_call_id.as_str(),
                            "tool result without a matching call; discarding"
                        );
                    }
                }
            }

            crate::AgentEvent::TurnComplete { usage: u } => {
                usage = u;
            }

            crate::AgentEvent::Error { error } => {
                return Err(Error::Other(error));
            }
        }
    }

    for step in steps.iter().filter(|s| !s.is_complete()) {
        warn!(
            id = step.id.as_str(),
            tool = step.name.as_str(),
            "tool step never received its result"
        );
    }

    Ok(TurnOutcome { text, steps, usage })
}
