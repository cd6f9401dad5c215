use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use aria_llm::stream::{FinishReason, StreamEvent, Usage};
use aria_llm::{LanguageModel, Message, ToolCallPart};
use futures::Stream;
use futures::future::join_all;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

use crate::event::AgentEvent;
use crate::tool::{Tool, ToolRegistry};

/// Default cap on model↔tool rounds within one turn. A model that keeps
/// requesting tools past this fails the turn instead of looping forever.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// The conversational reasoning loop: a language model plus a tool registry.
///
/// The agent is stateless across turns — conversation history lives in
/// [`Session`](crate::Session) and is passed into [`run`](Agent::run) per
/// turn. Communicates via [`AgentEvent`]s.
pub struct Agent {
    model: Arc<LanguageModel>,
    system_prompt: Option<String>,
    registry: ToolRegistry,
    temperature: Option<f32>,
    max_tool_rounds: usize,
}

impl Agent {
    /// Create a new agent backed by the given model, with no tools.
    pub fn new(model: LanguageModel) -> Self {
        Self {
            model: Arc::new(model),
            system_prompt: None,
            registry: ToolRegistry::new(),
            temperature: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Set the system prompt.
    pub fn system(&mut self, prompt: impl Into<String>) -> &mut Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Register a tool the model can call.
    pub fn tool(&mut self, tool: impl Tool) -> &mut Self {
        self.registry.register(tool);
        self
    }

    /// Register an already-erased tool (e.g. a remote MCP tool).
    pub fn erased_tool(&mut self, tool: Arc<dyn crate::ErasedTool>) -> &mut Self {
        self.registry.register_erased(tool);
        self
    }

    /// Set the sampling temperature passed to the model.
    pub fn temperature(&mut self, t: f32) -> &mut Self {
        self.temperature = Some(t);
        self
    }

    /// Cap the number of model↔tool rounds per turn.
    pub fn max_tool_rounds(&mut self, rounds: usize) -> &mut Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one turn over the given history and get back a stream of events.
    ///
    /// The caller owns the history; the final message is expected to be the
    /// user input for this turn. If tool calls occur, the agent executes
    /// them and loops until the model produces a final text answer (or the
    /// round cap trips).
    ///
    /// Dropping the `AgentStream` cancels the turn.
    pub fn run(&self, history: Vec<Message>) -> AgentStream {
        let (tx, rx) = mpsc::channel(64);

        let model = Arc::clone(&self.model);
        let registry = self.registry.clone();
        let system_prompt = self.system_prompt.clone();
        let temperature = self.temperature;
        let max_tool_rounds = self.max_tool_rounds;

        tokio::spawn(async move {
            turn_loop(
                model,
                registry,
                system_prompt,
                temperature,
                max_tool_rounds,
                history,
                tx,
            )
            .await;
        });

        AgentStream { rx }
    }
}

// ---------------------------------------------------------------------------
// AgentStream
// ---------------------------------------------------------------------------

/// A stream of [`AgentEvent`]s from a single turn.
///
/// Drop to cancel the in-flight turn.
pub struct AgentStream {
    rx: mpsc::Receiver<AgentEvent>,
}

impl AgentStream {
    /// Get the next event, or `None` when the turn is over.
    pub async fn next(&mut self) -> Option<AgentEvent> {
        self.rx.recv().await
    }
}

impl Stream for AgentStream {
    type Item = AgentEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

// ---------------------------------------------------------------------------
// Turn loop (runs in spawned task)
// ---------------------------------------------------------------------------

async fn turn_loop(
    model: Arc<LanguageModel>,
    registry: ToolRegistry,
    system_prompt: Option<String>,
    temperature: Option<f32>,
    max_tool_rounds: usize,
    mut messages: Vec<Message>,
    tx: mpsc::Sender<AgentEvent>,
) {
    let mut cumulative_usage = Usage::default();

    for _round in 0..max_tool_rounds {
        // Build the request from the working history.
        let request = {
            let mut req = aria_llm::request();
            if let Some(ref system) = system_prompt {
                req.system(system.as_str());
            }
            req.messages(messages.clone());
            req.tools(registry.definitions());
            if let Some(t) = temperature {
                req.temperature(t);
            }
            req.build()
        };

        // Stream the model's response, forwarding text deltas as they arrive.
        let mut stream = model.generate(request).events();
        let mut text = String::new();
        let mut tool_calls: Vec<ToolCallPart> = Vec::new();
        let mut finish_reason = FinishReason::Stop;

        while let Some(event) = stream.next().await {
            match event {
                Ok(StreamEvent::TextDelta(delta)) => {
                    text.push_str(&delta);
                    if tx.send(AgentEvent::TextDelta { delta }).await.is_err() {
                        return; // receiver dropped → turn cancelled
                    }
                }
                Ok(StreamEvent::ToolCallBegin { .. }) | Ok(StreamEvent::ToolCallDelta { .. }) => {
                    // Partial calls aren't actionable; the assembled call
                    // arrives in ToolCallEnd.
                }
                Ok(StreamEvent::ToolCallEnd { call, .. }) => {
                    tool_calls.push(call);
                }
                Ok(StreamEvent::Finish { reason, usage }) => {
                    finish_reason = reason;
                    if let Some(u) = usage {
                        cumulative_usage.add(&u);
                    }
                }
                Ok(StreamEvent::Error(msg)) => {
                    let _ = tx.send(AgentEvent::Error { error: msg }).await;
                    return;
                }
                Err(e) => {
                    let _ = tx
                        .send(AgentEvent::Error {
                            error: e.to_string(),
                        })
                        .await;
                    return;
                }
            }
        }

        // Record the assistant step and surface it as a model update.
        let assistant = Message::assistant_with_calls(text, tool_calls.clone());
        messages.push(assistant.clone());
        if tx
            .send(AgentEvent::ModelUpdate {
                messages: vec![assistant],
            })
            .await
            .is_err()
        {
            return;
        }

        // A round without tool calls is the final answer.
        if finish_reason != FinishReason::ToolCalls || tool_calls.is_empty() {
            let _ = tx
                .send(AgentEvent::TurnComplete {
                    usage: cumulative_usage,
                })
                .await;
            return;
        }

        // Execute this round's calls concurrently. join_all preserves call
        // order, so results (and their ToolsUpdate events) are observed in
        // the order the model requested them.
        let executions = tool_calls.iter().map(|tc| match registry.find(&tc.name) {
            Some(tool) => tool.call_erased(&tc.arguments),
            None => {
                let name = tc.name.clone();
                Box::pin(async move {
                    Err(aria_llm::Error::Other(format!("unknown tool: {name}")))
                })
                    as Pin<
                        Box<
                            dyn std::future::Future<Output = Result<String, aria_llm::Error>>
                                + Send,
                        >,
                    >
            }
        });
        let results = join_all(executions).await;

        for (tc, result) in tool_calls.iter().zip(results) {
            // Failures are reported in-band so the model can react to them
            // conversationally.
            let result_text = match result {
                Ok(text) => text,
                Err(e) => format!("tool error: {e}"),
            };

            let message = Message::tool_result(&tc.id, result_text);
            messages.push(message.clone());
            if tx
                .send(AgentEvent::ToolsUpdate {
                    messages: vec![message],
                })
                .await
                .is_err()
            {
                return;
            }
        }

        // Loop back to generate again with the tool results in context.
    }

    let _ = tx
        .send(AgentEvent::Error {
            error: format!("tool loop limit exceeded after {max_tool_rounds} rounds"),
        })
        .await;
}
