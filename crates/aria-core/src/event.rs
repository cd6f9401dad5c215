use aria_llm::stream::Usage;
use aria_llm::Message;

/// Events emitted by the agent during one turn.
///
/// A frontend (through the aggregator) consumes these to update its UI.
/// The events form a protocol:
///
/// ```text
/// (TextDelta)*
/// ModelUpdate                          ← assistant step recorded
/// (ToolsUpdate)*                       ← one per executed tool call
/// ... repeat while the model keeps requesting tools ...
/// (TextDelta)* ModelUpdate             ← final answer
/// TurnComplete
/// ```
///
/// `ModelUpdate` and `ToolsUpdate` are the two sources of state snapshots:
/// the former follows a model step (its trailing assistant message may carry
/// tool calls), the latter follows a tool execution (its trailing message is
/// the tool result). Splitting them into distinct variants keeps the
/// consumer's matching exhaustive.
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// A chunk of assistant text arrived.
    TextDelta { delta: String },

    /// The model finished a step; `messages` holds what it appended to the
    /// turn's working history.
    ModelUpdate { messages: Vec<Message> },

    /// A tool finished executing; `messages` holds the appended result.
    ToolsUpdate { messages: Vec<Message> },

    /// The entire turn is complete (no more tool rounds).
    TurnComplete { usage: Usage },

    /// The turn failed (transport error or tool loop limit). Terminal.
    Error { error: String },
}
