use aria_llm::{Error, Message};

use crate::agent::Agent;
use crate::aggregate::{TurnDisplay, TurnOutcome, aggregate};

/// Per-conversation state: the accumulated message history plus the agent
/// that runs turns over it.
///
/// One session per conversation; history is append-only and owned
/// exclusively here. History is mutated only after a turn's aggregation
/// fully completes — a failed turn leaves it untouched, as if the turn
/// never happened.
pub struct Session {
    agent: Agent,
    history: Vec<Message>,
}

impl Session {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            history: Vec::new(),
        }
    }

    /// The committed conversation history.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Run one turn: submit `text`, stream the response through `display`,
    /// and commit the exchange to history on success.
    ///
    /// Only the user message and the final assistant text are committed; the
    /// turn's tool steps are returned for display and then discarded. No
    /// timeout is imposed here — wrap the call in `tokio::time::timeout` if
    /// the transport needs one.
    ///
    /// Callers must not start a second turn while one is in flight;
    /// `&mut self` enforces that within safe code.
    pub async fn send<D>(&mut self, text: impl Into<String>, display: &mut D) -> Result<TurnOutcome, Error>
    where
        D: TurnDisplay + ?Sized,
    {
        let text = text.into();

        let mut working = self.history.clone();
        working.push(Message::user(&text));

        let events = self.agent.run(working);
        let outcome = aggregate(events, display).await?;

        self.history.push(Message::user(text));
        self.history.push(Message::assistant(outcome.text.clone()));

        Ok(outcome)
    }
}
