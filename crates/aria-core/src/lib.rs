pub mod agent;
pub mod aggregate;
pub mod event;
pub mod session;
pub mod tool;

pub use agent::{Agent, AgentStream, DEFAULT_MAX_TOOL_ROUNDS};
pub use aggregate::{ToolStep, TurnDisplay, TurnOutcome, aggregate};
pub use event::AgentEvent;
pub use session::Session;
pub use tool::{ErasedTool, Tool, ToolRegistry};
