use aria_llm::{Describe, ToolDefinition};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Tool trait
// ---------------------------------------------------------------------------

/// A callable tool with a typed input.
///
/// The `Input` type must implement [`Describe`] (for schema generation) and
/// `DeserializeOwned` (for parsing the model's JSON arguments). Tools return
/// plain text — that text goes back into conversation history as the tool
/// result the model reads.
///
/// Tools must be `Clone` so the erasure layer can clone them before calling
/// `async fn call` — this avoids the borrow-across-await problem without
/// requiring manual `Box::pin`.
///
/// Downstream failures that the model should be able to react to (a city
/// that can't be found, a service returning 404) belong in the `Ok` text,
/// phrased for reading. Reserve `Err` for failures the tool cannot describe;
/// the agent flattens those into result text anyway, so a tool error never
/// aborts a turn.
pub trait Tool: Clone + Send + Sync + 'static {
    type Input: Describe + DeserializeOwned + Send;

    fn name(&self) -> &str;
    fn description(&self) -> &str;

    fn call(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = Result<String, aria_llm::Error>> + Send;
}

// ---------------------------------------------------------------------------
// Type erasure
// ---------------------------------------------------------------------------

/// Object-safe, type-erased wrapper around a [`Tool`].
///
/// Implemented automatically for every `Tool`; implement it directly only
/// for tools whose schema is not known at compile time (e.g. tools listed
/// by a remote MCP server).
pub trait ErasedTool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    /// Parse `arguments` and execute. Argument parse failures are reported
    /// as `Err`, which the agent converts to in-band result text.
    fn call_erased(
        &self,
        arguments: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String, aria_llm::Error>> + Send>>;
}

impl<T: Tool> ErasedTool for T {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: T::Input::describe(),
        }
    }

    fn call_erased(
        &self,
        arguments: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String, aria_llm::Error>> + Send>> {
        let parsed: Result<T::Input, serde_json::Error> = serde_json::from_str(arguments);
        // Clone self so the future is 'static.
        let this = self.clone();
        Box::pin(async move {
            let input = parsed
                .map_err(|e| aria_llm::Error::Other(format!("invalid tool arguments: {e}")))?;
            this.call(input).await
        })
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// An ordered collection of the tools available to an agent.
///
/// The registry is fixed once the agent starts running turns and is
/// side-effect-free to query; all side effects live in tool execution.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn ErasedTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed tool.
    pub fn register(&mut self, tool: impl Tool) -> &mut Self {
        self.tools.push(Arc::new(tool));
        self
    }

    /// Register an already-erased tool (e.g. a remote MCP tool).
    pub fn register_erased(&mut self, tool: Arc<dyn ErasedTool>) -> &mut Self {
        self.tools.push(tool);
        self
    }

    /// The definitions sent to the model, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Look up a tool by name.
    pub fn find(&self, name: &str) -> Option<Arc<dyn ErasedTool>> {
        self.tools
            .iter()
            .find(|t| t.definition().name == name)
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}
