use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use aria_core::ErasedTool;
use aria_llm::{Schema, ToolDefinition};
use serde_json::Value;

use crate::client::McpClient;
use crate::types::RemoteToolInfo;

/// One remote MCP tool, adapted to the agent's erased tool interface.
///
/// The schema comes pre-built from the server, so this implements
/// [`ErasedTool`] directly instead of going through the typed `Tool` trait.
pub struct RemoteTool {
    client: Arc<McpClient>,
    info: RemoteToolInfo,
}

impl RemoteTool {
    pub fn new(client: Arc<McpClient>, info: RemoteToolInfo) -> Self {
        Self { client, info }
    }
}

impl ErasedTool for RemoteTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.info.name.clone(),
            description: self.info.description.clone().unwrap_or_default(),
            parameters: Schema::Raw(
                self.info
                    .input_schema
                    .clone()
                    .unwrap_or_else(|| serde_json::json!({"type": "object", "properties": {}})),
            ),
        }
    }

    fn call_erased(
        &self,
        arguments: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String, aria_llm::Error>> + Send>> {
        // The server validates against its own schema; an unparseable
        // argument string degrades to an empty object.
        let arguments: Value =
            serde_json::from_str(arguments).unwrap_or_else(|_| serde_json::json!({}));
        let client = Arc::clone(&self.client);
        let name = self.info.name.clone();

        Box::pin(async move {
            let result = client.call_tool(&name, arguments).await?;
            let text = result.text();
            if result.is_error {
                // In-band, so the model can react to it.
                Ok(format!("Tool '{name}' reported an error: {text}"))
            } else {
                Ok(text)
            }
        })
    }
}

/// Connect-and-list convenience: every tool the server advertises, ready to
/// register with an agent.
pub async fn remote_tools(
    client: Arc<McpClient>,
) -> Result<Vec<Arc<dyn ErasedTool>>, aria_llm::Error> {
    let infos = client.list_tools().await?;
    Ok(infos
        .into_iter()
        .map(|info| Arc::new(RemoteTool::new(Arc::clone(&client), info)) as Arc<dyn ErasedTool>)
        .collect())
}
