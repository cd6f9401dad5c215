//! JSON-RPC over streamable HTTP: every call is a POST; the server answers
//! with a plain JSON body or an SSE stream carrying the response message.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use aria_llm::Error;
use eventsource_stream::Eventsource;
use serde_json::Value;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::types::{
    CallToolParams, CallToolResult, ClientInfo, InitializeParams, InitializeResult, RemoteToolInfo,
    RpcRequest, RpcResponse, ToolsListResult,
};

const SESSION_HEADER: &str = "Mcp-Session-Id";

/// A connection to one MCP server.
pub struct McpClient {
    client: reqwest::Client,
    url: String,
    session_id: Mutex<Option<String>>,
    next_id: AtomicI64,
}

impl McpClient {
    /// Connect to a server: run the `initialize` handshake and confirm it.
    pub async fn connect(url: impl Into<String>) -> Result<Self, Error> {
        let client = Self {
            client: reqwest::Client::new(),
            url: url.into(),
            session_id: Mutex::new(None),
            next_id: AtomicI64::new(1),
        };

        let params = InitializeParams {
            protocol_version: crate::types::PROTOCOL_VERSION,
            capabilities: serde_json::json!({}),
            client_info: ClientInfo {
                name: "aria",
                version: env!("CARGO_PKG_VERSION"),
            },
        };
        let result = client
            .request("initialize", Some(serde_json::to_value(&params)?))
            .await?;
        let init: InitializeResult = serde_json::from_value(result)?;
        debug!(
            server = init.server_info.as_ref().map(|s| s.name.as_str()),
            "mcp server initialized"
        );

        client.notify("notifications/initialized").await?;

        Ok(client)
    }

    /// List the tools the server advertises.
    pub async fn list_tools(&self) -> Result<Vec<RemoteToolInfo>, Error> {
        let result = self.request("tools/list", None).await?;
        let listed: ToolsListResult = serde_json::from_value(result)?;
        Ok(listed.tools)
    }

    /// Invoke a tool by name.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, Error> {
        let params = CallToolParams {
            name: name.to_string(),
            arguments,
        };
        let result = self
            .request("tools/call", Some(serde_json::to_value(&params)?))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    // -- plumbing --

    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest::call(id, method, params);
        let response = self.post(&body).await?;

        let rpc = self.read_response(response).await?;
        if let Some(error) = rpc.error {
            return Err(Error::Api {
                code: error.code.to_string(),
                message: error.message,
            });
        }
        rpc.result
            .ok_or_else(|| Error::Other(format!("mcp response to '{method}' has no result")))
    }

    async fn notify(&self, method: &str) -> Result<(), Error> {
        let body = RpcRequest::notification(method);
        self.post(&body).await?;
        Ok(())
    }

    async fn post(&self, body: &RpcRequest) -> Result<reqwest::Response, Error> {
        let mut req = self
            .client
            .post(&self.url)
            .header("Accept", "application/json, text/event-stream")
            .json(body);
        if let Some(session) = self.session_id.lock().unwrap().clone() {
            req = req.header(SESSION_HEADER, session);
        }

        let response = req.send().await.map_err(|e| Error::Http(Box::new(e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                code: status.as_str().to_string(),
                message: text,
            });
        }

        // The server may assign a session on any response (in practice, on
        // the initialize one).
        if let Some(session) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            *self.session_id.lock().unwrap() = Some(session.to_string());
        }

        Ok(response)
    }

    /// Read one JSON-RPC response message, whichever way the server chose to
    /// deliver it.
    async fn read_response(&self, response: reqwest::Response) -> Result<RpcResponse, Error> {
        let is_event_stream = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/event-stream"));

        if !is_event_stream {
            let text = response
                .text()
                .await
                .map_err(|e| Error::Http(Box::new(e)))?;
            return Ok(serde_json::from_str(&text)?);
        }

        // SSE-wrapped: the response message is the first data event that
        // parses as a JSON-RPC response carrying a result or error.
        let mut sse = response.bytes_stream().eventsource();
        while let Some(event) = sse.next().await {
            let event = event.map_err(|e| Error::Sse(e.to_string()))?;
            if let Ok(rpc) = serde_json::from_str::<RpcResponse>(&event.data)
                && (rpc.result.is_some() || rpc.error.is_some())
            {
                return Ok(rpc);
            }
        }
        Err(Error::Sse("event stream ended without a response".into()))
    }
}
