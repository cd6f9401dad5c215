//! Tests of the MCP client against a mock streamable-HTTP server.

use std::sync::Arc;

use aria_mcp::{McpClient, remote_tools};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_result() -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "protocolVersion": "2025-03-26",
            "capabilities": {"tools": {}},
            "serverInfo": {"name": "mock-docs", "version": "0.1.0"}
        }
    })
}

/// Mount the initialize + initialized handshake on the mock server.
async fn mount_handshake(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(body_partial_json(serde_json::json!({
            "jsonrpc": "2.0",
            "method": "initialize",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Mcp-Session-Id", "session-abc")
                .set_body_json(init_result()),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(body_partial_json(serde_json::json!({
            "method": "notifications/initialized",
        })))
        .respond_with(ResponseTemplate::new(202))
        .mount(server)
        .await;
}

#[tokio::test]
async fn handshake_captures_session_and_lists_tools() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    // tools/list only answers when the captured session id comes back.
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(header("Mcp-Session-Id", "session-abc"))
        .and(body_partial_json(
            serde_json::json!({"method": "tools/list"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 2,
            "result": {
                "tools": [
                    {
                        "name": "search_docs",
                        "description": "Search the documentation.",
                        "inputSchema": {
                            "type": "object",
                            "properties": {"query": {"type": "string"}},
                            "required": ["query"]
                        }
                    },
                    {"name": "list_pages"}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = McpClient::connect(format!("{}/mcp", server.uri()))
        .await
        .unwrap();
    let tools = client.list_tools().await.unwrap();

    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0].name, "search_docs");
    assert_eq!(tools[0].description.as_deref(), Some("Search the documentation."));
    assert!(tools[0].input_schema.is_some());
    assert_eq!(tools[1].name, "list_pages");
    assert!(tools[1].input_schema.is_none());
}

#[tokio::test]
async fn call_tool_returns_text_from_json_response() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(body_partial_json(serde_json::json!({
            "method": "tools/call",
            "params": {"name": "search_docs", "arguments": {"query": "streams"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 2,
            "result": {
                "content": [{"type": "text", "text": "Streams are lazy."}],
                "isError": false
            }
        })))
        .mount(&server)
        .await;

    let client = McpClient::connect(format!("{}/mcp", server.uri()))
        .await
        .unwrap();
    let result = client
        .call_tool("search_docs", serde_json::json!({"query": "streams"}))
        .await
        .unwrap();

    assert!(!result.is_error);
    assert_eq!(result.text(), "Streams are lazy.");
}

#[tokio::test]
async fn call_tool_reads_sse_wrapped_response() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    let rpc = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 2,
        "result": {
            "content": [{"type": "text", "text": "from the stream"}]
        }
    });
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(body_partial_json(
            serde_json::json!({"method": "tools/call"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!("event: message\ndata: {rpc}\n\n"),
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let client = McpClient::connect(format!("{}/mcp", server.uri()))
        .await
        .unwrap();
    let result = client
        .call_tool("search_docs", serde_json::json!({"query": "x"}))
        .await
        .unwrap();

    assert_eq!(result.text(), "from the stream");
}

#[tokio::test]
async fn rpc_error_becomes_api_error() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(body_partial_json(
            serde_json::json!({"method": "tools/call"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 2,
            "error": {"code": -32602, "message": "unknown tool"}
        })))
        .mount(&server)
        .await;

    let client = McpClient::connect(format!("{}/mcp", server.uri()))
        .await
        .unwrap();
    let err = client
        .call_tool("nope", serde_json::json!({}))
        .await
        .unwrap_err();

    match err {
        aria_llm::Error::Api { code, message } => {
            assert_eq!(code, "-32602");
            assert_eq!(message, "unknown tool");
        }
        other => panic!("expected Api error, got {other}"),
    }
}

#[tokio::test]
async fn remote_tool_reports_server_error_in_band() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(body_partial_json(
            serde_json::json!({"method": "tools/list"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 2,
            "result": {"tools": [{"name": "search_docs"}]}
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(body_partial_json(
            serde_json::json!({"method": "tools/call"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 3,
            "result": {
                "content": [{"type": "text", "text": "index unavailable"}],
                "isError": true
            }
        })))
        .mount(&server)
        .await;

    let client = Arc::new(
        McpClient::connect(format!("{}/mcp", server.uri()))
            .await
            .unwrap(),
    );
    let tools = remote_tools(Arc::clone(&client)).await.unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].definition().name, "search_docs");

    // The error comes back as Ok text the model can read, not as Err.
    let output = tools[0].call_erased(r#"{"query":"x"}"#).await.unwrap();
    assert_eq!(output, "Tool 'search_docs' reported an error: index unavailable");
}
