//! Converts between aria-llm generic types and the Chat Completions wire
//! format.

use aria_llm::request::{GenerateRequest, Message, ToolChoice};

use crate::types::{
    ChatRequest, StreamOptions, WireFunctionCall, WireFunctionSpec, WireMessage, WireTool,
    WireToolCall,
};

pub fn to_chat_request(model_id: &str, req: &GenerateRequest) -> ChatRequest {
    let messages: Vec<WireMessage> = req.messages.iter().map(to_wire_message).collect();

    let tools: Vec<WireTool> = req
        .tools
        .iter()
        .map(|t| WireTool::Function {
            function: WireFunctionSpec {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.to_json_schema(),
            },
        })
        .collect();

    let tool_choice = match req.options.tool_choice {
        // Omitting the field means auto; also omit when no tools are attached
        // (some endpoints reject tool_choice without tools).
        ToolChoice::Auto => None,
        ToolChoice::None => Some("none".to_string()),
        ToolChoice::Required => Some("required".to_string()),
    };

    ChatRequest {
        model: model_id.to_string(),
        messages,
        stream: true,
        stream_options: Some(StreamOptions {
            include_usage: true,
        }),
        tools,
        tool_choice,
        temperature: req.options.temperature,
        max_tokens: req.options.max_tokens,
    }
}

fn to_wire_message(msg: &Message) -> WireMessage {
    match msg {
        Message::System { content } => WireMessage {
            role: "system",
            content: Some(content.clone()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        },
        Message::User { content } => WireMessage {
            role: "user",
            content: Some(content.clone()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        },
        Message::Assistant {
            content,
            tool_calls,
        } => WireMessage {
            role: "assistant",
            content: if content.is_empty() && !tool_calls.is_empty() {
                None
            } else {
                Some(content.clone())
            },
            tool_calls: tool_calls
                .iter()
                .map(|tc| WireToolCall {
                    id: tc.id.clone(),
                    kind: "function",
                    function: WireFunctionCall {
                        name: tc.name.clone(),
                        arguments: tc.arguments.clone(),
                    },
                })
                .collect(),
            tool_call_id: None,
        },
        Message::Tool {
            tool_call_id,
            content,
        } => WireMessage {
            role: "tool",
            content: Some(content.clone()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.clone()),
        },
    }
}
