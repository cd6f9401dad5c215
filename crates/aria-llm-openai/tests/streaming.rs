//! End-to-end tests of the Chat Completions backend against a mock SSE
//! endpoint.

use aria_llm::stream::FinishReason;
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sse_body(payloads: &[&str]) -> String {
    let mut body = String::new();
    for payload in payloads {
        body.push_str("data: ");
        body.push_str(payload);
        body.push_str("\n\n");
    }
    body.push_str("data: [DONE]\n\n");
    body
}

async fn mock_model(server: &MockServer) -> aria_llm::LanguageModel {
    aria_llm_openai::model(
        aria_llm_openai::Config {
            api_key: "test-token".into(),
            base_url: server.uri(),
        },
        "openai/gpt-4.1-nano",
    )
}

#[tokio::test]
async fn streams_text_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_partial_json(serde_json::json!({
            "model": "openai/gpt-4.1-nano",
            "stream": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse_body(&[
                r#"{"choices":[{"delta":{"content":"Hello, "},"finish_reason":null}]}"#,
                r#"{"choices":[{"delta":{"content":"Workshop!"},"finish_reason":null}]}"#,
                r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#,
                r#"{"choices":[],"usage":{"prompt_tokens":9,"completion_tokens":4}}"#,
            ]),
            "text/event-stream",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let model = mock_model(&server).await;
    let mut req = aria_llm::request();
    req.user("Say 'Hello, Workshop!' and nothing else.");

    let result = model.generate(req.build()).into_result().await.unwrap();
    assert_eq!(result.text, "Hello, Workshop!");
    assert_eq!(result.finish_reason, FinishReason::Stop);
    assert_eq!(result.usage.input_tokens, 9);
    assert_eq!(result.usage.output_tokens, 4);
}

#[tokio::test]
async fn streams_tool_call_round() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse_body(&[
                r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"call_1","function":{"name":"get_weather","arguments":""}}]},"finish_reason":null}]}"#,
                r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"city\":\"Paris\"}"}}]},"finish_reason":null}]}"#,
                r#"{"choices":[{"delta":{},"finish_reason":"tool_calls"}]}"#,
            ]),
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let model = mock_model(&server).await;
    let mut req = aria_llm::request();
    req.user("Weather in Paris?");

    let result = model.generate(req.build()).into_result().await.unwrap();
    assert_eq!(result.text, "");
    assert_eq!(result.finish_reason, FinishReason::ToolCalls);
    assert_eq!(result.tool_calls.len(), 1);
    assert_eq!(result.tool_calls[0].id, "call_1");
    assert_eq!(result.tool_calls[0].name, "get_weather");
    assert_eq!(result.tool_calls[0].arguments, r#"{"city":"Paris"}"#);
}

#[tokio::test]
async fn non_success_status_becomes_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let model = mock_model(&server).await;
    let mut req = aria_llm::request();
    req.user("hi");

    let err = model.generate(req.build()).into_result().await.unwrap_err();
    match err {
        aria_llm::Error::Api { code, message } => {
            assert_eq!(code, "401");
            assert_eq!(message, "bad credentials");
        }
        other => panic!("expected Api error, got {other}"),
    }
}
