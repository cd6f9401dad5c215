use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// One entry in a conversation history.
///
/// History is append-only: a turn appends the user message, then (eventually)
/// the assistant's final answer. Assistant messages may carry tool calls in
/// addition to (or instead of) text; tool messages carry the result of one
/// such call, correlated by `tool_call_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallPart>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// An assistant message that requests tool invocations.
    pub fn assistant_with_calls(content: impl Into<String>, tool_calls: Vec<ToolCallPart>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Message::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }
}

/// A tool invocation requested by the model as part of an assistant turn.
///
/// `arguments` is the raw JSON string as produced by the model; it is parsed
/// against the tool's input type only at execution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallPart {
    /// Correlates the call with its result (unique within one assistant turn).
    pub id: String,
    pub name: String,
    pub arguments: String,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// The frozen, built request — produced by [`RequestBuilder`], consumed by
/// `LanguageModel::generate`.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub options: GenerateOptions,
}

/// Knobs that control generation behavior.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub tool_choice: ToolChoice,
}

/// Convenience entry point: `aria_llm::request()`.
pub fn request() -> RequestBuilder {
    RequestBuilder::default()
}

#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    messages: Vec<Message>,
    tools: Vec<ToolDefinition>,
    options: GenerateOptions,
}

impl RequestBuilder {
    pub fn system(&mut self, text: impl Into<String>) -> &mut Self {
        self.messages.push(Message::system(text));
        self
    }

    pub fn user(&mut self, text: impl Into<String>) -> &mut Self {
        self.messages.push(Message::user(text));
        self
    }

    pub fn assistant(&mut self, text: impl Into<String>) -> &mut Self {
        self.messages.push(Message::assistant(text));
        self
    }

    pub fn tool_result(
        &mut self,
        tool_call_id: impl Into<String>,
        content: impl Into<String>,
    ) -> &mut Self {
        self.messages
            .push(Message::tool_result(tool_call_id, content));
        self
    }

    pub fn message(&mut self, message: Message) -> &mut Self {
        self.messages.push(message);
        self
    }

    pub fn messages(&mut self, messages: impl IntoIterator<Item = Message>) -> &mut Self {
        self.messages.extend(messages);
        self
    }

    pub fn tool(&mut self, tool: ToolDefinition) -> &mut Self {
        self.tools.push(tool);
        self
    }

    pub fn tools(&mut self, tools: impl IntoIterator<Item = ToolDefinition>) -> &mut Self {
        self.tools.extend(tools);
        self
    }

    pub fn temperature(&mut self, t: f32) -> &mut Self {
        self.options.temperature = Some(t);
        self
    }

    pub fn max_tokens(&mut self, n: u32) -> &mut Self {
        self.options.max_tokens = Some(n);
        self
    }

    pub fn tool_choice(&mut self, choice: ToolChoice) -> &mut Self {
        self.options.tool_choice = choice;
        self
    }

    pub fn build(self) -> GenerateRequest {
        self.into()
    }
}

impl From<RequestBuilder> for GenerateRequest {
    fn from(b: RequestBuilder) -> Self {
        GenerateRequest {
            messages: b.messages,
            tools: b.tools,
            options: b.options,
        }
    }
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// A tool descriptor sent to the model. Describes the name, purpose, and
/// parameter schema — but carries no execution logic.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Schema,
}

/// Controls how the model selects tools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToolChoice {
    #[default]
    Auto,
    None,
    Required,
}

// ---------------------------------------------------------------------------
// Schema descriptor — Rust-native, converts to JSON Schema downstream
// ---------------------------------------------------------------------------

/// A Rust-native description of a value's shape, convertible to JSON Schema.
#[derive(Debug, Clone)]
pub enum Schema {
    String {
        description: Option<String>,
        enumeration: Option<Vec<String>>,
    },
    Number {
        description: Option<String>,
    },
    Boolean {
        description: Option<String>,
    },
    Array {
        description: Option<String>,
        items: Box<Schema>,
    },
    Object {
        description: Option<String>,
        properties: Vec<Property>,
        required: Vec<String>,
    },
    /// Escape hatch: a literal JSON Schema value. Used for tool schemas that
    /// arrive pre-built (e.g. from a remote MCP server).
    Raw(serde_json::Value),
}

#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub schema: Schema,
}

impl Schema {
    /// Convert to a JSON Schema `serde_json::Value`.
    pub fn to_json_schema(&self) -> serde_json::Value {
        use serde_json::{Map, Value, json};

        fn with_description(mut obj: Map<String, Value>, d: &Option<String>) -> Value {
            if let Some(d) = d {
                obj.insert("description".into(), json!(d));
            }
            Value::Object(obj)
        }

        fn base(ty: &str) -> Map<String, Value> {
            let mut obj = Map::new();
            obj.insert("type".into(), json!(ty));
            obj
        }

        match self {
            Schema::String {
                description,
                enumeration,
            } => {
                let mut obj = base("string");
                if let Some(e) = enumeration {
                    obj.insert("enum".into(), json!(e));
                }
                with_description(obj, description)
            }
            Schema::Number { description } => with_description(base("number"), description),
            Schema::Boolean { description } => with_description(base("boolean"), description),
            Schema::Array { description, items } => {
                let mut obj = base("array");
                obj.insert("items".into(), items.to_json_schema());
                with_description(obj, description)
            }
            Schema::Object {
                description,
                properties,
                required,
            } => {
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|p| (p.name.clone(), p.schema.to_json_schema()))
                    .collect();
                let mut obj = base("object");
                obj.insert("properties".into(), Value::Object(props));
                obj.insert("additionalProperties".into(), json!(false));
                if !required.is_empty() {
                    obj.insert("required".into(), json!(required));
                }
                with_description(obj, description)
            }
            Schema::Raw(v) => v.clone(),
        }
    }
}
