mod convert;
mod stream;
mod types;

use aria_llm::request::GenerateRequest;
use aria_llm::response::Response;
use aria_llm::{LanguageModel, LanguageModelBackend};
use std::sync::Arc;

/// The GitHub Models inference endpoint (OpenAI-compatible).
pub const GITHUB_MODELS_BASE_URL: &str = "https://models.github.ai/inference";

/// The model the workshop phases use throughout.
pub const DEFAULT_MODEL_ID: &str = "openai/gpt-4.1-nano";

/// Configuration for the Chat Completions backend.
pub struct Config {
    pub api_key: String,
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: GITHUB_MODELS_BASE_URL.into(),
        }
    }
}

/// Create a model handle for the given model ID.
pub fn model(config: Config, model_id: &str) -> LanguageModel {
    LanguageModel::new(ChatModel {
        model_id: model_id.to_string(),
        state: Arc::new(BackendState {
            client: reqwest::Client::new(),
            config,
        }),
    })
}

/// Create the default workshop model, reading `GITHUB_TOKEN` from the
/// environment.
pub fn from_env() -> LanguageModel {
    model(
        Config {
            api_key: std::env::var("GITHUB_TOKEN").unwrap_or_default(),
            ..Default::default()
        },
        DEFAULT_MODEL_ID,
    )
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

pub(crate) struct BackendState {
    pub(crate) client: reqwest::Client,
    pub(crate) config: Config,
}

struct ChatModel {
    model_id: String,
    state: Arc<BackendState>,
}

impl LanguageModelBackend for ChatModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn generate(&self, request: GenerateRequest) -> Response {
        let body = convert::to_chat_request(&self.model_id, &request);
        let state = Arc::clone(&self.state);
        Response::new(stream::open(state, body))
    }
}
