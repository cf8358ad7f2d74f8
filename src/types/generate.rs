//! Contains all data structures that are particularly used for Ollama Generate API

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Represents a request to the Ollama API for text generation.
///
/// Only `model`, `prompt` and `stream` are modelled. Anything else the server
/// understands (`system`, `options`, `images`, ...) goes into [`extra`](Self::extra)
/// and is written to the request body unchanged. Entries of `extra` named
/// `model`, `prompt` or `stream` are never written; the typed fields win.
#[derive(Deserialize, Default, Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// The name of the model to use for generation (e.g., "llama2").
    pub model: String,
    /// The prompt for the model.
    pub prompt: String,
    /// Whether the server should stream the response as newline-delimited JSON.
    pub stream: Option<bool>,
    /// Additional fields passed through to the server verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const RESERVED_KEYS: [&str; 3] = ["model", "prompt", "stream"];

impl GenerateRequest {
    /// Creates a new [`GenerateRequest`].
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Sets the `stream` flag.
    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Adds an arbitrary field to the request body, e.g. `system` or `options`.
    ///
    /// `model`, `prompt` and `stream` are routed to the typed fields instead;
    /// a value of the wrong JSON type for one of them is ignored.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match key.as_str() {
            "model" => {
                if let Value::String(model) = value {
                    self.model = model;
                }
            }
            "prompt" => {
                if let Value::String(prompt) = value {
                    self.prompt = prompt;
                }
            }
            "stream" => {
                if let Value::Bool(stream) = value {
                    self.stream = Some(stream);
                }
            }
            _ => {
                self.extra.insert(key, value);
            }
        }
        self
    }
}

impl Serialize for GenerateRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("model", &self.model)?;
        map.serialize_entry("prompt", &self.prompt)?;
        if let Some(stream) = self.stream {
            map.serialize_entry("stream", &stream)?;
        }
        for (key, value) in &self.extra {
            if !RESERVED_KEYS.contains(&key.as_str()) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// Represents a response from the Ollama API for text generation.
///
/// Used both for the single non-streaming reply and for each chunk of a
/// streamed one. No field is required to be present; missing ones take their
/// default value.
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenerateResponse {
    /// The name of the model that generated the response.
    pub model: String,
    /// The timestamp when the response was created.
    pub created_at: String,
    /// The generated text (or text chunk when streaming).
    pub response: String,
    /// Indicates if the generation is complete.
    pub done: bool,
    /// Encoded conversation context that can be sent back in a later request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<i64>>,
    /// The total duration of the generation process in nanoseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
    /// The duration spent loading the model in nanoseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_duration: Option<u64>,
    /// The number of tokens in the prompt that were evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// The duration spent evaluating the prompt in nanoseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_duration: Option<u64>,
    /// The number of tokens generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
    /// The duration spent generating tokens in nanoseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_duration: Option<u64>,
    /// Fields the server sent that are not modelled above (e.g. `done_reason`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Represents an event received from a streaming generation response.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum GenerateStreamEvent {
    /// A chunk of the generated response.
    MessageChunk(GenerateResponse),
    /// The server reported an error in the middle of the stream.
    Error(String),
    /// A line that could not be decoded.
    Partial {
        /// The un-parseable content.
        partial: String,
        /// The decoder's complaint, if there was one.
        error: Option<String>,
    },
}
