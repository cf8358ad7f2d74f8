use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Represents the response from listing all available models on the Ollama server.
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ListModelsResponse {
    /// Available models, in the order the server listed them.
    pub models: Vec<ModelSummary>,
}

/// A single entry of [`ListModelsResponse`].
///
/// Only the name is modelled; size, digest, details and the rest are kept in
/// [`extra`](Self::extra).
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModelSummary {
    /// The name of the model (e.g., "llama2").
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelSummary {
    /// Looks up a field that is not modelled explicitly, e.g. `"size"`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Body of a pull request.
#[derive(Serialize, Debug, Clone)]
pub struct PullRequest<'a> {
    pub name: &'a str,
}

/// Represents the response from pulling a model.
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PullResponse {
    /// Final status reported by the server, e.g. `"success"`.
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
