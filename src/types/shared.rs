use serde::{Deserialize, Serialize};

/// Error object the server writes in place of a regular payload.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OllamaError {
    pub error: String,
}
