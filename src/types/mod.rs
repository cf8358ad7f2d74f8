//! Contains data structures for requests and responses to the Ollama API.
//!
//! Request and response shapes are open records: the fields this crate relies
//! on are typed, everything else is carried in a flattened map so it survives
//! the round trip.

pub mod generate;
mod http;
mod models;
mod shared;

pub use http::*;
pub use models::*;
pub use shared::*;
