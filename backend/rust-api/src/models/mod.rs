use serde::{Deserialize, Serialize};

pub mod content;
pub mod progress;
pub mod user;

pub use content::*;
pub use progress::*;
pub use user::*;

/// Identifier issued by the store's shared sequence.
pub type EntityId = i64;

/// Body of `PATCH /api/{lessons,problems,projects}/{id}/complete`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
