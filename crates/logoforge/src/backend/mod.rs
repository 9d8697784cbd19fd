//! Generative backend seam.
//!
//! The rest of the crate sees the backend as one operation: send an
//! instruction with a response mode, get back text, an audio payload, and any
//! grounding citations. [`GeminiBackend`] speaks the real wire protocol; tests
//! substitute their own implementations.

mod gemini;

pub use gemini::GeminiBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which configured model serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    Fast,
    Reasoning,
    Speech,
    Lite,
}

/// Tool-assisted generation modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Grounding {
    /// Web search grounding.
    Search,
    /// Maps grounding around a coordinate.
    Maps { latitude: f64, longitude: f64 },
}

/// How the backend should shape its answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseMode {
    /// Plain text.
    Text,
    /// JSON constrained by a response schema.
    Json { schema: serde_json::Value },
    /// Synthesized speech with the configured prebuilt voice.
    Speech,
    /// Text plus citations from a grounding tool.
    Grounded(Grounding),
}

/// One backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub tier: ModelTier,
    pub instruction: String,
    pub mode: ResponseMode,
}

/// Source reference attached to grounded text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Citation {
    pub title: Option<String>,
    pub uri: Option<String>,
}

/// Raw backend answer, before any contract is applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackendResponse {
    /// Concatenated text parts of the first candidate, if any.
    pub text: Option<String>,
    /// Base64 inline audio of the first candidate, if any.
    pub audio: Option<String>,
    pub citations: Vec<Citation>,
}

/// Network or remote failure. Never retried by this crate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(String),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend response could not be decoded: {0}")]
    Decode(String),

    #[error("backend client could not be built: {0}")]
    Client(String),
}

/// Remote structured-generation capability.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, request: BackendRequest) -> Result<BackendResponse, BackendError>;
}
