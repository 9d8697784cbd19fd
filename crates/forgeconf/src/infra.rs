//! Infrastructure configuration - things that cannot change at runtime.

use serde::{Deserialize, Serialize};

/// Generative backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the generative language API.
    /// Default: https://generativelanguage.googleapis.com
    #[serde(default = "BackendConfig::default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    /// Default: 60000
    #[serde(default = "BackendConfig::default_timeout_ms")]
    pub timeout_ms: u64,

    /// Prebuilt voice used for speech synthesis.
    /// Default: Kore
    #[serde(default = "BackendConfig::default_voice")]
    pub voice: String,

    /// Sample rate of synthesized speech (PCM16).
    /// Default: 24000
    #[serde(default = "BackendConfig::default_sample_rate")]
    pub sample_rate: u32,

    /// Channel count of synthesized speech.
    /// Default: 1
    #[serde(default = "BackendConfig::default_channels")]
    pub channels: u16,

    #[serde(default)]
    pub models: ModelsConfig,
}

impl BackendConfig {
    fn default_base_url() -> String {
        "https://generativelanguage.googleapis.com".to_string()
    }

    fn default_timeout_ms() -> u64 {
        60_000
    }

    fn default_voice() -> String {
        "Kore".to_string()
    }

    fn default_sample_rate() -> u32 {
        24_000
    }

    fn default_channels() -> u16 {
        1
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_ms: Self::default_timeout_ms(),
            voice: Self::default_voice(),
            sample_rate: Self::default_sample_rate(),
            channels: Self::default_channels(),
            models: ModelsConfig::default(),
        }
    }
}

/// Model names per capability tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// General structured and free-text generation.
    #[serde(default = "ModelsConfig::default_fast")]
    pub fast: String,

    /// Search-grounded analysis.
    #[serde(default = "ModelsConfig::default_reasoning")]
    pub reasoning: String,

    /// Text-to-speech.
    #[serde(default = "ModelsConfig::default_speech")]
    pub speech: String,

    /// Map-grounded research.
    #[serde(default = "ModelsConfig::default_lite")]
    pub lite: String,
}

impl ModelsConfig {
    fn default_fast() -> String {
        "gemini-3-flash-preview".to_string()
    }

    fn default_reasoning() -> String {
        "gemini-3-pro-preview".to_string()
    }

    fn default_speech() -> String {
        "gemini-2.5-flash-preview-tts".to_string()
    }

    fn default_lite() -> String {
        "gemini-2.5-flash-lite-latest".to_string()
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            fast: Self::default_fast(),
            reasoning: Self::default_reasoning(),
            speech: Self::default_speech(),
            lite: Self::default_lite(),
        }
    }
}

/// Telemetry and observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// OTLP gRPC endpoint for OpenTelemetry traces. Unset means fmt logging only.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,

    /// Log level filter (trace, debug, info, warn, error, or an EnvFilter directive).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: None,
            log_level: Self::default_log_level(),
        }
    }
}
