use std::time::Duration;

use async_trait::async_trait;
use forgeconf::{ApiKey, BackendConfig, ModelsConfig};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    BackendError, BackendRequest, BackendResponse, Citation, GenerativeBackend, Grounding,
    ModelTier, ResponseMode,
};

/// Client for the `generateContent` REST endpoint.
///
/// Built once at startup from validated configuration; holds no per-call state.
pub struct GeminiBackend {
    base_url: String,
    api_key: ApiKey,
    models: ModelsConfig,
    voice: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(config: &BackendConfig, api_key: ApiKey) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            models: config.models.clone(),
            voice: config.voice.clone(),
            client,
        })
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.models.fast,
            ModelTier::Reasoning => &self.models.reasoning,
            ModelTier::Speech => &self.models.speech,
            ModelTier::Lite => &self.models.lite,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    // Helper to inject traceparent header for distributed tracing
    fn inject_trace_context(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let span = tracing::Span::current();
        let context = span.context();
        let ctx_span = context.span();
        let span_context = ctx_span.span_context();

        if span_context.is_valid() {
            let flags = if span_context.is_sampled() { "01" } else { "00" };
            let traceparent = format!(
                "00-{}-{}-{}",
                span_context.trace_id(),
                span_context.span_id(),
                flags
            );
            builder.header("traceparent", traceparent)
        } else {
            builder
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    #[tracing::instrument(
        name = "backend.generate",
        skip(self, request),
        fields(
            model.tier = ?request.tier,
            model.name = tracing::field::Empty,
            http.status = tracing::field::Empty,
        )
    )]
    async fn generate(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        let model = self.model_for(request.tier).to_string();
        tracing::Span::current().record("model.name", model.as_str());

        let body = build_request_body(&request, &self.voice);
        let builder = self
            .client
            .post(self.endpoint(&model))
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body);
        let builder = self.inject_trace_context(builder);

        let resp = builder
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = resp.status();
        tracing::Span::current().record("http.status", status.as_u16());

        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            tracing::warn!(status = status.as_u16(), "Backend rejected request");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        if let Some(reason) = payload
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            tracing::warn!(block_reason = reason, "Backend declined the prompt");
        }

        Ok(payload.into_response())
    }
}

/// Build the JSON body for a `generateContent` call.
pub(crate) fn build_request_body(request: &BackendRequest, voice: &str) -> Value {
    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.instruction }]
        }]
    });

    match &request.mode {
        ResponseMode::Text => {}
        ResponseMode::Json { schema } => {
            body["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": schema,
            });
        }
        ResponseMode::Speech => {
            body["generationConfig"] = json!({
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": voice }
                    }
                }
            });
        }
        ResponseMode::Grounded(Grounding::Search) => {
            body["tools"] = json!([{ "googleSearch": {} }]);
        }
        ResponseMode::Grounded(Grounding::Maps {
            latitude,
            longitude,
        }) => {
            body["tools"] = json!([{ "googleMaps": {} }]);
            body["toolConfig"] = json!({
                "retrievalConfig": {
                    "latLng": { "latitude": latitude, "longitude": longitude }
                }
            });
        }
    }

    body
}

// --- Wire types ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: Option<bool>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Default, Deserialize)]
struct InlineData {
    #[serde(default)]
    data: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<ChunkSource>,
    #[serde(default)]
    maps: Option<ChunkSource>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkSource {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl GenerateContentResponse {
    /// Only the first candidate is considered.
    fn into_response(self) -> BackendResponse {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return BackendResponse::default();
        };

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

        let texts: Vec<String> = parts
            .iter()
            .filter(|p| !p.thought.unwrap_or(false))
            .filter_map(|p| p.text.clone())
            .collect();
        let text = if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        };

        let audio = parts
            .into_iter()
            .find_map(|p| p.inline_data)
            .map(|d| d.data)
            .filter(|d| !d.is_empty());

        let citations = candidate
            .grounding_metadata
            .map(|m| m.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| chunk.web.or(chunk.maps))
            .map(|source| Citation {
                title: source.title,
                uri: source.uri,
            })
            .collect();

        BackendResponse {
            text,
            audio,
            citations,
        }
    }
}
