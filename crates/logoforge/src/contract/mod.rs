//! Contract layer: capability requests in, decoded results out.
//!
//! Structured results that fail their shape contract decode to the empty
//! value of that shape. Backend failures are never absorbed here; they come
//! back as [`BackendError`] and the caller decides what to show.

mod capability;
pub mod catalog;
mod records;
mod shape;

pub use capability::{
    Capability, CapabilityId, CapabilityRequest, Category, OutputKind, DEFAULT_VOICE_SCRIPT,
};
pub use records::{
    AdCampaign, Availability, BundleMetadata, DomainSuggestion, GroundedReport, PersonaAudit,
    SocialPost,
};
pub use shape::{Field, ObjectShape, Shape, ShapeContract, ShapeViolation};

use std::sync::Arc;

use forgeconf::{ApiKey, BackendConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::backend::{BackendError, BackendResponse, Citation, GeminiBackend, GenerativeBackend};

/// Base64 PCM16 payload exactly as the backend returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioPayload(String);

impl AudioPayload {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Array result with the declared record fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    pub fields: Vec<String>,
    /// Identifying field, when the contract declares one.
    pub key: Option<String>,
    pub items: Vec<Map<String, Value>>,
}

/// Decoded capability output, one variant per output kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CapabilityResult {
    Record {
        fields: Vec<String>,
        record: Map<String, Value>,
    },
    Records(RecordSet),
    Text {
        text: String,
        citations: Vec<Citation>,
    },
    /// `None` when the backend declined to produce audio.
    Audio { payload: Option<AudioPayload> },
}

impl CapabilityResult {
    /// Pure decode of a raw backend answer against the request's declared output.
    pub fn decode(request: &CapabilityRequest, response: BackendResponse) -> Self {
        match (request.output(), request.contract()) {
            (OutputKind::BinaryAudio, _) => CapabilityResult::Audio {
                payload: response.audio.map(AudioPayload),
            },
            (OutputKind::StructuredArray, Some(contract)) => {
                let value = contract.decode_or_empty(response.text.as_deref());
                let items = match value {
                    Value::Array(items) => items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::Object(map) => Some(map),
                            _ => None,
                        })
                        .collect(),
                    _ => Vec::new(),
                };
                CapabilityResult::Records(RecordSet {
                    fields: record_fields(contract),
                    key: contract.key().map(str::to_string),
                    items,
                })
            }
            (OutputKind::StructuredObject, Some(contract)) => {
                let record = match contract.decode_or_empty(response.text.as_deref()) {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                CapabilityResult::Record {
                    fields: record_fields(contract),
                    record,
                }
            }
            _ => CapabilityResult::Text {
                text: response.text.unwrap_or_default(),
                citations: response.citations,
            },
        }
    }

    /// Whether the result holds nothing a viewer could show.
    pub fn is_empty(&self) -> bool {
        match self {
            CapabilityResult::Record { record, .. } => record.is_empty(),
            CapabilityResult::Records(set) => set.items.is_empty(),
            CapabilityResult::Text { text, .. } => text.is_empty(),
            CapabilityResult::Audio { payload } => payload.is_none(),
        }
    }
}

fn record_fields(contract: &ShapeContract) -> Vec<String> {
    contract
        .record()
        .map(ObjectShape::field_names)
        .unwrap_or_default()
}

/// Holds the backend client and executes capability requests against it.
#[derive(Clone)]
pub struct ContractLayer {
    backend: Arc<dyn GenerativeBackend>,
}

impl ContractLayer {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// Build the layer around the HTTP backend.
    pub fn gemini(config: &BackendConfig, api_key: ApiKey) -> Result<Self, BackendError> {
        Ok(Self::new(Arc::new(GeminiBackend::new(config, api_key)?)))
    }

    #[tracing::instrument(
        name = "capability.execute",
        skip(self, request),
        fields(capability.id = %request.id(), result.empty = tracing::field::Empty)
    )]
    pub async fn execute(&self, request: &CapabilityRequest) -> Result<CapabilityResult, BackendError> {
        let response = self.backend.generate(request.to_backend_request()).await?;
        let result = CapabilityResult::decode(request, response);
        tracing::Span::current().record("result.empty", result.is_empty());
        Ok(result)
    }

    async fn record<T>(&self, capability: Capability) -> Result<T, BackendError>
    where
        T: DeserializeOwned + Default,
    {
        let result = self.execute(&CapabilityRequest::new(capability)).await?;
        Ok(match result {
            CapabilityResult::Record { record, .. } => typed(Value::Object(record)),
            _ => T::default(),
        })
    }

    async fn records<T>(&self, capability: Capability) -> Result<Vec<T>, BackendError>
    where
        T: DeserializeOwned,
    {
        let result = self.execute(&CapabilityRequest::new(capability)).await?;
        Ok(match result {
            CapabilityResult::Records(set) => {
                let items = set.items.into_iter().map(Value::Object).collect();
                typed::<Option<Vec<T>>>(Value::Array(items)).unwrap_or_default()
            }
            _ => Vec::new(),
        })
    }

    async fn text(&self, capability: Capability) -> Result<GroundedReport, BackendError> {
        let result = self.execute(&CapabilityRequest::new(capability)).await?;
        Ok(match result {
            CapabilityResult::Text { text, citations } => GroundedReport { text, citations },
            _ => GroundedReport::default(),
        })
    }

    pub async fn bundle_metadata(&self, category: Category) -> Result<BundleMetadata, BackendError> {
        self.record(Capability::BundleMetadata { category }).await
    }

    /// Synthesized speech, or `None` when the backend produced no audio.
    pub async fn brand_voice(&self, script: &str) -> Result<Option<AudioPayload>, BackendError> {
        let request = CapabilityRequest::new(Capability::BrandVoice {
            script: script.to_string(),
        });
        Ok(match self.execute(&request).await? {
            CapabilityResult::Audio { payload } => payload,
            _ => None,
        })
    }

    pub async fn animation_prompt(&self, logo_description: &str) -> Result<String, BackendError> {
        let report = self
            .text(Capability::AnimationPrompt {
                logo_description: logo_description.to_string(),
            })
            .await?;
        Ok(report.text)
    }

    pub async fn trademark_safety(
        &self,
        category: Category,
        title: &str,
    ) -> Result<GroundedReport, BackendError> {
        self.text(Capability::TrademarkSafety {
            category,
            title: title.to_string(),
        })
        .await
    }

    pub async fn ad_campaign(
        &self,
        bundle_title: &str,
        category: Category,
    ) -> Result<AdCampaign, BackendError> {
        self.record(Capability::AdCampaign {
            bundle_title: bundle_title.to_string(),
            category,
        })
        .await
    }

    pub async fn local_competitors(
        &self,
        category: Category,
        latitude: f64,
        longitude: f64,
    ) -> Result<GroundedReport, BackendError> {
        self.text(Capability::LocalCompetitors {
            category,
            latitude,
            longitude,
        })
        .await
    }

    pub async fn social_calendar(
        &self,
        brand: &str,
        category: Category,
    ) -> Result<Vec<SocialPost>, BackendError> {
        self.records(Capability::SocialCalendar {
            brand: brand.to_string(),
            category,
        })
        .await
    }

    pub async fn domain_scout(
        &self,
        brand: &str,
        category: Category,
    ) -> Result<Vec<DomainSuggestion>, BackendError> {
        self.records(Capability::DomainScout {
            brand: brand.to_string(),
            category,
        })
        .await
    }

    pub async fn persona_audit(&self, brand_description: &str) -> Result<PersonaAudit, BackendError> {
        self.record(Capability::PersonaAudit {
            brand_description: brand_description.to_string(),
        })
        .await
    }

    pub async fn pitch_deck(&self, brand: &str, mission: &str) -> Result<String, BackendError> {
        let report = self
            .text(Capability::PitchDeck {
                brand: brand.to_string(),
                mission: mission.to_string(),
            })
            .await?;
        Ok(report.text)
    }

    pub async fn newsletter(&self, bundle_title: &str, features: &str) -> Result<String, BackendError> {
        let report = self
            .text(Capability::Newsletter {
                bundle_title: bundle_title.to_string(),
                features: features.to_string(),
            })
            .await?;
        Ok(report.text)
    }

    pub async fn color_remix(&self, category: Category) -> Result<String, BackendError> {
        Ok(self.text(Capability::ColorRemix { category }).await?.text)
    }

    pub async fn live_thinking(&self, agent: &str) -> Result<String, BackendError> {
        let report = self
            .text(Capability::LiveThinking {
                agent: agent.to_string(),
            })
            .await?;
        Ok(report.text)
    }
}

/// Typed conversion; a value that validated but does not convert is treated
/// like a shape failure.
fn typed<T: DeserializeOwned + Default>(value: Value) -> T {
    match serde_json::from_value(value) {
        Ok(typed) => typed,
        Err(e) => {
            tracing::debug!(error = %e, "Structured response did not convert to record type");
            T::default()
        }
    }
}
