//! Single-flight dispatch of lab agents.
//!
//! A router runs at most one agent at a time. A request that arrives while
//! another is pending is rejected without touching router state. Results are
//! classified into a [`RenderView`] by their shape; backend failures collapse
//! into one fixed message.

use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::contract::{
    Capability, CapabilityRequest, CapabilityResult, Category, ContractLayer, RecordSet,
};

/// Shown for every failed invocation regardless of cause.
pub const UNAVAILABLE_MESSAGE: &str = "Capability unavailable: agent node offline.";

const PITCH_MISSION: &str = "Revolutionizing branding.";
const NEWSLETTER_FEATURES: &str = "New interactive mockups.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabAgent {
    Social,
    Domain,
    Persona,
    Pitch,
    Newsletter,
    Color,
}

impl LabAgent {
    pub const ALL: [LabAgent; 6] = [
        LabAgent::Social,
        LabAgent::Domain,
        LabAgent::Persona,
        LabAgent::Pitch,
        LabAgent::Newsletter,
        LabAgent::Color,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LabAgent::Social => "social",
            LabAgent::Domain => "domain",
            LabAgent::Persona => "persona",
            LabAgent::Pitch => "pitch",
            LabAgent::Newsletter => "newsletter",
            LabAgent::Color => "color",
        }
    }

    /// Only the color agent works from the category alone.
    pub fn requires_subject(&self) -> bool {
        !matches!(self, LabAgent::Color)
    }

    fn capability(&self, subject: &str, category: Category) -> Capability {
        match self {
            LabAgent::Social => Capability::SocialCalendar {
                brand: subject.to_string(),
                category,
            },
            LabAgent::Domain => Capability::DomainScout {
                brand: subject.to_string(),
                category,
            },
            LabAgent::Persona => Capability::PersonaAudit {
                brand_description: format!("{} in {} sector", subject, category),
            },
            LabAgent::Pitch => Capability::PitchDeck {
                brand: subject.to_string(),
                mission: PITCH_MISSION.to_string(),
            },
            LabAgent::Newsletter => Capability::Newsletter {
                bundle_title: subject.to_string(),
                features: NEWSLETTER_FEATURES.to_string(),
            },
            LabAgent::Color => Capability::ColorRemix { category },
        }
    }
}

impl fmt::Display for LabAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabAgent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LabAgent::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabArguments {
    pub subject: String,
    pub category: Category,
}

impl LabArguments {
    pub fn new(subject: impl Into<String>, category: Category) -> Self {
        Self {
            subject: subject.into(),
            category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Idle,
    Pending(LabAgent),
}

/// Why an invocation never reached the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Busy { pending: LabAgent },
    MissingSubject,
    UnknownCapability(String),
}

/// One keyed record, titled by its key field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub key: String,
    pub fields: Vec<(String, String)>,
}

/// How a result should be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum RenderView {
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Cards { cards: Vec<Card> },
    Text { text: String },
    Serialized { text: String },
}

impl RenderView {
    pub fn classify(result: CapabilityResult) -> Self {
        match result {
            CapabilityResult::Records(set) => match set.key.clone() {
                Some(key) => RenderView::Cards {
                    cards: cards(set, &key),
                },
                None => table(set),
            },
            CapabilityResult::Text { text, citations } => {
                let mut text = text;
                for citation in citations {
                    let label = citation
                        .title
                        .or(citation.uri.clone())
                        .unwrap_or_default();
                    match citation.uri {
                        Some(uri) if uri != label => text.push_str(&format!("\n[{}] {}", label, uri)),
                        _ => text.push_str(&format!("\n[{}]", label)),
                    }
                }
                RenderView::Text { text }
            }
            CapabilityResult::Record { record, .. } => RenderView::Serialized {
                text: serde_json::to_string_pretty(&Value::Object(record))
                    .unwrap_or_else(|_| "{}".to_string()),
            },
            CapabilityResult::Audio { payload } => RenderView::Serialized {
                text: match payload {
                    Some(p) => format!("<audio payload, {} base64 chars>", p.as_str().len()),
                    None => "<no audio>".to_string(),
                },
            },
        }
    }
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn table(set: RecordSet) -> RenderView {
    let rows = set
        .items
        .iter()
        .map(|item| set.fields.iter().map(|f| cell(item.get(f))).collect())
        .collect();
    RenderView::Table {
        columns: set.fields,
        rows,
    }
}

fn cards(set: RecordSet, key: &str) -> Vec<Card> {
    set.items
        .iter()
        .map(|item: &Map<String, Value>| Card {
            key: cell(item.get(key)),
            fields: set
                .fields
                .iter()
                .filter(|f| f.as_str() != key)
                .map(|f| (f.clone(), cell(item.get(f))))
                .collect(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Rejected(Rejection),
    Completed(RenderView),
    /// Carries [`UNAVAILABLE_MESSAGE`].
    Failed(String),
}

pub struct Router {
    contract: ContractLayer,
    pending: Mutex<Option<LabAgent>>,
}

/// Clears the pending slot however the invocation ends, including
/// cancellation of the caller's future.
struct PendingGuard<'a> {
    slot: &'a Mutex<Option<LabAgent>>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        *lock(self.slot) = None;
    }
}

fn lock(slot: &Mutex<Option<LabAgent>>) -> MutexGuard<'_, Option<LabAgent>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Router {
    pub fn new(contract: ContractLayer) -> Self {
        Self {
            contract,
            pending: Mutex::new(None),
        }
    }

    pub fn state(&self) -> RouterState {
        match *lock(&self.pending) {
            Some(agent) => RouterState::Pending(agent),
            None => RouterState::Idle,
        }
    }

    /// Parse `capability_id` and invoke it.
    pub async fn invoke(&self, capability_id: &str, arguments: LabArguments) -> Invocation {
        match capability_id.parse::<LabAgent>() {
            Ok(agent) => self.invoke_agent(agent, arguments).await,
            Err(unknown) => Invocation::Rejected(Rejection::UnknownCapability(unknown)),
        }
    }

    #[tracing::instrument(name = "router.invoke", skip(self, agent, arguments), fields(agent = %agent))]
    pub async fn invoke_agent(&self, agent: LabAgent, arguments: LabArguments) -> Invocation {
        let subject = arguments.subject.trim();
        if agent.requires_subject() && subject.is_empty() {
            return Invocation::Rejected(Rejection::MissingSubject);
        }

        let _guard = {
            let mut slot = lock(&self.pending);
            if let Some(pending) = *slot {
                tracing::debug!(%pending, "Router busy, rejecting");
                return Invocation::Rejected(Rejection::Busy { pending });
            }
            *slot = Some(agent);
            PendingGuard {
                slot: &self.pending,
            }
        };

        let request = CapabilityRequest::new(agent.capability(subject, arguments.category));
        match self.contract.execute(&request).await {
            Ok(result) => Invocation::Completed(RenderView::classify(result)),
            Err(e) => {
                tracing::warn!(error = %e, "Lab agent failed");
                Invocation::Failed(UNAVAILABLE_MESSAGE.to_string())
            }
        }
    }
}
