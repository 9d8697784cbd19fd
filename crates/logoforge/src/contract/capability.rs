//! Capability identities, arguments, and the immutable request built from them.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::catalog;
use super::shape::ShapeContract;
use crate::backend::{BackendRequest, Grounding, ModelTier, ResponseMode};

/// Fallback script when brand voice is asked to speak nothing.
pub const DEFAULT_VOICE_SCRIPT: &str = "Design Infinite.";

/// Industry sector a capability targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Tech,
    Luxury,
    Streetwear,
    Corporate,
    Minimal,
    Futuristic,
    Web3,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Tech,
        Category::Luxury,
        Category::Streetwear,
        Category::Corporate,
        Category::Minimal,
        Category::Futuristic,
        Category::Web3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tech => "Tech",
            Category::Luxury => "Luxury",
            Category::Streetwear => "Streetwear",
            Category::Corporate => "Corporate",
            Category::Minimal => "Minimal",
            Category::Futuristic => "Futuristic",
            Category::Web3 => "Web3",
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        *Self::ALL.choose(rng).unwrap_or(&Category::Tech)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Output kind a capability declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    StructuredObject,
    StructuredArray,
    FreeText,
    BinaryAudio,
}

/// Stable capability identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityId {
    BundleMetadata,
    BrandVoice,
    AnimationPrompt,
    TrademarkSafety,
    AdCampaign,
    LocalCompetitors,
    SocialCalendar,
    DomainScout,
    PersonaAudit,
    PitchDeck,
    Newsletter,
    ColorRemix,
    LiveThinking,
}

impl CapabilityId {
    pub const ALL: [CapabilityId; 13] = [
        CapabilityId::BundleMetadata,
        CapabilityId::BrandVoice,
        CapabilityId::AnimationPrompt,
        CapabilityId::TrademarkSafety,
        CapabilityId::AdCampaign,
        CapabilityId::LocalCompetitors,
        CapabilityId::SocialCalendar,
        CapabilityId::DomainScout,
        CapabilityId::PersonaAudit,
        CapabilityId::PitchDeck,
        CapabilityId::Newsletter,
        CapabilityId::ColorRemix,
        CapabilityId::LiveThinking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityId::BundleMetadata => "bundle_metadata",
            CapabilityId::BrandVoice => "brand_voice",
            CapabilityId::AnimationPrompt => "animation_prompt",
            CapabilityId::TrademarkSafety => "trademark_safety",
            CapabilityId::AdCampaign => "ad_campaign",
            CapabilityId::LocalCompetitors => "local_competitors",
            CapabilityId::SocialCalendar => "social_calendar",
            CapabilityId::DomainScout => "domain_scout",
            CapabilityId::PersonaAudit => "persona_audit",
            CapabilityId::PitchDeck => "pitch_deck",
            CapabilityId::Newsletter => "newsletter",
            CapabilityId::ColorRemix => "color_remix",
            CapabilityId::LiveThinking => "live_thinking",
        }
    }

    pub fn output_kind(&self) -> OutputKind {
        match self {
            CapabilityId::BundleMetadata | CapabilityId::AdCampaign | CapabilityId::PersonaAudit => {
                OutputKind::StructuredObject
            }
            CapabilityId::SocialCalendar | CapabilityId::DomainScout => OutputKind::StructuredArray,
            CapabilityId::BrandVoice => OutputKind::BinaryAudio,
            CapabilityId::AnimationPrompt
            | CapabilityId::TrademarkSafety
            | CapabilityId::LocalCompetitors
            | CapabilityId::PitchDeck
            | CapabilityId::Newsletter
            | CapabilityId::ColorRemix
            | CapabilityId::LiveThinking => OutputKind::FreeText,
        }
    }

    pub fn tier(&self) -> ModelTier {
        match self {
            CapabilityId::BrandVoice => ModelTier::Speech,
            CapabilityId::TrademarkSafety => ModelTier::Reasoning,
            CapabilityId::LocalCompetitors => ModelTier::Lite,
            _ => ModelTier::Fast,
        }
    }

    /// Shape contract for structured capabilities.
    pub fn contract(&self) -> Option<ShapeContract> {
        match self {
            CapabilityId::BundleMetadata => Some(catalog::bundle_metadata()),
            CapabilityId::AdCampaign => Some(catalog::ad_campaign()),
            CapabilityId::SocialCalendar => Some(catalog::social_calendar()),
            CapabilityId::DomainScout => Some(catalog::domain_scout()),
            CapabilityId::PersonaAudit => Some(catalog::persona_audit()),
            _ => None,
        }
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CapabilityId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("Unknown capability: {}", s))
    }
}

/// A capability together with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "capability", rename_all = "snake_case")]
pub enum Capability {
    BundleMetadata { category: Category },
    BrandVoice { script: String },
    AnimationPrompt { logo_description: String },
    TrademarkSafety { category: Category, title: String },
    AdCampaign { bundle_title: String, category: Category },
    LocalCompetitors { category: Category, latitude: f64, longitude: f64 },
    SocialCalendar { brand: String, category: Category },
    DomainScout { brand: String, category: Category },
    PersonaAudit { brand_description: String },
    PitchDeck { brand: String, mission: String },
    Newsletter { bundle_title: String, features: String },
    ColorRemix { category: Category },
    LiveThinking { agent: String },
}

impl Capability {
    pub fn id(&self) -> CapabilityId {
        match self {
            Capability::BundleMetadata { .. } => CapabilityId::BundleMetadata,
            Capability::BrandVoice { .. } => CapabilityId::BrandVoice,
            Capability::AnimationPrompt { .. } => CapabilityId::AnimationPrompt,
            Capability::TrademarkSafety { .. } => CapabilityId::TrademarkSafety,
            Capability::AdCampaign { .. } => CapabilityId::AdCampaign,
            Capability::LocalCompetitors { .. } => CapabilityId::LocalCompetitors,
            Capability::SocialCalendar { .. } => CapabilityId::SocialCalendar,
            Capability::DomainScout { .. } => CapabilityId::DomainScout,
            Capability::PersonaAudit { .. } => CapabilityId::PersonaAudit,
            Capability::PitchDeck { .. } => CapabilityId::PitchDeck,
            Capability::Newsletter { .. } => CapabilityId::Newsletter,
            Capability::ColorRemix { .. } => CapabilityId::ColorRemix,
            Capability::LiveThinking { .. } => CapabilityId::LiveThinking,
        }
    }

    /// The instruction text sent to the backend.
    pub fn instruction(&self) -> String {
        match self {
            Capability::BundleMetadata { category } => format!(
                "Generate a professional marketplace bundle metadata for an AI-generated logo \
                 collection in the {} industry. Include a pricing strategy between $29-$199.",
                category
            ),
            Capability::BrandVoice { script } => {
                let script = if script.trim().is_empty() {
                    DEFAULT_VOICE_SCRIPT
                } else {
                    script.as_str()
                };
                format!("Say with a high-end professional brand tone: {}", script)
            }
            Capability::AnimationPrompt { logo_description } => format!(
                "Write a cinematic, hyper-realistic video generation prompt for an intro \
                 animation of a logo described as: {}. Focus on motion graphics, light rays, \
                 and professional SFX textures.",
                logo_description
            ),
            Capability::TrademarkSafety { category, title } => format!(
                "Verify the trademark safety for a new brand named \"{}\" in the {} sector. \
                 Perform a simulated search for naming conflicts or visual identity overlaps \
                 in current news and business directories.",
                title, category
            ),
            Capability::AdCampaign {
                bundle_title,
                category,
            } => format!(
                "Create an aggressive, high-converting social media ad campaign for a logo \
                 bundle called \"{}\". Target industry: {}. Use psychological triggers for \
                 branding urgency.",
                bundle_title, category
            ),
            Capability::LocalCompetitors { category, .. } => format!(
                "Research local {} branding trends and existing competitor saturation in this \
                 geolocation to identify whitespace for new logo packages.",
                category
            ),
            Capability::SocialCalendar { brand, category } => format!(
                "Generate a 7-day social media content calendar for a brand named \"{}\" in \
                 the {} industry.",
                brand, category
            ),
            Capability::DomainScout { brand, category } => format!(
                "Suggest 5 modern domain name options for \"{}\" in {}. Predict availability \
                 and provide SEO reasoning.",
                brand, category
            ),
            Capability::PersonaAudit { brand_description } => format!(
                "Analyze the ideal audience persona for this brand: {}.",
                brand_description
            ),
            Capability::PitchDeck { brand, mission } => format!(
                "Create a 10-slide high-level pitch deck narrative for a brand named \"{}\" \
                 with mission: \"{}\".",
                brand, mission
            ),
            Capability::Newsletter {
                bundle_title,
                features,
            } => format!(
                "Write an engaging email newsletter announcing the \"{}\" with these new \
                 features: {}.",
                bundle_title, features
            ),
            Capability::ColorRemix { category } => format!(
                "Suggest 3 trending color palettes and geometric remix strategies for the {} \
                 industry in 2024.",
                category
            ),
            Capability::LiveThinking { agent } => format!(
                "You are AGI Agent {}. Briefly describe one unique logo concept you are \
                 generating right now for the global gallery. Keep it under 15 words.",
                agent
            ),
        }
    }

    fn grounding(&self) -> Option<Grounding> {
        match self {
            Capability::TrademarkSafety { .. } => Some(Grounding::Search),
            Capability::LocalCompetitors {
                latitude,
                longitude,
                ..
            } => Some(Grounding::Maps {
                latitude: *latitude,
                longitude: *longitude,
            }),
            _ => None,
        }
    }
}

/// Immutable, per-call request: capability, parameters, and output shape.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityRequest {
    id: CapabilityId,
    parameters: Capability,
    instruction: String,
    output: OutputKind,
    contract: Option<ShapeContract>,
    grounding: Option<Grounding>,
}

impl CapabilityRequest {
    pub fn new(parameters: Capability) -> Self {
        let id = parameters.id();
        Self {
            id,
            instruction: parameters.instruction(),
            output: id.output_kind(),
            contract: id.contract(),
            grounding: parameters.grounding(),
            parameters,
        }
    }

    pub fn id(&self) -> CapabilityId {
        self.id
    }

    pub fn parameters(&self) -> &Capability {
        &self.parameters
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn output(&self) -> OutputKind {
        self.output
    }

    pub fn contract(&self) -> Option<&ShapeContract> {
        self.contract.as_ref()
    }

    pub fn grounding(&self) -> Option<&Grounding> {
        self.grounding.as_ref()
    }

    pub(crate) fn to_backend_request(&self) -> BackendRequest {
        let mode = match (self.output, &self.contract, &self.grounding) {
            (OutputKind::BinaryAudio, _, _) => ResponseMode::Speech,
            (_, Some(contract), _) => ResponseMode::Json {
                schema: contract.to_schema(),
            },
            (_, None, Some(grounding)) => ResponseMode::Grounded(grounding.clone()),
            (_, None, None) => ResponseMode::Text,
        };

        BackendRequest {
            tier: self.id.tier(),
            instruction: self.instruction.clone(),
            mode,
        }
    }
}
