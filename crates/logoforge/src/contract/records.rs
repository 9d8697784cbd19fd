//! Typed views over structured capability results.
//!
//! Field names follow the wire casing of the contracts in [`super::catalog`].
//! Every record defaults to its empty form so a non-conforming response still
//! yields a usable value.

use serde::{Deserialize, Serialize};

use crate::backend::Citation;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundleMetadata {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub seo_tags: Vec<String>,
    pub brand_voice_script: String,
    pub blog_article: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdCampaign {
    pub headline: String,
    pub hook: String,
    pub cta: String,
    pub platform: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialPost {
    pub day: String,
    pub platform: String,
    pub content: String,
    pub visual_hook: String,
}

/// Simulated registration status. Not a real registrar lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Availability {
    #[default]
    Available,
    Premium,
    Taken,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomainSuggestion {
    pub domain: String,
    pub availability_sim: Availability,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonaAudit {
    pub demographic: String,
    pub psychographic: String,
    pub pain_points: Vec<String>,
    pub branding_hook: String,
}

/// Grounded free text with its sources.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroundedReport {
    pub text: String,
    pub citations: Vec<Citation>,
}
