//! Gallery items and activity log entries.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::Category;

pub const AGENTS: &[&str] = &[
    "Zeta-Node",
    "Vector-Core",
    "Design-Alpha-9",
    "Omni-Gen",
    "Poly-Bot",
    "Prism-AIG",
    "Neural-Flux",
    "Logic-Gate",
    "Vertex-6",
    "Synth-Arch",
];

pub const STYLES: &[&str] = &[
    "Cyberpunk",
    "Solar-Punk",
    "Brutalist",
    "Swiss-Modern",
    "Neo-Luxury",
    "Street-Pop",
    "Monochrome",
    "Glassmorphism",
    "Techno-Organic",
    "Minimal-Chic",
];

const ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ID_LEN: usize = 9;

/// One synthesized gallery entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub seed: String,
    pub style: String,
    pub agent: String,
    pub created_at: DateTime<Utc>,
    pub category: Category,
    /// Always in `40..100`.
    pub complexity: u8,
}

impl GalleryItem {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let id: String = (0..ID_LEN)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();

        Self {
            seed: id.clone(),
            id,
            style: pick(rng, STYLES),
            agent: pick(rng, AGENTS),
            created_at: Utc::now(),
            category: Category::random(rng),
            complexity: rng.gen_range(40..100),
        }
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, options: &[&str]) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub message: String,
    pub status: LogStatus,
    pub agent_name: String,
}

impl ActivityLogEntry {
    /// Log entry for a resolved annotation of `item`.
    pub fn synthesis(item: &GalleryItem, annotation: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            message: format!(
                "[AGENT CLUSTER] {}: Executing synthesis of '{}' variant for {}. Logic: {}",
                item.agent, item.style, item.category, annotation
            ),
            status: LogStatus::Success,
            agent_name: item.agent.clone(),
        }
    }
}
