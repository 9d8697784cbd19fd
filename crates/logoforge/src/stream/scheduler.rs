//! Synchronous stream state machine.
//!
//! [`StreamCore`] owns both rings, the pause flag, and the synthetic counter.
//! It knows nothing about timers or the backend; the async driver in
//! [`super::live`] calls [`StreamCore::tick`] on each interval and
//! [`StreamCore::record_annotation`] as annotations resolve.

use forgeconf::StreamConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::item::{ActivityLogEntry, GalleryItem};
use super::ring::RingBuffer;

/// Largest counter step per tick.
pub const MAX_COUNTER_STEP: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamState {
    pub paused: bool,
    pub synthetic_counter: u64,
}

/// Point-in-time copy of everything a viewer renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSnapshot {
    /// Newest first.
    pub gallery: Vec<GalleryItem>,
    /// Newest first, in annotation-completion order.
    pub log: Vec<ActivityLogEntry>,
    pub state: StreamState,
}

pub struct StreamCore {
    config: StreamConfig,
    gallery: RingBuffer<GalleryItem>,
    log: RingBuffer<ActivityLogEntry>,
    state: StreamState,
    rng: StdRng,
}

impl StreamCore {
    /// Start in Running with the initial batch materialized.
    pub fn new(config: StreamConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: StreamConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: StreamConfig, rng: StdRng) -> Self {
        let mut core = Self {
            gallery: RingBuffer::new(config.gallery_capacity),
            log: RingBuffer::new(config.log_capacity),
            state: StreamState {
                paused: false,
                synthetic_counter: config.counter_start,
            },
            config,
            rng,
        };
        core.materialize();
        core
    }

    fn materialize(&mut self) {
        let batch: Vec<GalleryItem> = (0..self.config.initial_items)
            .map(|_| GalleryItem::random(&mut self.rng))
            .collect();
        self.gallery.replace(batch);
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn gallery_len(&self) -> usize {
        self.gallery.len()
    }

    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    /// One timer tick. Returns the new item, or `None` while paused.
    pub fn tick(&mut self) -> Option<GalleryItem> {
        if self.state.paused {
            return None;
        }

        let item = GalleryItem::random(&mut self.rng);
        if let Some(evicted) = self.gallery.push_front(item.clone()) {
            tracing::trace!(item.id = %evicted.id, "Evicted gallery item");
        }

        let step = self.rng.gen_range(1..=MAX_COUNTER_STEP);
        self.state.synthetic_counter = self.state.synthetic_counter.saturating_add(step);

        Some(item)
    }

    /// Prepend the log entry for a resolved annotation. Applies while paused too.
    pub fn record_annotation(&mut self, item: &GalleryItem, annotation: &str) -> ActivityLogEntry {
        let entry = ActivityLogEntry::synthesis(item, annotation);
        self.log.push_front(entry.clone());
        entry
    }

    /// Returns false if already paused.
    pub fn pause(&mut self) -> bool {
        if self.state.paused {
            return false;
        }
        self.state.paused = true;
        true
    }

    /// Re-enter Running, re-materializing the initial batch. Returns false if
    /// already running.
    pub fn resume(&mut self) -> bool {
        if !self.state.paused {
            return false;
        }
        self.state.paused = false;
        self.materialize();
        true
    }

    pub fn snapshot(&self) -> StreamSnapshot {
        StreamSnapshot {
            gallery: self.gallery.to_vec(),
            log: self.log.to_vec(),
            state: self.state,
        }
    }
}
