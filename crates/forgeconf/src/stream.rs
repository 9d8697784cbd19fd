//! Stream configuration - seeds each live stream instance.

use serde::{Deserialize, Serialize};

/// Live gallery stream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Milliseconds between ticks while running.
    /// Default: 2500
    #[serde(default = "StreamConfig::default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Items materialized locally whenever the stream enters Running.
    /// Default: 24
    #[serde(default = "StreamConfig::default_initial_items")]
    pub initial_items: usize,

    /// Gallery ring capacity.
    /// Default: 60
    #[serde(default = "StreamConfig::default_gallery_capacity")]
    pub gallery_capacity: usize,

    /// Activity log ring capacity.
    /// Default: 31
    #[serde(default = "StreamConfig::default_log_capacity")]
    pub log_capacity: usize,

    /// Starting value of the synthetic counter.
    /// Default: 664557442
    #[serde(default = "StreamConfig::default_counter_start")]
    pub counter_start: u64,
}

impl StreamConfig {
    fn default_tick_interval_ms() -> u64 {
        2_500
    }

    fn default_initial_items() -> usize {
        24
    }

    fn default_gallery_capacity() -> usize {
        60
    }

    fn default_log_capacity() -> usize {
        31
    }

    fn default_counter_start() -> u64 {
        664_557_442
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: Self::default_tick_interval_ms(),
            initial_items: Self::default_initial_items(),
            gallery_capacity: Self::default_gallery_capacity(),
            log_capacity: Self::default_log_capacity(),
            counter_start: Self::default_counter_start(),
        }
    }
}
