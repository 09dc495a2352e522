//! Configuration for sequencers

use serde::{Deserialize, Serialize};

/// Configuration for a document sequencer
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Human-readable document label used in log output
    pub label: String,

    /// Capacity of the accepted-entry fan-out channel
    pub broadcast_capacity: usize,
}

impl SequencerConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Channel capacity, never zero
    pub(crate) fn channel_capacity(&self) -> usize {
        self.broadcast_capacity.max(1)
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            label: "document".to_string(),
            broadcast_capacity: 256,
        }
    }
}
