//! Per-document sequencer registry
//!
//! One [`Sequencer`] lives for as long as its document session. The
//! registry creates it when the session opens and discards it, history
//! included, when the session closes.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::changelog::Sequencer;
use crate::config::SequencerConfig;

/// Identifier of a shared document
pub type DocumentId = Uuid;

pub struct DocumentRegistry {
    /// Template for new sequencers; the label is replaced with the document id
    config: SequencerConfig,
    sequencers: RwLock<HashMap<DocumentId, Arc<Sequencer>>>,
}

impl DocumentRegistry {
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            config,
            sequencers: RwLock::new(HashMap::new()),
        }
    }

    /// Get the sequencer for a document, creating an empty one if needed
    pub async fn open(&self, doc_id: DocumentId) -> Arc<Sequencer> {
        if let Some(existing) = self.get(doc_id).await {
            return existing;
        }

        let mut sequencers = self.sequencers.write().await;
        Arc::clone(sequencers.entry(doc_id).or_insert_with(|| {
            log::info!("Opening changelog for document {}", doc_id);
            let config = self.config.clone().with_label(doc_id.to_string());
            Arc::new(Sequencer::new(config))
        }))
    }

    pub async fn get(&self, doc_id: DocumentId) -> Option<Arc<Sequencer>> {
        self.sequencers.read().await.get(&doc_id).cloned()
    }

    /// Discard a document's sequencer. Returns whether it was open.
    pub async fn close(&self, doc_id: DocumentId) -> bool {
        let removed = self.sequencers.write().await.remove(&doc_id);
        if let Some(sequencer) = &removed {
            match sequencer.current_clock() {
                Ok(clock) => log::info!("Closing changelog for document {} at clock {}", doc_id, clock),
                Err(e) => log::warn!("Closing changelog for document {}: {}", doc_id, e),
            }
        }
        removed.is_some()
    }

    /// Ids of all open documents
    pub async fn documents(&self) -> Vec<DocumentId> {
        self.sequencers.read().await.keys().copied().collect()
    }
}

impl Default for DocumentRegistry {
    fn default() -> Self {
        Self::new(SequencerConfig::default())
    }
}
