//! Concurrent ordering authority for one document
//!
//! The [`Sequencer`] guards a [`Changelog`] with a single read-write lock.
//! Acceptance (validate, stamp, append, publish) runs under the write lock,
//! so no two acceptances interleave. Range queries share the read lock and
//! see either the state before or after an acceptance, never a mix.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;

use super::entry::{BroadcastEntry, Clock, Proposal, UserId};
use super::error::ChangelogError;
use super::history::Changelog;
use crate::config::SequencerConfig;
use crate::identity::IdentityResolver;

pub struct Sequencer {
    config: SequencerConfig,
    log: RwLock<Changelog>,
    /// Fan-out of accepted entries, in acceptance order
    accepted_tx: broadcast::Sender<BroadcastEntry>,
}

impl Sequencer {
    /// Create an empty sequencer
    pub fn new(config: SequencerConfig) -> Self {
        let (accepted_tx, _) = broadcast::channel(config.channel_capacity());
        Self {
            config,
            log: RwLock::new(Changelog::new()),
            accepted_tx,
        }
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Changelog>, ChangelogError> {
        self.log.read().map_err(|_| ChangelogError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Changelog>, ChangelogError> {
        self.log.write().map_err(|_| ChangelogError::LockPoisoned)
    }

    /// Accept a proposal on behalf of an already-resolved user
    pub fn accept_proposal(
        &self,
        proposal: Proposal,
        user_id: UserId,
    ) -> Result<BroadcastEntry, ChangelogError> {
        let mut log = self.write()?;
        let proposed = proposal.proposed_clock;

        match log.accept_proposal(proposal, user_id) {
            Ok(accepted) => {
                if let Some(stored) = log.get(accepted.accepted_clock) {
                    log::debug!(
                        "[{}] accepted clock {} (proposed {}) from {} at {}",
                        self.config.label,
                        accepted.accepted_clock,
                        proposed,
                        accepted.user_id,
                        stored.accepted_at().to_rfc3339()
                    );
                }
                // Published under the lock so subscribers see clock order.
                // No receivers is fine.
                let _ = self.accepted_tx.send(accepted.clone());
                Ok(accepted)
            }
            Err(e) => {
                log::warn!("[{}] rejected proposal: {}", self.config.label, e);
                Err(e)
            }
        }
    }

    /// Resolve the proposer's identity, then accept.
    ///
    /// Resolution happens before the lock is taken.
    pub async fn submit(
        &self,
        proposal: Proposal,
        resolver: &dyn IdentityResolver,
    ) -> Result<BroadcastEntry, ChangelogError> {
        let user_id = match resolver
            .resolve(&proposal.session_id, &proposal.caller_id)
            .await
        {
            Ok(user_id) => user_id,
            Err(e) => {
                log::warn!(
                    "[{}] could not resolve caller {}: {}",
                    self.config.label,
                    proposal.caller_id,
                    e
                );
                return Err(e.into());
            }
        };
        self.accept_proposal(proposal, user_id)
    }

    /// Public projections of entries `[begin, end)`
    pub fn range(&self, begin: Clock, end: Clock) -> Result<Vec<BroadcastEntry>, ChangelogError> {
        self.read()?.range(begin, end).map_err(|e| {
            log::warn!("[{}] {}", self.config.label, e);
            e
        })
    }

    /// Entries from `begin` to the tip, for clients catching up after reconnect
    pub fn suffix_from(&self, begin: Clock) -> Result<Vec<BroadcastEntry>, ChangelogError> {
        self.read()?.suffix_from(begin).map_err(|e| {
            log::warn!("[{}] {}", self.config.label, e);
            e
        })
    }

    pub fn current_clock(&self) -> Result<Clock, ChangelogError> {
        Ok(self.read()?.current_clock())
    }

    /// The clock and the full public history, read under one lock
    pub fn snapshot(&self) -> Result<(Clock, Vec<BroadcastEntry>), ChangelogError> {
        let log = self.read()?;
        Ok((log.current_clock(), log.suffix_from(0)?))
    }

    /// Receive every entry accepted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastEntry> {
        self.accepted_tx.subscribe()
    }

    pub fn len(&self) -> Result<usize, ChangelogError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, ChangelogError> {
        Ok(self.read()?.is_empty())
    }

    /// Poison the lock by panicking while holding it
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        std::thread::scope(|scope| {
            let joined = scope
                .spawn(|| {
                    let _guard = self.log.write().unwrap();
                    panic!("writer died holding the lock");
                })
                .join();
            assert!(joined.is_err());
        });
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(SequencerConfig::default())
    }
}
