//! The ordered history of one document
//!
//! [`Changelog`] is the plain state pair: the append-only entries and the
//! log clock. It has no synchronization of its own; [`super::Sequencer`]
//! wraps it for concurrent use.

use super::entry::{BroadcastEntry, Clock, LedgerEntry, Proposal, UserId};
use super::error::ChangelogError;

// Trimming would need a base offset subtracted from external clocks here.
#[derive(Debug, Default)]
pub struct Changelog {
    entries: Vec<LedgerEntry>,
    log_clock: Clock,
}

impl Changelog {
    /// Create an empty changelog (clock 0)
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a proposal and append it at the current tip.
    ///
    /// Rejects proposals whose clock is ahead of the log. Stale proposals
    /// (clock below the tip) are accepted against the tip.
    pub fn accept_proposal(
        &mut self,
        proposal: Proposal,
        user_id: UserId,
    ) -> Result<BroadcastEntry, ChangelogError> {
        if proposal.proposed_clock > self.log_clock {
            return Err(ChangelogError::InvalidClock {
                proposed: proposal.proposed_clock,
                log_clock: self.log_clock,
            });
        }

        let entry = proposal.accept(self.log_clock, user_id);
        let public = entry.strip();
        self.log_clock += 1;
        self.entries.push(entry);
        Ok(public)
    }

    /// Public projections of entries `[begin, end)` in acceptance order
    pub fn range(&self, begin: Clock, end: Clock) -> Result<Vec<BroadcastEntry>, ChangelogError> {
        if begin > end || end > self.log_clock {
            return Err(ChangelogError::OutOfRange {
                begin,
                end,
                log_clock: self.log_clock,
            });
        }
        Ok(self.entries[begin as usize..end as usize]
            .iter()
            .map(LedgerEntry::strip)
            .collect())
    }

    /// Everything from `begin` up to the tip
    pub fn suffix_from(&self, begin: Clock) -> Result<Vec<BroadcastEntry>, ChangelogError> {
        self.range(begin, self.log_clock)
    }

    /// Number of entries ever accepted, and the next valid acceptance position
    pub fn current_clock(&self) -> Clock {
        self.log_clock
    }

    /// Stored entry at `clock`, private fields included
    pub fn get(&self, clock: Clock) -> Option<&LedgerEntry> {
        self.entries.get(usize::try_from(clock).ok()?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
