//! Changelog: the ordering authority for a collaborative-editing session
//!
//! Clients propose opaque actions against the clock they last observed.
//! The changelog accepts them into a single total order and hands back the
//! public projection used both to acknowledge the proposer and to fan out
//! to the other participants.

mod entry;
mod error;
mod history;
mod sequencer;

pub use entry::{BroadcastEntry, Clock, LedgerEntry, Proposal, SessionId, UserId};
pub use error::ChangelogError;
pub use history::Changelog;
pub use sequencer::Sequencer;
