// docseq - Ordering authority for collaborative document editing

pub mod changelog;
pub mod config;
pub mod identity;
pub mod registry;

pub use changelog::{
    BroadcastEntry, Changelog, ChangelogError, Clock, LedgerEntry, Proposal, Sequencer, SessionId,
    UserId,
};
pub use config::SequencerConfig;
pub use identity::{IdentityError, IdentityResolver, StaticResolver, TrustingResolver};
pub use registry::{DocumentId, DocumentRegistry};
