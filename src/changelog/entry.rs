//! Entry types for the changelog
//!
//! A [`Proposal`] arrives from a client, becomes a [`LedgerEntry`] once the
//! changelog accepts it, and leaves the changelog again as a
//! [`BroadcastEntry`] with the session id stripped.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clock position in the changelog
pub type Clock = u64;

/// Resolved, trusted identity of a user (injected by the authorization system)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Secret session identifier.
///
/// Deserializable so it can arrive on a proposal, but never serializable and
/// never printed, so it cannot leave the changelog. Resolvers can compare
/// and hash it, but not read it back.
///
/// ```compile_fail
/// let session = docseq::SessionId::new("secret");
/// let _raw: &str = session.expose();
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[cfg(test)]
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId(<redacted>)")
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Sent by the messaging layer of the proposer. Untrusted.
#[derive(Clone, Debug, Deserialize)]
pub struct Proposal {
    /// Raw representation of the action used by clients
    pub action: Vec<u8>,
    /// The clock the client believes its action follows
    pub proposed_clock: Clock,
    /// Version of the client action schema
    pub schema_version: u32,
    pub session_id: SessionId,
    /// Caller-supplied identifier, not yet resolved
    pub caller_id: String,
}

impl Proposal {
    pub fn new(
        action: Vec<u8>,
        proposed_clock: Clock,
        schema_version: u32,
        session_id: impl Into<SessionId>,
        caller_id: impl Into<String>,
    ) -> Self {
        Self {
            action,
            proposed_clock,
            schema_version,
            session_id: session_id.into(),
            caller_id: caller_id.into(),
        }
    }

    /// Stamp this proposal into a ledger entry at `accepted_clock`
    pub fn accept(self, accepted_clock: Clock, user_id: UserId) -> LedgerEntry {
        LedgerEntry {
            action: self.action,
            proposed_clock: self.proposed_clock,
            accepted_clock,
            schema_version: self.schema_version,
            session_id: self.session_id,
            user_id,
            accepted_at: Utc::now(),
        }
    }
}

/// An accepted entry as stored in the changelog. Never mutated after creation.
///
/// The session id stays inside the crate:
///
/// ```compile_fail
/// let mut log = docseq::Changelog::new();
/// let proposal = docseq::Proposal::new(vec![], 0, 1, "secret", "caller");
/// log.accept_proposal(proposal, "alice".into()).unwrap();
/// let _session = log.get(0).unwrap().session_id();
/// ```
#[derive(Clone, Debug)]
pub struct LedgerEntry {
    action: Vec<u8>,
    proposed_clock: Clock,
    accepted_clock: Clock,
    schema_version: u32,
    session_id: SessionId,
    user_id: UserId,
    accepted_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn action(&self) -> &[u8] {
        &self.action
    }

    pub fn proposed_clock(&self) -> Clock {
        self.proposed_clock
    }

    pub fn accepted_clock(&self) -> Clock {
        self.accepted_clock
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    #[cfg(test)]
    pub(crate) fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn accepted_at(&self) -> DateTime<Utc> {
        self.accepted_at
    }

    /// Public projection. Session id is secret.
    pub fn strip(&self) -> BroadcastEntry {
        BroadcastEntry {
            action: self.action.clone(),
            proposed_clock: self.proposed_clock,
            accepted_clock: self.accepted_clock,
            schema_version: self.schema_version,
            user_id: self.user_id.clone(),
        }
    }
}

/// Sent to the proposer as an acknowledgment and to every other participant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastEntry {
    pub action: Vec<u8>,
    pub proposed_clock: Clock,
    pub accepted_clock: Clock,
    pub schema_version: u32,
    pub user_id: UserId,
}

impl From<&LedgerEntry> for BroadcastEntry {
    fn from(entry: &LedgerEntry) -> Self {
        entry.strip()
    }
}
