//! Identity resolution for proposers
//!
//! A proposal carries the caller's own, untrusted identifier. Before an
//! entry is stamped, the authorization collaborator turns the session and
//! caller into a trusted [`UserId`]. This module defines that seam.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::changelog::{SessionId, UserId};

/// Error types for identity resolution
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Unknown session")]
    UnknownSession,

    #[error("Identity rejected: {0}")]
    Rejected(String),
}

/// Resolves a session's caller into a durable user identity
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, session_id: &SessionId, caller_id: &str) -> Result<UserId, IdentityError>;
}

/// Resolver backed by a fixed session table.
///
/// The caller id is ignored; the session alone decides who the user is.
#[derive(Default)]
pub struct StaticResolver {
    sessions: HashMap<SessionId, UserId>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a session to a user
    pub fn with_session(mut self, session_id: impl Into<SessionId>, user_id: impl Into<UserId>) -> Self {
        self.sessions.insert(session_id.into(), user_id.into());
        self
    }
}

#[async_trait]
impl IdentityResolver for StaticResolver {
    async fn resolve(&self, session_id: &SessionId, _caller_id: &str) -> Result<UserId, IdentityError> {
        self.sessions
            .get(session_id)
            .cloned()
            .ok_or(IdentityError::UnknownSession)
    }
}

/// Takes the caller id at its word. For tools and tests only.
pub struct TrustingResolver;

#[async_trait]
impl IdentityResolver for TrustingResolver {
    async fn resolve(&self, _session_id: &SessionId, caller_id: &str) -> Result<UserId, IdentityError> {
        if caller_id.is_empty() {
            return Err(IdentityError::Rejected("empty caller id".into()));
        }
        Ok(UserId::new(caller_id))
    }
}
