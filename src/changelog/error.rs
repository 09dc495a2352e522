use thiserror::Error;

use crate::identity::IdentityError;

/// Error types for changelog operations
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Proposed clock too high: proposed {proposed}, log clock {log_clock}")]
    InvalidClock { proposed: u64, log_clock: u64 },

    #[error("Range [{begin}, {end}) out of bounds for log clock {log_clock}")]
    OutOfRange { begin: u64, end: u64, log_clock: u64 },

    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] IdentityError),

    #[error("Changelog lock poisoned")]
    LockPoisoned,
}

impl ChangelogError {
    /// Whether the proposer should be told to resynchronize before retrying
    pub fn needs_resync(&self) -> bool {
        matches!(self, ChangelogError::InvalidClock { .. })
    }
}
