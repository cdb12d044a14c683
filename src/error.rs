use std::fmt;

use thiserror::Error;

/// A failure talking to the backing key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("ttl of {0:?} is out of range")]
    TtlOutOfRange(std::time::Duration),
}

/// The lock step an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Acquire,
    Release,
    Renew,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Acquire => "acquire",
            Operation::Release => "release",
            Operation::Renew => "renew",
        };
        f.write_str(name)
    }
}

/// Errors returned by lock operations.
///
/// Losing a race for the lock is not an error: `lock`, `unlock` and renewal
/// report that as `Ok(false)`. Anything in here means the store could not
/// answer the question at all, or the lock was misconfigured.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("{op} of lock '{key}' failed: {source}")]
    Store {
        op: Operation,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("{op} of lock '{key}' cancelled before the store answered")]
    Cancelled { op: Operation, key: String },

    #[error("invalid lock configuration: {0}")]
    InvalidConfig(String),
}

impl LockError {
    pub(crate) fn store(op: Operation, key: &str, source: StoreError) -> Self {
        LockError::Store {
            op,
            key: key.to_owned(),
            source,
        }
    }

    pub(crate) fn cancelled(op: Operation, key: &str) -> Self {
        LockError::Cancelled {
            op,
            key: key.to_owned(),
        }
    }

    /// The lock step that failed, if the error came from one.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            LockError::Store { op, .. } | LockError::Cancelled { op, .. } => Some(*op),
            LockError::InvalidConfig(_) => None,
        }
    }
}
