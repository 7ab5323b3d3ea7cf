//! Lock primitive
//!
//! A non-reentrant exclusive lock. Each grant carries a fencing version that
//! strictly increases across grants. There is no wait queue: acquiring a
//! held lock is a Conflict and the caller decides whether to retry.

use serde::{Deserialize, Serialize};
use sharedmem_core::{DomainError, Primitive};

/// Type identifier
pub const LOCK: &str = "lock";

/// Current lock grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockGrant {
    /// Owner holding the lock
    pub owner: String,
    /// Fencing version of this grant
    pub version: u64,
}

/// Lock state
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Lock {
    holder: Option<LockGrant>,
    last_version: u64,
}

/// Lock proposals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LockInput {
    /// Take the lock for `owner`
    Acquire {
        /// Requesting owner
        owner: String,
    },
    /// Release the lock held by `owner`
    Release {
        /// Releasing owner
        owner: String,
    },
}

/// Lock queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LockQuery {
    /// Read the current grant
    Get,
}

/// Result of every lock operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockStatus {
    /// Grant after the operation; `None` when unlocked
    pub holder: Option<LockGrant>,
}

impl Primitive for Lock {
    type Input = LockInput;
    type Output = LockStatus;
    type QueryInput = LockQuery;
    type QueryOutput = LockStatus;

    fn apply(&mut self, input: LockInput) -> Result<LockStatus, DomainError> {
        match input {
            LockInput::Acquire { owner } => {
                if let Some(grant) = &self.holder {
                    return Err(DomainError::conflict(format!(
                        "lock held by '{}'",
                        grant.owner
                    )));
                }
                self.last_version += 1;
                self.holder = Some(LockGrant {
                    owner,
                    version: self.last_version,
                });
                Ok(LockStatus {
                    holder: self.holder.clone(),
                })
            }
            LockInput::Release { owner } => match &self.holder {
                Some(grant) if grant.owner == owner => {
                    self.holder = None;
                    Ok(LockStatus { holder: None })
                }
                Some(grant) => Err(DomainError::conflict(format!(
                    "lock held by '{}', not '{}'",
                    grant.owner, owner
                ))),
                None => Err(DomainError::conflict("lock is not held")),
            },
        }
    }

    fn query(&self, input: LockQuery) -> Result<LockStatus, DomainError> {
        match input {
            LockQuery::Get => Ok(LockStatus {
                holder: self.holder.clone(),
            }),
        }
    }
}
