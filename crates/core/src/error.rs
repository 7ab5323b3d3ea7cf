//! Error taxonomy
//!
//! Two error types exist and they never mix:
//!
//! - [`Error`] is returned directly from a call. It covers configuration
//!   failures at construction, routing failures, and submission failures
//!   (the executor could not accept the call, so the operation's effect is
//!   absent).
//! - [`DomainError`] is a primitive's business outcome ("lock held", "key not
//!   found"). It is delivered as data on the output stream and never leaves
//!   state half-applied.

use crate::types::{PartitionId, PrimitiveType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for calls into the protocol
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid registry or protocol configuration; fatal at construction
    Configuration,
    /// Request names a partition or primitive type that does not exist
    Routing,
    /// Executor could not accept the call
    Submission,
}

/// Call-level error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The same primitive type was registered twice
    #[error("primitive type '{primitive_type}' is registered more than once")]
    DuplicatePrimitiveType {
        /// Type registered twice
        primitive_type: PrimitiveType,
    },

    /// No primitive type was registered
    #[error("no primitive types registered")]
    EmptyRegistry,

    /// Any other construction-time misconfiguration
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What is wrong
        reason: String,
    },

    /// The protocol does not own this partition
    #[error("partition {partition_id} not found")]
    PartitionNotFound {
        /// Requested partition
        partition_id: PartitionId,
    },

    /// The request names a type absent from the registry
    #[error("unknown primitive type '{primitive_type}'")]
    UnknownPrimitiveType {
        /// Requested type
        primitive_type: PrimitiveType,
    },

    /// The executor is closed
    #[error("executor for partition {partition_id} is closed")]
    Closed {
        /// Partition whose executor is closed
        partition_id: PartitionId,
    },

    /// The caller cancelled while waiting for the partition
    #[error("cancelled while waiting for partition {partition_id}")]
    Cancelled {
        /// Partition being waited on
        partition_id: PartitionId,
    },

    /// The caller's deadline passed while waiting for the partition
    #[error("deadline exceeded while waiting for partition {partition_id}")]
    DeadlineExceeded {
        /// Partition being waited on
        partition_id: PartitionId,
    },
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicatePrimitiveType { .. }
            | Error::EmptyRegistry
            | Error::InvalidConfiguration { .. } => ErrorKind::Configuration,
            Error::PartitionNotFound { .. } | Error::UnknownPrimitiveType { .. } => {
                ErrorKind::Routing
            }
            Error::Closed { .. } | Error::Cancelled { .. } | Error::DeadlineExceeded { .. } => {
                ErrorKind::Submission
            }
        }
    }

    /// True for configuration errors
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// True for routing errors
    pub fn is_routing(&self) -> bool {
        self.kind() == ErrorKind::Routing
    }

    /// True for submission errors
    pub fn is_submission(&self) -> bool {
        self.kind() == ErrorKind::Submission
    }
}

/// Primitive-specific business outcome
///
/// Carried on the output stream as the terminal failure of a call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DomainError {
    /// The addressed instance, key or member does not exist
    #[error("not found: {what}")]
    NotFound {
        /// What was missing
        what: String,
    },

    /// The key or member already exists
    #[error("already exists: {what}")]
    AlreadyExists {
        /// What already exists
        what: String,
    },

    /// Current state does not satisfy the operation's precondition
    #[error("conflict: {reason}")]
    Conflict {
        /// Why the precondition failed
        reason: String,
    },

    /// The operation or its arguments are invalid
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What is invalid
        reason: String,
    },

    /// The call ended without a result
    #[error("aborted: {reason}")]
    Aborted {
        /// Why the call ended
        reason: String,
    },
}

impl DomainError {
    /// Build a NotFound error
    pub fn not_found(what: impl Into<String>) -> Self {
        DomainError::NotFound { what: what.into() }
    }

    /// Build an AlreadyExists error
    pub fn already_exists(what: impl Into<String>) -> Self {
        DomainError::AlreadyExists { what: what.into() }
    }

    /// Build a Conflict error
    pub fn conflict(reason: impl Into<String>) -> Self {
        DomainError::Conflict {
            reason: reason.into(),
        }
    }

    /// Build an InvalidArgument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        DomainError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Build an Aborted error
    pub fn aborted(reason: impl Into<String>) -> Self {
        DomainError::Aborted {
            reason: reason.into(),
        }
    }

    /// True for NotFound
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }
}
