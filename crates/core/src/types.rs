//! Identifiers and request/response messages
//!
//! This module defines the routing vocabulary shared by every layer:
//! - PartitionId: Stable identity of one partition
//! - PrimitiveType: Identifier a primitive state machine is registered under
//! - PrimitiveId: (type, instance name) pair addressed by a request
//! - Proposal / Query: Mutating and read-only requests
//! - ProposalOutput / QueryOutput: Responses written to an output stream

use crate::payload::Payload;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of one partition
///
/// Partition IDs are small positive integers fixed when the protocol is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionId(pub u32);

impl PartitionId {
    /// Wrap a raw partition number
    pub const fn new(id: u32) -> Self {
        PartitionId(id)
    }

    /// Raw partition number
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for PartitionId {
    fn from(id: u32) -> Self {
        PartitionId(id)
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier a primitive state machine is registered under (e.g. `"counter"`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimitiveType(String);

impl PrimitiveType {
    /// Create a primitive type identifier
    pub fn new(name: impl Into<String>) -> Self {
        PrimitiveType(name.into())
    }

    /// Identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PrimitiveType {
    fn from(name: &str) -> Self {
        PrimitiveType(name.to_string())
    }
}

impl From<String> for PrimitiveType {
    fn from(name: String) -> Self {
        PrimitiveType(name)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A primitive instance: its type plus a caller-chosen name
///
/// Two instances with the same name but different types are unrelated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrimitiveId {
    /// Registered type of the instance
    pub primitive_type: PrimitiveType,
    /// Instance name, unique within its type
    pub name: String,
}

impl PrimitiveId {
    /// Create a primitive instance identifier
    pub fn new(primitive_type: impl Into<PrimitiveType>, name: impl Into<String>) -> Self {
        PrimitiveId {
            primitive_type: primitive_type.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.primitive_type, self.name)
    }
}

/// Mutating request routed to one primitive instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// Target instance
    pub primitive: PrimitiveId,
    /// Primitive-specific operation
    pub payload: Payload,
}

impl Proposal {
    /// Create a proposal for `primitive` carrying `payload`
    pub fn new(primitive: PrimitiveId, payload: impl Into<Payload>) -> Self {
        Proposal {
            primitive,
            payload: payload.into(),
        }
    }
}

/// Read-only request routed to one primitive instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Target instance
    pub primitive: PrimitiveId,
    /// Primitive-specific operation
    pub payload: Payload,
}

impl Query {
    /// Create a query for `primitive` carrying `payload`
    pub fn new(primitive: PrimitiveId, payload: impl Into<Payload>) -> Self {
        Query {
            primitive,
            payload: payload.into(),
        }
    }
}

/// Response to an applied proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalOutput {
    /// Acceptance index of the proposal within its partition
    pub index: u64,
    /// Primitive-specific result
    pub payload: Payload,
}

/// Response to an evaluated query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOutput {
    /// Index of the last proposal applied when the query ran
    pub index: u64,
    /// Primitive-specific result
    pub payload: Payload,
}
