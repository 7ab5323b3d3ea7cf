//! Value primitive
//!
//! A single optional string value with a version that increases on every
//! successful write, including deletes.

use serde::{Deserialize, Serialize};
use sharedmem_core::{DomainError, Primitive};

/// Type identifier
pub const VALUE: &str = "value";

/// Value state
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AtomicValue {
    value: Option<String>,
    version: u64,
}

/// Value proposals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ValueInput {
    /// Store a value unconditionally
    Set {
        /// New value
        value: String,
    },
    /// Store a value if the current version matches
    Update {
        /// New value
        value: String,
        /// Required current version
        prev_version: u64,
    },
    /// Clear the value
    Delete {
        /// Required current version, if any
        #[serde(default)]
        prev_version: Option<u64>,
    },
}

/// Value queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ValueQuery {
    /// Read the value
    Get,
}

/// Result of every value operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedValue {
    /// Value after the operation (previous value for Delete)
    pub value: Option<String>,
    /// Version after the operation
    pub version: u64,
}

impl AtomicValue {
    fn check_version(&self, expected: u64) -> Result<(), DomainError> {
        if self.version != expected {
            return Err(DomainError::conflict(format!(
                "value is at version {}, expected {}",
                self.version, expected
            )));
        }
        Ok(())
    }
}

impl Primitive for AtomicValue {
    type Input = ValueInput;
    type Output = VersionedValue;
    type QueryInput = ValueQuery;
    type QueryOutput = VersionedValue;

    fn apply(&mut self, input: ValueInput) -> Result<VersionedValue, DomainError> {
        match input {
            ValueInput::Set { value } => {
                self.version += 1;
                self.value = Some(value);
            }
            ValueInput::Update {
                value,
                prev_version,
            } => {
                self.check_version(prev_version)?;
                self.version += 1;
                self.value = Some(value);
            }
            ValueInput::Delete { prev_version } => {
                if self.value.is_none() {
                    return Err(DomainError::not_found("value is not set"));
                }
                if let Some(expected) = prev_version {
                    self.check_version(expected)?;
                }
                self.version += 1;
                let previous = self.value.take();
                return Ok(VersionedValue {
                    value: previous,
                    version: self.version,
                });
            }
        }
        Ok(VersionedValue {
            value: self.value.clone(),
            version: self.version,
        })
    }

    fn query(&self, input: ValueQuery) -> Result<VersionedValue, DomainError> {
        match input {
            ValueQuery::Get => Ok(VersionedValue {
                value: self.value.clone(),
                version: self.version,
            }),
        }
    }
}
