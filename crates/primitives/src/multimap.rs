//! Multimap primitive
//!
//! Each key holds a set of distinct values. A key with no values does not
//! exist.

use serde::{Deserialize, Serialize};
use sharedmem_core::{DomainError, Primitive};
use std::collections::{BTreeMap, BTreeSet};

/// Type identifier
pub const MULTI_MAP: &str = "multimap";

/// Multimap state
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MultiMap {
    entries: BTreeMap<String, BTreeSet<String>>,
}

/// Multimap proposals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MultiMapInput {
    /// Add one value under a key
    Put {
        /// Entry key
        key: String,
        /// Value to add
        value: String,
    },
    /// Add several values under a key; fails if none are new
    PutAll {
        /// Entry key
        key: String,
        /// Values to add
        values: Vec<String>,
    },
    /// Remove one value from a key
    Remove {
        /// Entry key
        key: String,
        /// Value to remove
        value: String,
    },
    /// Remove a key and all of its values
    RemoveAll {
        /// Entry key
        key: String,
    },
    /// Remove everything
    Clear,
}

/// Multimap queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MultiMapQuery {
    /// Values under a key (empty if absent)
    Get {
        /// Entry key
        key: String,
    },
    /// Check whether a key holds a value
    ContainsEntry {
        /// Entry key
        key: String,
        /// Value to look for
        value: String,
    },
    /// Total number of (key, value) pairs
    Size,
}

/// Multimap results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiMapOutput {
    /// Values in sorted order
    Values(Vec<String>),
    /// Presence check
    Contains(bool),
    /// Number of pairs
    Size(usize),
    /// No result
    Empty,
}

impl Primitive for MultiMap {
    type Input = MultiMapInput;
    type Output = MultiMapOutput;
    type QueryInput = MultiMapQuery;
    type QueryOutput = MultiMapOutput;

    fn apply(&mut self, input: MultiMapInput) -> Result<MultiMapOutput, DomainError> {
        match input {
            MultiMapInput::Put { key, value } => {
                if self
                    .entries
                    .get(&key)
                    .is_some_and(|values| values.contains(&value))
                {
                    return Err(DomainError::already_exists(format!(
                        "entry '{}' -> '{}'",
                        key, value
                    )));
                }
                self.entries.entry(key).or_default().insert(value);
                Ok(MultiMapOutput::Empty)
            }
            MultiMapInput::PutAll { key, values } => {
                let existing = self.entries.get(&key);
                let added: BTreeSet<String> = values
                    .into_iter()
                    .filter(|v| !existing.is_some_and(|e| e.contains(v)))
                    .collect();
                if added.is_empty() {
                    return Err(DomainError::already_exists(format!(
                        "all values under '{}'",
                        key
                    )));
                }
                let result = MultiMapOutput::Values(added.iter().cloned().collect());
                self.entries.entry(key).or_default().extend(added);
                Ok(result)
            }
            MultiMapInput::Remove { key, value } => {
                let values = self
                    .entries
                    .get_mut(&key)
                    .filter(|values| values.contains(&value))
                    .ok_or_else(|| {
                        DomainError::not_found(format!("entry '{}' -> '{}'", key, value))
                    })?;
                values.remove(&value);
                if values.is_empty() {
                    self.entries.remove(&key);
                }
                Ok(MultiMapOutput::Empty)
            }
            MultiMapInput::RemoveAll { key } => self
                .entries
                .remove(&key)
                .map(|values| MultiMapOutput::Values(values.into_iter().collect()))
                .ok_or_else(|| DomainError::not_found(format!("key '{}'", key))),
            MultiMapInput::Clear => {
                self.entries.clear();
                Ok(MultiMapOutput::Empty)
            }
        }
    }

    fn query(&self, input: MultiMapQuery) -> Result<MultiMapOutput, DomainError> {
        match input {
            MultiMapQuery::Get { key } => Ok(MultiMapOutput::Values(
                self.entries
                    .get(&key)
                    .map(|values| values.iter().cloned().collect())
                    .unwrap_or_default(),
            )),
            MultiMapQuery::ContainsEntry { key, value } => Ok(MultiMapOutput::Contains(
                self.entries
                    .get(&key)
                    .is_some_and(|values| values.contains(&value)),
            )),
            MultiMapQuery::Size => Ok(MultiMapOutput::Size(
                self.entries.values().map(BTreeSet::len).sum(),
            )),
        }
    }
}
