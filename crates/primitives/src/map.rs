//! Map primitive
//!
//! String keys to versioned string values. Every successful write draws a new
//! version from a per-instance counter, so versions are unique across keys
//! and can be used for optimistic concurrency (`prev_version`).

use serde::{Deserialize, Serialize};
use sharedmem_core::{DomainError, Primitive};
use std::collections::BTreeMap;

/// Type identifier
pub const MAP: &str = "map";

/// A stored value and the version of its last write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEntry {
    /// Entry key
    pub key: String,
    /// Stored value
    pub value: String,
    /// Version of the last write
    pub version: u64,
}

/// Map state
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Map {
    entries: BTreeMap<String, (String, u64)>,
    last_version: u64,
}

/// Map proposals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MapInput {
    /// Insert or overwrite
    Put {
        /// Entry key
        key: String,
        /// New value
        value: String,
        /// Required current version, if any
        #[serde(default)]
        prev_version: Option<u64>,
    },
    /// Insert only if the key is absent
    Insert {
        /// Entry key
        key: String,
        /// New value
        value: String,
    },
    /// Overwrite only if the key is present
    Update {
        /// Entry key
        key: String,
        /// New value
        value: String,
        /// Required current version, if any
        #[serde(default)]
        prev_version: Option<u64>,
    },
    /// Remove a key
    Remove {
        /// Entry key
        key: String,
        /// Required current version, if any
        #[serde(default)]
        prev_version: Option<u64>,
    },
    /// Remove every key
    Clear,
}

/// Map queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MapQuery {
    /// Read one key
    Get {
        /// Entry key
        key: String,
    },
    /// Check whether a key is present
    ContainsKey {
        /// Entry key
        key: String,
    },
    /// Number of keys
    Size,
    /// All entries in key order
    Entries,
}

/// Map results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapOutput {
    /// Entry written, read or removed
    Entry(MapEntry),
    /// Presence check
    Contains(bool),
    /// Number of keys
    Size(usize),
    /// Entries in key order
    Entries(Vec<MapEntry>),
    /// No result
    Empty,
}

impl Map {
    fn check_version(&self, key: &str, prev_version: Option<u64>) -> Result<(), DomainError> {
        let Some(expected) = prev_version else {
            return Ok(());
        };
        match self.entries.get(key) {
            Some((_, version)) if *version == expected => Ok(()),
            Some((_, version)) => Err(DomainError::conflict(format!(
                "key '{}' is at version {}, expected {}",
                key, version, expected
            ))),
            None => Err(DomainError::conflict(format!(
                "key '{}' is absent, expected version {}",
                key, expected
            ))),
        }
    }

    fn write(&mut self, key: String, value: String) -> MapOutput {
        self.last_version += 1;
        self.entries
            .insert(key.clone(), (value.clone(), self.last_version));
        MapOutput::Entry(MapEntry {
            key,
            value,
            version: self.last_version,
        })
    }

    fn not_found(key: &str) -> DomainError {
        DomainError::not_found(format!("key '{}'", key))
    }
}

impl Primitive for Map {
    type Input = MapInput;
    type Output = MapOutput;
    type QueryInput = MapQuery;
    type QueryOutput = MapOutput;

    fn apply(&mut self, input: MapInput) -> Result<MapOutput, DomainError> {
        match input {
            MapInput::Put {
                key,
                value,
                prev_version,
            } => {
                self.check_version(&key, prev_version)?;
                Ok(self.write(key, value))
            }
            MapInput::Insert { key, value } => {
                if self.entries.contains_key(&key) {
                    return Err(DomainError::already_exists(format!("key '{}'", key)));
                }
                Ok(self.write(key, value))
            }
            MapInput::Update {
                key,
                value,
                prev_version,
            } => {
                if !self.entries.contains_key(&key) {
                    return Err(Self::not_found(&key));
                }
                self.check_version(&key, prev_version)?;
                Ok(self.write(key, value))
            }
            MapInput::Remove { key, prev_version } => {
                if !self.entries.contains_key(&key) {
                    return Err(Self::not_found(&key));
                }
                self.check_version(&key, prev_version)?;
                match self.entries.remove(&key) {
                    Some((value, version)) => Ok(MapOutput::Entry(MapEntry {
                        key,
                        value,
                        version,
                    })),
                    None => Err(Self::not_found(&key)),
                }
            }
            MapInput::Clear => {
                self.entries.clear();
                Ok(MapOutput::Empty)
            }
        }
    }

    fn query(&self, input: MapQuery) -> Result<MapOutput, DomainError> {
        match input {
            MapQuery::Get { key } => match self.entries.get(&key) {
                Some((value, version)) => Ok(MapOutput::Entry(MapEntry {
                    key,
                    value: value.clone(),
                    version: *version,
                })),
                None => Err(Self::not_found(&key)),
            },
            MapQuery::ContainsKey { key } => Ok(MapOutput::Contains(self.entries.contains_key(&key))),
            MapQuery::Size => Ok(MapOutput::Size(self.entries.len())),
            MapQuery::Entries => Ok(MapOutput::Entries(
                self.entries
                    .iter()
                    .map(|(key, (value, version))| MapEntry {
                        key: key.clone(),
                        value: value.clone(),
                        version: *version,
                    })
                    .collect(),
            )),
        }
    }
}
