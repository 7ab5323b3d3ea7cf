//! Indexed map primitive
//!
//! A map whose entries are also addressable by insertion index. Indexes are
//! assigned from a monotonically increasing counter and are never reused,
//! even after removal or clear.

use serde::{Deserialize, Serialize};
use sharedmem_core::{DomainError, Primitive};
use std::collections::BTreeMap;
use std::ops::Bound;

/// Type identifier
pub const INDEXED_MAP: &str = "indexedmap";

/// One entry of an indexed map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedEntry {
    /// Insertion index
    pub index: u64,
    /// Entry key
    pub key: String,
    /// Entry value
    pub value: String,
    /// Version of the last write to this entry
    pub version: u64,
}

/// Indexed map state
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexedMap {
    entries: BTreeMap<u64, IndexedEntry>,
    keys: BTreeMap<String, u64>,
    last_index: u64,
    last_version: u64,
}

/// Indexed map proposals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum IndexedMapInput {
    /// Add a new key at the next index
    Append {
        /// Entry key
        key: String,
        /// Entry value
        value: String,
    },
    /// Replace the value of an existing key
    Update {
        /// Entry key
        key: String,
        /// New value
        value: String,
        /// Required current version, if any
        #[serde(default)]
        prev_version: Option<u64>,
    },
    /// Remove an existing key
    Remove {
        /// Entry key
        key: String,
        /// Required current version, if any
        #[serde(default)]
        prev_version: Option<u64>,
    },
    /// Remove every entry
    Clear,
}

/// Indexed map queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum IndexedMapQuery {
    /// Entry by key
    Get {
        /// Entry key
        key: String,
    },
    /// Entry by index
    GetIndex {
        /// Entry index
        index: u64,
    },
    /// Entry with the lowest index
    First,
    /// Entry with the highest index
    Last,
    /// First entry after `index`
    Next {
        /// Exclusive lower bound
        index: u64,
    },
    /// Last entry before `index`
    Prev {
        /// Exclusive upper bound
        index: u64,
    },
    /// Number of entries
    Size,
    /// All entries in index order
    Entries,
}

/// Indexed map results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexedMapOutput {
    /// A single entry (new, updated or removed)
    Entry(IndexedEntry),
    /// Number of entries
    Size(usize),
    /// Entries in index order
    Entries(Vec<IndexedEntry>),
    /// No result
    Empty,
}

impl IndexedMap {
    fn existing(&self, key: &str, prev_version: Option<u64>) -> Result<u64, DomainError> {
        let index = *self
            .keys
            .get(key)
            .ok_or_else(|| DomainError::not_found(format!("key '{}'", key)))?;
        if let (Some(expected), Some(entry)) = (prev_version, self.entries.get(&index)) {
            if entry.version != expected {
                return Err(DomainError::conflict(format!(
                    "key '{}' is at version {}, expected {}",
                    key, entry.version, expected
                )));
            }
        }
        Ok(index)
    }

    fn entry(found: Option<&IndexedEntry>, what: String) -> Result<IndexedMapOutput, DomainError> {
        found
            .cloned()
            .map(IndexedMapOutput::Entry)
            .ok_or_else(|| DomainError::not_found(what))
    }
}

impl Primitive for IndexedMap {
    type Input = IndexedMapInput;
    type Output = IndexedMapOutput;
    type QueryInput = IndexedMapQuery;
    type QueryOutput = IndexedMapOutput;

    fn apply(&mut self, input: IndexedMapInput) -> Result<IndexedMapOutput, DomainError> {
        match input {
            IndexedMapInput::Append { key, value } => {
                if self.keys.contains_key(&key) {
                    return Err(DomainError::already_exists(format!("key '{}'", key)));
                }
                self.last_index += 1;
                self.last_version += 1;
                let entry = IndexedEntry {
                    index: self.last_index,
                    key: key.clone(),
                    value,
                    version: self.last_version,
                };
                self.keys.insert(key, entry.index);
                self.entries.insert(entry.index, entry.clone());
                Ok(IndexedMapOutput::Entry(entry))
            }
            IndexedMapInput::Update {
                key,
                value,
                prev_version,
            } => {
                let index = self.existing(&key, prev_version)?;
                let version = self.last_version + 1;
                match self.entries.get_mut(&index) {
                    Some(entry) => {
                        self.last_version = version;
                        entry.value = value;
                        entry.version = version;
                        Ok(IndexedMapOutput::Entry(entry.clone()))
                    }
                    None => Err(DomainError::not_found(format!("index {}", index))),
                }
            }
            IndexedMapInput::Remove { key, prev_version } => {
                let index = self.existing(&key, prev_version)?;
                match self.entries.remove(&index) {
                    Some(entry) => {
                        self.keys.remove(&key);
                        Ok(IndexedMapOutput::Entry(entry))
                    }
                    None => Err(DomainError::not_found(format!("index {}", index))),
                }
            }
            IndexedMapInput::Clear => {
                self.entries.clear();
                self.keys.clear();
                Ok(IndexedMapOutput::Empty)
            }
        }
    }

    fn query(&self, input: IndexedMapQuery) -> Result<IndexedMapOutput, DomainError> {
        match input {
            IndexedMapQuery::Get { key } => Self::entry(
                self.keys.get(&key).and_then(|i| self.entries.get(i)),
                format!("key '{}'", key),
            ),
            IndexedMapQuery::GetIndex { index } => {
                Self::entry(self.entries.get(&index), format!("index {}", index))
            }
            IndexedMapQuery::First => {
                Self::entry(self.entries.values().next(), "first entry".to_string())
            }
            IndexedMapQuery::Last => {
                Self::entry(self.entries.values().next_back(), "last entry".to_string())
            }
            IndexedMapQuery::Next { index } => Self::entry(
                self.entries
                    .range((Bound::Excluded(index), Bound::Unbounded))
                    .map(|(_, e)| e)
                    .next(),
                format!("entry after index {}", index),
            ),
            IndexedMapQuery::Prev { index } => Self::entry(
                self.entries.range(..index).map(|(_, e)| e).next_back(),
                format!("entry before index {}", index),
            ),
            IndexedMapQuery::Size => Ok(IndexedMapOutput::Size(self.entries.len())),
            IndexedMapQuery::Entries => Ok(IndexedMapOutput::Entries(
                self.entries.values().cloned().collect(),
            )),
        }
    }
}
