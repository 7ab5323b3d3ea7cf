//! Counter map primitive
//!
//! Named signed counters. A key that was never written behaves as zero for
//! arithmetic, but reads of it report NotFound.

use serde::{Deserialize, Serialize};
use sharedmem_core::{DomainError, Primitive};
use std::collections::BTreeMap;

/// Type identifier
pub const COUNTER_MAP: &str = "countermap";

/// Counter map state
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CounterMap {
    entries: BTreeMap<String, i64>,
}

fn default_delta() -> i64 {
    1
}

/// Counter map proposals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CounterMapInput {
    /// Overwrite a counter
    Set {
        /// Counter key
        key: String,
        /// New value
        value: i64,
    },
    /// Add `delta` (default 1) to a counter
    Increment {
        /// Counter key
        key: String,
        /// Amount to add
        #[serde(default = "default_delta")]
        delta: i64,
    },
    /// Subtract `delta` (default 1) from a counter
    Decrement {
        /// Counter key
        key: String,
        /// Amount to subtract
        #[serde(default = "default_delta")]
        delta: i64,
    },
    /// Remove a counter
    Remove {
        /// Counter key
        key: String,
    },
    /// Remove every counter
    Clear,
}

/// Counter map queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CounterMapQuery {
    /// Read one counter
    Get {
        /// Counter key
        key: String,
    },
    /// Number of counters
    Size,
    /// All counters in key order
    Entries,
}

/// Counter map results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterMapOutput {
    /// Value after a write, or the removed value
    Value(i64),
    /// Number of counters
    Size(usize),
    /// Counters in key order
    Entries(Vec<(String, i64)>),
    /// No result
    Empty,
}

impl CounterMap {
    fn add(&mut self, key: String, delta: i64) -> Result<CounterMapOutput, DomainError> {
        let current = self.entries.get(&key).copied().unwrap_or(0);
        let value = current
            .checked_add(delta)
            .ok_or_else(|| DomainError::invalid_argument(format!("counter '{}' overflow", key)))?;
        self.entries.insert(key, value);
        Ok(CounterMapOutput::Value(value))
    }
}

impl Primitive for CounterMap {
    type Input = CounterMapInput;
    type Output = CounterMapOutput;
    type QueryInput = CounterMapQuery;
    type QueryOutput = CounterMapOutput;

    fn apply(&mut self, input: CounterMapInput) -> Result<CounterMapOutput, DomainError> {
        match input {
            CounterMapInput::Set { key, value } => {
                self.entries.insert(key, value);
                Ok(CounterMapOutput::Value(value))
            }
            CounterMapInput::Increment { key, delta } => self.add(key, delta),
            CounterMapInput::Decrement { key, delta } => {
                let negated = delta
                    .checked_neg()
                    .ok_or_else(|| DomainError::invalid_argument("counter overflow"))?;
                self.add(key, negated)
            }
            CounterMapInput::Remove { key } => self
                .entries
                .remove(&key)
                .map(CounterMapOutput::Value)
                .ok_or_else(|| DomainError::not_found(format!("key '{}'", key))),
            CounterMapInput::Clear => {
                self.entries.clear();
                Ok(CounterMapOutput::Empty)
            }
        }
    }

    fn query(&self, input: CounterMapQuery) -> Result<CounterMapOutput, DomainError> {
        match input {
            CounterMapQuery::Get { key } => self
                .entries
                .get(&key)
                .map(|v| CounterMapOutput::Value(*v))
                .ok_or_else(|| DomainError::not_found(format!("key '{}'", key))),
            CounterMapQuery::Size => Ok(CounterMapOutput::Size(self.entries.len())),
            CounterMapQuery::Entries => Ok(CounterMapOutput::Entries(
                self.entries.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            )),
        }
    }
}
