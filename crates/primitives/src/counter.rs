//! Counter primitive
//!
//! A single signed 64-bit value. Arithmetic is checked: an operation that
//! would overflow is rejected and the value is left unchanged.

use serde::{Deserialize, Serialize};
use sharedmem_core::{DomainError, Primitive};

/// Type identifier
pub const COUNTER: &str = "counter";

/// Counter state
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Counter {
    value: i64,
}

fn default_delta() -> i64 {
    1
}

/// Counter proposals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CounterInput {
    /// Overwrite the value
    Set {
        /// New value
        value: i64,
    },
    /// Add `delta` (default 1)
    Increment {
        /// Amount to add
        #[serde(default = "default_delta")]
        delta: i64,
    },
    /// Subtract `delta` (default 1)
    Decrement {
        /// Amount to subtract
        #[serde(default = "default_delta")]
        delta: i64,
    },
    /// Set to `update` only if the value equals `expect`
    CompareAndSet {
        /// Required current value
        expect: i64,
        /// Value to store
        update: i64,
    },
}

/// Counter queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CounterQuery {
    /// Read the value
    Get,
}

/// Result of every counter operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterValue {
    /// Value after the operation
    pub value: i64,
}

impl Counter {
    fn add(&mut self, delta: i64) -> Result<CounterValue, DomainError> {
        let value = self
            .value
            .checked_add(delta)
            .ok_or_else(|| DomainError::invalid_argument("counter overflow"))?;
        self.value = value;
        Ok(CounterValue { value })
    }
}

impl Primitive for Counter {
    type Input = CounterInput;
    type Output = CounterValue;
    type QueryInput = CounterQuery;
    type QueryOutput = CounterValue;

    fn apply(&mut self, input: CounterInput) -> Result<CounterValue, DomainError> {
        match input {
            CounterInput::Set { value } => {
                self.value = value;
                Ok(CounterValue { value })
            }
            CounterInput::Increment { delta } => self.add(delta),
            CounterInput::Decrement { delta } => {
                let negated = delta
                    .checked_neg()
                    .ok_or_else(|| DomainError::invalid_argument("counter overflow"))?;
                self.add(negated)
            }
            CounterInput::CompareAndSet { expect, update } => {
                if self.value != expect {
                    return Err(DomainError::conflict(format!(
                        "expected {}, found {}",
                        expect, self.value
                    )));
                }
                self.value = update;
                Ok(CounterValue { value: update })
            }
        }
    }

    fn query(&self, input: CounterQuery) -> Result<CounterValue, DomainError> {
        match input {
            CounterQuery::Get => Ok(CounterValue { value: self.value }),
        }
    }
}
