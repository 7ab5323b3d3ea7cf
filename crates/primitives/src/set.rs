//! Set primitive

use serde::{Deserialize, Serialize};
use sharedmem_core::{DomainError, Primitive};
use std::collections::BTreeSet;

/// Type identifier
pub const SET: &str = "set";

/// Set state
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Set {
    elements: BTreeSet<String>,
}

/// Set proposals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SetInput {
    /// Add an element; fails if present
    Add {
        /// Element to add
        element: String,
    },
    /// Remove an element; fails if absent
    Remove {
        /// Element to remove
        element: String,
    },
    /// Remove every element
    Clear,
}

/// Set queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SetQuery {
    /// Membership check
    Contains {
        /// Element to look for
        element: String,
    },
    /// Number of elements
    Size,
    /// All elements in sorted order
    Elements,
}

/// Set results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOutput {
    /// Membership check
    Contains(bool),
    /// Number of elements
    Size(usize),
    /// Elements in sorted order
    Elements(Vec<String>),
    /// No result
    Empty,
}

impl Primitive for Set {
    type Input = SetInput;
    type Output = SetOutput;
    type QueryInput = SetQuery;
    type QueryOutput = SetOutput;

    fn apply(&mut self, input: SetInput) -> Result<SetOutput, DomainError> {
        match input {
            SetInput::Add { element } => {
                if self.elements.contains(&element) {
                    return Err(DomainError::already_exists(format!("element '{}'", element)));
                }
                self.elements.insert(element);
                Ok(SetOutput::Empty)
            }
            SetInput::Remove { element } => {
                if !self.elements.remove(&element) {
                    return Err(DomainError::not_found(format!("element '{}'", element)));
                }
                Ok(SetOutput::Empty)
            }
            SetInput::Clear => {
                self.elements.clear();
                Ok(SetOutput::Empty)
            }
        }
    }

    fn query(&self, input: SetQuery) -> Result<SetOutput, DomainError> {
        match input {
            SetQuery::Contains { element } => Ok(SetOutput::Contains(self.elements.contains(&element))),
            SetQuery::Size => Ok(SetOutput::Size(self.elements.len())),
            SetQuery::Elements => Ok(SetOutput::Elements(self.elements.iter().cloned().collect())),
        }
    }
}
