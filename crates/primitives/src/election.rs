//! Leader election primitive
//!
//! Candidates queue in order; the first candidate is the leader. Every change
//! of leader starts a new term. Terms never decrease.

use serde::{Deserialize, Serialize};
use sharedmem_core::{DomainError, Primitive};

/// Type identifier
pub const ELECTION: &str = "election";

/// Election state and result of every election operation
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Term number, incremented on every leader change
    pub term: u64,
    /// Current leader, if any
    pub leader: Option<String>,
    /// Candidates in priority order; the leader is first
    pub candidates: Vec<String>,
}

/// Election state
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Election {
    term: Term,
}

/// Election proposals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ElectionInput {
    /// Join the candidate queue; becomes leader if there is none
    Enter {
        /// Candidate id
        candidate: String,
    },
    /// Leave the candidate queue voluntarily
    Withdraw {
        /// Candidate id
        candidate: String,
    },
    /// Make an existing candidate the leader
    Anoint {
        /// Candidate id
        candidate: String,
    },
    /// Move an existing candidate one position up
    Promote {
        /// Candidate id
        candidate: String,
    },
    /// Remove a candidate on someone else's behalf
    Evict {
        /// Candidate id
        candidate: String,
    },
}

/// Election queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ElectionQuery {
    /// Read the current term
    GetTerm,
}

impl Election {
    fn position(&self, candidate: &str) -> Result<usize, DomainError> {
        self.term
            .candidates
            .iter()
            .position(|c| c == candidate)
            .ok_or_else(|| DomainError::not_found(format!("candidate '{}'", candidate)))
    }

    /// Recompute the leader from the head of the queue
    fn elect(&mut self) {
        let head = self.term.candidates.first().cloned();
        if head != self.term.leader {
            self.term.leader = head;
            self.term.term += 1;
        }
    }

    fn remove(&mut self, candidate: &str) -> Result<Term, DomainError> {
        let index = self.position(candidate)?;
        self.term.candidates.remove(index);
        self.elect();
        Ok(self.term.clone())
    }
}

impl Primitive for Election {
    type Input = ElectionInput;
    type Output = Term;
    type QueryInput = ElectionQuery;
    type QueryOutput = Term;

    fn apply(&mut self, input: ElectionInput) -> Result<Term, DomainError> {
        match input {
            ElectionInput::Enter { candidate } => {
                if !self.term.candidates.contains(&candidate) {
                    self.term.candidates.push(candidate);
                    self.elect();
                }
                Ok(self.term.clone())
            }
            ElectionInput::Withdraw { candidate } | ElectionInput::Evict { candidate } => {
                self.remove(&candidate)
            }
            ElectionInput::Anoint { candidate } => {
                let index = self.position(&candidate)?;
                let anointed = self.term.candidates.remove(index);
                self.term.candidates.insert(0, anointed);
                self.elect();
                Ok(self.term.clone())
            }
            ElectionInput::Promote { candidate } => {
                let index = self.position(&candidate)?;
                if index > 0 {
                    self.term.candidates.swap(index - 1, index);
                    self.elect();
                }
                Ok(self.term.clone())
            }
        }
    }

    fn query(&self, input: ElectionQuery) -> Result<Term, DomainError> {
        match input {
            ElectionQuery::GetTerm => Ok(self.term.clone()),
        }
    }
}
