//! Operation payloads
//!
//! Proposals, queries and their outputs carry an opaque JSON document.
//! The executor never inspects it; each primitive decodes it into its own
//! typed operation enum.

use crate::error::DomainError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// JSON payload of a request or response
///
/// Newtype around serde_json::Value providing:
/// - Typed encode/decode through serde
/// - Decode failures reported as [`DomainError::InvalidArgument`]
/// - Read access to the underlying document via Deref
///
/// # Examples
///
/// ```
/// use sharedmem_core::Payload;
/// use serde_json::json;
///
/// let payload = Payload::from(json!({"op": "increment", "delta": 2}));
/// assert_eq!(payload["delta"], 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(serde_json::Value);

impl Payload {
    /// Create a null payload
    pub fn null() -> Self {
        Payload(serde_json::Value::Null)
    }

    /// Encode a typed value
    ///
    /// Encoding only fails for types serde_json cannot represent
    /// (e.g. maps with non-string keys).
    pub fn encode<T: Serialize>(value: &T) -> Result<Self, DomainError> {
        serde_json::to_value(value)
            .map(Payload)
            .map_err(|e| DomainError::invalid_argument(format!("cannot encode payload: {}", e)))
    }

    /// Decode into a typed value
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DomainError> {
        T::deserialize(&self.0)
            .map_err(|e| DomainError::invalid_argument(format!("malformed payload: {}", e)))
    }

    /// Get the underlying serde_json::Value
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }

    /// Get a reference to the underlying serde_json::Value
    pub fn as_inner(&self) -> &serde_json::Value {
        &self.0
    }
}

impl Deref for Payload {
    type Target = serde_json::Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::null()
    }
}

impl From<serde_json::Value> for Payload {
    fn from(v: serde_json::Value) -> Self {
        Payload(v)
    }
}

impl From<Payload> for serde_json::Value {
    fn from(v: Payload) -> Self {
        v.0
    }
}
