//! Built-in primitives for sharedmem
//!
//! This crate implements the nine built-in primitive state machines:
//! - Counter: Single signed counter
//! - CounterMap: Named signed counters
//! - Election: Leader election with terms
//! - IndexedMap: Map addressable by insertion index
//! - Lock: Exclusive lock with fencing versions
//! - Map: Versioned key-value map
//! - MultiMap: Key to set of values
//! - Set: Ordered set of strings
//! - AtomicValue: Single versioned value
//!
//! Every primitive is deterministic: state lives in ordered collections and
//! nothing reads clocks or randomness. A failed operation leaves state
//! unchanged.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod counter;
pub mod countermap;
pub mod election;
pub mod indexedmap;
pub mod lock;
pub mod map;
pub mod multimap;
pub mod set;
pub mod value;

use sharedmem_core::{RegistryBuilder, Result};

// Re-exports
pub use counter::{Counter, COUNTER};
pub use countermap::{CounterMap, COUNTER_MAP};
pub use election::{Election, ELECTION};
pub use indexedmap::{IndexedMap, INDEXED_MAP};
pub use lock::{Lock, LOCK};
pub use map::{Map, MAP};
pub use multimap::{MultiMap, MULTI_MAP};
pub use set::{Set, SET};
pub use value::{AtomicValue, VALUE};

/// Register every built-in primitive
///
/// # Errors
///
/// `DuplicatePrimitiveType` if the builder already holds one of the built-in
/// type identifiers.
pub fn register_all(registry: &mut RegistryBuilder) -> Result<()> {
    registry
        .register_primitive::<Counter>(COUNTER)?
        .register_primitive::<CounterMap>(COUNTER_MAP)?
        .register_primitive::<Election>(ELECTION)?
        .register_primitive::<IndexedMap>(INDEXED_MAP)?
        .register_primitive::<Lock>(LOCK)?
        .register_primitive::<Map>(MAP)?
        .register_primitive::<MultiMap>(MULTI_MAP)?
        .register_primitive::<Set>(SET)?
        .register_primitive::<AtomicValue>(VALUE)?;
    Ok(())
}
