//! Protocol Comprehensive Test Suite
//!
//! End-to-end tests against a protocol built by `sharedmem::new_protocol`,
//! with every built-in primitive registered.
//!
//! ## Test Tiers
//!
//! - **Tier 1**: Construction and configuration
//! - **Tier 2**: Routing across partitions
//! - **Tier 3**: Ordering and visibility under concurrency
//! - **Tier 4**: Built-in primitives through the full request path
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test protocol_comprehensive
//! ```

// Test modules
mod test_utils;

// Tier 1: Construction
mod tier1_configuration;


// Tier 3: Ordering
mod tier3_ordering;

// Tier 4: Primitives
mod tier4_primitives;
