//! Snapshot traversal and entrypoints.
//!
//! This module provides the machinery for taking pure-data snapshots:
//!
//! - **`engine`**: The traversal engine (`convert`, `only_data`, `only_data_with`)
//! - **`reducer`**: The reducer protocol (`Reduce`, `Stage`, `Identity`, `KeyAllowlist`)
//! - **`guard`**: Cycle detection (`CycleGuard`, `SafeReducer`, `CIRCULAR_KEY`)
//! - **`options`**: Option normalization (`Config`, `CircularReferences`)
//! - **`error`**: Traversal errors (`SnapshotError`)
//!
//! The input graph model lives in `crate::graph`.

mod engine;
mod error;
mod guard;
mod options;
mod reducer;

// Re-export the traversal engine
pub use engine::{convert, only_data, only_data_with};
// Re-export traversal errors
pub use error::SnapshotError;
// Re-export cycle detection
pub use guard::{CIRCULAR_KEY, CycleGuard, SafeReducer};
// Re-export option handling
pub use options::{CircularReferences, Config, UnknownModeError};
// Re-export the reducer protocol
pub use reducer::{Identity, KeyAllowlist, Reduce, Stage};
