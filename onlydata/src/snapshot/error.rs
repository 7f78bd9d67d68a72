//! Traversal errors.

use thiserror::Error;

/// Error raised while taking a snapshot.
///
/// The only failure mode is a detected cycle under
/// [`CircularReferences::Error`](crate::CircularReferences::Error); every
/// other irregular input is absorbed into the data model instead of raised.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// A value under traversal is one of its own open ancestors.
    #[error("circular reference detected")]
    CircularReference,
}
