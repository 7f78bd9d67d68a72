//! Snapshot configuration and option normalization.
//!
//! The original interface grew three generations of cycle-handling switches:
//! a boolean flag, a boolean legacy pair, and a string enumeration. All of
//! them are normalized into the single [`CircularReferences`] enum here, at
//! the boundary, before any traversal logic runs.

use std::str::FromStr;

use thiserror::Error;

use super::guard::SafeReducer;
use super::reducer::{Identity, KeyAllowlist, Reduce};

// =============================================================================
// CircularReferences - Cycle resolution modes
// =============================================================================

/// Policy for resolving a detected circular reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CircularReferences {
    /// Fail the traversal with
    /// [`SnapshotError::CircularReference`](super::error::SnapshotError::CircularReference).
    #[default]
    Error,
    /// Drop the offending key entirely.
    Remove,
    /// Substitute an empty map.
    Empty,
    /// Substitute a `{"__circular": true}` marker.
    Indicate,
}

/// Error returned when parsing an unrecognized mode name.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown circular reference mode: {0:?}")]
pub struct UnknownModeError(String);

impl FromStr for CircularReferences {
    type Err = UnknownModeError;

    /// Parses a mode name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "remove" => Ok(Self::Remove),
            "empty" => Ok(Self::Empty),
            "indicate" => Ok(Self::Indicate),
            _ => Err(UnknownModeError(s.to_owned())),
        }
    }
}

// =============================================================================
// Config - Snapshot options
// =============================================================================

/// Options for [`only_data_with`](crate::only_data_with).
///
/// The default configuration is an identity reducer with cycle protection in
/// [`CircularReferences::Error`] mode. Mode selection honors three levels of
/// precedence, mirroring the options the interface has accumulated:
///
/// 1. [`circular_references`](Self::circular_references) — explicit mode
/// 2. [`indicate_circular_warnings`](Self::indicate_circular_warnings) —
///    `true` selects [`Indicate`](CircularReferences::Indicate)
/// 3. [`error_on_circular_reference`](Self::error_on_circular_reference) —
///    `true` selects [`Error`](CircularReferences::Error), `false` selects
///    [`Empty`](CircularReferences::Empty)
#[derive(Default)]
pub struct Config {
    reducer: Option<Box<dyn Reduce>>,
    disable_circular_reference_protection: bool,
    error_on_circular_reference: Option<bool>,
    indicate_circular_warnings: bool,
    mode: Option<CircularReferences>,
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a default configuration with a custom inner reducer.
    #[must_use]
    pub fn with_reducer(reducer: impl Reduce + 'static) -> Self {
        Self::new().reducer(reducer)
    }

    /// Shorthand for a default configuration with a key allowlist.
    #[must_use]
    pub fn with_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self::new().allow_keys(keys)
    }

    /// Uses `reducer` as the inner reducer.
    #[must_use]
    pub fn reducer(mut self, reducer: impl Reduce + 'static) -> Self {
        self.reducer = Some(Box::new(reducer));
        self
    }

    /// Uses a [`KeyAllowlist`] over `keys` as the inner reducer.
    #[must_use]
    pub fn allow_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.reducer = Some(Box::new(KeyAllowlist::new(keys)));
        self
    }

    /// Skips the cycle guard entirely: the inner reducer runs with no
    /// ancestor tracking, and cyclic input will recurse until the call stack
    /// is exhausted. An explicit opt-in for callers that know their graphs
    /// are acyclic and want the guard's bookkeeping gone.
    #[must_use]
    pub fn disable_circular_reference_protection(mut self, disable: bool) -> Self {
        self.disable_circular_reference_protection = disable;
        self
    }

    /// Legacy switch: `true` selects [`CircularReferences::Error`], `false`
    /// selects [`CircularReferences::Empty`].
    #[must_use]
    pub fn error_on_circular_reference(mut self, error: bool) -> Self {
        self.error_on_circular_reference = Some(error);
        self
    }

    /// Legacy switch: `true` selects [`CircularReferences::Indicate`],
    /// overriding [`error_on_circular_reference`](Self::error_on_circular_reference).
    #[must_use]
    pub fn indicate_circular_warnings(mut self, indicate: bool) -> Self {
        self.indicate_circular_warnings = indicate;
        self
    }

    /// Explicit mode selection. Takes precedence over both legacy switches.
    #[must_use]
    pub fn circular_references(mut self, mode: CircularReferences) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Resolves the three generations of mode switches into one mode.
    fn resolve_mode(&self) -> CircularReferences {
        if let Some(mode) = self.mode {
            return mode;
        }

        if self.indicate_circular_warnings {
            return CircularReferences::Indicate;
        }

        match self.error_on_circular_reference {
            Some(false) => CircularReferences::Empty,
            Some(true) | None => CircularReferences::Error,
        }
    }

    /// Normalizes this configuration into the reducer the engine will run.
    pub(crate) fn into_reducer(self) -> Box<dyn Reduce> {
        if self.disable_circular_reference_protection {
            return self.reducer.unwrap_or_else(|| Box::new(Identity));
        }

        let mode = self.resolve_mode();
        Box::new(SafeReducer::new(self.reducer, mode))
    }
}

// =============================================================================
// Tests
// =============================================================================
