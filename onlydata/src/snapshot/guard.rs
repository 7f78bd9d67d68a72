//! Cycle detection for the reducer layer.
//!
//! This module provides:
//!
//! - [`CycleGuard`]: an ordered set of the ancestors currently open in a
//!   traversal, compared by node identity
//! - [`SafeReducer`]: a reducer wrapper that maintains a guard across the
//!   engine's `Begin`/`End` bracketing and resolves detected cycles per the
//!   configured [`CircularReferences`] mode
//! - [`CIRCULAR_KEY`]: the reserved key marking an indicated cycle
//!
//! Detection lives here rather than in the engine so that cycle protection is
//! opt-out: running the engine with a bare reducer skips ancestor tracking
//! entirely, trading stack-overflow safety on cyclic input for zero overhead.

use std::cell::RefCell;
use std::rc::Rc;

use crate::graph::{Node, NodeRef};

use super::error::SnapshotError;
use super::options::CircularReferences;
use super::reducer::{Reduce, Stage};

/// Reserved key identifying an indicated-cycle marker object.
pub const CIRCULAR_KEY: &str = "__circular";

/// The substitute emitted for a cycle under [`CircularReferences::Indicate`].
pub(crate) fn circular_marker() -> NodeRef {
    Node::map([(CIRCULAR_KEY, Node::bool(true))])
}

// =============================================================================
// CycleGuard - Open-ancestor tracking
// =============================================================================

/// Ordered record of the containers currently being visited.
///
/// Identities are raw `Rc` pointers; the guard never dereferences them, it
/// only compares. A guard belongs to exactly one traversal: it is constructed
/// fresh per top-level call and must never be shared across unrelated
/// traversals.
#[derive(Debug, Default)]
pub struct CycleGuard {
    open: Vec<*const RefCell<Node>>,
}

impl CycleGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `node` as an open ancestor.
    pub fn enter(&mut self, node: &NodeRef) {
        self.open.push(Rc::as_ptr(node));
    }

    /// Closes `node`, along with everything opened after it.
    ///
    /// Truncating past the matched identity assumes strictly LIFO nesting,
    /// which single-path recursion guarantees. Unknown identities are a no-op.
    pub fn exit(&mut self, node: &NodeRef) {
        let identity = Rc::as_ptr(node);
        if let Some(position) = self.open.iter().position(|open| *open == identity) {
            self.open.truncate(position);
        }
    }

    /// Whether `node` is one of the currently open ancestors.
    #[must_use]
    pub fn contains(&self, node: &NodeRef) -> bool {
        let identity = Rc::as_ptr(node);
        self.open.iter().any(|open| *open == identity)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }
}

// =============================================================================
// SafeReducer - Cycle-guarded reducer wrapper
// =============================================================================

/// Wraps a reducer with ancestor tracking and cycle resolution.
///
/// Per invocation: `Begin` opens the container in the guard and `End` closes
/// it; then any non-empty-keyed value that is itself an open ancestor is a
/// cycle, resolved per the configured mode instead of being delegated:
///
/// - [`Error`](CircularReferences::Error): the traversal fails with
///   [`SnapshotError::CircularReference`]
/// - [`Remove`](CircularReferences::Remove): the key is dropped
/// - [`Empty`](CircularReferences::Empty): a fresh empty map is substituted
/// - [`Indicate`](CircularReferences::Indicate): a fresh
///   `{"__circular": true}` marker is substituted
///
/// Everything else is delegated to the inner reducer, or passed through
/// unchanged when there is none.
pub struct SafeReducer {
    guard: CycleGuard,
    mode: CircularReferences,
    inner: Option<Box<dyn Reduce>>,
}

impl SafeReducer {
    /// Wraps `inner` (or a pass-through when `None`) with cycle protection.
    #[must_use]
    pub fn new(inner: Option<Box<dyn Reduce>>, mode: CircularReferences) -> Self {
        Self {
            guard: CycleGuard::new(),
            mode,
            inner,
        }
    }
}

impl Reduce for SafeReducer {
    fn reduce(
        &mut self,
        ctx: &NodeRef,
        key: &str,
        value: &NodeRef,
        stage: Stage,
    ) -> Result<Option<NodeRef>, SnapshotError> {
        match stage {
            Stage::Begin => self.guard.enter(ctx),
            Stage::End => self.guard.exit(ctx),
            Stage::Property => {}
        }

        if !key.is_empty() && self.guard.contains(value) {
            #[cfg(feature = "tracing")]
            tracing::debug!(key, mode = ?self.mode, "resolving circular reference");

            return match self.mode {
                CircularReferences::Error => Err(SnapshotError::CircularReference),
                CircularReferences::Remove => Ok(None),
                CircularReferences::Empty => Ok(Some(Node::Map(Vec::new()).into_ref())),
                CircularReferences::Indicate => Ok(Some(circular_marker())),
            };
        }

        match &mut self.inner {
            Some(inner) => inner.reduce(ctx, key, value, stage),
            None => Ok(Some(value.clone())),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_tracks_open_ancestors() {
        let outer = Node::Map(Vec::new()).into_ref();
        let inner = Node::Map(Vec::new()).into_ref();

        let mut guard = CycleGuard::new();
        guard.enter(&outer);
        guard.enter(&inner);

        assert!(guard.contains(&outer));
        assert!(guard.contains(&inner));
        assert_eq!(guard.depth(), 2);

        guard.exit(&inner);
        assert!(guard.contains(&outer));
        assert!(!guard.contains(&inner));
    }

    #[test]
    fn exit_truncates_everything_opened_after_the_match() {
        let a = Node::Map(Vec::new()).into_ref();
        let b = Node::Map(Vec::new()).into_ref();
        let c = Node::Map(Vec::new()).into_ref();

        let mut guard = CycleGuard::new();
        guard.enter(&a);
        guard.enter(&b);
        guard.enter(&c);

        guard.exit(&b);
        assert!(guard.contains(&a));
        assert!(!guard.contains(&b));
        assert!(!guard.contains(&c));
        assert_eq!(guard.depth(), 1);
    }

    #[test]
    fn exit_of_unknown_identity_is_a_no_op() {
        let a = Node::Map(Vec::new()).into_ref();
        let stranger = Node::Map(Vec::new()).into_ref();

        let mut guard = CycleGuard::new();
        guard.enter(&a);
        guard.exit(&stranger);

        assert_eq!(guard.depth(), 1);
        assert!(guard.contains(&a));
    }

    #[test]
    fn identity_is_pointer_equality_not_structure() {
        let a = Node::map([("name", Node::string("same"))]);
        let twin = Node::map([("name", Node::string("same"))]);

        let mut guard = CycleGuard::new();
        guard.enter(&a);
        assert!(!guard.contains(&twin));
    }

    #[test]
    fn safe_reducer_errors_on_ancestor_revisit() {
        let ctx = Node::Map(Vec::new()).into_ref();
        let mut reducer = SafeReducer::new(None, CircularReferences::Error);

        reducer.reduce(&ctx, "", &ctx, Stage::Begin).unwrap();
        let result = reducer.reduce(&ctx, "self", &ctx, Stage::Property);
        assert!(matches!(result, Err(SnapshotError::CircularReference)));
    }

    #[test]
    fn safe_reducer_substitutes_marker_in_indicate_mode() {
        let ctx = Node::Map(Vec::new()).into_ref();
        let mut reducer = SafeReducer::new(None, CircularReferences::Indicate);

        reducer.reduce(&ctx, "", &ctx, Stage::Begin).unwrap();
        let marker = reducer
            .reduce(&ctx, "self", &ctx, Stage::Property)
            .unwrap()
            .unwrap();

        match &*marker.borrow() {
            Node::Map(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].0, CIRCULAR_KEY);
            }
            other => panic!("expected marker map, got {other:?}"),
        }
    }

    #[test]
    fn safe_reducer_delegates_non_cycles_to_inner() {
        let ctx = Node::Map(Vec::new()).into_ref();
        let inner = |_ctx: &NodeRef, key: &str, value: &NodeRef, _stage: Stage| {
            if key == "hidden" { None } else { Some(value.clone()) }
        };
        let mut reducer = SafeReducer::new(Some(Box::new(inner)), CircularReferences::Error);

        let value = Node::int(1);
        reducer.reduce(&ctx, "", &ctx, Stage::Begin).unwrap();
        assert!(
            reducer
                .reduce(&ctx, "hidden", &value, Stage::Property)
                .unwrap()
                .is_none()
        );
        assert!(
            reducer
                .reduce(&ctx, "shown", &value, Stage::Property)
                .unwrap()
                .is_some()
        );
    }
}
