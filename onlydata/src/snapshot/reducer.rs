//! The reducer protocol.
//!
//! A reducer is the pluggable decision function the traversal engine consults
//! at every object boundary and every property:
//!
//! - [`Stage`]: where in an object's lifecycle the call happens
//! - [`Reduce`]: the protocol itself
//! - [`Identity`]: passes every value through
//! - [`KeyAllowlist`]: keeps only listed keys
//!
//! Cycle detection is layered *on top of* this protocol by
//! [`SafeReducer`](super::guard::SafeReducer), not built into the engine, so
//! callers can run a bare reducer with no ancestor tracking at all.

use crate::graph::NodeRef;

use super::error::SnapshotError;

// =============================================================================
// Stage - Object lifecycle position
// =============================================================================

/// Position of a reducer invocation within an object's traversal.
///
/// Each map is bracketed by exactly one `Begin` and one `End` call (both with
/// an empty key), with one `Property` call per own key in between.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// The engine is about to iterate this map's properties.
    Begin,
    /// An individual key/value pair is being visited.
    Property,
    /// The engine has finished this map.
    End,
}

// =============================================================================
// Reduce - The reducer protocol
// =============================================================================

/// Decides which keys and values survive a traversal.
///
/// The engine calls [`reduce`] with the *current container* `ctx` passed
/// explicitly, the property `key` (empty for [`Stage::Begin`] and
/// [`Stage::End`], where `value` is the container itself), and the candidate
/// `value`. The return contract:
///
/// - `Ok(Some(node))` — keep the value (possibly a replacement node; the
///   engine recurses into whatever is returned)
/// - `Ok(None)` — drop the key; from `Begin`, skip the entire object body
///   (the `End` call still happens, so stateful reducers stay balanced)
/// - `Err(_)` — abort the traversal; the error unwinds to the caller
///
/// Infallible closures of shape
/// `FnMut(&NodeRef, &str, &NodeRef, Stage) -> Option<NodeRef>` implement this
/// trait via a blanket impl. Implement the trait directly when a reducer
/// needs to fail.
pub trait Reduce {
    /// Decides the fate of `value` at `key` inside `ctx`.
    fn reduce(
        &mut self,
        ctx: &NodeRef,
        key: &str,
        value: &NodeRef,
        stage: Stage,
    ) -> Result<Option<NodeRef>, SnapshotError>;
}

impl<F> Reduce for F
where
    F: FnMut(&NodeRef, &str, &NodeRef, Stage) -> Option<NodeRef>,
{
    fn reduce(
        &mut self,
        ctx: &NodeRef,
        key: &str,
        value: &NodeRef,
        stage: Stage,
    ) -> Result<Option<NodeRef>, SnapshotError> {
        Ok(self(ctx, key, value, stage))
    }
}

// =============================================================================
// Identity - Pass-through reducer
// =============================================================================

/// Reducer that keeps every key and value unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Reduce for Identity {
    fn reduce(
        &mut self,
        _ctx: &NodeRef,
        _key: &str,
        value: &NodeRef,
        _stage: Stage,
    ) -> Result<Option<NodeRef>, SnapshotError> {
        Ok(Some(value.clone()))
    }
}

// =============================================================================
// KeyAllowlist - Keep only listed keys
// =============================================================================

/// Reducer that drops any property whose key is not in the allowlist.
///
/// Object-level `Begin`/`End` calls (empty key) always pass through, so
/// nested maps are still entered; the filter applies at every depth.
#[derive(Clone, Debug)]
pub struct KeyAllowlist {
    keys: Vec<String>,
}

impl KeyAllowlist {
    /// Builds an allowlist from any collection of key names.
    #[must_use]
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl Reduce for KeyAllowlist {
    fn reduce(
        &mut self,
        _ctx: &NodeRef,
        key: &str,
        value: &NodeRef,
        _stage: Stage,
    ) -> Result<Option<NodeRef>, SnapshotError> {
        if !key.is_empty() && !self.keys.iter().any(|allowed| allowed == key) {
            return Ok(None);
        }

        Ok(Some(value.clone()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::graph::Node;

    use super::*;

    #[test]
    fn identity_passes_values_through() {
        let ctx = Node::Map(Vec::new()).into_ref();
        let value = Node::int(42);
        let kept = Identity
            .reduce(&ctx, "answer", &value, Stage::Property)
            .unwrap()
            .unwrap();
        assert!(std::rc::Rc::ptr_eq(&kept, &value));
    }

    #[test]
    fn allowlist_drops_unlisted_keys() {
        let mut reducer = KeyAllowlist::new(["name", "value"]);
        let ctx = Node::Map(Vec::new()).into_ref();
        let value = Node::int(1);

        assert!(
            reducer
                .reduce(&ctx, "name", &value, Stage::Property)
                .unwrap()
                .is_some()
        );
        assert!(
            reducer
                .reduce(&ctx, "secret", &value, Stage::Property)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn allowlist_passes_object_level_calls() {
        let mut reducer = KeyAllowlist::new(["name"]);
        let ctx = Node::Map(Vec::new()).into_ref();

        assert!(
            reducer
                .reduce(&ctx, "", &ctx, Stage::Begin)
                .unwrap()
                .is_some()
        );
        assert!(
            reducer
                .reduce(&ctx, "", &ctx, Stage::End)
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn closures_implement_reduce() {
        let mut reducer = |_ctx: &NodeRef, key: &str, value: &NodeRef, _stage: Stage| {
            if key == "dropped" { None } else { Some(value.clone()) }
        };
        let ctx = Node::Map(Vec::new()).into_ref();
        let value = Node::int(1);

        assert!(
            Reduce::reduce(&mut reducer, &ctx, "kept", &value, Stage::Property)
                .unwrap()
                .is_some()
        );
        assert!(
            Reduce::reduce(&mut reducer, &ctx, "dropped", &value, Stage::Property)
                .unwrap()
                .is_none()
        );
    }
}
