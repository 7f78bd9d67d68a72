//! The input object graph.
//!
//! This module defines the value model that snapshots are taken *from*:
//!
//! - [`Node`] / [`NodeRef`]: a dynamically-typed graph node behind
//!   `Rc<RefCell<_>>`, so that nodes can be shared and can reference their
//!   own ancestors (cycles are constructible on purpose)
//! - [`GraphExt`]: convenience methods for building and mutating graphs
//! - [`DataView`]: the self-describing capability
//! - [`from_json`]: builds an acyclic graph from a `serde_json::Value`
//!
//! Snapshots themselves are plain `serde_json::Value` trees; by construction
//! they cannot contain cycles or non-data payloads.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::{Number, Value as JsonValue};

// =============================================================================
// NodeRef - Shared handle to a graph node
// =============================================================================

/// Shared, mutable handle to a graph node.
///
/// Identity (`Rc::ptr_eq`) is what cycle detection compares; two structurally
/// equal nodes are still distinct ancestors.
pub type NodeRef = Rc<RefCell<Node>>;

// =============================================================================
// DataView - Self-describing values
// =============================================================================

/// A value that supplies its own pure-data representation.
///
/// When the traversal engine meets a [`Node::View`] it calls [`data_view`]
/// and uses the result verbatim: the returned value is not passed through the
/// active reducer and is not recursed into. Implementors are trusted to
/// produce data that is already safe to emit.
///
/// Use `#[derive(DataView)]` for named-field structs whose fields implement
/// `serde::Serialize`.
///
/// [`data_view`]: DataView::data_view
pub trait DataView {
    /// Returns the pure-data representation of `self`.
    #[must_use]
    fn data_view(&self) -> JsonValue;
}

// =============================================================================
// Node - The graph value model
// =============================================================================

/// A single node in the input graph.
///
/// Variants split into three groups: values that are *excluded* from
/// snapshots (`Undefined`, `Opaque`), terminal primitives that pass through
/// unchanged, and containers that are walked recursively.
pub enum Node {
    /// An explicitly absent value. Excluded from snapshots.
    Undefined,
    /// A non-data payload (callback, handle, or similar). The tag is purely
    /// diagnostic. Excluded from snapshots.
    Opaque(String),
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Ordered sequence, recursed element-wise.
    Seq(Vec<NodeRef>),
    /// Keyed mapping. Entries keep insertion order; [`GraphExt::insert`]
    /// replaces an existing key in place.
    Map(Vec<(String, NodeRef)>),
    /// Self-describing value, delegated to via [`DataView`].
    View(Rc<dyn DataView>),
}

impl Node {
    /// Wraps this node in a shared handle.
    #[must_use]
    pub fn into_ref(self) -> NodeRef {
        Rc::new(RefCell::new(self))
    }

    /// An explicitly absent value.
    #[must_use]
    pub fn undefined() -> NodeRef {
        Self::Undefined.into_ref()
    }

    /// A non-data payload with a diagnostic tag.
    #[must_use]
    pub fn opaque(tag: impl Into<String>) -> NodeRef {
        Self::Opaque(tag.into()).into_ref()
    }

    #[must_use]
    pub fn null() -> NodeRef {
        Self::Null.into_ref()
    }

    #[must_use]
    pub fn bool(value: bool) -> NodeRef {
        Self::Bool(value).into_ref()
    }

    #[must_use]
    pub fn int(value: i64) -> NodeRef {
        Self::Number(Number::from(value)).into_ref()
    }

    /// A floating-point number node.
    ///
    /// Non-finite values have no data representation and become `Null`.
    #[must_use]
    pub fn float(value: f64) -> NodeRef {
        match Number::from_f64(value) {
            Some(number) => Self::Number(number).into_ref(),
            None => Self::Null.into_ref(),
        }
    }

    #[must_use]
    pub fn string(value: impl Into<String>) -> NodeRef {
        Self::String(value.into()).into_ref()
    }

    /// An ordered sequence of nodes.
    #[must_use]
    pub fn seq(items: impl IntoIterator<Item = NodeRef>) -> NodeRef {
        Self::Seq(items.into_iter().collect()).into_ref()
    }

    /// A keyed mapping. Entries keep the order they are given in.
    #[must_use]
    pub fn map<K>(entries: impl IntoIterator<Item = (K, NodeRef)>) -> NodeRef
    where
        K: Into<String>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
        .into_ref()
    }

    /// A self-describing value.
    #[must_use]
    pub fn view(view: impl DataView + 'static) -> NodeRef {
        Self::View(Rc::new(view)).into_ref()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::Opaque(tag) => f.debug_tuple("Opaque").field(tag).finish(),
            Self::Null => f.write_str("Null"),
            Self::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Self::Number(value) => f.debug_tuple("Number").field(value).finish(),
            Self::String(value) => f.debug_tuple("String").field(value).finish(),
            Self::Seq(items) => f.debug_tuple("Seq").field(items).finish(),
            Self::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Self::View(_) => f.write_str("View(..)"),
        }
    }
}

// =============================================================================
// GraphExt - Graph building conveniences
// =============================================================================

/// Convenience methods on [`NodeRef`] for building and mutating graphs.
///
/// Cycles are built by inserting a node into one of its own descendants
/// after construction:
///
/// ```rust
/// use onlydata::{GraphExt, Node};
///
/// let a = Node::map([("name", Node::string("A"))]);
/// let b = Node::map([("name", Node::string("B")), ("val", a.clone())]);
/// a.insert("val", b.clone());
/// ```
pub trait GraphExt {
    /// Inserts (or replaces) a map entry. No-op on non-map nodes.
    fn insert(&self, key: impl Into<String>, value: NodeRef);

    /// Appends a sequence element. No-op on non-sequence nodes.
    fn push(&self, item: NodeRef);
}

impl GraphExt for NodeRef {
    fn insert(&self, key: impl Into<String>, value: NodeRef) {
        if let Node::Map(entries) = &mut *self.borrow_mut() {
            let key = key.into();
            match entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }
    }

    fn push(&self, item: NodeRef) {
        if let Node::Seq(items) = &mut *self.borrow_mut() {
            items.push(item);
        }
    }
}

// =============================================================================
// from_json - JSON interop
// =============================================================================

/// Builds an input graph from a `serde_json::Value`.
///
/// The result is necessarily acyclic and contains no excluded values, so
/// converting it back with default options always succeeds.
#[must_use]
pub fn from_json(value: &JsonValue) -> NodeRef {
    match value {
        JsonValue::Null => Node::null(),
        JsonValue::Bool(b) => Node::bool(*b),
        JsonValue::Number(n) => Node::Number(n.clone()).into_ref(),
        JsonValue::String(s) => Node::string(s.clone()),
        JsonValue::Array(items) => Node::seq(items.iter().map(from_json)),
        JsonValue::Object(entries) => {
            Node::map(entries.iter().map(|(key, item)| (key.clone(), from_json(item))))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn insert_replaces_existing_key_in_place() {
        let node = Node::map([("a", Node::int(1)), ("b", Node::int(2))]);
        node.insert("a", Node::int(3));

        match &*node.borrow() {
            Node::Map(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].0, "a");
                assert!(matches!(&*entries[0].1.borrow(), Node::Number(n) if n.as_i64() == Some(3)));
            }
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn insert_on_non_map_is_a_no_op() {
        let node = Node::string("scalar");
        node.insert("a", Node::int(1));
        assert!(matches!(&*node.borrow(), Node::String(s) if s == "scalar"));
    }

    #[test]
    fn push_appends_elements_in_order() {
        let seq = Node::seq(vec![Node::int(1)]);
        seq.push(Node::int(2));
        seq.push(Node::int(3));

        match &*seq.borrow() {
            Node::Seq(items) => assert_eq!(items.len(), 3),
            other => panic!("expected sequence, got {other:?}"),
        }
    }

    #[test]
    fn push_on_non_sequence_is_a_no_op() {
        let node = Node::int(42);
        node.push(Node::int(1));
        assert!(matches!(&*node.borrow(), Node::Number(_)));
    }

    #[test]
    fn float_maps_non_finite_to_null() {
        assert!(matches!(&*Node::float(f64::NAN).borrow(), Node::Null));
        assert!(matches!(&*Node::float(f64::INFINITY).borrow(), Node::Null));
        assert!(matches!(&*Node::float(1.5).borrow(), Node::Number(_)));
    }

    #[test]
    fn from_json_preserves_key_order() {
        let graph = from_json(&json!({"z": 1, "a": [true, null]}));
        match &*graph.borrow() {
            Node::Map(entries) => {
                assert_eq!(entries[0].0, "z");
                assert_eq!(entries[1].0, "a");
            }
            other => panic!("expected map, got {other:?}"),
        }
    }
}
