//! The traversal engine.
//!
//! [`convert`] walks a graph node and produces a pure data value, delegating
//! every object boundary and property to a reducer. The engine itself knows
//! nothing about cycles; pair it with a
//! [`SafeReducer`](super::guard::SafeReducer) (which [`only_data`] and
//! [`only_data_with`] do by default) for protected traversal.

use std::rc::Rc;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::graph::{DataView, Node, NodeRef};

use super::error::SnapshotError;
use super::options::Config;
use super::reducer::{Reduce, Stage};

/// Container contents cloned out of a node so the reducer can run without
/// the node's `RefCell` borrow held.
enum Walk {
    Seq(Vec<NodeRef>),
    Map(Vec<(String, NodeRef)>),
    View(Rc<dyn DataView>),
}

/// Converts `node` into a pure data value under `reducer`.
///
/// Returns `Ok(None)` when the node has no data representation: it is
/// undefined or opaque, or it is a map whose `Begin` call was vetoed. Callers
/// omit `None` results from their output (except sequences, which keep a
/// `Null` slot so element positions survive).
///
/// Per map, the reducer sees one `Begin`, one call per own key in insertion
/// order, and one `End`. A `None` from `Begin` skips the body, but `End` is
/// still delivered so stateful reducers stay balanced. Property values are
/// replaced by whatever the reducer returns before being recursed into.
///
/// Self-describing nodes short-circuit all of this: their
/// [`data_view`](DataView::data_view) result is used verbatim.
pub fn convert(
    node: &NodeRef,
    reducer: &mut dyn Reduce,
) -> Result<Option<JsonValue>, SnapshotError> {
    let walk = match &*node.borrow() {
        Node::Undefined | Node::Opaque(_) => return Ok(None),
        Node::Null => return Ok(Some(JsonValue::Null)),
        Node::Bool(value) => return Ok(Some(JsonValue::Bool(*value))),
        Node::Number(value) => return Ok(Some(JsonValue::Number(value.clone()))),
        Node::String(value) => return Ok(Some(JsonValue::String(value.clone()))),
        Node::Seq(items) => Walk::Seq(items.clone()),
        Node::Map(entries) => Walk::Map(entries.clone()),
        Node::View(view) => Walk::View(Rc::clone(view)),
    };

    match walk {
        Walk::View(view) => Ok(Some(view.data_view())),
        Walk::Seq(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in &items {
                // Dropped elements keep their slot; sequences map, they
                // do not filter.
                out.push(convert(item, reducer)?.unwrap_or(JsonValue::Null));
            }
            Ok(Some(JsonValue::Array(out)))
        }
        Walk::Map(entries) => {
            let process = reducer.reduce(node, "", node, Stage::Begin)?.is_some();

            let mut view = None;
            if process {
                let mut out = JsonMap::new();
                for (key, child) in &entries {
                    let Some(replacement) = reducer.reduce(node, key, child, Stage::Property)?
                    else {
                        continue;
                    };

                    if let Some(converted) = convert(&replacement, reducer)? {
                        out.insert(key.clone(), converted);
                    }
                }
                view = Some(JsonValue::Object(out));
            }

            reducer.reduce(node, "", node, Stage::End)?;

            Ok(view)
        }
    }
}

/// Takes a pure data snapshot of `node` with default options: an identity
/// reducer and cycle protection in
/// [`CircularReferences::Error`](super::options::CircularReferences::Error)
/// mode.
///
/// Returns `Ok(None)` when the top-level value itself has no data
/// representation.
pub fn only_data(node: &NodeRef) -> Result<Option<JsonValue>, SnapshotError> {
    only_data_with(node, Config::default())
}

/// Takes a pure data snapshot of `node` under `config`.
///
/// Option normalization happens once, here, before traversal begins; the
/// resulting reducer (guarded or not) lives exactly as long as this call.
pub fn only_data_with(node: &NodeRef, config: Config) -> Result<Option<JsonValue>, SnapshotError> {
    let mut reducer = config.into_reducer();
    convert(node, reducer.as_mut())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::reducer::Identity;
    use super::*;

    #[test]
    fn primitives_convert_to_themselves() {
        assert_eq!(only_data(&Node::string("hi")).unwrap(), Some(json!("hi")));
        assert_eq!(only_data(&Node::int(42)).unwrap(), Some(json!(42)));
        assert_eq!(only_data(&Node::bool(true)).unwrap(), Some(json!(true)));
        assert_eq!(only_data(&Node::null()).unwrap(), Some(json!(null)));
    }

    #[test]
    fn undefined_and_opaque_have_no_representation() {
        assert_eq!(only_data(&Node::undefined()).unwrap(), None);
        assert_eq!(only_data(&Node::opaque("callback")).unwrap(), None);
    }

    #[test]
    fn sequences_keep_a_null_slot_for_dropped_elements() {
        let seq = Node::seq([Node::int(1), Node::opaque("fn"), Node::int(3)]);
        assert_eq!(only_data(&seq).unwrap(), Some(json!([1, null, 3])));
    }

    #[test]
    fn begin_veto_skips_the_body_but_end_still_fires() {
        use std::cell::RefCell;

        let stages = Rc::new(RefCell::new(Vec::new()));
        let recorder = Rc::clone(&stages);
        let mut reducer = move |_ctx: &NodeRef, _key: &str, value: &NodeRef, stage: Stage| {
            recorder.borrow_mut().push(stage);
            match stage {
                Stage::Begin => None,
                _ => Some(value.clone()),
            }
        };

        let node = Node::map([("a", Node::int(1))]);
        let result = convert(&node, &mut reducer).unwrap();

        assert_eq!(result, None);
        assert_eq!(*stages.borrow(), vec![Stage::Begin, Stage::End]);
    }

    #[test]
    fn property_replacements_are_recursed_into() {
        let mut reducer = |_ctx: &NodeRef, key: &str, value: &NodeRef, _stage: Stage| {
            if key == "answer" {
                Some(Node::map([("nested", Node::int(42))]))
            } else {
                Some(value.clone())
            }
        };

        let node = Node::map([("answer", Node::int(0))]);
        let result = convert(&node, &mut reducer).unwrap();
        assert_eq!(result, Some(json!({"answer": {"nested": 42}})));
    }

    #[test]
    fn data_view_results_are_used_verbatim() {
        struct Fixed;

        impl DataView for Fixed {
            fn data_view(&self) -> JsonValue {
                json!({"anything": ["goes", {"here": true}]})
            }
        }

        let node = Node::map([("fixed", Node::view(Fixed))]);
        let mut identity = Identity;
        let result = convert(&node, &mut identity).unwrap();
        assert_eq!(
            result,
            Some(json!({"fixed": {"anything": ["goes", {"here": true}]}}))
        );
    }
}
