//! Deep, cycle-safe extraction of pure data from nested object graphs.
//!
//! This crate separates:
//! - **The graph model**: a dynamically-typed input graph ([`Node`]) that may
//!   contain cycles, opaque payloads, and self-describing values.
//! - **The traversal engine**: a recursive walk ([`only_data`], [`convert`])
//!   that produces a cycle-free, data-only `serde_json::Value` snapshot.
//! - **The reducer protocol**: a pluggable decision layer ([`Reduce`]) that
//!   controls which keys and values survive, with cycle detection provided as
//!   a composable wrapper ([`SafeReducer`]) rather than baked into the engine.
//!
//! What this crate does:
//! - strips functions, handles, and undefined values from snapshots
//! - detects circular references by identity and resolves them per a
//!   configured [`CircularReferences`] mode
//! - lets callers filter or replace values during traversal
//!
//! What it does not do:
//! - validate schemas
//! - serialize to a wire format (the snapshot is an in-memory value)
//! - restore cycles on a round trip
//!
//! The `DataView` derive macro lives in `onlydata-derive` and is re-exported
//! from this crate.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

pub use onlydata_derive::DataView;

#[allow(unused_extern_crates)]
extern crate self as onlydata;

// The derive macro's generated code reaches serde_json through this path.
#[doc(hidden)]
pub use serde_json;

// Module declarations
pub mod graph;
mod snapshot;

// Re-exports from the graph module
pub use graph::{DataView, GraphExt, Node, NodeRef, from_json};
// Re-exports from the snapshot module
pub use snapshot::{
    CIRCULAR_KEY, CircularReferences, Config, CycleGuard, Identity, KeyAllowlist, Reduce,
    SafeReducer, SnapshotError, Stage, UnknownModeError, convert, only_data, only_data_with,
};
