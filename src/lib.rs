//! List-Flow: keyed-list reconciliation for retained rendered sequences.
//!
//! Given an ordered collection of items and a way to derive a stable key for
//! each, a [`KeyedSequence`] renders one instance per item through a
//! caller-supplied [`RenderHost`] and, on every subsequent update, mutates
//! the rendered output minimally: instances are reused and repositioned
//! instead of destroyed and recreated, so per-item state survives reorders,
//! insertions, and removals.
//!
//! # Key Features
//!
//! - **Identity preservation**: the same key converges to the same instance
//!   across any permutation of the collection
//! - **Minimal mutation**: a two-ended cursor diff with a lazy key-index
//!   fallback keeps updates O(n) amortized and move counts small
//! - **Host-agnostic**: rendering happens behind the [`RenderHost`] seam;
//!   the reconciler never touches rendered output itself
//! - **Positional mode**: [`PositionalSequence`] covers unkeyed lists, where
//!   slots are rewritten in place and never move
//! - **Observability**: the [`Tracer`] API exposes every create, move,
//!   re-bind, and removal, and each update returns an [`UpdateStats`]
//!
//! # Example
//!
//! ```ignore
//! use list_flow::KeyedSequence;
//!
//! let mut sequence = KeyedSequence::new();
//! let mut host = MyDomHost::new(container);
//!
//! // First render creates three instances.
//! sequence.update(&mut host, [1, 2, 3], |i, _| *i, |i, _| Ok(li(i)))?;
//!
//! // Reversing reuses all three, moving two of them.
//! let stats = sequence.update(&mut host, [3, 2, 1], |i, _| *i, |i, _| Ok(li(i)))?;
//! assert_eq!(stats.created, 0);
//! ```
//!
//! # What this crate is not
//!
//! Template parsing, value binding, and the rendering container itself live
//! on the host side of [`RenderHost`]. The reconciler consumes those
//! primitives; it never reimplements them.

mod error;
mod host;
mod key;
pub mod sequence;
mod slot;
pub mod tracer;

pub use error::ReconcileError;
pub use host::RenderHost;
pub use key::SequenceKey;
pub use sequence::{KeyedSequence, PositionalSequence, SequenceBuilder, UpdateStats};
pub use tracer::{NoopTracer, SpanId, Tracer, TracerSlotKey};
