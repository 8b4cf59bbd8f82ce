//! Tracer trait for observing reconciliation passes.
//!
//! This module defines the [`Tracer`] trait and related types for observing
//! what a sequence does to its host during an update: which slots were
//! created, moved, re-bound, or removed, and why. The default [`NoopTracer`]
//! is zero-cost when tracing is not needed.
//!
//! # Example
//!
//! ```ignore
//! use list_flow::{KeyedSequence, SpanId, Tracer, TracerSlotKey};
//!
//! struct PrintTracer;
//!
//! impl Tracer for PrintTracer {
//!     fn new_span_id(&self) -> SpanId {
//!         SpanId(1)
//!     }
//!
//!     fn on_slot_moved(&self, _span_id: SpanId, slot: TracerSlotKey) {
//!         println!("moved: {:?}", slot);
//!     }
//! }
//!
//! let sequence = KeyedSequence::<u64, MyHost>::builder().tracer(PrintTracer).build_keyed();
//! ```

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::sequence::UpdateStats;

/// Unique identifier for one update pass over a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(pub u64);

/// Represents a slot key in a type-erased manner for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TracerSlotKey {
    /// The key type name (e.g., `"u64"` or `"myapp::RowId"`).
    pub key_type: &'static str,
    /// Debug representation of the key value (e.g., `"42"`).
    pub key_debug: String,
}

impl TracerSlotKey {
    /// Create a new tracer slot key.
    #[inline]
    pub fn new(key_type: &'static str, key_debug: impl Into<String>) -> Self {
        Self {
            key_type,
            key_debug: key_debug.into(),
        }
    }

    /// Build a tracer key from a live key value.
    #[inline]
    pub fn of<K: Debug + 'static>(key: &K) -> Self {
        Self::new(std::any::type_name::<K>(), format!("{:?}", key))
    }
}

/// Tracer trait for observing reconciliation.
///
/// Implementations can collect events for testing, forward to the `tracing`
/// crate, or feed custom instrumentation. All event methods have default
/// empty implementations, so you only need to override the events you are
/// interested in.
///
/// Event construction requires formatting the key, so the sequence consults
/// [`is_enabled`](Tracer::is_enabled) first and skips event assembly entirely
/// when it returns `false`.
pub trait Tracer: 'static {
    /// Generate a new unique span ID.
    ///
    /// This is the only required method. Called once at the start of each
    /// update pass.
    fn new_span_id(&self) -> SpanId;

    /// Whether per-slot events should be assembled and emitted.
    #[inline]
    fn is_enabled(&self) -> bool {
        true
    }

    /// Called when an update pass starts, with the previous and incoming
    /// collection lengths.
    #[inline]
    fn on_update_start(&self, _span_id: SpanId, _old_len: usize, _new_len: usize) {}

    /// Called when a fresh slot is instantiated for a previously unseen key.
    #[inline]
    fn on_slot_created(&self, _span_id: SpanId, _slot: TracerSlotKey) {}

    /// Called when a reused slot's rendered range is relocated.
    #[inline]
    fn on_slot_moved(&self, _span_id: SpanId, _slot: TracerSlotKey) {}

    /// Called when a surviving slot receives fresh bindings in place.
    #[inline]
    fn on_slot_updated(&self, _span_id: SpanId, _slot: TracerSlotKey) {}

    /// Called when a slot's key disappeared and its range is released.
    #[inline]
    fn on_slot_removed(&self, _span_id: SpanId, _slot: TracerSlotKey) {}

    /// Called when an earlier duplicate of a key is elided in favor of its
    /// last occurrence.
    #[inline]
    fn on_duplicate_elided(&self, _span_id: SpanId, _slot: TracerSlotKey) {}

    /// Called when an update pass completes.
    #[inline]
    fn on_update_end(&self, _span_id: SpanId, _stats: &UpdateStats) {}
}

/// Zero-cost tracer that discards all events.
///
/// This is the default tracer for sequences built without an explicit one.
pub struct NoopTracer;

/// Global span counter for NoopTracer.
static NOOP_SPAN_COUNTER: AtomicU64 = AtomicU64::new(1);

impl Tracer for NoopTracer {
    #[inline(always)]
    fn new_span_id(&self) -> SpanId {
        SpanId(NOOP_SPAN_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline(always)]
    fn is_enabled(&self) -> bool {
        false
    }
}
