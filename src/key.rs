//! Key bounds for sequence slots.

use std::fmt::Debug;
use std::hash::Hash;

/// Convenience trait for types that can identify a slot across renders.
///
/// A key is the caller-derived stable identity of a logical list entry: the
/// reconciler hashes and compares keys to decide which rendered instance to
/// reuse when the collection is reordered. This trait combines the bounds a
/// key needs: `Hash + Eq + Clone + Debug + 'static`.
///
/// - `Hash + Eq` drive the lazy key-to-index lookup used when the cheap
///   cursor matches fail.
/// - `Clone` lets the sequence retain the key alongside the instance it owns.
/// - `Debug` feeds the [`Tracer`](crate::Tracer) event surface.
///
/// It is automatically implemented, so any hashable value works as a key,
/// including the item itself.
pub trait SequenceKey: Hash + Eq + Clone + Debug + 'static {}
impl<T: Hash + Eq + Clone + Debug + 'static> SequenceKey for T {}
