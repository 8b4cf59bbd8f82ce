//! Error types for sequence reconciliation.

use std::sync::Arc;

/// Errors surfaced by [`update`](crate::KeyedSequence::update).
///
/// Reconciliation itself is infallible: it is a pure, single-pass function of
/// the previous sequence and the new item collection. The only failures are
/// the ones raised by caller-supplied code, which propagate through `?`
/// unchanged:
///
/// - a template function returning an error for an item, or
/// - a [`RenderHost`](crate::RenderHost) primitive failing to instantiate or
///   re-bind an instance.
///
/// Invariant violations inside the reconciler (a slot's recorded position no
/// longer matching the live sequence) are not represented here. They indicate
/// that something mutated the rendered range behind the reconciler's back,
/// and silently carrying on would corrupt every later diff, so they panic
/// instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReconcileError {
    /// An error raised by a template function or a render-host primitive.
    ///
    /// Results are not cached and there are no retries: the caller sees the
    /// error synchronously and decides what to do with the sequence.
    #[error("render error: {0}")]
    Render(Arc<anyhow::Error>),
}

impl From<anyhow::Error> for ReconcileError {
    fn from(err: anyhow::Error) -> Self {
        ReconcileError::Render(Arc::new(err))
    }
}

impl ReconcileError {
    /// Wrap any error type as a render error.
    pub fn render<E: Into<anyhow::Error>>(err: E) -> Self {
        ReconcileError::Render(Arc::new(err.into()))
    }

    /// Returns a reference to the inner error.
    pub fn inner(&self) -> &Arc<anyhow::Error> {
        match self {
            ReconcileError::Render(e) => e,
        }
    }

    /// Attempts to downcast the inner error to a specific type.
    ///
    /// Returns `Some(&E)` if the wrapped error is of type `E`, otherwise
    /// `None`.
    pub fn downcast_ref<E: std::error::Error + Send + Sync + 'static>(&self) -> Option<&E> {
        self.inner().downcast_ref::<E>()
    }

    /// Returns `true` if the wrapped error is of type `E`.
    pub fn is<E: std::error::Error + Send + Sync + 'static>(&self) -> bool {
        self.downcast_ref::<E>().is_some()
    }
}
