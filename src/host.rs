//! Render-host trait: the seam between the reconciler and the rendering
//! engine.
//!
//! The reconciler never creates, mutates, or inspects rendered output itself.
//! It computes which instances to reuse, where they belong, and which to
//! discard, then delegates every actual mutation to a [`RenderHost`]. The
//! host is typically a templating engine binding values into a real DOM; in
//! tests it is an in-memory markup arena.

use crate::ReconcileError;

/// The externally supplied rendering primitives consumed by a sequence.
///
/// An implementation owns a container (one contiguous rendered range between
/// two boundary markers) and manages instances inside it. Instances are
/// opaque to the reconciler: it stores them, passes them back as position
/// references, and otherwise never looks inside.
///
/// # Position references
///
/// Every positioning argument is `Option<&Instance>`: `Some(instance)` means
/// "immediately before that instance's range", `None` means "at the end
/// boundary of the container". This is the only addressing scheme the
/// reconciler uses, so hosts never need index arithmetic.
///
/// # Handle stability
///
/// [`update`](RenderHost::update) may internally re-bind values in place or
/// replace the rendered output wholesale when the template shape changed;
/// either way the handle passed in stays valid. The reconciler always treats
/// the handle as stable for the lifetime of its slot.
pub trait RenderHost {
    /// A template result: the renderable value produced by a template
    /// function for one item.
    type Template;

    /// An instantiated template: a handle owning a rendered range.
    type Instance;

    /// Instantiate `template` immediately before `before` (or at the end
    /// boundary), returning the handle used for later update, move, and
    /// removal.
    fn create(
        &mut self,
        template: Self::Template,
        before: Option<&Self::Instance>,
    ) -> Result<Self::Instance, ReconcileError>;

    /// Re-bind an existing instance's dynamic values from `template`,
    /// without discarding its identity.
    fn update(
        &mut self,
        instance: &Self::Instance,
        template: Self::Template,
    ) -> Result<(), ReconcileError>;

    /// Relocate an instance's rendered range to immediately precede `before`
    /// (or to the end boundary), preserving node identity.
    fn move_before(&mut self, instance: &Self::Instance, before: Option<&Self::Instance>);

    /// Detach and release an instance's rendered range.
    fn remove(&mut self, instance: Self::Instance);
}
