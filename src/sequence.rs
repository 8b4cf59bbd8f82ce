//! Retained sequences and the reconciliation pass.
//!
//! A sequence owns the rendered state of one list directive: one slot per
//! live key, kept in document order. Each call to `update` diffs the retained
//! order against the incoming collection and drives the
//! [`RenderHost`](crate::RenderHost) with a minimal set of create, move, and
//! remove operations, so that instances keep their identity across reorders.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::host::RenderHost;
use crate::key::SequenceKey;
use crate::slot::{Slot, SlotId, SlotStore};
use crate::tracer::{NoopTracer, SpanId, Tracer, TracerSlotKey};
use crate::ReconcileError;

/// Summary of the host operations performed by one update pass.
///
/// Returned by [`KeyedSequence::update`] and [`PositionalSequence::update`]
/// so callers and tests can assert minimality: re-rendering an identical
/// collection must report zero creations, moves, and removals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpdateStats {
    /// Fresh slots instantiated for previously unseen keys.
    pub created: usize,
    /// Reused slots whose rendered range was relocated.
    pub moved: usize,
    /// Surviving slots re-bound in place with fresh values.
    pub updated: usize,
    /// Slots released because their key disappeared.
    pub removed: usize,
    /// Earlier duplicate occurrences collapsed into their key's last
    /// occurrence.
    pub elided: usize,
}

impl UpdateStats {
    /// `true` when the pass changed nothing structurally: no instance was
    /// created, relocated, or released (value rewrites may still have
    /// happened).
    pub fn is_structural_noop(&self) -> bool {
        self.created == 0 && self.moved == 0 && self.removed == 0
    }
}

/// Builder for [`KeyedSequence`] and [`PositionalSequence`].
///
/// # Example
///
/// ```ignore
/// let sequence = KeyedSequence::<u64, MyHost>::builder()
///     .capacity(64)
///     .tracer(MyTracer::new())
///     .build_keyed();
/// ```
pub struct SequenceBuilder {
    tracer: Arc<dyn Tracer>,
    capacity: usize,
}

impl SequenceBuilder {
    /// Create a builder with the default settings: no tracing, no
    /// preallocated capacity.
    pub fn new() -> Self {
        Self {
            tracer: Arc::new(NoopTracer),
            capacity: 0,
        }
    }

    /// Install a tracer observing every pass over the built sequence.
    pub fn tracer(mut self, tracer: impl Tracer) -> Self {
        self.tracer = Arc::new(tracer);
        self
    }

    /// Install a shared tracer.
    pub fn tracer_arc(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = tracer;
        self
    }

    /// Preallocate slot storage for the expected collection size.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Build a keyed sequence.
    pub fn build_keyed<K: SequenceKey, H: RenderHost>(self) -> KeyedSequence<K, H> {
        KeyedSequence {
            slots: SlotStore::with_capacity(self.capacity),
            order: Vec::with_capacity(self.capacity),
            tracer: self.tracer,
        }
    }

    /// Build a positional (unkeyed) sequence.
    pub fn build_positional<H: RenderHost>(self) -> PositionalSequence<H> {
        PositionalSequence {
            instances: Vec::with_capacity(self.capacity),
            tracer: self.tracer,
        }
    }
}

impl Default for SequenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A retained keyed sequence: the reconciler's view of one rendered list.
///
/// The sequence owns one [`Slot`] per live key and the document order of
/// those slots. `update` mutates both in place; the sequence is never
/// discarded between renders, which is what lets the same key converge to
/// the same instance across arbitrarily many passes.
///
/// # Re-entrancy
///
/// Updates are synchronous, single-pass, and non-reentrant. Re-entering
/// `update` on the same sequence from inside a host callback cannot be
/// expressed safely here: both the sequence and the host are exclusively
/// borrowed for the duration of the pass.
pub struct KeyedSequence<K, H: RenderHost> {
    slots: SlotStore<K, H::Instance>,
    order: Vec<SlotId>,
    tracer: Arc<dyn Tracer>,
}

impl<K: SequenceKey, H: RenderHost> KeyedSequence<K, H> {
    /// Create an empty sequence with default settings.
    pub fn new() -> Self {
        Self::builder().build_keyed()
    }

    /// Create a builder for customizing the sequence.
    pub fn builder() -> SequenceBuilder {
        SequenceBuilder::new()
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// `true` when nothing is rendered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The live keys, in document order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter().map(|&id| self.slots.key(id))
    }

    /// The live instances, in document order.
    pub fn instances(&self) -> impl Iterator<Item = &H::Instance> {
        self.order.iter().map(|&id| self.slots.instance(id))
    }

    /// Document position of `key`, if it is currently rendered.
    ///
    /// Linear in the sequence length; the sequence keeps no persistent
    /// key-to-position map between passes.
    pub fn position(&self, key: &K) -> Option<usize> {
        self.order
            .iter()
            .position(|&id| self.slots.key(id) == key)
    }

    /// The instance rendered for `key`, if any.
    pub fn instance_of(&self, key: &K) -> Option<&H::Instance> {
        self.position(key)
            .map(|position| self.slots.instance(self.order[position]))
    }

    /// Remove every slot, releasing all rendered ranges.
    ///
    /// Equivalent to an `update` with an empty collection, without the
    /// intake machinery.
    pub fn clear(&mut self, host: &mut H) {
        let span = self.tracer.new_span_id();
        let old_len = self.order.len();
        self.emit(|t| t.on_update_start(span, old_len, 0));
        let mut stats = UpdateStats::default();
        for id in std::mem::take(&mut self.order) {
            self.discard(host, span, id, &mut stats);
        }
        self.emit(|t| t.on_update_end(span, &stats));
    }

    /// Reconcile the sequence against a new ordered collection.
    ///
    /// `key_fn` derives a stable identity for each item and `template_fn`
    /// produces its renderable template; both receive the item and its index
    /// in the incoming collection, and both are invoked exactly once per
    /// item. The pass then mutates the host minimally:
    ///
    /// - slots whose key survives are reused, repositioned only when the
    ///   order demands it, and re-bound with the item's fresh template;
    /// - previously unseen keys get freshly created instances at the right
    ///   position;
    /// - keys that disappeared have their instances removed.
    ///
    /// After the call, the host's document order equals the collection order
    /// exactly.
    ///
    /// # Duplicate keys
    ///
    /// Duplicates within one collection are permitted: the last occurrence
    /// of a key governs its slot's final content and position, and every
    /// earlier occurrence is elided. This also holds for three or more
    /// interleaved occurrences. Elided items still have their template
    /// evaluated (the invocation is observable), only the rendered output is
    /// collapsed.
    ///
    /// # Errors
    ///
    /// Template functions are evaluated for the whole collection before any
    /// host mutation, so a template error leaves the host untouched. Errors
    /// from host primitives, by contrast, abort the pass midway and leave
    /// the sequence in an unspecified state; they are fatal for this
    /// sequence and the caller should discard it.
    ///
    /// Complexity is O(old + new) amortized: the key-to-index lookup is
    /// built at most once per pass, on the first failed cursor match.
    pub fn update<I, T, FK, FT>(
        &mut self,
        host: &mut H,
        items: I,
        mut key_fn: FK,
        mut template_fn: FT,
    ) -> Result<UpdateStats, ReconcileError>
    where
        I: IntoIterator<Item = T>,
        FK: FnMut(&T, usize) -> K,
        FT: FnMut(&T, usize) -> Result<H::Template, ReconcileError>,
    {
        // Intake: evaluate key and template for every item and collapse
        // duplicate keys onto their last occurrence.
        let mut entries: Vec<Option<(K, H::Template)>> = Vec::new();
        let mut seen: HashMap<K, usize> = HashMap::new();
        let mut elided: Vec<K> = Vec::new();
        let mut raw_len = 0usize;
        for item in items {
            let key = key_fn(&item, raw_len);
            let template = template_fn(&item, raw_len)?;
            raw_len += 1;
            match seen.entry(key.clone()) {
                Entry::Occupied(mut occupied) => {
                    let earlier = *occupied.get();
                    entries[earlier] = None;
                    elided.push(key.clone());
                    occupied.insert(entries.len());
                    entries.push(Some((key, template)));
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(entries.len());
                    entries.push(Some((key, template)));
                }
            }
        }

        let mut new_keys: Vec<K> = Vec::with_capacity(entries.len());
        let mut new_templates: Vec<Option<H::Template>> = Vec::with_capacity(entries.len());
        for entry in entries.into_iter().flatten() {
            let (key, template) = entry;
            new_keys.push(key);
            new_templates.push(Some(template));
        }

        let span = self.tracer.new_span_id();
        let old_len = self.order.len();
        self.emit(|t| t.on_update_start(span, old_len, raw_len));
        let mut stats = UpdateStats {
            elided: elided.len(),
            ..UpdateStats::default()
        };
        self.emit(|t| {
            for key in &elided {
                t.on_duplicate_elided(span, TracerSlotKey::of(key));
            }
        });

        let new_len = new_keys.len();
        let mut old_parts: Vec<Option<SlotId>> = self.order.drain(..).map(Some).collect();
        let mut new_parts: Vec<Option<SlotId>> = vec![None; new_len];

        let mut old_head: isize = 0;
        let mut old_tail: isize = old_parts.len() as isize - 1;
        let mut new_head: isize = 0;
        let mut new_tail: isize = new_len as isize - 1;

        // Lazy lookups over the remaining ranges, built on the first failed
        // cursor match and reused for the rest of the pass. Rebuilding per
        // element is the classic path to accidental O(n^2).
        let mut lookups: Option<(HashMap<K, usize>, HashSet<K>)> = None;

        while old_head <= old_tail && new_head <= new_tail {
            let (oh, ot) = (old_head as usize, old_tail as usize);
            let (nh, nt) = (new_head as usize, new_tail as usize);
            if old_parts[oh].is_none() {
                // Hole left by an out-of-order reuse; skip it.
                old_head += 1;
            } else if old_parts[ot].is_none() {
                old_tail -= 1;
            } else if self.key_at(&old_parts, oh) == &new_keys[nh] {
                // Old head and new head match: stays in place.
                let id = Self::take_part(&mut old_parts, oh);
                self.rebind(host, span, id, Self::take_template(&mut new_templates, nh), &mut stats)?;
                new_parts[nh] = Some(id);
                old_head += 1;
                new_head += 1;
            } else if self.key_at(&old_parts, ot) == &new_keys[nt] {
                // Old tail and new tail match: stays in place.
                let id = Self::take_part(&mut old_parts, ot);
                self.rebind(host, span, id, Self::take_template(&mut new_templates, nt), &mut stats)?;
                new_parts[nt] = Some(id);
                old_tail -= 1;
                new_tail -= 1;
            } else if self.key_at(&old_parts, oh) == &new_keys[nt] {
                // Old head moved to the new tail position.
                let id = Self::take_part(&mut old_parts, oh);
                host.move_before(self.slots.instance(id), self.part_instance(&new_parts, new_tail + 1));
                self.note_move(span, id, &mut stats);
                self.rebind(host, span, id, Self::take_template(&mut new_templates, nt), &mut stats)?;
                new_parts[nt] = Some(id);
                old_head += 1;
                new_tail -= 1;
            } else if self.key_at(&old_parts, ot) == &new_keys[nh] {
                // Old tail moved to the new head position.
                let id = Self::take_part(&mut old_parts, ot);
                let head_id = old_parts[oh].expect("old head checked non-hole above");
                host.move_before(self.slots.instance(id), Some(self.slots.instance(head_id)));
                self.note_move(span, id, &mut stats);
                self.rebind(host, span, id, Self::take_template(&mut new_templates, nh), &mut stats)?;
                new_parts[nh] = Some(id);
                old_tail -= 1;
                new_head += 1;
            } else {
                let (old_index_of, new_key_set) = lookups.get_or_insert_with(|| {
                    let mut old_index_of = HashMap::new();
                    for (index, part) in old_parts.iter().enumerate().take(ot + 1).skip(oh) {
                        if let Some(id) = part {
                            old_index_of.insert(self.slots.key(*id).clone(), index);
                        }
                    }
                    let new_key_set = new_keys[nh..=nt].iter().cloned().collect();
                    (old_index_of, new_key_set)
                });

                if !new_key_set.contains(self.key_at(&old_parts, oh)) {
                    // Old head's key no longer appears anywhere: remove.
                    let id = Self::take_part(&mut old_parts, oh);
                    self.discard(host, span, id, &mut stats);
                    old_head += 1;
                } else if !new_key_set.contains(self.key_at(&old_parts, ot)) {
                    let id = Self::take_part(&mut old_parts, ot);
                    self.discard(host, span, id, &mut stats);
                    old_tail -= 1;
                } else {
                    // The new head key exists somewhere in the old range
                    // (extract and move it here, leaving a hole), or it is
                    // brand new (create in place).
                    let reused = old_index_of
                        .get(&new_keys[nh])
                        .and_then(|&index| old_parts[index].take());
                    let head_id = old_parts[oh].expect("old head checked non-hole above");
                    match reused {
                        Some(id) => {
                            host.move_before(self.slots.instance(id), Some(self.slots.instance(head_id)));
                            self.note_move(span, id, &mut stats);
                            self.rebind(
                                host,
                                span,
                                id,
                                Self::take_template(&mut new_templates, nh),
                                &mut stats,
                            )?;
                            new_parts[nh] = Some(id);
                        }
                        None => {
                            let template = Self::take_template(&mut new_templates, nh);
                            let instance =
                                host.create(template, Some(self.slots.instance(head_id)))?;
                            let id = self.slots.insert(Slot {
                                key: new_keys[nh].clone(),
                                instance,
                            });
                            self.note_create(span, id, &mut stats);
                            new_parts[nh] = Some(id);
                        }
                    }
                    new_head += 1;
                }
            }
        }

        // Old range exhausted: batch-create the remaining new slots,
        // anchored before the first part already placed after the gap.
        while new_head <= new_tail {
            let nh = new_head as usize;
            let template = Self::take_template(&mut new_templates, nh);
            let instance = {
                let before = self.part_instance(&new_parts, new_tail + 1);
                host.create(template, before)?
            };
            let id = self.slots.insert(Slot {
                key: new_keys[nh].clone(),
                instance,
            });
            self.note_create(span, id, &mut stats);
            new_parts[nh] = Some(id);
            new_head += 1;
        }

        // New range exhausted: remove whatever is left of the old range.
        while old_head <= old_tail {
            if let Some(id) = old_parts[old_head as usize].take() {
                self.discard(host, span, id, &mut stats);
            }
            old_head += 1;
        }

        self.order = new_parts
            .into_iter()
            .map(|part| part.expect("every new position must have been assigned a slot"))
            .collect();
        debug_assert_eq!(self.order.len(), self.slots.len());

        self.emit(|t| t.on_update_end(span, &stats));
        Ok(stats)
    }

    fn key_at(&self, parts: &[Option<SlotId>], index: usize) -> &K {
        let id = parts[index].expect("position already consumed");
        self.slots.key(id)
    }

    fn take_part(parts: &mut [Option<SlotId>], index: usize) -> SlotId {
        parts[index].take().expect("position already consumed")
    }

    fn take_template(templates: &mut [Option<H::Template>], index: usize) -> H::Template {
        templates[index]
            .take()
            .expect("template already consumed for this position")
    }

    /// Resolve the instance at a new-side position into a host position
    /// reference. Out-of-range means the sequence end boundary.
    fn part_instance(&self, parts: &[Option<SlotId>], index: isize) -> Option<&H::Instance> {
        let index = usize::try_from(index).ok()?;
        let part = *parts.get(index)?;
        let id = part.expect("successor position not yet assigned");
        Some(self.slots.instance(id))
    }

    fn rebind(
        &self,
        host: &mut H,
        span: SpanId,
        id: SlotId,
        template: H::Template,
        stats: &mut UpdateStats,
    ) -> Result<(), ReconcileError> {
        host.update(self.slots.instance(id), template)?;
        stats.updated += 1;
        self.emit(|t| t.on_slot_updated(span, TracerSlotKey::of(self.slots.key(id))));
        Ok(())
    }

    fn discard(&mut self, host: &mut H, span: SpanId, id: SlotId, stats: &mut UpdateStats) {
        let slot = self.slots.remove(id);
        self.emit(|t| t.on_slot_removed(span, TracerSlotKey::of(&slot.key)));
        host.remove(slot.instance);
        stats.removed += 1;
    }

    fn note_move(&self, span: SpanId, id: SlotId, stats: &mut UpdateStats) {
        stats.moved += 1;
        self.emit(|t| t.on_slot_moved(span, TracerSlotKey::of(self.slots.key(id))));
    }

    fn note_create(&self, span: SpanId, id: SlotId, stats: &mut UpdateStats) {
        stats.created += 1;
        self.emit(|t| t.on_slot_created(span, TracerSlotKey::of(self.slots.key(id))));
    }

    #[inline]
    fn emit<F: FnOnce(&dyn Tracer)>(&self, event: F) {
        if self.tracer.is_enabled() {
            event(self.tracer.as_ref());
        }
    }
}

impl<K: SequenceKey, H: RenderHost> Default for KeyedSequence<K, H> {
    fn default() -> Self {
        Self::new()
    }
}

/// A retained unkeyed sequence: slot identity is positional.
///
/// Without keys there is nothing to track across reorders, so the diff
/// degenerates to positional rewriting: slot *i* is re-bound in place for
/// new item *i*, trailing slots beyond the new length are removed, and new
/// trailing slots are appended. Instances never move, only their bound
/// values change; no identity guarantee is made across value changes.
pub struct PositionalSequence<H: RenderHost> {
    instances: Vec<H::Instance>,
    tracer: Arc<dyn Tracer>,
}

impl<H: RenderHost> PositionalSequence<H> {
    /// Create an empty sequence with default settings.
    pub fn new() -> Self {
        Self::builder().build_positional()
    }

    /// Create a builder for customizing the sequence.
    pub fn builder() -> SequenceBuilder {
        SequenceBuilder::new()
    }

    /// Number of rendered instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// `true` when nothing is rendered.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// The rendered instances, in document order.
    pub fn instances(&self) -> impl Iterator<Item = &H::Instance> {
        self.instances.iter()
    }

    /// Remove every instance.
    pub fn clear(&mut self, host: &mut H) {
        let span = self.tracer.new_span_id();
        let old_len = self.instances.len();
        self.emit(|t| t.on_update_start(span, old_len, 0));
        let mut stats = UpdateStats::default();
        for instance in self.instances.drain(..) {
            host.remove(instance);
            stats.removed += 1;
        }
        self.emit(|t| t.on_update_end(span, &stats));
    }

    /// Rewrite the sequence positionally from a new collection.
    ///
    /// Templates are produced by `template_fn`, invoked once per item with
    /// the item and its index. Existing instances receive the new values in
    /// place; the collection growing appends fresh instances at the end, and
    /// shrinking removes trailing instances.
    ///
    /// Templates are evaluated for the whole collection before any host
    /// mutation, so a template error leaves the host untouched.
    pub fn update<I, T, FT>(
        &mut self,
        host: &mut H,
        items: I,
        mut template_fn: FT,
    ) -> Result<UpdateStats, ReconcileError>
    where
        I: IntoIterator<Item = T>,
        FT: FnMut(&T, usize) -> Result<H::Template, ReconcileError>,
    {
        // Evaluate all templates up front, so a template error surfaces
        // before any host mutation, same as the keyed intake pass.
        let mut templates: Vec<H::Template> = Vec::new();
        for item in items {
            let template = template_fn(&item, templates.len())?;
            templates.push(template);
        }

        let span = self.tracer.new_span_id();
        let old_len = self.instances.len();
        let new_len = templates.len();
        self.emit(|t| t.on_update_start(span, old_len, new_len));
        let mut stats = UpdateStats::default();
        for (index, template) in templates.into_iter().enumerate() {
            if index < self.instances.len() {
                host.update(&self.instances[index], template)?;
                stats.updated += 1;
            } else {
                let instance = host.create(template, None)?;
                self.instances.push(instance);
                stats.created += 1;
            }
        }
        for instance in self.instances.drain(new_len..) {
            host.remove(instance);
            stats.removed += 1;
        }
        self.emit(|t| t.on_update_end(span, &stats));
        Ok(stats)
    }

    #[inline]
    fn emit<F: FnOnce(&dyn Tracer)>(&self, event: F) {
        if self.tracer.is_enabled() {
            event(self.tracer.as_ref());
        }
    }
}

impl<H: RenderHost> Default for PositionalSequence<H> {
    fn default() -> Self {
        Self::new()
    }
}
