//! Arena storage for sequence slots.

use slab::Slab;

/// Stable handle to a slot in a [`SlotStore`].
///
/// Ids stay valid while the slot is live, independent of how the document
/// order is permuted around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SlotId(usize);

/// The retained record for one currently-rendered key: the key itself and
/// the instance handle owning its rendered range.
#[derive(Debug)]
pub(crate) struct Slot<K, I> {
    pub key: K,
    pub instance: I,
}

/// Slab-backed arena of slots.
///
/// The arena gives each slot a stable address so the order vector can be
/// permuted freely during a diff pass; a slot is only ever removed when its
/// key disappears from the collection.
pub(crate) struct SlotStore<K, I> {
    slots: Slab<Slot<K, I>>,
}

impl<K, I> SlotStore<K, I> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Slab::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn insert(&mut self, slot: Slot<K, I>) -> SlotId {
        SlotId(self.slots.insert(slot))
    }

    /// Remove a slot, yielding ownership of its key and instance.
    pub fn remove(&mut self, id: SlotId) -> Slot<K, I> {
        assert!(
            self.slots.contains(id.0),
            "slot {:?} is not live: the sequence and its arena are out of sync",
            id
        );
        self.slots.remove(id.0)
    }

    pub fn get(&self, id: SlotId) -> &Slot<K, I> {
        self.slots
            .get(id.0)
            .unwrap_or_else(|| panic!("slot {:?} is not live: the sequence and its arena are out of sync", id))
    }

    pub fn key(&self, id: SlotId) -> &K {
        &self.get(id).key
    }

    pub fn instance(&self, id: SlotId) -> &I {
        &self.get(id).instance
    }
}
