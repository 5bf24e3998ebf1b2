//! Growable arena with an intrusive free list.
//!
//! Backs the per-slot task queues: nodes refer to each other by [`SlabIndex`]
//! rather than by pointer, so the ring never forms an ownership cycle and a
//! registry can hold plain indices into it.

use std::fmt;
use std::marker::PhantomData;

/// Typed index into a [`Slab`].
pub(crate) struct SlabIndex<T>(usize, PhantomData<fn() -> T>);

// Manual impls: derive would require `T: Copy` / `T: Eq`.
impl<T> Copy for SlabIndex<T> {}

impl<T> Clone for SlabIndex<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for SlabIndex<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for SlabIndex<T> {}

impl<T> fmt::Debug for SlabIndex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlabIndex({})", self.0)
    }
}

enum Slot<T> {
    Occupied(T),
    Free { next: Option<usize> },
}

/// Arena of `T` values addressed by [`SlabIndex`].
///
/// Freed slots are recycled LIFO; the backing vector only grows when the
/// free list is empty.
pub(crate) struct Slab<T> {
    entries: Vec<Slot<T>>,
    free_head: Option<usize>,
}

impl<T> Slab<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_head: None,
        }
    }

    /// Stores `value`, reusing a free slot when one exists.
    pub(crate) fn insert(&mut self, value: T) -> SlabIndex<T> {
        match self.free_head {
            Some(idx) => {
                self.free_head = match &self.entries[idx] {
                    Slot::Free { next } => *next,
                    Slot::Occupied(_) => unreachable!("free_head must point to a free slot"),
                };
                self.entries[idx] = Slot::Occupied(value);
                SlabIndex(idx, PhantomData)
            }
            None => {
                self.entries.push(Slot::Occupied(value));
                SlabIndex(self.entries.len() - 1, PhantomData)
            }
        }
    }

    /// Takes the value out of `idx`; `None` if the slot is already free.
    pub(crate) fn remove(&mut self, idx: SlabIndex<T>) -> Option<T> {
        let slot = self.entries.get_mut(idx.0)?;
        if matches!(slot, Slot::Free { .. }) {
            return None;
        }
        let prev = std::mem::replace(
            slot,
            Slot::Free {
                next: self.free_head,
            },
        );
        self.free_head = Some(idx.0);
        match prev {
            Slot::Occupied(value) => Some(value),
            Slot::Free { .. } => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, idx: SlabIndex<T>) -> Option<&T> {
        match self.entries.get(idx.0)? {
            Slot::Occupied(value) => Some(value),
            Slot::Free { .. } => None,
        }
    }

    pub(crate) fn get_mut(&mut self, idx: SlabIndex<T>) -> Option<&mut T> {
        match self.entries.get_mut(idx.0)? {
            Slot::Occupied(value) => Some(value),
            Slot::Free { .. } => None,
        }
    }

    /// Number of occupied slots.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|slot| matches!(slot, Slot::Occupied(_)))
            .count()
    }
}
