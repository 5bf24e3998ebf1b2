//! # Slot ring and task registry.
//!
//! [`SlotRing`] is the data half of the wheel: `N` intrusive doubly linked
//! queues threaded through one [`Slab`], plus a registry mapping each key to the
//! arena index of its node.
//!
//! ```text
//! registry: "a" ─► #3     "b" ─► #0     "c" ─► #5
//!
//! slot 0: ∅
//! slot 1: #0 ⇄ #5
//! slot 2: #3
//! ...        ▲
//! cursor ────┘ (next slot to inspect)
//! ```
//!
//! ## Rules
//! - A key is in the registry **iff** its node is linked into exactly one queue.
//! - Insert and remove are O(1): the registry points straight at the node.
//! - [`SlotRing::advance`] costs O(length of the visited queue), independent of
//!   the total number of pending entries.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use super::schedule::{self, Placement};
use super::slab::{Slab, SlabIndex};

/// One pending task as held by the ring.
#[derive(Debug)]
pub(crate) struct Entry<K, T> {
    pub key: K,
    pub task: T,
    pub slot: usize,
    pub cycle: u64,
}

struct Node<K, T> {
    entry: Entry<K, T>,
    prev: Option<SlabIndex<Node<K, T>>>,
    next: Option<SlabIndex<Node<K, T>>>,
}

struct Queue<K, T> {
    head: Option<SlabIndex<Node<K, T>>>,
    tail: Option<SlabIndex<Node<K, T>>>,
}

impl<K, T> Queue<K, T> {
    fn empty() -> Self {
        Self {
            head: None,
            tail: None,
        }
    }
}

/// Outcome of [`SlotRing::insert`].
#[derive(Debug)]
pub(crate) struct Inserted<K, T> {
    pub placement: Placement,
    /// Entry previously registered under the same key, already unlinked.
    pub replaced: Option<Entry<K, T>>,
}

/// Fixed ring of task queues with an O(1) key index.
pub(crate) struct SlotRing<K, T> {
    slots: Vec<Queue<K, T>>,
    nodes: Slab<Node<K, T>>,
    registry: HashMap<K, SlabIndex<Node<K, T>>>,
    cursor: usize,
}

impl<K, T> SlotRing<K, T>
where
    K: Hash + Eq + Clone,
{
    /// Creates a ring with `slot_count` queues (at least one).
    pub(crate) fn new(slot_count: usize) -> Self {
        let slot_count = slot_count.max(1);
        Self {
            slots: (0..slot_count).map(|_| Queue::empty()).collect(),
            nodes: Slab::new(),
            registry: HashMap::new(),
            cursor: 0,
        }
    }

    #[inline]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Next slot the wheel will inspect.
    #[cfg(test)]
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of registered (pending) entries.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.registry.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: &K) -> bool {
        self.registry.contains_key(key)
    }

    /// Keys of all pending entries, in no particular order.
    pub(crate) fn keys(&self) -> impl Iterator<Item = &K> {
        self.registry.keys()
    }

    /// Registers `task` under `key`, `total_slots` ticks past the cursor.
    ///
    /// An existing entry for `key` is unlinked first and handed back in
    /// [`Inserted::replaced`].
    pub(crate) fn insert(&mut self, key: K, task: T, total_slots: u64) -> Inserted<K, T> {
        let replaced = self.remove(&key);
        let placement = schedule::placement(self.cursor, total_slots, self.slot_count());

        let idx = self.nodes.insert(Node {
            entry: Entry {
                key: key.clone(),
                task,
                slot: placement.slot,
                cycle: placement.cycle,
            },
            prev: None,
            next: None,
        });
        self.push_back(placement.slot, idx);
        self.registry.insert(key, idx);

        Inserted {
            placement,
            replaced,
        }
    }

    /// Unlinks and returns the entry for `key`, if pending.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<Entry<K, T>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.registry.remove(key)?;
        self.unlink(idx);
        self.nodes.remove(idx).map(|node| node.entry)
    }

    /// Visits the queue at the cursor and moves the cursor one slot forward.
    ///
    /// Entries with `cycle > 0` are decremented and stay linked; entries with
    /// `cycle == 0` are unlinked, deregistered and passed to `on_fire`.
    ///
    /// The whole queue is walked before `on_fire` runs. A panicking `on_fire`
    /// therefore cannot skip decrements or leave a half-linked node; due
    /// entries not yet handed out are dropped with the unwinding.
    pub(crate) fn advance(&mut self, mut on_fire: impl FnMut(Entry<K, T>)) {
        let slot = self.cursor;
        self.cursor = (self.cursor + 1) % self.slot_count();

        let mut due = Vec::new();
        let mut cur = self.slots[slot].head;
        while let Some(idx) = cur {
            let Some(node) = self.nodes.get_mut(idx) else {
                break;
            };
            cur = node.next;

            if node.entry.cycle > 0 {
                node.entry.cycle -= 1;
                continue;
            }

            self.unlink(idx);
            if let Some(node) = self.nodes.remove(idx) {
                self.registry.remove(&node.entry.key);
                due.push(node.entry);
            }
        }

        for entry in due {
            on_fire(entry);
        }
    }

    fn push_back(&mut self, slot: usize, idx: SlabIndex<Node<K, T>>) {
        let tail = self.slots[slot].tail;
        if let Some(node) = self.nodes.get_mut(idx) {
            node.prev = tail;
            node.next = None;
        }
        match tail.and_then(|t| self.nodes.get_mut(t)) {
            Some(tail_node) => tail_node.next = Some(idx),
            None => self.slots[slot].head = Some(idx),
        }
        self.slots[slot].tail = Some(idx);
    }

    fn unlink(&mut self, idx: SlabIndex<Node<K, T>>) {
        let Some(node) = self.nodes.get_mut(idx) else {
            return;
        };
        let (slot, prev, next) = (node.entry.slot, node.prev.take(), node.next.take());

        match prev.and_then(|p| self.nodes.get_mut(p)) {
            Some(prev_node) => prev_node.next = next,
            None => self.slots[slot].head = next,
        }
        match next.and_then(|n| self.nodes.get_mut(n)) {
            Some(next_node) => next_node.prev = prev,
            None => self.slots[slot].tail = prev,
        }
    }

    /// Counts nodes by walking every queue; must always equal [`Self::len`].
    #[cfg(test)]
    pub(crate) fn linked_len(&self) -> usize {
        let mut count = 0;
        for queue in &self.slots {
            let mut cur = queue.head;
            while let Some(idx) = cur {
                count += 1;
                cur = self.nodes.get(idx).and_then(|n| n.next);
            }
        }
        count
    }

    /// Checks registry/queue agreement and link symmetry.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.len(), self.linked_len(), "registry and queues disagree");
        assert_eq!(self.len(), self.nodes.len(), "arena holds unlinked nodes");
        for (slot, queue) in self.slots.iter().enumerate() {
            let mut prev = None;
            let mut cur = queue.head;
            while let Some(idx) = cur {
                let node = self.nodes.get(idx).expect("linked node must be occupied");
                assert_eq!(node.prev, prev, "broken back link in slot {slot}");
                assert_eq!(node.entry.slot, slot, "node linked into the wrong slot");
                assert_eq!(self.registry.get(&node.entry.key), Some(&idx));
                prev = Some(idx);
                cur = node.next;
            }
            assert_eq!(queue.tail, prev, "stale tail in slot {slot}");
        }
    }
}
