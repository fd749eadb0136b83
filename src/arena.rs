use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Index;
use core::ops::IndexMut;
use core::ptr::NonNull;

use crate::Ptr;

#[cold]
#[inline(never)]
fn assert_free() -> ! {
    panic!("Attempted to access data of free slot");
}

/// One entry of the ordered sequence along with its neighbor links.
#[derive(Debug, Clone)]
pub(crate) struct Node<V> {
    pub(crate) prev: Option<Ptr>,
    pub(crate) next: Option<Ptr>,
    pub(crate) hash: u64,
    pub(crate) key: String,
    pub(crate) value: V,
}

#[derive(Debug, Clone)]
pub(crate) enum Slot<V> {
    Free { next_free: Option<Ptr> },
    Occupied(Node<V>),
}

/// Slot storage for the nodes of an [`OrderedMap`](crate::OrderedMap).
///
/// Slots are addressed by [`Ptr`] and never move, so a `Ptr` stays valid until
/// the slot it names is freed. Freed slots are threaded onto a free list and
/// handed out again by `alloc`.
#[derive(Debug, Clone)]
pub(crate) struct Arena<V> {
    slots: Vec<Slot<V>>,
    free_head: Option<Ptr>,
    len: usize,
}

impl<V> Arena<V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Arena {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    /// Number of occupied slots.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        // Occupied slots can't be compacted without remapping every Ptr held by
        // the index, so only trailing spare capacity is released.
        self.slots.shrink_to_fit();
    }

    pub(crate) fn alloc(&mut self, node: Node<V>) -> Ptr {
        self.len += 1;
        match self.free_head {
            Some(ptr) => {
                let old = core::mem::replace(
                    &mut self.slots[ptr.unchecked_get()],
                    Slot::Occupied(node),
                );
                match old {
                    Slot::Free { next_free } => self.free_head = next_free,
                    Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
                }
                ptr
            }
            None => {
                let ptr = Ptr::unchecked_from(self.slots.len());
                self.slots.push(Slot::Occupied(node));
                ptr
            }
        }
    }

    /// Base pointer of the slot storage, for iterators that hand out disjoint
    /// `&mut` borrows of several nodes at once.
    pub(crate) fn base_ptr(&mut self) -> NonNull<Slot<V>> {
        NonNull::from(self.slots.as_mut_slice()).cast()
    }

    /// # Safety
    ///
    /// `base` must come from [`Arena::base_ptr`] on an arena that stays
    /// exclusively borrowed for `'a` and is not resized meanwhile. `ptr` must
    /// name an occupied slot, and no other live reference may alias that node.
    pub(crate) unsafe fn node_at<'a>(base: NonNull<Slot<V>>, ptr: Ptr) -> &'a mut Node<V> {
        // SAFETY: In bounds and unaliased per the contract of this function.
        match unsafe { &mut *base.as_ptr().add(ptr.unchecked_get()) } {
            Slot::Occupied(node) => node,
            Slot::Free { .. } => assert_free(),
        }
    }

    pub(crate) fn is_occupied(&self, ptr: Ptr) -> bool {
        matches!(
            self.slots.get(ptr.unchecked_get()),
            Some(Slot::Occupied(_))
        )
    }

    /// Releases the slot at `ptr` and returns the node it held.
    ///
    /// The node's links are returned untouched; splicing its neighbors
    /// together is the caller's job.
    pub(crate) fn free(&mut self, ptr: Ptr) -> Node<V> {
        assert!(self.is_occupied(ptr), "Pointer to free must be occupied");
        let old = core::mem::replace(
            &mut self.slots[ptr.unchecked_get()],
            Slot::Free {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(ptr);
        self.len -= 1;

        match old {
            Slot::Occupied(node) => node,
            Slot::Free { .. } => assert_free(),
        }
    }
}

impl<V> Index<Ptr> for Arena<V> {
    type Output = Node<V>;

    fn index(&self, index: Ptr) -> &Self::Output {
        match &self.slots[index.unchecked_get()] {
            Slot::Occupied(node) => node,
            Slot::Free { .. } => assert_free(),
        }
    }
}

impl<V> IndexMut<Ptr> for Arena<V> {
    fn index_mut(&mut self, index: Ptr) -> &mut Self::Output {
        match &mut self.slots[index.unchecked_get()] {
            Slot::Occupied(node) => node,
            Slot::Free { .. } => assert_free(),
        }
    }
}
