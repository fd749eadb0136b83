use alloc::string::String;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::Ptr;
use crate::arena::Arena;
use crate::arena::Node;
use crate::arena::Slot;

/// An iterator over the entries of an `OrderedMap`, in insertion order.
///
/// This struct is created by the [`iter`] method on [`OrderedMap`]. See its
/// documentation for more.
///
/// [`iter`]: crate::OrderedMap::iter
/// [`OrderedMap`]: crate::OrderedMap
///
/// # Examples
///
/// ```
/// use strand_map::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.set("a", 1);
/// map.set("b", 2);
///
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some(("a", &1)));
/// assert_eq!(iter.next_back(), Some(("b", &2)));
/// assert_eq!(iter.next(), None);
/// ```
#[derive(Debug)]
pub struct Iter<'a, V> {
    pub(crate) forward_ptr: Option<Ptr>,
    pub(crate) reverse_ptr: Option<Ptr>,
    pub(crate) remaining: usize,
    pub(crate) nodes: &'a Arena<V>,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Iter {
            forward_ptr: self.forward_ptr,
            reverse_ptr: self.reverse_ptr,
            remaining: self.remaining,
            nodes: self.nodes,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        let node = &nodes[self.forward_ptr?];
        self.remaining -= 1;
        self.forward_ptr = node.next;

        Some((node.key.as_str(), &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        let node = &nodes[self.reverse_ptr?];
        self.remaining -= 1;
        self.reverse_ptr = node.prev;

        Some((node.key.as_str(), &node.value))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the entries of an `OrderedMap`, in insertion
/// order.
///
/// This struct is created by the [`iter_mut`] method on [`OrderedMap`].
///
/// [`iter_mut`]: crate::OrderedMap::iter_mut
/// [`OrderedMap`]: crate::OrderedMap
///
/// # Examples
///
/// ```
/// use strand_map::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.set("a", 1);
/// map.set("b", 2);
///
/// for (_, value) in map.iter_mut() {
///     *value *= 2;
/// }
///
/// assert_eq!(map.get("a"), Ok(&2));
/// assert_eq!(map.get("b"), Ok(&4));
/// ```
#[derive(Debug)]
pub struct IterMut<'a, V> {
    pub(crate) forward_ptr: Option<Ptr>,
    pub(crate) reverse_ptr: Option<Ptr>,
    pub(crate) remaining: usize,
    pub(crate) base: NonNull<Slot<V>>,
    pub(crate) _nodes: PhantomData<&'a mut Arena<V>>,
}

impl<'a, V> IterMut<'a, V> {
    pub(crate) fn new(
        nodes: &'a mut Arena<V>,
        head: Option<Ptr>,
        tail: Option<Ptr>,
        len: usize,
    ) -> Self {
        IterMut {
            forward_ptr: head,
            reverse_ptr: tail,
            remaining: len,
            base: nodes.base_ptr(),
            _nodes: PhantomData,
        }
    }
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (&'a str, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        // SAFETY: `remaining` bounds the walk so every occupied node is yielded at
        // most once across both ends. The arena is mutably borrowed for 'a and
        // nothing else can touch it while we hold that borrow.
        let node: &'a mut Node<V> = unsafe { Arena::node_at(self.base, self.forward_ptr?) };
        self.remaining -= 1;
        self.forward_ptr = node.next;

        Some((node.key.as_str(), &mut node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IterMut<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        // SAFETY: See `next`.
        let node = unsafe { Arena::node_at(self.base, self.reverse_ptr?) };
        self.remaining -= 1;
        self.reverse_ptr = node.prev;

        Some((node.key.as_str(), &mut node.value))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}

/// An owning iterator over the entries of an `OrderedMap`, in insertion
/// order.
///
/// This struct is created by the [`into_iter`] method on `OrderedMap`
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: IntoIterator::into_iter
/// [`IntoIterator`]: core::iter::IntoIterator
///
/// # Examples
///
/// ```
/// use strand_map::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.set("a", 1);
/// map.set("b", 2);
///
/// let entries: Vec<(String, i32)> = map.into_iter().collect();
/// assert_eq!(entries, [("a".to_string(), 1), ("b".to_string(), 2)]);
/// ```
#[derive(Debug)]
pub struct IntoIter<V> {
    pub(crate) nodes: Arena<V>,
    pub(crate) forward_ptr: Option<Ptr>,
    pub(crate) reverse_ptr: Option<Ptr>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = (String, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.nodes.len() == 0 {
            return None;
        }
        let node = self.nodes.free(self.forward_ptr?);
        self.forward_ptr = node.next;

        Some((node.key, node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.nodes.len(), Some(self.nodes.len()))
    }
}

impl<V> DoubleEndedIterator for IntoIter<V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.nodes.len() == 0 {
            return None;
        }
        let node = self.nodes.free(self.reverse_ptr?);
        self.reverse_ptr = node.prev;

        Some((node.key, node.value))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> FusedIterator for IntoIter<V> {}

/// An iterator over the keys of an `OrderedMap`, in insertion order.
///
/// Created by [`OrderedMap::keys`](crate::OrderedMap::keys).
#[derive(Debug)]
pub struct Keys<'a, V> {
    pub(crate) iter: Iter<'a, V>,
}

impl<V> Clone for Keys<'_, V> {
    fn clone(&self) -> Self {
        Keys {
            iter: self.iter.clone(),
        }
    }
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<V> DoubleEndedIterator for Keys<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|(key, _)| key)
    }
}

impl<V> ExactSizeIterator for Keys<'_, V> {}

impl<V> FusedIterator for Keys<'_, V> {}

/// An iterator over the values of an `OrderedMap`, in insertion order.
///
/// Created by [`OrderedMap::values`](crate::OrderedMap::values).
#[derive(Debug)]
pub struct Values<'a, V> {
    pub(crate) iter: Iter<'a, V>,
}

impl<V> Clone for Values<'_, V> {
    fn clone(&self) -> Self {
        Values {
            iter: self.iter.clone(),
        }
    }
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<V> DoubleEndedIterator for Values<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|(_, value)| value)
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}

impl<V> FusedIterator for Values<'_, V> {}

/// A mutable iterator over the values of an `OrderedMap`, in insertion order.
///
/// Created by [`OrderedMap::values_mut`](crate::OrderedMap::values_mut).
///
/// # Examples
///
/// ```
/// use strand_map::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.set("a", 1);
/// map.set("b", 2);
///
/// for value in map.values_mut() {
///     *value *= 10;
/// }
///
/// assert_eq!(map.get("a"), Ok(&10));
/// assert_eq!(map.get("b"), Ok(&20));
/// ```
#[derive(Debug)]
pub struct ValuesMut<'a, V> {
    pub(crate) iter: IterMut<'a, V>,
}

impl<'a, V> Iterator for ValuesMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<V> DoubleEndedIterator for ValuesMut<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|(_, value)| value)
    }
}

impl<V> ExactSizeIterator for ValuesMut<'_, V> {}

impl<V> FusedIterator for ValuesMut<'_, V> {}
