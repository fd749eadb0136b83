//! Insertion-ordered map implementation.
//!
//! This module provides the core [`OrderedMap`] type and its iterators. The
//! map pairs a hash index with a doubly linked list of entries so that
//! lookups, updates, neighbor queries and removals are all O(1).
//!
//! # Examples
//!
//! ```
//! use strand_map::ordered_map::OrderedMap;
//!
//! let mut map = OrderedMap::new();
//! map.set("first", 1);
//! map.set("second", 2);
//!
//! assert_eq!(map.next_key("first"), Ok("second"));
//! assert_eq!(map.prev_key("first"), Ok(""));
//! ```

mod iter;

use alloc::string::String;
use core::hash::BuildHasher;
use core::ops::Index;

use hashbrown::HashTable;
use hashbrown::hash_table;

use crate::Ptr;
use crate::RandomState;
use crate::arena::Arena;
use crate::arena::Node;
use crate::error::Error;
use crate::error::Result;

pub use iter::IntoIter;
pub use iter::Iter;
pub use iter::IterMut;
pub use iter::Keys;
pub use iter::Values;
pub use iter::ValuesMut;

/// A string-keyed map that remembers the order in which keys were first
/// inserted.
///
/// Entries live in a doubly linked list stored in an arena, and a hash table
/// maps each key to the arena slot of its node. Updating an existing key
/// replaces its value in place and never moves it.
///
/// Neighbor and boundary queries return `""` when there is no such neighbor,
/// and [`Error::NotFound`] when the key being asked about is not in the map.
/// Since `""` is also a valid key, use [`OrderedMap::first`] and friends when
/// the distinction matters.
///
/// The generic parameters are:
/// - `V`: Value type
/// - `S`: Hash builder type, defaults to the standard hasher
///
/// # Examples
///
/// ```
/// use strand_map::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.set("one", 1);
/// map.set("two", 2);
/// map.set("three", 3);
///
/// assert_eq!(map.first_key(), "one");
/// assert_eq!(map.last_key(), "three");
/// assert_eq!(map.next_key("one"), Ok("two"));
///
/// // Updates keep the original position.
/// map.set("one", 10);
/// assert_eq!(map.first_key(), "one");
/// assert_eq!(map.get("one"), Ok(&10));
/// ```
#[derive(Clone)]
pub struct OrderedMap<V, S = RandomState> {
    head: Option<Ptr>,
    tail: Option<Ptr>,
    nodes: Arena<V>,
    table: HashTable<Ptr>,
    hasher: S,
}

#[cold]
#[inline(never)]
fn consistency_fault(index_len: usize, sequence_len: usize) -> ! {
    log::error!(
        "ordered map corrupted: index holds {index_len} keys but sequence holds {sequence_len} \
         nodes"
    );
    panic!(
        "bug: number of elements in the index ({index_len}) is not the same as the number of \
         elements in the sequence ({sequence_len})"
    );
}

#[cold]
#[inline(never)]
fn missing_from_index() -> ! {
    log::error!("ordered map corrupted: linked node has no index entry");
    panic!("Pointer not found in table");
}

impl<V, S: BuildHasher + Default> Default for OrderedMap<V, S> {
    fn default() -> Self {
        OrderedMap::with_capacity_and_hasher(0, S::default())
    }
}

impl<V> OrderedMap<V> {
    /// Creates a new, empty map.
    ///
    /// The map is initially created with a capacity of 0, so it will not
    /// allocate until the first element is inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use strand_map::OrderedMap;
    ///
    /// let map: OrderedMap<i32> = OrderedMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.first_key(), "");
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new map that can hold at least `capacity` entries without
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::default())
    }
}

impl<V, S> OrderedMap<V, S> {
    /// Creates an empty map which will use the given hash builder.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    /// Creates an empty map with the specified capacity and hash builder.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hashbrown::DefaultHashBuilder as RandomState;
    /// use strand_map::ordered_map::OrderedMap;
    ///
    /// let hasher = RandomState::default();
    /// let mut map: OrderedMap<i32, _> = OrderedMap::with_capacity_and_hasher(10, hasher);
    /// map.set("key", 42);
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        OrderedMap {
            head: None,
            tail: None,
            nodes: Arena::with_capacity(capacity),
            table: HashTable::with_capacity(capacity),
            hasher,
        }
    }

    /// Returns a reference to the map's hash builder.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use strand_map::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.set("a", "a");
    /// assert_eq!(map.len(), 1);
    /// map.remove("a");
    /// assert_eq!(map.len(), 0);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry, keeping the allocated memory for reuse.
    pub fn clear(&mut self) {
        self.table.clear();
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Returns the earliest-inserted key still in the map, or `""` if the map
    /// is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use strand_map::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// assert_eq!(map.first_key(), "");
    ///
    /// map.set("one", 1);
    /// map.set("two", 2);
    /// assert_eq!(map.first_key(), "one");
    /// ```
    pub fn first_key(&self) -> &str {
        self.key_at(self.head)
    }

    /// Returns the most recently first-inserted key still in the map, or `""`
    /// if the map is empty.
    ///
    /// Updating the value of an existing key does not make it the last key.
    ///
    /// # Examples
    ///
    /// ```
    /// use strand_map::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// assert_eq!(map.last_key(), "");
    ///
    /// map.set("one", 1);
    /// map.set("two", 2);
    /// map.set("one", 3);
    /// assert_eq!(map.last_key(), "two");
    /// ```
    pub fn last_key(&self) -> &str {
        self.key_at(self.tail)
    }

    /// Returns the first entry in insertion order.
    pub fn first(&self) -> Option<(&str, &V)> {
        self.head.map(|ptr| self.entry_at(ptr))
    }

    /// Returns the last entry in insertion order.
    pub fn last(&self) -> Option<(&str, &V)> {
        self.tail.map(|ptr| self.entry_at(ptr))
    }

    /// Returns an iterator over the entries of the map, in insertion order.
    ///
    /// # Examples
    ///
    /// ```
    /// use strand_map::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.set("a", 1);
    /// map.set("b", 2);
    /// map.set("c", 3);
    ///
    /// let entries: Vec<_> = map.iter().collect();
    /// assert_eq!(entries, [("a", &1), ("b", &2), ("c", &3)]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            forward_ptr: self.head,
            reverse_ptr: self.tail,
            remaining: self.len(),
            nodes: &self.nodes,
        }
    }

    /// Returns an iterator over the entries of the map with mutable values, in
    /// insertion order.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        let len = self.len();
        IterMut::new(&mut self.nodes, self.head, self.tail, len)
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    ///
    /// # Examples
    ///
    /// ```
    /// use strand_map::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.set("x", 1);
    /// map.set("y", 2);
    ///
    /// let keys: Vec<_> = map.keys().collect();
    /// assert_eq!(keys, ["x", "y"]);
    /// ```
    pub fn keys(&self) -> Keys<'_, V> {
        Keys { iter: self.iter() }
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> Values<'_, V> {
        Values { iter: self.iter() }
    }

    /// Returns an iterator over mutable references to the values of the map,
    /// in insertion order.
    pub fn values_mut(&mut self) -> ValuesMut<'_, V> {
        ValuesMut {
            iter: self.iter_mut(),
        }
    }

    fn key_at(&self, ptr: Option<Ptr>) -> &str {
        ptr.map_or("", |ptr| self.nodes[ptr].key.as_str())
    }

    fn entry_at(&self, ptr: Ptr) -> (&str, &V) {
        let node = &self.nodes[ptr];
        (node.key.as_str(), &node.value)
    }

    /// Splices the node at `ptr` out of the list and frees its slot. The index
    /// entry must already be gone.
    fn unlink(&mut self, ptr: Ptr) -> Node<V> {
        let node = self.nodes.free(ptr);

        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }

        if self.table.len() != self.nodes.len() {
            consistency_fault(self.table.len(), self.nodes.len());
        }

        log::trace!("unlinked {:?} ({:?})", node.key, ptr);
        node
    }
}

impl<V, S: BuildHasher> OrderedMap<V, S> {
    /// Inserts or updates a key-value pair.
    ///
    /// If the map did not have this key, the entry is appended after the
    /// current last entry and `None` is returned.
    ///
    /// If the map did have this key, the value is replaced and the old value is
    /// returned. The entry keeps its position.
    ///
    /// # Examples
    ///
    /// ```
    /// use strand_map::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// assert_eq!(map.set("a", 1), None);
    /// assert_eq!(map.set("b", 2), None);
    /// assert_eq!(map.set("a", 3), Some(1));
    ///
    /// let entries: Vec<_> = map.iter().collect();
    /// assert_eq!(entries, [("a", &3), ("b", &2)]);
    /// ```
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        let hash = self.hasher.hash_one(key.as_str());

        let nodes = &self.nodes;
        match self.table.entry(
            hash,
            |&ptr| nodes[ptr].key == key,
            |&ptr| nodes[ptr].hash,
        ) {
            hash_table::Entry::Occupied(occupied) => {
                let ptr = *occupied.get();
                Some(core::mem::replace(&mut self.nodes[ptr].value, value))
            }
            hash_table::Entry::Vacant(vacant) => {
                let ptr = self.nodes.alloc(Node {
                    prev: self.tail,
                    next: None,
                    hash,
                    key,
                    value,
                });
                vacant.insert(ptr);

                match self.tail {
                    Some(tail) => self.nodes[tail].next = Some(ptr),
                    None => self.head = Some(ptr),
                }
                self.tail = Some(ptr);

                log::trace!("appended {:?} ({:?})", self.nodes[ptr].key, ptr);
                None
            }
        }
    }

    /// Returns a reference to the value stored for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `key` is not in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use strand_map::Error;
    /// use strand_map::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.set("one", 1);
    /// assert_eq!(map.get("one"), Ok(&1));
    /// assert_eq!(map.get("two"), Err(Error::NotFound));
    /// ```
    pub fn get(&self, key: &str) -> Result<&V> {
        let ptr = self.find(key).ok_or(Error::NotFound)?;
        Ok(&self.nodes[ptr].value)
    }

    /// Returns a mutable reference to the value stored for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `key` is not in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use strand_map::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.set("count", 1);
    /// *map.get_mut("count")? += 1;
    /// assert_eq!(map.get("count"), Ok(&2));
    /// # Ok::<(), strand_map::Error>(())
    /// ```
    pub fn get_mut(&mut self, key: &str) -> Result<&mut V> {
        let ptr = self.find(key).ok_or(Error::NotFound)?;
        Ok(&mut self.nodes[ptr].value)
    }

    /// Returns `true` if the map contains `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use strand_map::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// assert!(!map.has("key"));
    /// map.set("key", "value");
    /// assert!(map.has("key"));
    /// ```
    pub fn has(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Returns the key inserted immediately before `key`, or `""` if `key` is
    /// the first entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `key` itself is not in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use strand_map::Error;
    /// use strand_map::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.set("one", 1);
    /// map.set("two", 2);
    ///
    /// assert_eq!(map.prev_key("two"), Ok("one"));
    /// assert_eq!(map.prev_key("one"), Ok(""));
    /// assert_eq!(map.prev_key("three"), Err(Error::NotFound));
    /// ```
    pub fn prev_key(&self, key: &str) -> Result<&str> {
        let ptr = self.find(key).ok_or(Error::NotFound)?;
        Ok(self.key_at(self.nodes[ptr].prev))
    }

    /// Returns the key inserted immediately after `key`, or `""` if `key` is
    /// the last entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `key` itself is not in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use strand_map::Error;
    /// use strand_map::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.set("one", 1);
    /// map.set("two", 2);
    ///
    /// assert_eq!(map.next_key("one"), Ok("two"));
    /// assert_eq!(map.next_key("two"), Ok(""));
    /// assert_eq!(map.next_key("three"), Err(Error::NotFound));
    /// ```
    pub fn next_key(&self, key: &str) -> Result<&str> {
        let ptr = self.find(key).ok_or(Error::NotFound)?;
        Ok(self.key_at(self.nodes[ptr].next))
    }

    /// Removes `key` from the map, returning its value if it was present.
    ///
    /// Removing a missing key is a no-op. The former neighbors of the removed
    /// entry become adjacent.
    ///
    /// # Panics
    ///
    /// Panics if the index and the entry list disagree on the number of
    /// entries afterwards, which can only happen through a bug in this crate.
    ///
    /// # Examples
    ///
    /// ```
    /// use strand_map::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.set("one", 1);
    /// map.set("two", 2);
    /// map.set("three", 3);
    ///
    /// assert_eq!(map.remove("two"), Some(2));
    /// assert_eq!(map.remove("two"), None);
    /// assert_eq!(map.next_key("one"), Ok("three"));
    /// ```
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key` from the map, returning the stored key and value if it
    /// was present.
    pub fn remove_entry(&mut self, key: &str) -> Option<(String, V)> {
        if self.is_empty() {
            return None;
        }

        let hash = self.hasher.hash_one(key);
        let nodes = &self.nodes;
        let ptr = match self.table.find_entry(hash, |&ptr| nodes[ptr].key == key) {
            Ok(occupied) => occupied.remove().0,
            Err(_) => return None,
        };

        let node = self.unlink(ptr);
        Some((node.key, node.value))
    }

    /// Removes and returns the first entry in insertion order.
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
    /// assert_eq!(map.pop_first(), Some(("a".to_string(), 1)));
    /// assert_eq!(map.first_key(), "b");
    /// ```
    pub fn pop_first(&mut self) -> Option<(String, V)> {
        let ptr = self.head?;
        let node = self.remove_ptr(ptr);
        Some((node.key, node.value))
    }

    /// Removes and returns the last entry in insertion order.
    pub fn pop_last(&mut self) -> Option<(String, V)> {
        let ptr = self.tail?;
        let node = self.remove_ptr(ptr);
        Some((node.key, node.value))
    }

    /// Retains only the entries specified by the predicate.
    ///
    /// Entries are visited in insertion order, and the predicate may modify
    /// the values. Surviving entries keep their relative order.
    ///
    /// # Examples
    ///
    /// ```
    /// use strand_map::OrderedMap;
    ///
    /// let mut map: OrderedMap<i32> = [("a", 1), ("b", 2), ("c", 3), ("d", 4)]
    ///     .into_iter()
    ///     .collect();
    ///
    /// map.retain(|_key, value| {
    ///     *value *= 10;
    ///     *value % 20 == 0
    /// });
    ///
    /// let entries: Vec<_> = map.iter().collect();
    /// assert_eq!(entries, [("b", &20), ("d", &40)]);
    /// ```
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut V) -> bool,
    {
        let mut cursor = self.head;
        while let Some(ptr) = cursor {
            let node = &mut self.nodes[ptr];
            cursor = node.next;
            if !f(node.key.as_str(), &mut node.value) {
                self.remove_ptr(ptr);
            }
        }
    }

    /// Reserves capacity for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        let nodes = &self.nodes;
        self.table.reserve(additional, |&ptr| nodes[ptr].hash);
        self.nodes.reserve(additional);
    }

    /// Shrinks the capacity of the map as much as possible.
    pub fn shrink_to_fit(&mut self) {
        let nodes = &self.nodes;
        self.table.shrink_to_fit(|&ptr| nodes[ptr].hash);
        self.nodes.shrink_to_fit();
    }

    fn find(&self, key: &str) -> Option<Ptr> {
        let hash = self.hasher.hash_one(key);
        self.table
            .find(hash, |&ptr| {
                let node = &self.nodes[ptr];
                node.hash == hash && node.key == key
            })
            .copied()
    }

    /// Removes a linked node by handle, dropping its index entry first.
    fn remove_ptr(&mut self, ptr: Ptr) -> Node<V> {
        let hash = self.nodes[ptr].hash;
        match self.table.find_entry(hash, |&other| other == ptr) {
            Ok(occupied) => {
                occupied.remove();
            }
            Err(_) => missing_from_index(),
        }

        self.unlink(ptr)
    }
}

impl<V: core::fmt::Debug, S> core::fmt::Debug for OrderedMap<V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V: PartialEq, S> PartialEq for OrderedMap<V, S> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<V: Eq, S> Eq for OrderedMap<V, S> {}

impl<K, V, S> FromIterator<(K, V)> for OrderedMap<V, S>
where
    K: Into<String>,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for OrderedMap<V, S>
where
    K: Into<String>,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<V, S> IntoIterator for OrderedMap<V, S> {
    type IntoIter = IntoIter<V>;
    type Item = (String, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            nodes: self.nodes,
            forward_ptr: self.head,
            reverse_ptr: self.tail,
        }
    }
}

impl<'a, V, S> IntoIterator for &'a OrderedMap<V, S> {
    type IntoIter = Iter<'a, V>;
    type Item = (&'a str, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V, S> IntoIterator for &'a mut OrderedMap<V, S> {
    type IntoIter = IterMut<'a, V>;
    type Item = (&'a str, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<V, S: BuildHasher> Index<&str> for OrderedMap<V, S> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if `key` is not in the map.
    fn index(&self, key: &str) -> &Self::Output {
        self.get(key).expect("no entry found for key")
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::assert_eq;

    use super::*;

    fn one_two_three() -> OrderedMap<i32> {
        let mut map = OrderedMap::new();
        map.set("one", 1);
        map.set("two", 2);
        map.set("three", 3);
        map
    }

    /// Walks the list both ways and checks it against the index.
    fn assert_coherent<V, S: BuildHasher>(map: &OrderedMap<V, S>) {
        assert_eq!(map.table.len(), map.nodes.len());

        let mut forward = Vec::new();
        let mut key = map.first_key();
        for _ in 0..map.len() {
            assert!(map.has(key));
            forward.push(key.to_string());
            key = map.next_key(key).unwrap();
        }
        assert_eq!(key, "");
        if let Some(last) = forward.last() {
            assert_eq!(map.last_key(), last);
        }

        let mut backward = Vec::new();
        let mut key = map.last_key();
        for _ in 0..map.len() {
            backward.push(key.to_string());
            key = map.prev_key(key).unwrap();
        }
        assert_eq!(key, "");
        backward.reverse();

        assert_eq!(forward, backward);
        assert_eq!(map.head.is_none(), map.is_empty());
        assert_eq!(map.tail.is_none(), map.is_empty());
    }

    #[test]
    fn test_new_and_default() {
        let map: OrderedMap<Vec<i32>> = OrderedMap::default();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.first_key(), "");
        assert_eq!(map.last_key(), "");
        assert_eq!(map.first(), None);
        assert_eq!(map.last(), None);
        assert!(!map.has("anything"));
        assert!(!map.has(""));
    }

    #[test]
    fn test_with_capacity() {
        let map: OrderedMap<i32> = OrderedMap::with_capacity(10);
        assert!(map.is_empty());
    }

    #[test]
    fn test_get() {
        let map = one_two_three();
        assert_eq!(map.get("one"), Ok(&1));
        assert_eq!(map.get("two"), Ok(&2));
        assert_eq!(map.get("three"), Ok(&3));
        assert_eq!(map.get("key_not_in_the_map"), Err(Error::NotFound));
    }

    #[test]
    fn test_prev_key() {
        let map = one_two_three();
        assert_eq!(map.prev_key("two"), Ok("one"));
        assert_eq!(map.prev_key("three"), Ok("two"));
        assert_eq!(map.prev_key("one"), Ok(""));
        assert_eq!(map.prev_key("key_not_in_the_map"), Err(Error::NotFound));
    }

    #[test]
    fn test_next_key() {
        let map = one_two_three();
        assert_eq!(map.next_key("one"), Ok("two"));
        assert_eq!(map.next_key("two"), Ok("three"));
        assert_eq!(map.next_key("three"), Ok(""));
        assert_eq!(map.next_key("key_not_in_the_map"), Err(Error::NotFound));
    }

    #[test]
    fn test_first_and_last_key() {
        let map = one_two_three();
        assert_eq!(map.first_key(), "one");
        assert_eq!(map.last_key(), "three");
        assert_eq!(map.first(), Some(("one", &1)));
        assert_eq!(map.last(), Some(("three", &3)));
    }

    #[test]
    fn test_missing_key_on_empty_map() {
        let mut map: OrderedMap<i32> = OrderedMap::new();
        assert_eq!(map.get("missing"), Err(Error::NotFound));
        assert_eq!(map.get_mut("missing"), Err(Error::NotFound));
        assert_eq!(map.prev_key("missing"), Err(Error::NotFound));
        assert_eq!(map.next_key("missing"), Err(Error::NotFound));
        assert!(!map.has("missing"));
        assert_eq!(map.remove("missing"), None);
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let mut map = one_two_three();
        assert_eq!(map.remove("missing"), None);
        assert_eq!(map.len(), 3);
        assert_coherent(&map);
    }

    #[test]
    fn test_remove_head() {
        let mut map = one_two_three();
        assert_eq!(map.prev_key("two"), Ok("one"));

        assert_eq!(map.remove("one"), Some(1));

        assert_eq!(map.get("one"), Err(Error::NotFound));
        assert_eq!(map.prev_key("two"), Ok(""));
        assert_eq!(map.first_key(), "two");
        assert_eq!(map.len(), 2);
        assert_coherent(&map);
    }

    #[test]
    fn test_remove_middle_joins_neighbors() {
        let mut map = one_two_three();
        assert_eq!(map.remove("two"), Some(2));

        assert_eq!(map.next_key("one"), Ok("three"));
        assert_eq!(map.prev_key("three"), Ok("one"));
        assert_coherent(&map);
    }

    #[test]
    fn test_remove_tail() {
        let mut map = one_two_three();
        assert_eq!(map.remove("three"), Some(3));

        assert_eq!(map.last_key(), "two");
        assert_eq!(map.next_key("two"), Ok(""));
        assert_coherent(&map);
    }

    #[test]
    fn test_remove_only_entry() {
        let mut map = OrderedMap::new();
        map.set("only", ());
        map.remove("only");

        assert!(map.is_empty());
        assert_eq!(map.first_key(), "");
        assert_eq!(map.last_key(), "");
        assert_coherent(&map);
    }

    #[test]
    fn test_remove_entry() {
        let mut map = one_two_three();
        assert_eq!(map.remove_entry("two"), Some(("two".to_string(), 2)));
        assert_eq!(map.remove_entry("two"), None);
    }

    #[test]
    fn test_update_keeps_position() {
        let mut map = one_two_three();
        assert_eq!(map.set("two", 22), Some(2));

        assert_eq!(map.get("two"), Ok(&22));
        assert_eq!(map.prev_key("two"), Ok("one"));
        assert_eq!(map.next_key("two"), Ok("three"));
        assert_eq!(map.last_key(), "three");
        assert_eq!(map.len(), 3);
        assert_coherent(&map);
    }

    #[test]
    fn test_update_first_does_not_make_it_last() {
        let mut map = one_two_three();
        map.set("one", 11);
        assert_eq!(map.first_key(), "one");
        assert_eq!(map.last_key(), "three");
    }

    #[test]
    fn test_get_mut() {
        let mut map = one_two_three();
        *map.get_mut("three").unwrap() = 33;
        assert_eq!(map.get("three"), Ok(&33));
        assert_eq!(map.last_key(), "three");
    }

    #[test]
    fn test_has() {
        let mut map = OrderedMap::new();
        assert!(!map.has("any_key"));

        map.set("key", "value");
        assert!(map.has("key"));

        map.set("other_key", "42");
        assert!(map.has("other_key"));

        map.remove("key");
        assert!(!map.has("key"));
    }

    #[test]
    fn test_len_counts_distinct_keys() {
        let mut map = OrderedMap::new();
        assert_eq!(map.len(), 0);

        map.set("a", "a");
        map.set("a", "b");
        assert_eq!(map.len(), 1);

        map.set("b", "b");
        assert_eq!(map.len(), 2);

        map.remove("a");
        map.remove("a");
        assert_eq!(map.len(), 1);

        map.remove("b");
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn test_empty_string_is_ordinary_key() {
        let mut map = OrderedMap::new();
        map.set("a", 1);
        map.set("", 2);
        map.set("b", 3);

        assert!(map.has(""));
        assert_eq!(map.get(""), Ok(&2));
        assert_eq!(map.prev_key(""), Ok("a"));
        assert_eq!(map.next_key(""), Ok("b"));
        assert_eq!(map.next_key("a"), Ok(""));
        assert_eq!(map.len(), 3);

        assert_eq!(map.remove(""), Some(2));
        assert!(!map.has(""));
        assert_eq!(map.next_key("a"), Ok("b"));
    }

    #[test]
    fn test_stored_none_is_not_absence() {
        let mut map: OrderedMap<Option<i32>> = OrderedMap::new();
        map.set("nothing", None);

        assert!(map.has("nothing"));
        assert_eq!(map.get("nothing"), Ok(&None));
        assert_eq!(map.get("missing"), Err(Error::NotFound));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_neighbors_are_inverse() {
        let mut map = OrderedMap::new();
        for i in 0..50 {
            map.set(format!("k{i}"), i);
        }
        for i in (0..50).step_by(3) {
            map.remove(&format!("k{i}"));
        }

        let mut key = map.first_key().to_string();
        loop {
            let next = map.next_key(&key).unwrap().to_string();
            if next.is_empty() {
                break;
            }
            assert_eq!(map.prev_key(&next), Ok(key.as_str()));
            key = next;
        }
        assert_coherent(&map);
    }

    #[test]
    fn test_reinsert_after_remove_goes_to_tail() {
        let mut map = one_two_three();
        map.remove("one");
        map.set("one", 100);

        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, ["two", "three", "one"]);
        assert_coherent(&map);
    }

    #[test]
    fn test_slot_reuse_keeps_order() {
        let mut map = OrderedMap::new();
        map.set("a", 1);
        map.set("b", 2);
        map.set("c", 3);
        map.remove("a");
        map.remove("b");
        map.set("d", 4);
        map.set("e", 5);

        assert_eq!(map.nodes.len(), 3);
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, ["c", "d", "e"]);
        assert_coherent(&map);
    }

    #[test]
    fn test_clear() {
        let mut map = one_two_three();
        map.clear();

        assert!(map.is_empty());
        assert_eq!(map.first_key(), "");
        assert_eq!(map.last_key(), "");
        assert!(!map.has("one"));

        map.set("four", 4);
        assert_eq!(map.first_key(), "four");
        assert_coherent(&map);
    }

    #[test]
    fn test_pop_first_and_last() {
        let mut map = one_two_three();

        assert_eq!(map.pop_first(), Some(("one".to_string(), 1)));
        assert_eq!(map.pop_last(), Some(("three".to_string(), 3)));
        assert_eq!(map.first_key(), "two");
        assert_eq!(map.last_key(), "two");
        assert_coherent(&map);

        assert_eq!(map.pop_last(), Some(("two".to_string(), 2)));
        assert_eq!(map.pop_first(), None);
        assert_eq!(map.pop_last(), None);
        assert_coherent(&map);
    }

    #[test]
    fn test_retain() {
        let mut map = OrderedMap::new();
        for (i, key) in ["a", "b", "c", "d", "e"].into_iter().enumerate() {
            map.set(key, i);
        }

        map.retain(|key, value| {
            *value += 1;
            key != "a" && key != "c" && key != "e"
        });

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, [("b", &2), ("d", &4)]);
        assert_eq!(map.first_key(), "b");
        assert_eq!(map.last_key(), "d");
        assert_coherent(&map);

        map.retain(|_, _| false);
        assert!(map.is_empty());
        assert_coherent(&map);
    }

    #[test]
    fn test_iter_matches_key_chain() {
        let map = one_two_three();

        let forward: Vec<_> = map.iter().map(|(key, _)| key).collect();
        assert_eq!(forward, ["one", "two", "three"]);

        let backward: Vec<_> = map.iter().rev().map(|(key, _)| key).collect();
        assert_eq!(backward, ["three", "two", "one"]);

        let values: Vec<_> = map.values().copied().collect();
        assert_eq!(values, [1, 2, 3]);
    }

    #[test]
    fn test_iter_from_both_ends() {
        let map = one_two_three();
        let mut iter = map.iter();

        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next(), Some(("one", &1)));
        assert_eq!(iter.next_back(), Some(("three", &3)));
        assert_eq!(iter.len(), 1);
        assert_eq!(iter.next_back(), Some(("two", &2)));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn test_iter_mut() {
        let mut map = one_two_three();
        for (key, value) in map.iter_mut() {
            *value += key.len() as i32;
        }
        assert_eq!(map.get("one"), Ok(&4));
        assert_eq!(map.get("two"), Ok(&5));
        assert_eq!(map.get("three"), Ok(&8));

        for value in map.values_mut().rev() {
            *value = 0;
        }
        assert!(map.values().all(|&v| v == 0));
    }

    #[test]
    fn test_iter_mut_from_both_ends() {
        let mut map = one_two_three();
        let mut iter = map.iter_mut();

        let (first_key, first) = iter.next().unwrap();
        let (last_key, last) = iter.next_back().unwrap();
        let (middle_key, middle) = iter.next().unwrap();
        assert!(iter.next().is_none());
        assert!(iter.next_back().is_none());

        core::mem::swap(first, last);
        *middle *= 10;
        assert_eq!((first_key, middle_key, last_key), ("one", "two", "three"));

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, [("one", &3), ("two", &20), ("three", &1)]);
    }

    #[test]
    fn test_into_iter() {
        let map = one_two_three();
        let entries: Vec<_> = map.into_iter().collect();
        assert_eq!(
            entries,
            vec![
                ("one".to_string(), 1),
                ("two".to_string(), 2),
                ("three".to_string(), 3)
            ]
        );

        let mut iter = one_two_three().into_iter();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next_back(), Some(("three".to_string(), 3)));
        assert_eq!(iter.next(), Some(("one".to_string(), 1)));
        assert_eq!(iter.next_back(), Some(("two".to_string(), 2)));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_into_iter_drops_remaining() {
        let mut map = OrderedMap::new();
        map.set("a", vec![1]);
        map.set("b", vec![2]);
        map.set("c", vec![3]);

        let mut iter = map.into_iter();
        assert_eq!(iter.next(), Some(("a".to_string(), vec![1])));
        drop(iter);
    }

    #[test]
    fn test_from_iter_and_extend() {
        let mut map: OrderedMap<i32> = [("x", 1), ("y", 2), ("x", 3)].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("x"), Ok(&3));
        assert_eq!(map.first_key(), "x");

        map.extend([("z".to_string(), 4)]);
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, ["x", "y", "z"]);
    }

    #[test]
    fn test_clone_is_independent() {
        let map = one_two_three();
        let mut cloned = map.clone();

        cloned.remove("two");
        cloned.set("four", 4);

        assert_eq!(map.next_key("one"), Ok("two"));
        assert_eq!(cloned.next_key("one"), Ok("three"));
        assert_eq!(cloned.last_key(), "four");
        assert_coherent(&map);
        assert_coherent(&cloned);
    }

    #[test]
    fn test_eq_is_order_sensitive() {
        let a: OrderedMap<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        let b: OrderedMap<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        let c: OrderedMap<i32> = [("b", 2), ("a", 1)].into_iter().collect();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_debug() {
        let map = one_two_three();
        assert_eq!(format!("{map:?}"), r#"{"one": 1, "two": 2, "three": 3}"#);
    }

    #[test]
    fn test_index() {
        let map = one_two_three();
        assert_eq!(map["two"], 2);
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn test_index_missing_key() {
        let map = one_two_three();
        let _value = map["four"];
    }

    #[test]
    fn test_reserve_and_shrink() {
        let mut map = one_two_three();
        map.reserve(100);
        map.shrink_to_fit();
        assert_eq!(map.get("two"), Ok(&2));
        assert_coherent(&map);
    }

    #[test]
    fn test_many_keys_survive_rehash() {
        let mut map = OrderedMap::new();
        for i in 0..1000 {
            map.set(format!("key{i}"), i);
        }
        for i in 0..1000 {
            assert_eq!(map.get(&format!("key{i}")), Ok(&i));
        }
        assert_eq!(map.first_key(), "key0");
        assert_eq!(map.last_key(), "key999");
        assert_eq!(map.next_key("key499"), Ok("key500"));
    }

    #[test]
    fn test_custom_hasher() {
        let mut map: OrderedMap<i32, hashbrown::DefaultHashBuilder> = OrderedMap::default();
        map.set("a", 1);
        map.set("b", 2);
        assert_eq!(map.next_key("a"), Ok("b"));
    }

    #[test]
    #[should_panic(expected = "bug: number of elements in the index")]
    fn test_remove_detects_desync() {
        let mut map = one_two_three();
        // A node the index doesn't know about.
        map.nodes.alloc(Node {
            prev: None,
            next: None,
            hash: 0,
            key: "orphan".to_string(),
            value: 0,
        });

        map.remove("one");
    }

    #[test]
    #[should_panic(expected = "Pointer not found in table")]
    fn test_pop_detects_unindexed_node() {
        let mut map = one_two_three();
        map.table.clear();
        map.pop_first();
    }
}
