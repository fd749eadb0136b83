#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

mod arena;
pub mod error;
pub mod ordered_map;

extern crate alloc;

#[cfg(feature = "std")]
type RandomState = std::hash::RandomState;
#[cfg(not(feature = "std"))]
type RandomState = hashbrown::DefaultHashBuilder;

use core::num::NonZeroU32;

pub use error::Error;
pub use error::Result;
pub use ordered_map::IntoIter;
pub use ordered_map::Iter;
pub use ordered_map::IterMut;
pub use ordered_map::Keys;
pub use ordered_map::OrderedMap;
pub use ordered_map::Values;
pub use ordered_map::ValuesMut;

/// Handle naming one arena slot.
///
/// This is what the index stores in place of a reference to a list node. It
/// is **non-generational**: once an entry is removed, its handle may be
/// handed out again for a later entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub(crate) struct Ptr(NonZeroU32);

impl core::fmt::Debug for Ptr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Ptr({})", self.0.get() - 1)
    }
}

impl Ptr {
    pub(crate) fn unchecked_from(index: usize) -> Self {
        debug_assert!(
            index < u32::MAX as usize,
            "Index too large to fit in Ptr: {index}"
        );
        Ptr(NonZeroU32::MIN.saturating_add(index as u32))
    }

    pub(crate) fn unchecked_get(self) -> usize {
        self.0.get() as usize - 1
    }
}
