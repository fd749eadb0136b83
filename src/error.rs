//! Errors reported by [`OrderedMap`](crate::OrderedMap) lookups.

/// The error type for keyed lookups on an [`OrderedMap`](crate::OrderedMap).
///
/// Only operations that must produce something for a specific key report an
/// error. Queries that have a sensible answer on a missing key or an empty map
/// (`has`, `remove`, `first_key`, `last_key`, `len`) never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Error {
    /// The supplied key has no entry in the map.
    #[error("collection: element not found")]
    NotFound,
}

/// A `Result` alias defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;
