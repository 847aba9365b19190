//! Shared collection aliases and formatting helpers.

use rustc_hash::FxHasher;
use std::{fmt, hash::BuildHasherDefault};

/// Insertion-ordered map, so every dump of the automaton is deterministic.
pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Insertion-ordered set.
pub type Set<T> = indexmap::IndexSet<T, BuildHasherDefault<FxHasher>>;

/// Turn a formatting closure into a value implementing `Display`.
pub fn display_fn<F>(f: F) -> impl fmt::Display
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    struct Wrapper<F>(F);

    impl<F> fmt::Display for Wrapper<F>
    where
        F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            (self.0)(f)
        }
    }

    Wrapper(f)
}
