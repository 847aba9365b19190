//! Value interning with sequential identifiers.

use crate::util::Map;
use indexmap::map::Entry;
use std::{fmt, hash::Hash, marker::PhantomData};

/// Values that can be stored in an [`Interner`].
///
/// Two values are considered the same iff their keys are equal.
pub trait Interned {
    type Key: Eq + Hash + fmt::Debug;

    fn key(&self) -> Self::Key;
}

/// Identifiers handed out by an [`Interner`].
pub trait InternID: Copy {
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

/// A store that assigns a stable small identifier to each distinct value.
#[derive(Debug)]
pub struct Interner<T: Interned, I> {
    entries: Map<T::Key, T>,
    _marker: PhantomData<fn() -> I>,
}

impl<T: Interned, I> Default for Interner<T, I> {
    fn default() -> Self {
        Self {
            entries: Map::default(),
            _marker: PhantomData,
        }
    }
}

impl<T, I> Interner<T, I>
where
    T: Interned,
    I: InternID,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the identifier of `value`, registering it first if no equal
    /// value has been seen. The flag is `true` when the value is new.
    pub fn ensure(&mut self, value: T) -> (I, bool) {
        match self.entries.entry(value.key()) {
            Entry::Occupied(entry) => (I::from_index(entry.index()), false),
            Entry::Vacant(entry) => {
                let id = I::from_index(entry.index());
                entry.insert(value);
                (id, true)
            }
        }
    }

    /// Return the identifier of a value equal to `value`, if any.
    pub fn lookup(&self, value: &T) -> Option<I> {
        self.entries.get_index_of(&value.key()).map(I::from_index)
    }

    /// # Panics
    /// Panics if `id` was not handed out by this interner since the last `clear`.
    pub fn get(&self, id: I) -> &T {
        &self.entries[id.index()]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.entries
            .values()
            .enumerate()
            .map(|(i, value)| (I::from_index(i), value))
    }
}
