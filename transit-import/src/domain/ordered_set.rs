//! Insertion-ordered set.

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Serialize, Serializer};

/// A sequence that behaves as a set: each element is kept once, at the
/// position where it was first inserted.
///
/// Membership checks go through a hash set, so building a sequence of `n`
/// elements is O(n) amortized.
#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    items: Vec<T>,
    seen: HashSet<T>,
}

impl<T: Clone + Eq + Hash> OrderedSet<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Insert `item` if it is not already present.
    ///
    /// Returns `true` if the set changed.
    pub fn insert(&mut self, item: T) -> bool {
        if self.seen.contains(&item) {
            return false;
        }
        self.seen.insert(item.clone());
        self.items.push(item);
        true
    }

    /// Insert every element of `other` not already present, in order.
    pub fn extend_from<'a>(&mut self, other: impl IntoIterator<Item = &'a T>)
    where
        T: 'a,
    {
        for item in other {
            self.insert(item.clone());
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.seen.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Clone + Eq + Hash> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Clone + Eq + Hash> Eq for OrderedSet<T> {}

impl<T: Clone + Eq + Hash> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl<'a, T: Clone + Eq + Hash> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for OrderedSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}
