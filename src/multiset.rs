//! Multisets of tokens.

use itertools::Itertools;
use std::{collections::BTreeMap, fmt};

/// A bag of values: order is irrelevant and duplicates are counted.
///
/// # Example
///
/// ```
/// use pnet::MultiSet;
///
/// let mut m: MultiSet<i64> = [0, 1, 1].into_iter().collect();
/// assert_eq!(m.count(&1), 2);
/// assert_eq!(m.len(), 3);
///
/// m.remove(&1, 2).unwrap();
/// assert!(!m.contains(&1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MultiSet<T: Ord> {
    items: BTreeMap<T, usize>,
}

/// Removal of more copies than the multiset holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotEnough {
    pub requested: usize,
    pub available: usize,
}

impl<T: Ord> Default for MultiSet<T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }
}

impl<T: Ord> MultiSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: T) {
        self.add_many(value, 1);
    }

    /// Add `times` copies of `value`. Adding zero copies is a no-op.
    pub fn add_many(&mut self, value: T, times: usize) {
        if times > 0 {
            *self.items.entry(value).or_insert(0) += times;
        }
    }

    /// Remove `times` copies of `value`, failing without change when fewer
    /// are present.
    pub fn remove(&mut self, value: &T, times: usize) -> Result<(), NotEnough> {
        let available = self.count(value);
        if available < times {
            return Err(NotEnough {
                requested: times,
                available,
            });
        }
        if available == times {
            self.items.remove(value);
        } else if let Some(n) = self.items.get_mut(value) {
            *n -= times;
        }
        Ok(())
    }

    /// Multiplicity of `value` (zero when absent).
    pub fn count(&self, value: &T) -> usize {
        self.items.get(value).copied().unwrap_or(0)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.items.contains_key(value)
    }

    /// Total number of elements, counting repetitions.
    pub fn len(&self) -> usize {
        self.items.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct values with their multiplicities, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, usize)> {
        self.items.iter().map(|(v, n)| (v, *n))
    }

    /// Every element, repeated according to its multiplicity.
    pub fn elements(&self) -> impl Iterator<Item = &T> {
        self.items
            .iter()
            .flat_map(|(v, n)| std::iter::repeat(v).take(*n))
    }
}

impl<T: Ord> FromIterator<T> for MultiSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut m = MultiSet::new();
        iter.into_iter().for_each(|v| m.add(v));
        m
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for MultiSet<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Ord + fmt::Display> fmt::Display for MultiSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.elements().join(", "))
    }
}
