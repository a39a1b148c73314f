//! Bags: finite multisets of hashable items
//!
//! A bag is identified by value equality of its content. Its items are
//! enumerated with multiplicity, so `"bbb"` holds the item `'b'` three times.

use std::fmt::Debug;
use std::hash::Hash;

/// A finite multiset of items, compared and hashed by value
pub trait Bag: Hash + Eq + Clone + Debug {
    /// Atomic token found inside bags
    type Item: Hash + Eq + Clone + Debug;

    /// Iterator over the items of one bag, repeated items included
    type Items<'a>: Iterator<Item = Self::Item>
    where
        Self: 'a;

    fn items(&self) -> Self::Items<'_>;

    /// Number of items counted with multiplicity
    fn size(&self) -> usize {
        self.items().count()
    }
}

impl Bag for String {
    type Item = char;
    type Items<'a> = std::str::Chars<'a>;

    fn items(&self) -> Self::Items<'_> {
        self.chars()
    }
}

impl<'s> Bag for &'s str {
    type Item = char;
    type Items<'a> = std::str::Chars<'a> where Self: 'a;

    fn items(&self) -> Self::Items<'_> {
        self.chars()
    }
}

impl<T> Bag for Vec<T>
where
    T: Hash + Eq + Clone + Debug,
{
    type Item = T;
    type Items<'a> = std::iter::Cloned<std::slice::Iter<'a, T>> where Self: 'a;

    fn items(&self) -> Self::Items<'_> {
        self.iter().cloned()
    }

    fn size(&self) -> usize {
        self.len()
    }
}
