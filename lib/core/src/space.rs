//! Vector space of a bag collection
//!
//! Indexes every distinct item and bag in first-seen order and stores the
//! item × bag occurrence matrix `M`, where `M[i][b]` is the multiplicity of
//! item `i` in bag `b`. The space is built once and never changes afterwards.

use crate::bag::Bag;
use crate::config::UnknownKeyPolicy;
use crate::{Error, Result, Vector};
use ahash::AHashMap;
use sprs::{CsMat, TriMat};
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct VectorSpace<B: Bag> {
    items: Vec<B::Item>,
    item_index: AHashMap<B::Item, usize>,
    bags: Vec<B>,
    bag_index: AHashMap<B, usize>,
    // items x bags, compressed by bag
    incidence: CsMat<f64>,
    // document frequency of each item
    bags_containing: Vec<usize>,
}

impl<B: Bag> VectorSpace<B> {
    /// Build the space from an initial collection; repeated bags collapse.
    pub fn new<'a, I>(bags: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a B>,
        B: 'a,
    {
        let mut items = Vec::new();
        let mut item_index: AHashMap<B::Item, usize> = AHashMap::new();
        let mut distinct_bags = Vec::new();
        let mut bag_index: AHashMap<B, usize> = AHashMap::new();
        let mut triplets = Vec::new();

        for bag in bags {
            if bag_index.contains_key(bag) {
                continue;
            }
            let column = distinct_bags.len();
            bag_index.insert(bag.clone(), column);
            distinct_bags.push(bag.clone());

            for item in bag.items() {
                let row = match item_index.get(&item) {
                    Some(&row) => row,
                    None => {
                        let row = items.len();
                        item_index.insert(item.clone(), row);
                        items.push(item);
                        row
                    }
                };
                triplets.push((row, column));
            }
        }

        if distinct_bags.is_empty() {
            return Err(Error::EmptyCollection);
        }

        let mut bags_containing = vec![0usize; items.len()];
        let mut tri = TriMat::new((items.len(), distinct_bags.len()));
        let mut last_seen: Vec<Option<usize>> = vec![None; items.len()];
        for (row, column) in triplets {
            // Duplicate triplets are summed into multiplicities.
            tri.add_triplet(row, column, 1.0);
            if last_seen[row] != Some(column) {
                last_seen[row] = Some(column);
                bags_containing[row] += 1;
            }
        }
        let incidence: CsMat<f64> = tri.to_csc();

        Ok(Self {
            items,
            item_index,
            bags: distinct_bags,
            bag_index,
            incidence,
            bags_containing,
        })
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn bag_count(&self) -> usize {
        self.bags.len()
    }

    /// Items in index order
    pub fn items(&self) -> &[B::Item] {
        &self.items
    }

    /// Bags in index order
    pub fn bags(&self) -> &[B] {
        &self.bags
    }

    pub fn item_index(&self, item: &B::Item) -> Option<usize> {
        self.item_index.get(item).copied()
    }

    pub fn bag_index(&self, bag: &B) -> Option<usize> {
        self.bag_index.get(bag).copied()
    }

    pub fn incidence(&self) -> &CsMat<f64> {
        &self.incidence
    }

    /// Number of bags containing `item`, 0 for an unknown item
    pub fn count_bags_containing_item(&self, item: &B::Item) -> usize {
        self.item_index(item)
            .map(|row| self.bags_containing[row])
            .unwrap_or(0)
    }

    pub(crate) fn bags_containing_row(&self, row: usize) -> usize {
        self.bags_containing[row]
    }

    /// Indexed item vector from a map; items missing from the map get 0,
    /// keys absent from the space are dropped.
    pub fn item_vector_from_map(&self, values: &HashMap<B::Item, f64>) -> Vector {
        let mut data = vec![0.0; self.item_count()];
        let mut dropped = 0usize;
        for (item, &value) in values {
            match self.item_index(item) {
                Some(row) => data[row] = value,
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!(dropped, "item weights name items outside the vector space");
        }
        Vector::new(data)
    }

    /// Indexed bag vector from a map, same conventions as [`Self::item_vector_from_map`]
    pub fn bag_vector_from_map(&self, values: &HashMap<B, f64>) -> Vector {
        let mut data = vec![0.0; self.bag_count()];
        let mut dropped = 0usize;
        for (bag, &value) in values {
            match self.bag_index(bag) {
                Some(column) => data[column] = value,
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!(dropped, "bag weights name bags outside the vector space");
        }
        Vector::new(data)
    }

    pub fn item_map_from_vector(&self, vector: &Vector) -> Result<HashMap<B::Item, f64>> {
        check_dim(self.item_count(), vector)?;
        Ok(self
            .items
            .iter()
            .cloned()
            .zip(vector.iter().copied())
            .collect())
    }

    pub fn bag_map_from_vector(&self, vector: &Vector) -> Result<HashMap<B, f64>> {
        check_dim(self.bag_count(), vector)?;
        Ok(self
            .bags
            .iter()
            .cloned()
            .zip(vector.iter().copied())
            .collect())
    }

    /// Coordinate of `item` in an item-indexed vector
    pub fn item_value(&self, vector: &Vector, item: &B::Item) -> Result<f64> {
        check_dim(self.item_count(), vector)?;
        self.item_index(item)
            .map(|row| vector.as_slice()[row])
            .ok_or_else(|| Error::UnknownItem(format!("{:?}", item)))
    }

    /// Coordinate of `bag` in a bag-indexed vector
    pub fn bag_value(&self, vector: &Vector, bag: &B) -> Result<f64> {
        check_dim(self.bag_count(), vector)?;
        self.bag_index(bag)
            .map(|column| vector.as_slice()[column])
            .ok_or_else(|| Error::UnknownBag(format!("{:?}", bag)))
    }

    /// Indicator vector of a collection: 1 for each distinct member bag
    pub fn indicator<'a, I>(&self, collection: I, policy: UnknownKeyPolicy) -> Result<Vector>
    where
        I: IntoIterator<Item = &'a B>,
        B: 'a,
    {
        let mut data = vec![0.0; self.bag_count()];
        for bag in collection {
            match (self.bag_index(bag), policy) {
                (Some(column), _) => data[column] = 1.0,
                (None, UnknownKeyPolicy::Ignore) => {}
                (None, UnknownKeyPolicy::Reject) => {
                    return Err(Error::UnknownBag(format!("{:?}", bag)));
                }
            }
        }
        Ok(Vector::new(data))
    }

    /// `M · x` for a bag-indexed `x`
    pub fn product(&self, bag_vector: &Vector) -> Vector {
        debug_assert_eq!(bag_vector.dim(), self.bag_count());
        let x = bag_vector.as_slice();
        let mut out = vec![0.0; self.item_count()];
        for (column, entries) in self.incidence.outer_iterator().enumerate() {
            let weight = x[column];
            if weight == 0.0 {
                continue;
            }
            for (row, &count) in entries.iter() {
                out[row] += count * weight;
            }
        }
        Vector::new(out)
    }

    /// `Mᵗ · y` for an item-indexed `y`
    pub fn transpose_product(&self, item_vector: &Vector) -> Vector {
        debug_assert_eq!(item_vector.dim(), self.item_count());
        let y = item_vector.as_slice();
        let out: Vec<f64> = self
            .incidence
            .outer_iterator()
            .map(|entries| entries.iter().map(|(row, &count)| count * y[row]).sum::<f64>())
            .collect();
        Vector::new(out)
    }
}

pub(crate) fn check_dim(expected: usize, vector: &Vector) -> Result<()> {
    if vector.dim() != expected {
        return Err(Error::ShapeMismatch {
            expected,
            actual: vector.dim(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banana_space() -> VectorSpace<&'static str> {
        VectorSpace::new(["banana", "ananas", "base"].iter()).unwrap()
    }

    #[test]
    fn test_first_seen_indexing() {
        let space = banana_space();
        assert_eq!(space.items(), &['b', 'a', 'n', 's', 'e']);
        assert_eq!(space.bag_index(&"ananas"), Some(1));
        assert_eq!(space.item_count(), 5);
        assert_eq!(space.bag_count(), 3);
    }

    #[test]
    fn test_multiplicities() {
        let space = banana_space();
        let banana = space.indicator(["banana"].iter(), UnknownKeyPolicy::Reject).unwrap();
        let counts = space.product(&banana);
        let a = space.item_index(&'a').unwrap();
        let n = space.item_index(&'n').unwrap();
        assert_eq!(counts.as_slice()[a], 3.0);
        assert_eq!(counts.as_slice()[n], 2.0);
        assert_eq!(counts.dim(), space.item_count());
    }

    #[test]
    fn test_count_bags_containing_item() {
        let space = banana_space();
        assert_eq!(space.count_bags_containing_item(&'a'), 3);
        assert_eq!(space.count_bags_containing_item(&'b'), 2);
        assert_eq!(space.count_bags_containing_item(&'n'), 2);
        assert_eq!(space.count_bags_containing_item(&'e'), 1);
        assert_eq!(space.count_bags_containing_item(&'f'), 0);
    }

    #[test]
    fn test_duplicate_bags_collapse() {
        let space = VectorSpace::new(["ab", "ab", "b"].iter()).unwrap();
        assert_eq!(space.bag_count(), 2);
        assert_eq!(space.count_bags_containing_item(&'b'), 2);
    }

    #[test]
    fn test_empty_collection() {
        let empty: Vec<&str> = Vec::new();
        assert!(matches!(
            VectorSpace::new(empty.iter()),
            Err(Error::EmptyCollection)
        ));
    }

    #[test]
    fn test_indicator_policies() {
        let space = banana_space();
        let rejected = space.indicator(["banana", "kiwi"].iter(), UnknownKeyPolicy::Reject);
        assert!(matches!(rejected, Err(Error::UnknownBag(_))));

        let ignored = space
            .indicator(["banana", "kiwi", "banana"].iter(), UnknownKeyPolicy::Ignore)
            .unwrap();
        assert_eq!(ignored.as_slice(), &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_transpose_product_is_adjoint() {
        let space = banana_space();
        let x = Vector::new(vec![0.3, -1.2, 2.0]);
        let y = Vector::new(vec![1.0, 0.5, -0.25, 2.0, 0.1]);
        let lhs = space.product(&x).dot(&y);
        let rhs = x.dot(&space.transpose_product(&y));
        assert!((lhs - rhs).abs() < 1e-12);
    }

    #[test]
    fn test_map_round_trip_and_lookups() {
        let space = banana_space();
        let mut values = HashMap::new();
        values.insert('a', 2.0);
        values.insert('z', 9.0);
        let vector = space.item_vector_from_map(&values);
        assert_eq!(vector.sum(), 2.0);
        assert_eq!(space.item_value(&vector, &'a').unwrap(), 2.0);
        assert_eq!(space.item_value(&vector, &'b').unwrap(), 0.0);
        assert!(matches!(
            space.item_value(&vector, &'z'),
            Err(Error::UnknownItem(_))
        ));

        let map = space.item_map_from_vector(&vector).unwrap();
        assert_eq!(map.len(), 5);
        assert_eq!(map[&'a'], 2.0);
        assert!(matches!(
            space.item_map_from_vector(&Vector::zeros(2)),
            Err(Error::ShapeMismatch { expected: 5, actual: 2 })
        ));
    }

    #[test]
    fn test_bag_map_round_trip() {
        let space = banana_space();
        let values = HashMap::from([("ananas", 0.5), ("base", 1.5), ("bandana", 4.0)]);
        let vector = space.bag_vector_from_map(&values);
        assert_eq!(vector.as_slice(), &[0.0, 0.5, 1.5]);

        let map = space.bag_map_from_vector(&vector).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map[&"banana"], 0.0);
        assert_eq!(map[&"ananas"], 0.5);
        assert_eq!(map[&"base"], 1.5);
        assert!(!map.contains_key(&"bandana"));
        assert!(matches!(
            space.bag_map_from_vector(&Vector::zeros(5)),
            Err(Error::ShapeMismatch { expected: 3, actual: 5 })
        ));
    }
}
