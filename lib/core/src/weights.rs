//! Default item and bag weighting, and the sum-to-one normalization
//! applied whenever weights are set.

use crate::bag::Bag;
use crate::space::VectorSpace;
use crate::{Error, Result, Vector};

/// `ln(numerator / denominator)`, or 0 when the denominator is 0
pub fn log_ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    (numerator / denominator).ln()
}

/// Raw TF-IDF item weights: `ln(bags / bags containing the item)`.
/// An item present in every bag gets 0.
pub fn tfidf_item_weights<B: Bag>(space: &VectorSpace<B>) -> Vector {
    let bag_count = space.bag_count() as f64;
    let data = (0..space.item_count())
        .map(|row| log_ratio_or_zero(bag_count, space.bags_containing_row(row) as f64))
        .collect();
    Vector::new(data)
}

/// Raw bag weights `1 / |bag|`, with |bag| counted with multiplicity
pub fn inverse_size_bag_weights<B: Bag>(space: &VectorSpace<B>) -> Result<Vector> {
    let mut data = Vec::with_capacity(space.bag_count());
    for bag in space.bags() {
        let size = bag.size();
        if size == 0 {
            return Err(Error::DegenerateWeights(format!(
                "bag {:?} is empty, 1/|bag| is undefined",
                bag
            )));
        }
        data.push(1.0 / size as f64);
    }
    Ok(Vector::new(data))
}

/// Check every coordinate is finite and nonnegative, then scale to sum 1.
///
/// `key_of` renders the key of a coordinate for error messages.
pub fn normalize<F>(weights: &Vector, kind: &str, key_of: F) -> Result<Vector>
where
    F: Fn(usize) -> String,
{
    for (index, &value) in weights.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidWeight {
                key: key_of(index),
                value,
            });
        }
    }

    let total = weights.sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(Error::DegenerateWeights(format!(
            "{} weights sum to {}",
            kind, total
        )));
    }

    Ok(weights * (1.0 / total))
}
