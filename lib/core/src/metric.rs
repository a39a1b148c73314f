//! Weighted vectorization of bag collections and the cosine distance on top of it
//!
//! A collection `S` is projected into item space as
//! `f ⊙ M · (b ⊙ s)`, where `s` is the indicator vector of `S`, `b` the bag
//! weights, `M` the item × bag occurrence matrix and `f` the item weights.

use crate::bag::Bag;
use crate::config::{MetricConfig, UnknownKeyPolicy};
use crate::context::{ArgumentSlot, ComputationContext};
use crate::divergence::{self, JensenShannon};
use crate::space::{check_dim, VectorSpace};
use crate::weights;
use crate::{Error, Result, Vector};
use std::collections::HashMap;
use tracing::debug;

/// Tunable distance between collections of bags
#[derive(Debug, Clone)]
pub struct Metric<B: Bag> {
    space: VectorSpace<B>,
    item_weights: Vector,
    bag_weights: Vector,
    config: MetricConfig,
}

impl<B: Bag> Metric<B> {
    /// Build with TF-IDF item weights and `1/|bag|` bag weights
    pub fn new<'a, I>(bags: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a B>,
        B: 'a,
    {
        MetricBuilder::new(bags).build()
    }

    pub fn builder<'a, I>(bags: I) -> MetricBuilder<B>
    where
        I: IntoIterator<Item = &'a B>,
        B: 'a,
    {
        MetricBuilder::new(bags)
    }

    pub fn space(&self) -> &VectorSpace<B> {
        &self.space
    }

    pub fn config(&self) -> &MetricConfig {
        &self.config
    }

    /// Current item weights as stored, not renormalized
    pub fn item_weights_vector(&self) -> &Vector {
        &self.item_weights
    }

    /// Current bag weights as stored, not renormalized
    pub fn bag_weights_vector(&self) -> &Vector {
        &self.bag_weights
    }

    /// Item weights normalized to sum 1
    pub fn item_weights(&self) -> Result<HashMap<B::Item, f64>> {
        let normalized = &self.item_weights * inverse_sum(&self.item_weights);
        self.space.item_map_from_vector(&normalized)
    }

    /// Bag weights normalized to sum 1
    pub fn bag_weights(&self) -> Result<HashMap<B, f64>> {
        let normalized = &self.bag_weights * inverse_sum(&self.bag_weights);
        self.space.bag_map_from_vector(&normalized)
    }

    /// Replace the item weights; items missing from the map get 0
    pub fn set_item_weights(&mut self, item_weights: &HashMap<B::Item, f64>) -> Result<()> {
        self.item_weights = normalized_item_weights(&self.space, self.space.item_vector_from_map(item_weights))?;
        Ok(())
    }

    /// Replace the bag weights; bags missing from the map get 0
    pub fn set_bag_weights(&mut self, bag_weights: &HashMap<B, f64>) -> Result<()> {
        self.bag_weights = normalized_bag_weights(&self.space, self.space.bag_vector_from_map(bag_weights))?;
        Ok(())
    }

    /// Normalized weight of one item
    pub fn item_weight(&self, item: &B::Item) -> Result<f64> {
        let raw = self.space.item_value(&self.item_weights, item)?;
        Ok(raw * inverse_sum(&self.item_weights))
    }

    /// Normalized weight of one bag
    pub fn bag_weight(&self, bag: &B) -> Result<f64> {
        let raw = self.space.bag_value(&self.bag_weights, bag)?;
        Ok(raw * inverse_sum(&self.bag_weights))
    }

    /// Like [`Self::item_weight`], with 0 for items outside the vector space
    pub fn item_weight_or_zero(&self, item: &B::Item) -> f64 {
        self.item_weight(item).unwrap_or(0.0)
    }

    /// Like [`Self::bag_weight`], with 0 for bags outside the vector space
    pub fn bag_weight_or_zero(&self, bag: &B) -> f64 {
        self.bag_weight(bag).unwrap_or(0.0)
    }

    /// Indicator vector of a collection under the configured unknown-key policy
    pub fn indicator<'a, I>(&self, collection: I) -> Result<Vector>
    where
        I: IntoIterator<Item = &'a B>,
        B: 'a,
    {
        self.space.indicator(collection, self.config.unknown_keys)
    }

    /// `f ⊙ M · (b ⊙ s)` for an indicator (or any bag-indexed) vector `s`
    pub fn vectorize_indicator(&self, indicator: &Vector) -> Result<Vector> {
        check_dim(self.space.bag_count(), indicator)?;
        let weighted = self.bag_weights.hadamard(indicator);
        Ok(self.item_weights.hadamard(&self.space.product(&weighted)))
    }

    pub fn vectorize<'a, I>(&self, collection: I) -> Result<Vector>
    where
        I: IntoIterator<Item = &'a B>,
        B: 'a,
    {
        self.vectorize_indicator(&self.indicator(collection)?)
    }

    /// Indicator, vectorization and norm of one argument
    pub fn argument<'a, I>(&self, collection: I) -> Result<ArgumentSlot>
    where
        I: IntoIterator<Item = &'a B>,
        B: 'a,
    {
        let indicator = self.indicator(collection)?;
        let vectorization = self.vectorize_indicator(&indicator)?;
        Ok(ArgumentSlot::new(indicator, vectorization))
    }

    /// Cosine distance between two collections, in [0, 2]
    pub fn distance<'a, 'b, I, J>(&self, first: I, second: J) -> Result<f64>
    where
        I: IntoIterator<Item = &'a B>,
        J: IntoIterator<Item = &'b B>,
        B: 'a + 'b,
    {
        Ok(self.evaluate(first, second)?.distance)
    }

    /// Distance evaluation that keeps its intermediates for a gradient step
    pub fn evaluate<'a, 'b, I, J>(&self, first: I, second: J) -> Result<ComputationContext>
    where
        I: IntoIterator<Item = &'a B>,
        J: IntoIterator<Item = &'b B>,
        B: 'a + 'b,
    {
        let first = self.argument(first)?;
        let second = self.argument(second)?;
        Ok(ComputationContext::new(first, second))
    }

    /// Jensen–Shannon distance between the two vectorizations, each scaled to sum 1
    pub fn jensen_shannon<'a, 'b, I, J>(&self, first: I, second: J) -> Result<JensenShannon>
    where
        I: IntoIterator<Item = &'a B>,
        J: IntoIterator<Item = &'b B>,
        B: 'a + 'b,
    {
        let p0 = self
            .vectorize(first)?
            .to_probabilities()
            .ok_or(Error::ZeroVectorization)?;
        let p1 = self
            .vectorize(second)?
            .to_probabilities()
            .ok_or(Error::ZeroVectorization)?;
        divergence::jensen_shannon(p0.as_slice(), p1.as_slice())
    }

    /// Pull an item-space direction `g` back onto multiplicative item-weight
    /// perturbations of one argument: `g ⊙ v`.
    pub fn item_pullback(&self, vectorization: &Vector, direction: &Vector) -> Result<Vector> {
        check_dim(self.space.item_count(), vectorization)?;
        check_dim(self.space.item_count(), direction)?;
        Ok(direction.hadamard(vectorization))
    }

    /// Pull an item-space direction `g` back onto multiplicative bag-weight
    /// perturbations of one argument: `(s ⊙ b) ⊙ Mᵗ (f ⊙ g)`.
    pub fn bag_pullback(&self, indicator: &Vector, direction: &Vector) -> Result<Vector> {
        check_dim(self.space.bag_count(), indicator)?;
        check_dim(self.space.item_count(), direction)?;
        let back = self
            .space
            .transpose_product(&self.item_weights.hadamard(direction));
        Ok(indicator.hadamard(&self.bag_weights).hadamard(&back))
    }

    /// Multiply the weights coordinate-wise by strictly positive factors.
    /// No renormalization happens here; readers renormalize.
    pub fn rescale_weights(&mut self, item_factors: &Vector, bag_factors: &Vector) -> Result<()> {
        check_factors(item_factors, self.space.item_count())?;
        check_factors(bag_factors, self.space.bag_count())?;

        self.item_weights = self.item_weights.hadamard(item_factors);
        self.bag_weights = self.bag_weights.hadamard(bag_factors);
        debug!(
            item_mass = self.item_weights.sum(),
            bag_mass = self.bag_weights.sum(),
            "rescaled weights"
        );
        Ok(())
    }
}

/// Builder for a [`Metric`] with explicit weights or configuration
#[derive(Debug, Clone)]
pub struct MetricBuilder<B: Bag> {
    bags: Vec<B>,
    item_weights: Option<HashMap<B::Item, f64>>,
    bag_weights: Option<HashMap<B, f64>>,
    config: MetricConfig,
}

impl<B: Bag> MetricBuilder<B> {
    pub fn new<'a, I>(bags: I) -> Self
    where
        I: IntoIterator<Item = &'a B>,
        B: 'a,
    {
        Self {
            bags: bags.into_iter().cloned().collect(),
            item_weights: None,
            bag_weights: None,
            config: MetricConfig::default(),
        }
    }

    pub fn item_weights(mut self, weights: HashMap<B::Item, f64>) -> Self {
        self.item_weights = Some(weights);
        self
    }

    pub fn bag_weights(mut self, weights: HashMap<B, f64>) -> Self {
        self.bag_weights = Some(weights);
        self
    }

    pub fn config(mut self, config: MetricConfig) -> Self {
        self.config = config;
        self
    }

    pub fn unknown_keys(mut self, policy: UnknownKeyPolicy) -> Self {
        self.config.unknown_keys = policy;
        self
    }

    pub fn build(self) -> Result<Metric<B>> {
        let space = VectorSpace::new(self.bags.iter())?;

        let raw_items = match &self.item_weights {
            Some(map) => space.item_vector_from_map(map),
            None => weights::tfidf_item_weights(&space),
        };
        let item_weights = normalized_item_weights(&space, raw_items)?;

        let raw_bags = match &self.bag_weights {
            Some(map) => space.bag_vector_from_map(map),
            None => weights::inverse_size_bag_weights(&space)?,
        };
        let bag_weights = normalized_bag_weights(&space, raw_bags)?;

        debug!(
            items = space.item_count(),
            bags = space.bag_count(),
            "built metric"
        );

        Ok(Metric {
            space,
            item_weights,
            bag_weights,
            config: self.config,
        })
    }
}

fn normalized_item_weights<B: Bag>(space: &VectorSpace<B>, raw: Vector) -> Result<Vector> {
    weights::normalize(&raw, "item", |row| format!("{:?}", space.items()[row]))
}

fn normalized_bag_weights<B: Bag>(space: &VectorSpace<B>, raw: Vector) -> Result<Vector> {
    weights::normalize(&raw, "bag", |column| format!("{:?}", space.bags()[column]))
}

fn inverse_sum(weights: &Vector) -> f64 {
    let total = weights.sum();
    if total > 0.0 {
        1.0 / total
    } else {
        0.0
    }
}

fn check_factors(factors: &Vector, expected: usize) -> Result<()> {
    check_dim(expected, factors)?;
    if let Some(&bad) = factors.iter().find(|f| !f.is_finite() || **f <= 0.0) {
        return Err(Error::InvalidWeight {
            key: "rescale factor".to_string(),
            value: bad,
        });
    }
    Ok(())
}
