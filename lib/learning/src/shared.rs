//! A metric shared between threads
//!
//! Queries take the read lock and may run side by side. Learning and fitting
//! take the write lock for the whole batch, so no query ever observes weights
//! halfway through a batch.

use crate::calibrate::Calibrate;
use crate::claim::OracleClaim;
use crate::config::{FitConfig, LearnConfig};
use crate::fit::{FitReport, FormClaim};
use crate::learn::LearnReport;
use bagdist_core::{Bag, JensenShannon, Metric, Result, Vector};
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
pub struct SharedMetric<B: Bag> {
    inner: Arc<RwLock<Metric<B>>>,
}

impl<B: Bag> Clone for SharedMetric<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Bag> From<Metric<B>> for SharedMetric<B> {
    fn from(metric: Metric<B>) -> Self {
        Self::new(metric)
    }
}

impl<B: Bag> SharedMetric<B> {
    pub fn new(metric: Metric<B>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(metric)),
        }
    }

    /// Hold the read lock across several queries
    pub fn read(&self) -> RwLockReadGuard<'_, Metric<B>> {
        self.inner.read()
    }

    /// Copy of the current state, detached from later updates
    pub fn snapshot(&self) -> Metric<B> {
        self.inner.read().clone()
    }

    pub fn distance<'a, 'b, I, J>(&self, first: I, second: J) -> Result<f64>
    where
        I: IntoIterator<Item = &'a B>,
        J: IntoIterator<Item = &'b B>,
        B: 'a + 'b,
    {
        self.inner.read().distance(first, second)
    }

    pub fn vectorize<'a, I>(&self, collection: I) -> Result<Vector>
    where
        I: IntoIterator<Item = &'a B>,
        B: 'a,
    {
        self.inner.read().vectorize(collection)
    }

    pub fn jensen_shannon<'a, 'b, I, J>(&self, first: I, second: J) -> Result<JensenShannon>
    where
        I: IntoIterator<Item = &'a B>,
        J: IntoIterator<Item = &'b B>,
        B: 'a + 'b,
    {
        self.inner.read().jensen_shannon(first, second)
    }

    pub fn item_weights(&self) -> Result<HashMap<B::Item, f64>> {
        self.inner.read().item_weights()
    }

    pub fn bag_weights(&self) -> Result<HashMap<B, f64>> {
        self.inner.read().bag_weights()
    }

    pub fn set_item_weights(&self, weights: &HashMap<B::Item, f64>) -> Result<()> {
        self.inner.write().set_item_weights(weights)
    }

    pub fn set_bag_weights(&self, weights: &HashMap<B, f64>) -> Result<()> {
        self.inner.write().set_bag_weights(weights)
    }

    pub fn learn(&self, claims: &[OracleClaim<B>], config: &LearnConfig) -> Result<LearnReport> {
        self.inner.write().learn(claims, config)
    }

    pub fn fit(&self, claims: &[FormClaim<B>], config: &FitConfig) -> Result<FitReport> {
        self.inner.write().fit(claims, config)
    }
}
