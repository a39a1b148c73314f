//! Entropy and Jensen–Shannon divergence over probability vectors
//!
//! The Jensen–Shannon divergence is computed as the mean of a discrete
//! distribution of pointwise contributions, which also yields a variance that
//! serves as an uncertainty estimate next to the distance itself.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A finite distribution: `values[i]` occurs with probability `probabilities[i]`
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    values: Vec<f64>,
    probabilities: Vec<f64>,
}

impl Distribution {
    pub fn new(values: Vec<f64>, probabilities: Vec<f64>) -> Result<Self> {
        check_same_length(values.len(), probabilities.len())?;
        Ok(Self {
            values,
            probabilities,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn moment(&self, order: i32) -> f64 {
        self.values
            .iter()
            .zip(self.probabilities.iter())
            .map(|(value, p)| p * value.powi(order))
            .sum()
    }

    pub fn mean(&self) -> f64 {
        self.moment(1)
    }

    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.moment(2) - mean * mean
    }
}

/// Jensen–Shannon distance with its variance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JensenShannon {
    pub distance: f64,
    pub variance: f64,
}

/// Information content `-log2(p)`, 0 at `p = 0`
#[inline]
pub fn information(p: f64) -> f64 {
    if p == 0.0 {
        return 0.0;
    }
    -p.log2()
}

/// Equal-weight mixture of two probability vectors
pub fn mixture(p0: &[f64], p1: &[f64]) -> Result<Vec<f64>> {
    check_same_length(p0.len(), p1.len())?;
    Ok(p0.iter().zip(p1).map(|(a, b)| 0.5 * a + 0.5 * b).collect())
}

/// Distribution of the information content of each outcome
pub fn information_distribution(probabilities: &[f64]) -> Distribution {
    Distribution {
        values: probabilities.iter().map(|&p| information(p)).collect(),
        probabilities: probabilities.to_vec(),
    }
}

/// Shannon entropy in bits
pub fn entropy(probabilities: &[f64]) -> f64 {
    information_distribution(probabilities).mean()
}

/// Pointwise contributions `info(m[i]) - info(pk[i])` of both arguments,
/// weighted by `0.5 * pk[i]`
pub fn jensen_shannon_distribution(p0: &[f64], p1: &[f64]) -> Result<Distribution> {
    let mix = mixture(p0, p1)?;

    let mut values = Vec::with_capacity(2 * mix.len());
    let mut probabilities = Vec::with_capacity(2 * mix.len());
    for p in [p0, p1] {
        for (m, &pk) in mix.iter().zip(p) {
            values.push(information(*m) - information(pk));
            probabilities.push(0.5 * pk);
        }
    }

    Distribution::new(values, probabilities)
}

pub fn jensen_shannon(p0: &[f64], p1: &[f64]) -> Result<JensenShannon> {
    let distribution = jensen_shannon_distribution(p0, p1)?;
    // Rounding can leave the divergence a hair below zero for p0 == p1.
    let divergence = distribution.mean().max(0.0);
    Ok(JensenShannon {
        distance: divergence.sqrt(),
        variance: distribution.variance(),
    })
}

fn check_same_length(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::ShapeMismatch { expected, actual });
    }
    Ok(())
}
