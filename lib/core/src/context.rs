//! Per-call computation context
//!
//! A distance evaluation leaves behind the indicator vector, vectorization and
//! norm of both arguments so that a gradient step on the same pair can reuse
//! them. A context is created fresh by every top-level call and is never
//! shared or cached.

use crate::Vector;

/// Intermediates for one argument of a distance evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentSlot {
    /// 1 for each distinct bag of the argument, 0 elsewhere (bag-indexed)
    pub indicator: Vector,
    /// Projection of the argument into item space
    pub vectorization: Vector,
    pub norm: f64,
}

impl ArgumentSlot {
    pub fn new(indicator: Vector, vectorization: Vector) -> Self {
        let norm = vectorization.norm();
        Self {
            indicator,
            vectorization,
            norm,
        }
    }

    /// Unit vector along the vectorization, zero when the norm vanishes
    pub fn unit(&self) -> Vector {
        if self.norm == 0.0 {
            return Vector::zeros(self.vectorization.dim());
        }
        &self.vectorization * (1.0 / self.norm)
    }
}

/// Context of a two-argument cosine distance evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct ComputationContext {
    pub first: ArgumentSlot,
    pub second: ArgumentSlot,
    /// Cosine distance between the two vectorizations
    pub distance: f64,
}

impl ComputationContext {
    pub fn new(first: ArgumentSlot, second: ArgumentSlot) -> Self {
        let distance = first.vectorization.cosine_distance(&second.vectorization);
        Self {
            first,
            second,
            distance,
        }
    }

    /// True when either argument projects onto (numerically) the zero vector
    pub fn is_degenerate(&self) -> bool {
        is_negligible(self.first.norm) || is_negligible(self.second.norm)
    }
}

/// Norms at or below this are treated as zero.
pub const NORM_EPSILON: f64 = 1e-12;

#[inline]
pub fn is_negligible(value: f64) -> bool {
    value.abs() <= NORM_EPSILON
}

/// `a` and `b` are numerically indistinguishable
#[inline]
pub fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= NORM_EPSILON + 1e-9 * b.abs()
}
