//! Differentiable scalar forms over vectorizations
//!
//! A form maps a fixed number of vectorizations to a scalar and knows its own
//! gradient with respect to each of them. The fitting engine chains these
//! gradients through the vectorization map to reach the weights.

use bagdist_core::Vector;
use std::fmt;

pub trait Form: Send + Sync {
    /// Number of vectorizations the form takes
    fn arity(&self) -> usize;

    fn value(&self, vectorizations: &[Vector]) -> f64;

    /// Gradient with respect to each vectorization, one per argument
    fn gradients(&self, vectorizations: &[Vector]) -> Vec<Vector>;
}

/// Cosine distance `1 - ⟨v0, v1⟩ / (‖v0‖ ‖v1‖)` as a two-argument form
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineForm;

impl Form for CosineForm {
    fn arity(&self) -> usize {
        2
    }

    fn value(&self, vectorizations: &[Vector]) -> f64 {
        vectorizations[0].cosine_distance(&vectorizations[1])
    }

    fn gradients(&self, vectorizations: &[Vector]) -> Vec<Vector> {
        let (v0, v1) = (&vectorizations[0], &vectorizations[1]);
        let (n0, n1) = (v0.norm(), v1.norm());
        if n0 == 0.0 || n1 == 0.0 {
            return vec![Vector::zeros(v0.dim()), Vector::zeros(v1.dim())];
        }

        let similarity = 1.0 - self.value(vectorizations);
        let w0 = v0 * (1.0 / n0);
        let w1 = v1 * (1.0 / n1);
        // d/dv0 = -(w1 - s w0) / n0, d/dv1 = -(w0 - s w1) / n1
        vec![
            &w1.add_scaled(-similarity, &w0) * (-1.0 / n0),
            &w0.add_scaled(-similarity, &w1) * (-1.0 / n1),
        ]
    }
}

type ValueFn = dyn Fn(&[Vector]) -> f64 + Send + Sync;
type GradientFn = dyn Fn(&[Vector]) -> Vec<Vector> + Send + Sync;

/// A form built from closures
pub struct FnForm {
    arity: usize,
    value: Box<ValueFn>,
    gradients: Box<GradientFn>,
}

impl FnForm {
    pub fn new<V, G>(arity: usize, value: V, gradients: G) -> Self
    where
        V: Fn(&[Vector]) -> f64 + Send + Sync + 'static,
        G: Fn(&[Vector]) -> Vec<Vector> + Send + Sync + 'static,
    {
        Self {
            arity,
            value: Box::new(value),
            gradients: Box::new(gradients),
        }
    }
}

impl Form for FnForm {
    fn arity(&self) -> usize {
        self.arity
    }

    fn value(&self, vectorizations: &[Vector]) -> f64 {
        (self.value)(vectorizations)
    }

    fn gradients(&self, vectorizations: &[Vector]) -> Vec<Vector> {
        (self.gradients)(vectorizations)
    }
}

impl fmt::Debug for FnForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnForm").field("arity", &self.arity).finish_non_exhaustive()
    }
}
