//! # bagdist
//!
//! A tunable distance between collections of bags, calibrated from interval
//! supervision.
//!
//! A bag is a finite multiset of items (a string is a bag of characters). A
//! collection of bags is projected into weighted item space, and two
//! collections are compared by the cosine distance of their projections. The
//! item and bag weights start from TF-IDF and inverse bag size, and can be
//! learned from oracle claims of the form "the distance between these two
//! collections lies in `[lo, hi]`".
//!
//! ## Quick Start
//!
//! ```rust
//! use bagdist::prelude::*;
//!
//! let bags = ["abb", "aa", "baa", "bbb"];
//! let mut metric = Metric::new(bags.iter()).unwrap();
//! let before = metric.distance(["abb"].iter(), ["aa"].iter()).unwrap();
//!
//! // Tell the metric that "abb" and "aa" are closer than it thinks
//! let claims = vec![OracleClaim::new(["abb"], ["aa"], Interval::new(0.0, 0.2).unwrap())];
//! metric.learn(&claims, &LearnConfig::default()).unwrap();
//!
//! let after = metric.distance(["abb"].iter(), ["aa"].iter()).unwrap();
//! assert!(after < before);
//! ```
//!
//! ## Crate Structure
//!
//! bagdist is composed of two crates:
//!
//! - [`bagdist-core`](bagdist_core) - Bags, vector space, weights, vectorization, cosine and Jensen–Shannon distances
//! - [`bagdist-learning`](bagdist_learning) - Oracle claims, online learning, form fitting, shared metric
//!
//! ## Features
//!
//! - **Sparse occurrence matrix**: item × bag counts stored in compressed sparse columns
//! - **Online learning**: one projected multiplicative gradient step per claim
//! - **Form fitting**: any differentiable scalar over vectorizations, fitted in batches
//! - **Divergence**: Jensen–Shannon distance with a variance estimate

// Re-export core types
pub use bagdist_core::{
    ArgumentSlot, Bag, ComputationContext, Distribution, Error, JensenShannon, Metric,
    MetricBuilder, MetricConfig, Result, UnknownKeyPolicy, Vector, VectorSpace,
};

// Re-export learning
pub use bagdist_learning::{
    Calibrate, CosineForm, FitConfig, FitReport, Fitter, FnForm, Form, FormClaim, Interval,
    LearnConfig, LearnReport, Learner, OracleClaim, SharedMetric, SkipReason, StepOutcome,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Bag, Calibrate, CosineForm, Error, FitConfig, Fitter, FnForm, Form, FormClaim, Interval,
        LearnConfig, Learner, Metric, MetricConfig, OracleClaim, Result, SharedMetric,
        UnknownKeyPolicy, Vector,
    };
}

/// Entropy and Jensen–Shannon helpers over probability vectors
pub mod divergence {
    pub use bagdist_core::divergence::{
        entropy, information, information_distribution, jensen_shannon,
        jensen_shannon_distribution, mixture,
    };
}
