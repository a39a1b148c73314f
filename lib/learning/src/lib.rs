//! # bagdist Learning
//!
//! Calibration of a [`bagdist_core::Metric`] from supervision.
//!
//! - [`OracleClaim`] - Two bag collections and the interval their distance should lie in
//! - [`Learner`] - Online projected gradient steps on the cosine distance, claim by claim
//! - [`Fitter`] - Batch fitting of arbitrary [`Form`]s over vectorizations
//! - [`SharedMetric`] - A metric behind a read/write lock for concurrent use
//!
//! Both engines rescale item and bag weights multiplicatively, with factors
//! bounded away from zero, so weights stay strictly positive.
//!
//! ## Example
//!
//! ```rust
//! use bagdist_core::Metric;
//! use bagdist_learning::{Interval, LearnConfig, Learner, OracleClaim};
//!
//! let mut metric = Metric::new(["abb", "aa", "baa", "bbb"].iter()).unwrap();
//! let claims = vec![OracleClaim::new(["abb"], ["aa"], Interval::new(0.0, 0.2).unwrap())];
//!
//! let learner = Learner::new(LearnConfig { seed: Some(1), ..LearnConfig::default() }).unwrap();
//! let report = learner.learn(&mut metric, &claims).unwrap();
//! assert_eq!(report.epochs, 5);
//! ```

pub mod calibrate;
pub mod claim;
pub mod config;
pub mod fit;
pub mod form;
pub mod learn;
pub mod shared;
pub mod step;

pub use calibrate::Calibrate;
pub use claim::{Interval, OracleClaim};
pub use config::{FitConfig, LearnConfig};
pub use fit::{jacobian_dual, partial_gradients, FitReport, FitStep, FormClaim, Fitter, JacobianDual, PartialGradients};
pub use form::{CosineForm, FnForm, Form};
pub use learn::{cosine_gradients, LearnReport, Learner, SkipReason, StepOutcome};
pub use shared::SharedMetric;
pub use step::MIN_RESCALE_FACTOR;
