use crate::claim::OracleClaim;
use crate::config::{FitConfig, LearnConfig};
use crate::fit::{FitReport, FormClaim, Fitter};
use crate::learn::{LearnReport, Learner};
use bagdist_core::{Bag, Metric, Result};

/// Learning and fitting as methods on the metric itself
///
/// ```rust
/// use bagdist_core::Metric;
/// use bagdist_learning::{Calibrate, Interval, LearnConfig, OracleClaim};
///
/// let mut metric = Metric::new(["abb", "aa", "baa", "bbb"].iter()).unwrap();
/// let claims = vec![OracleClaim::new(["abb"], ["aa"], Interval::new(0.0, 0.2).unwrap())];
/// let before = metric.distance(["abb"].iter(), ["aa"].iter()).unwrap();
///
/// metric.learn(&claims, &LearnConfig::default()).unwrap();
/// assert!(metric.distance(["abb"].iter(), ["aa"].iter()).unwrap() < before);
/// ```
pub trait Calibrate<B: Bag> {
    fn learn(&mut self, claims: &[OracleClaim<B>], config: &LearnConfig) -> Result<LearnReport>;

    fn fit(&mut self, claims: &[FormClaim<B>], config: &FitConfig) -> Result<FitReport>;
}

impl<B: Bag> Calibrate<B> for Metric<B> {
    fn learn(&mut self, claims: &[OracleClaim<B>], config: &LearnConfig) -> Result<LearnReport> {
        Learner::new(config.clone())?.learn(self, claims)
    }

    fn fit(&mut self, claims: &[FormClaim<B>], config: &FitConfig) -> Result<FitReport> {
        Fitter::new(config.clone())?.fit(self, claims)
    }
}
