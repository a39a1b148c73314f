//! Online learning from oracle claims
//!
//! Each claim is handled by one projected multiplicative gradient step on the
//! cosine distance between its two collections. `learn` runs the steps
//! sequentially over the shuffled claims, epoch after epoch, so every step sees
//! the weights left behind by the previous one.

use crate::claim::OracleClaim;
use crate::config::LearnConfig;
use crate::step::{damped_target, rescale_factors, split_budget};
use bagdist_core::context::is_close;
use bagdist_core::{Bag, ComputationContext, Metric, Result, Vector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Why a step left the weights untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The damped target is indistinguishable from the current distance
    OnTarget,
    /// One of the collections projects onto the zero vector
    DegenerateArgument,
    /// No weight the ratio allows to move has any effect on the distance
    FlatGradient,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Applied { from: f64, target: f64 },
    Skipped(SkipReason),
}

impl StepOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, StepOutcome::Applied { .. })
    }
}

/// Counts over a whole `learn` run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnReport {
    pub epochs: usize,
    pub applied: usize,
    pub skipped: usize,
}

/// Stochastic learner for the cosine distance of a [`Metric`]
#[derive(Debug, Clone)]
pub struct Learner {
    config: LearnConfig,
}

impl Learner {
    pub fn new(config: LearnConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LearnConfig {
        &self.config
    }

    /// Run `epochs` shuffled passes over the claims. Shuffling uses the
    /// configured seed when there is one.
    ///
    /// Every claim is checked against the vector space first; a claim naming
    /// an unknown bag fails the call before any weight changes.
    pub fn learn<B: Bag>(
        &self,
        metric: &mut Metric<B>,
        claims: &[OracleClaim<B>],
    ) -> Result<LearnReport> {
        match self.config.seed {
            Some(seed) => self.learn_with_rng(metric, claims, &mut StdRng::seed_from_u64(seed)),
            None => self.learn_with_rng(metric, claims, &mut rand::rng()),
        }
    }

    pub fn learn_with_rng<B: Bag, R: Rng + ?Sized>(
        &self,
        metric: &mut Metric<B>,
        claims: &[OracleClaim<B>],
        rng: &mut R,
    ) -> Result<LearnReport> {
        for claim in claims {
            metric.indicator(&claim.first)?;
            metric.indicator(&claim.second)?;
        }

        let mut report = LearnReport::default();
        let mut order: Vec<usize> = (0..claims.len()).collect();

        for _ in 0..self.config.epochs {
            order.shuffle(rng);
            for &index in &order {
                if self.step(metric, &claims[index])?.is_applied() {
                    report.applied += 1;
                } else {
                    report.skipped += 1;
                }
            }
            report.epochs += 1;
        }

        info!(
            claims = claims.len(),
            epochs = report.epochs,
            applied = report.applied,
            skipped = report.skipped,
            "learned from oracle claims"
        );
        Ok(report)
    }

    /// One gradient step pulling the claim's distance towards its interval
    pub fn step<B: Bag>(&self, metric: &mut Metric<B>, claim: &OracleClaim<B>) -> Result<StepOutcome> {
        let context = metric.evaluate(&claim.first, &claim.second)?;
        let current = context.distance;
        let speed = self.config.speed;
        let target = damped_target(current, claim.interval.closest(current), speed);

        if context.is_degenerate() {
            debug!("skipped step: degenerate argument");
            return Ok(StepOutcome::Skipped(SkipReason::DegenerateArgument));
        }
        if is_close(target, current) {
            return Ok(StepOutcome::Skipped(SkipReason::OnTarget));
        }

        let (item_gradient, bag_gradient) = cosine_gradients(metric, &context)?;
        let Some((item_delta, bag_delta)) = split_budget(
            &item_gradient,
            &bag_gradient,
            self.config.ratio_item_bag,
            target - current,
        ) else {
            debug!(current, target, "skipped step: flat gradient");
            return Ok(StepOutcome::Skipped(SkipReason::FlatGradient));
        };

        metric.rescale_weights(
            &rescale_factors(&item_delta, speed),
            &rescale_factors(&bag_delta, speed),
        )?;
        debug!(current, target, "applied step");
        Ok(StepOutcome::Applied {
            from: current,
            target,
        })
    }
}

/// Sensitivities of the *decrease* of the cosine distance to multiplicative
/// item-weight and bag-weight perturbations, in that order.
///
/// With `w0 = v0/n0`, `w1 = v1/n1` and `c` the distance, the item part is
/// `w01 ⊙ w1 + w10 ⊙ w0` where `w01 = w0 - (1-c) w1`, `w10 = w1 - (1-c) w0`.
/// The bag part pulls `w01 / n1` back through the second argument and
/// `w10 / n0` through the first.
pub fn cosine_gradients<B: Bag>(
    metric: &Metric<B>,
    context: &ComputationContext,
) -> Result<(Vector, Vector)> {
    let first = &context.first;
    let second = &context.second;
    let similarity = 1.0 - context.distance;
    let w0 = first.unit();
    let w1 = second.unit();
    let w01 = w0.add_scaled(-similarity, &w1);
    let w10 = w1.add_scaled(-similarity, &w0);

    let item_gradient = &w01.hadamard(&w1) + &w10.hadamard(&w0);
    let bag_gradient = &(&metric.bag_pullback(&second.indicator, &w01)? * (1.0 / second.norm))
        + &(&metric.bag_pullback(&first.indicator, &w10)? * (1.0 / first.norm));
    Ok((item_gradient, bag_gradient))
}
