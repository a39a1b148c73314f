//! Fitting arbitrary forms to target intervals
//!
//! A batch of [`FormClaim`]s is fitted by a fixed number of projected gradient
//! steps. Each step asks every claim that is still off target for its damped
//! target, then finds the smallest weighted perturbation meeting all of those
//! first-order constraints at once by solving the Gram system of the claims'
//! weight gradients.

use crate::claim::Interval;
use crate::config::FitConfig;
use crate::form::Form;
use crate::step::{damped_target, rescale_factors};
use bagdist_core::context::is_close;
use bagdist_core::{ArgumentSlot, Bag, Error, Metric, Result, Vector};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Weighted gradient norms at or below this leave a claim out of the step.
const FLAT_GRADIENT: f64 = 1e-24;

/// Relative diagonal loading of the Gram matrix when several claims are active
const RIDGE: f64 = 1e-10;

/// A form, its bag-collection arguments and the interval its value should reach
#[derive(Clone)]
pub struct FormClaim<B: Bag> {
    pub form: Arc<dyn Form>,
    pub arguments: Vec<Vec<B>>,
    pub interval: Interval,
}

impl<B: Bag> FormClaim<B> {
    pub fn new(form: Arc<dyn Form>, arguments: Vec<Vec<B>>, interval: Interval) -> Self {
        Self {
            form,
            arguments,
            interval,
        }
    }
}

impl<B: Bag> fmt::Debug for FormClaim<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormClaim")
            .field("arity", &self.form.arity())
            .field("arguments", &self.arguments)
            .field("interval", &self.interval)
            .finish()
    }
}

/// Value of a form together with its gradients with respect to multiplicative
/// item-weight and bag-weight perturbations
#[derive(Debug, Clone, PartialEq)]
pub struct PartialGradients {
    pub value: f64,
    pub items: Vector,
    pub bags: Vector,
}

/// Evaluate `form` on the vectorizations of `arguments` and chain its
/// gradients through the vectorization map.
pub fn partial_gradients<B: Bag>(
    metric: &Metric<B>,
    form: &dyn Form,
    arguments: &[Vec<B>],
) -> Result<PartialGradients> {
    if arguments.len() != form.arity() {
        return Err(Error::ShapeMismatch {
            expected: form.arity(),
            actual: arguments.len(),
        });
    }

    let slots = arguments
        .iter()
        .map(|argument| metric.argument(argument))
        .collect::<Result<Vec<ArgumentSlot>>>()?;
    let vectorizations: Vec<Vector> = slots.iter().map(|slot| slot.vectorization.clone()).collect();

    let value = form.value(&vectorizations);
    let gradients = form.gradients(&vectorizations);
    if gradients.len() != slots.len() {
        return Err(Error::ShapeMismatch {
            expected: slots.len(),
            actual: gradients.len(),
        });
    }

    let mut items = Vector::zeros(metric.space().item_count());
    let mut bags = Vector::zeros(metric.space().bag_count());
    for (slot, gradient) in slots.iter().zip(&gradients) {
        items = &items + &metric.item_pullback(&slot.vectorization, gradient)?;
        bags = &bags + &metric.bag_pullback(&slot.indicator, gradient)?;
    }

    Ok(PartialGradients { value, items, bags })
}

/// Linear map from item-space directions to weight gradients for one
/// collection, at the weights the metric had when it was built
#[derive(Debug, Clone)]
pub struct JacobianDual<'m, B: Bag> {
    metric: &'m Metric<B>,
    argument: ArgumentSlot,
}

impl<'m, B: Bag> JacobianDual<'m, B> {
    pub fn vectorization(&self) -> &Vector {
        &self.argument.vectorization
    }

    /// Item-weight gradient induced by `direction`
    pub fn items(&self, direction: &Vector) -> Result<Vector> {
        self.metric.item_pullback(&self.argument.vectorization, direction)
    }

    /// Bag-weight gradient induced by `direction`
    pub fn bags(&self, direction: &Vector) -> Result<Vector> {
        self.metric.bag_pullback(&self.argument.indicator, direction)
    }
}

pub fn jacobian_dual<'m, 'a, B, I>(metric: &'m Metric<B>, collection: I) -> Result<JacobianDual<'m, B>>
where
    I: IntoIterator<Item = &'a B>,
    B: Bag + 'a,
{
    Ok(JacobianDual {
        metric,
        argument: metric.argument(collection)?,
    })
}

/// Result of one batch gradient step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitStep {
    /// Claims still off target and with a usable gradient
    pub active: usize,
    /// Claims off target whose gradient vanishes, so no step can move them
    pub flat: usize,
    /// Whether the weights were updated
    pub applied: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitReport {
    pub steps_taken: usize,
    /// Every claim reached its damped target before the step budget ran out.
    /// A claim stuck on a flat gradient keeps this false.
    pub converged: bool,
}

struct ActiveClaim {
    items: Vector,
    bags: Vector,
    gap: f64,
}

#[derive(Debug, Clone)]
pub struct Fitter {
    config: FitConfig,
}

impl Fitter {
    pub fn new(config: FitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Fit a single form so that its value lands on `target`
    pub fn fit_target<B: Bag>(
        &self,
        metric: &mut Metric<B>,
        form: Arc<dyn Form>,
        arguments: Vec<Vec<B>>,
        target: f64,
    ) -> Result<FitReport> {
        self.fit_interval(metric, form, arguments, Interval::exact(target)?)
    }

    /// Fit a single form so that its value lands inside `interval`
    pub fn fit_interval<B: Bag>(
        &self,
        metric: &mut Metric<B>,
        form: Arc<dyn Form>,
        arguments: Vec<Vec<B>>,
        interval: Interval,
    ) -> Result<FitReport> {
        self.fit(metric, &[FormClaim::new(form, arguments, interval)])
    }

    /// Take up to `gradient_steps` batch steps over all claims
    pub fn fit<B: Bag>(&self, metric: &mut Metric<B>, claims: &[FormClaim<B>]) -> Result<FitReport> {
        let mut report = FitReport::default();
        for _ in 0..self.config.gradient_steps {
            let step = self.step(metric, claims)?;
            if step.active == 0 {
                report.converged = step.flat == 0;
                break;
            }
            if !step.applied {
                break;
            }
            report.steps_taken += 1;
        }

        info!(
            claims = claims.len(),
            steps = report.steps_taken,
            converged = report.converged,
            "fitted forms"
        );
        Ok(report)
    }

    /// One projected gradient step over the whole batch
    pub fn step<B: Bag>(&self, metric: &mut Metric<B>, claims: &[FormClaim<B>]) -> Result<FitStep> {
        let speed = self.config.speed;
        let ratio = self.config.ratio_item_bag;
        let item_share = ratio * ratio;
        let bag_share = (1.0 - ratio) * (1.0 - ratio);

        let mut active = Vec::new();
        let mut flat = 0;
        for claim in claims {
            let partial = partial_gradients(metric, claim.form.as_ref(), &claim.arguments)?;
            let current = partial.value;
            let target = damped_target(current, claim.interval.closest(current), speed);
            if is_close(target, current) {
                continue;
            }
            let weight = item_share * partial.items.dot(&partial.items)
                + bag_share * partial.bags.dot(&partial.bags);
            if weight <= FLAT_GRADIENT {
                debug!(current, target, "claim has a flat gradient");
                flat += 1;
                continue;
            }
            active.push(ActiveClaim {
                items: partial.items,
                bags: partial.bags,
                gap: target - current,
            });
        }

        let n = active.len();
        if n == 0 {
            return Ok(FitStep {
                active: 0,
                flat,
                applied: false,
            });
        }

        let mut gram = DMatrix::from_fn(n, n, |i, j| {
            item_share * active[i].items.dot(&active[j].items)
                + bag_share * active[i].bags.dot(&active[j].bags)
        });
        if n > 1 {
            let ridge = RIDGE * gram.trace() / n as f64;
            for i in 0..n {
                gram[(i, i)] += ridge;
            }
        }
        let gaps = DVector::from_iterator(n, active.iter().map(|claim| claim.gap));
        let Some(multipliers) = gram.lu().solve(&gaps) else {
            warn!(active = n, "singular gram matrix, fitting step dropped");
            return Ok(FitStep {
                active: n,
                flat,
                applied: false,
            });
        };

        let mut item_delta = Vector::zeros(metric.space().item_count());
        let mut bag_delta = Vector::zeros(metric.space().bag_count());
        for (claim, &multiplier) in active.iter().zip(multipliers.iter()) {
            item_delta = item_delta.add_scaled(item_share * multiplier, &claim.items);
            bag_delta = bag_delta.add_scaled(bag_share * multiplier, &claim.bags);
        }

        metric.rescale_weights(
            &rescale_factors(&item_delta, speed),
            &rescale_factors(&bag_delta, speed),
        )?;
        debug!(active = n, "applied fitting step");
        Ok(FitStep {
            active: n,
            flat,
            applied: true,
        })
    }
}
